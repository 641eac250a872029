//! Page through an ordered set in rank order.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::config::BatchConfig;
use crate::error::OrdSetResult;
use crate::facade::SortedSets;

/// How [`process_sorted_set`] walks a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingOptions {
    /// Members per page.
    pub batch_size: usize,
    /// Pause between pages.
    pub interval: Option<Duration>,
    /// Re-read from rank 0 on every page. Use when the handler removes what
    /// it processes, otherwise pages would be skipped.
    pub always_start_at_zero: bool,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            interval: None,
            always_start_at_zero: false,
        }
    }
}

impl From<&BatchConfig> for PagingOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            batch_size: config.size,
            interval: (config.interval_ms > 0).then(|| Duration::from_millis(config.interval_ms)),
            always_start_at_zero: false,
        }
    }
}

impl PagingOptions {
    pub fn always_start_at_zero(mut self) -> Self {
        self.always_start_at_zero = true;
        self
    }
}

/// Call `handler` with successive pages of `key`'s members (ascending
/// score) until a page comes back empty.
///
/// Returns the number of members handed to `handler`.
///
/// # Errors
///
/// The first read or handler error stops the walk and is returned.
pub async fn process_sorted_set<F, Fut>(
    sets: &SortedSets,
    key: &str,
    options: PagingOptions,
    mut handler: F,
) -> OrdSetResult<usize>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = OrdSetResult<()>>,
{
    let batch = options.batch_size.max(1);
    let mut start = 0usize;
    let mut processed = 0usize;

    loop {
        let stop = i64::try_from(start.saturating_add(batch - 1)).unwrap_or(i64::MAX);
        let page = sets.range(key, start, stop).await?;
        if page.is_empty() {
            break;
        }
        let len = page.len();
        debug!(key, start, len, "Processing sorted-set page");
        handler(page).await?;
        processed += len;

        if !options.always_start_at_zero {
            start = start.saturating_add(batch);
        }
        if let Some(pause) = options.interval {
            tokio::time::sleep(pause).await;
        }
    }

    Ok(processed)
}
