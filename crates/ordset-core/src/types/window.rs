//! Ranked result windows.

use serde::{Deserialize, Serialize};

/// A 0-based inclusive `[start, stop]` window over a ranked result.
///
/// A negative `stop` means "through the last element". Otherwise the window
/// holds at most `stop - start + 1` entries, and when that is zero or less
/// the window is empty no matter how many entries exist.
///
/// ```rust
/// use ordset_core::types::RankWindow;
///
/// assert_eq!(RankWindow::new(0, -1).limit(), None);
/// assert_eq!(RankWindow::new(2, 4).limit(), Some(3));
/// assert!(RankWindow::new(5, 2).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankWindow {
    start: usize,
    stop: Option<usize>,
}

impl Default for RankWindow {
    fn default() -> Self {
        Self::all()
    }
}

impl RankWindow {
    pub fn new(start: usize, stop: i64) -> Self {
        let stop = usize::try_from(stop).ok();
        Self { start, stop }
    }

    /// Every ranked entry.
    pub fn all() -> Self {
        Self {
            start: 0,
            stop: None,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Inclusive stop rank; `None` for "to the end".
    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    /// Maximum number of entries; `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.stop
            .map(|stop| stop.saturating_add(1).saturating_sub(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.limit() == Some(0)
    }

    /// Stop rank in ranked-store form, where `-1` is the last element.
    pub fn stop_index(&self) -> i64 {
        self.stop
            .map(|s| i64::try_from(s).unwrap_or(i64::MAX))
            .unwrap_or(-1)
    }

    /// Skip `start` items and keep at most `limit`.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        if self.is_empty() {
            return Vec::new();
        }
        let iter = items.into_iter().skip(self.start);
        match self.limit() {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_unbounded() {
        let window = RankWindow::default();
        assert_eq!(window.start(), 0);
        assert_eq!(window.stop(), None);
        assert_eq!(window.stop_index(), -1);
        assert_eq!(window.apply(1..=5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bounded_window() {
        let window = RankWindow::new(1, 2);
        assert_eq!(window.limit(), Some(2));
        assert_eq!(window.apply(1..=5), vec![2, 3]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let window = RankWindow::new(3, 1);
        assert!(window.is_empty());
        assert!(window.apply(1..=5).is_empty());
    }

    #[test]
    fn test_window_past_end() {
        assert!(RankWindow::new(10, 20).apply(1..=5).is_empty());
        assert_eq!(RankWindow::new(0, 0).apply(["x", "y"]), vec!["x"]);
    }
}
