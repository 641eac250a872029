//! Multi-key batches on the native backend.

use std::sync::Arc;

use ordset_core::types::{IntersectParams, ScoreRange};
use ordset_core::SortedSets;
use ordset_storage::{InMemoryRankedStore, NativeSortedSetBackend, TEMP_KEY_PREFIX};

use crate::common::{seed_ab, strings};

fn native() -> (SortedSets, Arc<InMemoryRankedStore>) {
    let store = Arc::new(InMemoryRankedStore::new());
    let sets = SortedSets::new(Arc::new(NativeSortedSetBackend::new(store.clone())));
    (sets, store)
}

#[tokio::test]
async fn test_failed_command_fails_group_but_keeps_others() {
    let (sets, store) = native();
    seed_ab(&sets).await;
    store.put_foreign("F");

    let err = sets.remove(["A", "F", "B"], "x").await.unwrap_err();
    assert!(err.is_operation_failed());
    assert!(err.to_string().contains("1 of 3 commands failed"), "{err}");

    // Not atomic: the commands that succeeded stay applied.
    assert_eq!(sets.range("A", 0, -1).await.unwrap(), strings(&["y", "z"]));
    assert_eq!(sets.range("B", 0, -1).await.unwrap(), strings(&["y"]));
}

#[tokio::test]
async fn test_range_removal_batch_failure() {
    let (sets, store) = native();
    seed_ab(&sets).await;
    store.put_foreign("F");
    let err = sets
        .sets_remove_range_by_score(["F", "A"], ScoreRange::all())
        .await
        .unwrap_err();
    assert!(err.is_operation_failed());
    assert_eq!(sets.card("A").await.unwrap(), 0);
}

#[tokio::test]
async fn test_intersect_leaves_no_temporary_keys() {
    let (sets, store) = native();
    seed_ab(&sets).await;
    let before = store.key_count();
    sets.intersect(IntersectParams::new(["A", "B"])).await.unwrap();
    sets.intersect_card(["A", "B"]).await.unwrap();
    assert_eq!(store.key_count(), before);
    assert!(TEMP_KEY_PREFIX.starts_with("temp"));
}

#[tokio::test]
async fn test_closed_store_is_unavailable() {
    let (sets, store) = native();
    seed_ab(&sets).await;
    store.close();
    assert!(sets.card("A").await.unwrap_err().is_unavailable());
    assert!(sets.remove(["A", "B"], "x").await.unwrap_err().is_unavailable());
}
