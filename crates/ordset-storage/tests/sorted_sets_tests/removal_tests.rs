//! Removal on every binding.

use ordset_core::types::{MemberSet, ScoreRange};
use serde_json::json;

use crate::common::{bindings, seed_ab, strings};

#[tokio::test]
async fn test_removing_only_member_empties_set() {
    for b in bindings() {
        b.sets.add("solo", 4.0, "m").await.unwrap();
        b.sets.remove("solo", "m").await.unwrap();
        assert_eq!(b.sets.intersect_card(["solo"]).await.unwrap(), 0, "{}", b.name);
        assert_eq!(b.sets.card("solo").await.unwrap(), 0, "{}", b.name);
    }
}

#[tokio::test]
async fn test_remove_member_from_both_sets() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.remove(["A", "B"], "x").await.unwrap();
        assert_eq!(b.sets.intersect_card(["A", "B"]).await.unwrap(), 1, "{}", b.name);
        assert_eq!(b.sets.range("A", 0, -1).await.unwrap(), strings(&["y", "z"]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_remove_many_members() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.remove("A", vec!["x", "z", "absent"]).await.unwrap();
        assert_eq!(b.sets.range("A", 0, -1).await.unwrap(), strings(&["y"]), "{}", b.name);
        assert_eq!(b.sets.card("B").await.unwrap(), 2, "{}", b.name);
    }
}

#[tokio::test]
async fn test_empty_selections_are_noops() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.remove("", "x").await.unwrap();
        b.sets.remove(Vec::<String>::new(), "x").await.unwrap();
        b.sets.remove("A", Vec::<String>::new()).await.unwrap();
        b.sets
            .remove("A", MemberSet::from_json(&json!(null)).unwrap())
            .await
            .unwrap();
        b.sets.sets_remove(Vec::<String>::new(), "x").await.unwrap();
        b.sets
            .sets_remove_range_by_score(Vec::<String>::new(), ScoreRange::all())
            .await
            .unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 3, "{}", b.name);
        assert_eq!(b.sets.card("B").await.unwrap(), 2, "{}", b.name);
    }
}

#[tokio::test]
async fn test_lone_empty_member_is_noop() {
    for b in bindings() {
        b.sets.add("A", 1.0, "").await.unwrap();
        b.sets.remove("A", "").await.unwrap();
        b.sets.remove(["A", "B"], String::new()).await.unwrap();
        b.sets.sets_remove(["A"], "").await.unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 1, "{}", b.name);

        // Listed explicitly, the empty member is removed like any other.
        b.sets.remove("A", vec![""]).await.unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 0, "{}", b.name);
    }
}

#[tokio::test]
async fn test_null_inside_member_list_is_invalid() {
    assert!(MemberSet::from_json(&json!(["x", null])).unwrap_err().is_invalid_argument());
}

#[tokio::test]
async fn test_numeric_members_are_canonicalized() {
    for b in bindings() {
        b.sets.add("n", 1.0, 5_i64).await.unwrap();
        b.sets.add("n", 2.0, "6").await.unwrap();
        b.sets.remove("n", 5.0).await.unwrap();
        b.sets.sets_remove(["n"], 6_u64).await.unwrap();
        assert_eq!(b.sets.card("n").await.unwrap(), 0, "{}", b.name);
    }
}

#[tokio::test]
async fn test_sets_remove_one_member_everywhere() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.sets_remove(["A", "B", "missing"], "y").await.unwrap();
        assert_eq!(b.sets.score("A", "y").await.unwrap(), None, "{}", b.name);
        assert_eq!(b.sets.score("B", "y").await.unwrap(), None, "{}", b.name);
        assert_eq!(b.sets.score("A", "x").await.unwrap(), Some(1.0), "{}", b.name);
    }
}

#[tokio::test]
async fn test_remove_unbounded_range_clears_sets() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets
            .sets_remove_range_by_score(["A", "B"], ScoreRange::parse("-inf", "+inf").unwrap())
            .await
            .unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 0, "{}", b.name);
        assert_eq!(b.sets.card("B").await.unwrap(), 0, "{}", b.name);
        assert_eq!(b.sets.intersect_card(["A", "B"]).await.unwrap(), 0, "{}", b.name);
    }
}

#[tokio::test]
async fn test_remove_bounded_range_is_inclusive() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets
            .sets_remove_range_by_score(["A", "B"], ScoreRange::parse("2", "5").unwrap())
            .await
            .unwrap();
        assert_eq!(b.sets.range("A", 0, -1).await.unwrap(), strings(&["x"]), "{}", b.name);
        assert_eq!(b.sets.range("B", 0, -1).await.unwrap(), strings(&["y"]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_remove_range_single_key() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets
            .sets_remove_range_by_score("A", ScoreRange::parse("-inf", "1").unwrap())
            .await
            .unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 2, "{}", b.name);
        assert_eq!(b.sets.card("B").await.unwrap(), 2, "{}", b.name);
    }
}
