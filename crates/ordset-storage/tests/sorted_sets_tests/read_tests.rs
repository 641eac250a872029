//! Ranked and score-range reads on every binding.

use ordset_core::types::ScoreRange;

use crate::common::{bindings, scored, seed_ab, strings};

#[tokio::test]
async fn test_range_and_rev_range() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        assert_eq!(b.sets.range("A", 0, -1).await.unwrap(), strings(&["x", "y", "z"]), "{}", b.name);
        assert_eq!(b.sets.range("A", 1, 1).await.unwrap(), strings(&["y"]), "{}", b.name);
        assert_eq!(b.sets.rev_range("A", 0, 1).await.unwrap(), strings(&["z", "y"]), "{}", b.name);
        assert!(b.sets.range("A", 3, -1).await.unwrap().is_empty(), "{}", b.name);
        assert!(b.sets.range("missing", 0, -1).await.unwrap().is_empty(), "{}", b.name);
    }
}

#[tokio::test]
async fn test_range_with_scores() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        assert_eq!(
            b.sets.range_with_scores("B", 0, -1).await.unwrap(),
            scored(&[("x", 5.0), ("y", 6.0)]),
            "{}",
            b.name
        );
        assert_eq!(
            b.sets.rev_range_with_scores("A", 0, 0).await.unwrap(),
            scored(&[("z", 3.0)]),
            "{}",
            b.name
        );
    }
}

#[tokio::test]
async fn test_range_by_score_pages() {
    for b in bindings() {
        b.sets
            .add_many("S", [(1.0, "a"), (2.0, "b"), (3.0, "c"), (4.0, "d"), (5.0, "e")])
            .await
            .unwrap();
        let range = ScoreRange::parse("2", "4").unwrap();
        assert_eq!(
            b.sets.range_by_score("S", 0, None, range).await.unwrap(),
            strings(&["b", "c", "d"]),
            "{}",
            b.name
        );
        assert_eq!(
            b.sets.range_by_score("S", 1, Some(1), range).await.unwrap(),
            strings(&["c"]),
            "{}",
            b.name
        );
        assert_eq!(
            b.sets.rev_range_by_score("S", 0, Some(2), range).await.unwrap(),
            strings(&["d", "c"]),
            "{}",
            b.name
        );
        assert_eq!(
            b.sets
                .rev_range_by_score_with_scores("S", 0, Some(1), ScoreRange::all())
                .await
                .unwrap(),
            scored(&[("e", 5.0)]),
            "{}",
            b.name
        );
        let inverted = ScoreRange::parse("4", "2").unwrap();
        assert!(b.sets.range_by_score("S", 0, None, inverted).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_card_and_score() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        assert_eq!(b.sets.card("A").await.unwrap(), 3, "{}", b.name);
        assert_eq!(b.sets.card("missing").await.unwrap(), 0, "{}", b.name);
        assert_eq!(b.sets.score("B", "y").await.unwrap(), Some(6.0), "{}", b.name);
        assert_eq!(b.sets.score("B", "z").await.unwrap(), None, "{}", b.name);
    }
}

#[tokio::test]
async fn test_add_overwrites_score() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.add("A", 10.0, "x").await.unwrap();
        assert_eq!(b.sets.card("A").await.unwrap(), 3, "{}", b.name);
        assert_eq!(b.sets.range("A", 0, -1).await.unwrap(), strings(&["y", "z", "x"]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_sets_add_reaches_every_key() {
    for b in bindings() {
        b.sets.sets_add(["P", "Q"], 7.0, 42_i64).await.unwrap();
        assert_eq!(b.sets.score("P", "42").await.unwrap(), Some(7.0), "{}", b.name);
        assert_eq!(b.sets.score("Q", 42_i64).await.unwrap(), Some(7.0), "{}", b.name);
    }
}
