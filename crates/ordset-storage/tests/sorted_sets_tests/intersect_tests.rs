//! Weighted intersection on every binding.

use ordset_core::types::{Aggregate, IntersectParams, ScoredMember};

use crate::common::{bindings, members, scored, seed_ab, with_scores};

#[tokio::test]
async fn test_intersect_sum_default() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let result = b.sets.intersect(IntersectParams::new(["A", "B"])).await.unwrap();
        assert_eq!(result, members(&["x", "y"]), "{}", b.name);

        let result = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).with_scores(true))
            .await
            .unwrap();
        assert_eq!(result, with_scores(&[("x", 6.0), ("y", 8.0)]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_intersect_window() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let first = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).range(0, 0))
            .await
            .unwrap();
        assert_eq!(first, members(&["x"]), "{}", b.name);

        let second = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).range(1, 1))
            .await
            .unwrap();
        assert_eq!(second, members(&["y"]), "{}", b.name);

        let past_end = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).range(5, 10))
            .await
            .unwrap();
        assert!(past_end.is_empty(), "{}", b.name);
    }
}

#[tokio::test]
async fn test_intersect_card_counts_common_members() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        assert_eq!(b.sets.intersect_card(["A", "B"]).await.unwrap(), 2, "{}", b.name);
        assert_eq!(b.sets.intersect_card(["A"]).await.unwrap(), 3, "{}", b.name);
        assert_eq!(b.sets.intersect_card(["A", "missing"]).await.unwrap(), 0, "{}", b.name);
    }
}

#[tokio::test]
async fn test_intersect_card_matches_unbounded_intersect() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        b.sets.add("C", 9.0, "y").await.unwrap();
        for keys in [vec!["A", "B"], vec!["A", "C"], vec!["A", "B", "C"]] {
            let full = b.sets.intersect(IntersectParams::new(keys.clone())).await.unwrap();
            let card = b.sets.intersect_card(keys).await.unwrap();
            assert_eq!(full.len() as u64, card, "{}", b.name);
        }
    }
}

#[tokio::test]
async fn test_intersect_empty_inputs() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        assert!(b.sets.intersect(IntersectParams::default()).await.unwrap().is_empty());
        assert_eq!(b.sets.intersect_card(Vec::<String>::new()).await.unwrap(), 0);
        let inverted = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).range(3, 1).with_scores(true))
            .await
            .unwrap();
        assert_eq!(inverted, with_scores(&[]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_weights_scale_scores() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let result = b
            .sets
            .intersect(
                IntersectParams::new(["A", "B"])
                    .weights(vec![2.0, 1.0])
                    .with_scores(true),
            )
            .await
            .unwrap();
        assert_eq!(result, with_scores(&[("x", 7.0), ("y", 10.0)]), "{}", b.name);

        // One weight given: the second set keeps weight 1.
        let padded = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).weights(vec![3.0]).with_scores(true))
            .await
            .unwrap();
        assert_eq!(padded, with_scores(&[("x", 8.0), ("y", 12.0)]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_uniform_weight_is_linear() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let plain = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).with_scores(true))
            .await
            .unwrap()
            .into_scored()
            .unwrap();
        let tripled = b
            .sets
            .intersect(
                IntersectParams::new(["A", "B"])
                    .weights(vec![3.0, 3.0])
                    .with_scores(true),
            )
            .await
            .unwrap()
            .into_scored()
            .unwrap();
        let expected: Vec<ScoredMember> = plain
            .iter()
            .map(|e| ScoredMember::new(e.value.clone(), e.score * 3.0))
            .collect();
        assert_eq!(tripled, expected, "{}", b.name);
    }
}

#[tokio::test]
async fn test_min_and_max_aggregates() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let min = b
            .sets
            .intersect(
                IntersectParams::new(["A", "B"])
                    .aggregate(Aggregate::Min)
                    .with_scores(true),
            )
            .await
            .unwrap();
        assert_eq!(min, with_scores(&[("x", 1.0), ("y", 2.0)]), "{}", b.name);

        let max = b
            .sets
            .intersect(
                IntersectParams::new(["A", "B"])
                    .aggregate(Aggregate::Max)
                    .with_scores(true),
            )
            .await
            .unwrap();
        assert_eq!(max, with_scores(&[("x", 5.0), ("y", 6.0)]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_rev_intersect_reverses_order() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let result = b
            .sets
            .rev_intersect(IntersectParams::new(["A", "B"]).with_scores(true))
            .await
            .unwrap();
        assert_eq!(result, with_scores(&[("y", 8.0), ("x", 6.0)]), "{}", b.name);

        let top = b
            .sets
            .rev_intersect(IntersectParams::new(["A", "B"]).range(0, 0))
            .await
            .unwrap();
        assert_eq!(top, members(&["y"]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_ties_break_by_member() {
    for b in bindings() {
        b.sets.add_many("C", [(1.0, "b"), (1.0, "a"), (1.0, "c")]).await.unwrap();
        b.sets.add_many("D", [(1.0, "c"), (1.0, "a"), (1.0, "b")]).await.unwrap();
        let asc = b.sets.intersect(IntersectParams::new(["C", "D"])).await.unwrap();
        assert_eq!(asc, members(&["a", "b", "c"]), "{}", b.name);
        let desc = b.sets.rev_intersect(IntersectParams::new(["C", "D"])).await.unwrap();
        assert_eq!(desc, members(&["c", "b", "a"]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_opposite_infinities_collapse_to_zero() {
    for b in bindings() {
        b.sets.add("E", f64::INFINITY, "p").await.unwrap();
        b.sets.add("F", f64::NEG_INFINITY, "p").await.unwrap();
        let sum = b
            .sets
            .intersect(IntersectParams::new(["E", "F"]).with_scores(true))
            .await
            .unwrap();
        assert_eq!(sum, with_scores(&[("p", 0.0)]), "{}", b.name);

        // inf * 0 is 0, then + -inf.
        let zeroed = b
            .sets
            .intersect(
                IntersectParams::new(["E", "F"])
                    .weights(vec![0.0, 1.0])
                    .with_scores(true),
            )
            .await
            .unwrap()
            .into_scored()
            .unwrap();
        assert_eq!(zeroed, scored(&[("p", f64::NEG_INFINITY)]), "{}", b.name);
    }
}

#[tokio::test]
async fn test_invalid_params_rejected() {
    for b in bindings() {
        seed_ab(&b.sets).await;
        let dup = b.sets.intersect(IntersectParams::new(["A", "A"])).await;
        assert!(dup.unwrap_err().is_invalid_argument(), "{}", b.name);

        let surplus = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).weights(vec![1.0, 2.0, 3.0]))
            .await;
        assert!(surplus.unwrap_err().is_invalid_argument(), "{}", b.name);

        let nan = b
            .sets
            .intersect(IntersectParams::new(["A", "B"]).weights(vec![f64::NAN]))
            .await;
        assert!(nan.unwrap_err().is_invalid_argument(), "{}", b.name);
    }
}
