//! The same generated workload on every binding must give identical answers.

use ordset_core::types::{Aggregate, IntersectParams, RankedMembers, ScoreRange};
use ordset_core::SortedSets;

use crate::common::bindings;

const KEYS: [&str; 4] = ["k0", "k1", "k2", "k3"];

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

async fn load(sets: &SortedSets, seed: u64) {
    let mut rng = Lcg(seed);
    for key in KEYS {
        let entries: Vec<(f64, String)> = (0..24)
            .map(|_| {
                // Few distinct scores so ties are common.
                let score = rng.below(6) as f64 - 2.0;
                (score, format!("m{}", rng.below(16)))
            })
            .collect();
        sets.add_many(key, entries).await.unwrap();
    }
    for _ in 0..6 {
        let key = KEYS[rng.below(KEYS.len() as u64) as usize];
        sets.remove(key, format!("m{}", rng.below(16))).await.unwrap();
    }
}

/// Every query of the battery, rendered for comparison.
async fn battery(sets: &SortedSets) -> Vec<String> {
    let mut out = Vec::new();
    let params = [
        IntersectParams::new(["k0", "k1"]),
        IntersectParams::new(["k0", "k1", "k2"]).with_scores(true),
        IntersectParams::new(["k1", "k3"])
            .weights(vec![2.5, 0.5])
            .with_scores(true),
        IntersectParams::new(["k0", "k2"])
            .aggregate(Aggregate::Min)
            .with_scores(true),
        IntersectParams::new(["k2", "k3"])
            .aggregate(Aggregate::Max)
            .weights(vec![0.5])
            .range(1, 4)
            .with_scores(true),
        IntersectParams::new(["k0", "k3"]).range(2, 2),
    ];
    for p in params {
        out.push(render(sets.intersect(p.clone()).await.unwrap()));
        out.push(render(sets.rev_intersect(p).await.unwrap()));
    }
    for keys in [vec!["k0", "k1"], vec!["k0", "k1", "k2", "k3"], vec!["k2"]] {
        out.push(sets.intersect_card(keys).await.unwrap().to_string());
    }
    for key in KEYS {
        out.push(format!("{:?}", sets.range_with_scores(key, 0, -1).await.unwrap()));
        out.push(format!("{:?}", sets.rev_range(key, 1, 5).await.unwrap()));
        out.push(format!(
            "{:?}",
            sets.range_by_score(key, 1, Some(3), ScoreRange::parse("-1", "2").unwrap())
                .await
                .unwrap()
        ));
        out.push(format!(
            "{:?}",
            sets.rev_range_by_score_with_scores(key, 0, None, ScoreRange::all())
                .await
                .unwrap()
        ));
        out.push(sets.card(key).await.unwrap().to_string());
    }
    out
}

fn render(result: RankedMembers) -> String {
    format!("{result:?}")
}

#[tokio::test]
async fn test_backends_agree_on_generated_data() {
    for seed in [7_u64, 1234, 99_991] {
        let mut answers = Vec::new();
        for b in bindings() {
            load(&b.sets, seed).await;
            answers.push((b.name, battery(&b.sets).await));
        }
        let (first_name, first) = &answers[0];
        for (name, answer) in &answers[1..] {
            for (i, (a, b)) in first.iter().zip(answer.iter()).enumerate() {
                assert_eq!(a, b, "seed {seed}, query {i}: {first_name} vs {name}");
            }
        }
    }
}

#[tokio::test]
async fn test_backends_agree_after_range_removal() {
    let mut answers = Vec::new();
    for b in bindings() {
        load(&b.sets, 42).await;
        b.sets
            .sets_remove_range_by_score(["k0", "k2"], ScoreRange::parse("0", "1").unwrap())
            .await
            .unwrap();
        b.sets.sets_remove(KEYS, "m3").await.unwrap();
        answers.push(battery(&b.sets).await);
    }
    assert!(answers.windows(2).all(|w| w[0] == w[1]));
}
