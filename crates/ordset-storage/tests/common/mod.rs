//! Shared setup for the integration suites.
//!
//! Every scenario runs against each binding the factory can produce:
//!
//! - `native/memory`
//! - `emulated/memory`
//! - `emulated/rocksdb` (on a temporary directory)

#![allow(dead_code)]

use ordset_core::config::{EngineKind, StorageConfig};
use ordset_core::traits::BackendKind;
use ordset_core::types::{RankedMembers, ScoredMember};
use ordset_core::SortedSets;
use ordset_storage::open_sorted_sets;
use tempfile::TempDir;

/// A facade bound to one backend, plus whatever keeps its storage alive.
pub struct Binding {
    pub name: &'static str,
    pub sets: SortedSets,
    _dir: Option<TempDir>,
}

pub fn native_memory() -> Binding {
    Binding {
        name: "native/memory",
        sets: open_sorted_sets(&StorageConfig::default()).expect("native/memory"),
        _dir: None,
    }
}

pub fn emulated_memory() -> Binding {
    let config = StorageConfig {
        backend: BackendKind::Emulated,
        engine: EngineKind::Memory,
        ..Default::default()
    };
    Binding {
        name: "emulated/memory",
        sets: open_sorted_sets(&config).expect("emulated/memory"),
        _dir: None,
    }
}

pub fn emulated_rocksdb() -> Binding {
    let dir = TempDir::new().expect("tempdir");
    let config = StorageConfig::rocksdb(dir.path().to_string_lossy());
    Binding {
        name: "emulated/rocksdb",
        sets: open_sorted_sets(&config).expect("emulated/rocksdb"),
        _dir: Some(dir),
    }
}

/// One fresh binding of each kind.
pub fn bindings() -> Vec<Binding> {
    vec![native_memory(), emulated_memory(), emulated_rocksdb()]
}

/// `A = {x:1, y:2, z:3}`, `B = {x:5, y:6}`.
pub async fn seed_ab(sets: &SortedSets) {
    sets.add_many("A", [(1.0, "x"), (2.0, "y"), (3.0, "z")])
        .await
        .expect("seed A");
    sets.add_many("B", [(5.0, "x"), (6.0, "y")])
        .await
        .expect("seed B");
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn scored(items: &[(&str, f64)]) -> Vec<ScoredMember> {
    items
        .iter()
        .map(|(m, s)| ScoredMember::new(*m, *s))
        .collect()
}

pub fn members(items: &[&str]) -> RankedMembers {
    RankedMembers::Members(strings(items))
}

pub fn with_scores(items: &[(&str, f64)]) -> RankedMembers {
    RankedMembers::WithScores(scored(items))
}
