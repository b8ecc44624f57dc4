//! Cache-aside seam for consequence queries.
//!
//! Entries are keyed by snapshot fingerprint and query signature. A snapshot
//! never changes, so the only invalidation is an explicit recompile that
//! retires the old fingerprint.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use norma_model::{ArtifactSnapshot, PredicateId};
use tracing::debug;

use crate::consequence::{ConsequenceAnalyzer, ConsequenceReport, QueryKind};
use crate::error::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub snapshot: Arc<str>,
    pub kind: QueryKind,
    pub predicate: PredicateId,
}

impl QueryKey {
    pub fn new(snapshot: &ArtifactSnapshot, kind: QueryKind, predicate: PredicateId) -> Self {
        QueryKey {
            snapshot: Arc::from(snapshot.fingerprint()),
            kind,
            predicate,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}#{}", self.snapshot, self.kind, self.predicate)
    }
}

/// Storage for consequence reports.
pub trait QueryCache {
    fn get(&mut self, key: &QueryKey) -> Option<ConsequenceReport>;

    fn put(&mut self, key: QueryKey, report: ConsequenceReport);

    /// Drop every entry of a snapshot that has been recompiled. Returns the
    /// number of entries removed.
    fn invalidate_snapshot(&mut self, fingerprint: &str) -> usize;
}

/// Process-local [`QueryCache`]. Every lookup counts as a hit or a miss.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<QueryKey, ConsequenceReport>,
    hits: usize,
    misses: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl QueryCache for MemoryCache {
    fn get(&mut self, key: &QueryKey) -> Option<ConsequenceReport> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits = self.hits.saturating_add(1);
        } else {
            self.misses = self.misses.saturating_add(1);
        }
        found
    }

    fn put(&mut self, key: QueryKey, report: ConsequenceReport) {
        self.entries.insert(key, report);
    }

    fn invalidate_snapshot(&mut self, fingerprint: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| &*key.snapshot != fingerprint);
        before - self.entries.len()
    }
}

/// Consequence query through a cache: a hit is returned as is, a miss is
/// computed against the snapshot and stored.
pub fn cached_consequences<C: QueryCache + ?Sized>(
    cache: &mut C,
    snapshot: &ArtifactSnapshot,
    kind: QueryKind,
    target: PredicateId,
) -> Result<ConsequenceReport, AnalysisError> {
    let key = QueryKey::new(snapshot, kind, target);
    if let Some(report) = cache.get(&key) {
        debug!("cache hit {key}");
        return Ok(report);
    }
    debug!("cache miss {key}");
    let artifact = snapshot.artifact();
    let report = ConsequenceAnalyzer::new(&artifact.catalog, &artifact.team).analyze(target, kind)?;
    cache.put(key, report.clone());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use norma_model::{Artifact, Model, Predicate, PredicateCatalog, Team};

    fn snapshot(models: Vec<Model>) -> ArtifactSnapshot {
        let catalog = PredicateCatalog::from_predicates([
            Predicate::new(1, "pay"),
            Predicate::new(2, "deliver"),
        ])
        .unwrap();
        ArtifactSnapshot::new(Artifact {
            catalog,
            team: Team::from_models(models),
            partitions: Vec::new(),
            satisfiable: true,
            declared_solutions: 0,
        })
    }

    #[test]
    fn test_second_query_is_a_hit() {
        let snap = snapshot(vec![Model::new([1, 2]), Model::new([2])]);
        let mut cache = MemoryCache::new();
        let first = cached_consequences(&mut cache, &snap, QueryKind::Fulfillment, 1).unwrap();
        let second = cached_consequences(&mut cache, &snap, QueryKind::Fulfillment, 1).unwrap();
        assert_eq!(first.consequences, second.consequences);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_recompile_retires_old_fingerprint_only() {
        let old = snapshot(vec![Model::new([1, 2])]);
        let new = snapshot(vec![Model::new([1])]);
        assert_ne!(old.fingerprint(), new.fingerprint());

        let mut cache = MemoryCache::new();
        cached_consequences(&mut cache, &old, QueryKind::Violation, 1).unwrap();
        cached_consequences(&mut cache, &old, QueryKind::Fulfillment, 1).unwrap();
        cached_consequences(&mut cache, &new, QueryKind::Fulfillment, 1).unwrap();

        assert_eq!(cache.invalidate_snapshot(old.fingerprint()), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (0, 3));
        assert!(cache
            .get(&QueryKey::new(&new, QueryKind::Fulfillment, 1))
            .is_some());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let snap = snapshot(vec![Model::new([1])]);
        let mut cache = MemoryCache::new();
        assert!(cached_consequences(&mut cache, &snap, QueryKind::Fulfillment, 9).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_display() {
        let snap = snapshot(Vec::new());
        let key = QueryKey::new(&snap, QueryKind::Violation, 4);
        assert_eq!(key.to_string(), format!("{}#violation#4", snap.fingerprint()));
    }
}
