//! Domain partitions: named sub-collections of models sharing provenance
//! (typically one sub-contract of a cascade).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Model, Team};
use crate::predicate::PredicateId;

/// Id-range metadata derived from the models of a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionDomain {
    pub min_id: Option<PredicateId>,
    pub max_id: Option<PredicateId>,
    pub observed_ids: BTreeSet<PredicateId>,
}

impl PartitionDomain {
    pub fn scan(team: &Team) -> Self {
        let observed_ids = team.observed_ids();
        PartitionDomain {
            min_id: observed_ids.first().copied(),
            max_id: observed_ids.last().copied(),
            observed_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observed_ids.is_empty()
    }

    /// `empty`, or `range_<min>_<max>`.
    pub fn label(&self) -> String {
        match (self.min_id, self.max_id) {
            (Some(min), Some(max)) => format!("range_{min}_{max}"),
            _ => "empty".to_string(),
        }
    }
}

/// A named, ordered subsequence of a model set.
#[derive(Debug, Clone, Serialize)]
pub struct DomainPartition {
    pub name: String,
    /// Optional numeric header emitted by the solver for this partition.
    pub magic: Option<u64>,
    /// Optional array count emitted by the solver for this partition.
    pub arrays: Option<u64>,
    #[serde(skip)]
    team: Team,
    domain: PartitionDomain,
}

impl DomainPartition {
    pub fn new(name: impl Into<String>, team: Team) -> Self {
        let domain = PartitionDomain::scan(&team);
        DomainPartition {
            name: name.into(),
            magic: None,
            arrays: None,
            team,
            domain,
        }
    }

    pub fn with_header(mut self, magic: Option<u64>, arrays: Option<u64>) -> Self {
        self.magic = magic;
        self.arrays = arrays;
        self
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn models(&self) -> &[Model] {
        self.team.models()
    }

    pub fn domain(&self) -> &PartitionDomain {
        &self.domain
    }

    /// An id is applicable to a partition only if some model of the
    /// partition contains it. Lying inside `[min_id, max_id]` is not enough.
    pub fn is_applicable(&self, id: PredicateId) -> bool {
        self.domain.observed_ids.contains(&id)
    }
}
