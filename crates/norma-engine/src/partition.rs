//! Domain-partitioned queries and responsibility analysis.
//!
//! A query runs independently against every partition. Required ids that a
//! partition never mentions make the partition not applicable, and so does a
//! violation query whose forbidden ids it never mentions. Otherwise the
//! partition is fulfilled when some model matches and violated when none
//! does. The ids shared by all matches of the contributing partitions form
//! the aggregated necessary set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use norma_model::{DomainPartition, Model, PredicateCatalog, PredicateId};
use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;
use crate::query::PathQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionStatus {
    Fulfilled,
    Violated,
    NotApplicable,
}

impl PartitionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionStatus::Fulfilled => "FULFILLED",
            PartitionStatus::Violated => "VIOLATED",
            PartitionStatus::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl fmt::Display for PartitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a query against one partition.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionResult {
    pub name: String,
    pub magic: Option<u64>,
    pub arrays: Option<u64>,
    pub domain: String,
    pub min_id: Option<PredicateId>,
    pub max_id: Option<PredicateId>,
    pub status: PartitionStatus,
    pub status_reason: String,
    pub applicable_required: Vec<PredicateId>,
    pub non_applicable_required: Vec<PredicateId>,
    pub match_count: usize,
    pub matches: Vec<Model>,
    pub necessary_ids: BTreeSet<PredicateId>,
    /// Set for violation-style queries that leave the partition without any
    /// model.
    pub critical: bool,
}

/// Per-partition results plus the cross-partition aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionedQuery {
    pub query: PathQuery,
    pub results: Vec<PartitionResult>,
    /// Matches summed over the partitions that feed the aggregate.
    pub aggregated_matches: usize,
    pub aggregated_necessary_ids: BTreeSet<PredicateId>,
    pub critical_partitions: Vec<String>,
}

impl PartitionedQuery {
    pub fn with_status(&self, status: PartitionStatus) -> impl Iterator<Item = &PartitionResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

fn id_list(ids: &[PredicateId]) -> String {
    format!("{ids:?}")
}

fn query_one(partition: &DomainPartition, query: &PathQuery) -> PartitionResult {
    let (applicable_required, non_applicable_required): (Vec<PredicateId>, Vec<PredicateId>) =
        query
            .required
            .iter()
            .copied()
            .partition(|id| partition.is_applicable(*id));
    let domain = partition.domain();

    let mut result = PartitionResult {
        name: partition.name.clone(),
        magic: partition.magic,
        arrays: partition.arrays,
        domain: domain.label(),
        min_id: domain.min_id,
        max_id: domain.max_id,
        status: PartitionStatus::NotApplicable,
        status_reason: String::new(),
        applicable_required,
        non_applicable_required,
        match_count: 0,
        matches: Vec::new(),
        necessary_ids: BTreeSet::new(),
        critical: false,
    };

    if !result.non_applicable_required.is_empty() {
        result.status_reason = format!(
            "Required ids {} not applicable to this partition",
            id_list(&result.non_applicable_required)
        );
        return result;
    }

    let violation_style = query.is_violation_style();
    if violation_style && !query.forbidden.iter().any(|id| partition.is_applicable(*id)) {
        result.status_reason = format!(
            "Forbidden ids {} never occur in this partition",
            id_list(&query.forbidden)
        );
        return result;
    }

    let applicable = PathQuery::new(result.applicable_required.clone(), query.forbidden.clone());
    let matches = partition.team().filter(|m| applicable.matches(m));
    result.match_count = matches.len();
    result.necessary_ids = matches.intersection();
    result.matches = matches.into_models();

    match (result.match_count, violation_style) {
        (0, true) => {
            result.status = PartitionStatus::Violated;
            result.critical = true;
            result.status_reason = format!(
                "Partition becomes unsatisfiable when ids {} are violated",
                id_list(&query.forbidden)
            );
        }
        (n, true) => {
            result.status = PartitionStatus::Violated;
            result.status_reason =
                format!("Found {n} models where ids {} are violated", id_list(&query.forbidden));
        }
        (0, false) if result.applicable_required.is_empty() => {
            result.status = PartitionStatus::Violated;
            result.status_reason = "No model of this partition matches".to_string();
        }
        (0, false) => {
            result.status = PartitionStatus::Violated;
            result.status_reason = format!(
                "Required ids {} missing from applicable partition",
                id_list(&result.applicable_required)
            );
        }
        (n, false) => {
            result.status = PartitionStatus::Fulfilled;
            result.status_reason = format!("Found {n} matching models");
        }
    }
    result
}

/// Run `query` against every partition and aggregate.
pub fn query_partitions(partitions: &[DomainPartition], query: &PathQuery) -> PartitionedQuery {
    let results: Vec<PartitionResult> = partitions.iter().map(|p| query_one(p, query)).collect();
    for r in &results {
        debug!("partition {}: {} ({} matches)", r.name, r.status, r.match_count);
    }

    let violation_style = query.is_violation_style();
    let contributing: Vec<&PartitionResult> = results
        .iter()
        .filter(|r| {
            if violation_style {
                r.status == PartitionStatus::Violated && r.match_count > 0
            } else {
                r.status == PartitionStatus::Fulfilled
            }
        })
        .collect();

    let aggregated_matches = contributing.iter().map(|r| r.match_count).sum();
    let mut aggregated_necessary_ids = BTreeSet::new();
    let mut iter = contributing.iter();
    if let Some(first) = iter.next() {
        aggregated_necessary_ids = first.necessary_ids.clone();
        for r in iter {
            aggregated_necessary_ids.retain(|id| r.necessary_ids.contains(id));
        }
    }

    let critical_partitions = results
        .iter()
        .filter(|r| r.critical)
        .map(|r| r.name.clone())
        .collect();

    PartitionedQuery {
        query: query.clone(),
        results,
        aggregated_matches,
        aggregated_necessary_ids,
        critical_partitions,
    }
}

/// Which side(s) of a predicate a responsibility analysis covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibilityMode {
    Fulfills,
    Violates,
    #[default]
    Both,
}

impl ResponsibilityMode {
    fn includes_fulfills(self) -> bool {
        matches!(self, ResponsibilityMode::Fulfills | ResponsibilityMode::Both)
    }

    fn includes_violates(self) -> bool {
        matches!(self, ResponsibilityMode::Violates | ResponsibilityMode::Both)
    }
}

impl FromStr for ResponsibilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fulfills" => Ok(ResponsibilityMode::Fulfills),
            "violates" => Ok(ResponsibilityMode::Violates),
            "both" => Ok(ResponsibilityMode::Both),
            other => Err(format!(
                "unknown mode '{other}' (expected fulfills, violates or both)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartitionConsequence {
    pub partition: String,
    pub status: PartitionStatus,
    pub match_count: usize,
    /// Necessary ids of the partition, target excluded.
    pub consequences: BTreeSet<PredicateId>,
    pub critical: bool,
}

/// One side (fulfilling or violating) of a responsibility analysis.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsibilitySide {
    pub query: PathQuery,
    pub partitions: Vec<PartitionConsequence>,
    pub aggregated_consequences: BTreeSet<PredicateId>,
    pub critical_partitions: Vec<String>,
}

impl ResponsibilitySide {
    fn from_query(outcome: PartitionedQuery, target: PredicateId) -> Self {
        let partitions = outcome
            .results
            .into_iter()
            .map(|r| {
                let mut consequences = r.necessary_ids;
                consequences.remove(&target);
                PartitionConsequence {
                    partition: r.name,
                    status: r.status,
                    match_count: r.match_count,
                    consequences,
                    critical: r.critical,
                }
            })
            .collect();
        let mut aggregated_consequences = outcome.aggregated_necessary_ids;
        aggregated_consequences.remove(&target);
        ResponsibilitySide {
            query: outcome.query,
            partitions,
            aggregated_consequences,
            critical_partitions: outcome.critical_partitions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponsibilityReport {
    pub target: PredicateId,
    pub label: String,
    pub mode: ResponsibilityMode,
    pub fulfills: Option<ResponsibilitySide>,
    pub violates: Option<ResponsibilitySide>,
}

/// What follows, per partition, from fulfilling and/or violating `target`.
pub fn analyze_responsibility(
    catalog: &PredicateCatalog,
    partitions: &[DomainPartition],
    target: PredicateId,
    mode: ResponsibilityMode,
) -> Result<ResponsibilityReport, AnalysisError> {
    let predicate = catalog
        .get(target)
        .ok_or(AnalysisError::PredicateNotFound { id: target })?;

    let fulfills = mode.includes_fulfills().then(|| {
        let outcome = query_partitions(partitions, &PathQuery::requiring(target));
        ResponsibilitySide::from_query(outcome, target)
    });
    let violates = mode.includes_violates().then(|| {
        let outcome = query_partitions(partitions, &PathQuery::forbidding(target));
        ResponsibilitySide::from_query(outcome, target)
    });

    Ok(ResponsibilityReport {
        target,
        label: predicate.full_expression.clone(),
        mode,
        fulfills,
        violates,
    })
}
