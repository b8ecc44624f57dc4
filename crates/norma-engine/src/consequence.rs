//! Fulfillment / violation consequence analysis.
//!
//! Given a target predicate, the team is split into the models where the
//! target holds (fulfillment scenarios) and the rest (violation scenarios).
//! Within the chosen scenario set, every other catalog predicate is either
//! present in all scenarios, absent from all of them, or neither. Only the
//! first two are consequences.

use std::collections::BTreeSet;
use std::fmt;

use norma_model::{
    Artifact, Model, Predicate, PredicateCatalog, PredicateId, PredicateKind, Team,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AnalysisError;

/// Which side of the target's split a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Fulfillment,
    Violation,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Fulfillment => "fulfillment",
            QueryKind::Violation => "violation",
        }
    }

}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AlwaysPresent,
    AlwaysAbsent,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::AlwaysPresent => "always_present",
            Classification::AlwaysAbsent => "always_absent",
        }
    }
}

/// Identity of the predicate a report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetPredicate {
    pub id: PredicateId,
    pub name: String,
    pub full_expression: String,
    pub kind: PredicateKind,
}

/// A predicate that is always present or always absent in the scenario set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consequence {
    pub predicate_id: PredicateId,
    pub name: String,
    pub full_expression: String,
    pub kind: PredicateKind,
    pub classification: Classification,
    /// Number of scenarios containing the predicate.
    pub count: usize,
    /// Size of the scenario set.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsequenceReport {
    pub target: TargetPredicate,
    pub query: QueryKind,
    pub total_fulfillment_scenarios: usize,
    pub total_violation_scenarios: usize,
    /// Ascending by predicate id.
    pub consequences: Vec<Consequence>,
    pub always_present_count: usize,
    pub always_absent_count: usize,
    /// Set when the scenario set is empty.
    pub message: Option<String>,
    /// Ids found in scenario models that the catalog does not define.
    pub unknown_ids: Vec<PredicateId>,
}

impl ConsequenceReport {
    /// Size of the scenario set this report classifies over.
    pub fn scenario_total(&self) -> usize {
        match self.query {
            QueryKind::Fulfillment => self.total_fulfillment_scenarios,
            QueryKind::Violation => self.total_violation_scenarios,
        }
    }

    pub fn always_present(&self) -> impl Iterator<Item = &Consequence> {
        self.consequences
            .iter()
            .filter(|c| c.classification == Classification::AlwaysPresent)
    }

    pub fn always_absent(&self) -> impl Iterator<Item = &Consequence> {
        self.consequences
            .iter()
            .filter(|c| c.classification == Classification::AlwaysAbsent)
    }
}

impl fmt::Display for ConsequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} analysis for '{}' (ID {}):",
            capitalize(self.query.as_str()),
            self.target.name,
            self.target.id
        )?;
        writeln!(f, "  Fulfillment scenarios: {}", self.total_fulfillment_scenarios)?;
        writeln!(f, "  Violation scenarios: {}", self.total_violation_scenarios)?;
        if let Some(message) = &self.message {
            return write!(f, "  {message}");
        }
        let total = self.scenario_total();
        writeln!(f, "  Always present ({}):", self.always_present_count)?;
        for c in self.always_present() {
            writeln!(f, "    ID {}: {} ({}/{total})", c.predicate_id, c.full_expression, c.count)?;
        }
        writeln!(f, "  Always absent ({}):", self.always_absent_count)?;
        for c in self.always_absent() {
            writeln!(f, "    ID {}: {} ({}/{total})", c.predicate_id, c.full_expression, c.count)?;
        }
        if !self.unknown_ids.is_empty() {
            writeln!(f, "  Unknown ids in scenarios: {:?}", self.unknown_ids)?;
        }
        write!(f, "  Total consequences: {}", self.consequences.len())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A model together with its position in the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedModel {
    pub index: usize,
    pub model: Model,
}

/// The first few fulfillment and violation scenarios of a target.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSamples {
    pub target: PredicateId,
    pub fulfillment: Vec<IndexedModel>,
    pub violation: Vec<IndexedModel>,
}

/// Consequence queries over one catalog and team.
pub struct ConsequenceAnalyzer<'a> {
    catalog: &'a PredicateCatalog,
    team: &'a Team,
}

impl<'a> ConsequenceAnalyzer<'a> {
    pub fn new(catalog: &'a PredicateCatalog, team: &'a Team) -> Self {
        ConsequenceAnalyzer { catalog, team }
    }

    /// Resolve a predicate name to its id.
    pub fn resolve_name(&self, name: &str) -> Result<PredicateId, AnalysisError> {
        self.catalog
            .find_by_name(name)
            .map(|p| p.id)
            .ok_or_else(|| AnalysisError::PredicateNameNotFound {
                name: name.to_string(),
            })
    }

    pub fn analyze_fulfillment(&self, target: PredicateId) -> Result<ConsequenceReport, AnalysisError> {
        self.analyze(target, QueryKind::Fulfillment)
    }

    pub fn analyze_violation(&self, target: PredicateId) -> Result<ConsequenceReport, AnalysisError> {
        self.analyze(target, QueryKind::Violation)
    }

    pub fn analyze(
        &self,
        target: PredicateId,
        query: QueryKind,
    ) -> Result<ConsequenceReport, AnalysisError> {
        let predicate = self
            .catalog
            .get(target)
            .ok_or(AnalysisError::PredicateNotFound { id: target })?;
        Ok(self.analyze_predicate(predicate, query))
    }

    /// [`analyze`](Self::analyze) for a predicate already taken from the
    /// catalog.
    pub fn analyze_predicate(&self, predicate: &Predicate, query: QueryKind) -> ConsequenceReport {
        let target = predicate.id;
        let target_info = TargetPredicate {
            id: predicate.id,
            name: predicate.name.clone(),
            full_expression: predicate.full_expression.clone(),
            kind: predicate.kind,
        };

        let (fulfilled, violated) = self.team.partition_by(target);
        let scenarios = match query {
            QueryKind::Fulfillment => &fulfilled,
            QueryKind::Violation => &violated,
        };
        let total = scenarios.len();
        let counts = scenarios.occurrence_counts();

        debug!(
            "target {target}: {} fulfillment / {} violation scenarios ({query})",
            fulfilled.len(),
            violated.len()
        );

        if total == 0 {
            let message = match query {
                QueryKind::Fulfillment => {
                    format!("Predicate '{}' is never fulfilled", target_info.name)
                }
                QueryKind::Violation => {
                    format!("Predicate '{}' is present in all solutions", target_info.name)
                }
            };
            return ConsequenceReport {
                target: target_info,
                query,
                total_fulfillment_scenarios: fulfilled.len(),
                total_violation_scenarios: violated.len(),
                consequences: Vec::new(),
                always_present_count: 0,
                always_absent_count: 0,
                message: Some(message),
                unknown_ids: Vec::new(),
            };
        }

        let unknown_ids: Vec<PredicateId> = counts
            .keys()
            .copied()
            .filter(|id| !self.catalog.contains(*id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !unknown_ids.is_empty() {
            warn!(
                "{} id(s) in {query} scenarios of predicate {target} are missing from the catalog: {:?}",
                unknown_ids.len(),
                unknown_ids
            );
        }

        let mut consequences = Vec::new();
        for other in self.catalog.iter().filter(|p| p.id != target) {
            let count = counts.get(&other.id).copied().unwrap_or(0);
            let classification = if count == total {
                Classification::AlwaysPresent
            } else if count == 0 {
                Classification::AlwaysAbsent
            } else {
                continue;
            };
            consequences.push(Consequence {
                predicate_id: other.id,
                name: other.name.clone(),
                full_expression: other.full_expression.clone(),
                kind: other.kind,
                classification,
                count,
                total,
            });
        }

        let always_present_count = consequences
            .iter()
            .filter(|c| c.classification == Classification::AlwaysPresent)
            .count();
        let always_absent_count = consequences.len() - always_present_count;

        ConsequenceReport {
            target: target_info,
            query,
            total_fulfillment_scenarios: fulfilled.len(),
            total_violation_scenarios: violated.len(),
            consequences,
            always_present_count,
            always_absent_count,
            message: None,
            unknown_ids,
        }
    }

    /// The first `limit` fulfillment and violation models of `target`.
    pub fn scenario_samples(
        &self,
        target: PredicateId,
        limit: usize,
    ) -> Result<ScenarioSamples, AnalysisError> {
        if !self.catalog.contains(target) {
            return Err(AnalysisError::PredicateNotFound { id: target });
        }
        let mut samples = ScenarioSamples {
            target,
            fulfillment: Vec::new(),
            violation: Vec::new(),
        };
        for (index, model) in self.team.iter().enumerate() {
            let bucket = if model.contains(target) {
                &mut samples.fulfillment
            } else {
                &mut samples.violation
            };
            if bucket.len() < limit {
                bucket.push(IndexedModel {
                    index,
                    model: model.clone(),
                });
            }
            if samples.fulfillment.len() >= limit && samples.violation.len() >= limit {
                break;
            }
        }
        Ok(samples)
    }
}

/// Consequences of fulfilling `target` across `team`.
pub fn analyze_fulfillment(
    catalog: &PredicateCatalog,
    team: &Team,
    target: PredicateId,
) -> Result<ConsequenceReport, AnalysisError> {
    ConsequenceAnalyzer::new(catalog, team).analyze_fulfillment(target)
}

/// Consequences of violating `target` across `team`.
pub fn analyze_violation(
    catalog: &PredicateCatalog,
    team: &Team,
    target: PredicateId,
) -> Result<ConsequenceReport, AnalysisError> {
    ConsequenceAnalyzer::new(catalog, team).analyze_violation(target)
}

/// Both analyses for every predicate of an artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactAnalysis {
    pub total_solutions: usize,
    pub num_predicates: usize,
    pub satisfiable: bool,
    pub predicates: Vec<String>,
    pub violation_results: Vec<ConsequenceReport>,
    pub fulfillment_results: Vec<ConsequenceReport>,
}

pub fn analyze_artifact(artifact: &Artifact) -> ArtifactAnalysis {
    let analyzer = ConsequenceAnalyzer::new(&artifact.catalog, &artifact.team);
    let mut violation_results = Vec::with_capacity(artifact.catalog.len());
    let mut fulfillment_results = Vec::with_capacity(artifact.catalog.len());
    for predicate in artifact.catalog.iter() {
        violation_results.push(analyzer.analyze_predicate(predicate, QueryKind::Violation));
        fulfillment_results.push(analyzer.analyze_predicate(predicate, QueryKind::Fulfillment));
    }
    ArtifactAnalysis {
        total_solutions: artifact.team.len(),
        num_predicates: artifact.catalog.len(),
        satisfiable: artifact.satisfiable,
        predicates: artifact.catalog.iter().map(|p| p.name.clone()).collect(),
        violation_results,
        fulfillment_results,
    }
}
