//! Team-semantics metrics over a model set.
//!
//! All metrics are computed on demand from the borrowed team; nothing is
//! cached between calls.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use norma_model::{PredicateCatalog, PredicateId, Team};
use serde::Serialize;
use tracing::warn;

/// Ids present in every model of `team` (empty for the empty team).
pub fn core_elements(team: &Team) -> BTreeSet<PredicateId> {
    team.intersection()
}

/// Metric queries over one team.
#[derive(Debug, Clone, Copy)]
pub struct TeamMetrics<'a> {
    team: &'a Team,
}

impl<'a> TeamMetrics<'a> {
    pub fn new(team: &'a Team) -> Self {
        TeamMetrics { team }
    }

    pub fn team(&self) -> &'a Team {
        self.team
    }

    /// Fraction of models containing `id`.
    pub fn support(&self, id: PredicateId) -> f64 {
        if self.team.is_empty() {
            return 0.0;
        }
        let hits = self.team.iter().filter(|m| m.contains(id)).count();
        hits as f64 / self.team.len() as f64
    }

    pub fn core_elements(&self) -> BTreeSet<PredicateId> {
        core_elements(self.team)
    }

    /// `id` occurs in every model. False for the empty team.
    pub fn essential(&self, id: PredicateId) -> bool {
        !self.team.is_empty() && self.team.iter().all(|m| m.contains(id))
    }

    /// Size of the smallest model containing `id`, 0 if none does.
    pub fn fragility(&self, id: PredicateId) -> usize {
        self.team
            .iter()
            .filter(|m| m.contains(id))
            .map(|m| m.len())
            .min()
            .unwrap_or(0)
    }

    /// Size of the largest model containing `id`, 0 if none does.
    pub fn robustness(&self, id: PredicateId) -> usize {
        self.team
            .iter()
            .filter(|m| m.contains(id))
            .map(|m| m.len())
            .max()
            .unwrap_or(0)
    }

    /// How many models collapse into another once `id` is erased:
    /// `|team|` minus the number of distinct models with `id` removed.
    pub fn dependency(&self, id: PredicateId) -> usize {
        let distinct: HashSet<Vec<PredicateId>> =
            self.team.iter().map(|m| m.without(id)).collect();
        self.team.len() - distinct.len()
    }

    pub fn leverage(&self, id: PredicateId) -> f64 {
        if self.team.is_empty() {
            return 0.0;
        }
        self.dependency(id) as f64 / self.team.len() as f64
    }

    pub fn criticality(&self, id: PredicateId) -> f64 {
        self.fragility(id) as f64 * self.leverage(id)
    }

    /// Every metric for `id` at once.
    pub fn variable(&self, id: PredicateId, label: impl Into<String>) -> VariableMetrics {
        let fragility = self.fragility(id);
        let dependency = self.dependency(id);
        let leverage = if self.team.is_empty() {
            0.0
        } else {
            dependency as f64 / self.team.len() as f64
        };
        VariableMetrics {
            id,
            label: label.into(),
            support: self.support(id),
            fragility,
            robustness: self.robustness(id),
            dependency,
            leverage,
            criticality: fragility as f64 * leverage,
            essential: self.essential(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableMetrics {
    pub id: PredicateId,
    pub label: String,
    pub support: f64,
    pub fragility: usize,
    pub robustness: usize,
    pub dependency: usize,
    pub leverage: f64,
    pub criticality: f64,
    pub essential: bool,
}

/// Descending criticality, ties by ascending id.
pub(crate) fn by_criticality(a: &VariableMetrics, b: &VariableMetrics) -> Ordering {
    b.criticality
        .total_cmp(&a.criticality)
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamAnalysis {
    pub label: String,
    pub team_size: usize,
    pub total_variables: usize,
    pub core_elements: Vec<PredicateId>,
    /// Every observed id, most critical first.
    pub variables: Vec<VariableMetrics>,
    pub message: Option<String>,
}

impl TeamAnalysis {
    pub fn variable(&self, id: PredicateId) -> Option<&VariableMetrics> {
        self.variables.iter().find(|v| v.id == id)
    }
}

impl fmt::Display for TeamAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Team: {}", self.label)?;
        writeln!(f, "Size: {} models", self.team_size)?;
        writeln!(f, "Variables: {}", self.total_variables)?;
        if let Some(message) = &self.message {
            return write!(f, "{message}");
        }
        if self.core_elements.is_empty() {
            writeln!(f, "No core elements")?;
        } else {
            writeln!(f, "Core elements: {:?}", self.core_elements)?;
        }
        for v in &self.variables {
            writeln!(f, "  ID {}: {}", v.id, v.label)?;
            writeln!(
                f,
                "    support {:.3} | fragility {} | robustness {} | criticality {:.3}",
                v.support, v.fragility, v.robustness, v.criticality
            )?;
            writeln!(
                f,
                "    dependency {} | leverage {:.3} | essential {}",
                v.dependency, v.leverage, v.essential
            )?;
        }
        Ok(())
    }
}

/// Compute every metric for every id observed in `team`.
pub fn analyze_team(catalog: &PredicateCatalog, team: &Team, label: &str) -> TeamAnalysis {
    if team.is_empty() {
        return TeamAnalysis {
            label: label.to_string(),
            team_size: 0,
            total_variables: 0,
            core_elements: Vec::new(),
            variables: Vec::new(),
            message: Some("Empty team".to_string()),
        };
    }

    let unknown = catalog.unknown_ids(team);
    if !unknown.is_empty() {
        warn!("team '{label}' references {} unknown id(s): {unknown:?}", unknown.len());
    }

    let metrics = TeamMetrics::new(team);
    let mut variables: Vec<VariableMetrics> = team
        .observed_ids()
        .into_iter()
        .map(|id| metrics.variable(id, catalog.label(id)))
        .collect();
    variables.sort_by(by_criticality);

    TeamAnalysis {
        label: label.to_string(),
        team_size: team.len(),
        total_variables: variables.len(),
        core_elements: metrics.core_elements().into_iter().collect(),
        variables,
        message: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// Risk of losing a variable, from its criticality.
    pub fn risk(criticality: f64) -> Self {
        if criticality > 0.5 {
            Level::High
        } else if criticality > 0.2 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    /// Evidence needed to attack a variable: small supporting models are
    /// easier to break.
    pub fn evidence_need(fragility: usize) -> Self {
        if fragility <= 2 {
            Level::High
        } else if fragility <= 4 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "HIGH",
            Level::Medium => "MEDIUM",
            Level::Low => "LOW",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Vulnerability {
    pub id: PredicateId,
    pub label: String,
    pub risk: Level,
    pub criticality: f64,
    /// Models eliminated if the variable is lost.
    pub dependency: usize,
    pub evidence_need: Level,
    pub fragility: usize,
    pub support: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VulnerabilityScan {
    pub team_size: usize,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Every variable with HIGH risk, most critical first.
    pub high_risk_ids: Vec<PredicateId>,
}

/// The `limit` most critical variables of an analysed team.
pub fn vulnerability_scan(analysis: &TeamAnalysis, limit: usize) -> VulnerabilityScan {
    let vulnerabilities = analysis
        .variables
        .iter()
        .take(limit)
        .map(|v| Vulnerability {
            id: v.id,
            label: v.label.clone(),
            risk: Level::risk(v.criticality),
            criticality: v.criticality,
            dependency: v.dependency,
            evidence_need: Level::evidence_need(v.fragility),
            fragility: v.fragility,
            support: v.support,
        })
        .collect();
    let high_risk_ids = analysis
        .variables
        .iter()
        .filter(|v| Level::risk(v.criticality) == Level::High)
        .map(|v| v.id)
        .collect();
    VulnerabilityScan {
        team_size: analysis.team_size,
        vulnerabilities,
        high_risk_ids,
    }
}
