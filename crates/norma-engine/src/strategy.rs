//! Two-team algebra, argument strategy and attack simulation.
//!
//! The first team of a comparison is the claimant, the second the
//! respondent. Attack targets are respondent variables whose loss eliminates
//! the most respondent models; vulnerabilities are the claimant's own.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use norma_model::{Model, PredicateCatalog, PredicateId, Team};
use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;
use crate::metrics::{analyze_team, core_elements, TeamAnalysis};
use crate::options::AnalysisOptions;

/// Result of a successful [`split`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub id1: PredicateId,
    pub id2: PredicateId,
    /// Union of the models containing `id1`.
    pub y: BTreeSet<PredicateId>,
    /// Union of the models containing `id2`.
    pub z: BTreeSet<PredicateId>,
    pub processed: usize,
}

/// Split the team on two ids. Every model must contain at least one of them.
pub fn split(team: &Team, id1: PredicateId, id2: PredicateId) -> Result<Split, AnalysisError> {
    let mut y = BTreeSet::new();
    let mut z = BTreeSet::new();
    for (index, model) in team.iter().enumerate() {
        let has1 = model.contains(id1);
        let has2 = model.contains(id2);
        if !has1 && !has2 {
            return Err(AnalysisError::UndefinedSplit {
                id1,
                id2,
                index,
                model: model.clone(),
            });
        }
        if has1 {
            y.extend(model.iter());
        }
        if has2 {
            z.extend(model.iter());
        }
    }
    Ok(Split {
        id1,
        id2,
        y,
        z,
        processed: team.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub id1_present: bool,
    pub id2_present: bool,
    pub count: usize,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |present: bool| if present { "present" } else { "absent" };
        write!(f, "({}, {})", state(self.id1_present), state(self.id2_present))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndependenceTest {
    pub id1: PredicateId,
    pub id2: PredicateId,
    pub processed: usize,
    /// All four presence combinations, `(true, true)` first.
    pub combinations: [Combination; 4],
    pub independent: bool,
    pub missing: Vec<Combination>,
}

/// Count the four presence combinations of `id1` and `id2`.
pub fn independence_test(team: &Team, id1: PredicateId, id2: PredicateId) -> IndependenceTest {
    let mut combinations = [(true, true), (true, false), (false, true), (false, false)].map(
        |(id1_present, id2_present)| Combination {
            id1_present,
            id2_present,
            count: 0,
        },
    );
    for model in team {
        let slot = match (model.contains(id1), model.contains(id2)) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        combinations[slot].count += 1;
    }
    let missing: Vec<Combination> = combinations.iter().copied().filter(|c| c.count == 0).collect();
    IndependenceTest {
        id1,
        id2,
        processed: team.len(),
        combinations,
        independent: missing.is_empty(),
        missing,
    }
}

fn model_counts(team: &Team) -> HashMap<&Model, usize> {
    let mut counts = HashMap::new();
    for model in team {
        *counts.entry(model).or_insert(0) += 1;
    }
    counts
}

/// Multiset intersection, in `a`'s order.
pub fn attack_surface(a: &Team, b: &Team) -> Team {
    let mut remaining = model_counts(b);
    a.iter()
        .filter(|m| match remaining.get_mut(*m) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .cloned()
        .collect()
}

/// Multiset difference `a - b`, in `a`'s order.
pub fn defense_space(a: &Team, b: &Team) -> Team {
    let mut remaining = model_counts(b);
    a.iter()
        .filter(|m| match remaining.get_mut(*m) {
            Some(n) if *n > 0 => {
                *n -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

/// `a` followed by the models of `b` not already present.
pub fn team_union(a: &Team, b: &Team) -> Team {
    let mut seen: HashSet<&Model> = a.iter().collect();
    let mut union = a.clone();
    for model in b {
        if seen.insert(model) {
            union.push(model.clone());
        }
    }
    union
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advantage {
    Claimant,
    Respondent,
    Balanced,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttackTarget {
    pub id: PredicateId,
    pub label: String,
    pub criticality: f64,
    pub dependency: usize,
    pub fragility: usize,
    pub priority: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnVulnerability {
    pub id: PredicateId,
    pub label: String,
    pub criticality: f64,
    pub dependency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub area: String,
    pub percent: u8,
    pub items: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub claimant: TeamAnalysis,
    pub respondent: TeamAnalysis,
    pub attack_targets: Vec<AttackTarget>,
    pub must_establish: Vec<PredicateId>,
    pub vulnerabilities: Vec<OwnVulnerability>,
    pub contested_models: usize,
    pub defense_models: usize,
    pub advantage: Advantage,
    pub resource_allocation: Vec<Allocation>,
}

/// Attack targets a resource plan budgets for.
const ALLOCATED_ATTACK_TARGETS: usize = 3;

fn resource_allocation(core: usize, targets: usize) -> Vec<Allocation> {
    let targets = targets.min(ALLOCATED_ATTACK_TARGETS);
    let mut plan = Vec::with_capacity(4);
    if core > 0 {
        plan.push(Allocation {
            area: "core elements".to_string(),
            percent: 40,
            items: core,
        });
    }
    if targets > 0 {
        plan.push(Allocation {
            area: "attack targets".to_string(),
            percent: 30,
            items: targets,
        });
    }
    plan.push(Allocation {
        area: "defense/support".to_string(),
        percent: 20,
        items: 0,
    });
    plan.push(Allocation {
        area: "contingency".to_string(),
        percent: 10,
        items: 0,
    });
    plan
}

/// Argument strategy for `claimant` against `respondent`.
pub fn strategy(
    catalog: &PredicateCatalog,
    claimant: &Team,
    respondent: &Team,
    options: &AnalysisOptions,
) -> StrategyReport {
    let claimant_analysis = analyze_team(catalog, claimant, "claimant");
    let respondent_analysis = analyze_team(catalog, respondent, "respondent");

    let mut attack_targets: Vec<AttackTarget> = respondent_analysis
        .variables
        .iter()
        .filter(|v| v.criticality > 0.0)
        .map(|v| AttackTarget {
            id: v.id,
            label: v.label.clone(),
            criticality: v.criticality,
            dependency: v.dependency,
            fragility: v.fragility,
            priority: v.criticality + 0.5 * v.dependency as f64,
        })
        .collect();
    attack_targets.sort_by(|a, b| b.priority.total_cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
    attack_targets.truncate(options.top_attack_targets);

    // Variables are already ranked by criticality.
    let vulnerabilities: Vec<OwnVulnerability> = claimant_analysis
        .variables
        .iter()
        .filter(|v| v.criticality > 0.0)
        .take(options.top_vulnerabilities)
        .map(|v| OwnVulnerability {
            id: v.id,
            label: v.label.clone(),
            criticality: v.criticality,
            dependency: v.dependency,
        })
        .collect();

    let must_establish: Vec<PredicateId> = core_elements(claimant).into_iter().collect();
    let contested_models = attack_surface(claimant, respondent).len();
    let defense_models = defense_space(claimant, respondent).len();
    let advantage = match claimant.len().cmp(&respondent.len()) {
        std::cmp::Ordering::Greater => Advantage::Claimant,
        std::cmp::Ordering::Less => Advantage::Respondent,
        std::cmp::Ordering::Equal => Advantage::Balanced,
    };
    debug!(
        "strategy: {} attack target(s), {contested_models} contested, {defense_models} defense",
        attack_targets.len()
    );

    StrategyReport {
        resource_allocation: resource_allocation(must_establish.len(), attack_targets.len()),
        claimant: claimant_analysis,
        respondent: respondent_analysis,
        attack_targets,
        must_establish,
        vulnerabilities,
        contested_models,
        defense_models,
        advantage,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttackSimulation {
    pub target: PredicateId,
    pub label: String,
    pub original_size: usize,
    pub remaining_size: usize,
    pub eliminated: usize,
    pub impact_percentage: f64,
    /// The first surviving models.
    pub remaining_sample: Vec<Model>,
    /// Core of the surviving models; `None` after a total collapse.
    pub new_core: Option<Vec<PredicateId>>,
    pub total_collapse: bool,
}

/// Remove every model containing `target` and measure the damage.
pub fn simulate_attack(
    catalog: &PredicateCatalog,
    team: &Team,
    target: PredicateId,
    sample_size: usize,
) -> AttackSimulation {
    let remaining = team.filter(|m| !m.contains(target));
    let original_size = team.len();
    let remaining_size = remaining.len();
    let eliminated = original_size - remaining_size;
    let impact_percentage = if original_size == 0 {
        0.0
    } else {
        eliminated as f64 / original_size as f64 * 100.0
    };
    let total_collapse = remaining.is_empty();
    let new_core = (!total_collapse).then(|| core_elements(&remaining).into_iter().collect());

    AttackSimulation {
        target,
        label: catalog.label(target).into_owned(),
        original_size,
        remaining_size,
        eliminated,
        impact_percentage,
        remaining_sample: remaining.iter().take(sample_size).cloned().collect(),
        new_core,
        total_collapse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_team() -> Team {
        Team::from_models(vec![
            Model::new([1, 2]),
            Model::new([1, 3]),
            Model::new([2, 3]),
            Model::new([1, 2, 3]),
            Model::new([2]),
        ])
    }

    #[test]
    fn test_split_success() {
        let s = split(&worked_team(), 1, 2).unwrap();
        assert_eq!(s.y.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(s.z.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(s.processed, 5);
    }

    #[test]
    fn test_split_reports_offending_model() {
        let err = split(&worked_team(), 1, 3).unwrap_err();
        match err {
            AnalysisError::UndefinedSplit { index, model, .. } => {
                assert_eq!(index, 4);
                assert_eq!(model, Model::new([2]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_independence() {
        let team = Team::from_models(vec![
            Model::new([1, 2]),
            Model::new([1]),
            Model::new([2]),
            Model::new([]),
        ]);
        let t = independence_test(&team, 1, 2);
        assert!(t.independent);
        assert!(t.combinations.iter().all(|c| c.count == 1));

        let t = independence_test(&worked_team(), 1, 2);
        assert!(!t.independent);
        assert_eq!(t.missing.len(), 1);
        assert!(!t.missing[0].id1_present && !t.missing[0].id2_present);
    }

    #[test]
    fn test_multiset_surface_and_defense() {
        let a = Team::from_models(vec![Model::new([1]), Model::new([1]), Model::new([2])]);
        let b = Team::from_models(vec![Model::new([1]), Model::new([3])]);
        assert_eq!(attack_surface(&a, &b).models(), &[Model::new([1])]);
        assert_eq!(defense_space(&a, &b).models(), &[Model::new([1]), Model::new([2])]);
    }

    #[test]
    fn test_team_union_appends_new_models_once() {
        let a = Team::from_models(vec![Model::new([1])]);
        let b = Team::from_models(vec![Model::new([2]), Model::new([1]), Model::new([2])]);
        assert_eq!(team_union(&a, &b).models(), &[Model::new([1]), Model::new([2])]);
    }

    #[test]
    fn test_strategy_targets_and_allocation() {
        let claimant = Team::from_models(vec![Model::new([5, 6]), Model::new([5])]);
        let respondent = worked_team();
        let report = strategy(
            &PredicateCatalog::new(),
            &claimant,
            &respondent,
            &AnalysisOptions::default(),
        );
        assert_eq!(report.advantage, Advantage::Respondent);
        assert_eq!(report.must_establish, vec![5]);
        assert!(report.attack_targets.iter().all(|t| t.criticality > 0.0));
        let priorities: Vec<f64> = report.attack_targets.iter().map(|t| t.priority).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.contested_models, 0);
        assert_eq!(report.defense_models, 2);
        let areas: Vec<_> = report.resource_allocation.iter().map(|a| a.percent).collect();
        assert_eq!(areas, vec![40, 30, 20, 10]);
    }

    #[test]
    fn test_allocation_budgets_top_three_targets() {
        let respondent = Team::from_models(vec![
            Model::new([1, 2]),
            Model::new([1]),
            Model::new([3, 4]),
            Model::new([3]),
            Model::new([5, 6]),
            Model::new([5]),
            Model::new([7, 8]),
            Model::new([7]),
        ]);
        let claimant = Team::from_models(vec![Model::new([9])]);
        let report = strategy(
            &PredicateCatalog::new(),
            &claimant,
            &respondent,
            &AnalysisOptions::default(),
        );
        let ids: Vec<_> = report.attack_targets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 6, 8]);
        let attack = report
            .resource_allocation
            .iter()
            .find(|a| a.area == "attack targets")
            .expect("attack targets are budgeted");
        assert_eq!((attack.percent, attack.items), (30, 3));
    }

    #[test]
    fn test_strategy_balanced_without_core() {
        let team = worked_team();
        let report = strategy(&PredicateCatalog::new(), &team, &team, &AnalysisOptions::default());
        assert_eq!(report.advantage, Advantage::Balanced);
        assert_eq!(report.contested_models, 5);
        assert_eq!(report.defense_models, 0);
        assert!(report.must_establish.is_empty());
        assert!(report.resource_allocation.iter().all(|a| a.area != "core elements"));
        assert!(report.vulnerabilities.len() <= 3);
    }

    #[test]
    fn test_simulate_attack() {
        let sim = simulate_attack(&PredicateCatalog::new(), &worked_team(), 2, 5);
        assert_eq!(sim.eliminated, 4);
        assert_eq!(sim.remaining_size, 1);
        assert!((sim.impact_percentage - 80.0).abs() < 1e-9);
        assert_eq!(sim.new_core, Some(vec![1, 3]));
        assert!(!sim.total_collapse);
        assert_eq!(sim.label, "unknown");
    }

    #[test]
    fn test_simulate_total_collapse_and_empty_team() {
        let team = Team::from_models(vec![Model::new([4]), Model::new([4, 5])]);
        let sim = simulate_attack(&PredicateCatalog::new(), &team, 4, 5);
        assert!(sim.total_collapse);
        assert!(sim.new_core.is_none());

        let sim = simulate_attack(&PredicateCatalog::new(), &Team::new(), 4, 5);
        assert_eq!(sim.impact_percentage, 0.0);
        assert_eq!(sim.eliminated, 0);
    }
}
