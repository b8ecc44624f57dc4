// Command handlers for: AnalyzeTeam, CompareTeams, VulnerabilityScan, SimulateAttack

use norma_engine::{
    analyze_team, simulate_attack, strategy, vulnerability_scan, Advantage, AnalysisOptions,
};

use super::helpers::{
    emit, labelled_ids, load_artifact, resolve_predicate, select, team_query, OutputFormat,
};
use crate::cli::ArtifactArgs;

pub(crate) fn run_analyze_team(
    args: &ArtifactArgs,
    required: &str,
    forbidden: Option<&str>,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let query = team_query(required, forbidden)?;
    let artifact = load_artifact(args)?;
    let team = select(&artifact, &query, options);
    let analysis = analyze_team(&artifact.catalog, &team, &query.to_string());
    emit(format, &analysis, |a| a.to_string())
}

pub(crate) fn run_compare_teams(
    args: &ArtifactArgs,
    claimant: &str,
    respondent: &str,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let claimant_query = team_query(claimant, None)?;
    let respondent_query = team_query(respondent, None)?;
    let artifact = load_artifact(args)?;
    let claimant_team = select(&artifact, &claimant_query, options);
    let respondent_team = select(&artifact, &respondent_query, options);
    if claimant_team.is_empty() || respondent_team.is_empty() {
        tracing::warn!("one or both teams have no matching models");
    }
    let report = strategy(&artifact.catalog, &claimant_team, &respondent_team, options);
    let catalog = &artifact.catalog;

    emit(format, &report, |r| {
        let advantage = match r.advantage {
            Advantage::Claimant => "CLAIMANT",
            Advantage::Respondent => "RESPONDENT",
            Advantage::Balanced => "BALANCED",
        };
        let mut out = format!(
            "Claimant {claimant_query}: {} models\nRespondent {respondent_query}: {} models\nAdvantage: {advantage}\n",
            r.claimant.team_size, r.respondent.team_size
        );
        out.push_str("\nAttack targets (respondent):\n");
        for (i, t) in r.attack_targets.iter().enumerate() {
            out.push_str(&format!(
                "  {}. ID {}: {}\n     priority {:.3} | eliminates {} | fragility {} | criticality {:.3}\n",
                i + 1,
                t.id,
                t.label,
                t.priority,
                t.dependency,
                t.fragility,
                t.criticality
            ));
        }
        if !r.must_establish.is_empty() {
            out.push_str("\nMust establish (claimant core):\n");
            out.push_str(&labelled_ids(catalog, &r.must_establish, "  "));
        }
        if !r.vulnerabilities.is_empty() {
            out.push_str("\nClaimant vulnerabilities:\n");
            for v in &r.vulnerabilities {
                out.push_str(&format!(
                    "  ID {}: {}\n    criticality {:.3} | impact if lost {}\n",
                    v.id, v.label, v.criticality, v.dependency
                ));
            }
        }
        out.push_str(&format!(
            "\nContested: {} overlapping models\nDefense: {} models unique to the claimant\n",
            r.contested_models, r.defense_models
        ));
        out.push_str("\nResource allocation:\n");
        for a in &r.resource_allocation {
            if a.items > 0 {
                out.push_str(&format!("  {}: {}% ({} items)\n", a.area, a.percent, a.items));
            } else {
                out.push_str(&format!("  {}: {}%\n", a.area, a.percent));
            }
        }
        out
    })
}

pub(crate) fn run_vulnerability_scan(
    args: &ArtifactArgs,
    team: &str,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let query = team_query(team, None)?;
    let artifact = load_artifact(args)?;
    let selected = select(&artifact, &query, options);
    let analysis = analyze_team(&artifact.catalog, &selected, &query.to_string());
    let scan = vulnerability_scan(&analysis, options.vulnerability_scan_size);
    let catalog = &artifact.catalog;

    emit(format, &scan, |s| {
        let mut out = format!("Team size: {} models\nTop vulnerabilities:\n", s.team_size);
        for (i, v) in s.vulnerabilities.iter().enumerate() {
            out.push_str(&format!(
                "  {}. ID {}: {}\n     risk {} | criticality {:.3} | eliminates {}\n     evidence needed {} (complexity {}) | support {:.1}%\n",
                i + 1,
                v.id,
                v.label,
                v.risk,
                v.criticality,
                v.dependency,
                v.evidence_need,
                v.fragility,
                v.support * 100.0
            ));
        }
        if !s.high_risk_ids.is_empty() {
            out.push_str(&format!(
                "Strengthen evidence for {} high-risk ids:\n",
                s.high_risk_ids.len()
            ));
            out.push_str(&labelled_ids(catalog, s.high_risk_ids.iter().take(3), "  "));
        }
        out
    })
}

pub(crate) fn run_simulate_attack(
    args: &ArtifactArgs,
    team: &str,
    target: &str,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let query = team_query(team, None)?;
    let artifact = load_artifact(args)?;
    let target = match target.trim().parse::<u32>() {
        Ok(id) => id,
        Err(_) => resolve_predicate(&artifact, target)?,
    };
    let selected = select(&artifact, &query, options);
    let sim = simulate_attack(&artifact.catalog, &selected, target, options.sample_size);
    let catalog = &artifact.catalog;

    emit(format, &sim, |s| {
        let mut out = format!(
            "Target: ID {} ({})\nImpact: {} of {} models eliminated ({:.1}%)\n",
            s.target, s.label, s.eliminated, s.original_size, s.impact_percentage
        );
        if s.total_collapse {
            out.push_str("Result: total collapse, no model survives\n");
            return out;
        }
        out.push_str(&format!("Result: team reduced to {} models\n", s.remaining_size));
        match &s.new_core {
            Some(core) if !core.is_empty() => {
                out.push_str("New core:\n");
                out.push_str(&labelled_ids(catalog, core, "  "));
            }
            _ => out.push_str("No core remains\n"),
        }
        for model in &s.remaining_sample {
            out.push_str(&format!("  {model}\n"));
        }
        out
    })
}
