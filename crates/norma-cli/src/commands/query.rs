// Command handlers for: Query, QuerySubject, Responsibility

use norma_engine::{
    analyze_responsibility, query_partitions, select_team, subject_filter, AnalysisOptions,
    PartitionStatus, PathQuery, ResponsibilityMode, TeamSelection,
};
use norma_engine::partition::ResponsibilitySide;
use norma_model::PredicateCatalog;

use super::helpers::{
    emit, labelled_ids, load_artifact, partitions_of, resolve_predicate, OutputFormat,
};
use crate::cli::ArtifactArgs;

fn render_selection(catalog: &PredicateCatalog, s: &TeamSelection) -> String {
    let mut out = format!("Query {}: {} matching models", s.query, s.match_count());
    if s.truncated {
        out.push_str(" (truncated)");
    }
    out.push('\n');
    for model in s.matches.iter() {
        out.push_str(&format!("  {model}\n"));
    }
    if s.necessary_ids.is_empty() {
        out.push_str("No id is shared by every match\n");
    } else {
        out.push_str("Necessary ids:\n");
        out.push_str(&labelled_ids(catalog, &s.necessary_ids, "  "));
    }
    out
}

pub(crate) fn run_query(
    args: &ArtifactArgs,
    path: &str,
    by_partition: bool,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let query = PathQuery::parse(path)?;
    let artifact = load_artifact(args)?;
    let catalog = &artifact.catalog;

    if !by_partition {
        let selection = select_team(&artifact.team, &query, None, options.max_team_matches);
        return emit(format, &selection, |s| render_selection(catalog, s));
    }

    let outcome = query_partitions(&partitions_of(&artifact), &query);
    emit(format, &outcome, |o| {
        let mut out = format!("Query {} across {} partitions\n", o.query, o.results.len());
        for r in &o.results {
            out.push_str(&format!(
                "\n{} [{}]: {} models - {}\n  Reason: {}\n",
                r.name, r.domain, r.match_count, r.status, r.status_reason
            ));
            if !r.necessary_ids.is_empty() {
                out.push_str("  Necessary ids:\n");
                out.push_str(&labelled_ids(catalog, &r.necessary_ids, "    "));
            }
        }
        out.push_str(&format!("\nAggregated matches: {}\n", o.aggregated_matches));
        if o.aggregated_necessary_ids.is_empty() {
            out.push_str("No id is necessary across partitions\n");
        } else {
            out.push_str("Necessary across partitions:\n");
            out.push_str(&labelled_ids(catalog, &o.aggregated_necessary_ids, "  "));
        }
        let not_applicable: Vec<&str> = o
            .with_status(PartitionStatus::NotApplicable)
            .map(|r| r.name.as_str())
            .collect();
        if !not_applicable.is_empty() {
            out.push_str(&format!("Not applicable: {}\n", not_applicable.join(", ")));
        }
        if !o.critical_partitions.is_empty() {
            out.push_str(&format!("Critical: {}\n", o.critical_partitions.join(", ")));
        }
        out
    })
}

pub(crate) fn run_query_subject(
    args: &ArtifactArgs,
    subject: &str,
    path: Option<&str>,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let query = match path {
        Some(path) => PathQuery::parse(path)?,
        None => PathQuery::default(),
    };
    let artifact = load_artifact(args)?;
    let allowed = subject_filter(&artifact.catalog, subject);
    if allowed.is_empty() {
        tracing::warn!("no predicate takes '{subject}' as an argument");
    }
    let selection = select_team(&artifact.team, &query, Some(&allowed), options.max_team_matches);
    emit(format, &selection, |s| {
        format!(
            "Subject '{subject}' appears in {} predicates\n{}",
            allowed.len(),
            render_selection(&artifact.catalog, s)
        )
    })
}

fn render_side(catalog: &PredicateCatalog, title: &str, side: &ResponsibilitySide) -> String {
    let mut out = format!("{title} {}:\n", side.query);
    for p in &side.partitions {
        out.push_str(&format!(
            "  {}: {} ({} models){}\n",
            p.partition,
            p.status,
            p.match_count,
            if p.critical { " CRITICAL" } else { "" }
        ));
        out.push_str(&labelled_ids(catalog, &p.consequences, "    "));
    }
    if side.aggregated_consequences.is_empty() {
        out.push_str("  No consequence holds across partitions\n");
    } else {
        out.push_str("  Across partitions:\n");
        out.push_str(&labelled_ids(catalog, &side.aggregated_consequences, "    "));
    }
    if !side.critical_partitions.is_empty() {
        out.push_str(&format!(
            "  Void when violated: {}\n",
            side.critical_partitions.join(", ")
        ));
    }
    out
}

pub(crate) fn run_responsibility(
    args: &ArtifactArgs,
    predicate: &str,
    mode: &str,
    format: OutputFormat,
) -> miette::Result<()> {
    let mode: ResponsibilityMode = mode.parse().map_err(|e: String| miette::miette!("{e}"))?;
    let artifact = load_artifact(args)?;
    let target = resolve_predicate(&artifact, predicate)?;
    let report =
        analyze_responsibility(&artifact.catalog, &partitions_of(&artifact), target, mode)?;
    let catalog = &artifact.catalog;
    emit(format, &report, |r| {
        let mut out = format!("Responsibility for ID {}: {}\n", r.target, r.label);
        if let Some(side) = &r.fulfills {
            out.push_str(&render_side(catalog, "If fulfilled", side));
        }
        if let Some(side) = &r.violates {
            out.push_str(&render_side(catalog, "If violated", side));
        }
        out
    })
}
