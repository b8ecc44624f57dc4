// Shared helpers for command handlers: input loading, id resolution, team
// selection and output.

use miette::IntoDiagnostic;
use serde::Serialize;

use norma_engine::{select_team, AnalysisError, AnalysisOptions, ConsequenceAnalyzer, PathQuery};
use norma_model::loader::{load_cascade, load_results, load_vectors};
use norma_model::{Artifact, DomainPartition, PredicateCatalog, PredicateId, Team};

use crate::cli::ArtifactArgs;

/// Partition name used when the input carries no partitions.
pub(crate) const WHOLE_TEAM_PARTITION: &str = "main";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(miette::miette!(
            "Unknown output format: {other}. Use 'text' or 'json'."
        )),
    }
}

/// Print `value` as pretty JSON, or the text rendering.
pub(crate) fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> miette::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Text => {
            println!("{}", text(value));
        }
    }
    Ok(())
}

/// Load the artifact selected by the input flags.
///
/// `--cascade` and `--results` provide the catalog; `--vectors` replaces the
/// models and partitions when given.
pub(crate) fn load_artifact(args: &ArtifactArgs) -> miette::Result<Artifact> {
    let mut artifact = match (&args.cascade, &args.results) {
        (Some(cascade), _) => load_cascade(cascade).into_diagnostic()?,
        (None, Some(results)) => load_results(results).into_diagnostic()?,
        (None, None) if args.vectors.is_some() => Artifact::default(),
        (None, None) => {
            return Err(miette::miette!(
                help = "pass --results <json>, --cascade <json> or --vectors <txt>",
                "no input artifact given"
            ))
        }
    };

    if let Some(path) = &args.vectors {
        let file = load_vectors(path, args.max_vectors).into_diagnostic()?;
        if artifact.catalog.is_empty() {
            tracing::warn!("no predicate mapping loaded; every id will be labelled unknown");
        }
        artifact.declared_solutions = file.team.len();
        artifact.satisfiable = !file.team.is_empty();
        artifact.team = file.team;
        artifact.partitions = file.partitions;
    }
    Ok(artifact)
}

/// The artifact's partitions, or the whole team as a single partition.
pub(crate) fn partitions_of(artifact: &Artifact) -> Vec<DomainPartition> {
    if artifact.partitions.is_empty() {
        vec![DomainPartition::new(
            WHOLE_TEAM_PARTITION,
            artifact.team.clone(),
        )]
    } else {
        artifact.partitions.clone()
    }
}

/// Accept either a numeric id or a predicate name.
pub(crate) fn resolve_predicate(
    artifact: &Artifact,
    raw: &str,
) -> Result<PredicateId, AnalysisError> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<PredicateId>() {
        if artifact.catalog.contains(id) {
            return Ok(id);
        }
        return Err(AnalysisError::PredicateNotFound { id });
    }
    ConsequenceAnalyzer::new(&artifact.catalog, &artifact.team).resolve_name(raw)
}

/// Combine a path and an optional list of ids to forbid. Every entry of the
/// forbidden list is forbidden, whatever its sign.
pub(crate) fn team_query(required: &str, forbidden: Option<&str>) -> miette::Result<PathQuery> {
    let mut query = PathQuery::parse(required)?;
    if let Some(raw) = forbidden {
        let extra = PathQuery::parse(raw)?;
        query.forbidden.extend(extra.required);
        query.forbidden.extend(extra.forbidden);
    }
    Ok(query)
}

/// Models of the artifact matching `query`, capped by the options.
pub(crate) fn select(artifact: &Artifact, query: &PathQuery, options: &AnalysisOptions) -> Team {
    let selection = select_team(&artifact.team, query, None, options.max_team_matches);
    if selection.truncated {
        tracing::warn!(
            "query {query} stopped after {} models (--max-team-matches)",
            options.max_team_matches
        );
    }
    selection.matches
}

pub(crate) fn labelled_ids<'a, I>(catalog: &PredicateCatalog, ids: I, indent: &str) -> String
where
    I: IntoIterator<Item = &'a PredicateId>,
{
    let mut out = String::new();
    for id in ids {
        out.push_str(&format!("{indent}ID {id}: {}\n", catalog.label(*id)));
    }
    out
}
