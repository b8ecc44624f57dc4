//! Decoders for the solver's JSON results and cascade metadata.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::artifact::Artifact;
use crate::catalog::PredicateCatalog;
use crate::error::ModelError;
use crate::model::{Model, Team};
use crate::partition::DomainPartition;
use crate::predicate::{Predicate, PredicateId, PredicateKind};

/// One entry of the solver's `mappings` object.
#[derive(Debug, Clone, Deserialize)]
struct RawPredicate {
    predicate: String,
    #[serde(default, alias = "arguments")]
    args: Vec<String>,
    #[serde(default)]
    full: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Shape of a solver results file.
#[derive(Debug, Clone, Deserialize)]
struct SolverResults {
    #[serde(default)]
    mappings: IndexMap<String, RawPredicate>,
    #[serde(default)]
    solutions: Vec<Vec<PredicateId>>,
    #[serde(default)]
    num_solutions: Option<usize>,
    #[serde(default)]
    satisfiable: bool,
}

/// One step of a cascade compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeExecution {
    pub instance: String,
    pub results_file: String,
}

/// Execution order written by the compiler when compiling a cascade of
/// sub-contracts. The last execution is the authoritative contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeMetadata {
    #[serde(default)]
    pub executions: Vec<CascadeExecution>,
}

fn read_source(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a solver results document. `origin` is only used in error messages.
pub fn parse_results(source: &str, origin: &Path) -> Result<Artifact, ModelError> {
    let raw: SolverResults = serde_json::from_str(source).map_err(|source| ModelError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut predicates = Vec::with_capacity(raw.mappings.len());
    for (key, entry) in raw.mappings {
        let id: PredicateId = key
            .trim()
            .parse()
            .map_err(|_| ModelError::InvalidPredicateKey { key: key.clone() })?;
        let kind = entry
            .kind
            .as_deref()
            .map(PredicateKind::from_tag)
            .unwrap_or_default();
        let mut predicate = Predicate::new(id, entry.predicate)
            .with_arguments(entry.args)
            .with_kind(kind);
        if let Some(full) = entry.full.filter(|f| !f.is_empty()) {
            predicate = predicate.with_full_expression(full);
        }
        predicates.push(predicate);
    }
    let catalog = PredicateCatalog::from_predicates(predicates)?;

    let team: Team = raw.solutions.into_iter().map(Model::new).collect();
    let declared_solutions = raw.num_solutions.unwrap_or(team.len());
    if declared_solutions != team.len() {
        warn!(
            "{}: solver declares {} solutions but {} are enumerated",
            origin.display(),
            declared_solutions,
            team.len()
        );
    }

    debug!(
        "{}: {} predicates, {} models",
        origin.display(),
        catalog.len(),
        team.len()
    );

    Ok(Artifact {
        catalog,
        team,
        partitions: Vec::new(),
        satisfiable: raw.satisfiable,
        declared_solutions,
    })
}

/// Load a solver results file.
pub fn load_results(path: &Path) -> Result<Artifact, ModelError> {
    let source = read_source(path)?;
    let artifact = parse_results(&source, path)?;
    info!(
        "Loaded {} predicates and {} models from {}",
        artifact.catalog.len(),
        artifact.team.len(),
        path.display()
    );
    Ok(artifact)
}

/// Decode cascade metadata.
pub fn parse_cascade(source: &str, origin: &Path) -> Result<CascadeMetadata, ModelError> {
    serde_json::from_str(source).map_err(|source| ModelError::Json {
        path: origin.to_path_buf(),
        source,
    })
}

fn resolve_results_path(metadata_path: &Path, results_file: &str) -> PathBuf {
    let candidate = PathBuf::from(results_file);
    if candidate.is_absolute() {
        return candidate;
    }
    match metadata_path.parent() {
        Some(dir) => dir.join(candidate),
        None => candidate,
    }
}

/// Load a cascade: every execution becomes a domain partition (in execution
/// order) and the last execution supplies the authoritative model set.
///
/// The catalog is the final execution's mapping, extended with component
/// predicates whose ids the final mapping does not define.
pub fn load_cascade(path: &Path) -> Result<Artifact, ModelError> {
    let metadata = parse_cascade(&read_source(path)?, path)?;
    if metadata.executions.is_empty() {
        return Err(ModelError::EmptyCascade);
    }

    let mut components = Vec::with_capacity(metadata.executions.len());
    for execution in &metadata.executions {
        let results_path = resolve_results_path(path, &execution.results_file);
        if !results_path.is_file() {
            return Err(ModelError::MissingResultsFile {
                instance: execution.instance.clone(),
                path: results_path,
            });
        }
        let artifact = parse_results(&read_source(&results_path)?, &results_path)?;
        components.push((execution.instance.clone(), artifact));
    }

    let partitions: Vec<DomainPartition> = components
        .iter()
        .map(|(instance, artifact)| DomainPartition::new(instance.clone(), artifact.team.clone()))
        .collect();

    // The length check above guarantees a final execution.
    let (final_instance, mut final_artifact) = match components.pop() {
        Some(last) => last,
        None => return Err(ModelError::EmptyCascade),
    };
    for (instance, component) in components {
        let added = final_artifact.catalog.extend_missing(component.catalog);
        if added > 0 {
            debug!("{instance}: contributed {added} predicates absent from the final mapping");
        }
    }

    info!(
        "Loaded cascade of {} partitions (final instance '{}', {} models)",
        partitions.len(),
        final_instance,
        final_artifact.team.len()
    );

    final_artifact.partitions = partitions;
    Ok(final_artifact)
}
