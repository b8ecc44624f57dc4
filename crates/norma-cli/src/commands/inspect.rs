// Command handlers for: Predicates, Count, Sample

use serde::Serialize;

use norma_model::Predicate;

use super::helpers::{emit, load_artifact, OutputFormat};
use crate::cli::ArtifactArgs;

#[derive(Debug, Serialize)]
struct CountReport {
    models: usize,
    declared_solutions: usize,
    satisfiable: bool,
    predicates: usize,
    partitions: Vec<PartitionCount>,
    unknown_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct PartitionCount {
    name: String,
    models: usize,
    domain: String,
}

pub(crate) fn run_predicates(args: &ArtifactArgs, format: OutputFormat) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let predicates: Vec<&Predicate> = artifact.catalog.iter().collect();
    emit(format, &predicates, |predicates| {
        let mut out = format!("{} predicates:\n", predicates.len());
        for p in predicates {
            out.push_str(&format!("  ID {}: {} [{}]\n", p.id, p.full_expression, p.kind));
        }
        out
    })
}

pub(crate) fn run_count(args: &ArtifactArgs, format: OutputFormat) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let report = CountReport {
        models: artifact.team.len(),
        declared_solutions: artifact.declared_solutions,
        satisfiable: artifact.satisfiable,
        predicates: artifact.catalog.len(),
        partitions: artifact
            .partitions
            .iter()
            .map(|p| PartitionCount {
                name: p.name.clone(),
                models: p.models().len(),
                domain: p.domain().label(),
            })
            .collect(),
        unknown_ids: artifact.catalog.unknown_ids(&artifact.team).into_iter().collect(),
    };
    emit(format, &report, |r| {
        let mut out = format!("Total models: {}\n", r.models);
        if r.declared_solutions != r.models {
            out.push_str(&format!("Declared solutions: {}\n", r.declared_solutions));
        }
        for p in &r.partitions {
            out.push_str(&format!("  {}: {} models ({})\n", p.name, p.models, p.domain));
        }
        if !r.unknown_ids.is_empty() {
            out.push_str(&format!("Unknown ids: {:?}\n", r.unknown_ids));
        }
        out
    })
}

pub(crate) fn run_sample(args: &ArtifactArgs, n: usize, format: OutputFormat) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let sample: Vec<_> = artifact.team.iter().take(n).collect();
    emit(format, &sample, |sample| {
        let mut out = format!("First {} of {} models:\n", sample.len(), artifact.team.len());
        for (i, model) in sample.iter().enumerate() {
            out.push_str(&format!("  {}: {model}\n", i + 1));
            for id in model.iter() {
                out.push_str(&format!("      {id}: {}\n", artifact.catalog.label(id)));
            }
        }
        out
    })
}
