// Command handlers for: Consequences, AnalyzeAll

use serde::Serialize;

use norma_engine::{
    analyze_artifact, AnalysisOptions, ConsequenceAnalyzer, ConsequenceReport, IndexedModel,
    QueryKind, ScenarioSamples,
};

use super::helpers::{emit, load_artifact, resolve_predicate, OutputFormat};
use crate::cli::ArtifactArgs;

#[derive(Debug, Serialize)]
struct ConsequencesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    fulfillment: Option<ConsequenceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<ConsequenceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<ScenarioSamples>,
}

fn render_samples(title: &str, models: &[IndexedModel]) -> String {
    let mut out = format!("Sample {title} scenarios ({}):", models.len());
    for sample in models {
        out.push_str(&format!("\n  #{}: {}", sample.index, sample.model));
    }
    out
}

fn parse_kinds(raw: &str) -> miette::Result<Vec<QueryKind>> {
    match raw {
        "fulfillment" => Ok(vec![QueryKind::Fulfillment]),
        "violation" => Ok(vec![QueryKind::Violation]),
        "both" => Ok(vec![QueryKind::Fulfillment, QueryKind::Violation]),
        other => Err(miette::miette!(
            "Unknown consequence kind: {other}. Use 'fulfillment', 'violation' or 'both'."
        )),
    }
}

pub(crate) fn run_consequences(
    args: &ArtifactArgs,
    predicate: &str,
    kind: &str,
    samples: bool,
    options: &AnalysisOptions,
    format: OutputFormat,
) -> miette::Result<()> {
    let kinds = parse_kinds(kind)?;
    let artifact = load_artifact(args)?;
    let target = resolve_predicate(&artifact, predicate)?;
    let analyzer = ConsequenceAnalyzer::new(&artifact.catalog, &artifact.team);

    let mut output = ConsequencesOutput {
        fulfillment: None,
        violation: None,
        samples: None,
    };
    if samples {
        output.samples = Some(analyzer.scenario_samples(target, options.sample_size)?);
    }
    for kind in kinds {
        let report = analyzer.analyze(target, kind)?;
        match kind {
            QueryKind::Fulfillment => output.fulfillment = Some(report),
            QueryKind::Violation => output.violation = Some(report),
        }
    }

    emit(format, &output, |o| {
        let mut sections: Vec<String> = [&o.fulfillment, &o.violation]
            .into_iter()
            .flatten()
            .map(|r| r.to_string())
            .collect();
        if let Some(samples) = &o.samples {
            sections.push(render_samples("fulfillment", &samples.fulfillment));
            sections.push(render_samples("violation", &samples.violation));
        }
        sections.join("\n\n")
    })
}

pub(crate) fn run_analyze_all(args: &ArtifactArgs, format: OutputFormat) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let analysis = analyze_artifact(&artifact);
    emit(format, &analysis, |a| {
        let mut out = format!(
            "{} predicates over {} models (satisfiable: {})\n",
            a.num_predicates, a.total_solutions, a.satisfiable
        );
        for (violation, fulfillment) in a.violation_results.iter().zip(&a.fulfillment_results) {
            out.push_str(&format!(
                "\nID {}: {}\n  if violated: {} always present, {} always absent\n  if fulfilled: {} always present, {} always absent\n",
                violation.target.id,
                violation.target.full_expression,
                violation.always_present_count,
                violation.always_absent_count,
                fulfillment.always_present_count,
                fulfillment.always_absent_count,
            ));
        }
        out
    })
}
