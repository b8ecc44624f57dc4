// Command handlers for: Split, Independence

use norma_engine::{independence_test, split};

use super::helpers::{emit, load_artifact, OutputFormat};
use crate::cli::ArtifactArgs;

pub(crate) fn run_split(
    args: &ArtifactArgs,
    id1: u32,
    id2: u32,
    format: OutputFormat,
) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let result = split(&artifact.team, id1, id2)?;
    let catalog = &artifact.catalog;
    emit(format, &result, |s| {
        let mut out = format!(
            "Split succeeded over {} models: {} and {} interact with uncertainty.\n",
            s.processed, s.id1, s.id2
        );
        out.push_str(&format!("Y (models with {}):\n", s.id1));
        for id in &s.y {
            out.push_str(&format!("  ID {id}: {}\n", catalog.label(*id)));
        }
        out.push_str(&format!("Z (models with {}):\n", s.id2));
        for id in &s.z {
            out.push_str(&format!("  ID {id}: {}\n", catalog.label(*id)));
        }
        out
    })
}

pub(crate) fn run_independence(
    args: &ArtifactArgs,
    id1: u32,
    id2: u32,
    format: OutputFormat,
) -> miette::Result<()> {
    let artifact = load_artifact(args)?;
    let result = independence_test(&artifact.team, id1, id2);
    emit(format, &result, |t| {
        let mut out = format!("Processed {} models.\nCombinations (ID {id1}, ID {id2}):\n", t.processed);
        for c in &t.combinations {
            out.push_str(&format!("  {c}: {} models\n", c.count));
        }
        if t.independent {
            out.push_str("Independent: all four combinations observed");
        } else {
            out.push_str(&format!(
                "Not independent: {} of 4 combinations observed; missing {}",
                4 - t.missing.len(),
                t.missing
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        out
    })
}
