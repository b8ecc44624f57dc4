#![doc = include_str!("../README.md")]

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::helpers::parse_output_format;

fn main() -> miette::Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.analysis_options();
    let format = parse_output_format(&cli.format)?;

    match &cli.command {
        Commands::Predicates { artifact } => {
            commands::inspect::run_predicates(artifact, format)?;
        }
        Commands::Count { artifact } => {
            commands::inspect::run_count(artifact, format)?;
        }
        Commands::Sample { n, artifact } => {
            commands::inspect::run_sample(artifact, *n, format)?;
        }
        Commands::Consequences {
            predicate,
            kind,
            samples,
            artifact,
        } => {
            commands::consequences::run_consequences(
                artifact, predicate, kind, *samples, &options, format,
            )?;
        }
        Commands::AnalyzeAll { artifact } => {
            commands::consequences::run_analyze_all(artifact, format)?;
        }
        Commands::Query {
            path,
            by_partition,
            artifact,
        } => {
            commands::query::run_query(artifact, path, *by_partition, &options, format)?;
        }
        Commands::QuerySubject {
            subject,
            path,
            artifact,
        } => {
            commands::query::run_query_subject(
                artifact,
                subject,
                path.as_deref(),
                &options,
                format,
            )?;
        }
        Commands::Responsibility {
            predicate,
            mode,
            artifact,
        } => {
            commands::query::run_responsibility(artifact, predicate, mode, format)?;
        }
        Commands::Split { id1, id2, artifact } => {
            commands::algebra::run_split(artifact, *id1, *id2, format)?;
        }
        Commands::Independence { id1, id2, artifact } => {
            commands::algebra::run_independence(artifact, *id1, *id2, format)?;
        }
        Commands::AnalyzeTeam {
            required,
            forbidden,
            artifact,
        } => {
            commands::team::run_analyze_team(
                artifact,
                required,
                forbidden.as_deref(),
                &options,
                format,
            )?;
        }
        Commands::CompareTeams {
            claimant,
            respondent,
            artifact,
        } => {
            commands::team::run_compare_teams(artifact, claimant, respondent, &options, format)?;
        }
        Commands::VulnerabilityScan { team, artifact } => {
            commands::team::run_vulnerability_scan(artifact, team, &options, format)?;
        }
        Commands::SimulateAttack {
            team,
            target,
            artifact,
        } => {
            commands::team::run_simulate_attack(artifact, team, target, &options, format)?;
        }
    }

    Ok(())
}
