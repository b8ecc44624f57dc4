//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Args, Parser, Subcommand};
use norma_engine::{AnalysisOptions, DEFAULT_MAX_TEAM_MATCHES};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Consequence and team-semantics analysis over enumerated contract models.\n\n\
    Typical session:\n  \
    1. norma predicates --results out/results.json\n  \
    2. norma consequences pay_rent --results out/results.json --kind violation\n  \
    3. norma responsibility 4 --cascade out/combined.json\n\n\
    Paths are written [1,-2,3]: positive ids are required, negative ids forbidden.\n\
    Use --format json for machine-readable output on stdout.";

#[derive(Parser)]
#[command(name = "norma")]
#[command(about = "Consequence and team-semantics analysis over enumerated contract models")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Cap on models collected by an unpartitioned query
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TEAM_MATCHES)]
    pub(crate) max_team_matches: usize,

    /// Attack targets kept in a team comparison
    #[arg(long, global = true, default_value_t = 5)]
    pub(crate) top_attack_targets: usize,

    /// Own vulnerabilities kept in a team comparison
    #[arg(long, global = true, default_value_t = 3)]
    pub(crate) top_vulnerabilities: usize,

    /// Entries in a vulnerability scan
    #[arg(long, global = true, default_value_t = 5)]
    pub(crate) vulnerability_scan_size: usize,

    /// Sample models attached to reports
    #[arg(long, global = true, default_value_t = 5)]
    pub(crate) sample_size: usize,

    /// Output format: text | json
    #[arg(long, global = true, default_value = "text")]
    pub(crate) format: String,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

impl Cli {
    pub(crate) fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            max_team_matches: self.max_team_matches,
            top_attack_targets: self.top_attack_targets,
            top_vulnerabilities: self.top_vulnerabilities,
            vulnerability_scan_size: self.vulnerability_scan_size,
            sample_size: self.sample_size,
        }
    }
}

/// Where the catalog and models come from.
#[derive(Args, Clone, Debug)]
pub(crate) struct ArtifactArgs {
    /// Solver results JSON (predicate mapping and solutions)
    #[arg(long)]
    pub(crate) results: Option<PathBuf>,

    /// Cascade metadata JSON; each execution becomes one partition
    #[arg(long, conflicts_with = "results")]
    pub(crate) cascade: Option<PathBuf>,

    /// Plain-text vector dump; replaces the models of --results/--cascade
    #[arg(long)]
    pub(crate) vectors: Option<PathBuf>,

    /// Stop reading the vector dump after this many models
    #[arg(long, requires = "vectors")]
    pub(crate) max_vectors: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the predicate catalog
    #[command(display_order = 10)]
    Predicates {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Count the models
    #[command(display_order = 11)]
    Count {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Show the first N models
    #[command(display_order = 12)]
    Sample {
        /// Number of models to show
        n: usize,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Always-present / always-absent predicates when a target is fulfilled or violated
    #[command(display_order = 20)]
    Consequences {
        /// Predicate id or name
        predicate: String,

        /// fulfillment | violation | both
        #[arg(long, default_value = "both")]
        kind: String,

        /// Also show the first fulfillment and violation models (--sample-size)
        #[arg(long, default_value_t = false)]
        samples: bool,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Fulfillment and violation analysis for every predicate
    #[command(display_order = 21)]
    AnalyzeAll {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Models matching a path such as [1,-2,3]
    #[command(display_order = 30)]
    Query {
        /// Path: positive ids required, negative ids forbidden
        path: String,

        /// Run the query per domain partition and aggregate
        #[arg(long, default_value_t = false)]
        by_partition: bool,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Models involving a party, optionally narrowed by a path
    #[command(display_order = 31)]
    QuerySubject {
        /// Party name appearing among predicate arguments
        subject: String,

        /// Optional path: positive ids required, negative ids forbidden
        path: Option<String>,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Per-partition consequences of fulfilling and/or violating a predicate
    #[command(display_order = 32)]
    Responsibility {
        /// Predicate id or name
        predicate: String,

        /// fulfills | violates | both
        #[arg(long, default_value = "both")]
        mode: String,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Check that every model contains one of two ids and collect both sides
    #[command(display_order = 40)]
    Split {
        id1: u32,
        id2: u32,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Check whether two ids occur in all four presence combinations
    #[command(display_order = 41)]
    Independence {
        id1: u32,
        id2: u32,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Team-semantics metrics for the models matching a path
    #[command(display_order = 50)]
    AnalyzeTeam {
        /// Required ids, e.g. [1,2]
        required: String,

        /// Forbidden ids, e.g. [-4,-5]
        forbidden: Option<String>,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Argument strategy of one path team against another
    #[command(display_order = 51)]
    CompareTeams {
        /// Claimant team path
        claimant: String,

        /// Respondent team path
        respondent: String,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Most critical variables of a path team
    #[command(display_order = 52)]
    VulnerabilityScan {
        /// Team path
        team: String,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Remove every model containing a target and measure the damage
    #[command(display_order = 53)]
    SimulateAttack {
        /// Team path
        team: String,

        /// Target predicate id or name
        target: String,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },
}
