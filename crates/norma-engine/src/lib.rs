#![doc = include_str!("../README.md")]

//! Consequence and team-semantics analysis over enumerated contract models.
//!
//! Every entry point is a pure function (or a borrowing analyzer) over an
//! immutable catalog and team. Results are plain `serde::Serialize` structs.

pub mod cache;
pub mod consequence;
pub mod error;
pub mod metrics;
pub mod options;
pub mod partition;
pub mod query;
pub mod strategy;

pub use cache::{cached_consequences, MemoryCache, QueryCache, QueryKey};
pub use consequence::{
    analyze_artifact, analyze_fulfillment, analyze_violation, ArtifactAnalysis, Classification,
    Consequence, ConsequenceAnalyzer, ConsequenceReport, IndexedModel, QueryKind, ScenarioSamples,
};
pub use error::AnalysisError;
pub use metrics::{
    analyze_team, core_elements, vulnerability_scan, Level, TeamAnalysis, TeamMetrics,
    VariableMetrics, VulnerabilityScan,
};
pub use options::{AnalysisOptions, DEFAULT_MAX_TEAM_MATCHES};
pub use partition::{
    analyze_responsibility, query_partitions, PartitionResult, PartitionStatus, PartitionedQuery,
    ResponsibilityMode, ResponsibilityReport,
};
pub use query::{select_team, subject_filter, PathQuery, TeamSelection};
pub use strategy::{
    attack_surface, defense_space, independence_test, simulate_attack, split, strategy,
    team_union, Advantage, AttackSimulation, IndependenceTest, Split, StrategyReport,
};
