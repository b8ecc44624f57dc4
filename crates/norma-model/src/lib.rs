#![doc = include_str!("../README.md")]

//! Norma data model.
//!
//! This crate defines the predicate catalog, models and teams, domain
//! partitions, artifact snapshots, and the loaders that decode solver
//! output into them.

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod loader;
pub mod model;
pub mod partition;
pub mod predicate;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;

pub use artifact::{Artifact, ArtifactSnapshot};
pub use catalog::{PredicateCatalog, UNKNOWN_PREDICATE_LABEL};
pub use error::ModelError;
pub use model::{Model, Team};
pub use partition::{DomainPartition, PartitionDomain};
pub use predicate::{Predicate, PredicateId, PredicateKind};
