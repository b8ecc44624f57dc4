use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::catalog::PredicateCatalog;
use crate::model::Team;
use crate::partition::DomainPartition;

/// Everything loaded from one compilation: catalog, model enumeration and
/// optional domain partitions.
#[derive(Debug, Clone, Default)]
pub struct Artifact {
    pub catalog: PredicateCatalog,
    pub team: Team,
    pub partitions: Vec<DomainPartition>,
    pub satisfiable: bool,
    /// Solution count as declared by the solver (may differ from `team.len()`
    /// when the enumeration was truncated).
    pub declared_solutions: usize,
}

impl Artifact {
    /// SHA-256 over the catalog and models, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for predicate in self.catalog.iter() {
            hasher.update(predicate.id.to_le_bytes());
            hasher.update(predicate.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(predicate.full_expression.as_bytes());
            hasher.update([0u8]);
            hasher.update(predicate.kind.as_str().as_bytes());
            hasher.update([0xffu8]);
        }
        hash_team(&mut hasher, &self.team);
        for partition in &self.partitions {
            hasher.update(partition.name.as_bytes());
            hasher.update([0u8]);
            hash_team(&mut hasher, partition.team());
        }
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn hash_team(hasher: &mut Sha256, team: &Team) {
    hasher.update((team.len() as u64).to_le_bytes());
    for model in team {
        hasher.update((model.len() as u64).to_le_bytes());
        for id in model.iter() {
            hasher.update(id.to_le_bytes());
        }
    }
}

/// An immutable, shareable view of an artifact.
///
/// Analyses hold a clone of the snapshot; a recompilation produces a new
/// snapshot with a new fingerprint and never touches existing ones.
#[derive(Debug, Clone)]
pub struct ArtifactSnapshot {
    fingerprint: Arc<str>,
    artifact: Arc<Artifact>,
}

impl ArtifactSnapshot {
    pub fn new(artifact: Artifact) -> Self {
        let fingerprint = artifact.fingerprint();
        ArtifactSnapshot {
            fingerprint: Arc::from(fingerprint),
            artifact: Arc::new(artifact),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}
