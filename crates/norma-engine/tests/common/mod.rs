#![allow(dead_code)]

use norma_model::{Artifact, DomainPartition, Model, Predicate, PredicateCatalog, Team};

/// Residential lease with a solar-panel addendum.
pub fn lease_catalog() -> PredicateCatalog {
    PredicateCatalog::from_predicates([
        Predicate::new(1, "pay_rent").with_arguments(["tenant", "landlord"]),
        Predicate::new(2, "give_keys").with_arguments(["landlord", "tenant"]),
        Predicate::new(3, "repair").with_arguments(["landlord"]),
        Predicate::new(4, "install_panels").with_arguments(["installer", "landlord"]),
        Predicate::new(5, "net_metering").with_arguments(["utility", "landlord"]),
    ])
    .unwrap_or_else(|e| panic!("fixture catalog: {e}"))
}

pub fn models(raw: &[&[u32]]) -> Team {
    raw.iter().map(|ids| Model::new(ids.iter().copied())).collect()
}

/// `[{1,2},{1,3},{2,3},{1,2,3},{2}]`.
pub fn worked_team() -> Team {
    models(&[&[1, 2], &[1, 3], &[2, 3], &[1, 2, 3], &[2]])
}

pub fn lease_partitions() -> Vec<DomainPartition> {
    vec![
        DomainPartition::new("core_lease", models(&[&[1, 2, 3], &[1, 2], &[2, 3]])),
        DomainPartition::new("solar_addendum", models(&[&[1, 4, 5], &[1, 4], &[4]])),
    ]
}

pub fn lease_artifact() -> Artifact {
    let partitions = lease_partitions();
    let team = partitions
        .iter()
        .flat_map(|p| p.models().iter().cloned())
        .collect();
    Artifact {
        catalog: lease_catalog(),
        team,
        partitions,
        satisfiable: true,
        declared_solutions: 6,
    }
}
