//! Proptest strategies for generating teams, catalogs and partitions.

use proptest::prelude::*;

use crate::catalog::PredicateCatalog;
use crate::model::{Model, Team};
use crate::partition::DomainPartition;
use crate::predicate::{Predicate, PredicateId, PredicateKind};

/// Largest id produced by the generators. Small enough that generated
/// models overlap often.
pub const MAX_GENERATED_ID: PredicateId = 12;

/// A model over ids `1..=MAX_GENERATED_ID` with at most 6 ids.
pub fn arb_model() -> impl Strategy<Value = Model> {
    proptest::collection::vec(1..=MAX_GENERATED_ID, 0..=6).prop_map(Model::new)
}

/// A team of 0–24 models. Duplicates are allowed.
pub fn arb_team() -> impl Strategy<Value = Team> {
    proptest::collection::vec(arb_model(), 0..=24).prop_map(Team::from_models)
}

/// A non-empty team of 1–24 models.
pub fn arb_nonempty_team() -> impl Strategy<Value = Team> {
    proptest::collection::vec(arb_model(), 1..=24).prop_map(Team::from_models)
}

fn arb_kind() -> impl Strategy<Value = PredicateKind> {
    prop_oneof![
        Just(PredicateKind::Act),
        Just(PredicateKind::Fact),
        Just(PredicateKind::Claim),
        Just(PredicateKind::Obligation),
        Just(PredicateKind::Prohibition),
    ]
}

/// A catalog defining every id in `1..=MAX_GENERATED_ID`.
pub fn arb_catalog() -> impl Strategy<Value = PredicateCatalog> {
    proptest::collection::vec(arb_kind(), MAX_GENERATED_ID as usize).prop_map(|kinds| {
        let predicates = kinds.into_iter().enumerate().map(|(i, kind)| {
            let id = i as PredicateId + 1;
            Predicate::new(id, format!("p{id}"))
                .with_arguments(["party_a", "party_b"])
                .with_kind(kind)
        });
        // Ids are distinct by construction.
        PredicateCatalog::from_predicates(predicates).unwrap_or_default()
    })
}

/// 1–4 partitions, each holding 0–12 models.
pub fn arb_partitions() -> impl Strategy<Value = Vec<DomainPartition>> {
    proptest::collection::vec(proptest::collection::vec(arb_model(), 0..=12), 1..=4).prop_map(
        |groups| {
            groups
                .into_iter()
                .enumerate()
                .map(|(i, models)| DomainPartition::new(format!("part{i}"), Team::from_models(models)))
                .collect()
        },
    )
}
