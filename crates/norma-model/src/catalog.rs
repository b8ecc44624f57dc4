//! Immutable id ↔ predicate lookup for one compiled artifact.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::ModelError;
use crate::model::Team;
use crate::predicate::{Predicate, PredicateId};

/// Label used for ids that appear in models but not in the catalog.
pub const UNKNOWN_PREDICATE_LABEL: &str = "unknown";

/// The predicate mapping of a compiled artifact, ordered by ascending id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PredicateCatalog {
    predicates: BTreeMap<PredicateId, Predicate>,
}

impl PredicateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate ids.
    pub fn from_predicates<I>(predicates: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut catalog = PredicateCatalog::new();
        for predicate in predicates {
            catalog.insert(predicate)?;
        }
        Ok(catalog)
    }

    pub(crate) fn insert(&mut self, predicate: Predicate) -> Result<(), ModelError> {
        if self.predicates.contains_key(&predicate.id) {
            return Err(ModelError::DuplicatePredicateId { id: predicate.id });
        }
        self.predicates.insert(predicate.id, predicate);
        Ok(())
    }

    /// Add predicates from `other` whose ids this catalog does not define yet.
    /// Returns how many entries were added.
    pub(crate) fn extend_missing(&mut self, other: PredicateCatalog) -> usize {
        let mut added = 0;
        for (id, predicate) in other.predicates {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.predicates.entry(id) {
                slot.insert(predicate);
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn get(&self, id: PredicateId) -> Option<&Predicate> {
        self.predicates.get(&id)
    }

    pub fn contains(&self, id: PredicateId) -> bool {
        self.predicates.contains_key(&id)
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = PredicateId> + '_ {
        self.predicates.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.values()
    }

    /// First predicate (by ascending id) named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Predicate> {
        self.predicates.values().find(|p| p.name == name)
    }

    /// Ids of predicates taking `subject` as one of their arguments.
    pub fn ids_involving(&self, subject: &str) -> BTreeSet<PredicateId> {
        self.predicates
            .values()
            .filter(|p| p.involves(subject))
            .map(|p| p.id)
            .collect()
    }

    /// Display label for an id, falling back to [`UNKNOWN_PREDICATE_LABEL`].
    pub fn label(&self, id: PredicateId) -> Cow<'_, str> {
        match self.predicates.get(&id) {
            Some(p) => Cow::Borrowed(p.full_expression.as_str()),
            None => Cow::Borrowed(UNKNOWN_PREDICATE_LABEL),
        }
    }

    /// Ids observed in `team` that this catalog does not define.
    pub fn unknown_ids(&self, team: &Team) -> BTreeSet<PredicateId> {
        team.observed_ids()
            .into_iter()
            .filter(|id| !self.contains(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn catalog() -> PredicateCatalog {
        PredicateCatalog::from_predicates([
            Predicate::new(2, "deliver").with_arguments(["seller", "buyer"]),
            Predicate::new(1, "pay").with_arguments(["buyer", "seller"]),
            Predicate::new(3, "pay").with_arguments(["agent", "seller"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_ids_are_ascending() {
        let ids: Vec<_> = catalog().ids().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = PredicateCatalog::from_predicates([Predicate::new(1, "a"), Predicate::new(1, "b")])
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicatePredicateId { id: 1 }));
    }

    #[test]
    fn test_find_by_name_returns_lowest_id() {
        assert_eq!(catalog().find_by_name("pay").map(|p| p.id), Some(1));
        assert!(catalog().find_by_name("refund").is_none());
    }

    #[test]
    fn test_ids_involving_subject() {
        let ids = catalog().ids_involving("seller");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(catalog().ids_involving("agent").len(), 1);
    }

    #[test]
    fn test_unknown_ids_are_flagged_not_fatal() {
        let team = Team::from_models(vec![Model::new([1, 2, 9]), Model::new([7])]);
        let unknown = catalog().unknown_ids(&team);
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec![7, 9]);
        assert_eq!(catalog().label(9), UNKNOWN_PREDICATE_LABEL);
        assert_eq!(catalog().label(2), "deliver(seller, buyer)");
    }

    #[test]
    fn test_extend_missing_keeps_existing_entries() {
        let mut base = catalog();
        let other = PredicateCatalog::from_predicates([
            Predicate::new(1, "other"),
            Predicate::new(4, "terminate"),
        ])
        .unwrap();
        assert_eq!(base.extend_missing(other), 1);
        assert_eq!(base.get(1).unwrap().name, "pay");
        assert_eq!(base.get(4).unwrap().name, "terminate");
    }
}
