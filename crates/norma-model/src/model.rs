//! Models (satisfying scenarios) and teams (ordered model sequences).

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::predicate::PredicateId;

/// One globally consistent scenario: the set of satisfied predicate ids.
///
/// Ids are kept sorted and de-duplicated, so equality, ordering and hashing
/// are by content.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PredicateId>", into = "Vec<PredicateId>")]
pub struct Model {
    ids: Box<[PredicateId]>,
}

impl Model {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PredicateId>,
    {
        let mut ids: Vec<PredicateId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Model {
            ids: ids.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PredicateId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn contains_all(&self, ids: &[PredicateId]) -> bool {
        ids.iter().all(|id| self.contains(*id))
    }

    pub fn contains_any(&self, ids: &[PredicateId]) -> bool {
        ids.iter().any(|id| self.contains(*id))
    }

    pub fn ids(&self) -> &[PredicateId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = PredicateId> + '_ {
        self.ids.iter().copied()
    }

    /// The ids of this model with `id` removed.
    pub fn without(&self, id: PredicateId) -> Vec<PredicateId> {
        self.ids.iter().copied().filter(|x| *x != id).collect()
    }
}

impl From<Vec<PredicateId>> for Model {
    fn from(ids: Vec<PredicateId>) -> Self {
        Model::new(ids)
    }
}

impl From<Model> for Vec<PredicateId> {
    fn from(model: Model) -> Self {
        model.ids.into_vec()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("]")
    }
}

/// An ordered sequence of models: either a full enumeration or a filtered
/// subset. Duplicate models are kept and counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team {
    models: Vec<Model>,
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: Vec<Model>) -> Self {
        Team { models }
    }

    pub fn push(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.models.iter()
    }

    pub fn into_models(self) -> Vec<Model> {
        self.models
    }

    /// Models satisfying `predicate`, in team order.
    pub fn filter<F>(&self, mut predicate: F) -> Team
    where
        F: FnMut(&Model) -> bool,
    {
        Team {
            models: self.models.iter().filter(|m| predicate(m)).cloned().collect(),
        }
    }

    /// Split into (models containing `id`, models not containing `id`).
    pub fn partition_by(&self, id: PredicateId) -> (Team, Team) {
        let (with, without): (Vec<Model>, Vec<Model>) =
            self.models.iter().cloned().partition(|m| m.contains(id));
        (Team::from_models(with), Team::from_models(without))
    }

    /// Union of ids over all models.
    pub fn observed_ids(&self) -> BTreeSet<PredicateId> {
        self.models.iter().flat_map(|m| m.iter()).collect()
    }

    /// Number of models containing each id.
    pub fn occurrence_counts(&self) -> HashMap<PredicateId, usize> {
        let mut counts: HashMap<PredicateId, usize> = HashMap::new();
        for model in &self.models {
            for id in model.iter() {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Intersection of all models; empty for an empty team.
    pub fn intersection(&self) -> BTreeSet<PredicateId> {
        let mut iter = self.models.iter();
        let Some(first) = iter.next() else {
            return BTreeSet::new();
        };
        let mut common: BTreeSet<PredicateId> = first.iter().collect();
        for model in iter {
            if common.is_empty() {
                break;
            }
            common.retain(|id| model.contains(*id));
        }
        common
    }
}

impl FromIterator<Model> for Team {
    fn from_iter<I: IntoIterator<Item = Model>>(iter: I) -> Self {
        Team {
            models: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Team {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

impl IntoIterator for Team {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_team() -> Team {
        Team::from_models(vec![
            Model::new([1, 2]),
            Model::new([1, 3]),
            Model::new([2, 3]),
            Model::new([1, 2, 3]),
            Model::new([2]),
        ])
    }

    #[test]
    fn test_model_normalizes_ids() {
        let m = Model::new([3, 1, 3, 2]);
        assert_eq!(m.ids(), &[1, 2, 3]);
        assert_eq!(m, Model::new([1, 2, 3]));
        assert_eq!(m.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_model_serde_as_plain_array() {
        let m: Model = serde_json::from_str("[5, 4, 4]").unwrap();
        assert_eq!(m.ids(), &[4, 5]);
        assert_eq!(serde_json::to_string(&m).unwrap(), "[4,5]");
    }

    #[test]
    fn test_partition_by_keeps_order_and_counts() {
        let (with, without) = sample_team().partition_by(2);
        assert_eq!(with.len(), 4);
        assert_eq!(without.models(), &[Model::new([1, 3])]);
    }

    #[test]
    fn test_intersection_of_sample_is_empty() {
        assert!(sample_team().intersection().is_empty());
        assert!(Team::new().intersection().is_empty());
        let team = Team::from_models(vec![Model::new([1, 2, 4]), Model::new([2, 4, 5])]);
        assert_eq!(team.intersection().into_iter().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_occurrence_counts_include_duplicates() {
        let team = Team::from_models(vec![Model::new([1]), Model::new([1]), Model::new([2])]);
        let counts = team.occurrence_counts();
        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&2], 1);
    }
}
