//! C-Hash: indexes cliques by their feature-set key for O(1) supersetting
//! lookups during prevalence calculation.

use std::collections::{HashMap, HashSet};

use crate::dataset::SpatialDataset;
use crate::featureset::FeatureSet;
use crate::ids::Clique;

/// Indexes cliques by feature-set key, bucketed by feature within each
/// key. Built incrementally via [`CHash::add_clique`]; cliques smaller
/// than 2 instances or spanning fewer than 2 distinct features are not
/// co-location evidence and are silently dropped.
#[derive(Debug, Clone, Default)]
pub struct CHash {
    table: HashMap<FeatureSet, HashMap<usize, HashSet<usize>>>,
}

impl CHash {
    /// An empty C-Hash.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Ingests a clique, given as a list of dataset positions.
    ///
    /// Rejects cliques of size `< 2` and cliques whose feature-set key
    /// has cardinality `< 2` (a repeated feature within the clique would
    /// already violate feature-distinctness upstream). Adding the same
    /// clique twice is a no-op, since buckets are sets.
    pub fn add_clique(&mut self, dataset: &SpatialDataset, clique: &Clique) {
        if clique.len() < 2 {
            return;
        }

        let feature_ids: Vec<usize> = clique.iter().map(|&pos| dataset.feature_id(pos)).collect();
        let key = FeatureSet::from_ids(dataset.num_features(), feature_ids.iter().copied());
        if key.len() < 2 {
            return;
        }

        let buckets = self.table.entry(key).or_default();
        for (&pos, &feature_id) in clique.iter().zip(feature_ids.iter()) {
            buckets.entry(feature_id).or_default().insert(pos);
        }
    }

    /// All feature-set keys currently recorded.
    pub fn candidates(&self) -> impl Iterator<Item = &FeatureSet> {
        self.table.keys()
    }

    /// The number of distinct feature-set keys recorded.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no cliques have been recorded.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The instances recorded for feature `f` under the exact key `k`,
    /// or an empty slice if `k` is not present or has no bucket for `f`.
    pub fn instances_for(&self, key: &FeatureSet, feature: usize) -> Option<&HashSet<usize>> {
        self.table.get(key).and_then(|buckets| buckets.get(&feature))
    }

    /// Every key recorded in the C-Hash that is a superset of `key`
    /// (including `key` itself, if present).
    pub fn supersets_of<'a>(&'a self, key: &'a FeatureSet) -> impl Iterator<Item = &'a FeatureSet> + 'a {
        self.table.keys().filter(move |k| key.is_subset(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    fn dataset() -> SpatialDataset {
        SpatialDataset::new(vec![
            Instance::new("A", 1, 0.0, 0.0),
            Instance::new("B", 1, 0.1, 0.0),
            Instance::new("C", 1, 0.05, 0.08),
        ])
        .unwrap()
    }

    #[test]
    fn ingests_a_triangle() {
        let dataset = dataset();
        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![0, 1, 2]);

        assert_eq!(chash.len(), 1);
        let a_id = dataset.feature_id_of_label("A").unwrap();
        let key = chash.candidates().next().unwrap().clone();
        assert!(key.contains(a_id));
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn rejects_too_small_cliques() {
        let dataset = dataset();
        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![0]);
        assert!(chash.is_empty());
    }

    #[test]
    fn idempotent_on_repeated_insert() {
        let dataset = dataset();
        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![0, 1]);
        chash.add_clique(&dataset, &vec![0, 1]);

        let a_id = dataset.feature_id_of_label("A").unwrap();
        let key = chash.candidates().next().unwrap().clone();
        assert_eq!(chash.instances_for(&key, a_id).unwrap().len(), 1);
    }

    #[test]
    fn supersets_of_a_pair_include_the_triangle() {
        let dataset = dataset();
        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![0, 1, 2]);

        let a_id = dataset.feature_id_of_label("A").unwrap();
        let b_id = dataset.feature_id_of_label("B").unwrap();
        let pair = FeatureSet::from_ids(dataset.num_features(), [a_id, b_id]);

        let supersets: Vec<&FeatureSet> = chash.supersets_of(&pair).collect();
        assert_eq!(supersets.len(), 1);
        assert_eq!(supersets[0].len(), 3);
    }
}
