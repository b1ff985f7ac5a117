//! Participation index calculation and the top-down prevalence miner.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use priority_queue::PriorityQueue;

use crate::chash::CHash;
use crate::dataset::SpatialDataset;
use crate::error::{CoLocationError, Result};
use crate::featureset::FeatureSet;

/// The mapping from prevalent co-location types to their participation
/// index values.
pub type PrevalenceMap = HashMap<FeatureSet, f64>;

/// `PR(cp, f)`: the fraction of feature `f`'s instances that appear in
/// some recorded C-Hash key that is a superset of `cp`.
pub fn participation_ratio(chash: &CHash, dataset: &SpatialDataset, cp: &FeatureSet, feature: usize) -> f64 {
    let count = dataset.feature_count(feature);
    if count == 0 {
        return 0.0;
    }

    let mut union: HashSet<usize> = HashSet::new();
    for key in chash.supersets_of(cp) {
        if let Some(bucket) = chash.instances_for(key, feature) {
            union.extend(bucket.iter().copied());
        }
    }
    union.len() as f64 / count as f64
}

/// `PI(cp) = min_{f ∈ cp} PR(cp, f)`, or `0` if the C-Hash holds no
/// recorded key that is a superset of `cp`.
pub fn participation_index(chash: &CHash, dataset: &SpatialDataset, cp: &FeatureSet) -> f64 {
    if chash.supersets_of(cp).next().is_none() {
        return 0.0;
    }
    cp.ids()
        .map(|f| participation_ratio(chash, dataset, cp, f))
        .fold(f64::INFINITY, f64::min)
}

/// A deterministic tie-breaking key for the active candidate set:
/// descending cardinality first, then ascending lexicographic order on
/// sorted feature ids (equivalent to feature label order, since ids are
/// assigned alphabetically in [`SpatialDataset`]).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Priority {
    cardinality: usize,
    ids: Vec<usize>,
}

impl Priority {
    fn of(key: &FeatureSet) -> Self {
        Self {
            cardinality: key.len(),
            ids: key.ids().collect(),
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        // PriorityQueue pops the greatest; larger cardinality must sort
        // greater, and among ties the lexicographically smaller id list
        // must sort greater so it is processed first.
        self.cardinality
            .cmp(&other.cardinality)
            .then_with(|| other.ids.cmp(&self.ids))
    }
}

fn validate(min_prev: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&min_prev) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "min_prev must be within [0, 1], got {min_prev}"
        )));
    }
    Ok(())
}

/// Mines prevalent co-location types from a populated C-Hash.
///
/// Walks the active candidate set top-down by cardinality: a prevalent
/// candidate certifies all of its size-≥2 subsets prevalent by
/// anti-monotonicity without re-testing them against `min_prev`; a
/// non-prevalent candidate has its direct subsets enqueued for
/// evaluation instead.
pub fn mine(chash: &CHash, dataset: &SpatialDataset, min_prev: f64) -> Result<PrevalenceMap> {
    validate(min_prev)?;

    let mut queue: PriorityQueue<FeatureSet, Priority> = PriorityQueue::new();
    for key in chash.candidates() {
        queue.push(key.clone(), Priority::of(key));
    }

    let mut result: PrevalenceMap = HashMap::new();

    while let Some((curr, _)) = queue.pop() {
        let pi_curr = participation_index(chash, dataset, &curr);

        if pi_curr >= min_prev {
            result.insert(curr.clone(), pi_curr);
            for sub in curr.proper_subsets_at_least_2() {
                if !result.contains_key(&sub) {
                    let pi_sub = participation_index(chash, dataset, &sub);
                    result.insert(sub.clone(), pi_sub);
                }
                queue.remove(&sub);
            }
        } else {
            for sub in curr.direct_subsets_at_least_2() {
                if queue.get(&sub).is_none() && !result.contains_key(&sub) {
                    let priority = Priority::of(&sub);
                    queue.push(sub, priority);
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    fn two_triangles_chash() -> (SpatialDataset, CHash) {
        let dataset = SpatialDataset::new(vec![
            Instance::new("A", 1, 0.0, 0.0),
            Instance::new("B", 1, 0.1, 0.0),
            Instance::new("C", 1, 0.05, 0.08),
            Instance::new("A", 2, 1.0, 1.0),
            Instance::new("B", 2, 1.1, 1.0),
            Instance::new("C", 2, 1.05, 1.07),
        ])
        .unwrap();

        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![0, 2, 4]); // positions of A.1,B.1,C.1 after sort
        (dataset, chash)
    }

    fn positions_by_label(dataset: &SpatialDataset, label: &str, idx: u64) -> usize {
        let fid = dataset.feature_id_of_label(label).unwrap();
        dataset
            .instances_of(fid)
            .iter()
            .copied()
            .find(|&p| dataset.instance(p).idx() == idx)
            .unwrap()
    }

    #[test]
    fn perfect_colocation_has_pi_one() {
        let dataset = SpatialDataset::new(vec![
            Instance::new("A", 1, 0.0, 0.0),
            Instance::new("B", 1, 0.1, 0.0),
            Instance::new("C", 1, 0.05, 0.08),
            Instance::new("A", 2, 1.0, 1.0),
            Instance::new("B", 2, 1.1, 1.0),
            Instance::new("C", 2, 1.05, 1.07),
        ])
        .unwrap();

        let a1 = positions_by_label(&dataset, "A", 1);
        let b1 = positions_by_label(&dataset, "B", 1);
        let c1 = positions_by_label(&dataset, "C", 1);
        let a2 = positions_by_label(&dataset, "A", 2);
        let b2 = positions_by_label(&dataset, "B", 2);
        let c2 = positions_by_label(&dataset, "C", 2);

        let mut chash = CHash::new();
        chash.add_clique(&dataset, &vec![a1, b1, c1]);
        chash.add_clique(&dataset, &vec![a2, b2, c2]);

        let result = mine(&chash, &dataset, 0.5).unwrap();

        let a_id = dataset.feature_id_of_label("A").unwrap();
        let b_id = dataset.feature_id_of_label("B").unwrap();
        let c_id = dataset.feature_id_of_label("C").unwrap();
        let abc = FeatureSet::from_ids(dataset.num_features(), [a_id, b_id, c_id]);
        let ab = FeatureSet::from_ids(dataset.num_features(), [a_id, b_id]);

        assert_eq!(result.get(&abc), Some(&1.0));
        assert_eq!(result.get(&ab), Some(&1.0));
    }

    #[test]
    fn below_threshold_types_are_absent() {
        let (dataset, chash) = two_triangles_chash();
        let result = mine(&chash, &dataset, 0.9).unwrap();

        let a_id = dataset.feature_id_of_label("A").unwrap();
        let only_a = FeatureSet::from_ids(dataset.num_features(), [a_id]);
        assert!(!result.contains_key(&only_a)); // singletons are never emitted
    }

    #[test]
    fn rejects_out_of_range_min_prev() {
        let (dataset, chash) = two_triangles_chash();
        assert!(matches!(
            mine(&chash, &dataset, 1.5),
            Err(CoLocationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            mine(&chash, &dataset, -0.1),
            Err(CoLocationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn pi_is_anti_monotone() {
        let (dataset, chash) = two_triangles_chash();
        let a_id = dataset.feature_id_of_label("A").unwrap();
        let b_id = dataset.feature_id_of_label("B").unwrap();
        let c_id = dataset.feature_id_of_label("C").unwrap();

        let ab = FeatureSet::from_ids(dataset.num_features(), [a_id, b_id]);
        let abc = FeatureSet::from_ids(dataset.num_features(), [a_id, b_id, c_id]);

        let pi_ab = participation_index(&chash, &dataset, &ab);
        let pi_abc = participation_index(&chash, &dataset, &abc);
        assert!(pi_ab >= pi_abc);
    }
}
