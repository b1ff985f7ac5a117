//! `SpatialDataset`: an ordered, immutable collection of `Instance`s with
//! feature-grouping derived once at construction time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoLocationError, Result};
use crate::instance::Instance;

/// An ordered sequence of [`Instance`]s, sorted by the instance total
/// order on construction, plus a derived `feature -> ordered instances`
/// mapping and per-feature counts.
///
/// Because the dataset is sorted by the same total order used
/// everywhere else in the pipeline, an instance's position in
/// [`SpatialDataset::instances`] doubles as its rank in that order —
/// downstream stages (neighborhood materialization, clique enumeration)
/// work with plain `usize` positions instead of re-deriving comparisons.
#[derive(Debug, Clone)]
pub struct SpatialDataset {
    instances: Vec<Instance>,
    /// Sorted, de-duplicated feature labels. An instance's `feature_id`
    /// is its position in this table.
    feature_names: Vec<Arc<str>>,
    /// `feature_id` for the instance at the same position in `instances`.
    feature_ids: Vec<usize>,
    /// Count of instances per `feature_id`.
    feature_counts: Vec<usize>,
    /// Instance indices grouped by `feature_id`, each list in dataset
    /// order.
    by_feature: Vec<Vec<usize>>,
}

impl SpatialDataset {
    /// Builds a dataset from an unordered collection of instances,
    /// sorting them by the instance total order and deriving the
    /// feature-grouping tables.
    ///
    /// # Errors
    ///
    /// Returns [`CoLocationError::InvariantViolation`] if two instances
    /// share a `(feature, idx)` pair — the dataset's uniqueness
    /// invariant.
    pub fn new(mut instances: Vec<Instance>) -> Result<Self> {
        instances.sort();

        for pair in instances.windows(2) {
            if pair[0].feature() == pair[1].feature() && pair[0].idx() == pair[1].idx() {
                return Err(CoLocationError::InvariantViolation(format!(
                    "duplicate instance (feature, idx) = ({}, {})",
                    pair[0].feature(),
                    pair[0].idx()
                )));
            }
        }

        let mut feature_names: Vec<Arc<str>> =
            instances.iter().map(|i| Arc::<str>::from(i.feature())).collect();
        feature_names.sort();
        feature_names.dedup();

        let feature_index: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.as_ref(), id))
            .collect();

        let mut feature_counts = vec![0usize; feature_names.len()];
        let mut by_feature = vec![Vec::new(); feature_names.len()];
        let mut feature_ids = Vec::with_capacity(instances.len());

        for (pos, inst) in instances.iter().enumerate() {
            let fid = feature_index[inst.feature()];
            feature_ids.push(fid);
            feature_counts[fid] += 1;
            by_feature[fid].push(pos);
        }

        Ok(Self {
            instances,
            feature_names,
            feature_ids,
            feature_counts,
            by_feature,
        })
    }

    /// The number of instances in the dataset.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the dataset has no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The dataset's instances, in total order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The instance at position `i` in the dataset's total order.
    pub fn instance(&self, i: usize) -> &Instance {
        &self.instances[i]
    }

    /// The number of distinct features in the dataset.
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// The sorted, de-duplicated feature labels; a feature's `feature_id`
    /// is its position in this slice.
    pub fn feature_names(&self) -> &[Arc<str>] {
        &self.feature_names
    }

    /// The `feature_id` of the instance at position `i`.
    pub fn feature_id(&self, i: usize) -> usize {
        self.feature_ids[i]
    }

    /// `|f|`, the dataset count of the feature with the given id.
    pub fn feature_count(&self, feature_id: usize) -> usize {
        self.feature_counts[feature_id]
    }

    /// `|f|` for every feature, indexed by `feature_id`.
    pub fn feature_counts(&self) -> &[usize] {
        &self.feature_counts
    }

    /// The positions of instances bearing the given `feature_id`, in
    /// dataset order.
    pub fn instances_of(&self, feature_id: usize) -> &[usize] {
        &self.by_feature[feature_id]
    }

    /// Looks up a feature's id by label, if present in the dataset.
    pub fn feature_id_of_label(&self, label: &str) -> Option<usize> {
        self.feature_names.iter().position(|name| name.as_ref() == label)
    }
}
