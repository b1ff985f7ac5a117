//! `FeatureSet`: a canonical, hashable key for a co-location type.
//!
//! A co-location type is an unordered set of feature ids. Representing
//! it as a fixed-width bitset (rather than a sorted `Vec<String>`) gives
//! `O(1)` subset/superset/cardinality checks, grounded on the teacher's
//! use of `bitvec::prelude::BitVec` for `Cluster::history`.

use bitvec::prelude::*;

/// A canonical, structurally-hashable key for a co-location type: a set
/// of feature ids over a fixed-size universe of `num_features`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureSet {
    bits: BitVec,
}

impl FeatureSet {
    /// The empty co-location type over a universe of `num_features`
    /// feature ids.
    pub fn empty(num_features: usize) -> Self {
        Self {
            bits: bitvec![0; num_features],
        }
    }

    /// Builds a `FeatureSet` from an iterator of feature ids.
    pub fn from_ids(num_features: usize, ids: impl IntoIterator<Item = usize>) -> Self {
        let mut fs = Self::empty(num_features);
        for id in ids {
            fs.insert(id);
        }
        fs
    }

    /// The size of the feature-id universe this set was built over.
    pub fn num_features(&self) -> usize {
        self.bits.len()
    }

    /// Adds a feature id to the set.
    pub fn insert(&mut self, id: usize) {
        self.bits.set(id, true);
    }

    /// Whether `id` is a member of this set.
    pub fn contains(&self, id: usize) -> bool {
        self.bits[id]
    }

    /// The cardinality of this co-location type.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether this is the empty co-location type.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the feature ids in this set, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Whether every feature id in `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.ids().all(|id| other.contains(id))
    }

    /// A new `FeatureSet` with `id` removed.
    pub fn without(&self, id: usize) -> Self {
        let mut bits = self.bits.clone();
        bits.set(id, false);
        Self { bits }
    }

    /// All proper, nonempty subsets of this set with cardinality at
    /// least 2 — i.e. every subset except the empty set, the singletons,
    /// and the full set itself.
    ///
    /// Walks combinations directly rather than a bitmask over `1 << n`:
    /// a co-location type's cardinality is unbounded by the universe
    /// size, so a fixed-width shift would overflow for wide types.
    pub fn proper_subsets_at_least_2(&self) -> Vec<FeatureSet> {
        let ids: Vec<usize> = self.ids().collect();
        let n = ids.len();
        if n < 3 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for k in 2..n {
            combinations(&ids, k, &mut Vec::with_capacity(k), &mut |combo| {
                out.push(FeatureSet::from_ids(self.num_features(), combo.iter().copied()));
            });
        }
        out
    }

    /// The direct subsets of this set: each obtained by removing exactly
    /// one feature id, filtered to those with cardinality at least 2.
    pub fn direct_subsets_at_least_2(&self) -> Vec<FeatureSet> {
        if self.len() < 3 {
            return Vec::new();
        }
        self.ids().map(|id| self.without(id)).collect()
    }
}

/// Calls `visit` with every size-`k` combination of `items`, in
/// ascending order, without materializing the full combination list.
fn combinations(items: &[usize], k: usize, chosen: &mut Vec<usize>, visit: &mut impl FnMut(&[usize])) {
    if chosen.len() == k {
        visit(chosen);
        return;
    }
    let remaining_needed = k - chosen.len();
    if items.len() < remaining_needed {
        return;
    }
    let (&first, rest) = match items.split_first() {
        Some(split) => split,
        None => return,
    };

    chosen.push(first);
    combinations(rest, k, chosen, visit);
    chosen.pop();

    combinations(rest, k, chosen, visit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_and_superset() {
        let abc = FeatureSet::from_ids(5, [0, 1, 2]);
        let ab = FeatureSet::from_ids(5, [0, 1]);
        assert!(ab.is_subset(&abc));
        assert!(!abc.is_subset(&ab));
    }

    #[test]
    fn direct_subsets_drop_one_each() {
        let abc = FeatureSet::from_ids(5, [0, 1, 2]);
        let subs = abc.direct_subsets_at_least_2();
        assert_eq!(subs.len(), 3);
        for sub in &subs {
            assert_eq!(sub.len(), 2);
            assert!(sub.is_subset(&abc));
        }
    }

    #[test]
    fn proper_subsets_exclude_full_and_singletons() {
        let abcd = FeatureSet::from_ids(5, [0, 1, 2, 3]);
        let subs = abcd.proper_subsets_at_least_2();
        // pairs: C(4,2)=6, triples: C(4,3)=4 => 10 total
        assert_eq!(subs.len(), 10);
        for sub in &subs {
            assert!(sub.len() >= 2);
            assert!(sub.len() < 4);
        }
    }

    #[test]
    fn proper_subsets_handles_wide_types_without_overflow() {
        // A co-location type this wide would have overflowed a `1u32 <<
        // n` mask; the combination walk has no such width limit.
        let ids: Vec<usize> = (0..10).collect();
        let wide = FeatureSet::from_ids(10, ids);
        let subs = wide.proper_subsets_at_least_2();
        // sum_{k=2}^{9} C(10,k) = 2^10 - C(10,0) - C(10,1) - C(10,10) = 1002
        assert_eq!(subs.len(), 1002);
        for sub in &subs {
            assert!(sub.len() >= 2);
            assert!(sub.len() < 10);
            assert!(sub.is_subset(&wide));
        }
    }

    #[test]
    fn pairs_have_no_proper_subsets_at_least_2() {
        let ab = FeatureSet::from_ids(5, [0, 1]);
        assert!(ab.proper_subsets_at_least_2().is_empty());
        assert!(ab.direct_subsets_at_least_2().is_empty());
    }
}
