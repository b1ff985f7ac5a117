//! Grid-based neighborhood materialization (Algorithm 1).
//!
//! Partitions the plane into cells of side `min_dist` so that any pair
//! of instances within `min_dist` of one another must fall in the same
//! cell or one of its 8 neighbors, then only examines those 9-cell
//! windows instead of every pair in the dataset.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::dataset::SpatialDataset;
use crate::error::{CoLocationError, Result};

/// Per-instance full (`Ns`), small (`SNs`), and big (`BNs`) neighbor
/// sets, keyed by an instance's position in its `SpatialDataset`'s
/// total order.
///
/// Because the dataset is sorted by the same total order this relation
/// is built against, `i < j` in position is equivalent to `instance(i) <
/// instance(j)`, so `SNs`/`BNs` partitioning reduces to a plain integer
/// comparison.
#[derive(Debug, Clone)]
pub struct NeighborhoodRelation {
    n: Vec<Vec<usize>>,
    sn: Vec<Vec<usize>>,
    bn: Vec<Vec<usize>>,
}

impl NeighborhoodRelation {
    fn empty(len: usize) -> Self {
        Self {
            n: vec![Vec::new(); len],
            sn: vec![Vec::new(); len],
            bn: vec![Vec::new(); len],
        }
    }

    /// `Ns(s)`: every instance within `min_dist` of the instance at
    /// position `i`, as sorted dataset positions.
    pub fn ns(&self, i: usize) -> &[usize] {
        &self.n[i]
    }

    /// `SNs(s) = { t ∈ Ns(s) : t < s }`.
    pub fn sns(&self, i: usize) -> &[usize] {
        &self.sn[i]
    }

    /// `BNs(s) = { t ∈ Ns(s) : t > s }`.
    pub fn bns(&self, i: usize) -> &[usize] {
        &self.bn[i]
    }

    fn add_edge(&mut self, smaller: usize, bigger: usize) {
        if !self.bn[smaller].contains(&bigger) {
            self.bn[smaller].push(bigger);
            self.sn[bigger].push(smaller);
            self.n[smaller].push(bigger);
            self.n[bigger].push(smaller);
        }
    }

    fn finalize(mut self) -> Self {
        for v in self.n.iter_mut().chain(self.sn.iter_mut()).chain(self.bn.iter_mut()) {
            v.sort_unstable();
            v.dedup();
        }
        self
    }
}

type Cell = (i64, i64);

fn cell_of(dataset: &SpatialDataset, i: usize, min_dist: f64, min_x: f64, min_y: f64) -> Cell {
    let inst = dataset.instance(i);
    let gx = ((inst.x() - min_x) / min_dist).floor() as i64;
    let gy = ((inst.y() - min_y) / min_dist).floor() as i64;
    (gx, gy)
}

fn build_grid(dataset: &SpatialDataset, min_dist: f64) -> (HashMap<Cell, Vec<usize>>, f64, f64) {
    let min_x = dataset
        .instances()
        .iter()
        .map(|i| i.x())
        .fold(f64::INFINITY, f64::min);
    let min_y = dataset
        .instances()
        .iter()
        .map(|i| i.y())
        .fold(f64::INFINITY, f64::min);
    let min_x = if min_x.is_finite() { min_x } else { 0.0 };
    let min_y = if min_y.is_finite() { min_y } else { 0.0 };

    let mut grid: HashMap<Cell, Vec<usize>> = HashMap::new();
    for i in 0..dataset.len() {
        let cell = cell_of(dataset, i, min_dist, min_x, min_y);
        grid.entry(cell).or_default().push(i);
    }
    (grid, min_x, min_y)
}

fn neighbor_cells(cell: Cell) -> [Cell; 9] {
    let (x, y) = cell;
    [
        (x - 1, y - 1),
        (x - 1, y),
        (x - 1, y + 1),
        (x, y - 1),
        (x, y),
        (x, y + 1),
        (x + 1, y - 1),
        (x + 1, y),
        (x + 1, y + 1),
    ]
}

fn validate(min_dist: f64) -> Result<()> {
    if !(min_dist > 0.0) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "min_dist must be > 0, got {min_dist}"
        )));
    }
    Ok(())
}

/// Materializes the neighborhood relation sequentially.
pub fn materialize(dataset: &SpatialDataset, min_dist: f64) -> Result<NeighborhoodRelation> {
    validate(min_dist)?;
    if dataset.is_empty() {
        return Ok(NeighborhoodRelation::empty(0));
    }

    let (grid, min_x, min_y) = build_grid(dataset, min_dist);
    let min_dist_sq = min_dist * min_dist;
    let mut relation = NeighborhoodRelation::empty(dataset.len());

    for (&cell, members) in &grid {
        let mut candidates: Vec<usize> = Vec::new();
        for nc in neighbor_cells(cell) {
            if let Some(group) = grid.get(&nc) {
                candidates.extend(group.iter().copied());
            }
        }
        for &s in members {
            for &t in &candidates {
                if s == t {
                    continue;
                }
                if dataset.instance(s).distance_sq(dataset.instance(t)) <= min_dist_sq {
                    let (smaller, bigger) = if s < t { (s, t) } else { (t, s) };
                    relation.add_edge(smaller, bigger);
                }
            }
        }
    }

    let _ = (min_x, min_y);
    Ok(relation.finalize())
}

/// Materializes the neighborhood relation, parallelizing the per-cell
/// pair-check pass with `rayon`. Produces the same relation as
/// [`materialize`]; the per-cell results are merged sequentially so the
/// output is deterministic regardless of thread scheduling.
pub fn materialize_par(dataset: &SpatialDataset, min_dist: f64) -> Result<NeighborhoodRelation> {
    validate(min_dist)?;
    if dataset.is_empty() {
        return Ok(NeighborhoodRelation::empty(0));
    }

    let (grid, _min_x, _min_y) = build_grid(dataset, min_dist);
    let min_dist_sq = min_dist * min_dist;

    let cell_edges: Vec<(usize, usize)> = grid
        .par_iter()
        .flat_map_iter(|(&cell, members)| {
            let mut candidates: Vec<usize> = Vec::new();
            for nc in neighbor_cells(cell) {
                if let Some(group) = grid.get(&nc) {
                    candidates.extend(group.iter().copied());
                }
            }
            let mut edges = Vec::new();
            for &s in members {
                for &t in &candidates {
                    if s == t {
                        continue;
                    }
                    if dataset.instance(s).distance_sq(dataset.instance(t)) <= min_dist_sq {
                        let (smaller, bigger) = if s < t { (s, t) } else { (t, s) };
                        edges.push((smaller, bigger));
                    }
                }
            }
            edges
        })
        .collect();

    let mut relation = NeighborhoodRelation::empty(dataset.len());
    for (smaller, bigger) in cell_edges {
        relation.add_edge(smaller, bigger);
    }
    Ok(relation.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    fn triangle_dataset() -> SpatialDataset {
        SpatialDataset::new(vec![
            Instance::new("A", 1, 0.0, 0.0),
            Instance::new("B", 1, 0.1, 0.0),
            Instance::new("C", 1, 0.05, 0.08),
            Instance::new("D", 1, 0.5, 0.5),
        ])
        .unwrap()
    }

    #[test]
    fn neighbor_symmetry() {
        let dataset = triangle_dataset();
        let rel = materialize(&dataset, 0.2).unwrap();
        for s in 0..dataset.len() {
            for &t in rel.ns(s) {
                assert!(rel.ns(t).contains(&s), "Ns should be symmetric");
            }
            for &t in rel.bns(s) {
                assert!(rel.sns(t).contains(&s), "t in BNs(s) => s in SNs(t)");
            }
        }
    }

    #[test]
    fn distance_correctness() {
        let dataset = triangle_dataset();
        let min_dist = 0.2;
        let rel = materialize(&dataset, min_dist).unwrap();
        for s in 0..dataset.len() {
            for t in 0..dataset.len() {
                if s == t {
                    continue;
                }
                let within = dataset.instance(s).distance(dataset.instance(t)) <= min_dist;
                assert_eq!(rel.ns(s).contains(&t), within);
            }
        }
    }

    #[test]
    fn isolated_instance_has_no_neighbors() {
        let dataset = triangle_dataset();
        // D is the 4th instance (index 3) and isolated at min_dist=0.2.
        let rel = materialize(&dataset, 0.2).unwrap();
        let d_idx = dataset.feature_id_of_label("D").unwrap();
        let d_pos = dataset.instances_of(d_idx)[0];
        assert!(rel.ns(d_pos).is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_relation() {
        let dataset = SpatialDataset::new(vec![]).unwrap();
        let rel = materialize(&dataset, 1.0).unwrap();
        assert_eq!(rel.n.len(), 0);
    }

    #[test]
    fn rejects_non_positive_min_dist() {
        let dataset = triangle_dataset();
        assert!(matches!(
            materialize(&dataset, 0.0),
            Err(CoLocationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            materialize(&dataset, -1.0),
            Err(CoLocationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let dataset = triangle_dataset();
        let seq = materialize(&dataset, 0.2).unwrap();
        let par = materialize_par(&dataset, 0.2).unwrap();
        for s in 0..dataset.len() {
            assert_eq!(seq.ns(s), par.ns(s));
            assert_eq!(seq.sns(s), par.sns(s));
            assert_eq!(seq.bns(s), par.bns(s));
        }
    }
}
