//! NDS: the neighborhood-driven, Bron–Kerbosch maximal-clique enumerator.
//!
//! For each instance `h` in total order, enumerates every maximal
//! feature-distinct clique having `h` as its minimum instance. Ranging
//! `h` over the whole dataset enumerates all maximal cliques exactly
//! once, since every clique has a unique minimum under the total order.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::dataset::SpatialDataset;
use crate::ids::Clique;
use crate::neighborhood::NeighborhoodRelation;

/// `Ns(v)` restricted to instances bearing a different feature than
/// `v`. Two instances with the same feature are never adjacent in this
/// scheme's sense of "neighbor" — this is what lets plain Bron–Kerbosch
/// enforce feature-distinctness without a separate check.
fn distinct_neighbors(dataset: &SpatialDataset, relation: &NeighborhoodRelation, v: usize) -> Vec<usize> {
    let feature = dataset.feature_id(v);
    relation
        .ns(v)
        .iter()
        .copied()
        .filter(|&u| dataset.feature_id(u) != feature)
        .collect()
}

fn sorted_intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

fn expand(
    dataset: &SpatialDataset,
    relation: &NeighborhoodRelation,
    r: &mut Vec<usize>,
    mut p: Vec<usize>,
    mut x: Vec<usize>,
    out: &mut Vec<Clique>,
) {
    if p.is_empty() && x.is_empty() {
        if r.len() >= 2 {
            let mut clique = r.clone();
            clique.sort_unstable();
            out.push(clique);
        }
        return;
    }

    for &v in &p.clone() {
        let nv = distinct_neighbors(dataset, relation, v);
        r.push(v);
        let next_p = sorted_intersect(&p, &nv);
        let next_x = sorted_intersect(&x, &nv);
        expand(dataset, relation, r, next_p, next_x, out);
        r.pop();

        p.retain(|&u| u != v);
        x.push(v);
        x.sort_unstable();
    }
}

fn expand_from_head(dataset: &SpatialDataset, relation: &NeighborhoodRelation, h: usize) -> Vec<Clique> {
    let p = distinct_neighbors(dataset, relation, h)
        .into_iter()
        .filter(|&u| u > h)
        .collect::<Vec<_>>();
    let mut r = vec![h];
    let mut out = Vec::new();
    expand(dataset, relation, &mut r, p, Vec::new(), &mut out);
    out
}

/// Drops cliques that are a strict subset of another, strictly larger
/// clique in `cliques` — a defensive guard against non-maximal output
/// slipping through, since the recursion should already yield maximal
/// cliques only when every head's `P` is restricted to `BNs(h)`.
fn drop_non_maximal(cliques: Vec<Clique>) -> Vec<Clique> {
    let unique: Vec<Clique> = {
        let mut seen = HashSet::new();
        cliques.into_iter().filter(|c| seen.insert(c.clone())).collect()
    };

    unique
        .iter()
        .filter(|c| {
            !unique.iter().any(|d| {
                d.len() > c.len() && sorted_intersect(c, d).len() == c.len()
            })
        })
        .cloned()
        .collect()
}

/// Enumerates all maximal feature-distinct cliques sequentially.
pub fn enumerate(dataset: &SpatialDataset, relation: &NeighborhoodRelation) -> Vec<Clique> {
    let cliques: Vec<Clique> = (0..dataset.len())
        .flat_map(|h| expand_from_head(dataset, relation, h))
        .collect();
    drop_non_maximal(cliques)
}

/// Enumerates maximal cliques as [`enumerate`] does, parallelizing the
/// per-head recursion with `rayon`. Returns results in a deterministic
/// sorted order.
pub fn enumerate_par(dataset: &SpatialDataset, relation: &NeighborhoodRelation) -> Vec<Clique> {
    let mut cliques: Vec<Clique> = (0..dataset.len())
        .into_par_iter()
        .flat_map_iter(|h| expand_from_head(dataset, relation, h))
        .collect();
    cliques = drop_non_maximal(cliques);
    cliques.sort();
    cliques
}
