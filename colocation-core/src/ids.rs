//! IDS: the instance-driven, tree-BFS maximal-clique enumerator.
//!
//! Builds one I-tree per head instance (in total order), rooted at a
//! sentinel whose children are the head nodes. Each head's subtree is
//! expanded breadth-first and discarded before the next head is
//! processed, so memory use is bounded by the widest single subtree
//! rather than the whole tree at once.

use rayon::prelude::*;

use crate::dataset::SpatialDataset;
use crate::neighborhood::NeighborhoodRelation;

/// A clique, as a sorted list of dataset positions (total-order ranks).
pub type Clique = Vec<usize>;

struct Node {
    /// Dataset position of the instance carried by this node.
    pos: usize,
    /// Feature id of the instance carried by this node, cached to avoid
    /// re-deriving it on every descendant expansion.
    feature_id: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Whether this node is a direct child of the sentinel root, i.e. a
    /// head node. The head-node test is "parent is the sentinel root",
    /// not a pointer-identity check on grandparents.
    is_head: bool,
}

/// An arena-backed I-tree for a single head instance's subtree. Indices
/// are positions into `nodes`; there is no reverse (root) sentinel node
/// stored explicitly — head nodes record `parent: None` and `is_head:
/// true` instead.
struct HeadTree {
    nodes: Vec<Node>,
}

impl HeadTree {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, pos: usize, feature_id: usize, parent: Option<usize>, is_head: bool) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            pos,
            feature_id,
            parent,
            children: Vec::new(),
            is_head,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(idx);
        }
        idx
    }

    /// Ancestor feature ids on the root-to-`node` path, including the
    /// instance carried by `node` itself: the path from the sentinel
    /// root passes through every node up to and including `node`, so a
    /// sibling subtree sharing `node`'s own feature would violate
    /// feature-distinctness just as sharing an ancestor's feature would.
    fn ancestor_features(&self, node: usize) -> Vec<usize> {
        let mut features = Vec::new();
        let mut cur = Some(node);
        while let Some(n) = cur {
            features.push(self.nodes[n].feature_id);
            cur = self.nodes[n].parent;
        }
        features
    }

    /// `RS(n)`: instances carried by right siblings of `n` — every
    /// sibling appearing after `n` in their shared parent's child list.
    /// Head nodes have no parent in this arena and no siblings to speak
    /// of; the head's own children are `BNs(s)` directly (see
    /// `expand_head`).
    fn right_siblings(&self, node: usize) -> Vec<usize> {
        let Some(parent) = self.nodes[node].parent else {
            return Vec::new();
        };
        let siblings = &self.nodes[parent].children;
        let pos = siblings.iter().position(|&c| c == node).expect("node is a registered child");
        siblings[pos + 1..].to_vec()
    }

    fn path_to_root(&self, leaf: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = Some(leaf);
        while let Some(n) = cur {
            path.push(self.nodes[n].pos);
            cur = self.nodes[n].parent;
        }
        path
    }
}

fn expand_head(
    dataset: &SpatialDataset,
    relation: &NeighborhoodRelation,
    head_pos: usize,
) -> Vec<Clique> {
    let mut tree = HeadTree::new();
    let head_feature = dataset.feature_id(head_pos);
    let head_idx = tree.push(head_pos, head_feature, None, true);

    let mut cliques = Vec::new();
    let mut frontier = vec![head_idx];

    while !frontier.is_empty() {
        let mut next_frontier = Vec::new();

        for node_idx in frontier {
            let candidates: Vec<usize> = if tree.nodes[node_idx].is_head {
                relation.bns(head_pos).to_vec()
            } else {
                let rs = tree.right_siblings(node_idx);
                let rs_positions: std::collections::HashSet<usize> =
                    rs.iter().map(|&n| tree.nodes[n].pos).collect();
                relation
                    .bns(tree.nodes[node_idx].pos)
                    .iter()
                    .copied()
                    .filter(|p| rs_positions.contains(p))
                    .collect()
            };

            let ancestor_features = tree.ancestor_features(node_idx);
            let mut children = Vec::new();
            for &cand_pos in &candidates {
                let cand_feature = dataset.feature_id(cand_pos);
                if ancestor_features.contains(&cand_feature) {
                    continue;
                }
                let child_idx = tree.push(cand_pos, cand_feature, Some(node_idx), false);
                children.push(child_idx);
            }

            if children.is_empty() {
                let mut path = tree.path_to_root(node_idx);
                if path.len() >= 2 {
                    path.sort_unstable();
                    cliques.push(path);
                }
            } else {
                next_frontier.extend(children);
            }
        }

        frontier = next_frontier;
    }

    cliques
}

/// Enumerates all root-to-leaf path cliques across every head's I-tree,
/// sequentially.
///
/// The result may contain non-maximal cliques (a path clique can be a
/// subset of a longer one rooted at the same head); callers that need
/// maximal cliques only should prefer [`crate::nds`].
pub fn enumerate(dataset: &SpatialDataset, relation: &NeighborhoodRelation) -> Vec<Clique> {
    (0..dataset.len())
        .flat_map(|head| expand_head(dataset, relation, head))
        .collect()
}

/// Enumerates cliques as [`enumerate`] does, parallelizing the per-head
/// subtree expansion with `rayon` since head subtrees are independent.
/// Results are sorted into a deterministic order before being returned,
/// per the pipeline's reproducibility requirement.
pub fn enumerate_par(dataset: &SpatialDataset, relation: &NeighborhoodRelation) -> Vec<Clique> {
    let mut cliques: Vec<Clique> = (0..dataset.len())
        .into_par_iter()
        .flat_map_iter(|head| expand_head(dataset, relation, head))
        .collect();
    cliques.sort();
    cliques
}
