//! The mining façade: composes the dataset, neighborhood, clique
//! enumeration, C-Hash, and prevalence stages into one entry point.

use std::str::FromStr;
use std::time::Instant;

use log::{debug, info};

use crate::chash::CHash;
use crate::dataset::SpatialDataset;
use crate::error::{CoLocationError, Result};
use crate::ids::Clique;
use crate::prevalence::{self, PrevalenceMap};
use crate::{ids, nds, neighborhood};

/// Which clique-enumeration scheme the façade should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Instance-driven tree-BFS enumeration (may yield non-maximal
    /// cliques; cheaper per-head, more total work on dense inputs).
    Ids,
    /// Neighborhood-driven Bron–Kerbosch enumeration (maximal cliques
    /// only).
    Nds,
}

impl FromStr for Scheme {
    type Err = CoLocationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ids" => Ok(Scheme::Ids),
            "nds" => Ok(Scheme::Nds),
            other => Err(CoLocationError::InvalidConfiguration(format!(
                "unknown clique scheme {other:?}, expected \"ids\" or \"nds\""
            ))),
        }
    }
}

/// The full output of one mining run.
#[derive(Debug, Clone)]
pub struct MiningOutput {
    /// The cliques produced by the selected enumeration scheme, in a
    /// deterministic sorted order.
    pub cliques: Vec<Clique>,
    /// The C-Hash built from those cliques.
    pub chash: CHash,
    /// The prevalent co-location types and their PI values.
    pub prevalent: PrevalenceMap,
}

fn validate(min_dist: f64, min_prev: f64) -> Result<()> {
    if !(min_dist > 0.0) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "min_dist must be > 0, got {min_dist}"
        )));
    }
    if !(0.0..=1.0).contains(&min_prev) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "min_prev must be within [0, 1], got {min_prev}"
        )));
    }
    Ok(())
}

/// Runs the full pipeline: neighborhood materialization, clique
/// enumeration with the named scheme, C-Hash construction, and
/// prevalence mining.
///
/// `scheme` is matched case-insensitively against `"ids"`/`"nds"`.
pub fn mine(dataset: &SpatialDataset, min_dist: f64, min_prev: f64, scheme: &str) -> Result<MiningOutput> {
    let scheme = scheme.parse::<Scheme>()?;
    mine_with_scheme(dataset, min_dist, min_prev, scheme)
}

/// Runs the full pipeline with an already-resolved [`Scheme`].
pub fn mine_with_scheme(
    dataset: &SpatialDataset,
    min_dist: f64,
    min_prev: f64,
    scheme: Scheme,
) -> Result<MiningOutput> {
    validate(min_dist, min_prev)?;

    info!(
        "mining {} instances over {} features (scheme={:?}, min_dist={min_dist}, min_prev={min_prev})",
        dataset.len(),
        dataset.num_features(),
        scheme,
    );

    let t0 = Instant::now();
    let relation = neighborhood::materialize_par(dataset, min_dist)?;
    let neighbor_count: usize = (0..dataset.len()).map(|i| relation.ns(i).len()).sum();
    debug!(
        "neighborhood materialized in {:?} ({} directed neighbor entries)",
        t0.elapsed(),
        neighbor_count,
    );

    let t1 = Instant::now();
    let cliques = match scheme {
        Scheme::Ids => ids::enumerate_par(dataset, &relation),
        Scheme::Nds => nds::enumerate_par(dataset, &relation),
    };
    debug!("{:?} produced {} raw cliques in {:?}", scheme, cliques.len(), t1.elapsed());

    let t2 = Instant::now();
    let mut chash = CHash::new();
    for clique in &cliques {
        chash.add_clique(dataset, clique);
    }
    debug!("C-Hash built with {} keys in {:?}", chash.len(), t2.elapsed());

    let t3 = Instant::now();
    let prevalent = prevalence::mine(&chash, dataset, min_prev)?;
    debug!("prevalence mining found {} types in {:?}", prevalent.len(), t3.elapsed());

    info!(
        "mining complete: {} cliques, {} prevalent types",
        cliques.len(),
        prevalent.len()
    );

    Ok(MiningOutput {
        cliques,
        chash,
        prevalent,
    })
}
