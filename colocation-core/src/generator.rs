//! A seeded synthetic dataset generator, used by the test suite and the
//! CLI demo's `generate` subcommand.
//!
//! Builds `P` co-location "cores" (subsets of features meant to cluster
//! together), scatters each core's instances across randomly chosen
//! grid cells of side `min_dist`, then pads or truncates to exactly `m`
//! total instances with uniform-random noise.

use rand::seq::index;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::dataset::SpatialDataset;
use crate::error::{CoLocationError, Result};
use crate::instance::Instance;

/// Standard deviation used for the Gaussian draw of a core's feature
/// count around `mean_core_size`.
const CORE_SIZE_STD: f64 = 1.0;

/// Configuration for [`generate`].
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    /// `P`: number of co-location cores to seed.
    pub num_cores: usize,
    /// `I`: row-instances emitted per core.
    pub instances_per_core: usize,
    /// `D`: side length of the square study area.
    pub side: f64,
    /// `F`: number of distinct features.
    pub num_features: usize,
    /// `Q`: mean number of features per core.
    pub mean_core_size: f64,
    /// `m`: target total instance count (padded or truncated to this).
    pub target_total: usize,
    /// Grid cell side used when placing core instances; ordinarily the
    /// same value as the mining `min_dist` threshold, so generated
    /// clusters are genuinely within range of one another.
    pub min_dist: f64,
    /// Number of row-instances placed in the same chosen cell before a
    /// new cell is drawn.
    pub clumpy: usize,
    /// Optional seed for reproducible generation.
    pub seed: Option<u64>,
}

fn validate(params: &GeneratorParams) -> Result<()> {
    if params.num_features == 0 {
        return Err(CoLocationError::InvalidConfiguration(
            "num_features must be at least 1".to_string(),
        ));
    }
    if !(params.side > 0.0) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "side must be > 0, got {}",
            params.side
        )));
    }
    if !(params.min_dist > 0.0) {
        return Err(CoLocationError::InvalidConfiguration(format!(
            "min_dist must be > 0, got {}",
            params.min_dist
        )));
    }
    if params.clumpy == 0 {
        return Err(CoLocationError::InvalidConfiguration(
            "clumpy must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Spreadsheet-style column name for a 0-based feature index: `A, B,
/// …, Z, AA, AB, …`.
fn feature_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).expect("only ASCII letters are pushed")
}

fn sample_core_size(rng: &mut dyn RngCore, mean: f64, max_features: usize) -> usize {
    let normal = Normal::new(mean, CORE_SIZE_STD).unwrap_or_else(|_| Normal::new(mean.max(2.0), 1.0).unwrap());
    let drawn = normal.sample(rng).round();
    let clamped = drawn.max(2.0).min(max_features as f64);
    clamped as usize
}

fn generate_with_rng(params: &GeneratorParams, rng: &mut dyn RngCore) -> Vec<Instance> {
    let names: Vec<String> = (0..params.num_features).map(feature_name).collect();
    let mut idx_counters = vec![1u64; params.num_features];
    let mut instances = Vec::new();

    let cells_per_axis = (params.side / params.min_dist).ceil().max(1.0) as usize;

    for _ in 0..params.num_cores {
        let core_size = sample_core_size(rng, params.mean_core_size, params.num_features).min(params.num_features);
        let core_size = core_size.max(1).min(params.num_features);
        let core_features = if core_size >= params.num_features {
            (0..params.num_features).collect::<Vec<_>>()
        } else {
            index::sample(rng, params.num_features, core_size).into_vec()
        };

        let mut emitted = 0usize;
        while emitted < params.instances_per_core {
            let cx = rng.gen_range(0..cells_per_axis) as f64 * params.min_dist;
            let cy = rng.gen_range(0..cells_per_axis) as f64 * params.min_dist;
            let cell_span = params.min_dist.min(params.side);
            let group_size = params.clumpy.min(params.instances_per_core - emitted);

            for _ in 0..group_size {
                for &fid in &core_features {
                    let x = (cx + rng.gen_range(0.0..cell_span)).min(params.side);
                    let y = (cy + rng.gen_range(0.0..cell_span)).min(params.side);
                    instances.push(Instance::new(names[fid].as_str(), idx_counters[fid], x, y));
                    idx_counters[fid] += 1;
                }
                emitted += 1;
            }
        }
    }

    if instances.len() > params.target_total {
        instances.truncate(params.target_total);
    } else {
        while instances.len() < params.target_total {
            let fid = rng.gen_range(0..params.num_features);
            let x = rng.gen_range(0.0..params.side);
            let y = rng.gen_range(0.0..params.side);
            instances.push(Instance::new(names[fid].as_str(), idx_counters[fid], x, y));
            idx_counters[fid] += 1;
        }
    }

    instances
}

/// Generates a synthetic dataset from `params`, using a seeded
/// `ChaCha8Rng` when `params.seed` is set, or OS entropy otherwise.
pub fn generate(params: &GeneratorParams) -> Result<SpatialDataset> {
    validate(params)?;

    let instances = match params.seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generate_with_rng(params, &mut rng)
        }
        None => {
            let mut rng = rand::thread_rng();
            generate_with_rng(params, &mut rng)
        }
    };

    SpatialDataset::new(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(seed: u64) -> GeneratorParams {
        GeneratorParams {
            num_cores: 3,
            instances_per_core: 6,
            side: 10.0,
            num_features: 6,
            mean_core_size: 3.0,
            target_total: 40,
            min_dist: 0.5,
            clumpy: 2,
            seed: Some(seed),
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generate(&small_params(42)).unwrap();
        let b = generate(&small_params(42)).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.instances().iter().zip(b.instances().iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn reaches_target_total() {
        let dataset = generate(&small_params(7)).unwrap();
        assert_eq!(dataset.len(), 40);
    }

    #[test]
    fn feature_names_are_spreadsheet_style() {
        assert_eq!(feature_name(0), "A");
        assert_eq!(feature_name(25), "Z");
        assert_eq!(feature_name(26), "AA");
        assert_eq!(feature_name(27), "AB");
    }

    #[test]
    fn rejects_bad_configuration() {
        let mut params = small_params(1);
        params.min_dist = 0.0;
        assert!(matches!(
            generate(&params),
            Err(CoLocationError::InvalidConfiguration(_))
        ));

        let mut params = small_params(1);
        params.num_features = 0;
        assert!(matches!(
            generate(&params),
            Err(CoLocationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn instances_stay_within_the_study_area() {
        let dataset = generate(&small_params(3)).unwrap();
        for inst in dataset.instances() {
            assert!(inst.x() >= 0.0 && inst.x() <= 10.0);
            assert!(inst.y() >= 0.0 && inst.y() <= 10.0);
        }
    }
}
