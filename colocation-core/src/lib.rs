//! Prevalent spatial co-location pattern mining, after Yoo & Shekhar's
//! clique-driven pipeline: neighborhood materialization → clique
//! enumeration → C-Hash → participation-index prevalence filtering.

pub mod error;

pub mod chash;
pub mod dataset;
pub mod featureset;
pub mod generator;
pub mod ids;
pub mod instance;
pub mod io;
pub mod nds;
pub mod neighborhood;
pub mod pipeline;
pub mod prevalence;

pub use chash::CHash;
pub use dataset::SpatialDataset;
pub use error::{CoLocationError, Result};
pub use featureset::FeatureSet;
pub use generator::{generate, GeneratorParams};
pub use instance::Instance;
pub use io::{read_instances_csv, write_instances_csv};
pub use neighborhood::NeighborhoodRelation;
pub use pipeline::{mine, mine_with_scheme, MiningOutput, Scheme};
pub use prevalence::PrevalenceMap;
