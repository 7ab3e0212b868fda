pub mod constants;
pub mod errors;
pub mod page;
pub mod metrics;
pub mod options;
pub mod index;
pub mod extendible;
pub mod linear;
pub mod experiment;

pub use constants::*;
pub use page::{Page, PageArena};
pub use metrics::{Metrics, MetricsSnapshot};
pub use options::{ExtendibleOptions, LinearOptions};
pub use index::HashIndex;
pub use extendible::ExtendibleHashing;
pub use linear::LinearHashing;
pub use experiment::{ExperimentConfig, ExperimentEvent, ExperimentResults, LinearResults, Sample, Series};
