
pub mod core;

pub use core::{ExtendibleHashing, LinearHashing, HashIndex, Page, ExtendibleOptions, LinearOptions, Key, PageNum};
pub use core::errors::{Error, Result};
pub use core::metrics::MetricsSnapshot;
pub use core::experiment::{generate_keys, run_experiment, ExperimentConfig, ExperimentEvent, ExperimentResults, LinearResults, Sample, Series};
