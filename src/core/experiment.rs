use crate::core::constants::*;
use crate::core::errors::*;
use crate::core::extendible::ExtendibleHashing;
use crate::core::index::HashIndex;
use crate::core::linear::LinearHashing;
use crate::core::options::{ExtendibleOptions, LinearOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub page_capacity: usize,
    /// Prefix lengths of the shared key permutation to sample at.
    pub record_counts: Vec<usize>,
    pub alpha_values: Vec<f64>,
    /// Fixed seed for a reproducible key permutation.
    pub seed: Option<u64>,
    pub max_global_depth: u8,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            record_counts: DEFAULT_RECORD_COUNTS.to_vec(),
            alpha_values: DEFAULT_ALPHA_VALUES.to_vec(),
            seed: None,
            max_global_depth: DEFAULT_MAX_GLOBAL_DEPTH,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.record_counts.is_empty() {
            return Err(Error::InvalidExperiment {
                reason: "at least one record count is required".to_string(),
            });
        }
        if self.record_counts.contains(&0) {
            return Err(Error::InvalidExperiment {
                reason: "record counts must be positive".to_string(),
            });
        }
        self.extendible_options().validate()?;
        for &alpha in &self.alpha_values {
            self.linear_options(alpha).validate()?;
        }
        Ok(())
    }

    pub fn max_records(&self) -> usize {
        self.record_counts.iter().copied().max().unwrap_or(0)
    }

    pub fn extendible_options(&self) -> ExtendibleOptions {
        ExtendibleOptions {
            page_capacity: self.page_capacity,
            max_global_depth: self.max_global_depth,
        }
    }

    pub fn linear_options(&self, alpha_max: f64) -> LinearOptions {
        LinearOptions::new(self.page_capacity, alpha_max)
    }
}

/// `count` distinct keys drawn uniformly from `0..count * KEY_SPACE_FACTOR`.
pub fn generate_keys(count: usize, seed: Option<u64>) -> Vec<Key> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let space = count * KEY_SPACE_FACTOR as usize;
    rand::seq::index::sample(&mut rng, space, count)
        .into_iter()
        .map(|k| k as Key)
        .collect()
}

/// Renders an alpha the way the results file keys it (`0.75`, `1.0`).
pub fn alpha_key(alpha: f64) -> String {
    if alpha.fract() == 0.0 {
        format!("{:.1}", alpha)
    } else {
        format!("{}", alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub space_usage: usize,
    pub io_cost: u64,
}

impl Sample {
    pub fn of<I: HashIndex>(index: &I) -> Self {
        Self {
            space_usage: index.space_usage(),
            io_cost: index.io_cost(),
        }
    }
}

/// Space and effort samples, one per record count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub space: Vec<usize>,
    pub effort: Vec<u64>,
}

impl Series {
    pub fn push(&mut self, sample: Sample) {
        self.space.push(sample.space_usage);
        self.effort.push(sample.io_cost);
    }

    pub fn len(&self) -> usize {
        self.space.len()
    }

    pub fn is_empty(&self) -> bool {
        self.space.is_empty()
    }

    /// Space of every sample relative to the first one.
    pub fn space_growth(&self) -> Vec<f64> {
        match self.space.first() {
            Some(&base) if base > 0 => self
                .space
                .iter()
                .map(|&space| space as f64 / base as f64)
                .collect(),
            _ => vec![0.0; self.space.len()],
        }
    }
}

/// Linear hashing series keyed by alpha, in run order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearResults(Vec<(String, Series)>);

impl LinearResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, alpha: &str) -> &mut Series {
        let pos = match self.0.iter().position(|(key, _)| key == alpha) {
            Some(pos) => pos,
            None => {
                self.0.push((alpha.to_string(), Series::default()));
                self.0.len() - 1
            }
        };
        &mut self.0[pos].1
    }

    pub fn get(&self, alpha: &str) -> Option<&Series> {
        self.0.iter().find(|(key, _)| key == alpha).map(|(_, series)| series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.0.iter().map(|(key, series)| (key.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space ratio of each alpha to the next one, per sample.
    pub fn adjacent_space_ratios(&self) -> Vec<AlphaRatio> {
        self.0
            .windows(2)
            .map(|pair| {
                let (lower, a) = &pair[0];
                let (upper, b) = &pair[1];
                let ratios = a
                    .space
                    .iter()
                    .zip(&b.space)
                    .map(|(&x, &y)| if y == 0 { 0.0 } else { x as f64 / y as f64 })
                    .collect();
                AlphaRatio {
                    lower: lower.clone(),
                    upper: upper.clone(),
                    ratios,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlphaRatio {
    pub lower: String,
    pub upper: String,
    pub ratios: Vec<f64>,
}

impl Serialize for LinearResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (alpha, series) in &self.0 {
            map.serialize_entry(alpha, series)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LinearResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LinearVisitor;

        impl<'de> Visitor<'de> for LinearVisitor {
            type Value = LinearResults;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from alpha_max to space/effort series")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((alpha, series)) = access.next_entry::<String, Series>()? {
                    entries.push((alpha, series));
                }
                Ok(LinearResults(entries))
            }
        }

        deserializer.deserialize_map(LinearVisitor)
    }
}

/// The results artifact:
/// `{"extensible": {"space", "effort"}, "linear": {"<alpha>": {"space", "effort"}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub extensible: Series,
    pub linear: LinearResults,
}

impl ExperimentResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Progress notifications from [`run_experiment`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent {
    SeriesStarted {
        structure: &'static str,
        alpha: Option<f64>,
        runs: usize,
    },
    Sampled {
        structure: &'static str,
        alpha: Option<f64>,
        records: usize,
        sample: Sample,
    },
}

/// Inserts `keys` into `index` and samples it.
pub fn sample_after<I: HashIndex>(index: &mut I, keys: &[Key]) -> Result<Sample> {
    for &key in keys {
        index.insert(key)?;
    }
    Ok(Sample::of(index))
}

/// Runs every configured structure over each prefix of `keys`, building a
/// fresh structure per prefix length.
pub fn run_experiment<F>(config: &ExperimentConfig, keys: &[Key], mut observer: F) -> Result<ExperimentResults>
where
    F: FnMut(ExperimentEvent),
{
    config.validate()?;
    if keys.len() < config.max_records() {
        return Err(Error::InvalidExperiment {
            reason: format!(
                "{} keys supplied but {} are needed",
                keys.len(),
                config.max_records()
            ),
        });
    }

    let mut results = ExperimentResults::default();
    let runs = config.record_counts.len();

    observer(ExperimentEvent::SeriesStarted {
        structure: "extensible",
        alpha: None,
        runs,
    });
    for &n in &config.record_counts {
        let mut index = ExtendibleHashing::with_options(config.extendible_options())?;
        let sample = sample_after(&mut index, &keys[..n])?;
        debug!(records = n, space = sample.space_usage, effort = sample.io_cost, "sampled extensible");
        results.extensible.push(sample);
        observer(ExperimentEvent::Sampled {
            structure: "extensible",
            alpha: None,
            records: n,
            sample,
        });
    }

    for &alpha in &config.alpha_values {
        observer(ExperimentEvent::SeriesStarted {
            structure: "linear",
            alpha: Some(alpha),
            runs,
        });
        let key = alpha_key(alpha);
        for &n in &config.record_counts {
            let mut index = LinearHashing::with_options(config.linear_options(alpha))?;
            let sample = sample_after(&mut index, &keys[..n])?;
            debug!(alpha, records = n, space = sample.space_usage, effort = sample.io_cost, "sampled linear");
            results.linear.entry(&key).push(sample);
            observer(ExperimentEvent::Sampled {
                structure: "linear",
                alpha: Some(alpha),
                records: n,
                sample,
            });
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keys_distinct_and_bounded() {
        let keys = generate_keys(500, Some(7));
        assert_eq!(keys.len(), 500);
        assert!(keys.iter().all(|&k| k < 5000));
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 500);
    }

    #[test]
    fn test_generate_keys_seeded_is_reproducible() {
        assert_eq!(generate_keys(100, Some(42)), generate_keys(100, Some(42)));
    }

    #[test]
    fn test_alpha_key_formatting() {
        assert_eq!(alpha_key(0.6), "0.6");
        assert_eq!(alpha_key(0.75), "0.75");
        assert_eq!(alpha_key(1.0), "1.0");
    }

    #[test]
    fn test_space_growth() {
        let series = Series {
            space: vec![10, 20, 50],
            effort: vec![1, 2, 3],
        };
        assert_eq!(series.space_growth(), vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_adjacent_space_ratios() {
        let mut linear = LinearResults::new();
        linear.entry("0.6").push(Sample { space_usage: 30, io_cost: 1 });
        linear.entry("0.9").push(Sample { space_usage: 20, io_cost: 1 });

        let ratios = linear.adjacent_space_ratios();
        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios[0].lower, "0.6");
        assert_eq!(ratios[0].upper, "0.9");
        assert_eq!(ratios[0].ratios, vec![1.5]);
    }

    #[test]
    fn test_short_key_list_rejected() {
        let config = ExperimentConfig {
            record_counts: vec![10, 20],
            ..ExperimentConfig::default()
        };
        let keys: Vec<Key> = (0..15).collect();
        assert!(matches!(
            run_experiment(&config, &keys, |_| {}),
            Err(Error::InvalidExperiment { .. })
        ));
    }

    #[test]
    fn test_empty_counts_rejected() {
        let config = ExperimentConfig {
            record_counts: vec![],
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidExperiment { .. })));
    }
}
