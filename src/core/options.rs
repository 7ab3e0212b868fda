use crate::core::constants::*;
use crate::core::errors::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendibleOptions {
    pub page_capacity: usize,
    /// Directory doubling past this depth fails with
    /// [`Error::DirectoryOverflow`]. Must be in `1..=32`.
    pub max_global_depth: u8,
}

impl Default for ExtendibleOptions {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            max_global_depth: DEFAULT_MAX_GLOBAL_DEPTH,
        }
    }
}

impl ExtendibleOptions {
    pub fn with_capacity(page_capacity: usize) -> Self {
        Self {
            page_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.page_capacity)?;
        if self.max_global_depth < INITIAL_GLOBAL_DEPTH || self.max_global_depth > HASH_BITS {
            return Err(Error::InvalidDepthLimit {
                limit: self.max_global_depth,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearOptions {
    pub page_capacity: usize,
    /// Load factor that, once exceeded after an insert, splits the bucket
    /// under the split pointer.
    pub alpha_max: f64,
    pub initial_buckets: usize,
}

impl Default for LinearOptions {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            alpha_max: DEFAULT_ALPHA_MAX,
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
        }
    }
}

impl LinearOptions {
    pub fn new(page_capacity: usize, alpha_max: f64) -> Self {
        Self {
            page_capacity,
            alpha_max,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.page_capacity)?;
        if !self.alpha_max.is_finite() || self.alpha_max <= 0.0 {
            return Err(Error::InvalidLoadFactor {
                alpha_max: self.alpha_max,
            });
        }
        if self.initial_buckets == 0 {
            return Err(Error::InvalidInitialBuckets {
                count: self.initial_buckets,
            });
        }
        Ok(())
    }
}

fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::InvalidPageCapacity { capacity });
    }
    Ok(())
}
