use crate::core::constants::Key;
use crate::core::errors::Result;
use crate::core::metrics::MetricsSnapshot;

/// Contract shared by the simulated hash file organizations so the
/// experiment driver can compare them uniformly.
pub trait HashIndex {
    fn name(&self) -> &'static str;

    fn insert(&mut self, key: Key) -> Result<()>;

    /// Structural space proxy; never decreases across inserts.
    fn space_usage(&self) -> usize;

    /// Cumulative simulated page I/O; never decreases across inserts.
    fn io_cost(&self) -> u64;

    fn metrics(&self) -> MetricsSnapshot;

    /// Number of records stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every structural invariant, reporting the first violation as
    /// [`crate::Error::Corruption`].
    fn verify(&self) -> Result<()>;

    fn insert_all<I>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = Key>,
        Self: Sized,
    {
        for key in keys {
            self.insert(key)?;
        }
        Ok(())
    }
}
