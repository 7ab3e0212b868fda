//! Linear hashing over fixed-capacity pages with overflow chains.
//!
//! Buckets are split one at a time in address order, driven by a split
//! pointer, whenever the load factor `records / (buckets * capacity)` exceeds
//! `alpha_max` after an insert. A bucket below the split pointer has already
//! been split this round and is addressed with the next level's hash.
//!
//! Primary and overflow pages share one [`PageArena`]; overflow pages
//! detached by a split are recycled for later chains.

use crate::core::constants::*;
use crate::core::errors::*;
use crate::core::index::HashIndex;
use crate::core::metrics::{Metrics, MetricsSnapshot};
use crate::core::options::LinearOptions;
use crate::core::page::{Page, PageArena};
use tracing::{debug, trace};

#[derive(Debug)]
pub struct LinearHashing {
    options: LinearOptions,
    level: u32,
    split_pointer: usize,
    num_records: usize,
    /// Head page of every bucket, in address order.
    buckets: Vec<PageNum>,
    pages: PageArena,
    metrics: Metrics,
}

impl LinearHashing {
    pub fn new(page_capacity: usize, alpha_max: f64) -> Result<Self> {
        Self::with_options(LinearOptions::new(page_capacity, alpha_max))
    }

    pub fn with_options(options: LinearOptions) -> Result<Self> {
        options.validate()?;

        let mut pages = PageArena::new(options.page_capacity);
        let buckets = (0..options.initial_buckets).map(|_| pages.allocate().0).collect();

        Ok(Self {
            options,
            level: 0,
            split_pointer: 0,
            num_records: 0,
            buckets,
            pages,
            metrics: Metrics::new(),
        })
    }

    pub fn options(&self) -> &LinearOptions {
        &self.options
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn split_pointer(&self) -> usize {
        self.split_pointer
    }

    pub fn primary_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets addressed by the hash of `level`.
    fn round_size(&self, level: u32) -> u64 {
        (self.options.initial_buckets as u64) << level
    }

    fn primary_hash(&self, key: Key, level: u32) -> usize {
        (key % self.round_size(level)) as usize
    }

    /// Bucket index that `key` currently addresses.
    pub fn resolve(&self, key: Key) -> usize {
        let h = self.primary_hash(key, self.level);
        if h < self.split_pointer {
            self.primary_hash(key, self.level + 1)
        } else {
            h
        }
    }

    pub fn load_factor(&self) -> f64 {
        let slots = self.buckets.len() * self.options.page_capacity;
        if slots == 0 {
            return 0.0;
        }
        self.num_records as f64 / slots as f64
    }

    /// Pages of bucket `idx`, primary first.
    pub fn chain(&self, idx: usize) -> Result<Vec<&Page>> {
        let head = *self
            .buckets
            .get(idx)
            .ok_or_else(|| Error::corruption("linear buckets", idx, "bucket index out of range"))?;
        self.pages
            .chain(head)?
            .into_iter()
            .map(|page_num| self.pages.get(page_num))
            .collect()
    }

    /// Whether `key` sits in the chain it resolves to. Charges no I/O.
    pub fn chain_contains(&self, key: Key) -> Result<bool> {
        let idx = self.resolve(key);
        if idx >= self.buckets.len() {
            return Ok(false);
        }
        Ok(self.chain(idx)?.iter().any(|page| page.contains(key)))
    }

    /// Appends `key` to the first page with room in its bucket's chain,
    /// extending the chain when every page is full.
    fn place(&mut self, key: Key) -> Result<()> {
        let idx = self.resolve(key);
        while idx >= self.buckets.len() {
            let (page_num, _) = self.pages.allocate();
            self.buckets.push(page_num);
        }

        let mut current = self.buckets[idx];
        self.metrics.page_read();

        let mut hops = 0;
        while self.pages.get(current)?.is_full() {
            hops += 1;
            if hops > self.pages.len() {
                return Err(Error::corruption(
                    "overflow chain",
                    self.buckets[idx],
                    "overflow links form a cycle",
                ));
            }

            let next = match self.pages.get(current)?.overflow() {
                Some(next) => next,
                None => {
                    let (next, recycled) = self.pages.allocate();
                    self.metrics.page_allocated(recycled);
                    self.pages.get_mut(current)?.set_overflow(Some(next));
                    trace!(bucket = idx, page = next, recycled, "extended overflow chain");
                    next
                }
            };
            self.metrics.page_read();
            current = next;
        }

        if !self.pages.get_mut(current)?.try_insert(key) {
            return Err(Error::corruption("overflow chain", current, "page filled during placement"));
        }
        self.metrics.page_written();
        Ok(())
    }

    /// Splits the bucket under the split pointer into itself and a new
    /// bucket at the end of the address space.
    fn split(&mut self) -> Result<()> {
        let (new_page, recycled) = self.pages.allocate();
        self.metrics.page_allocated(recycled);
        self.buckets.push(new_page);

        let target = self.split_pointer;
        let head = self.buckets[target];
        self.metrics.page_read();

        let chain = self.pages.chain(head)?;
        let mut records = Vec::new();
        for &page_num in &chain {
            records.extend(self.pages.get_mut(page_num)?.drain());
        }
        for &page_num in &chain[1..] {
            self.pages.free(page_num);
        }
        self.pages.get_mut(head)?.set_overflow(None);
        self.metrics.page_written();

        self.split_pointer += 1;

        let moved = records.len();
        for key in records {
            self.place(key)?;
        }

        if self.split_pointer as u64 == self.round_size(self.level) {
            self.level += 1;
            self.split_pointer = 0;
            self.metrics.level_advanced();
            debug!(level = self.level, buckets = self.buckets.len(), "advanced level");
        }

        self.metrics.split_completed();
        debug!(bucket = target, new_bucket = self.buckets.len() - 1, moved, "split bucket");
        Ok(())
    }
}

impl HashIndex for LinearHashing {
    fn name(&self) -> &'static str {
        "linear"
    }

    /// Places `key` and then splits once if the load factor now exceeds
    /// `alpha_max`. The threshold is checked after the insert, never before.
    fn insert(&mut self, key: Key) -> Result<()> {
        self.place(key)?;
        self.num_records += 1;
        self.metrics.record_inserted();

        if self.load_factor() > self.options.alpha_max {
            self.split()?;
        }
        Ok(())
    }

    /// Every primary page plus every page in every overflow chain.
    fn space_usage(&self) -> usize {
        self.pages.live_pages()
    }

    fn io_cost(&self) -> u64 {
        self.metrics.io_cost()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn len(&self) -> usize {
        self.num_records
    }

    fn verify(&self) -> Result<()> {
        const COMPONENT: &str = "linear buckets";

        if self.split_pointer as u64 >= self.round_size(self.level) {
            return Err(Error::corruption(
                COMPONENT,
                self.split_pointer,
                format!(
                    "split pointer {} not below round size {}",
                    self.split_pointer,
                    self.round_size(self.level)
                ),
            ));
        }

        let mut total = 0;
        let mut chained_pages = 0;
        for (idx, &head) in self.buckets.iter().enumerate() {
            let chain = self.pages.chain(head)?;
            chained_pages += chain.len();
            for page_num in chain {
                let page = self.pages.get(page_num)?;
                if page.len() > page.capacity() {
                    return Err(Error::corruption(
                        COMPONENT,
                        page_num,
                        format!("{} records exceed capacity {}", page.len(), page.capacity()),
                    ));
                }
                for &key in page.records() {
                    if self.resolve(key) != idx {
                        return Err(Error::corruption(
                            COMPONENT,
                            page_num,
                            format!("key {} stored in bucket {} resolves to {}", key, idx, self.resolve(key)),
                        ));
                    }
                }
                total += page.len();
            }
        }

        if chained_pages != self.pages.live_pages() {
            return Err(Error::corruption(
                COMPONENT,
                0,
                format!(
                    "{} pages reachable from buckets but {} live in the arena",
                    chained_pages,
                    self.pages.live_pages()
                ),
            ));
        }

        if total != self.num_records {
            return Err(Error::corruption(
                COMPONENT,
                0,
                format!("chains hold {} records, expected {}", total, self.num_records),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let lh = LinearHashing::new(4, 0.75).unwrap();
        assert_eq!(lh.level(), 0);
        assert_eq!(lh.split_pointer(), 0);
        assert_eq!(lh.primary_count(), 1);
        assert_eq!(lh.space_usage(), 1);
        assert_eq!(lh.load_factor(), 0.0);
        lh.verify().unwrap();
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        assert!(matches!(
            LinearHashing::new(4, 0.0),
            Err(Error::InvalidLoadFactor { .. })
        ));
    }

    #[test]
    fn test_split_fires_only_above_threshold() {
        let mut lh = LinearHashing::new(2, 0.75).unwrap();

        // (splits, buckets, level, split pointer, io, space) after each insert
        let expected = [
            (0, 1, 0, 0, 2, 1),
            (1, 2, 1, 0, 11, 2),
            (1, 2, 1, 0, 13, 2), // 3 / 4 == 0.75 does not exceed
            (2, 3, 1, 1, 22, 3),
        ];

        for (key, want) in (0..4).zip(expected) {
            lh.insert(key).unwrap();
            let m = lh.metrics();
            assert_eq!(
                (
                    m.splits_completed,
                    lh.primary_count(),
                    lh.level(),
                    lh.split_pointer(),
                    lh.io_cost(),
                    lh.space_usage()
                ),
                (want.0, want.1, want.2, want.3, want.4, want.5),
                "after inserting {}",
                key
            );
            lh.verify().unwrap();
        }
    }

    #[test]
    fn test_resolve_uses_next_level_below_split_pointer() {
        let mut lh = LinearHashing::new(2, 0.75).unwrap();
        for key in 0..4 {
            lh.insert(key).unwrap();
        }
        // level 1, split pointer 1: bucket 0 has been split into 0 and 2
        assert_eq!(lh.resolve(4), 0);
        assert_eq!(lh.resolve(6), 2);
        assert_eq!(lh.resolve(5), 1);
    }

    #[test]
    fn test_overflow_chain_grows_when_split_is_suppressed() {
        let mut lh = LinearHashing::new(1, 10.0).unwrap();
        for key in [0, 1, 2] {
            lh.insert(key).unwrap();
        }
        assert_eq!(lh.primary_count(), 1);
        assert_eq!(lh.chain(0).unwrap().len(), 3);
        assert_eq!(lh.io_cost(), 11);
        assert_eq!(lh.space_usage(), 3);
        lh.verify().unwrap();
    }

    #[test]
    fn test_split_recycles_overflow_pages() {
        let mut lh = LinearHashing::new(1, 2.0).unwrap();
        for key in [0, 1, 2] {
            lh.insert(key).unwrap();
        }

        assert_eq!(lh.io_cost(), 22);
        assert_eq!(lh.space_usage(), 3);
        assert_eq!(lh.level(), 1);
        assert_eq!(lh.split_pointer(), 0);
        assert_eq!(lh.primary_count(), 2);
        assert!(lh.metrics().pages_recycled >= 1);

        let bucket0: Vec<Vec<Key>> = lh
            .chain(0)
            .unwrap()
            .iter()
            .map(|page| page.records().to_vec())
            .collect();
        assert_eq!(bucket0, vec![vec![0], vec![2]]);
        for key in [0, 1, 2] {
            assert!(lh.chain_contains(key).unwrap());
        }
        lh.verify().unwrap();
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut lh = LinearHashing::new(2, 0.75).unwrap();
        for _ in 0..5 {
            lh.insert(9).unwrap();
        }
        assert_eq!(lh.len(), 5);
        let stored: usize = (0..lh.primary_count())
            .map(|idx| {
                lh.chain(idx)
                    .unwrap()
                    .iter()
                    .map(|page| page.records().iter().filter(|&&k| k == 9).count())
                    .sum::<usize>()
            })
            .sum();
        assert_eq!(stored, 5);
        lh.verify().unwrap();
    }
}
