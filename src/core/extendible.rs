//! Extendible hashing over fixed-capacity pages.
//!
//! The directory is a flat array of `2^global_depth` entries addressed by the
//! low `global_depth` bits of a 32-bit multiplicative hash. Each entry names a
//! page and the local depth that page was last split on, so a page with local
//! depth `d` is referenced by `2^(global_depth - d)` entries.
//!
//! ## I/O accounting
//! - +1 per directory lookup and page fetch
//! - +1 per append that did not need a split
//! - +1 per split trigger
//! - +1 per page allocated by a split
//!
//! Moving the records of a split page is not charged.

use crate::core::constants::*;
use crate::core::errors::*;
use crate::core::index::HashIndex;
use crate::core::metrics::{Metrics, MetricsSnapshot};
use crate::core::options::ExtendibleOptions;
use crate::core::page::{Page, PageArena};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirEntry {
    page: PageNum,
    local_depth: u8,
}

#[derive(Debug)]
pub struct ExtendibleHashing {
    options: ExtendibleOptions,
    global_depth: u8,
    directory: Vec<DirEntry>,
    pages: PageArena,
    num_records: usize,
    metrics: Metrics,
}

/// Knuth multiplicative hash truncated to 32 bits.
pub fn knuth_hash(key: Key) -> u32 {
    (key.wrapping_mul(KNUTH_MULTIPLIER) & HASH_MASK) as u32
}

fn suffix(hash: u32, depth: u8) -> usize {
    let mask = (1u64 << depth) - 1;
    (hash as u64 & mask) as usize
}

impl ExtendibleHashing {
    pub fn new(page_capacity: usize) -> Result<Self> {
        Self::with_options(ExtendibleOptions::with_capacity(page_capacity))
    }

    /// Starts with global depth 1: two pages, each referenced once.
    pub fn with_options(options: ExtendibleOptions) -> Result<Self> {
        options.validate()?;

        let mut pages = PageArena::new(options.page_capacity);
        let directory = (0..1usize << INITIAL_GLOBAL_DEPTH)
            .map(|_| DirEntry {
                page: pages.allocate().0,
                local_depth: INITIAL_GLOBAL_DEPTH,
            })
            .collect();

        Ok(Self {
            options,
            global_depth: INITIAL_GLOBAL_DEPTH,
            directory,
            pages,
            num_records: 0,
            metrics: Metrics::new(),
        })
    }

    pub fn options(&self) -> &ExtendibleOptions {
        &self.options
    }

    pub fn global_depth(&self) -> u8 {
        self.global_depth
    }

    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.pages.len()
    }

    /// Directory slot addressed by `key` at the current global depth.
    pub fn dir_slot(&self, key: Key) -> usize {
        suffix(knuth_hash(key), self.global_depth)
    }

    pub fn local_depth(&self, slot: usize) -> Option<u8> {
        self.directory.get(slot).map(|entry| entry.local_depth)
    }

    pub fn page_at(&self, slot: usize) -> Option<PageNum> {
        self.directory.get(slot).map(|entry| entry.page)
    }

    /// Page that `key` addresses through the current directory.
    pub fn bucket_for(&self, key: Key) -> Result<&Page> {
        let entry = self.directory[self.dir_slot(key)];
        self.pages.get(entry.page)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        (0..self.pages.len()).filter_map(move |page_num| self.pages.get(page_num).ok())
    }

    fn double_directory(&mut self) -> Result<()> {
        if self.global_depth >= self.options.max_global_depth {
            warn!(
                global_depth = self.global_depth,
                limit = self.options.max_global_depth,
                "directory cannot double further"
            );
            return Err(Error::DirectoryOverflow {
                global_depth: self.global_depth + 1,
                limit: self.options.max_global_depth,
            });
        }

        // The new top bit is free, so slot `i + len` aliases slot `i`.
        self.directory.extend_from_within(..);
        self.global_depth += 1;
        self.metrics.directory_doubled();
        debug!(global_depth = self.global_depth, entries = self.directory.len(), "doubled directory");
        Ok(())
    }

    /// Splits the page behind `slot` and returns its records for
    /// redistribution. The page is left empty.
    fn split(&mut self, slot: usize) -> Result<Vec<Key>> {
        let DirEntry { page: old_page, local_depth } = self.directory[slot];

        if local_depth == self.global_depth {
            self.double_directory()?;
        }

        let (new_page, recycled) = self.pages.allocate();
        self.metrics.page_allocated(recycled);
        let new_local_depth = local_depth + 1;

        let drained = self.pages.get_mut(old_page)?.drain();

        // Bit `new_local_depth - 1` of the slot decides which half it joins.
        let discriminator = 1usize << (new_local_depth - 1);
        for (i, entry) in self.directory.iter_mut().enumerate() {
            if entry.page != old_page {
                continue;
            }
            entry.local_depth = new_local_depth;
            if i & discriminator != 0 {
                entry.page = new_page;
            }
        }

        self.metrics.split_completed();
        debug!(
            old_page,
            new_page,
            local_depth = new_local_depth,
            moved = drained.len(),
            "split page"
        );
        Ok(drained)
    }
}

impl HashIndex for ExtendibleHashing {
    fn name(&self) -> &'static str {
        "extensible"
    }

    /// Places `key`, splitting pages and doubling the directory as needed.
    ///
    /// Pending keys live on an explicit stack: the key being inserted sits at
    /// the bottom and is retried once the records of every page split on its
    /// behalf have been placed again.
    fn insert(&mut self, key: Key) -> Result<()> {
        // (key, charged): redistributed records are not charged
        let mut pending: Vec<(Key, bool)> = vec![(key, true)];

        while let Some((current, charged)) = pending.pop() {
            let slot = self.dir_slot(current);
            let page_num = self.directory[slot].page;
            if charged {
                self.metrics.page_read();
            }

            if self.pages.get_mut(page_num)?.try_insert(current) {
                if charged {
                    self.metrics.page_written();
                }
                continue;
            }

            self.metrics.split_triggered();
            let drained = self.split(slot)?;
            pending.push((current, charged));
            pending.extend(drained.into_iter().rev().map(|k| (k, false)));
        }

        self.num_records += 1;
        self.metrics.record_inserted();
        Ok(())
    }

    fn space_usage(&self) -> usize {
        self.directory.len() + self.pages.len()
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
        const COMPONENT: &str = "extendible directory";

        if self.directory.len() != 1usize << self.global_depth {
            return Err(Error::corruption(
                COMPONENT,
                0,
                format!(
                    "directory has {} entries at global depth {}",
                    self.directory.len(),
                    self.global_depth
                ),
            ));
        }

        let mut fan_in = vec![0usize; self.pages.len()];
        let mut depths: Vec<Option<u8>> = vec![None; self.pages.len()];
        for (slot, entry) in self.directory.iter().enumerate() {
            if entry.local_depth > self.global_depth {
                return Err(Error::corruption(
                    COMPONENT,
                    entry.page,
                    format!(
                        "slot {} has local depth {} above global depth {}",
                        slot, entry.local_depth, self.global_depth
                    ),
                ));
            }
            let seen = depths
                .get_mut(entry.page)
                .ok_or_else(|| Error::corruption(COMPONENT, entry.page, "slot points past the last page"))?;
            match *seen {
                Some(depth) if depth != entry.local_depth => {
                    return Err(Error::corruption(
                        COMPONENT,
                        entry.page,
                        format!("slot {} disagrees on local depth ({} vs {})", slot, entry.local_depth, depth),
                    ));
                }
                _ => *seen = Some(entry.local_depth),
            }
            fan_in[entry.page] += 1;
        }

        let mut total = 0;
        for page_num in 0..self.pages.len() {
            let depth = depths[page_num]
                .ok_or_else(|| Error::corruption(COMPONENT, page_num, "page is not referenced"))?;
            let expected = 1usize << (self.global_depth - depth);
            if fan_in[page_num] != expected {
                return Err(Error::corruption(
                    COMPONENT,
                    page_num,
                    format!("fan-in {} but local depth {} needs {}", fan_in[page_num], depth, expected),
                ));
            }

            let page = self.pages.get(page_num)?;
            if page.len() > page.capacity() {
                return Err(Error::corruption(
                    COMPONENT,
                    page_num,
                    format!("{} records exceed capacity {}", page.len(), page.capacity()),
                ));
            }
            for &key in page.records() {
                if self.directory[self.dir_slot(key)].page != page_num {
                    return Err(Error::corruption(
                        COMPONENT,
                        page_num,
                        format!("key {} is not addressed to the page holding it", key),
                    ));
                }
            }
            total += page.len();
        }

        if total != self.num_records {
            return Err(Error::corruption(
                COMPONENT,
                0,
                format!("pages hold {} records, expected {}", total, self.num_records),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_32_bit_knuth() {
        assert_eq!(knuth_hash(0), 0);
        assert_eq!(knuth_hash(1), 2_654_435_761);
        assert_eq!(knuth_hash(2), 1_013_904_226);
        // low bits follow the key because the multiplier is odd
        assert_eq!(suffix(knuth_hash(6), 2), 2);
    }

    #[test]
    fn test_initial_state() {
        let eh = ExtendibleHashing::new(4).unwrap();
        assert_eq!(eh.global_depth(), 1);
        assert_eq!(eh.directory_len(), 2);
        assert_eq!(eh.bucket_count(), 2);
        assert_eq!(eh.space_usage(), 4);
        assert_eq!(eh.io_cost(), 0);
        eh.verify().unwrap();
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ExtendibleHashing::new(0),
            Err(Error::InvalidPageCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_insert_without_split_costs_two() {
        let mut eh = ExtendibleHashing::new(2).unwrap();
        for key in [0, 1, 2] {
            eh.insert(key).unwrap();
        }
        // 0 and 2 share suffix 0, 1 sits alone; nothing overflows
        assert_eq!(eh.global_depth(), 1);
        assert_eq!(eh.directory_len(), 2);
        assert_eq!(eh.io_cost(), 6);
        assert_eq!(eh.space_usage(), 4);
        assert_eq!(eh.bucket_for(2).unwrap().records(), &[0, 2]);
    }

    #[test]
    fn test_overflow_doubles_directory() {
        let mut eh = ExtendibleHashing::new(2).unwrap();
        for key in [0, 2, 4] {
            eh.insert(key).unwrap();
        }

        assert_eq!(eh.global_depth(), 2);
        assert_eq!(eh.directory_len(), 4);
        assert_eq!(eh.bucket_count(), 3);
        assert_eq!(eh.space_usage(), 7);
        // 2 + 2 + (1 lookup + 1 trigger + 1 alloc) + (1 lookup + 1 append)
        assert_eq!(eh.io_cost(), 9);

        assert_eq!(eh.bucket_for(0).unwrap().records(), &[0, 4]);
        assert_eq!(eh.bucket_for(2).unwrap().records(), &[2]);
        assert_eq!(eh.local_depth(0), Some(2));
        assert_eq!(eh.local_depth(2), Some(2));
        assert_eq!(eh.local_depth(1), Some(1));
        assert_eq!(eh.local_depth(3), Some(1));
        assert_eq!(eh.page_at(1), eh.page_at(3));
        eh.verify().unwrap();
    }

    #[test]
    fn test_split_without_doubling() {
        let mut eh = ExtendibleHashing::new(1).unwrap();
        // 0 then 2 doubles the directory, splitting suffix 0
        eh.insert(0).unwrap();
        eh.insert(2).unwrap();
        assert_eq!(eh.global_depth(), 2);
        // 1 fills the odd page, 3 splits it at local depth 1 < global 2
        eh.insert(1).unwrap();
        eh.insert(3).unwrap();

        assert_eq!(eh.global_depth(), 2);
        assert_eq!(eh.bucket_count(), 4);
        assert_eq!(eh.metrics().directory_doublings, 1);
        assert_eq!(eh.metrics().splits_completed, 2);
        eh.verify().unwrap();
    }

    #[test]
    fn test_depth_limit_is_fatal() {
        let opts = ExtendibleOptions {
            page_capacity: 1,
            max_global_depth: 3,
        };
        let mut eh = ExtendibleHashing::with_options(opts).unwrap();
        eh.insert(5).unwrap();
        let err = eh.insert(5).unwrap_err();
        assert_eq!(err, Error::DirectoryOverflow { global_depth: 4, limit: 3 });
        assert_eq!(eh.global_depth(), 3);
        assert_eq!(eh.len(), 1);
        eh.verify().unwrap();
    }

    #[test]
    fn test_sequential_keys_match_reference_run() {
        let mut eh = ExtendibleHashing::new(4).unwrap();
        eh.insert_all(0..50).unwrap();
        assert_eq!(eh.space_usage(), 32);
        assert_eq!(eh.io_cost(), 142);
        assert_eq!(eh.global_depth(), 4);
        eh.verify().unwrap();
    }
}
