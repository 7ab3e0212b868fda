use crate::core::constants::*;
use crate::core::errors::*;

/// A fixed-capacity page of keys.
///
/// Records keep insertion order and duplicates are stored verbatim. The
/// `overflow` link is only used by linear hashing, where a full primary page
/// chains to further pages in the same [`PageArena`].
#[derive(Debug, Clone)]
pub struct Page {
    capacity: usize,
    records: Vec<Key>,
    overflow: Option<PageNum>,
}

impl Page {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Vec::with_capacity(capacity),
            overflow: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn records(&self) -> &[Key] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Appends `key` unless the page is full. A full page is left untouched.
    pub fn try_insert(&mut self, key: Key) -> bool {
        if self.is_full() {
            return false;
        }
        self.records.push(key);
        true
    }

    pub fn contains(&self, key: Key) -> bool {
        self.records.contains(&key)
    }

    pub fn overflow(&self) -> Option<PageNum> {
        self.overflow
    }

    pub(crate) fn set_overflow(&mut self, next: Option<PageNum>) {
        self.overflow = next;
    }

    /// Empties the page and returns its records in insertion order.
    pub(crate) fn drain(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.records)
    }
}

/// Growable page store addressed by [`PageNum`].
///
/// Detached pages are parked on a free list and handed out again by
/// [`PageArena::allocate`], so page numbers stay stable for the lifetime of
/// the arena.
#[derive(Debug, Clone)]
pub struct PageArena {
    capacity: usize,
    pages: Vec<Page>,
    free_list: Vec<PageNum>,
}

impl PageArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pages: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Returns an empty page, recycling a freed one when available.
    /// The flag is true when the page came off the free list.
    pub fn allocate(&mut self) -> (PageNum, bool) {
        if let Some(page_num) = self.free_list.pop() {
            self.pages[page_num] = Page::new(self.capacity);
            return (page_num, true);
        }
        self.pages.push(Page::new(self.capacity));
        (self.pages.len() - 1, false)
    }

    pub fn free(&mut self, page_num: PageNum) {
        self.pages[page_num] = Page::new(self.capacity);
        self.free_list.push(page_num);
    }

    pub fn get(&self, page_num: PageNum) -> Result<&Page> {
        self.pages
            .get(page_num)
            .ok_or_else(|| Error::corruption("page arena", page_num, "page number out of range"))
    }

    pub fn get_mut(&mut self, page_num: PageNum) -> Result<&mut Page> {
        self.pages
            .get_mut(page_num)
            .ok_or_else(|| Error::corruption("page arena", page_num, "page number out of range"))
    }

    /// Total pages ever allocated, including those on the free list.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn live_pages(&self) -> usize {
        self.pages.len() - self.free_list.len()
    }

    /// Page numbers of the chain starting at `head`, head first.
    ///
    /// A chain longer than the arena can only mean a cycle in the overflow
    /// links and is reported as corruption.
    pub fn chain(&self, head: PageNum) -> Result<Vec<PageNum>> {
        let mut chain = Vec::new();
        let mut current = Some(head);
        while let Some(page_num) = current {
            if chain.len() >= self.pages.len() {
                return Err(Error::corruption(
                    "overflow chain",
                    head,
                    format!("chain exceeds {} pages, overflow links form a cycle", self.pages.len()),
                ));
            }
            chain.push(page_num);
            current = self.get(page_num)?.overflow();
        }
        Ok(chain)
    }
}
