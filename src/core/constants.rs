pub const DEFAULT_PAGE_CAPACITY: usize = 10;

/// Knuth's multiplicative hashing constant (floor(2^32 / phi)).
pub const KNUTH_MULTIPLIER: u64 = 2_654_435_761;

pub const HASH_BITS: u8 = 32;

pub const HASH_MASK: u64 = (1 << HASH_BITS) - 1;

pub const INITIAL_GLOBAL_DEPTH: u8 = 1;

pub const DEFAULT_MAX_GLOBAL_DEPTH: u8 = 20;

pub const DEFAULT_ALPHA_MAX: f64 = 0.75;

pub const DEFAULT_INITIAL_BUCKETS: usize = 1;

pub const DEFAULT_RECORD_COUNTS: [usize; 5] = [1000, 2000, 5000, 10000, 20000];

pub const DEFAULT_ALPHA_VALUES: [f64; 3] = [0.6, 0.75, 0.9];

/// Keys are drawn without replacement from `0..count * KEY_SPACE_FACTOR`.
pub const KEY_SPACE_FACTOR: u64 = 10;

pub type Key = u64;

pub type PageNum = usize;
