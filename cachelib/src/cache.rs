use std::fmt;
use std::ops::Range;
use crate::config::CacheConfig;

/// A single cache line
///
/// While `valid` is false the remaining fields are stale and must not take part in any decision
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
    /// Set to 1 on insertion, incremented on every hit
    pub frequency: u64,
    /// Logical time of the most recent touch
    pub last_access_time: u64,
}

impl CacheLine {
    /// A freshly inserted line for `tag`, touched at `now`
    pub fn inserted(tag: u64, now: u64) -> Self {
        Self {
            valid: true,
            tag,
            frequency: 1,
            last_access_time: now,
        }
    }

    #[inline(always)]
    pub fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    /// Registers a hit on this line
    pub fn touch(&mut self, now: u64) {
        self.frequency += 1;
        self.last_access_time = now;
    }
}

/// Names the two tiers of the cache
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TierKind {
    /// Receives every new line, replaced least recently used first
    Recency,
    /// Keeps lines pushed out of the recency tier while their frequency ranked in the upper half
    Frequency,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Recency => write!(f, "recency"),
            TierKind::Frequency => write!(f, "frequency"),
        }
    }
}

/// Splits addresses into a set index and a tag
///
/// The block offset bits are dropped, the next `s` bits select the set, and everything above them
/// is the tag
#[derive(Copy, Clone, Debug)]
pub struct AddressDecoder {
    block_offset_bits: u32,
    tag_shift: u32,
    set_index_mask: u64,
}

impl AddressDecoder {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            block_offset_bits: config.block_offset_bits(),
            tag_shift: config.set_index_bits() + config.block_offset_bits(),
            set_index_mask: config.set_index_mask(),
        }
    }

    /// Converts an address into its set index and tag. Any address is accepted
    ///
    /// # Arguments
    ///
    /// * `address`: The raw address of the access
    ///
    /// returns: (usize, u64)
    #[inline(always)]
    pub fn decode(&self, address: u64) -> (usize, u64) {
        // Shifting by the full width would overflow, everything is offset or index bits in that case
        let set = address.checked_shr(self.block_offset_bits).unwrap_or(0) & self.set_index_mask;
        let tag = address.checked_shr(self.tag_shift).unwrap_or(0);
        (set as usize, tag)
    }
}

/// A fixed capacity associative structure of `num_sets` sets with `lines_per_set` lines each
///
/// Lines are stored flat, set by set, so a set is a contiguous slice. Both tiers of the cache are
/// instances of this type
#[derive(Clone, Debug)]
pub struct CacheTier {
    kind: TierKind,
    lines: Vec<CacheLine>,
    lines_per_set: usize,
}

impl CacheTier {
    /// Allocates a tier with every line invalid
    pub fn new(kind: TierKind, num_sets: usize, lines_per_set: usize) -> Self {
        Self {
            kind,
            lines: vec![CacheLine::default(); num_sets * lines_per_set],
            lines_per_set,
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn num_sets(&self) -> usize {
        self.lines.len() / self.lines_per_set
    }

    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set
    }

    #[inline(always)]
    fn set_range(&self, set: usize) -> Range<usize> {
        set * self.lines_per_set..(set + 1) * self.lines_per_set
    }

    /// The lines of one set, in slot order
    pub fn set(&self, set: usize) -> &[CacheLine] {
        &self.lines[self.set_range(set)]
    }

    pub fn set_mut(&mut self, set: usize) -> &mut [CacheLine] {
        let range = self.set_range(set);
        &mut self.lines[range]
    }

    pub fn line(&self, set: usize, slot: usize) -> &CacheLine {
        &self.set(set)[slot]
    }

    /// Every line of the tier alongside its set index
    pub fn lines(&self) -> impl Iterator<Item = (usize, &CacheLine)> + '_ {
        self.lines
            .chunks_exact(self.lines_per_set)
            .enumerate()
            .flat_map(|(set, lines)| lines.iter().map(move |line| (set, line)))
    }

    /// Finds the slot holding `tag` in `set`, if it is resident
    #[inline(always)]
    pub fn find(&self, set: usize, tag: u64) -> Option<usize> {
        self.set(set).iter().position(|line| line.holds(tag))
    }

    /// Finds the first invalid slot of `set`
    pub fn first_vacant(&self, set: usize) -> Option<usize> {
        self.set(set).iter().position(|line| !line.valid)
    }

    /// Overwrites a slot, whatever it held before
    pub fn place(&mut self, set: usize, slot: usize, line: CacheLine) {
        self.set_mut(set)[slot] = line;
    }

    /// Registers a hit on a resident slot
    pub fn touch(&mut self, set: usize, slot: usize, now: u64) {
        self.set_mut(set)[slot].touch(now);
    }

    /// Gets the number of valid lines in the tier
    pub fn resident_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }
}
