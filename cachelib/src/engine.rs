use std::fmt;
use crate::cache::{AddressDecoder, CacheLine, CacheTier, TierKind};
use crate::config::CacheConfig;
use crate::replacement_policies::{rank, FrequencyRank, LeastFrequentlyUsed, LeastRecentlyUsed, ReplacementPolicy};

/// What happened to the cache on a single access
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessOutcome {
    /// The line was resident in the given tier
    Hit(TierKind),
    /// Miss, the line took an empty recency slot
    Filled,
    /// Miss, the least recently used line ranked in the lower half and was discarded
    Evicted,
    /// Miss, the least recently used line moved to an empty frequency slot
    Promoted,
    /// Miss, the least recently used line moved to the frequency tier, discarding that set's least
    /// frequently used line
    PromotedWithEviction,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit(_))
    }

    /// Whether a line left the cache entirely
    pub fn is_eviction(&self) -> bool {
        matches!(self, AccessOutcome::Evicted | AccessOutcome::PromotedWithEviction)
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccessOutcome::Hit(_) => "hit",
            AccessOutcome::Filled => "miss",
            AccessOutcome::Evicted => "miss eviction",
            AccessOutcome::Promoted => "miss promote",
            AccessOutcome::PromotedWithEviction => "miss promote eviction",
        };
        f.write_str(label)
    }
}

/// The counters kept over a whole run
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SimulationState {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Valid lines in the recency tier, across all sets. Slots never become invalid again, so
    /// this only grows when an empty slot is filled
    pub population: u64,
}

/// The dual cache: both tiers, and the only code which mutates them
#[derive(Clone, Debug)]
pub struct DualCache {
    decoder: AddressDecoder,
    recency: CacheTier,
    frequency: CacheTier,
    state: SimulationState,
}

impl DualCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            decoder: AddressDecoder::new(config),
            recency: CacheTier::new(TierKind::Recency, config.num_sets(), config.lines_per_set()),
            frequency: CacheTier::new(TierKind::Frequency, config.num_sets(), config.lines_per_set()),
            state: SimulationState::default(),
        }
    }

    /// Performs one access at logical time `now`
    ///
    /// Hits in either tier only bump the line's frequency and access time. On a miss the new line
    /// always lands in the recency tier: in the first empty slot of its set, or in place of the
    /// set's least recently used line. That line is discarded when its frequency ranks in the lower
    /// half of the recency tier, and otherwise moves to the frequency tier, which in turn discards
    /// its own least frequently used line of the set when full
    ///
    /// # Arguments
    ///
    /// * `address`: The address of the access
    /// * `now`: The logical clock, strictly increasing between calls
    ///
    /// returns: AccessOutcome
    pub fn access(&mut self, address: u64, now: u64) -> AccessOutcome {
        let (set, tag) = self.decoder.decode(address);

        for tier in [&mut self.recency, &mut self.frequency] {
            if let Some(slot) = tier.find(set, tag) {
                tier.touch(set, slot, now);
                self.state.hits += 1;
                return AccessOutcome::Hit(tier.kind());
            }
        }

        self.state.misses += 1;
        let incoming = CacheLine::inserted(tag, now);

        if let Some(slot) = self.recency.first_vacant(set) {
            self.recency.place(set, slot, incoming);
            self.state.population += 1;
            return AccessOutcome::Filled;
        }

        let oldest = LeastRecentlyUsed::select_victim(self.recency.set(set));
        let candidate = *self.recency.line(set, oldest);
        let outcome = match rank(&self.recency, &candidate, set, self.state.population) {
            FrequencyRank::LowerHalf => {
                self.state.evictions += 1;
                AccessOutcome::Evicted
            }
            FrequencyRank::UpperHalf => self.promote(set, candidate),
        };
        self.recency.place(set, oldest, incoming);
        outcome
    }

    /// Moves a line leaving the recency tier into the frequency tier
    fn promote(&mut self, set: usize, line: CacheLine) -> AccessOutcome {
        match self.frequency.first_vacant(set) {
            Some(slot) => {
                self.frequency.place(set, slot, line);
                AccessOutcome::Promoted
            }
            None => {
                let slot = LeastFrequentlyUsed::select_victim(self.frequency.set(set));
                self.frequency.place(set, slot, line);
                self.state.evictions += 1;
                AccessOutcome::PromotedWithEviction
            }
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn tier(&self, kind: TierKind) -> &CacheTier {
        match kind {
            TierKind::Recency => &self.recency,
            TierKind::Frequency => &self.frequency,
        }
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }
}
