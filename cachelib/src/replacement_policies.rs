use crate::cache::{CacheLine, CacheTier};

/// A generic trait for choosing which line of a full set gives way to a new one
pub trait ReplacementPolicy {
    /// Selects the slot to replace within a set
    ///
    /// Called only on full sets, so every line is valid. Ties go to the first slot found in scan
    /// order
    ///
    /// # Arguments
    ///
    /// * `set`: The lines of the set, in slot order. Never empty
    ///
    /// returns: usize
    fn select_victim(set: &[CacheLine]) -> usize;
}

/// Least Recently Used replacement policy, by the logical time of the last touch
///
/// Used for the recency tier
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn select_victim(set: &[CacheLine]) -> usize {
        let mut index = 1;
        let mut min_index = 0;
        while index < set.len() {
            if set[index].last_access_time < set[min_index].last_access_time {
                min_index = index;
            }
            index += 1;
        }
        min_index
    }
}

/// Least frequently used replacement policy
///
/// Used for the frequency tier when a promoted line needs room
pub struct LeastFrequentlyUsed;

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn select_victim(set: &[CacheLine]) -> usize {
        let mut index = 1;
        let mut min_index = 0;
        while index < set.len() {
            if set[index].frequency < set[min_index].frequency {
                min_index = index;
            }
            index += 1;
        }
        min_index
    }
}

/// Where a line's access frequency stands among every resident line of the recency tier
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrequencyRank {
    UpperHalf,
    LowerHalf,
}

/// Ranks a candidate line's frequency against the whole recency tier
///
/// Counts the valid lines, other than the candidate itself, with a strictly greater frequency. If
/// more than half of the tier's population outranks the candidate it is in the lower half,
/// otherwise (ties included) it is in the upper half. The rank is cache-wide, not per set
///
/// # Arguments
///
/// * `tier`: The recency tier
/// * `candidate`: The line being ranked, currently resident in `tier`
/// * `candidate_set`: The set holding the candidate. Together with the tag this identifies the
/// candidate's own slot, which is excluded from the count
/// * `population`: The number of valid lines in `tier`
///
/// returns: FrequencyRank
pub fn rank(tier: &CacheTier, candidate: &CacheLine, candidate_set: usize, population: u64) -> FrequencyRank {
    let greater = tier
        .lines()
        .filter(|(set, line)| line.valid && !(*set == candidate_set && line.tag == candidate.tag))
        .filter(|(_, line)| line.frequency > candidate.frequency)
        .count() as u64;
    if greater > population / 2 {
        FrequencyRank::LowerHalf
    } else {
        FrequencyRank::UpperHalf
    }
}
