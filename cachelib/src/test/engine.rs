use crate::cache::{AddressDecoder, CacheLine, CacheTier, TierKind};
use crate::config::CacheConfig;
use crate::engine::{AccessOutcome, DualCache};
use crate::replacement_policies::{rank, FrequencyRank, LeastFrequentlyUsed, LeastRecentlyUsed, ReplacementPolicy};
use crate::simulator::{SimulationResult, Simulator};
use crate::trace::{Operation, TraceRecord};

fn load(address: u64) -> TraceRecord {
    TraceRecord::new(Operation::Load, address, 1)
}

fn config(s: u32, b: u32, e: u32) -> CacheConfig {
    CacheConfig::new(s, b, e).unwrap()
}

/// Replays addresses one access each, returning every outcome
fn run(cache: &mut DualCache, addresses: &[u64]) -> Vec<AccessOutcome> {
    addresses
        .iter()
        .enumerate()
        .map(|(time, address)| cache.access(*address, time as u64 + 1))
        .collect()
}

fn tags(tier: &CacheTier, set: usize) -> Vec<Option<u64>> {
    tier.set(set).iter().map(|line| line.valid.then_some(line.tag)).collect()
}

/// No tag may be resident twice in the same set, within a tier or across both
fn assert_no_duplicate_residency(cache: &DualCache) {
    let recency = cache.tier(TierKind::Recency);
    let frequency = cache.tier(TierKind::Frequency);
    for set in 0..recency.num_sets() {
        let mut resident = recency.set(set).iter().chain(frequency.set(set)).filter(|l| l.valid).map(|l| l.tag).collect::<Vec<_>>();
        let total = resident.len();
        resident.sort();
        resident.dedup();
        assert_eq!(resident.len(), total, "Duplicate tag in set {set}");
    }
}

#[test]
fn decoder_splits_offset_index_and_tag() {
    let decoder = AddressDecoder::new(&config(2, 4, 1));
    // tag 0b101, set 0b10, offset 0b0111
    assert_eq!(decoder.decode(0b101_10_0111), (2, 0b101));
    assert_eq!(decoder.decode(0), (0, 0));
    assert_eq!(decoder.decode(u64::MAX), (3, u64::MAX >> 6));
}

#[test]
fn decoder_handles_full_width_configurations() {
    let decoder = AddressDecoder::new(&config(0, 64, 1));
    assert_eq!(decoder.decode(u64::MAX), (0, 0));
    let decoder = AddressDecoder::new(&config(4, 60, 1));
    assert_eq!(decoder.decode(0xA000_0000_0000_0000), (10, 0));
}

#[test]
fn lru_picks_the_oldest_and_the_first_on_ties() {
    let set = [
        CacheLine { valid: true, tag: 0, frequency: 1, last_access_time: 5 },
        CacheLine { valid: true, tag: 1, frequency: 1, last_access_time: 2 },
        CacheLine { valid: true, tag: 2, frequency: 1, last_access_time: 2 },
    ];
    assert_eq!(LeastRecentlyUsed::select_victim(&set), 1);
}

#[test]
fn lfu_picks_the_least_used_and_the_first_on_ties() {
    let set = [
        CacheLine { valid: true, tag: 0, frequency: 4, last_access_time: 1 },
        CacheLine { valid: true, tag: 1, frequency: 3, last_access_time: 2 },
        CacheLine { valid: true, tag: 2, frequency: 3, last_access_time: 3 },
    ];
    assert_eq!(LeastFrequentlyUsed::select_victim(&set), 1);
}

#[test]
fn rank_counts_strictly_greater_peers_across_all_sets() {
    let mut tier = CacheTier::new(TierKind::Recency, 2, 2);
    tier.place(0, 0, CacheLine { valid: true, tag: 7, frequency: 1, last_access_time: 1 });
    tier.place(0, 1, CacheLine { valid: true, tag: 8, frequency: 3, last_access_time: 2 });
    tier.place(1, 0, CacheLine { valid: true, tag: 7, frequency: 3, last_access_time: 3 });
    let candidate = *tier.line(0, 0);
    // Two of three lines outrank it, more than 3 / 2
    assert_eq!(rank(&tier, &candidate, 0, 3), FrequencyRank::LowerHalf);
    // With one more peer the threshold moves to 2, and 2 > 2 doesn't hold
    tier.place(1, 1, CacheLine { valid: true, tag: 9, frequency: 1, last_access_time: 4 });
    assert_eq!(rank(&tier, &candidate, 0, 4), FrequencyRank::UpperHalf);
}

#[test]
fn rank_ignores_ties_self_and_invalid_lines() {
    let mut tier = CacheTier::new(TierKind::Recency, 1, 3);
    tier.place(0, 0, CacheLine { valid: true, tag: 1, frequency: 2, last_access_time: 1 });
    tier.place(0, 1, CacheLine { valid: true, tag: 2, frequency: 2, last_access_time: 2 });
    // Stale data in an invalid slot must not count
    tier.place(0, 2, CacheLine { valid: false, tag: 3, frequency: 9, last_access_time: 3 });
    let candidate = *tier.line(0, 0);
    assert_eq!(rank(&tier, &candidate, 0, 2), FrequencyRank::UpperHalf);
}

#[test]
fn rank_with_tiny_populations_is_upper_half() {
    let mut tier = CacheTier::new(TierKind::Recency, 1, 1);
    let candidate = CacheLine::inserted(4, 1);
    assert_eq!(rank(&tier, &candidate, 0, 0), FrequencyRank::UpperHalf);
    tier.place(0, 0, candidate);
    assert_eq!(rank(&tier, &candidate, 0, 1), FrequencyRank::UpperHalf);
}

#[test]
fn reload_after_conflict_hits_in_frequency_tier() {
    // 0x0 and 0x8 both decode to set 0 here (bit 1 is the index), with tags 0 and 2
    let mut simulator = Simulator::new(config(1, 1, 1));
    let result = *simulator.replay([load(0x0), load(0x8), load(0x0)]);
    assert_eq!(result, SimulationResult { hits: 1, misses: 2, evictions: 0 });
    // The third access is served by the frequency tier, where the first line was promoted
    let frequency = simulator.cache().tier(TierKind::Frequency);
    assert_eq!(tags(frequency, 0), vec![Some(0)]);
}

#[test]
fn second_line_promotes_the_first() {
    let mut cache = DualCache::new(&config(0, 0, 1));
    let outcomes = run(&mut cache, &[0x0, 0x1]);
    assert_eq!(outcomes, vec![AccessOutcome::Filled, AccessOutcome::Promoted]);
    let state = cache.state();
    assert_eq!((state.hits, state.misses, state.evictions), (0, 2, 0));
    assert_eq!(tags(cache.tier(TierKind::Frequency), 0), vec![Some(0)]);
    assert_eq!(tags(cache.tier(TierKind::Recency), 0), vec![Some(1)]);
    assert_eq!(state.population, 1);
}

#[test]
fn modify_misses_then_hits() {
    let mut simulator = Simulator::new(config(4, 4, 2));
    let result = *simulator.replay([TraceRecord::new(Operation::Modify, 0x1234, 8)]);
    assert_eq!(result, SimulationResult { hits: 1, misses: 1, evictions: 0 });
    assert_eq!(simulator.clock(), 2);
}

#[test]
fn repeated_hits_only_touch_frequency_and_time() {
    let mut cache = DualCache::new(&config(1, 2, 2));
    cache.access(0x40, 1);
    let before = *cache.tier(TierKind::Recency).line(0, 0);
    for now in 2..10 {
        assert_eq!(cache.access(0x40, now), AccessOutcome::Hit(TierKind::Recency));
    }
    let after = *cache.tier(TierKind::Recency).line(0, 0);
    assert_eq!((after.valid, after.tag), (before.valid, before.tag));
    assert_eq!(after.frequency, 9);
    assert_eq!(after.last_access_time, 9);
    assert_eq!(cache.state().population, 1);
}

#[test]
fn lower_half_candidate_is_evicted() {
    // Four sets of one line, set = address & 3, tag = address >> 2
    let mut cache = DualCache::new(&config(2, 0, 1));
    let outcomes = run(&mut cache, &[1, 1, 2, 2, 0, 4]);
    assert_eq!(outcomes.last(), Some(&AccessOutcome::Evicted));
    assert_eq!(cache.state().evictions, 1);
    assert_eq!(cache.state().population, 3);
    assert_eq!(tags(cache.tier(TierKind::Recency), 0), vec![Some(1)]);
    assert_eq!(cache.tier(TierKind::Frequency).resident_line_count(), 0);
}

#[test]
fn full_frequency_set_drops_its_least_frequently_used_line() {
    // One set of two lines, tag = address >> 2
    let mut cache = DualCache::new(&config(0, 2, 2));
    let outcomes = run(&mut cache, &[0x0, 0x4, 0x0, 0x0, 0x8, 0xc, 0x4, 0x10]);
    assert_eq!(
        outcomes,
        vec![
            AccessOutcome::Filled,
            AccessOutcome::Filled,
            AccessOutcome::Hit(TierKind::Recency),
            AccessOutcome::Hit(TierKind::Recency),
            AccessOutcome::Promoted,
            AccessOutcome::Promoted,
            AccessOutcome::Hit(TierKind::Frequency),
            AccessOutcome::PromotedWithEviction,
        ]
    );
    // Tag 1 (two uses) lost its slot to tag 2, tag 0 (three uses) stays
    assert_eq!(tags(cache.tier(TierKind::Frequency), 0), vec![Some(2), Some(0)]);
    assert_eq!(tags(cache.tier(TierKind::Recency), 0), vec![Some(3), Some(4)]);
    assert_eq!(cache.state().evictions, 1);
    assert_no_duplicate_residency(&cache);
}

#[test]
fn counters_stay_consistent_over_a_long_trace() {
    let config = config(2, 3, 2);
    let mut simulator = Simulator::new(config);
    let mut records = Vec::new();
    let mut address: u64 = 0x1234_5678;
    for i in 0..2_000u64 {
        // Simple LCG, a mix of reuse and fresh addresses
        address = address.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let operation = match i % 3 {
            0 => Operation::Load,
            1 => Operation::Store,
            _ => Operation::Modify,
        };
        records.push(TraceRecord::new(operation, (address >> 33) % 512, 4));
    }
    let accesses = records.iter().map(|r| r.operation.accesses() as u64).sum::<u64>();
    let result = *simulator.replay(records);
    assert_eq!(result.hits + result.misses, accesses);
    assert_eq!(simulator.clock(), accesses);
    assert!(simulator.population() <= config.lines_per_tier() as u64);
    assert_eq!(simulator.population(), simulator.cache().tier(TierKind::Recency).resident_line_count() as u64);
    assert!(result.evictions <= result.misses);
    assert_no_duplicate_residency(simulator.cache());
}

#[test]
fn evictions_only_come_from_discards() {
    let mut cache = DualCache::new(&config(1, 0, 2));
    let mut evictions = 0;
    for (time, address) in (0..300u64).map(|i| (i * 7) % 23).enumerate() {
        let outcome = cache.access(address, time as u64 + 1);
        if outcome.is_eviction() {
            evictions += 1;
        }
        assert_eq!(cache.state().evictions, evictions);
    }
}
