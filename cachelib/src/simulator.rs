use std::fmt;
use std::io::BufRead;
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use crate::cache::TierKind;
use crate::config::CacheConfig;
use crate::engine::{AccessOutcome, DualCache};
use crate::error::ResourceError;
use crate::trace::{parse_line, TraceRecord};

/// The simulator replays trace records against the dual cache, keeping the logical clock and
/// collecting results.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly
pub struct Simulator {
    config: CacheConfig,
    cache: DualCache,
    clock: u64,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a cache simulation. Can be serialised to JSON, and displays in the summary format
/// `hits:H misses:M evictions:E`
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hits:{} misses:{} evictions:{}", self.hits, self.misses, self.evictions)
    }
}

impl Simulator {
    /// Creates a new simulator with both tiers empty
    ///
    /// # Arguments
    ///
    /// * `config`: A validated cache configuration
    ///
    /// returns: Simulator
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            cache: DualCache::new(&config),
            clock: 0,
            result: SimulationResult::default(),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Performs a single access, advancing the logical clock first
    fn access(&mut self, address: u64) -> AccessOutcome {
        self.clock += 1;
        self.cache.access(address, self.clock)
    }

    /// Replays one record: one access for loads and stores, two for modifies
    ///
    /// # Arguments
    ///
    /// * `record`: The trace record
    /// * `outcomes`: Receives the outcome of each access, cleared first
    fn replay_record(&mut self, record: &TraceRecord, outcomes: &mut Vec<AccessOutcome>) {
        outcomes.clear();
        for _ in 0..record.operation.accesses() {
            let outcome = self.access(record.address);
            outcomes.push(outcome);
        }
    }

    /// Replays records which have already been parsed
    pub fn replay<I: IntoIterator<Item = TraceRecord>>(&mut self, records: I) -> &SimulationResult {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(2);
        for record in records {
            self.replay_record(&record, &mut outcomes);
        }
        self.finish(start)
    }

    /// Simulates the cache over a trace in the line format, e.g. ` L 10,4`
    ///
    /// Lines which don't describe a load, store or modify are skipped
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace input
    ///
    /// returns: Result<&SimulationResult, ResourceError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<&SimulationResult, ResourceError> {
        self.simulate_with(reader, |_, _| {})
    }

    /// Simulates the cache like [`Simulator::simulate`], reporting every replayed record and the
    /// outcome of each of its accesses to `observer`
    pub fn simulate_with<R, F>(&mut self, mut reader: R, mut observer: F) -> Result<&SimulationResult, ResourceError>
    where
        R: BufRead,
        F: FnMut(&TraceRecord, &[AccessOutcome]),
    {
        let start = Instant::now();
        let mut line = Vec::with_capacity(64);
        let mut outcomes = Vec::with_capacity(2);
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line).map_err(ResourceError::Read)?;
            if read == 0 {
                break;
            }
            if let Some(record) = parse_line(&line) {
                self.replay_record(&record, &mut outcomes);
                observer(&record, &outcomes);
            }
        }
        Ok(self.finish(start))
    }

    fn finish(&mut self, start: Instant) -> &SimulationResult {
        self.simulation_time += Instant::now() - start;
        let state = self.cache.state();
        self.result = SimulationResult {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        };
        &self.result
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of valid lines in each tier, recency tier first
    pub fn get_resident_line_counts(&self) -> Vec<(TierKind, u64)> {
        [TierKind::Recency, TierKind::Frequency]
            .into_iter()
            .map(|kind| (kind, self.cache.tier(kind).resident_line_count() as u64))
            .collect()
    }

    /// The number of valid lines in the recency tier, as tracked while simulating
    pub fn population(&self) -> u64 {
        self.cache.state().population
    }

    /// The logical time of the last access
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache(&self) -> &DualCache {
        &self.cache
    }
}
