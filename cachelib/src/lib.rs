//! # DualCache
//!
//! DualCache is a library for simulating a two-tier set-associative cache
//!
//! Every set is backed by two tiers of lines: a recency tier, which receives every new line and
//! is replaced in least recently used order, and a frequency tier, which keeps lines that were
//! pushed out of the recency tier while still ranking in the upper half of cache-wide access
//! frequencies. The simulator replays a memory trace against the two tiers and reports hits,
//! misses and evictions

/// Contains the line and tier storage, and the address decoder shared by both tiers
pub mod cache;

/// Contains the simulation parameters, their validation, and the JSON input format
pub mod config;

/// Contains the replacement engine which drives both tiers for a single access
pub mod engine;

/// Contains the error types for configuration and trace loading
pub mod error;

/// Contains helpers to open trace files for reading
pub mod io;

/// Contains the victim selection policies and the frequency rank used for promotion
pub mod replacement_policies;

/// Contains the simulator used to replay a trace with a given cache configuration
pub mod simulator;

/// Contains the trace record model and line parser
pub mod trace;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
