use std::fs::File;
use std::io::BufReader;
use std::mem::size_of;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::cache::CacheLine;
use crate::error::{ConfigError, ResourceError};

/// The simulation parameters, validated and immutable once built
///
/// Both tiers share the same geometry: `2^s` sets of `E` lines, over blocks of `2^b` bytes
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PartialCacheConfig")]
pub struct CacheConfig {
    #[serde(rename = "s")]
    set_index_bits: u32,
    #[serde(rename = "b")]
    block_offset_bits: u32,
    #[serde(rename = "E")]
    lines_per_set: u32,
}

/// A configuration which may be missing values, as read from a config file or the command line
#[derive(Debug, Default, Copy, Clone, Deserialize)]
pub struct PartialCacheConfig {
    #[serde(default, alias = "s")]
    pub set_index_bits: Option<u32>,
    #[serde(default, alias = "b")]
    pub block_offset_bits: Option<u32>,
    #[serde(default, alias = "E")]
    pub lines_per_set: Option<u32>,
}

impl CacheConfig {
    /// Creates a validated configuration
    ///
    /// # Arguments
    ///
    /// * `set_index_bits`: s, the number of address bits selecting the set
    /// * `block_offset_bits`: b, the number of address bits selecting a byte within a block
    /// * `lines_per_set`: E, the associativity of each tier
    ///
    /// returns: Result<CacheConfig, ConfigError>
    pub fn new(set_index_bits: u32, block_offset_bits: u32, lines_per_set: u32) -> Result<Self, ConfigError> {
        if lines_per_set == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if set_index_bits.checked_add(block_offset_bits).map_or(true, |bits| bits > u64::BITS) {
            return Err(ConfigError::AddressTooNarrow { set_index_bits, block_offset_bits });
        }
        // Both tiers are allocated up front, so the line count has to fit in memory indices
        let lines = 1usize
            .checked_shl(set_index_bits)
            .and_then(|sets| sets.checked_mul(lines_per_set as usize))
            .filter(|lines| lines.checked_mul(2 * size_of::<CacheLine>()).map_or(false, |bytes| bytes <= isize::MAX as usize));
        match lines {
            Some(_) => Ok(Self { set_index_bits, block_offset_bits, lines_per_set }),
            None => Err(ConfigError::TooManyLines { set_index_bits, lines_per_set }),
        }
    }

    pub fn set_index_bits(&self) -> u32 {
        self.set_index_bits
    }

    pub fn block_offset_bits(&self) -> u32 {
        self.block_offset_bits
    }

    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set as usize
    }

    /// S, the number of sets in each tier
    pub fn num_sets(&self) -> usize {
        1 << self.set_index_bits
    }

    /// B, the block size in bytes. Saturates for block offsets of 64 bits
    pub fn block_size(&self) -> u64 {
        1u64.checked_shl(self.block_offset_bits).unwrap_or(u64::MAX)
    }

    pub fn set_index_mask(&self) -> u64 {
        (self.num_sets() - 1) as u64
    }

    /// Total lines held by one tier
    pub fn lines_per_tier(&self) -> usize {
        self.num_sets() * self.lines_per_set()
    }
}

impl PartialCacheConfig {
    /// Layers `overrides` on top of this configuration, keeping existing values where the override
    /// is missing
    pub fn merge(self, overrides: PartialCacheConfig) -> Self {
        Self {
            set_index_bits: overrides.set_index_bits.or(self.set_index_bits),
            block_offset_bits: overrides.block_offset_bits.or(self.block_offset_bits),
            lines_per_set: overrides.lines_per_set.or(self.lines_per_set),
        }
    }

    pub fn build(self) -> Result<CacheConfig, ConfigError> {
        let s = self.set_index_bits.ok_or(ConfigError::MissingParameter("-s"))?;
        let e = self.lines_per_set.ok_or(ConfigError::MissingParameter("-E"))?;
        let b = self.block_offset_bits.ok_or(ConfigError::MissingParameter("-b"))?;
        CacheConfig::new(s, b, e)
    }
}

impl TryFrom<PartialCacheConfig> for CacheConfig {
    type Error = ConfigError;

    fn try_from(value: PartialCacheConfig) -> Result<Self, Self::Error> {
        value.build()
    }
}

/// Reads a possibly incomplete configuration from a JSON file such as `{"s": 4, "E": 2, "b": 4}`
pub fn load_config(path: &Path) -> Result<PartialCacheConfig, ResourceError> {
    let file = File::open(path).map_err(|source| ResourceError::Open { path: path.to_path_buf(), source })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ResourceError::ConfigFormat { path: path.to_path_buf(), source })
}
