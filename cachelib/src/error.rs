use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised while assembling a configuration, before any simulation starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required command line argument {0}")]
    MissingParameter(&'static str),
    #[error("Lines per set (-E) must be at least 1")]
    ZeroAssociativity,
    #[error("Set index bits ({set_index_bits}) and block offset bits ({block_offset_bits}) don't fit in a 64-bit address")]
    AddressTooNarrow {
        set_index_bits: u32,
        block_offset_bits: u32,
    },
    #[error("A cache of 2^{set_index_bits} sets with {lines_per_set} lines each is too large to allocate")]
    TooManyLines {
        set_index_bits: u32,
        lines_per_set: u32,
    },
}

/// Raised when an input file can't be opened, mapped, read or decoded
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't memory map the file: {0}")]
    Map(#[source] io::Error),
    #[error("Couldn't read the trace: {0}")]
    Read(#[source] io::Error),
    #[error("Couldn't parse the config file at path {}: {source}", path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Any fatal error the library can report
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
