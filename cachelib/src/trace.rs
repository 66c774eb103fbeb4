use std::fmt;
use crate::hex::{HEX_LOOKUP, INVALID_DIGIT};

/// The kind of memory operation in a trace record
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Load,
    Store,
    /// A load followed by a store to the same address
    Modify,
}

impl Operation {
    /// Maps a trace line marker to its operation. Anything else, such as instruction fetches
    /// (`I`), is not simulated
    pub fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            b'L' => Some(Operation::Load),
            b'S' => Some(Operation::Store),
            b'M' => Some(Operation::Modify),
            _ => None,
        }
    }

    pub fn marker(&self) -> char {
        match self {
            Operation::Load => 'L',
            Operation::Store => 'S',
            Operation::Modify => 'M',
        }
    }

    /// The number of cache accesses the operation performs
    pub fn accesses(&self) -> usize {
        match self {
            Operation::Load | Operation::Store => 1,
            Operation::Modify => 2,
        }
    }
}

/// A single memory operation from the trace
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TraceRecord {
    pub operation: Operation,
    pub address: u64,
    /// Size of the access in bytes. Recorded, but the cache only looks at the address
    pub size: u32,
}

impl TraceRecord {
    pub fn new(operation: Operation, address: u64, size: u32) -> Self {
        Self { operation, address, size }
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.operation.marker(), self.address, self.size)
    }
}

/// Parses one trace line, e.g. ` L 7ff000388,8`
///
/// The second byte is the operation marker and the address starts at the fourth. Lines without a
/// recognised marker or without a usable address are skipped by returning None, they are not
/// errors
///
/// # Arguments
///
/// * `line`: The line, with or without its line terminator
///
/// returns: Option<TraceRecord>
///
/// # Examples
///
/// ```
/// use dualcache::trace::{parse_line, Operation, TraceRecord};
/// assert_eq!(parse_line(b" M 0421c7f0,4\n"), Some(TraceRecord::new(Operation::Modify, 0x421c7f0, 4)));
/// assert_eq!(parse_line(b"I  0400d7d4,8"), None);
/// ```
pub fn parse_line(line: &[u8]) -> Option<TraceRecord> {
    let operation = Operation::from_marker(*line.get(1)?)?;
    let rest = line.get(3..)?;
    let (address, consumed) = parse_address(rest)?;
    let size = match rest.get(consumed) {
        Some(b',') => parse_size(&rest[consumed + 1..]),
        _ => 0,
    };
    Some(TraceRecord { operation, address, size })
}

/// Parses a hexadecimal address from the start of a buffer, returning it with the number of bytes
/// consumed
///
/// Leading blanks and a `0x` prefix are accepted. Parsing stops at the first byte which isn't a
/// hex digit. Returns None when there are no digits, or the value doesn't fit in 64 bits
///
/// Digits are decoded through a lookup table generated by the build script, which avoids
/// converting the buffer to a str for `from_str_radix` on every line
///
/// # Arguments
///
/// * `buf`: The byte buffer
///
/// returns: Option<(u64, usize)>
///
/// # Examples
///
/// ```
/// use dualcache::trace::parse_address;
/// assert_eq!(parse_address(b"7ff000388,8"), Some((0x7ff000388, 9)));
/// assert_eq!(parse_address(b"0x1F"), Some((0x1f, 4)));
/// assert_eq!(parse_address(b",8"), None);
/// ```
pub fn parse_address(buf: &[u8]) -> Option<(u64, usize)> {
    let mut x = 0;
    while x < buf.len() && (buf[x] == b' ' || buf[x] == b'\t') {
        x += 1;
    }
    if buf.len() > x + 2 && buf[x] == b'0' && (buf[x + 1] == b'x' || buf[x + 1] == b'X') && HEX_LOOKUP[buf[x + 2] as usize] != INVALID_DIGIT {
        x += 2;
    }
    let start = x;
    let mut res: u64 = 0;
    while x < buf.len() {
        let digit = HEX_LOOKUP[buf[x] as usize];
        if digit == INVALID_DIGIT {
            break;
        }
        if res.leading_zeros() < 4 {
            return None;
        }
        res = res << 4 | digit as u64;
        x += 1;
    }
    if x == start {
        None
    } else {
        Some((res, x))
    }
}

/// Parses a decimal access size from the start of a buffer, stopping at the first non digit
///
/// Sizes too large for a u32 saturate, the cache doesn't use them
///
/// # Arguments
///
/// * `buf`: The input
///
/// returns: u32
///
/// # Examples
///
/// ```
/// use dualcache::trace::parse_size;
/// assert_eq!(parse_size(b"10\n"), 10);
/// assert_eq!(parse_size(b""), 0);
/// ```
pub fn parse_size(buf: &[u8]) -> u32 {
    buf.iter()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0u32, |res, byte| res.saturating_mul(10).saturating_add((byte - b'0') as u32))
}
