//! Compact table error types.

use std::error::Error;
use std::fmt;

/// Error found while encoding or decoding a compact transition table
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TableError {
    /// Nothing to encode
    EmptyList,
    /// Table has a number of sections other than 1, 4 or 5
    InvalidSectionCount(usize),
    /// Header section is missing fields
    InvalidHeader,
    /// Malformed `±HHMM[SS]` offset
    InvalidOffsetNotation(String),
    /// Character outside of the base-60 alphabet
    InvalidBase60Digit(char),
    /// Empty base-60 number
    EmptyNumber,
    /// Base-60 number too large for a 64-bit integer
    NumberOverflow,
    /// Entry of the offset table is not `offset/dst[/name]`
    InvalidOffsetEntry(String),
    /// Offset index points past the end of the offset table
    OffsetIndexOutOfRange(usize),
    /// Index and delta-time sections have different lengths
    MismatchedSections {
        /// Number of offset indices
        indices: usize,
        /// Number of time deltas
        deltas: usize,
    },
    /// A list uses more distinct offsets than one base-60 digit can index
    TooManyOffsets(usize),
    /// Malformed tail rule
    InvalidTailRule(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::EmptyList => f.write_str("cannot encode an empty transition list"),
            Self::InvalidSectionCount(count) => write!(f, "a table has 1, 4 or 5 sections, found {count}"),
            Self::InvalidHeader => f.write_str("invalid table header"),
            Self::InvalidOffsetNotation(s) => write!(f, "invalid offset notation `{s}`"),
            Self::InvalidBase60Digit(c) => write!(f, "invalid base-60 digit `{c}`"),
            Self::EmptyNumber => f.write_str("empty base-60 number"),
            Self::NumberOverflow => f.write_str("base-60 number overflows a 64-bit integer"),
            Self::InvalidOffsetEntry(s) => write!(f, "invalid offset table entry `{s}`"),
            Self::OffsetIndexOutOfRange(index) => write!(f, "offset index {index} is out of range"),
            Self::MismatchedSections { indices, deltas } => write!(f, "{indices} offset indices but {deltas} time deltas"),
            Self::TooManyOffsets(count) => write!(f, "{count} distinct offsets cannot be indexed by a single base-60 digit"),
            Self::InvalidTailRule(s) => write!(f, "invalid tail rule `{s}`"),
        }
    }
}

impl Error for TableError {}
