//! Source text parsing error types.

use std::error::Error;
use std::fmt;

/// Kind of a source text parsing error
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// A line has fewer fields than its record type requires
    MissingFields {
        /// Record type of the line
        record: &'static str,
        /// Minimum number of fields
        expected: usize,
        /// Number of fields found
        found: usize,
    },
    /// A line starts with an unknown keyword
    UnknownLineType(String),
    /// A zone continuation line was found while no zone was open
    ContinuationOutsideZone,
    /// A new zone started before the previous one reached an open-ended line
    ZoneNotTerminated(String),
    /// The source ended while a zone was still open
    UnterminatedZoneAtEnd(String),
    /// A zone was defined twice
    DuplicateZone(String),
    /// Unrecognized month name
    InvalidMonth(String),
    /// Unrecognized weekday name
    InvalidWeekday(String),
    /// Unrecognized day specification
    InvalidDaySpec(String),
    /// Malformed time of day
    InvalidTime(String),
    /// Malformed offset
    InvalidOffset(String),
    /// Malformed year
    InvalidYear(String),
    /// Rule year range ending before it starts
    InvalidYearRange {
        /// First year of the rule
        start: i32,
        /// Last year of the rule
        end: i32,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::MissingFields { record, expected, found } => write!(f, "{record} line needs at least {expected} fields, found {found}"),
            Self::UnknownLineType(keyword) => write!(f, "unknown line type `{keyword}`"),
            Self::ContinuationOutsideZone => f.write_str("zone continuation line outside of a zone"),
            Self::ZoneNotTerminated(zone_id) => write!(f, "Zone {zone_id} was not properly terminated"),
            Self::UnterminatedZoneAtEnd(zone_id) => write!(f, "Zone {zone_id} is still open at end of source"),
            Self::DuplicateZone(zone_id) => write!(f, "Zone {zone_id} is defined more than once"),
            Self::InvalidMonth(s) => write!(f, "invalid month `{s}`"),
            Self::InvalidWeekday(s) => write!(f, "invalid weekday `{s}`"),
            Self::InvalidDaySpec(s) => write!(f, "invalid day specification `{s}`"),
            Self::InvalidTime(s) => write!(f, "invalid time `{s}`"),
            Self::InvalidOffset(s) => write!(f, "invalid offset `{s}`"),
            Self::InvalidYear(s) => write!(f, "invalid year `{s}`"),
            Self::InvalidYearRange { start, end } => write!(f, "rule year range {start}-{end} ends before it starts"),
        }
    }
}

/// Error found while parsing a source file, located by file name and line number
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParseError {
    /// Name of the source file
    pub source_name: String,
    /// Line number in `[1, n]`
    pub line_number: usize,
    /// Error kind
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} (line {}): {}", self.source_name, self.line_number, self.kind)
    }
}

impl Error for ParseError {}
