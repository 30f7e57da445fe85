//! Error types.

pub mod parse;
pub mod table;
pub mod zoneinfo;

pub use parse::{ParseError, ParseErrorKind};
pub use table::TableError;
pub use zoneinfo::{ParseDataError, ZoneInfoError};

use std::error;
use std::fmt;
use std::io;

/// Alias for [`std::result::Result`] with the crate unified error
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for everything in the crate
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Malformed source line
    Parse(ParseError),
    /// Alias whose target is not a defined zone
    UnresolvedAlias {
        /// Alias zone id
        alias: String,
        /// Declared target
        target: String,
    },
    /// Chain of aliases looping back on itself
    AliasCycle(String),
    /// Zone id absent from the parsed zones and aliases
    UnknownZone(String),
    /// Zone line referencing a rule set that was never defined
    UnknownRuleSet {
        /// Zone being compiled
        zone_id: String,
        /// Referenced rule set name
        rule_set: String,
    },
    /// Compact table error
    Table(TableError),
    /// Binary zoneinfo error
    ZoneInfo(ZoneInfoError),
    /// I/O error
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::UnresolvedAlias { alias, target } => write!(f, "{alias} is mapped to unknown time zone {target}"),
            Self::AliasCycle(alias) => write!(f, "alias {alias} refers back to itself"),
            Self::UnknownZone(zone_id) => write!(f, "unknown time zone: {zone_id}"),
            Self::UnknownRuleSet { zone_id, rule_set } => write!(f, "{zone_id} refers to unknown rule set {rule_set}"),
            Self::Table(error) => write!(f, "invalid compact table: {error}"),
            Self::ZoneInfo(error) => write!(f, "invalid zoneinfo file: {error}"),
            Self::Io(error) => error.fmt(f),
        }
    }
}

impl error::Error for Error {}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<TableError> for Error {
    fn from(error: TableError) -> Self {
        Self::Table(error)
    }
}

impl From<ZoneInfoError> for Error {
    fn from(error: ZoneInfoError) -> Self {
        Self::ZoneInfo(error)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
