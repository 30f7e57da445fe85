//! Binary zoneinfo error types.

use std::error::Error;
use std::fmt;
use std::str::Utf8Error;

/// Parse data error
#[non_exhaustive]
#[derive(Debug)]
pub enum ParseDataError {
    /// Unexpected end of data
    UnexpectedEof,
    /// Invalid data
    InvalidData,
}

impl fmt::Display for ParseDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of data"),
            Self::InvalidData => f.write_str("invalid data"),
        }
    }
}

impl Error for ParseDataError {}

/// Unified error type for reading a binary zoneinfo (TZif) file
#[non_exhaustive]
#[derive(Debug)]
pub enum ZoneInfoError {
    /// UTF-8 error
    Utf8(Utf8Error),
    /// Parse data error
    ParseData(ParseDataError),
    /// Invalid magic number
    InvalidMagicNumber,
    /// Unsupported TZif version
    UnsupportedVersion,
    /// Invalid header
    InvalidHeader,
    /// Invalid footer
    InvalidFooter,
    /// Invalid DST indicator
    InvalidDstIndicator,
    /// Invalid time zone designation char index
    InvalidDesignationIndex,
    /// Invalid local time type index
    InvalidLocalTimeTypeIndex,
    /// Offset out of the `[-24h, 24h]` range
    InvalidOffset,
}

impl fmt::Display for ZoneInfoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::Utf8(error) => error.fmt(f),
            Self::ParseData(error) => error.fmt(f),
            Self::InvalidMagicNumber => f.write_str("invalid magic number"),
            Self::UnsupportedVersion => f.write_str("unsupported TZif version"),
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::InvalidFooter => f.write_str("invalid footer"),
            Self::InvalidDstIndicator => f.write_str("invalid DST indicator"),
            Self::InvalidDesignationIndex => f.write_str("invalid time zone designation char index"),
            Self::InvalidLocalTimeTypeIndex => f.write_str("invalid local time type index"),
            Self::InvalidOffset => f.write_str("invalid offset"),
        }
    }
}

impl Error for ZoneInfoError {}

impl From<Utf8Error> for ZoneInfoError {
    fn from(error: Utf8Error) -> Self {
        Self::Utf8(error)
    }
}

impl From<ParseDataError> for ZoneInfoError {
    fn from(error: ParseDataError) -> Self {
        Self::ParseData(error)
    }
}
