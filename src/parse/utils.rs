//! Byte cursor helpers shared by the text and binary parsers.

use crate::error::ParseDataError;

use std::num::ParseIntError;
use std::str::{self, FromStr};

pub(super) type Cursor<'a> = &'a [u8];

/// Read exactly `count` bytes and reduce remaining data
pub(super) fn read_exact<'a>(cursor: &mut Cursor<'a>, count: usize) -> Result<&'a [u8], ParseDataError> {
    match cursor.split_at_checked(count) {
        Some((result, tail)) => {
            *cursor = tail;
            Ok(result)
        }
        None => Err(ParseDataError::UnexpectedEof),
    }
}

/// Read exactly `N` bytes into an array and reduce remaining data
pub(super) fn read_chunk_exact<'a, const N: usize>(cursor: &mut Cursor<'a>) -> Result<&'a [u8; N], ParseDataError> {
    match cursor.split_first_chunk::<N>() {
        Some((result, tail)) => {
            *cursor = tail;
            Ok(result)
        }
        None => Err(ParseDataError::UnexpectedEof),
    }
}

/// Read bytes and compare them to the provided tag
pub(super) fn read_tag(cursor: &mut Cursor<'_>, tag: &[u8]) -> Result<(), ParseDataError> {
    if read_exact(cursor, tag.len())? == tag {
        Ok(())
    } else {
        Err(ParseDataError::InvalidData)
    }
}

/// Read bytes if the remaining data is prefixed by the provided tag
pub(super) fn read_optional_tag(cursor: &mut Cursor<'_>, tag: &[u8]) -> Result<bool, ParseDataError> {
    if cursor.starts_with(tag) {
        read_exact(cursor, tag.len())?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Read bytes as long as the provided predicate is true
pub(super) fn read_while<'a, F: Fn(&u8) -> bool>(cursor: &mut Cursor<'a>, f: F) -> Result<&'a [u8], ParseDataError> {
    read_exact(cursor, cursor.iter().position(|x| !f(x)).unwrap_or(cursor.len()))
}

/// Read bytes until the provided predicate is true
pub(super) fn read_until<'a, F: Fn(&u8) -> bool>(cursor: &mut Cursor<'a>, f: F) -> Result<&'a [u8], ParseDataError> {
    read_exact(cursor, cursor.iter().position(f).unwrap_or(cursor.len()))
}

/// Read an optional `+` or `-` sign, returning `1` or `-1`
pub(super) fn read_sign(cursor: &mut Cursor<'_>) -> Result<i32, ParseDataError> {
    match cursor.first() {
        Some(b'-') => read_exact(cursor, 1).map(|_| -1),
        Some(b'+') => read_exact(cursor, 1).map(|_| 1),
        _ => Ok(1),
    }
}

/// Parse an integer from a slice of bytes
pub(super) fn parse_int<T: FromStr<Err = ParseIntError>>(bytes: &[u8]) -> Result<T, ParseDataError> {
    str::from_utf8(bytes).ok().and_then(|s| s.parse().ok()).ok_or(ParseDataError::InvalidData)
}
