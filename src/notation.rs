//! Textual encodings shared by the compact table format.
//!
//! Base-60 numbers use the digits `0-9`, `a-z` and `A-X`.
//! In fixed-point mode a number of seconds is written as minutes, with the seconds as a single fractional digit after a `.`.

use crate::constants::*;
use crate::error::TableError;

/// Convert a base-60 digit value in `[0, 59]` to its character
fn digit_to_char(digit: u8) -> char {
    let byte = match digit {
        0..=9 => b'0' + digit,
        10..=35 => b'a' + (digit - 10),
        _ => b'A' + (digit - 36),
    };
    byte as char
}

/// Convert a character to its base-60 digit value
fn char_to_digit(c: char) -> Result<i64, TableError> {
    match c {
        '0'..='9' => Ok(c as i64 - '0' as i64),
        'a'..='z' => Ok(c as i64 - 'a' as i64 + 10),
        'A'..='X' => Ok(c as i64 - 'A' as i64 + 36),
        _ => Err(TableError::InvalidBase60Digit(c)),
    }
}

/// Encode an integer in base 60.
///
/// With `divide_by_60`, the value is a number of seconds written as fixed-point minutes: `90` is `1.u`, `7200` is `20`.
pub fn to_base60(value: i64, divide_by_60: bool) -> String {
    let mut magnitude = value.unsigned_abs();

    if magnitude == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(digit_to_char((magnitude % 60) as u8));
        magnitude /= 60;
    }
    digits.reverse();

    let mut result = String::with_capacity(digits.len() + 3);
    if value < 0 {
        result.push('-');
    }

    if divide_by_60 {
        let (whole, fraction) = digits.split_at(digits.len() - 1);

        if whole.is_empty() {
            result.push('0');
        } else {
            result.extend(whole);
        }

        if fraction[0] != '0' {
            result.push('.');
            result.push(fraction[0]);
        }
    } else {
        result.extend(digits);
    }

    result
}

/// Decode a base-60 integer, with an optional sign.
///
/// With `multiply_by_60`, the text is read as fixed-point minutes and the result is a number of seconds.
pub fn from_base60(s: &str, multiply_by_60: bool) -> Result<i64, TableError> {
    let (sign, s) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) if multiply_by_60 => (whole, Some(fraction)),
        _ => (s, None),
    };

    if whole.is_empty() && fraction.is_none() {
        return Err(TableError::EmptyNumber);
    }

    let push_digit = |result: i64, c: char| -> Result<i64, TableError> {
        let digit = char_to_digit(c)?;
        result.checked_mul(60).and_then(|x| x.checked_add(digit)).ok_or(TableError::NumberOverflow)
    };

    let mut result = 0i64;
    for c in whole.chars() {
        result = push_digit(result, c)?;
    }

    if multiply_by_60 {
        let mut chars = fraction.unwrap_or_default().chars();
        result = push_digit(result, chars.next().unwrap_or('0'))?;

        if let Some(c) = chars.next() {
            return Err(TableError::InvalidBase60Digit(c));
        }
    }

    Ok(sign * result)
}

/// Format a UTC offset in seconds as `±HHMM`, followed by `SS` when the seconds are not zero
pub fn format_offset(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let magnitude = offset.unsigned_abs() as i64;

    let hours = magnitude / SECONDS_PER_HOUR;
    let minutes = magnitude % SECONDS_PER_HOUR / SECONDS_PER_MINUTE;
    let seconds = magnitude % SECONDS_PER_MINUTE;

    if seconds != 0 {
        format!("{sign}{hours:02}{minutes:02}{seconds:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

/// Parse an offset written as `±HHMM[SS]`.
///
/// The short forms `0` and `±1` stand for zero and one hour.
pub fn parse_offset_notation(s: &str) -> Result<i32, TableError> {
    let invalid = || TableError::InvalidOffsetNotation(s.to_owned());

    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    match digits {
        "0" => return Ok(0),
        "1" => return Ok(sign * SECONDS_PER_HOUR as i32),
        _ => (),
    }

    if !(digits.len() == 4 || digits.len() == 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let field = |range: std::ops::Range<usize>| digits[range].parse::<i32>().map_err(|_| invalid());

    let mut seconds = field(0..2)? * SECONDS_PER_HOUR as i32 + field(2..4)? * SECONDS_PER_MINUTE as i32;
    if digits.len() == 6 {
        seconds += field(4..6)?;
    }

    Ok(sign * seconds)
}
