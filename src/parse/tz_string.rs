//! Functions used for parsing the POSIX TZ string footer of a TZif file.

use crate::error::{ParseDataError, ZoneInfoError};
use crate::parse::utils::{parse_int, read_exact, read_optional_tag, read_sign, read_tag, read_until, read_while, Cursor};
use crate::transition::NominalOffsets;

/// Parse time zone designation
fn parse_time_zone_designation<'a>(cursor: &mut Cursor<'a>) -> Result<&'a [u8], ParseDataError> {
    let unquoted = if cursor.first() == Some(&b'<') {
        read_exact(cursor, 1)?;
        let unquoted = read_until(cursor, |&x| x == b'>')?;
        read_exact(cursor, 1)?;
        unquoted
    } else {
        read_while(cursor, u8::is_ascii_alphabetic)?
    };

    if unquoted.is_empty() {
        return Err(ParseDataError::InvalidData);
    }

    Ok(unquoted)
}

/// Parse signed hours, minutes and seconds, checking the hour range
fn parse_signed_hhmmss(cursor: &mut Cursor<'_>, max_hour: i32) -> Result<i32, ZoneInfoError> {
    let sign = read_sign(cursor)?;
    let hour: i32 = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

    let mut minute = 0;
    let mut second = 0;

    if read_optional_tag(cursor, b":")? {
        minute = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

        if read_optional_tag(cursor, b":")? {
            second = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;
        }
    }

    if hour > max_hour || !(0..=59).contains(&minute) || !(0..=59).contains(&second) {
        return Err(ZoneInfoError::InvalidFooter);
    }

    Ok(sign * (hour * 3600 + minute * 60 + second))
}

/// Check a transition rule day, as `Jn`, `n` or `Mm.w.d`
fn check_rule_day(cursor: &mut Cursor<'_>) -> Result<(), ZoneInfoError> {
    let valid = match cursor.first() {
        Some(b'J') => {
            read_exact(cursor, 1)?;
            (1..=365).contains(&parse_int::<u16>(read_while(cursor, u8::is_ascii_digit)?)?)
        }
        Some(b'M') => {
            read_exact(cursor, 1)?;

            let month: u8 = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;
            read_tag(cursor, b".")?;
            let week: u8 = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;
            read_tag(cursor, b".")?;
            let week_day: u8 = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

            (1..=12).contains(&month) && (1..=5).contains(&week) && week_day <= 6
        }
        _ => parse_int::<u16>(read_while(cursor, u8::is_ascii_digit)?)? <= 365,
    };

    if valid {
        Ok(())
    } else {
        Err(ZoneInfoError::InvalidFooter)
    }
}

/// Check a transition rule, as `date[/time]`, allowing the TZif extended time range
fn check_rule_block(cursor: &mut Cursor<'_>) -> Result<(), ZoneInfoError> {
    check_rule_day(cursor)?;

    if read_optional_tag(cursor, b"/")? {
        parse_signed_hhmmss(cursor, 167)?;
    }

    Ok(())
}

/// Parse the nominal offsets of a POSIX TZ string, as found in the footer of a TZif file.
///
/// POSIX offsets are positive west of Greenwich. The daylight saving offset defaults to one hour ahead of standard time.
pub(crate) fn parse_posix_tz(tz_string: &[u8]) -> Result<NominalOffsets, ZoneInfoError> {
    let mut cursor = tz_string;

    parse_time_zone_designation(&mut cursor)?;
    let std_offset = -parse_signed_hhmmss(&mut cursor, 24)?;

    if cursor.is_empty() {
        return Ok(NominalOffsets { std_offset, dst_offset: 0 });
    }

    parse_time_zone_designation(&mut cursor)?;

    let dst_utc_offset = match cursor.first() {
        Some(&b',') | None => std_offset + 3600,
        Some(_) => -parse_signed_hhmmss(&mut cursor, 24)?,
    };

    if !cursor.is_empty() {
        read_tag(&mut cursor, b",")?;
        check_rule_block(&mut cursor)?;

        read_tag(&mut cursor, b",")?;
        check_rule_block(&mut cursor)?;
    }

    if !cursor.is_empty() {
        return Err(ZoneInfoError::InvalidFooter);
    }

    Ok(NominalOffsets { std_offset, dst_offset: dst_utc_offset - std_offset })
}
