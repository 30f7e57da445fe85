//! Functions used for parsing the fields of a source line.

use crate::constants::*;
use crate::error::{ParseDataError, ParseErrorKind};
use crate::parse::utils::*;
use crate::zone::{ClockType, DaySpec};

/// Largest hour of a duration field, one week
const MAX_HOURS: i32 = 24 * 7 - 1;

/// Parse hours, minutes and seconds, rounding fractional seconds to the nearest second
fn parse_hhmmss(cursor: &mut Cursor<'_>) -> Result<(i32, i32, i32), ParseDataError> {
    let hour = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

    let mut minute = 0;
    let mut second = 0;

    if read_optional_tag(cursor, b":")? {
        minute = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

        if read_optional_tag(cursor, b":")? {
            second = parse_int(read_while(cursor, u8::is_ascii_digit)?)?;

            if read_optional_tag(cursor, b".")? {
                let fraction = read_while(cursor, u8::is_ascii_digit)?;
                if fraction.first().is_some_and(|&x| x >= b'5') {
                    second += 1;
                }
            }
        }
    }

    Ok((hour, minute, second))
}

/// Parse a signed duration written as `[-]h[:mm[:ss]]`, which must use the whole field
fn parse_duration(field: &str, round_to_minutes: bool) -> Result<i32, ParseDataError> {
    let mut cursor = field.as_bytes();

    let sign = read_sign(&mut cursor)?;
    let (hour, mut minute, mut second) = parse_hhmmss(&mut cursor)?;

    if !cursor.is_empty() || hour > MAX_HOURS || !(0..=59).contains(&minute) || !(0..=60).contains(&second) {
        return Err(ParseDataError::InvalidData);
    }

    if round_to_minutes {
        if second >= 30 {
            minute += 1;
        }
        second = 0;
    }

    Ok(sign * (hour * 3600 + minute * 60 + second))
}

/// Split a trailing letter from a field
fn split_suffix(field: &str) -> (&str, Option<u8>) {
    match field.as_bytes().last() {
        Some(&x) if x.is_ascii_alphabetic() => (&field[..field.len() - 1], Some(x)),
        _ => (field, None),
    }
}

/// Parse a UTC offset, as in the `STDOFF` field of a zone line
pub(super) fn parse_offset(field: &str, round_to_minutes: bool) -> Result<i32, ParseErrorKind> {
    parse_duration(field, round_to_minutes).map_err(|_| ParseErrorKind::InvalidOffset(field.to_owned()))
}

/// Parse a daylight saving amount, always rounded to whole minutes.
///
/// A trailing `s` or `d` marker is ignored.
pub(super) fn parse_save(field: &str) -> Result<i32, ParseErrorKind> {
    let (value, _) = split_suffix(field);
    parse_duration(value, true).map_err(|_| ParseErrorKind::InvalidOffset(field.to_owned()))
}

/// Parse a time of day with an optional clock type suffix.
///
/// A lone `-` stands for midnight.
pub(super) fn parse_time_of_day(field: &str, round_to_minutes: bool) -> Result<(i32, ClockType), ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidTime(field.to_owned());

    if field == "-" {
        return Ok((0, ClockType::Wall));
    }

    let (value, suffix) = split_suffix(field);
    let clock = match suffix {
        Some(suffix) => ClockType::from_suffix(suffix).ok_or_else(invalid)?,
        None => ClockType::Wall,
    };

    let time = parse_duration(value, round_to_minutes).map_err(|_| invalid())?;
    Ok((time, clock))
}

/// Find the unique name of a list starting with an abbreviation, or the 3-letter name starting a full name
fn find_name(field: &str, names: &[&str]) -> Option<usize> {
    let field = field.to_ascii_lowercase();
    if field.is_empty() {
        return None;
    }

    let mut matches = names.iter().enumerate().filter(|(_, name)| if field.len() <= name.len() { name.starts_with(&field) } else { field.starts_with(**name) });

    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}

/// Parse a month name, returning a month in `[1, 12]`
pub(super) fn parse_month(field: &str) -> Result<u8, ParseErrorKind> {
    match find_name(field, &MONTH_NAMES) {
        Some(index) => Ok(index as u8 + 1),
        None => Err(ParseErrorKind::InvalidMonth(field.to_owned())),
    }
}

/// Parse a week day name, returning a week day in `[1, 7]`, from Sunday
pub(super) fn parse_week_day(field: &str) -> Result<u8, ParseErrorKind> {
    match find_name(field, &WEEKDAY_NAMES) {
        Some(index) => Ok(index as u8 + 1),
        None => Err(ParseErrorKind::InvalidWeekday(field.to_owned())),
    }
}

/// Parse a day specification: `15`, `lastSun`, `Sun>=8` or `Sun<=25`
pub(super) fn parse_day_spec(field: &str) -> Result<DaySpec, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidDaySpec(field.to_owned());

    let month_day = |s: &str| parse_int::<u8>(s.as_bytes()).ok().filter(|x| (1..=31).contains(x)).ok_or_else(invalid);

    if field.len() > 4 && field[..4].eq_ignore_ascii_case("last") {
        return Ok(DaySpec::Last(parse_week_day(&field[4..])?));
    }

    if let Some((week_day, day)) = field.split_once(">=") {
        return Ok(DaySpec::OnOrAfter { week_day: parse_week_day(week_day)?, month_day: month_day(day)? });
    }

    if let Some((week_day, day)) = field.split_once("<=") {
        return Ok(DaySpec::OnOrBefore { week_day: parse_week_day(week_day)?, month_day: month_day(day)? });
    }

    Ok(DaySpec::Exact(month_day(field)?))
}

/// Check if a field abbreviates a keyword, with at least `min_len` letters
fn is_abbreviation(field: &str, keyword: &str, min_len: usize) -> bool {
    field.len() >= min_len && keyword.starts_with(&field.to_ascii_lowercase())
}

/// Parse a year, where `min` and `max` stand for unbounded years
pub(super) fn parse_year(field: &str) -> Result<i32, ParseErrorKind> {
    match field {
        _ if is_abbreviation(field, "minimum", 2) => Ok(i32::MIN),
        _ if is_abbreviation(field, "maximum", 2) => Ok(i32::MAX),
        _ => {
            let mut cursor = field.as_bytes();
            let sign = read_sign(&mut cursor).map_err(|_| ParseErrorKind::InvalidYear(field.to_owned()))?;
            let year: i32 = parse_int(cursor).map_err(|_| ParseErrorKind::InvalidYear(field.to_owned()))?;
            Ok(sign * year)
        }
    }
}

/// Parse the last year of a rule, where `only` stands for the first year
pub(super) fn parse_end_year(field: &str, start_year: i32) -> Result<i32, ParseErrorKind> {
    if is_abbreviation(field, "only", 1) {
        Ok(start_year)
    } else {
        parse_year(field)
    }
}

/// Parse the `UNTIL` fields of a zone line: `YEAR [MONTH [DAY [TIME]]]`.
///
/// Returns the end of the span in seconds since Unix epoch and its clock basis, or [`END_OF_TIME`] without fields.
/// Wall and standard times are converted with the zone line standard offset.
pub(super) fn parse_until(fields: &[&str], gmt_offset: i32, round_to_minutes: bool) -> Result<(i64, ClockType), ParseErrorKind> {
    let Some((&year_field, fields)) = fields.split_first() else {
        return Ok((END_OF_TIME, ClockType::Wall));
    };

    let year = parse_year(year_field)?;
    if year == i32::MIN || year == i32::MAX {
        return Err(ParseErrorKind::InvalidYear(year_field.to_owned()));
    }

    let month = fields.first().map(|x| parse_month(x)).transpose()?.unwrap_or(1);
    let day = fields.get(1).map(|x| parse_day_spec(x)).transpose()?.unwrap_or(DaySpec::Exact(1));
    let (time, clock) = fields.get(2).map(|x| parse_time_of_day(x, round_to_minutes)).transpose()?.unwrap_or((0, ClockType::Wall));

    let local_time = day.resolve(year, month) * SECONDS_PER_DAY + time as i64;
    let until = match clock {
        ClockType::Utc => local_time,
        ClockType::Wall | ClockType::Standard => local_time - gmt_offset as i64,
    };

    Ok((until, clock))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calendar::day_number;

    #[test]
    fn test_parse_offset() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_offset("0", false)?, 0);
        assert_eq!(parse_offset("-5:00", false)?, -18000);
        assert_eq!(parse_offset("5:30", false)?, 19800);
        assert_eq!(parse_offset("-4:56:02", false)?, -17762);
        assert_eq!(parse_offset("-4:56:02", true)?, -17760);
        assert_eq!(parse_offset("0:17:30", true)?, 1080);
        assert_eq!(parse_offset("1:39:49.5", false)?, 5990);
        assert!(parse_offset("1:75", false).is_err());
        assert_eq!(parse_offset("167:59:59", false)?, 604799);
        assert_eq!(parse_offset("9999999", false), Err(ParseErrorKind::InvalidOffset("9999999".to_owned())));
        assert!(parse_offset("-2147483647", false).is_err());
        assert!(parse_offset("one", false).is_err());
        assert!(parse_offset("", false).is_err());

        Ok(())
    }

    #[test]
    fn test_parse_save() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_save("0")?, 0);
        assert_eq!(parse_save("1:00")?, 3600);
        assert_eq!(parse_save("-1:00")?, -3600);
        assert_eq!(parse_save("0:20")?, 1200);
        assert_eq!(parse_save("1:00d")?, 3600);
        assert_eq!(parse_save("0s")?, 0);
        assert_eq!(parse_save("0:40:30")?, 2460);

        Ok(())
    }

    #[test]
    fn test_parse_time_of_day() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_time_of_day("2:00", false)?, (7200, ClockType::Wall));
        assert_eq!(parse_time_of_day("2:00s", false)?, (7200, ClockType::Standard));
        assert_eq!(parse_time_of_day("1:00u", false)?, (3600, ClockType::Utc));
        assert_eq!(parse_time_of_day("0:00g", false)?, (0, ClockType::Utc));
        assert_eq!(parse_time_of_day("24:00", false)?, (86400, ClockType::Wall));
        assert_eq!(parse_time_of_day("2w", false)?, (7200, ClockType::Wall));
        assert_eq!(parse_time_of_day("-", false)?, (0, ClockType::Wall));
        assert!(parse_time_of_day("2:00x", false).is_err());

        Ok(())
    }

    #[test]
    fn test_parse_names() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_month("Jan")?, 1);
        assert_eq!(parse_month("March")?, 3);
        assert_eq!(parse_month("Sept")?, 9);
        assert_eq!(parse_month("o")?, 10);
        assert_eq!(parse_month("DEC")?, 12);
        assert!(parse_month("Ju").is_err());
        assert!(parse_month("Foo").is_err());

        assert_eq!(parse_week_day("Sun")?, 1);
        assert_eq!(parse_week_day("Sa")?, 7);
        assert_eq!(parse_week_day("Thursday")?, 5);
        assert!(parse_week_day("S").is_err());

        Ok(())
    }

    #[test]
    fn test_parse_day_spec() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_day_spec("15")?, DaySpec::Exact(15));
        assert_eq!(parse_day_spec("lastSun")?, DaySpec::Last(1));
        assert_eq!(parse_day_spec("Sun>=8")?, DaySpec::OnOrAfter { week_day: 1, month_day: 8 });
        assert_eq!(parse_day_spec("Fri<=1")?, DaySpec::OnOrBefore { week_day: 6, month_day: 1 });
        assert!(parse_day_spec("32").is_err());
        assert!(parse_day_spec("Sun>=").is_err());
        assert!(parse_day_spec("last").is_err());

        Ok(())
    }

    #[test]
    fn test_parse_year() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_year("1970")?, 1970);
        assert_eq!(parse_year("min")?, i32::MIN);
        assert_eq!(parse_year("MAX")?, i32::MAX);
        assert_eq!(parse_end_year("only", 1987)?, 1987);
        assert_eq!(parse_end_year("o", 1987)?, 1987);
        assert_eq!(parse_end_year("ma", 1987)?, i32::MAX);
        assert_eq!(parse_end_year("maximum", 1987)?, i32::MAX);
        assert!(parse_year("19x0").is_err());

        Ok(())
    }

    #[test]
    fn test_parse_until() -> Result<(), ParseErrorKind> {
        assert_eq!(parse_until(&[], -18000, false)?, (END_OF_TIME, ClockType::Wall));

        // 2019-01-01 00:00 local time at -5:00
        assert_eq!(parse_until(&["2019"], -18000, false)?, (17897 * 86400 + 18000, ClockType::Wall));

        // 2019-03-10 02:00 standard time at -5:00
        assert_eq!(parse_until(&["2019", "Mar", "Sun>=8", "2:00s"], -18000, false)?, (17965 * 86400 + 7200 + 18000, ClockType::Standard));

        // 2019-11-03 06:00 UTC
        assert_eq!(parse_until(&["2019", "Nov", "Sun>=1", "6:00u"], -18000, false)?, (18203 * 86400 + 21600, ClockType::Utc));

        // 24:00 rolls over to the next day
        assert_eq!(parse_until(&["2019", "Dec", "31", "24:00u"], 0, false)?, (18262 * 86400, ClockType::Utc));

        assert_eq!(parse_until(&["1900", "Jan", "1", "0:04:25"], 0, true)?, (day_number(1900, 1, 1) * 86400 + 240, ClockType::Wall));

        assert!(parse_until(&["max"], 0, false).is_err());

        Ok(())
    }
}
