//! Some useful constants.

/// Number of seconds in one minute
pub const SECONDS_PER_MINUTE: i64 = 60;
/// Number of seconds in one hour
pub const SECONDS_PER_HOUR: i64 = 3600;
/// Number of seconds in one day
pub const SECONDS_PER_DAY: i64 = 86400;
/// Number of days in one week
pub const DAYS_PER_WEEK: i64 = 7;
/// Number of months in one year
pub const MONTHS_PER_YEAR: i64 = 12;
/// Number of days in a normal year
pub const DAYS_PER_NORMAL_YEAR: i64 = 365;
/// Number of days in 4 years (including 1 leap year)
pub const DAYS_PER_4_YEARS: i64 = DAYS_PER_NORMAL_YEAR * 4 + 1;
/// Number of days in 100 years (including 24 leap years)
pub const DAYS_PER_100_YEARS: i64 = DAYS_PER_NORMAL_YEAR * 100 + 24;
/// Number of days in 400 years (including 97 leap years)
pub const DAYS_PER_400_YEARS: i64 = DAYS_PER_NORMAL_YEAR * 400 + 97;

/// Month days in a normal year
pub const DAY_IN_MONTHS_NORMAL_YEAR: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
/// Cumulated month days in a normal year
pub const CUMUL_DAY_IN_MONTHS_NORMAL_YEAR: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days since Unix epoch at `2000-03-01` (Wednesday)
pub const DAYS_TO_2000_03_01: i64 = 11017;
/// Month days in a leap year from March
pub const DAY_IN_MONTHS_LEAP_YEAR_FROM_MARCH: [i64; 12] = [31, 30, 31, 30, 31, 31, 30, 31, 30, 31, 31, 29];

/// Start time of the first transition of every list, before any real instant
pub const BEGINNING_OF_TIME: i64 = -0x1F_FFFF_FFFF_FFFF;
/// UNTIL value of the open-ended last line of a zone
pub const END_OF_TIME: i64 = 0x1F_FFFF_FFFF_FFFF;

/// Earliest year for which rule transitions are generated
pub const MIN_RULE_YEAR: i32 = 1800;
/// Year standing in for an open-ended zone line when bounding rule years
pub const OPEN_ENDED_YEAR: i32 = 9999;

/// Tolerance used to resynchronize two lists during reference matching (three months)
pub const MATCHING_TOLERANCE: i64 = SECONDS_PER_DAY * 30 * 3;

/// Three-letter English month abbreviations, January first
pub const MONTH_NAMES: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
/// Three-letter English weekday abbreviations, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
