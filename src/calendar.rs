//! Calendar arithmetic in the [proleptic gregorian calendar](https://en.wikipedia.org/wiki/Proleptic_Gregorian_calendar).
//!
//! Day numbers count days since the Unix epoch (`1970-01-01`), months are in `[1, 12]` and weekdays are in `[1, 7]`, from Sunday.

use crate::constants::*;

use std::fmt;

/// Check if a year is a leap year
pub const fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Returns the number of days of a month in `[1, 12]`
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAY_IN_MONTHS_NORMAL_YEAR[(month - 1) as usize] as u8
    }
}

/// Compute the number of days since Unix epoch (`1970-01-01`).
///
/// Months outside of `[1, 12]` and days outside of the month wrap into the neighbouring months and years.
pub fn day_number(year: i32, month: i64, month_day: i64) -> i64 {
    let full_year = year as i64 + (month - 1).div_euclid(MONTHS_PER_YEAR);
    let month = (month - 1).rem_euclid(MONTHS_PER_YEAR) as usize;

    let is_leap_year = full_year % 400 == 0 || (full_year % 4 == 0 && full_year % 100 != 0);

    let mut result = (full_year - 1970) * DAYS_PER_NORMAL_YEAR;

    if full_year >= 1970 {
        result += (full_year - 1968) / 4;
        result -= (full_year - 1900) / 100;
        result += (full_year - 1600) / 400;

        if is_leap_year && month < 2 {
            result -= 1;
        }
    } else {
        result += (full_year - 1972) / 4;
        result -= (full_year - 2000) / 100;
        result += (full_year - 2000) / 400;

        if is_leap_year && month >= 2 {
            result += 1;
        }
    }

    result + CUMUL_DAY_IN_MONTHS_NORMAL_YEAR[month] + month_day - 1
}

/// Compute the date `(year, month, month_day)` of a number of days since Unix epoch
pub fn date_from_day_number(day_number: i64) -> (i32, u8, u8) {
    let mut remaining_days = day_number - DAYS_TO_2000_03_01;

    let cycles_400_years = remaining_days.div_euclid(DAYS_PER_400_YEARS);
    remaining_days = remaining_days.rem_euclid(DAYS_PER_400_YEARS);

    let cycles_100_years = (remaining_days / DAYS_PER_100_YEARS).min(3);
    remaining_days -= cycles_100_years * DAYS_PER_100_YEARS;

    let cycles_4_years = (remaining_days / DAYS_PER_4_YEARS).min(24);
    remaining_days -= cycles_4_years * DAYS_PER_4_YEARS;

    let remaining_years = (remaining_days / DAYS_PER_NORMAL_YEAR).min(3);
    remaining_days -= remaining_years * DAYS_PER_NORMAL_YEAR;

    let mut year = 2000 + remaining_years + cycles_4_years * 4 + cycles_100_years * 100 + cycles_400_years * 400;

    let mut month = 2;
    for days in DAY_IN_MONTHS_LEAP_YEAR_FROM_MARCH {
        if remaining_days < days {
            break;
        }
        remaining_days -= days;
        month += 1;
    }

    if month >= MONTHS_PER_YEAR {
        month -= MONTHS_PER_YEAR;
        year += 1;
    }

    (year as i32, month as u8 + 1, remaining_days as u8 + 1)
}

/// Compute the day of the week in `[1, 7]`, from Sunday
pub fn day_of_week(day_number: i64) -> u8 {
    // 1970-01-01 is a Thursday
    (day_number + 4).rem_euclid(DAYS_PER_WEEK) as u8 + 1
}

/// Day number of the first `weekday` falling on or after `month_day`, possibly in the next month
pub fn day_on_or_after(year: i32, month: u8, weekday: u8, month_day: u8) -> i64 {
    let day_number = day_number(year, month.into(), month_day.into());
    day_number + (weekday as i64 - day_of_week(day_number) as i64).rem_euclid(DAYS_PER_WEEK)
}

/// Day number of the last `weekday` falling on or before `month_day`, possibly in the previous month
pub fn day_on_or_before(year: i32, month: u8, weekday: u8, month_day: u8) -> i64 {
    let day_number = day_number(year, month.into(), month_day.into());
    day_number - (day_of_week(day_number) as i64 - weekday as i64).rem_euclid(DAYS_PER_WEEK)
}

/// Day number of the last `weekday` of a month
pub fn last_weekday_of_month(year: i32, month: u8, weekday: u8) -> i64 {
    day_on_or_before(year, month, weekday, days_in_month(year, month))
}

/// Date and time of day, without any associated offset
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct LocalDateTime {
    /// Year
    pub year: i32,
    /// Month in `[1, 12]`
    pub month: u8,
    /// Day of the month in `[1, 31]`
    pub month_day: u8,
    /// Hours since midnight in `[0, 23]`
    pub hour: u8,
    /// Minutes in `[0, 59]`
    pub minute: u8,
    /// Seconds in `[0, 59]`
    pub second: u8,
}

impl LocalDateTime {
    /// Local date time observed at a Unix time under a UTC offset in seconds
    pub fn from_unix_time(unix_time: i64, utc_offset: i32) -> Self {
        let local_time = unix_time + utc_offset as i64;
        let (year, month, month_day) = date_from_day_number(local_time.div_euclid(SECONDS_PER_DAY));
        let day_time = local_time.rem_euclid(SECONDS_PER_DAY);

        Self {
            year,
            month,
            month_day,
            hour: (day_time / SECONDS_PER_HOUR) as u8,
            minute: (day_time % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
            second: (day_time % SECONDS_PER_MINUTE) as u8,
        }
    }

    /// Unix time of the local date time under a UTC offset in seconds
    pub fn unix_time(&self, utc_offset: i32) -> i64 {
        self.day_number() * SECONDS_PER_DAY + self.day_time() - utc_offset as i64
    }

    /// Number of days since Unix epoch of the date part
    pub fn day_number(&self) -> i64 {
        day_number(self.year, self.month.into(), self.month_day.into())
    }

    /// Seconds elapsed since local midnight
    pub fn day_time(&self) -> i64 {
        self.hour as i64 * SECONDS_PER_HOUR + self.minute as i64 * SECONDS_PER_MINUTE + self.second as i64
    }

    /// Date part as `(year, month, month_day)`
    pub fn date(&self) -> (i32, u8, u8) {
        (self.year, self.month, self.month_day)
    }
}

impl fmt::Display for LocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02} {:02}:{:02}:{:02}", self.year, self.month, self.month_day, self.hour, self.minute, self.second)
    }
}

/// Local calendar year observed at a Unix time under a UTC offset in seconds
pub fn year_at(unix_time: i64, utc_offset: i32) -> i32 {
    LocalDateTime::from_unix_time(unix_time, utc_offset).year
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_leap_year() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2001));
        assert!(is_leap_year(2004));
        assert!(!is_leap_year(2100));
        assert!(!is_leap_year(2200));
        assert!(!is_leap_year(2300));
        assert!(is_leap_year(2400));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2019, 2), 28);
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2020, 4), 30);
        assert_eq!(days_in_month(2020, 12), 31);
    }

    #[test]
    fn test_day_number() {
        assert_eq!(day_number(1970, 1, 1), 0);
        assert_eq!(day_number(-1001, 3, 1), -1085076);
        assert_eq!(day_number(1600, 2, 29), -135081);
        assert_eq!(day_number(1600, 3, 1), -135080);
        assert_eq!(day_number(1700, 3, 1), -98556);
        assert_eq!(day_number(1701, 3, 1), -98191);
        assert_eq!(day_number(1704, 2, 29), -97096);
        assert_eq!(day_number(2000, 2, 29), 11016);
        assert_eq!(day_number(2000, 3, 1), 11017);
        assert_eq!(day_number(2001, 3, 1), 11382);
        assert_eq!(day_number(2004, 2, 29), 12477);
        assert_eq!(day_number(2100, 3, 1), 47541);
        assert_eq!(day_number(3001, 3, 1), 376624);
    }

    #[test]
    fn test_day_number_wraps_months_and_days() {
        assert_eq!(day_number(2019, 13, 1), day_number(2020, 1, 1));
        assert_eq!(day_number(2019, 0, 31), day_number(2018, 12, 31));
        assert_eq!(day_number(2019, 3, 0), day_number(2019, 2, 28));
        assert_eq!(day_number(2019, 11, 33), day_number(2019, 12, 3));
    }

    #[test]
    fn test_date_from_day_number() {
        assert_eq!(date_from_day_number(0), (1970, 1, 1));
        assert_eq!(date_from_day_number(-1), (1969, 12, 31));
        assert_eq!(date_from_day_number(-1085076), (-1001, 3, 1));
        assert_eq!(date_from_day_number(-135081), (1600, 2, 29));
        assert_eq!(date_from_day_number(-97096), (1704, 2, 29));
        assert_eq!(date_from_day_number(11016), (2000, 2, 29));
        assert_eq!(date_from_day_number(12477), (2004, 2, 29));
        assert_eq!(date_from_day_number(47541), (2100, 3, 1));
        assert_eq!(date_from_day_number(376624), (3001, 3, 1));

        for day_number in (-200_000..200_000).step_by(97) {
            let (year, month, month_day) = date_from_day_number(day_number);
            assert_eq!(super::day_number(year, month.into(), month_day.into()), day_number);
        }
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(day_of_week(day_number(1970, 1, 1)), 5);
        assert_eq!(day_of_week(day_number(2000, 1, 1)), 7);
        assert_eq!(day_of_week(day_number(2019, 3, 10)), 1);
        assert_eq!(day_of_week(day_number(2019, 11, 1)), 6);
    }

    #[test]
    fn test_relative_days() {
        // Sun>=8 in March 2019
        assert_eq!(date_from_day_number(day_on_or_after(2019, 3, 1, 8)), (2019, 3, 10));
        // Sun>=1 in March 2020 is the 1st itself
        assert_eq!(date_from_day_number(day_on_or_after(2020, 3, 1, 1)), (2020, 3, 1));
        // Fri>=26 in February 2019 spills into March
        assert_eq!(date_from_day_number(day_on_or_after(2019, 2, 6, 26)), (2019, 3, 1));
        // Sun<=25 in March 2019
        assert_eq!(date_from_day_number(day_on_or_before(2019, 3, 1, 25)), (2019, 3, 24));
        // Sat<=1 in June 2019 is the 1st itself, Sun<=1 spills into May
        assert_eq!(date_from_day_number(day_on_or_before(2019, 6, 7, 1)), (2019, 6, 1));
        assert_eq!(date_from_day_number(day_on_or_before(2019, 6, 1, 1)), (2019, 5, 26));
        // lastSun and lastFri
        assert_eq!(date_from_day_number(last_weekday_of_month(2019, 3, 1)), (2019, 3, 31));
        assert_eq!(date_from_day_number(last_weekday_of_month(2019, 10, 1)), (2019, 10, 27));
        assert_eq!(date_from_day_number(last_weekday_of_month(2020, 2, 6)), (2020, 2, 28));
    }

    #[test]
    fn test_local_date_time() {
        let date_time = LocalDateTime::from_unix_time(1552201200, -18000);
        assert_eq!(date_time, LocalDateTime { year: 2019, month: 3, month_day: 10, hour: 2, minute: 0, second: 0 });
        assert_eq!(date_time.unix_time(-18000), 1552201200);
        assert_eq!(date_time.to_string(), "2019-03-10 02:00:00");

        let before_epoch = LocalDateTime::from_unix_time(-1, 0);
        assert_eq!(before_epoch.to_string(), "1969-12-31 23:59:59");

        assert_eq!(year_at(1577836799, 0), 2019);
        assert_eq!(year_at(1577836799, 1), 2020);
    }
}
