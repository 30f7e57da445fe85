//! Types related to daylight saving rules.

use crate::calendar::*;
use crate::constants::*;

use std::fmt;
use std::sync::Arc;

/// Clock basis of a time of day
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ClockType {
    /// Local wall clock time, including any daylight saving
    Wall,
    /// Local standard time
    Standard,
    /// Universal time
    Utc,
}

impl ClockType {
    /// Clock type of a time suffix letter (`w`, `s`, `g`, `u` or `z`)
    pub fn from_suffix(suffix: u8) -> Option<Self> {
        match suffix.to_ascii_lowercase() {
            b'w' => Some(Self::Wall),
            b's' => Some(Self::Standard),
            b'g' | b'u' | b'z' => Some(Self::Utc),
            _ => None,
        }
    }

    /// Numeric code used in compact tail rules
    pub const fn code(self) -> i32 {
        match self {
            Self::Wall => 0,
            Self::Standard => 1,
            Self::Utc => 2,
        }
    }

    /// Clock type of a compact tail rule code
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Wall),
            1 => Some(Self::Standard),
            2 => Some(Self::Utc),
            _ => None,
        }
    }
}

/// Day specification of a rule or of a zone line end
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DaySpec {
    /// Exact day of the month
    Exact(u8),
    /// First week day on or after a day of the month, as in `Sun>=8`
    OnOrAfter {
        /// Week day in `[1, 7]`, from Sunday
        week_day: u8,
        /// Day of the month
        month_day: u8,
    },
    /// Last week day on or before a day of the month, as in `Sun<=25`
    OnOrBefore {
        /// Week day in `[1, 7]`, from Sunday
        week_day: u8,
        /// Day of the month
        month_day: u8,
    },
    /// Last week day of the month, as in `lastSun`
    Last(u8),
}

impl DaySpec {
    /// Resolve the day specification for a month, returning a number of days since Unix epoch.
    ///
    /// The resolved day may fall in the previous or next month.
    pub fn resolve(&self, year: i32, month: u8) -> i64 {
        match *self {
            Self::Exact(month_day) => day_number(year, month.into(), month_day.into()),
            Self::OnOrAfter { week_day, month_day } => day_on_or_after(year, month, week_day, month_day),
            Self::OnOrBefore { week_day, month_day } => day_on_or_before(year, month, week_day, month_day),
            Self::Last(week_day) => last_weekday_of_month(year, month, week_day),
        }
    }

    /// Day of the month code used in compact tail rules: `0` for the last week day, negative for on-or-before
    pub const fn month_day_code(&self) -> i32 {
        match *self {
            Self::Exact(month_day) | Self::OnOrAfter { month_day, .. } => month_day as i32,
            Self::OnOrBefore { month_day, .. } => -(month_day as i32),
            Self::Last(_) => 0,
        }
    }

    /// Week day code used in compact tail rules: `-1` for an exact day
    pub const fn week_day_code(&self) -> i32 {
        match *self {
            Self::Exact(_) => -1,
            Self::OnOrAfter { week_day, .. } | Self::OnOrBefore { week_day, .. } | Self::Last(week_day) => week_day as i32,
        }
    }

    /// Day specification of compact tail rule codes
    pub fn from_codes(month_day_code: i32, week_day_code: i32) -> Option<Self> {
        let week_day = u8::try_from(week_day_code).ok().filter(|x| (1..=7).contains(x));

        match (month_day_code, week_day) {
            (1..=31, None) if week_day_code < 0 => Some(Self::Exact(month_day_code as u8)),
            (1..=31, Some(week_day)) => Some(Self::OnOrAfter { week_day, month_day: month_day_code as u8 }),
            (-31..=-1, Some(week_day)) => Some(Self::OnOrBefore { week_day, month_day: (-month_day_code) as u8 }),
            (0, Some(week_day)) => Some(Self::Last(week_day)),
            _ => None,
        }
    }
}

impl fmt::Display for DaySpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = |week_day: u8| {
            let name = WEEKDAY_NAMES[(week_day - 1) as usize];
            let mut chars = name.chars();
            chars.next().map(|c| c.to_ascii_uppercase().to_string() + chars.as_str()).unwrap_or_default()
        };

        match *self {
            Self::Exact(month_day) => write!(f, "{month_day}"),
            Self::OnOrAfter { week_day, month_day } => write!(f, "{}>={month_day}", name(week_day)),
            Self::OnOrBefore { week_day, month_day } => write!(f, "{}<={month_day}", name(week_day)),
            Self::Last(week_day) => write!(f, "last{}", name(week_day)),
        }
    }
}

/// Daylight saving rule, as defined by one `Rule` line
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RuleRecord {
    /// Name of the rule set
    pub name: Arc<str>,
    /// First year of the rule, `i32::MIN` if unbounded
    pub start_year: i32,
    /// Last year of the rule (inclusive), `i32::MAX` if unbounded
    pub end_year: i32,
    /// Month in `[1, 12]`
    pub month: u8,
    /// Day of the transition in the month
    pub day: DaySpec,
    /// Time of day of the transition in seconds
    pub at_time: i32,
    /// Clock basis of the time of day
    pub at_clock: ClockType,
    /// Daylight saving offset in seconds
    pub save: i32,
    /// Name fragment substituted into `%s` formats
    pub letters: Arc<str>,
}

impl RuleRecord {
    /// Check if the rule applies in a year
    pub fn is_active_in(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }

    /// Check if the rule has no final year
    pub fn is_open_ended(&self) -> bool {
        self.end_year == i32::MAX
    }

    /// Local time of the rule transition in a year, in seconds since Unix epoch, under the rule clock basis
    pub fn local_time_in(&self, year: i32) -> i64 {
        self.day.resolve(year, self.month) * SECONDS_PER_DAY + self.at_time as i64
    }
}

/// Named collection of rules
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RuleSet {
    /// Rules in definition order
    pub rules: Vec<Arc<RuleRecord>>,
}

impl RuleSet {
    /// Returns the first open-ended rule with a zero (`dst == false`) or nonzero (`dst == true`) save
    pub fn final_rule(&self, dst: bool) -> Option<&Arc<RuleRecord>> {
        self.rules.iter().find(|rule| rule.is_open_ended() && (rule.save != 0) == dst)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clock_type() {
        assert_eq!(ClockType::from_suffix(b'w'), Some(ClockType::Wall));
        assert_eq!(ClockType::from_suffix(b'S'), Some(ClockType::Standard));
        assert_eq!(ClockType::from_suffix(b'g'), Some(ClockType::Utc));
        assert_eq!(ClockType::from_suffix(b'u'), Some(ClockType::Utc));
        assert_eq!(ClockType::from_suffix(b'z'), Some(ClockType::Utc));
        assert_eq!(ClockType::from_suffix(b'x'), None);

        for clock in [ClockType::Wall, ClockType::Standard, ClockType::Utc] {
            assert_eq!(ClockType::from_code(clock.code()), Some(clock));
        }
    }

    #[test]
    fn test_day_spec_resolve() {
        let date = |day: DaySpec, year, month| date_from_day_number(day.resolve(year, month));

        assert_eq!(date(DaySpec::Exact(15), 2019, 4), (2019, 4, 15));
        assert_eq!(date(DaySpec::OnOrAfter { week_day: 1, month_day: 8 }, 2019, 3), (2019, 3, 10));
        assert_eq!(date(DaySpec::OnOrAfter { week_day: 1, month_day: 1 }, 2019, 11), (2019, 11, 3));
        assert_eq!(date(DaySpec::OnOrAfter { week_day: 6, month_day: 26 }, 2019, 2), (2019, 3, 1));
        assert_eq!(date(DaySpec::OnOrBefore { week_day: 1, month_day: 1 }, 2019, 6), (2019, 5, 26));
        assert_eq!(date(DaySpec::Last(1), 2019, 10), (2019, 10, 27));
        assert_eq!(date(DaySpec::Last(6), 2020, 2), (2020, 2, 28));
    }

    #[test]
    fn test_day_spec_codes() {
        let specs = [
            DaySpec::Exact(15),
            DaySpec::OnOrAfter { week_day: 1, month_day: 8 },
            DaySpec::OnOrBefore { week_day: 7, month_day: 25 },
            DaySpec::Last(1),
        ];

        assert_eq!(specs.map(|x| (x.month_day_code(), x.week_day_code())), [(15, -1), (8, 1), (-25, 7), (0, 1)]);

        for spec in specs {
            assert_eq!(DaySpec::from_codes(spec.month_day_code(), spec.week_day_code()), Some(spec));
        }

        assert_eq!(DaySpec::from_codes(0, -1), None);
        assert_eq!(DaySpec::from_codes(8, 9), None);
    }

    #[test]
    fn test_day_spec_display() {
        assert_eq!(DaySpec::Exact(15).to_string(), "15");
        assert_eq!(DaySpec::OnOrAfter { week_day: 1, month_day: 8 }.to_string(), "Sun>=8");
        assert_eq!(DaySpec::OnOrBefore { week_day: 7, month_day: 25 }.to_string(), "Sat<=25");
        assert_eq!(DaySpec::Last(6).to_string(), "lastFri");
    }
}
