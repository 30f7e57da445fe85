//! Compilation settings.

use crate::filter::ZoneFilter;

/// Settings shared by the parser, the compiler and the compact table codec
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// First year kept in transition lists
    min_year: i32,
    /// Last year kept in transition lists
    max_year: i32,
    /// Round offsets and times to whole minutes
    round_to_minutes: bool,
    /// Shift transitions causing a calendar rollback
    fix_calendar_rollbacks: bool,
    /// Append the final rule pair to compact tables
    tail_rules: bool,
    /// Report calendar rollbacks even when not fixing them
    check_rollbacks: bool,
    /// Filter applied to the zones of a batch
    zone_filter: Option<ZoneFilter>,
}

impl Config {
    /// Construct default settings: years `[1900, 2050]`, no rounding, rollbacks reported but not fixed, tail rules included, no zone filter
    pub const fn new() -> Self {
        Self { min_year: 1900, max_year: 2050, round_to_minutes: false, fix_calendar_rollbacks: false, tail_rules: true, check_rollbacks: true, zone_filter: None }
    }

    /// Set the year range of transition lists.
    ///
    /// Use `i32::MIN` as the first year to keep the whole history.
    pub const fn with_years(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Set whether offsets and times are rounded to whole minutes
    pub const fn with_round_to_minutes(mut self, round_to_minutes: bool) -> Self {
        self.round_to_minutes = round_to_minutes;
        self
    }

    /// Set whether transitions causing a calendar rollback are shifted
    pub const fn with_fix_calendar_rollbacks(mut self, fix_calendar_rollbacks: bool) -> Self {
        self.fix_calendar_rollbacks = fix_calendar_rollbacks;
        self
    }

    /// Set whether the final rule pair is appended to compact tables
    pub const fn with_tail_rules(mut self, tail_rules: bool) -> Self {
        self.tail_rules = tail_rules;
        self
    }

    /// Set whether calendar rollbacks are reported when not fixed
    pub const fn with_check_rollbacks(mut self, check_rollbacks: bool) -> Self {
        self.check_rollbacks = check_rollbacks;
        self
    }

    /// Set the filter applied to the zones of a batch
    pub const fn with_zone_filter(mut self, zone_filter: Option<ZoneFilter>) -> Self {
        self.zone_filter = zone_filter;
        self
    }

    /// Returns the first year kept in transition lists
    pub const fn min_year(&self) -> i32 {
        self.min_year
    }

    /// Returns the last year kept in transition lists
    pub const fn max_year(&self) -> i32 {
        self.max_year
    }

    /// Returns whether offsets and times are rounded to whole minutes
    pub const fn round_to_minutes(&self) -> bool {
        self.round_to_minutes
    }

    /// Returns whether transitions causing a calendar rollback are shifted
    pub const fn fix_calendar_rollbacks(&self) -> bool {
        self.fix_calendar_rollbacks
    }

    /// Returns whether the final rule pair is appended to compact tables
    pub const fn tail_rules(&self) -> bool {
        self.tail_rules
    }

    /// Returns whether calendar rollbacks are reported when not fixed
    pub const fn check_rollbacks(&self) -> bool {
        self.check_rollbacks
    }

    /// Returns the filter applied to the zones of a batch
    pub const fn zone_filter(&self) -> Option<&ZoneFilter> {
        self.zone_filter.as_ref()
    }

    /// Returns the tolerance in seconds used when matching offsets and times: one minute when rounding, zero otherwise
    pub const fn rounding_tolerance(&self) -> i64 {
        if self.round_to_minutes {
            60
        } else {
            0
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config() {
        const CONFIG: Config = Config::new().with_years(1970, 2037).with_round_to_minutes(true).with_tail_rules(false);

        assert_eq!((CONFIG.min_year(), CONFIG.max_year()), (1970, 2037));
        assert!(CONFIG.round_to_minutes());
        assert!(!CONFIG.tail_rules());
        assert!(!CONFIG.fix_calendar_rollbacks());
        assert!(CONFIG.check_rollbacks());
        assert_eq!(CONFIG.rounding_tolerance(), 60);
        assert_eq!(CONFIG.zone_filter(), None);

        const FILTERED: Config = Config::new().with_zone_filter(Some(ZoneFilter::STANDARD));
        assert_eq!(FILTERED.zone_filter(), Some(&ZoneFilter::STANDARD));

        assert_eq!(Config::default().rounding_tolerance(), 0);
        assert_eq!((Config::default().min_year(), Config::default().max_year()), (1900, 2050));
    }
}
