//! Compilation of parsed zones into transition lists.
//!
//! A zone is replayed line by line. Lines without a rule set give a single transition at the start of the line.
//! Lines referencing a rule set give one candidate transition per rule and year, which are sorted, adjusted for the
//! wall clock, restricted to the line span and the year range, then named.

use crate::calendar::year_at;
use crate::config::Config;
use crate::constants::*;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::*;
use crate::transition::{Transition, TransitionList};
use crate::zone::{ClockType, RuleRecord, RuleSet, RulesRef, TzData, ZoneLineRecord};

use std::sync::Arc;

/// Letters standing in for rule letters which are not known yet
const UNKNOWN_LETTERS: &str = "?";

/// Returns the display name of a zone line format.
///
/// `%s` is replaced by the rule letters. Otherwise a `std/dst` format gives one of its sides, and any other format is used as is.
/// Numeric names, as in `+03` or `%z` formats, give `None`.
pub fn display_name(format: &str, letters: &str, is_dst: bool) -> Option<Arc<str>> {
    if format.contains("%z") {
        return None;
    }

    let name = match format.split_once("%s") {
        Some((before, after)) => format!("{before}{letters}{after}"),
        None => match format.split_once('/') {
            Some((std, dst)) => (if is_dst { dst } else { std }).to_owned(),
            None => format.to_owned(),
        },
    };

    if name.is_empty() || name.starts_with(['+', '-']) {
        None
    } else {
        Some(name.into())
    }
}

/// Candidate rule transition, before naming
#[derive(Debug, Clone)]
struct Candidate {
    /// Unix time
    time: i64,
    /// Rule which produced the candidate
    rule: Arc<RuleRecord>,
}

/// State of the compilation of one zone
struct ZoneCompilation<'a> {
    /// Zone id being compiled
    zone_id: &'a str,
    /// Year range
    config: &'a Config,
    /// Transitions compiled so far
    transitions: Vec<Transition>,
    /// Standard offset of the previous zone line
    last_utc_offset: i32,
    /// End of the previous zone line, which is the start of the current one
    last_until: i64,
    /// Collected diagnostics
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl ZoneCompilation<'_> {
    /// Display name of a format, reporting formats needing letters which are not known
    fn name(&mut self, format: &str, letters: Option<&str>, is_dst: bool) -> Option<Arc<str>> {
        if letters.is_none() && format.contains("%s") {
            warn!("{}: unresolved time zone name {format}{}", self.zone_id, if is_dst { ", DST" } else { "" });
            self.diagnostics.push(Diagnostic::new(self.zone_id, DiagnosticKind::UnresolvedName { format: format.to_owned(), is_dst }));
        }

        display_name(format, letters.unwrap_or(UNKNOWN_LETTERS), is_dst)
    }

    /// Apply a zone line without rule set, returning the end of the line
    fn apply_fixed(&mut self, record: &ZoneLineRecord, save: i32) -> i64 {
        let name = self.name(&record.format, None, save != 0);
        self.transitions.push(Transition::new(self.last_until, record.gmt_offset + save, save, name));

        match record.until_clock {
            ClockType::Wall => record.until - i64::from(save),
            _ => record.until,
        }
    }

    /// Apply a zone line with a rule set, returning the end of the line
    fn apply_rules(&mut self, record: &ZoneLineRecord, rule_set: &RuleSet) -> i64 {
        let min_time = self.last_until;
        let last_dst = self.transitions.last().map_or(0, |x| x.dst_offset);
        let high_year = if record.is_open_ended() { OPEN_ENDED_YEAR } else { year_at(record.until, record.gmt_offset) };

        let mut candidates = Vec::new();

        for rule in &rule_set.rules {
            let last_year = high_year.min(rule.end_year).min(self.config.max_year());
            trace!("{}: replaying rule {} {}..={last_year}, save {}", self.zone_id, rule.name, rule.start_year, rule.save);

            for year in rule.start_year.max(MIN_RULE_YEAR)..=last_year {
                let local_time = rule.local_time_in(year);

                let (offset, last_offset, last_save) = match rule.at_clock {
                    ClockType::Utc => (0, 0, 0),
                    ClockType::Standard => (record.gmt_offset, self.last_utc_offset, 0),
                    ClockType::Wall => (record.gmt_offset, self.last_utc_offset, last_dst),
                };

                // A rule firing exactly when the line starts, as seen from the previous line
                let time = if local_time - i64::from(last_offset) - i64::from(last_save) == min_time { min_time } else { local_time - i64::from(offset) };

                candidates.push(Candidate { time, rule: rule.clone() });
            }
        }

        candidates.sort_by_key(|x| x.time);

        // Wall clock times are relative to the save in effect before the transition
        for index in 1..candidates.len() {
            if candidates[index].rule.at_clock == ClockType::Wall {
                candidates[index].time -= i64::from(candidates[index - 1].rule.save);
            }
        }

        let mut kept: Vec<Candidate> = Vec::new();
        let mut first_std_letters = None;
        let mut fallback_std_letters = None;
        let mut last_before_start: Option<Candidate> = None;
        let mut starts_at_min_time = false;

        for candidate in candidates {
            let max_time = match (kept.last(), record.until_clock) {
                (Some(prev), ClockType::Wall) => record.until - i64::from(prev.rule.save),
                _ => record.until,
            };

            let year = year_at(candidate.time, 0);
            let is_std = candidate.rule.save == 0;

            if min_time <= candidate.time && candidate.time < max_time && self.config.min_year() <= year && year <= self.config.max_year() {
                if first_std_letters.is_none() && is_std {
                    first_std_letters = Some(candidate.rule.letters.clone());
                }
                starts_at_min_time |= candidate.time == min_time;

                kept.push(candidate);
            } else {
                if is_std && (candidate.time < min_time || fallback_std_letters.is_none()) {
                    fallback_std_letters = Some(candidate.rule.letters.clone());
                }

                if candidate.time < min_time && last_before_start.as_ref().map_or(true, |x| x.time < candidate.time) {
                    last_before_start = Some(candidate);
                }
            }
        }

        if !starts_at_min_time {
            let (save, letters, rule) = match last_before_start {
                Some(Candidate { rule, .. }) => (rule.save, Some(rule.letters.clone()), Some(rule)),
                None => (0, first_std_letters.or(fallback_std_letters), None),
            };

            let name = self.name(&record.format, letters.as_deref(), save != 0);
            self.transitions.push(Transition::new(min_time, record.gmt_offset + save, save, name).with_rule(rule));
        }

        for Candidate { time, rule } in kept {
            let name = self.name(&record.format, Some(&*rule.letters), rule.save != 0);
            self.transitions.push(Transition::new(time, record.gmt_offset + rule.save, rule.save, name).with_rule(Some(rule)));
        }

        let last_save = self.transitions.last().and_then(|x| x.rule.as_ref()).map(|x| x.save);

        match (record.until_clock, last_save) {
            (ClockType::Wall, Some(save)) if !record.is_open_ended() => record.until - i64::from(save),
            _ => record.until,
        }
    }
}

/// Compiler of parsed zones into transition lists
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    /// Parsed zone data
    tz_data: &'a TzData,
    /// Year range
    config: Config,
}

impl<'a> Compiler<'a> {
    /// Construct a compiler
    pub fn new(tz_data: &'a TzData, config: Config) -> Self {
        Self { tz_data, config }
    }

    /// Returns parsed zone data
    pub fn tz_data(&self) -> &'a TzData {
        self.tz_data
    }

    /// Returns settings
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile a zone or an alias, discarding diagnostics
    pub fn compile(&self, zone_id: &str) -> Result<TransitionList> {
        self.compile_with_diagnostics(zone_id, &mut Vec::new())
    }

    /// Compile a zone or an alias into a deduplicated list trimmed to the configured year range
    pub fn compile_with_diagnostics(&self, zone_id: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<TransitionList> {
        let zone = self.tz_data.find_zone(zone_id)?;

        let mut compilation = ZoneCompilation {
            zone_id,
            config: &self.config,
            transitions: Vec::new(),
            last_utc_offset: 0,
            last_until: BEGINNING_OF_TIME,
            diagnostics,
        };

        for record in &zone.lines {
            let until = match &record.rules {
                RulesRef::None => compilation.apply_fixed(record, 0),
                RulesRef::Fixed(save) => compilation.apply_fixed(record, *save),
                RulesRef::Named(name) => {
                    let rule_set = self
                        .tz_data
                        .rule_set(name)
                        .ok_or_else(|| Error::UnknownRuleSet { zone_id: zone_id.to_owned(), rule_set: name.to_string() })?;

                    compilation.apply_rules(record, rule_set)
                }
            };

            compilation.last_utc_offset = record.gmt_offset;
            compilation.last_until = until;

            if until < END_OF_TIME / 2 && year_at(until, record.gmt_offset) > self.config.max_year() {
                break;
            }
        }

        let alias_of = self.tz_data.alias_target(zone_id).map(Arc::from);
        let mut list = TransitionList::new(zone_id, compilation.transitions).with_last_zone_line(zone.last_line().cloned()).with_alias_of(alias_of);

        list.dedupe();
        list.trim(self.config.min_year(), self.config.max_year());

        debug!("{zone_id}: {} transitions", list.len());
        Ok(list)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::parse::parse_sources;

    pub(crate) const TEST_SOURCE: &str = "
Rule    Test    2000    max     -       Mar     Sun>=8  2:00    1:00    D
Rule    Test    2000    max     -       Nov     Sun>=1  2:00    0       S

Zone    Test/Zone       -5:00   Test    E%sT
Zone    Test/Fixed      2:00    -       XYZ
";

    pub(crate) fn test_data(config: &Config) -> Result<TzData> {
        parse_sources([("test", TEST_SOURCE)], config)
    }

    fn transition(time: i64, utc_offset: i32, dst_offset: i32, name: &str) -> Transition {
        Transition::new(time, utc_offset, dst_offset, Some(name.into()))
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("E%sT", "D", true).as_deref(), Some("EDT"));
        assert_eq!(display_name("E%sT", "", false).as_deref(), Some("ET"));
        assert_eq!(display_name("GMT/BST", "", false).as_deref(), Some("GMT"));
        assert_eq!(display_name("GMT/BST", "", true).as_deref(), Some("BST"));
        assert_eq!(display_name("LMT", "S", false).as_deref(), Some("LMT"));
        assert_eq!(display_name("+03/+04", "", true), None);
        assert_eq!(display_name("%z", "", false), None);
        assert_eq!(display_name("%s", "", false), None);
    }

    #[test]
    fn test_compile_rules() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let tz_data = test_data(&config)?;
        let list = Compiler::new(&tz_data, config).compile("Test/Zone")?;

        assert_eq!(
            list.transitions(),
            [
                transition(BEGINNING_OF_TIME, -18000, 0, "EST"),
                transition(1552201200, -14400, 3600, "EDT"),
                transition(1572760800, -18000, 0, "EST"),
                transition(1583650800, -14400, 3600, "EDT"),
                transition(1604210400, -18000, 0, "EST"),
            ]
        );

        assert_eq!(list.zone_id(), "Test/Zone");
        assert_eq!(list.alias_of(), None);
        assert_eq!(list.last_zone_line().map(|x| &x.rules), Some(&RulesRef::Named("Test".into())));
        assert!(list.transitions()[1].rule.as_ref().is_some_and(|x| &*x.letters == "D"));

        Ok(())
    }

    #[test]
    fn test_compile_fixed() -> Result<()> {
        let config = Config::default();
        let tz_data = test_data(&config)?;
        let list = Compiler::new(&tz_data, config).compile("Test/Fixed")?;

        assert_eq!(list.transitions(), [transition(BEGINNING_OF_TIME, 7200, 0, "XYZ")]);

        Ok(())
    }

    #[test]
    fn test_compile_zone_lines() -> Result<()> {
        let source = "
Rule    EU      1981    max     -       Mar     lastSun  1:00u  1:00    S
Rule    EU      1981    1995    -       Sep     lastSun  1:00u  0       -
Rule    EU      1996    max     -       Oct     lastSun  1:00u  0       -

Zone    Test/Lines      0:20    -       LMT     1950
                        1:00    -       CET     1980 Apr 6 2:00s
                        1:00    1:00    CEST    1980 Sep 28 3:00
                        1:00    EU      CE%sT
Link    Test/Lines      Test/Alias
";
        let config = Config::new().with_years(1900, 2000);
        let tz_data = parse_sources([("test", source)], &config)?;
        let mut diagnostics = Vec::new();
        let list = Compiler::new(&tz_data, config).compile_with_diagnostics("Test/Alias", &mut diagnostics)?;

        assert!(diagnostics.is_empty());
        assert_eq!(list.zone_id(), "Test/Alias");
        assert_eq!(list.alias_of(), Some("Test/Lines"));

        // 1950-01-01 00:00 at +0:20, 1980-04-06 02:00 at +1:00, 1980-09-28 03:00 at +2:00, 1981-03-29 01:00 UTC
        assert_eq!(
            &list.transitions()[..5],
            [
                transition(BEGINNING_OF_TIME, 1200, 0, "LMT"),
                transition(-631153200, 3600, 0, "CET"),
                transition(323830800, 7200, 3600, "CEST"),
                transition(338950800, 3600, 0, "CET"),
                transition(354675600, 7200, 3600, "CEST"),
            ]
        );

        let last = list.transitions().last().map(|x| (x.dst_offset, year_at(x.time, x.utc_offset)));
        assert_eq!(last, Some((0, 2000)));

        Ok(())
    }

    #[test]
    fn test_unresolved_name() -> Result<()> {
        let source = "
Rule    Late    2010    max     -       Mar     lastSun  1:00u  1:00    S
Zone    Test/Late       1:00    -       CE%sT   2000
                        1:00    Late    CE%sT
";
        let config = Config::new().with_years(1990, 2012);
        let tz_data = parse_sources([("test", source)], &config)?;
        let mut diagnostics = Vec::new();
        let list = Compiler::new(&tz_data, config).compile_with_diagnostics("Test/Late", &mut diagnostics)?;

        assert_eq!(list.transitions()[0].name.as_deref(), Some("CE?T"));
        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|x| matches!(&x.kind, DiagnosticKind::UnresolvedName { format, is_dst: false } if format == "CE%sT")));

        Ok(())
    }

    #[test]
    fn test_compile_errors() -> Result<()> {
        let config = Config::default();
        let tz_data = parse_sources([("test", "Zone Test/Bad 1:00 Nowhere C%sT\n")], &config)?;
        let compiler = Compiler::new(&tz_data, config);

        assert!(matches!(compiler.compile("Test/Bad"), Err(Error::UnknownRuleSet { rule_set, .. }) if rule_set == "Nowhere"));
        assert!(matches!(compiler.compile("Test/Missing"), Err(Error::UnknownZone(zone_id)) if zone_id == "Test/Missing"));

        Ok(())
    }
}
