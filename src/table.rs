//! Compact transition tables.
//!
//! A table is made of semicolon separated sections:
//!
//! 1. header: `base_offset nominal_std_offset nominal_dst_minutes`, offsets written as `±HHMM[SS]`
//! 2. offset table: space separated `utc_offset/dst_offset[/name]` entries, in fixed-point base 60
//! 3. offset indices: one base-60 digit per transition after the first
//! 4. time deltas: space separated fixed-point base-60 differences from the previous transition time, starting from zero
//! 5. tail rules (optional): `std_rule,dst_rule`, each as `start_year month day_code week_day_code hour:minute clock_code save_minutes`
//!
//! A list with a single transition is written as its header only.

use crate::config::Config;
use crate::constants::*;
use crate::error::TableError;
use crate::notation::*;
use crate::transition::{NominalOffsets, Transition, TransitionList};
use crate::zone::{ClockType, DaySpec, RuleRecord, RulesRef};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Number of distinct offsets which can be indexed by one base-60 digit
const MAX_OFFSET_COUNT: usize = 60;

/// Final recurring rule, allowing transitions to be projected past the end of a table
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TailRule {
    /// First year of the rule
    pub start_year: i32,
    /// Month in `[1, 12]`
    pub month: u8,
    /// Day of the transition in the month
    pub day: DaySpec,
    /// Time of day of the transition in minutes, which can be negative after a rollback fix
    pub at_minutes: i32,
    /// Clock basis of the time of day
    pub at_clock: ClockType,
    /// Daylight saving offset in minutes
    pub save_minutes: i32,
}

impl TailRule {
    /// Construct a tail rule from a rule
    pub fn from_rule(rule: &RuleRecord) -> Self {
        Self {
            start_year: rule.start_year,
            month: rule.month,
            day: rule.day,
            at_minutes: rule.at_time.div_euclid(SECONDS_PER_MINUTE as i32),
            at_clock: rule.at_clock,
            save_minutes: rule.save / SECONDS_PER_MINUTE as i32,
        }
    }
}

impl fmt::Display for TailRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}:{} {} {}",
            self.start_year,
            self.month,
            self.day.month_day_code(),
            self.day.week_day_code(),
            self.at_minutes.div_euclid(60),
            self.at_minutes.rem_euclid(60),
            self.at_clock.code(),
            self.save_minutes
        )
    }
}

impl FromStr for TailRule {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TableError::InvalidTailRule(s.to_owned());
        let int = |x: &str| x.parse::<i32>().map_err(|_| invalid());

        let fields: Vec<_> = s.split(' ').collect();
        let [start_year, month, month_day_code, week_day_code, at, clock_code, save_minutes] = fields[..] else {
            return Err(invalid());
        };

        let (at_hour, at_minute) = at.split_once(':').ok_or_else(invalid)?;

        let month = u8::try_from(int(month)?).ok().filter(|x| (1..=12).contains(x)).ok_or_else(invalid)?;

        Ok(Self {
            start_year: int(start_year)?,
            month,
            day: DaySpec::from_codes(int(month_day_code)?, int(week_day_code)?).ok_or_else(invalid)?,
            at_minutes: int(at_hour)? * 60 + int(at_minute)?,
            at_clock: ClockType::from_code(int(clock_code)?).ok_or_else(invalid)?,
            save_minutes: int(save_minutes)?,
        })
    }
}

/// Entry of the offset table
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct OffsetEntry {
    /// Offset from UTC in seconds
    pub utc_offset: i32,
    /// Daylight saving offset in seconds
    pub dst_offset: i32,
    /// Time zone designation
    pub name: Option<Arc<str>>,
}

impl OffsetEntry {
    /// Offset table entry of a transition
    fn of(transition: &Transition) -> Self {
        Self { utc_offset: transition.utc_offset, dst_offset: transition.dst_offset, name: transition.name.clone().filter(|x| !x.is_empty()) }
    }
}

impl fmt::Display for OffsetEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", to_base60(self.utc_offset.into(), true), to_base60(self.dst_offset.into(), true))?;
        if let Some(name) = &self.name {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

impl FromStr for OffsetEntry {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TableError::InvalidOffsetEntry(s.to_owned());
        let offset = |x: &str| from_base60(x, true).and_then(|x| i32::try_from(x).map_err(|_| invalid()));

        let parts: Vec<_> = s.split('/').collect();
        let (utc_offset, dst_offset, name) = match parts[..] {
            [utc_offset, dst_offset] => (utc_offset, dst_offset, None),
            [utc_offset, dst_offset, name] => (utc_offset, dst_offset, Some(name).filter(|x| !x.is_empty())),
            _ => return Err(invalid()),
        };

        Ok(Self { utc_offset: offset(utc_offset)?, dst_offset: offset(dst_offset)?, name: name.map(Arc::from) })
    }
}

/// Parsed compact transition table
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CompactTable {
    /// UTC offset of the first transition, in seconds
    pub base_offset: i32,
    /// Steady-state standard and daylight saving offsets
    pub nominal: NominalOffsets,
    /// Distinct offsets in first occurrence order
    pub offsets: Vec<OffsetEntry>,
    /// Offset table index of each transition after the first
    pub indices: Vec<usize>,
    /// Time difference in seconds of each transition after the first from the previous one, starting from zero
    pub deltas: Vec<i64>,
    /// Final standard and daylight saving rules
    pub tail: Option<(TailRule, TailRule)>,
}

/// Nominal offsets and final rules found at the end of a compiled list
#[derive(Debug, Default)]
struct FinalState {
    /// Standard offset in seconds
    std_offset: i32,
    /// Daylight saving offset in seconds
    dst_offset: i32,
    /// Final standard time rule
    std_rule: Option<Arc<RuleRecord>>,
    /// Final daylight saving rule
    dst_rule: Option<Arc<RuleRecord>>,
}

impl FinalState {
    /// Scan a list backward, within its last rule set, for its nominal offsets and final rules
    fn of(list: &TransitionList) -> Self {
        if let Some(nominal) = list.nominal() {
            return Self { std_offset: nominal.std_offset, dst_offset: nominal.dst_offset, ..Self::default() };
        }

        let mut state = Self::default();
        let (mut need_std, mut need_dst) = (true, true);
        let mut rule_set_name: Option<&str> = None;

        if let Some(line) = list.last_zone_line().filter(|x| x.rules == RulesRef::None) {
            state.std_offset = line.gmt_offset;
            (need_std, need_dst) = (false, false);
        }

        for transition in list.transitions().iter().rev() {
            if !need_std && !need_dst && state.std_rule.is_some() {
                break;
            }

            let Some(rule) = &transition.rule else {
                if need_std {
                    state.std_offset = transition.std_offset();
                }
                if need_dst {
                    state.dst_offset = transition.dst_offset;
                }
                break;
            };

            match rule_set_name {
                None => rule_set_name = Some(&*rule.name),
                Some(name) if name != &*rule.name => break,
                Some(_) => (),
            }

            if need_std {
                state.std_offset = transition.std_offset();
                need_std = false;
            }

            if state.std_rule.is_none() && !transition.is_dst() && rule.is_open_ended() {
                state.std_rule = Some(rule.clone());
            }

            if need_dst && transition.is_dst() && rule.is_open_ended() {
                state.dst_offset = transition.dst_offset;
                state.dst_rule = Some(rule.clone());
                need_dst = false;
            }
        }

        state
    }

    /// Tail rules, with the fall back rule moved earlier when it would roll the calendar back
    fn tail(&self, fix_calendar_rollbacks: bool) -> Option<(TailRule, TailRule)> {
        let (mut std_rule, mut dst_rule) = (TailRule::from_rule(self.std_rule.as_ref()?), TailRule::from_rule(self.dst_rule.as_ref()?));

        if fix_calendar_rollbacks {
            let amount = dst_rule.save_minutes;
            let (fall_back, ahead, amount) = if amount < 0 { (&mut dst_rule, std_rule, -amount) } else { (&mut std_rule, dst_rule, amount) };

            let mut turnback = fall_back.at_minutes;
            match fall_back.at_clock {
                ClockType::Utc => turnback += self.std_offset / SECONDS_PER_MINUTE as i32 + ahead.save_minutes,
                ClockType::Standard => turnback += ahead.save_minutes,
                ClockType::Wall => (),
            }

            if turnback > 0 && turnback - amount < 0 {
                fall_back.at_minutes -= turnback;
            }
        }

        Some((std_rule, dst_rule))
    }
}

impl CompactTable {
    /// Construct the table of a transition list
    pub fn from_transition_list(list: &TransitionList, config: &Config) -> Result<Self, TableError> {
        let first = list.transitions().first().ok_or(TableError::EmptyList)?;
        let state = FinalState::of(list);
        let nominal = NominalOffsets { std_offset: state.std_offset, dst_offset: state.dst_offset };

        let mut table = Self { base_offset: first.utc_offset, nominal, offsets: Vec::new(), indices: Vec::new(), deltas: Vec::new(), tail: None };

        if list.len() == 1 {
            return Ok(table);
        }

        let mut last_time = 0;

        for (position, transition) in list.transitions().iter().enumerate() {
            let entry = OffsetEntry::of(transition);

            let index = match table.offsets.iter().position(|x| *x == entry) {
                Some(index) => index,
                None => {
                    table.offsets.push(entry);
                    table.offsets.len() - 1
                }
            };

            if position > 0 {
                table.indices.push(index);
                table.deltas.push(transition.time - last_time);
                last_time = transition.time;
            }
        }

        if table.offsets.len() > MAX_OFFSET_COUNT {
            return Err(TableError::TooManyOffsets(table.offsets.len()));
        }

        if config.tail_rules() {
            table.tail = state.tail(config.fix_calendar_rollbacks());
        }

        Ok(table)
    }

    /// Rebuild the transition list of the table
    pub fn to_transition_list(&self, zone_id: &str) -> Result<TransitionList, TableError> {
        let mut transitions = Vec::with_capacity(self.indices.len() + 1);

        let (dst_offset, name) = self.offsets.first().map(|x| (x.dst_offset, x.name.clone())).unwrap_or_default();
        transitions.push(Transition::new(BEGINNING_OF_TIME, self.base_offset, dst_offset, name));

        if self.indices.len() != self.deltas.len() {
            return Err(TableError::MismatchedSections { indices: self.indices.len(), deltas: self.deltas.len() });
        }

        let mut time = 0i64;
        for (&index, &delta) in self.indices.iter().zip(&self.deltas) {
            let entry = self.offsets.get(index).ok_or(TableError::OffsetIndexOutOfRange(index))?;
            time = time.checked_add(delta).ok_or(TableError::NumberOverflow)?;
            transitions.push(Transition::new(time, entry.utc_offset, entry.dst_offset, entry.name.clone()));
        }

        Ok(TransitionList::new(zone_id, transitions).with_nominal(Some(self.nominal)))
    }

    /// Parse a compact table
    pub fn parse(s: &str) -> Result<Self, TableError> {
        let sections: Vec<_> = s.split(';').collect();

        let (header, offsets, indices, deltas, tail) = match sections[..] {
            [header] => (header, None, "", "", None),
            [header, offsets, indices, deltas] => (header, Some(offsets), indices, deltas, None),
            [header, offsets, indices, deltas, tail] => (header, Some(offsets), indices, deltas, Some(tail)),
            _ => return Err(TableError::InvalidSectionCount(sections.len())),
        };

        let header: Vec<_> = header.split(' ').collect();
        let [base_offset, std_offset, dst_minutes] = header[..] else {
            return Err(TableError::InvalidHeader);
        };

        let dst_minutes = dst_minutes.parse::<i32>().map_err(|_| TableError::InvalidHeader)?;
        let nominal = NominalOffsets { std_offset: parse_offset_notation(std_offset)?, dst_offset: dst_minutes * SECONDS_PER_MINUTE as i32 };

        let offsets = match offsets {
            Some(offsets) => offsets.split(' ').map(OffsetEntry::from_str).collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let indices = indices.chars().map(|c| from_base60(c.encode_utf8(&mut [0; 4]), false).map(|x| x as usize)).collect::<Result<Vec<_>, _>>()?;

        let deltas = match deltas {
            "" => Vec::new(),
            deltas => deltas.split(' ').map(|x| from_base60(x, true)).collect::<Result<Vec<_>, _>>()?,
        };

        let tail = match tail {
            Some(tail) => {
                let (std_rule, dst_rule) = tail.split_once(',').ok_or_else(|| TableError::InvalidTailRule(tail.to_owned()))?;
                Some((std_rule.parse()?, dst_rule.parse()?))
            }
            None => None,
        };

        Ok(Self { base_offset: parse_offset_notation(base_offset)?, nominal, offsets, indices, deltas, tail })
    }
}

/// Write space separated items
fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter, items: impl Iterator<Item = T>) -> fmt::Result {
    for (index, item) in items.enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for CompactTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", format_offset(self.base_offset), format_offset(self.nominal.std_offset), self.nominal.dst_offset / SECONDS_PER_MINUTE as i32)?;

        if self.indices.is_empty() {
            return Ok(());
        }

        f.write_str(";")?;
        write_joined(f, self.offsets.iter())?;

        f.write_str(";")?;
        for &index in &self.indices {
            f.write_str(&to_base60(index as i64, false))?;
        }

        f.write_str(";")?;
        write_joined(f, self.deltas.iter().map(|&x| to_base60(x, true)))?;

        if let Some((std_rule, dst_rule)) = &self.tail {
            write!(f, ";{std_rule},{dst_rule}")?;
        }

        Ok(())
    }
}

impl FromStr for CompactTable {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode a transition list as a compact table
pub fn encode(list: &TransitionList, config: &Config) -> Result<String, TableError> {
    Ok(CompactTable::from_transition_list(list, config)?.to_string())
}

/// Decode a compact table into a transition list
pub fn decode(zone_id: &str, table: &str) -> Result<TransitionList, TableError> {
    CompactTable::parse(table)?.to_transition_list(zone_id)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::test::test_data;
    use crate::compiler::Compiler;
    use crate::error::Result;
    use crate::parse::parse_sources;

    use quickcheck::{quickcheck, Arbitrary, Gen};

    const TEST_TABLE: &str = "-0500 -0500 60;-50/0/EST -40/10/EDT;1010;1XK70 1zb0 Op0 1zb0;2000 11 1 1 2:0 0 0,2000 3 8 1 2:0 0 60";

    fn compile(zone_id: &str, config: Config) -> Result<TransitionList> {
        let tz_data = test_data(&config)?;
        Compiler::new(&tz_data, config).compile(zone_id)
    }

    #[test]
    fn test_encode() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let list = compile("Test/Zone", config)?;

        assert_eq!(encode(&list, &config)?, TEST_TABLE);
        assert_eq!(encode(&list, &config.with_tail_rules(false))?, "-0500 -0500 60;-50/0/EST -40/10/EDT;1010;1XK70 1zb0 Op0 1zb0");

        Ok(())
    }

    #[test]
    fn test_encode_fixed() -> Result<()> {
        let config = Config::default();
        let list = compile("Test/Fixed", config)?;

        assert_eq!(encode(&list, &config)?, "+0200 +0200 0");

        let decoded = decode("Test/Fixed", "+0200 +0200 0")?;
        assert_eq!(decoded.transitions(), [Transition::new(BEGINNING_OF_TIME, 7200, 0, None)]);

        Ok(())
    }

    #[test]
    fn test_decode() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let list = compile("Test/Zone", config)?;
        let decoded = decode("Test/Zone", TEST_TABLE)?;

        assert_eq!(decoded.matches_exactly(&list), Ok(()));
        assert_eq!(decoded.nominal(), Some(NominalOffsets { std_offset: -18000, dst_offset: 3600 }));

        let table = CompactTable::parse(TEST_TABLE)?;
        assert_eq!(table.indices, [1, 0, 1, 0]);
        assert_eq!(table.to_string(), TEST_TABLE);

        let (std_rule, dst_rule) = table.tail.ok_or(TableError::InvalidHeader)?;
        assert_eq!(std_rule.day, DaySpec::OnOrAfter { week_day: 1, month_day: 1 });
        assert_eq!((dst_rule.month, dst_rule.at_minutes, dst_rule.at_clock, dst_rule.save_minutes), (3, 120, ClockType::Wall, 60));

        Ok(())
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("Test", "+0200 +0200"), Err(TableError::InvalidHeader));
        assert_eq!(decode("Test", "+0200 +0200 0;20/0"), Err(TableError::InvalidSectionCount(2)));
        assert_eq!(decode("Test", "+2 +0200 0"), Err(TableError::InvalidOffsetNotation("+2".to_owned())));
        assert_eq!(decode("Test", "0 0 0;0/0 10/0;1;1Y0"), Err(TableError::InvalidBase60Digit('Y')));
        assert_eq!(decode("Test", "0 0 0;0/0 10/0;2;10"), Err(TableError::OffsetIndexOutOfRange(2)));
        assert_eq!(decode("Test", "0 0 0;0/0 10/0;11;10"), Err(TableError::MismatchedSections { indices: 2, deltas: 1 }));
        assert_eq!(decode("Test", "0 0 0;0 10/0;1;10"), Err(TableError::InvalidOffsetEntry("0".to_owned())));
        assert_eq!(decode("Test", "0 0 0;0/0 10/0;1;10;2000 3 8 1 2:0 0 60"), Err(TableError::InvalidTailRule("2000 3 8 1 2:0 0 60".to_owned())));
    }

    #[test]
    fn test_tail_rule() -> std::result::Result<(), TableError> {
        let rule: TailRule = "2007 3 -25 7 -1:30 2 60".parse()?;

        assert_eq!(rule.day, DaySpec::OnOrBefore { week_day: 7, month_day: 25 });
        assert_eq!((rule.at_minutes, rule.at_clock), (-30, ClockType::Utc));
        assert_eq!(rule.to_string(), "2007 3 -25 7 -1:30 2 60");

        assert!("2007 13 1 1 2:0 0 60".parse::<TailRule>().is_err());
        assert!("2007 3 1 1 2 0 60".parse::<TailRule>().is_err());
        assert!("2007 3 1 1 2:0 3 60".parse::<TailRule>().is_err());

        Ok(())
    }

    #[test]
    fn test_tail_rule_rollback_fix() -> Result<()> {
        let source = "
Rule    Late    2000    max     -       Mar     Sun>=8  2:00    1:00    D
Rule    Late    2000    max     -       Nov     Sun>=1  0:30    0       S
Zone    Test/Late       -5:00   Late    E%sT
";
        let config = Config::new().with_years(2019, 2020);
        let tz_data = parse_sources([("test", source)], &config)?;
        let list = Compiler::new(&tz_data, config).compile("Test/Late")?;

        let tail = |config: Config| encode(&list, &config).map(|x| x.rsplit(';').next().map(str::to_owned));

        assert_eq!(tail(config)?.as_deref(), Some("2000 11 1 1 0:30 0 0,2000 3 8 1 2:0 0 60"));
        assert_eq!(tail(config.with_fix_calendar_rollbacks(true))?.as_deref(), Some("2000 11 1 1 0:0 0 0,2000 3 8 1 2:0 0 60"));

        Ok(())
    }

    #[test]
    fn test_too_many_offsets() {
        let transitions = (0..62).map(|x| Transition::new(if x == 0 { BEGINNING_OF_TIME } else { x * 3600 }, x as i32 * 60, 0, None)).collect();
        let list = TransitionList::new("Test/Many", transitions);

        assert_eq!(encode(&list, &Config::default()), Err(TableError::TooManyOffsets(62)));
    }

    #[derive(Debug, Clone)]
    struct Transitions(Vec<Transition>);

    impl Arbitrary for Transitions {
        fn arbitrary(g: &mut Gen) -> Self {
            let names = [None, Some("STD"), Some("DST"), Some("LMT")];
            let mut time = i64::from(i32::arbitrary(g));
            let mut transitions = Vec::new();

            for index in 0..2 + usize::arbitrary(g) % 16 {
                let utc_offset = i32::from(i16::arbitrary(g)) % 50400;
                let dst_offset = i32::from(u8::arbitrary(g) % 3) * 1800;
                let name = g.choose(&names).copied().flatten().map(Arc::from);

                let transition_time = if index == 0 { BEGINNING_OF_TIME } else { time };
                transitions.push(Transition::new(transition_time, utc_offset, dst_offset, name));

                time += 1 + i64::from(u32::arbitrary(g));
            }

            Self(transitions)
        }
    }

    quickcheck! {
        fn prop_round_trip(transitions: Transitions) -> bool {
            let list = TransitionList::new("Test/Zone", transitions.0);
            match encode(&list, &Config::default()) {
                Ok(table) => decode("Test/Zone", &table).is_ok_and(|x| x.matches_exactly(&list).is_ok()),
                Err(_) => false,
            }
        }
    }
}
