//! Types related to compiled transition lists.

mod matching;
mod rollback;

pub use matching::{MatchOptions, Mismatch};
pub use rollback::{Rollback, RollbackStatus};

use crate::calendar::*;
use crate::constants::*;
use crate::notation::format_offset;
use crate::zone::{RuleRecord, ZoneLineRecord};

use std::fmt;
use std::sync::Arc;

/// Change of UTC offset, daylight saving state or name at an instant
#[derive(Debug, Clone)]
pub struct Transition {
    /// Unix time of the transition, or [`BEGINNING_OF_TIME`] for the first transition of a list
    pub time: i64,
    /// Offset from UTC in seconds
    pub utc_offset: i32,
    /// Daylight saving offset in seconds, zero for standard time
    pub dst_offset: i32,
    /// Time zone designation, `None` for a numeric offset
    pub name: Option<Arc<str>>,
    /// Rule which produced the transition
    pub rule: Option<Arc<RuleRecord>>,
}

impl Transition {
    /// Construct a transition
    pub fn new(time: i64, utc_offset: i32, dst_offset: i32, name: Option<Arc<str>>) -> Self {
        Self { time, utc_offset, dst_offset, name, rule: None }
    }

    /// Set the rule which produced the transition
    pub fn with_rule(mut self, rule: Option<Arc<RuleRecord>>) -> Self {
        self.rule = rule;
        self
    }

    /// Check if daylight saving time is in effect after the transition
    pub fn is_dst(&self) -> bool {
        self.dst_offset != 0
    }

    /// Standard offset from UTC in seconds
    pub fn std_offset(&self) -> i32 {
        self.utc_offset - self.dst_offset
    }

    /// Check if the transition is the first one of a list
    pub fn is_sentinel(&self) -> bool {
        self.time == BEGINNING_OF_TIME
    }

    /// Local date time at the transition, after the change
    pub fn local_date_time(&self) -> LocalDateTime {
        LocalDateTime::from_unix_time(self.time, self.utc_offset)
    }

    /// Check if two transitions change to the same offsets and name
    fn same_local_time_type(&self, other: &Self) -> bool {
        self.utc_offset == other.utc_offset && self.dst_offset == other.dst_offset && self.name == other.name
    }
}

/// Equality ignores the rule which produced the transition
impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.same_local_time_type(other)
    }
}

impl Eq for Transition {}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("---")?;
        } else {
            write!(f, "{}", self.local_date_time())?;
        }

        write!(f, ", {}, {}, {}", format_offset(self.utc_offset), format_offset(self.dst_offset), self.name.as_deref().unwrap_or("-"))
    }
}

/// Steady-state standard and daylight saving offsets of a zone, beyond its last transition
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NominalOffsets {
    /// Standard offset from UTC in seconds
    pub std_offset: i32,
    /// Daylight saving offset in seconds, zero if daylight saving time is not observed
    pub dst_offset: i32,
}

/// Chronological list of transitions of a zone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionList {
    /// Zone id
    zone_id: Arc<str>,
    /// Transitions in strictly increasing time order, starting at [`BEGINNING_OF_TIME`]
    transitions: Vec<Transition>,
    /// Final zone line of the compiled zone
    last_zone_line: Option<ZoneLineRecord>,
    /// Nominal offsets known from a reference source
    nominal: Option<NominalOffsets>,
    /// Canonical zone id, for an alias
    alias_of: Option<Arc<str>>,
}

impl TransitionList {
    /// Construct a transition list
    pub fn new(zone_id: impl Into<Arc<str>>, transitions: Vec<Transition>) -> Self {
        Self { zone_id: zone_id.into(), transitions, last_zone_line: None, nominal: None, alias_of: None }
    }

    /// Set the final zone line of the compiled zone
    pub fn with_last_zone_line(mut self, last_zone_line: Option<ZoneLineRecord>) -> Self {
        self.last_zone_line = last_zone_line;
        self
    }

    /// Set the nominal offsets known from a reference source
    pub fn with_nominal(mut self, nominal: Option<NominalOffsets>) -> Self {
        self.nominal = nominal;
        self
    }

    /// Set the canonical zone id, for an alias
    pub fn with_alias_of(mut self, alias_of: Option<Arc<str>>) -> Self {
        self.alias_of = alias_of;
        self
    }

    /// Returns zone id
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Returns transitions
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns a mutable reference to the transitions
    pub fn transitions_mut(&mut self) -> &mut Vec<Transition> {
        &mut self.transitions
    }

    /// Returns the final zone line of the compiled zone
    pub fn last_zone_line(&self) -> Option<&ZoneLineRecord> {
        self.last_zone_line.as_ref()
    }

    /// Returns the nominal offsets known from a reference source
    pub fn nominal(&self) -> Option<NominalOffsets> {
        self.nominal
    }

    /// Returns the canonical zone id, for an alias
    pub fn alias_of(&self) -> Option<&str> {
        self.alias_of.as_deref()
    }

    /// Returns the number of transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the list has no transitions
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Remove transitions at the same time as the previous one, or changing nothing from the previous one
    pub fn dedupe(&mut self) {
        self.transitions.dedup_by(|curr, prev| curr.time == prev.time || curr.same_local_time_type(prev));
    }

    /// Restrict the list to a year range.
    ///
    /// The latest standard time transition before `min_year` becomes the first transition, at [`BEGINNING_OF_TIME`].
    /// Trailing transitions to daylight saving time or after `max_year` are removed.
    pub fn trim(&mut self, min_year: i32, max_year: i32) {
        if min_year != i32::MIN {
            let mut new_start = None;

            for (index, transition) in self.transitions.iter().enumerate() {
                if transition.is_sentinel() {
                    continue;
                }
                if year_at(transition.time + 1, transition.utc_offset) >= min_year {
                    break;
                }
                if !transition.is_dst() {
                    new_start = Some(index);
                }
            }

            if let Some(index) = new_start {
                self.transitions.drain(..index);
                if let Some(first) = self.transitions.first_mut() {
                    first.time = BEGINNING_OF_TIME;
                }
            }
        }

        while let Some(last) = self.transitions.last() {
            if last.is_sentinel() || (!last.is_dst() && year_at(last.time, last.utc_offset) <= max_year) {
                break;
            }
            self.transitions.pop();
        }
    }

    /// Returns the transitions changing UTC offset or daylight saving offset, dropping name-only changes
    pub fn without_name_only_changes(&self) -> Vec<Transition> {
        let mut transitions = self.transitions.clone();
        transitions.dedup_by(|curr, prev| curr.utc_offset == prev.utc_offset && curr.dst_offset == prev.dst_offset);
        transitions
    }

    /// Returns a display adapter writing one line per transition, with local times before and after it
    pub fn long_form(&self) -> LongForm<'_> {
        LongForm(self)
    }
}

/// Long form listing of a transition list
#[derive(Debug)]
pub struct LongForm<'a>(&'a TransitionList);

impl fmt::Display for LongForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let list = self.0;
        let name = |transition: &Transition| transition.name.as_deref().map(|x| format!(" {x}")).unwrap_or_default();

        writeln!(f, "-------- {} --------", list.zone_id())?;

        match list.transitions() {
            [] => writeln!(f, "(empty)"),
            [transition] => writeln!(f, "Fixed UTC offset at {}{}", format_offset(transition.utc_offset), name(transition)),
            [first, ..] => {
                writeln!(
                    f,
                    "____-__-__ __:__:__ ±____ ±____ --> ____-__-__ __:__:__ {} {}{}",
                    format_offset(first.utc_offset),
                    format_offset(first.dst_offset),
                    name(first)
                )?;

                for pair in list.transitions().windows(2) {
                    let (prev, curr) = (&pair[0], &pair[1]);
                    let before = LocalDateTime::from_unix_time(curr.time - 1, prev.utc_offset);

                    writeln!(
                        f,
                        "{before} {} {} --> {} {} {}{}{}",
                        format_offset(prev.utc_offset),
                        format_offset(prev.dst_offset),
                        curr.local_date_time(),
                        format_offset(curr.utc_offset),
                        format_offset(curr.dst_offset),
                        name(curr),
                        if curr.is_dst() { "*" } else { "" }
                    )?;
                }

                Ok(())
            }
        }
    }
}
