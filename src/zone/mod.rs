//! Types related to parsed zone data.

mod rule;

pub use rule::*;

use crate::constants::*;
use crate::error::*;

use std::collections::BTreeMap;
use std::sync::Arc;

/// Rule reference of a zone line
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RulesRef {
    /// Standard time only
    None,
    /// Fixed daylight saving offset in seconds
    Fixed(i32),
    /// Name of a rule set
    Named(Arc<str>),
}

/// One validity span of a zone, as defined by a `Zone` line or a continuation line
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ZoneLineRecord {
    /// Standard offset from UTC in seconds
    pub gmt_offset: i32,
    /// Daylight saving rules applying during the span
    pub rules: RulesRef,
    /// Display name template
    pub format: Arc<str>,
    /// End of the span in seconds since Unix epoch, or [`END_OF_TIME`]
    pub until: i64,
    /// Clock basis in which the end of the span was written
    pub until_clock: ClockType,
}

impl ZoneLineRecord {
    /// Check if the span never ends
    pub fn is_open_ended(&self) -> bool {
        self.until >= END_OF_TIME
    }
}

/// Named sequence of contiguous zone lines
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Zone {
    /// Zone id, as in `America/New_York`
    pub id: Arc<str>,
    /// Zone lines in chronological order, the last one being open-ended
    pub lines: Vec<ZoneLineRecord>,
}

impl Zone {
    /// Returns the final, open-ended zone line
    pub fn last_line(&self) -> Option<&ZoneLineRecord> {
        self.lines.last()
    }
}

/// Immutable result of parsing a set of source files
#[derive(Debug, Clone, Default)]
pub struct TzData {
    /// Zones by id
    zones: BTreeMap<String, Zone>,
    /// Rule sets by name
    rule_sets: BTreeMap<String, RuleSet>,
    /// Canonical zone id of each alias
    aliases: BTreeMap<String, String>,
}

impl TzData {
    /// Construct parsed zone data, with every alias already resolved to a zone
    pub(crate) fn new(zones: BTreeMap<String, Zone>, rule_sets: BTreeMap<String, RuleSet>, aliases: BTreeMap<String, String>) -> Self {
        Self { zones, rule_sets, aliases }
    }

    /// Returns the zone of an id, following aliases
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.get(self.canonical_id(zone_id)?)
    }

    /// Returns the zone of an id, following aliases, or an [`Error::UnknownZone`] error
    pub fn find_zone(&self, zone_id: &str) -> Result<&Zone> {
        self.zone(zone_id).ok_or_else(|| Error::UnknownZone(zone_id.to_owned()))
    }

    /// Returns the id of the zone an id refers to, which is the id itself for a zone
    pub fn canonical_id<'a>(&'a self, zone_id: &'a str) -> Option<&'a str> {
        if self.zones.contains_key(zone_id) {
            Some(zone_id)
        } else {
            self.aliases.get(zone_id).map(String::as_str)
        }
    }

    /// Returns the alias target of an id, if it is an alias
    pub fn alias_target(&self, zone_id: &str) -> Option<&str> {
        self.aliases.get(zone_id).map(String::as_str)
    }

    /// Returns a rule set by name
    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.rule_sets.get(name)
    }

    /// Returns all zones
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Returns all aliases with their canonical zone ids
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(alias, target)| (alias.as_str(), target.as_str()))
    }

    /// Returns the ids of all zones and aliases, sorted
    pub fn zone_ids(&self) -> Vec<&str> {
        let mut zone_ids: Vec<_> = self.zones.keys().chain(self.aliases.keys()).map(String::as_str).collect();
        zone_ids.sort_unstable();
        zone_ids
    }
}
