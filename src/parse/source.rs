//! Parsing of time zone database source files.

use crate::config::Config;
use crate::error::*;
use crate::parse::line::{tokenize, SourceLine};
use crate::zone::{RuleSet, TzData, Zone};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Names of the source files of the time zone database defining zones, rules and links
pub const SOURCE_FILE_NAMES: [&str; 9] = ["africa", "antarctica", "asia", "australasia", "europe", "northamerica", "southamerica", "etcetera", "backward"];

/// Incremental parser of source files.
///
/// Every source must be fed before calling [`SourceParser::finish`], which resolves links across all sources.
#[derive(Debug, Default)]
pub struct SourceParser {
    /// Round zone offsets and `UNTIL` times to whole minutes
    round_to_minutes: bool,
    /// Zones by id
    zones: BTreeMap<String, Zone>,
    /// Rule sets by name
    rule_sets: BTreeMap<String, RuleSet>,
    /// Link targets by alias
    links: BTreeMap<String, String>,
}

impl SourceParser {
    /// Construct a source parser
    pub fn new(config: &Config) -> Self {
        Self { round_to_minutes: config.round_to_minutes(), ..Self::default() }
    }

    /// Parse one source file
    pub fn parse_source(&mut self, source_name: &str, text: &str) -> std::result::Result<(), ParseError> {
        let mut open_zone: Option<Zone> = None;
        let mut _line_count = 0;

        let error = |line_number: usize, kind: ParseErrorKind| ParseError { source_name: source_name.to_owned(), line_number, kind };

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;

            let tokens = tokenize(line);
            if tokens.is_empty() {
                continue;
            }
            _line_count += 1;

            let record = match SourceLine::parse(&tokens, self.round_to_minutes).map_err(|kind| error(line_number, kind))? {
                SourceLine::Rule(rule) => {
                    self.rule_sets.entry(rule.name.to_string()).or_default().rules.push(Arc::new(rule));
                    continue;
                }
                SourceLine::Link { target, alias } => {
                    self.links.insert(alias.to_owned(), target.to_owned());
                    continue;
                }
                SourceLine::Zone { zone_id, record } => {
                    if let Some(zone) = &open_zone {
                        return Err(error(line_number, ParseErrorKind::ZoneNotTerminated(zone.id.to_string())));
                    }
                    if self.zones.contains_key(zone_id) {
                        return Err(error(line_number, ParseErrorKind::DuplicateZone(zone_id.to_owned())));
                    }

                    open_zone.insert(Zone { id: zone_id.into(), lines: Vec::new() }).lines.push(record.clone());
                    record
                }
                SourceLine::Continuation(record) => match &mut open_zone {
                    Some(zone) => {
                        zone.lines.push(record.clone());
                        record
                    }
                    None => return Err(error(line_number, ParseErrorKind::ContinuationOutsideZone)),
                },
            };

            if record.is_open_ended() {
                if let Some(zone) = open_zone.take() {
                    self.zones.insert(zone.id.to_string(), zone);
                }
            }
        }

        if let Some(zone) = open_zone {
            return Err(error(text.lines().count(), ParseErrorKind::UnterminatedZoneAtEnd(zone.id.to_string())));
        }

        debug!("parsed {_line_count} lines of source {source_name}");
        Ok(())
    }

    /// Resolve links and return the parsed data.
    ///
    /// Links named like a zone are dropped. Links to links are followed until a zone is found.
    pub fn finish(self) -> Result<TzData> {
        let Self { zones, rule_sets, mut links, .. } = self;

        links.retain(|alias, _target| {
            let shadowed = zones.contains_key(alias);
            if shadowed {
                debug!("dropping link {alias} to {_target}, which is also a zone");
            }
            !shadowed
        });

        let mut aliases = BTreeMap::new();

        for (alias, target) in &links {
            let mut visited = BTreeSet::from([alias.as_str()]);
            let mut current = target.as_str();

            while !zones.contains_key(current) {
                match links.get(current) {
                    Some(next) => {
                        if !visited.insert(current) {
                            return Err(Error::AliasCycle(alias.clone()));
                        }
                        current = next;
                    }
                    None => return Err(Error::UnresolvedAlias { alias: alias.clone(), target: target.clone() }),
                }
            }

            aliases.insert(alias.clone(), current.to_owned());
        }

        debug!("parsed {} zones, {} rule sets and {} aliases", zones.len(), rule_sets.len(), aliases.len());
        Ok(TzData::new(zones, rule_sets, aliases))
    }
}

/// Parse a set of source files given as `(name, text)` pairs, and resolve links across all of them
pub fn parse_sources<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(sources: I, config: &Config) -> Result<TzData> {
    let mut parser = SourceParser::new(config);
    for (source_name, text) in sources {
        parser.parse_source(source_name, text)?;
    }
    parser.finish()
}

/// Read and parse the database source files listed in [`SOURCE_FILE_NAMES`] from a directory
pub fn read_source_dir(dir: impl AsRef<Path>, config: &Config) -> Result<TzData> {
    let dir = dir.as_ref();

    let texts = SOURCE_FILE_NAMES.iter().map(|&name| Ok((name, fs::read_to_string(dir.join(name))?))).collect::<Result<Vec<_>>>()?;
    debug!("read {} source files from {}", texts.len(), dir.display());

    parse_sources(texts.iter().map(|(name, text)| (*name, text.as_str())), config)
}
