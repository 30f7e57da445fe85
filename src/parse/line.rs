//! Classification of source lines.

use crate::error::ParseErrorKind;
use crate::parse::fields::*;
use crate::zone::{RuleRecord, RulesRef, ZoneLineRecord};

use std::sync::Arc;

/// Parsed source line
#[derive(Debug, Clone, Eq, PartialEq)]
pub(super) enum SourceLine<'a> {
    /// `Rule NAME FROM TO - IN ON AT SAVE LETTER/S`
    Rule(RuleRecord),
    /// `Link TARGET LINK-NAME`
    Link {
        /// Zone id the alias refers to
        target: &'a str,
        /// Alias zone id
        alias: &'a str,
    },
    /// `Zone NAME STDOFF RULES FORMAT [UNTIL]`
    Zone {
        /// Zone id
        zone_id: &'a str,
        /// First zone line
        record: ZoneLineRecord,
    },
    /// `STDOFF RULES FORMAT [UNTIL]`, continuing the open zone
    Continuation(ZoneLineRecord),
}

/// Line keyword
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Keyword {
    /// Rule line
    Rule,
    /// Link line
    Link,
    /// Zone line
    Zone,
}

impl Keyword {
    /// Match a keyword or one of its abbreviations, as used in compacted sources
    fn parse(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        [("rule", Self::Rule), ("link", Self::Link), ("zone", Self::Zone)].into_iter().find(|(name, _)| name.starts_with(&token)).map(|(_, keyword)| keyword)
    }
}

/// Split a line into whitespace separated fields, ignoring comments
pub(super) fn tokenize(line: &str) -> Vec<&str> {
    let content = match line.find('#') {
        Some(position) => &line[..position],
        None => line,
    };
    content.split_whitespace().collect()
}

/// Check that a line has enough fields for its record type
fn check_fields(record: &'static str, tokens: &[&str], expected: usize) -> Result<(), ParseErrorKind> {
    if tokens.len() < expected {
        return Err(ParseErrorKind::MissingFields { record, expected, found: tokens.len() });
    }
    Ok(())
}

/// Parse the fields of a rule line, after the keyword
fn parse_rule(fields: &[&str]) -> Result<RuleRecord, ParseErrorKind> {
    let start_year = parse_year(fields[1])?;
    let end_year = parse_end_year(fields[2], start_year)?;

    if end_year < start_year {
        return Err(ParseErrorKind::InvalidYearRange { start: start_year, end: end_year });
    }

    let (at_time, at_clock) = parse_time_of_day(fields[6], false)?;

    let letters = match fields.get(8) {
        None | Some(&"-") => "",
        Some(&letters) => letters,
    };

    Ok(RuleRecord {
        name: fields[0].into(),
        start_year,
        end_year,
        month: parse_month(fields[4])?,
        day: parse_day_spec(fields[5])?,
        at_time,
        at_clock,
        save: parse_save(fields[7])?,
        letters: letters.into(),
    })
}

/// Parse the fields of a zone line, after the keyword and zone id for a first line
fn parse_zone_record(fields: &[&str], round_to_minutes: bool) -> Result<ZoneLineRecord, ParseErrorKind> {
    let gmt_offset = parse_offset(fields[0], round_to_minutes)?;

    let rules = match fields[1] {
        "-" => RulesRef::None,
        field if starts_with_number(field) => RulesRef::Fixed(parse_save(field)?),
        field => RulesRef::Named(Arc::from(field)),
    };

    let (until, until_clock) = parse_until(&fields[3..], gmt_offset, round_to_minutes)?;

    Ok(ZoneLineRecord { gmt_offset, rules, format: fields[2].into(), until, until_clock })
}

/// Check if a field is a number, possibly signed
fn starts_with_number(field: &str) -> bool {
    let digits = field.strip_prefix(['-', '+']).unwrap_or(field);
    digits.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

impl<'a> SourceLine<'a> {
    /// Parse the fields of a non-empty line
    pub(super) fn parse(tokens: &[&'a str], round_to_minutes: bool) -> Result<Self, ParseErrorKind> {
        let Some(&first) = tokens.first() else {
            return Err(ParseErrorKind::MissingFields { record: "Zone", expected: 3, found: 0 });
        };

        if !first.starts_with(|c: char| c.is_ascii_alphabetic()) {
            check_fields("Zone continuation", tokens, 3)?;
            return Ok(Self::Continuation(parse_zone_record(tokens, round_to_minutes)?));
        }

        match Keyword::parse(first) {
            Some(Keyword::Rule) => {
                check_fields("Rule", tokens, 9)?;
                Ok(Self::Rule(parse_rule(&tokens[1..])?))
            }
            Some(Keyword::Link) => {
                check_fields("Link", tokens, 3)?;
                Ok(Self::Link { target: tokens[1], alias: tokens[2] })
            }
            Some(Keyword::Zone) => {
                check_fields("Zone", tokens, 5)?;
                Ok(Self::Zone { zone_id: tokens[1], record: parse_zone_record(&tokens[2..], round_to_minutes)? })
            }
            None => Err(ParseErrorKind::UnknownLineType(first.to_owned())),
        }
    }
}
