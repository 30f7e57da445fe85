//! Batch pipeline compiling every zone into a compact table.
//!
//! Zones are compiled on worker threads sharing the parsed data.
//! Each zone is checked against an optional reference source, checked for calendar rollbacks, encoded,
//! and its table decoded back and compared with the compiled transitions.
//! Problems are collected as diagnostics and never stop the batch.

use crate::compiler::Compiler;
use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Result};
use crate::oracle::ReferenceSource;
use crate::table::{decode, encode};
use crate::transition::{MatchOptions, Mismatch, TransitionList};
use crate::zone::TzData;

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic;
use std::thread;

/// Result of a batch compilation
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BatchOutput {
    /// Compact table of each zone, excluding duplicates
    pub tables: BTreeMap<String, String>,
    /// Zones whose table is identical to the table of an earlier zone, mapped to that zone
    pub duplicates: BTreeMap<String, String>,
    /// Problems found, for zones then aliases, in id order
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchOutput {
    /// Returns the compact table of a zone, following duplicates
    pub fn table(&self, zone_id: &str) -> Option<&str> {
        let zone_id = self.duplicates.get(zone_id).map_or(zone_id, String::as_str);
        self.tables.get(zone_id).map(String::as_str)
    }

    /// Check if a diagnostic reports a failure rather than a warning
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Outcome of compiling a single zone
struct ZoneOutput {
    /// Zone id
    zone_id: String,
    /// Compact table, if encoding succeeded
    table: Option<String>,
    /// Problems found
    diagnostics: Vec<Diagnostic>,
}

/// Compare a decoded table with the transitions it was encoded from.
///
/// A single transition table only keeps the UTC offset.
fn check_round_trip(list: &TransitionList, decoded: &TransitionList) -> std::result::Result<(), Mismatch> {
    match (list.transitions(), decoded.transitions()) {
        ([ours], [theirs]) if ours.utc_offset != theirs.utc_offset => Err(Mismatch::Transition { index: 0, ours: ours.clone(), theirs: theirs.clone() }),
        ([_], [_]) => Ok(()),
        _ => list.matches_exactly(decoded),
    }
}

/// Compile, check and encode a single zone
fn compile_zone(compiler: &Compiler<'_>, zone_id: &str, reference: Option<&(dyn ReferenceSource + Sync)>) -> ZoneOutput {
    let config = compiler.config();
    let mut diagnostics = Vec::new();

    let output = |table: Option<String>, diagnostics: Vec<Diagnostic>| ZoneOutput { zone_id: zone_id.to_owned(), table, diagnostics };

    let mut list = match compiler.compile_with_diagnostics(zone_id, &mut diagnostics) {
        Ok(list) => list,
        Err(error) => {
            error!("{zone_id}: {error}");
            diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::CompileFailed(error.to_string())));
            return output(None, diagnostics);
        }
    };

    if let Some(reference) = reference {
        match reference.reference(zone_id, config) {
            Some(reference_list) => {
                if let Err(mismatch) = list.closely_matches(&reference_list, MatchOptions::with_names(config.rounding_tolerance())) {
                    warn!("{zone_id}: reference mismatch, {mismatch}");
                    diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::ReferenceMismatch(mismatch)));
                }
            }
            None => diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::ReferenceUnavailable)),
        }
    }

    if config.check_rollbacks() || config.fix_calendar_rollbacks() {
        let (status, rollbacks) = list.check_calendar_rollbacks(config.fix_calendar_rollbacks());

        if let Some(&first) = rollbacks.first() {
            diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::Rollback { status, first, count: rollbacks.len() }));
        }
    }

    let table = match encode(&list, config) {
        Ok(table) => table,
        Err(error) => {
            error!("{zone_id}: {error}");
            diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::EncodeFailed(error)));
            return output(None, diagnostics);
        }
    };

    match decode(zone_id, &table) {
        Ok(decoded) => {
            if let Err(mismatch) = check_round_trip(&list, &decoded) {
                error!("{zone_id}: round trip mismatch, {mismatch}");
                diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::RoundTripMismatch(mismatch)));
            }
        }
        Err(error) => {
            error!("{zone_id}: cannot decode {table:?}, {error}");
            diagnostics.push(Diagnostic::new(zone_id, DiagnosticKind::EncodeFailed(error)));
        }
    }

    output(Some(table), diagnostics)
}

/// Compile every zone and alias, or a single one, into compact tables.
///
/// Zones with byte-identical tables are collapsed into the duplicates map, pointing to the first zone in id order.
/// Zones come before aliases, so that an alias never hides the zone it refers to.
/// Zones rejected by the configured [`ZoneFilter`](crate::filter::ZoneFilter) are not compiled.
/// Returns [`Error::UnknownZone`] if the requested zone is neither a zone nor an alias, or is rejected by the filter.
pub fn compile_batch(tz_data: &TzData, config: &Config, zone_id: Option<&str>, reference: Option<&(dyn ReferenceSource + Sync)>) -> Result<BatchOutput> {
    let keeps = |zone_id: &str| config.zone_filter().map_or(true, |filter| filter.keeps(zone_id));

    let zone_ids = match zone_id {
        Some(zone_id) => {
            tz_data.find_zone(zone_id)?;
            if !keeps(zone_id) {
                return Err(Error::UnknownZone(zone_id.to_owned()));
            }
            vec![zone_id]
        }
        None => {
            let mut zone_ids = tz_data.zone_ids();
            let _total = zone_ids.len();
            zone_ids.retain(|zone_id| keeps(zone_id));
            debug!("filtered out {} of {_total} zones", _total - zone_ids.len());
            zone_ids
        }
    };

    if zone_ids.is_empty() {
        return Ok(BatchOutput::default());
    }

    let compiler = Compiler::new(tz_data, *config);

    let worker_count = thread::available_parallelism().map_or(1, NonZeroUsize::get).min(zone_ids.len());
    let chunk_size = zone_ids.len().div_ceil(worker_count);

    let mut outputs: Vec<ZoneOutput> = thread::scope(|scope| {
        let handles: Vec<_> = zone_ids
            .chunks(chunk_size)
            .map(|chunk| {
                let compiler = &compiler;
                scope.spawn(move || chunk.iter().map(|zone_id| compile_zone(compiler, zone_id, reference)).collect::<Vec<_>>())
            })
            .collect();

        handles.into_iter().flat_map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload))).collect()
    });

    outputs.sort_by_key(|output| tz_data.alias_target(&output.zone_id).is_some());

    let mut batch_output = BatchOutput::default();
    let mut first_zone_of_table = BTreeMap::new();

    for ZoneOutput { zone_id, table, diagnostics } in outputs {
        batch_output.diagnostics.extend(diagnostics);

        let Some(table) = table else { continue };

        match first_zone_of_table.get(&table) {
            Some(first) => {
                batch_output.duplicates.insert(zone_id, String::clone(first));
            }
            None => {
                first_zone_of_table.insert(table.clone(), zone_id.clone());
                batch_output.tables.insert(zone_id, table);
            }
        }
    }

    info!(
        "compiled {} tables, {} duplicates, {} diagnostics",
        batch_output.tables.len(),
        batch_output.duplicates.len(),
        batch_output.diagnostics.len()
    );

    Ok(batch_output)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::test::TEST_SOURCE;
    use crate::constants::*;
    use crate::filter::ZoneFilter;
    use crate::parse::parse_sources;
    use crate::transition::{RollbackStatus, Transition};

    const LINKS: &str = "
Link    Test/Zone       Test/Alias
Link    Test/Alias      Test/Chained
";

    fn test_data(config: &Config) -> Result<TzData> {
        parse_sources([("test", TEST_SOURCE), ("backward", LINKS)], config)
    }

    /// Reference source answering with a fixed list for one zone
    struct FixedReference(TransitionList);

    impl ReferenceSource for FixedReference {
        fn reference(&self, zone_id: &str, _config: &Config) -> Option<TransitionList> {
            (zone_id == self.0.zone_id()).then(|| self.0.clone())
        }
    }

    #[test]
    fn test_compile_batch() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let tz_data = test_data(&config)?;
        let output = compile_batch(&tz_data, &config, None, None)?;

        assert_eq!(output.tables.len(), 2);
        assert_eq!(output.tables["Test/Fixed"], "+0200 +0200 0");
        assert_eq!(output.tables["Test/Zone"], "-0500 -0500 60;-50/0/EST -40/10/EDT;1010;1XK70 1zb0 Op0 1zb0;2000 11 1 1 2:0 0 0,2000 3 8 1 2:0 0 60");

        assert_eq!(output.duplicates.len(), 2);
        assert_eq!(output.duplicates["Test/Alias"], "Test/Zone");
        assert_eq!(output.duplicates["Test/Chained"], "Test/Zone");
        assert_eq!(output.table("Test/Chained"), output.table("Test/Zone"));

        assert!(!output.has_errors());

        Ok(())
    }

    #[test]
    fn test_single_zone() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let tz_data = test_data(&config)?;

        let output = compile_batch(&tz_data, &config, Some("Test/Alias"), None)?;
        assert_eq!(output.tables.keys().collect::<Vec<_>>(), ["Test/Alias"]);
        assert!(output.duplicates.is_empty());

        assert!(matches!(compile_batch(&tz_data, &config, Some("Nope/Zone"), None), Err(Error::UnknownZone(_))));

        Ok(())
    }

    #[test]
    fn test_zone_filter() -> Result<()> {
        let source = "
Zone    Etc/GMT-2       2:00    -       +02
Zone    EST             -5:00   -       EST
Zone    CST6CDT         -6:00   -       CST
Zone    America/Indianapolis    -5:00   -       EST
Zone    America/Indiana/Vevay   -5:00   -       EST
";
        let config = Config::new().with_years(2019, 2020);
        let tz_data = parse_sources([("test", TEST_SOURCE), ("backward", LINKS), ("legacy", source)], &config)?;

        let output = compile_batch(&tz_data, &config, None, None)?;
        assert_eq!(output.tables.len() + output.duplicates.len(), 9);

        let config = config.with_zone_filter(Some(ZoneFilter::STANDARD));
        let output = compile_batch(&tz_data, &config, None, None)?;

        for zone_id in ["Etc/GMT-2", "EST", "America/Indianapolis"] {
            assert_eq!(output.table(zone_id), None, "{zone_id}");
        }

        assert_eq!(output.table("CST6CDT"), Some("-0600 -0600 0"));
        assert_eq!(output.table("America/Indiana/Vevay"), Some("-0500 -0500 0"));
        assert_eq!(output.tables.len() + output.duplicates.len(), 6);

        assert!(matches!(compile_batch(&tz_data, &config, Some("Etc/GMT-2"), None), Err(Error::UnknownZone(_))));
        assert!(compile_batch(&tz_data, &config, Some("CST6CDT"), None)?.tables.contains_key("CST6CDT"));

        Ok(())
    }

    #[test]
    fn test_reference_checks() -> Result<()> {
        let config = Config::new().with_years(2019, 2020);
        let tz_data = test_data(&config)?;

        let mut reference = Compiler::new(&tz_data, config).compile("Test/Zone")?;
        let source = FixedReference(reference.clone());

        let output = compile_batch(&tz_data, &config, Some("Test/Zone"), Some(&source))?;
        assert!(output.diagnostics.is_empty());

        let output = compile_batch(&tz_data, &config, Some("Test/Fixed"), Some(&source))?;
        assert_eq!(output.diagnostics, [Diagnostic::new("Test/Fixed", DiagnosticKind::ReferenceUnavailable)]);
        assert!(!output.has_errors());

        reference.transitions_mut()[2].time += 3600;
        let source = FixedReference(reference);

        let output = compile_batch(&tz_data, &config, Some("Test/Zone"), Some(&source))?;
        assert_eq!(output.diagnostics.len(), 1);
        assert!(matches!(&output.diagnostics[0].kind, DiagnosticKind::ReferenceMismatch(Mismatch::Transition { index: 2, .. })));
        assert!(output.has_errors());
        assert!(output.tables.contains_key("Test/Zone"));

        Ok(())
    }

    #[test]
    fn test_rollback_diagnostics() -> Result<()> {
        let source = "
Zone    Test/Rollback   0:00    -       GMT     2019 Mar 10 0:20u
                        -1:00   -       XXT
";
        let config = Config::new().with_years(2019, 2020);
        let tz_data = parse_sources([("test", source)], &config)?;

        let output = compile_batch(&tz_data, &config, None, None)?;
        assert!(matches!(&output.diagnostics[..], [Diagnostic { kind: DiagnosticKind::Rollback { status: RollbackStatus::Found, count: 1, .. }, .. }]));
        assert_eq!(output.tables["Test/Rollback"], "+0000 -0100 0;0/0/GMT -10/0/XXT;1;1XK0k");

        let config = config.with_fix_calendar_rollbacks(true);
        let output = compile_batch(&tz_data, &config, None, None)?;
        assert!(matches!(&output.diagnostics[..], [Diagnostic { kind: DiagnosticKind::Rollback { status: RollbackStatus::Fixed, .. }, .. }]));
        assert!(!output.has_errors());

        Ok(())
    }

    #[test]
    fn test_check_round_trip() {
        let list = |transitions| TransitionList::new("Test/Zone", transitions);
        let fixed = |utc_offset, name: &str| list(vec![Transition::new(BEGINNING_OF_TIME, utc_offset, 0, Some(name.into()))]);

        assert_eq!(check_round_trip(&fixed(7200, "XYZ"), &fixed(7200, "ABC")), Ok(()));
        assert!(check_round_trip(&fixed(7200, "XYZ"), &fixed(3600, "XYZ")).is_err());
        assert_eq!(check_round_trip(&fixed(7200, "XYZ"), &list(vec![])), Err(Mismatch::Length { ours: 1, theirs: 0 }));
    }
}
