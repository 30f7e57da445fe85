#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! This crate compiles the source text of the [IANA time zone database](https://www.iana.org/time-zones) into compact per-zone transition tables.
//!
//! Source files are parsed into zones, rule sets and aliases, which are compiled into chronological lists of transitions restricted to a range of years.
//! A transition list is then encoded as a short text table, using base-60 numbers for offsets and time deltas,
//! and can be decoded back into the same transitions.
//!
//! A table has up to five sections separated by `;`:
//! * a header with the base UTC offset, the nominal standard offset and the nominal daylight saving minutes
//! * the distinct offsets of the zone, as `offset/dst[/name]`
//! * one base-60 digit per transition, selecting its offset
//! * the time of each transition, as a delta in minutes from the previous one
//! * the final standard and daylight saving rules, when the zone still observes daylight saving time
//!
//! A zone with a single fixed offset only has the header.
//!
//! # Usage
//!
//! ```rust
//! # fn main() -> Result<(), tzcompact::Error> {
//!     use tzcompact::{decode, encode, parse_sources, Compiler, Config};
//!
//!     let source = "
//! Rule    Test    2000    max     -       Mar     Sun>=8  2:00    1:00    D
//! Rule    Test    2000    max     -       Nov     Sun>=1  2:00    0       S
//! Zone    Test/Zone       -5:00   Test    E%sT
//! Zone    Test/Fixed      2:00    -       XYZ
//! ";
//!
//!     // Parse source files, then compile a zone for 2019 and 2020
//!     let config = Config::new().with_years(2019, 2020);
//!     let tz_data = parse_sources([("northamerica", source)], &config)?;
//!     let compiler = Compiler::new(&tz_data, config);
//!
//!     let list = compiler.compile("Test/Zone")?;
//!     assert_eq!(list.len(), 5);
//!
//!     // Encode the transitions as a compact table
//!     let table = encode(&list, &config)?;
//!     assert_eq!(table, "-0500 -0500 60;-50/0/EST -40/10/EDT;1010;1XK70 1zb0 Op0 1zb0;2000 11 1 1 2:0 0 0,2000 3 8 1 2:0 0 60");
//!
//!     // Decode the table back into the same transitions
//!     let decoded = decode("Test/Zone", &table)?;
//!     assert_eq!(decoded.transitions(), list.transitions());
//!
//!     // A fixed offset zone only has a header
//!     assert_eq!(encode(&compiler.compile("Test/Fixed")?, &config)?, "+0200 +0200 0");
//! # Ok(())
//! # }
//! ```
//!
//! Every zone and alias can be compiled at once with [`compile_batch`],
//! which reports per-zone problems as [`Diagnostic`]s and can cross-check the compiled transitions against a [`ReferenceSource`],
//! like a directory of binary zoneinfo files read by [`ZoneInfoDir`].

#[macro_use]
mod logging;

pub mod batch;
pub mod calendar;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod notation;
pub mod oracle;
pub mod parse;
pub mod table;
pub mod transition;
pub mod zone;

pub use batch::{compile_batch, BatchOutput};
pub use compiler::Compiler;
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{Error, Result};
pub use filter::ZoneFilter;
pub use oracle::{ReferenceSource, ZoneInfoDir};
pub use parse::{parse_sources, SourceParser};
pub use table::{decode, encode, CompactTable};
pub use transition::{Transition, TransitionList};
pub use zone::TzData;
