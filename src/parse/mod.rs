//! Parsing functions.

mod fields;
mod line;
mod source;
pub(crate) mod tz_file;
mod tz_string;
mod utils;

pub use source::{parse_sources, read_source_dir, SourceParser, SOURCE_FILE_NAMES};
