//! Per-zone problems reported while compiling, which do not stop a batch.

use crate::error::TableError;
use crate::transition::{Mismatch, Rollback, RollbackStatus};

use std::fmt;

/// Problem found for one zone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    /// Zone id
    pub zone_id: String,
    /// Kind of problem
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Construct a diagnostic
    pub fn new(zone_id: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self { zone_id: zone_id.into(), kind }
    }

    /// Check if the diagnostic reports a failure rather than a warning
    pub fn is_error(&self) -> bool {
        match &self.kind {
            DiagnosticKind::Rollback { status, .. } => *status == RollbackStatus::Remaining,
            DiagnosticKind::UnresolvedName { .. } | DiagnosticKind::ReferenceUnavailable => false,
            _ => true,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.zone_id, self.kind)
    }
}

/// Kind of per-zone problem
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DiagnosticKind {
    /// A `%s` format needed rule letters before any rule set them
    UnresolvedName {
        /// Zone line format
        format: String,
        /// Daylight saving state of the named transition
        is_dst: bool,
    },
    /// Calendar rollbacks were found
    Rollback {
        /// Check result
        status: RollbackStatus,
        /// First rollback found
        first: Rollback,
        /// Number of rollbacks found
        count: usize,
    },
    /// Compiled transitions disagree with the reference source
    ReferenceMismatch(Mismatch),
    /// The reference source has no data for the zone
    ReferenceUnavailable,
    /// Decoding the compact table does not give back the encoded transitions
    RoundTripMismatch(Mismatch),
    /// The transitions could not be encoded
    EncodeFailed(TableError),
    /// The zone could not be compiled
    CompileFailed(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnresolvedName { format, is_dst } => write!(f, "unresolved time zone name {format}{}", if *is_dst { ", DST" } else { "" }),
            Self::Rollback { status, first, count } => {
                let status = match status {
                    RollbackStatus::NoneFound => "no calendar rollback",
                    RollbackStatus::Found => "calendar rollback found",
                    RollbackStatus::Fixed => "calendar rollback fixed",
                    RollbackStatus::Remaining => "calendar rollback remaining after fix",
                };
                write!(f, "{status} ({count} in total, first: {first})")
            }
            Self::ReferenceMismatch(mismatch) => write!(f, "does not match reference transitions: {mismatch}"),
            Self::ReferenceUnavailable => f.write_str("no reference transitions available"),
            Self::RoundTripMismatch(mismatch) => write!(f, "decoded compact table does not match compiled transitions: {mismatch}"),
            Self::EncodeFailed(error) => write!(f, "cannot encode compact table: {error}"),
            Self::CompileFailed(error) => write!(f, "cannot compile: {error}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new("Test/Zone", DiagnosticKind::UnresolvedName { format: "E%sT".to_owned(), is_dst: true });
        assert_eq!(diagnostic.to_string(), "Test/Zone: unresolved time zone name E%sT, DST");
        assert!(!diagnostic.is_error());

        let diagnostic = Diagnostic::new("Test/Zone", DiagnosticKind::Rollback { status: RollbackStatus::Remaining, first: rollback(), count: 2 });
        assert_eq!(
            diagnostic.to_string(),
            "Test/Zone: calendar rollback remaining after fix (2 in total, first: 2019-03-10 00:19:59 rolls back to 2019-03-09 23:20:00 (1200 second foray into next day))"
        );
        assert!(diagnostic.is_error());

        let diagnostic = Diagnostic::new("Test/Zone", DiagnosticKind::EncodeFailed(TableError::TooManyOffsets(61)));
        assert_eq!(diagnostic.to_string(), "Test/Zone: cannot encode compact table: 61 distinct offsets cannot be indexed by a single base-60 digit");
        assert!(diagnostic.is_error());
    }

    fn rollback() -> Rollback {
        use crate::calendar::LocalDateTime;

        Rollback {
            index: 1,
            before: LocalDateTime::from_unix_time(1552177199, 0),
            after: LocalDateTime::from_unix_time(1552177200, -3600),
            foray: 1200,
        }
    }
}
