//! Comparison of transition lists.

use super::{Transition, TransitionList};
use crate::constants::*;

use std::fmt;

/// Options of a close comparison against a reference list
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MatchOptions {
    /// Maximum difference in seconds between matching times and between matching offsets
    pub tolerance: i64,
    /// Compare time zone designations
    pub compare_names: bool,
    /// Ignore our transitions which only change the time zone designation
    pub skip_name_only_changes: bool,
}

impl MatchOptions {
    /// Options for a reference which keeps time zone designations, like a binary zoneinfo file
    pub const fn with_names(tolerance: i64) -> Self {
        Self { tolerance, compare_names: true, skip_name_only_changes: false }
    }

    /// Options for a reference which has no time zone designations, nor name-only transitions
    pub const fn without_names(tolerance: i64) -> Self {
        Self { tolerance, compare_names: false, skip_name_only_changes: true }
    }
}

/// Difference found between two transition lists
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Mismatch {
    /// Lists have different lengths
    Length {
        /// Length of our list
        ours: usize,
        /// Length of the other list
        theirs: usize,
    },
    /// Transitions differ at some index
    Transition {
        /// Index in our list
        index: usize,
        /// Our transition
        ours: Transition,
        /// Transition of the other list
        theirs: Transition,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Length { ours, theirs } => write!(f, "{ours} transitions != {theirs} transitions"),
            Self::Transition { index, ours, theirs } => {
                write!(f, "index {index}: [{ours}] != [{theirs}] ({} seconds apart)", theirs.time.saturating_sub(ours.time))
            }
        }
    }
}

impl TransitionList {
    /// Check that another list has exactly the same transitions
    pub fn matches_exactly(&self, other: &TransitionList) -> Result<(), Mismatch> {
        if self.len() != other.len() {
            return Err(Mismatch::Length { ours: self.len(), theirs: other.len() });
        }

        match self.transitions.iter().zip(&other.transitions).position(|(ours, theirs)| ours != theirs) {
            Some(index) => Err(Mismatch::Transition { index, ours: self.transitions[index].clone(), theirs: other.transitions[index].clone() }),
            None => Ok(()),
        }
    }

    /// Check that a reference list has the same transitions, within a tolerance.
    ///
    /// The first transitions are not compared.
    /// A transition more than three months away from its counterpart is assumed to be missing from the other list and is skipped.
    pub fn closely_matches(&self, reference: &TransitionList, options: MatchOptions) -> Result<(), Mismatch> {
        let ours = if options.skip_name_only_changes { self.without_name_only_changes() } else { self.transitions.clone() };
        let theirs = reference.transitions();

        let (mut i, mut j) = (1, 1);

        while i < ours.len() && j < theirs.len() {
            let (t, tr) = (&ours[i], &theirs[j]);

            if t.time.saturating_add(MATCHING_TOLERANCE) < tr.time {
                i += 1;
                continue;
            }
            if tr.time.saturating_add(MATCHING_TOLERANCE) < t.time {
                j += 1;
                continue;
            }

            let matching = (t.time - tr.time).abs() <= options.tolerance
                && (i64::from(t.utc_offset) - i64::from(tr.utc_offset)).abs() <= options.tolerance
                && t.is_dst() == tr.is_dst()
                && (!options.compare_names || t.name == tr.name);

            if !matching {
                return Err(Mismatch::Transition { index: i, ours: t.clone(), theirs: tr.clone() });
            }

            i += 1;
            j += 1;
        }

        Ok(())
    }
}
