//! Calendar rollback detection.
//!
//! A calendar rollback happens when the local date right after a transition is earlier than the local date right before it,
//! as when a zone moves back past midnight. Only rollbacks to the previous day can be fixed.

use super::TransitionList;
use crate::calendar::LocalDateTime;

use std::fmt;

/// Calendar rollback at a transition
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rollback {
    /// Index of the transition in its list
    pub index: usize,
    /// Local date time just before the transition
    pub before: LocalDateTime,
    /// Local date time at the transition
    pub after: LocalDateTime,
    /// Seconds between local midnight and the transition, in the local time before the transition
    pub foray: i64,
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} rolls back to {} ({} second foray into next day)", self.before, self.after, self.foray)
    }
}

/// Result of a calendar rollback check
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RollbackStatus {
    /// No rollback found
    NoneFound,
    /// Rollbacks found and left as is
    Found,
    /// Rollbacks found and fixed
    Fixed,
    /// Rollbacks found, and still present after fixing
    Remaining,
}

impl TransitionList {
    /// Find calendar rollbacks, shifting each offending transition back by its foray when `fix` is set
    fn scan_calendar_rollbacks(&mut self, fix: bool) -> Vec<Rollback> {
        let mut rollbacks = Vec::new();

        for index in 1..self.transitions.len() {
            let prev = &self.transitions[index - 1];
            let curr = &self.transitions[index];

            let before = LocalDateTime::from_unix_time(curr.time - 1, prev.utc_offset);
            let after = LocalDateTime::from_unix_time(curr.time, curr.utc_offset);

            if after.date() < before.date() {
                let foray = LocalDateTime::from_unix_time(curr.time, prev.utc_offset).day_time();
                rollbacks.push(Rollback { index, before, after, foray });

                if fix {
                    self.transitions[index].time -= foray;
                }
            }
        }

        rollbacks
    }

    /// Returns the calendar rollbacks of the list
    pub fn find_calendar_rollbacks(&self) -> Vec<Rollback> {
        self.clone().scan_calendar_rollbacks(false)
    }

    /// Check for calendar rollbacks, and fix them if requested.
    ///
    /// Returns the check result and the rollbacks found before any fix.
    pub fn check_calendar_rollbacks(&mut self, fix: bool) -> (RollbackStatus, Vec<Rollback>) {
        let rollbacks = self.scan_calendar_rollbacks(fix);

        let status = match (rollbacks.is_empty(), fix) {
            (true, _) => RollbackStatus::NoneFound,
            (false, false) => RollbackStatus::Found,
            (false, true) if self.scan_calendar_rollbacks(false).is_empty() => RollbackStatus::Fixed,
            (false, true) => RollbackStatus::Remaining,
        };

        if let Some(_rollback) = rollbacks.first() {
            match status {
                RollbackStatus::Remaining => {
                    error!("{}: {_rollback}, not fixed", self.zone_id());
                }
                RollbackStatus::Fixed => {
                    warn!("{}: {_rollback}, fixed", self.zone_id());
                }
                _ => {
                    warn!("{}: {_rollback}", self.zone_id());
                }
            }
        }

        (status, rollbacks)
    }
}
