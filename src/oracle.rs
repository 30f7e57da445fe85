//! Reference transition sources, used to cross-check compiled transitions.

use crate::config::Config;
use crate::constants::*;
use crate::error::{Error, Result, ZoneInfoError};
use crate::parse::tz_file::{parse_tz_file, LocalTimeType};
use crate::transition::{Transition, TransitionList};

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Source of independently derived transitions for a zone
pub trait ReferenceSource {
    /// Returns the reference transitions of a zone, restricted to the configured years, or `None` if unavailable
    fn reference(&self, zone_id: &str, config: &Config) -> Option<TransitionList>;
}

/// Directory of binary zoneinfo (TZif) files, one per zone id
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ZoneInfoDir {
    /// Root directory
    root: PathBuf,
}

impl ZoneInfoDir {
    /// Possible system zoneinfo directories
    const SYSTEM_DIRECTORIES: [&'static str; 3] = ["/usr/share/zoneinfo", "/share/zoneinfo", "/etc/zoneinfo"];

    /// Construct a zoneinfo directory source
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the first existing system zoneinfo directory
    pub fn system() -> Option<Self> {
        Self::SYSTEM_DIRECTORIES.iter().map(Path::new).find(|path| path.is_dir()).map(Self::new)
    }

    /// Returns root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the reference transitions of a zone
    pub fn read(&self, zone_id: &str, config: &Config) -> Result<TransitionList> {
        let relative = Path::new(zone_id);
        if zone_id.is_empty() || !relative.components().all(|component| matches!(component, Component::Normal(_))) {
            return Err(Error::UnknownZone(zone_id.to_owned()));
        }

        let bytes = fs::read(self.root.join(relative))?;
        Ok(transitions_from_tz_file(zone_id, &bytes, config)?)
    }
}

impl ReferenceSource for ZoneInfoDir {
    fn reference(&self, zone_id: &str, config: &Config) -> Option<TransitionList> {
        match self.read(zone_id, config) {
            Ok(list) => Some(list),
            Err(_error) => {
                debug!("{zone_id}: no reference transitions ({_error})");
                None
            }
        }
    }
}

/// Round a number of seconds to the nearest minute
fn round_to_minute(seconds: i64) -> i64 {
    (seconds + 30).div_euclid(SECONDS_PER_MINUTE) * SECONDS_PER_MINUTE
}

/// Convert the content of a TZif file to a transition list.
///
/// Numeric designations become unnamed, and daylight saving types get a one hour daylight saving offset.
/// Transitions at or before the lowest 32-bit time only replace the type of the first transition.
pub fn transitions_from_tz_file(zone_id: &str, bytes: &[u8], config: &Config) -> std::result::Result<TransitionList, ZoneInfoError> {
    let data = parse_tz_file(bytes)?;
    let round = config.round_to_minutes();

    let make_transition = |time: i64, local_time_type: &LocalTimeType| {
        let LocalTimeType { ut_offset, is_dst, designation } = local_time_type;

        let name = match designation.as_str() {
            "" => None,
            x if x.starts_with(['+', '-']) => None,
            x => Some(Arc::<str>::from(x)),
        };

        let dst_offset = if *is_dst { SECONDS_PER_HOUR as i32 } else { 0 };

        if round {
            let time = if time == BEGINNING_OF_TIME { time } else { round_to_minute(time) };
            Transition::new(time, round_to_minute((*ut_offset).into()) as i32, dst_offset, name)
        } else {
            Transition::new(time, *ut_offset, dst_offset, name)
        }
    };

    let local_time_type = |index: usize| data.local_time_types.get(index).ok_or(ZoneInfoError::InvalidLocalTimeTypeIndex);

    let mut transitions = vec![make_transition(BEGINNING_OF_TIME, local_time_type(0)?)];

    for &(time, index) in &data.transitions {
        if time <= i32::MIN.into() {
            transitions[0] = make_transition(BEGINNING_OF_TIME, local_time_type(index)?);
        } else {
            transitions.push(make_transition(time, local_time_type(index)?));
        }
    }

    let mut list = TransitionList::new(zone_id, transitions).with_nominal(data.nominal);
    list.dedupe();
    list.trim(config.min_year(), config.max_year());

    Ok(list)
}
