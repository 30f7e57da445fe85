//! Functions used for parsing a binary zoneinfo (TZif) file.

use crate::error::{ParseDataError, ZoneInfoError};
use crate::parse::tz_string::parse_posix_tz;
use crate::parse::utils::{read_chunk_exact, read_exact, Cursor};
use crate::transition::NominalOffsets;

use std::str;

/// TZif version
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Version {
    /// Version 1
    V1,
    /// Version 2
    V2,
    /// Version 3
    V3,
}

/// TZif header
#[derive(Debug)]
struct Header {
    /// TZif version
    version: Version,
    /// Number of UT/local indicators
    ut_local_count: usize,
    /// Number of standard/wall indicators
    std_wall_count: usize,
    /// Number of leap-second records
    leap_count: usize,
    /// Number of transition times
    transition_count: usize,
    /// Number of local time type records
    type_count: usize,
    /// Number of time zone designations bytes
    char_count: usize,
}

/// Local time type record of a TZif file
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct LocalTimeType {
    /// Offset from UTC in seconds
    pub(crate) ut_offset: i32,
    /// Daylight saving time indicator
    pub(crate) is_dst: bool,
    /// Time zone designation, possibly empty
    pub(crate) designation: String,
}

/// Content of a TZif file, without leap seconds
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ZoneInfoData {
    /// Transition times, with the index of the local time type in effect from each of them
    pub(crate) transitions: Vec<(i64, usize)>,
    /// Local time types
    pub(crate) local_time_types: Vec<LocalTimeType>,
    /// Nominal offsets given by the footer TZ string
    pub(crate) nominal: Option<NominalOffsets>,
}

/// Parse TZif header
fn parse_header(cursor: &mut Cursor<'_>) -> Result<Header, ZoneInfoError> {
    let magic = read_exact(cursor, 4)?;
    if magic != *b"TZif" {
        return Err(ZoneInfoError::InvalidMagicNumber);
    }

    let version = match read_exact(cursor, 1)? {
        [0x00] => Version::V1,
        [0x32] => Version::V2,
        [0x33] => Version::V3,
        _ => return Err(ZoneInfoError::UnsupportedVersion),
    };

    read_exact(cursor, 15)?;

    let ut_local_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);
    let std_wall_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);
    let leap_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);
    let transition_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);
    let type_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);
    let char_count = u32::from_be_bytes(*read_chunk_exact(cursor)?);

    if !(type_count != 0 && char_count != 0 && (ut_local_count == 0 || ut_local_count == type_count) && (std_wall_count == 0 || std_wall_count == type_count)) {
        return Err(ZoneInfoError::InvalidHeader);
    }

    Ok(Header {
        version,
        ut_local_count: ut_local_count as usize,
        std_wall_count: std_wall_count as usize,
        leap_count: leap_count as usize,
        transition_count: transition_count as usize,
        type_count: type_count as usize,
        char_count: char_count as usize,
    })
}

/// Parse TZif footer
fn parse_footer(footer: &[u8]) -> Result<Option<NominalOffsets>, ZoneInfoError> {
    let footer = str::from_utf8(footer)?;
    if !(footer.starts_with('\n') && footer.ends_with('\n')) {
        return Err(ZoneInfoError::InvalidFooter);
    }

    let tz_string = footer.trim_matches(|c: char| c.is_ascii_whitespace());
    if tz_string.starts_with(':') || tz_string.contains('\0') {
        return Err(ZoneInfoError::InvalidFooter);
    }

    if !tz_string.is_empty() {
        Ok(Some(parse_posix_tz(tz_string.as_bytes())?))
    } else {
        Ok(None)
    }
}

/// TZif data blocks
struct DataBlocks<'a, const TIME_SIZE: usize> {
    /// Transition times data block
    transition_times: &'a [u8],
    /// Transition types data block
    transition_types: &'a [u8],
    /// Local time types data block
    local_time_types: &'a [u8],
    /// Time zone designations data block
    time_zone_designations: &'a [u8],
}

/// Read TZif data blocks, skipping leap seconds and indicators
fn read_data_blocks<'a, const TIME_SIZE: usize>(cursor: &mut Cursor<'a>, header: &Header) -> Result<DataBlocks<'a, TIME_SIZE>, ParseDataError> {
    let data_blocks = DataBlocks {
        transition_times: read_exact(cursor, header.transition_count * TIME_SIZE)?,
        transition_types: read_exact(cursor, header.transition_count)?,
        local_time_types: read_exact(cursor, header.type_count * 6)?,
        time_zone_designations: read_exact(cursor, header.char_count)?,
    };

    read_exact(cursor, header.leap_count * (TIME_SIZE + 4))?;
    read_exact(cursor, header.std_wall_count)?;
    read_exact(cursor, header.ut_local_count)?;

    Ok(data_blocks)
}

trait ParseTime {
    type TimeData;

    fn parse_time(&self, data: &Self::TimeData) -> i64;
}

impl ParseTime for DataBlocks<'_, 4> {
    type TimeData = [u8; 4];

    fn parse_time(&self, data: &Self::TimeData) -> i64 {
        i32::from_be_bytes(*data).into()
    }
}

impl ParseTime for DataBlocks<'_, 8> {
    type TimeData = [u8; 8];

    fn parse_time(&self, data: &Self::TimeData) -> i64 {
        i64::from_be_bytes(*data)
    }
}

impl<'a, const TIME_SIZE: usize> DataBlocks<'a, TIME_SIZE>
where
    DataBlocks<'a, TIME_SIZE>: ParseTime<TimeData = [u8; TIME_SIZE]>,
{
    /// Parse time zone data
    fn parse(&self, header: &Header, footer: Option<&[u8]>) -> Result<ZoneInfoData, ZoneInfoError> {
        let mut transitions = Vec::with_capacity(header.transition_count);
        for (time_data, &local_time_type_index) in self.transition_times.chunks_exact(TIME_SIZE).zip(self.transition_types) {
            let Some(time_data) = time_data.first_chunk::<TIME_SIZE>() else {
                return Err(ParseDataError::UnexpectedEof.into());
            };

            let local_time_type_index = local_time_type_index as usize;
            if local_time_type_index >= header.type_count {
                return Err(ZoneInfoError::InvalidLocalTimeTypeIndex);
            }

            transitions.push((self.parse_time(time_data), local_time_type_index));
        }

        let mut local_time_types = Vec::with_capacity(header.type_count);
        for data in self.local_time_types.chunks_exact(6) {
            let &[d0, d1, d2, d3, d4, d5] = data else {
                return Err(ParseDataError::UnexpectedEof.into());
            };

            let ut_offset = i32::from_be_bytes([d0, d1, d2, d3]);
            if !(-89999..=93599).contains(&ut_offset) {
                return Err(ZoneInfoError::InvalidOffset);
            }

            let is_dst = match d4 {
                0 => false,
                1 => true,
                _ => return Err(ZoneInfoError::InvalidDstIndicator),
            };

            let char_index = d5 as usize;
            if char_index >= header.char_count {
                return Err(ZoneInfoError::InvalidDesignationIndex);
            }

            let designation = match self.time_zone_designations[char_index..].iter().position(|&c| c == b'\0') {
                None => return Err(ZoneInfoError::InvalidDesignationIndex),
                Some(position) => str::from_utf8(&self.time_zone_designations[char_index..char_index + position])?,
            };

            local_time_types.push(LocalTimeType { ut_offset, is_dst, designation: designation.to_owned() });
        }

        let nominal = match footer {
            Some(footer) => parse_footer(footer)?,
            None => None,
        };

        Ok(ZoneInfoData { transitions, local_time_types, nominal })
    }
}

/// Parse TZif file as described in [RFC 8536](https://datatracker.ietf.org/doc/html/rfc8536)
pub(crate) fn parse_tz_file(bytes: &[u8]) -> Result<ZoneInfoData, ZoneInfoError> {
    let mut cursor = bytes;

    let header = parse_header(&mut cursor)?;

    match header.version {
        Version::V1 => {
            let data_blocks = read_data_blocks::<4>(&mut cursor, &header)?;

            if !cursor.is_empty() {
                return Err(ParseDataError::InvalidData.into());
            }

            data_blocks.parse(&header, None)
        }
        Version::V2 | Version::V3 => {
            // Skip v1 data block
            read_data_blocks::<4>(&mut cursor, &header)?;

            let header = parse_header(&mut cursor)?;
            let data_blocks = read_data_blocks::<8>(&mut cursor, &header)?;
            let footer = cursor;

            data_blocks.parse(&header, Some(footer))
        }
    }
}
