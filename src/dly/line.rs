//! Decoder for a single record of a GHCN-d `.dly` file.
//!
//! Each record holds one month of one element for one station. Layout, from the NOAA
//! GHCN-d readme (columns are 1-indexed):
//!
//! ```text
//! ------------------------------
//! Variable   Columns   Type
//! ------------------------------
//! ID            1-11   Character
//! YEAR         12-15   Integer
//! MONTH        16-17   Integer
//! ELEMENT      18-21   Character
//! VALUE1       22-26   Integer
//! MFLAG1       27-27   Character
//! QFLAG1       28-28   Character
//! SFLAG1       29-29   Character
//! VALUE2       30-34   Integer
//! ...
//! VALUE31    262-266   Integer
//! MFLAG31    267-267   Character
//! QFLAG31    268-268   Character
//! SFLAG31    269-269   Character
//! ------------------------------
//! ```

use crate::dly::error::MalformedReason;
use crate::types::element::Element;
use crate::types::traits::utils::days_in_month;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::ops::Range;

const ID_COLUMNS: Range<usize> = 0..11;
const YEAR_COLUMNS: Range<usize> = 11..15;
const MONTH_COLUMNS: Range<usize> = 15..17;
const ELEMENT_COLUMNS: Range<usize> = 17..21;

/// Width of the id/year/month/element header preceding the value groups.
pub const HEADER_WIDTH: usize = 21;
/// Each day is a 5-character value followed by three 1-character flags.
const DAY_WIDTH: usize = 8;
const VALUE_WIDTH: usize = 5;
pub const DAYS_PER_RECORD: usize = 31;
/// Full width of a `.dly` record.
pub const RECORD_WIDTH: usize = HEADER_WIDTH + DAYS_PER_RECORD * DAY_WIDTH;
/// Value used by GHCN-d for "no observation".
pub const MISSING_VALUE: i32 = -9999;

/// One decoded `.dly` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub station_id: &'a str,
    pub year: i32,
    pub month: u32,
    pub element: Element,
    /// One entry per day that exists in `month`; `None` where the value was `-9999`.
    pub values: Vec<Option<i32>>,
}

impl LineRecord<'_> {
    /// Pairs every decoded value with its calendar date.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, Option<i32>)> + '_ {
        self.values
            .iter()
            .zip(1u32..)
            .filter_map(|(value, day)| {
                NaiveDate::from_ymd_opt(self.year, self.month, day).map(|date| (date, *value))
            })
    }
}

/// Decodes one `.dly` record if its element is in `elements`.
///
/// Returns `Ok(None)` for any other element, looking only at the element columns;
/// year, month and the 31 value groups are not touched in that case.
///
/// # Errors
///
/// * [`MalformedReason::TooShort`] when the line cannot hold the header, or when a
///   desired line is shorter than the full record width.
/// * [`MalformedReason::InvalidNumber`], [`MalformedReason::InvalidValue`] and
///   [`MalformedReason::MonthOutOfRange`] for bad numeric content.
/// * [`MalformedReason::NonAscii`] when a field boundary falls inside a multi-byte character.
pub fn decode_line<'a>(
    line: &'a str,
    elements: &BTreeSet<Element>,
) -> Result<Option<LineRecord<'a>>, MalformedReason> {
    ensure_width(line, HEADER_WIDTH)?;

    let code = column(line, ELEMENT_COLUMNS, "ELEMENT")?;
    let Some(element) = elements.iter().find(|e| e.code() == code) else {
        return Ok(None);
    };

    ensure_width(line, RECORD_WIDTH)?;

    let station_id = column(line, ID_COLUMNS, "ID")?;
    let year: i32 = parse_number(column(line, YEAR_COLUMNS, "YEAR")?, "YEAR")?;
    let month: u32 = parse_number(column(line, MONTH_COLUMNS, "MONTH")?, "MONTH")?;
    let days = days_in_month(year, month).ok_or(MalformedReason::MonthOutOfRange(month))?;

    let values = (0..days as usize)
        .map(|day_idx| decode_value(line, day_idx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(LineRecord {
        station_id,
        year,
        month,
        element: element.clone(),
        values,
    }))
}

/// Station id of a record (columns 1-11).
pub fn station_id(line: &str) -> Result<&str, MalformedReason> {
    ensure_width(line, ID_COLUMNS.end)?;
    column(line, ID_COLUMNS, "ID")
}

fn decode_value(line: &str, day_idx: usize) -> Result<Option<i32>, MalformedReason> {
    let start = HEADER_WIDTH + day_idx * DAY_WIDTH;
    let raw = column(line, start..start + VALUE_WIDTH, "VALUE")?;
    let value: i32 = raw
        .trim()
        .parse()
        .map_err(|_| MalformedReason::InvalidValue {
            day: day_idx as u32 + 1,
            raw: raw.to_string(),
        })?;
    Ok((value != MISSING_VALUE).then_some(value))
}

fn ensure_width(line: &str, expected: usize) -> Result<(), MalformedReason> {
    if line.len() < expected {
        return Err(MalformedReason::TooShort {
            expected,
            found: line.len(),
        });
    }
    Ok(())
}

fn column<'a>(
    line: &'a str,
    range: Range<usize>,
    field: &'static str,
) -> Result<&'a str, MalformedReason> {
    line.get(range).ok_or(MalformedReason::NonAscii(field))
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<T, MalformedReason> {
    raw.trim()
        .parse()
        .map_err(|_| MalformedReason::InvalidNumber {
            field,
            raw: raw.to_string(),
        })
}
