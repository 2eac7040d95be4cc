//! Turns the text of a whole `.dly` file into a [`StationObservations`] series.

use crate::dly::error::{DlyParseError, MalformedReason};
use crate::dly::line::{self, decode_line};
use crate::types::element::Element;
use crate::types::observation::{trim_empty_tail, DayObservation, StationObservations};
use bon::Builder;
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Days before this date are dropped unless [`ParseOptions::start_date`] says otherwise.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2015, 1, 1) {
    Some(date) => date,
    None => panic!("invalid default start date"),
};

/// What to keep while parsing a `.dly` file.
///
/// # Examples
///
/// ```
/// use ghcnd::{Element, ParseOptions};
/// use chrono::NaiveDate;
///
/// let defaults = ParseOptions::default();
/// assert!(defaults.elements.contains(&Element::Tmax));
/// assert_eq!(defaults.start_date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
///
/// let since_2020 = ParseOptions::builder()
///     .start_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
///     .build();
/// assert_eq!(since_2020.elements, defaults.elements);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Builder)]
pub struct ParseOptions {
    /// Elements to decode. Records for any other element are skipped.
    #[builder(default = Element::temperatures().into_iter().collect())]
    pub elements: BTreeSet<Element>,
    /// Earliest date to keep.
    #[builder(default = DEFAULT_START_DATE)]
    pub start_date: NaiveDate,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::builder().build()
    }
}

/// Parses the full text of a GHCN-d `.dly` file.
///
/// The station id is taken from the first record. Records of the same month for
/// different elements are merged into the same days, days before
/// `options.start_date` are dropped, and the trailing run of fully-empty days (the
/// unreported rest of the current month) is trimmed. Empty days in the middle of the
/// series are kept.
///
/// # Errors
///
/// * [`DlyParseError::MalformedRecord`] for the first record that cannot be decoded.
/// * [`DlyParseError::NoRecords`] when the text holds no records at all.
/// * [`DlyParseError::NoObservations`] when nothing is left after filtering and trimming.
pub fn parse_dly_text(
    text: &str,
    options: &ParseOptions,
) -> Result<StationObservations, DlyParseError> {
    let mut station_id: Option<&str> = None;
    let mut days: HashMap<NaiveDate, DayObservation> = HashMap::new();
    let mut skipped_records = 0usize;

    for (idx, text_line) in text.lines().enumerate() {
        if text_line.trim().is_empty() {
            continue;
        }
        let malformed = |reason: MalformedReason| DlyParseError::MalformedRecord {
            line: idx + 1,
            reason,
        };

        if station_id.is_none() {
            station_id = Some(line::station_id(text_line).map_err(malformed)?);
        }

        let Some(record) = decode_line(text_line, &options.elements).map_err(malformed)? else {
            skipped_records += 1;
            continue;
        };

        for (date, value) in record.days() {
            if date < options.start_date {
                continue;
            }
            let day = days
                .entry(date)
                .or_insert_with(|| DayObservation::empty(date));
            match record.element {
                Element::Tmax => day.tmax = value,
                Element::Tmin => day.tmin = value,
                _ => {}
            }
        }
    }

    let station_id = station_id.ok_or(DlyParseError::NoRecords)?.to_string();

    let mut observations: Vec<DayObservation> = days.into_values().collect();
    observations.sort_unstable_by_key(|obs| obs.date);
    trim_empty_tail(&mut observations);

    if observations.is_empty() {
        return Err(DlyParseError::NoObservations { station_id });
    }

    debug!(
        "Parsed {} days for station {} ({} records skipped)",
        observations.len(),
        station_id,
        skipped_records
    );
    StationObservations::new(station_id, observations)
}

/// Reads and parses a `.dly` file from disk. See [`parse_dly_text`].
pub fn read_dly_file(
    path: &Path,
    options: &ParseOptions,
) -> Result<StationObservations, DlyParseError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DlyParseError::FileRead(path.to_path_buf(), e))?;
    parse_dly_text(&text, options)
}
