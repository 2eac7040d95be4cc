//! The structures a parsed `.dly` file turns into: one [`DayObservation`] per calendar
//! day, collected per station in a [`StationObservations`] series.

use crate::dly::error::DlyParseError;
use crate::types::daily_frame::DailyLazyFrame;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Temperatures observed by one station on one day.
///
/// Values are in tenths of a degree Celsius, exactly as stored in the `.dly` file.
/// A missing observation is `None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayObservation {
    pub date: NaiveDate,
    /// Maximum temperature, tenths of degrees C.
    pub tmax: Option<i32>,
    /// Minimum temperature, tenths of degrees C.
    pub tmin: Option<i32>,
}

impl DayObservation {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            tmax: None,
            tmin: None,
        }
    }

    /// Maximum temperature in degrees C.
    pub fn tmax_decimal(&self) -> Option<f64> {
        self.tmax.map(to_decimal)
    }

    /// Minimum temperature in degrees C.
    pub fn tmin_decimal(&self) -> Option<f64> {
        self.tmin.map(to_decimal)
    }

    /// `true` when neither temperature was observed.
    pub fn is_empty(&self) -> bool {
        self.tmax.is_none() && self.tmin.is_none()
    }
}

fn to_decimal(tenths: i32) -> f64 {
    tenths as f64 / 10.0
}

/// Removes fully-empty days from the end of a date-sorted series.
///
/// A `.dly` line always carries a whole month, so the current, partially reported
/// month ends in a run of empty days. Empty days in the middle are kept.
pub(crate) fn trim_empty_tail(observations: &mut Vec<DayObservation>) {
    while observations.last().is_some_and(DayObservation::is_empty) {
        observations.pop();
    }
}

/// All daily observations parsed for one station, ordered by date.
///
/// The series is never empty, its dates are strictly ascending, and its last day
/// always has at least one value. Instances come from [`crate::parse_dly_text`],
/// [`crate::read_dly_file`] or [`StationObservations::read_json`], and are immutable.
///
/// # Examples
///
/// ```
/// use ghcnd::{parse_dly_text, ParseOptions};
/// use chrono::NaiveDate;
///
/// let mut line = String::from("USC00050848202208TMAX");
/// line.push_str("  339  7");
/// line.push_str(&"-9999   ".repeat(30));
///
/// let series = parse_dly_text(&line, &ParseOptions::default()).unwrap();
/// let first = series.get(NaiveDate::from_ymd_opt(2022, 8, 1).unwrap()).unwrap();
/// assert_eq!(first.tmax, Some(339));
/// assert_eq!(first.tmax_decimal(), Some(33.9));
/// assert_eq!(series.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedObservations")]
pub struct StationObservations {
    station_id: String,
    observations: Vec<DayObservation>,
}

#[derive(Deserialize)]
struct UncheckedObservations {
    station_id: String,
    observations: Vec<DayObservation>,
}

impl TryFrom<UncheckedObservations> for StationObservations {
    type Error = DlyParseError;

    fn try_from(value: UncheckedObservations) -> Result<Self, Self::Error> {
        StationObservations::new(value.station_id, value.observations)
    }
}

impl StationObservations {
    /// Validates the series invariants.
    pub(crate) fn new(
        station_id: String,
        observations: Vec<DayObservation>,
    ) -> Result<Self, DlyParseError> {
        let invalid = |message: &str| DlyParseError::InvalidSeries {
            station_id: station_id.clone(),
            message: message.to_string(),
        };
        match observations.last() {
            None => return Err(invalid("series is empty")),
            Some(last) if last.is_empty() => {
                return Err(invalid("series ends with a day without observations"))
            }
            Some(_) => {}
        }
        if observations.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(invalid("dates are not strictly ascending"));
        }
        Ok(Self {
            station_id,
            observations,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn observations(&self) -> &[DayObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// `true` when the series holds no days.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DayObservation> {
        self.observations.iter()
    }

    /// First date of the series.
    pub fn start_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    /// Last date of the series. This day always has at least one value.
    pub fn end_date(&self) -> NaiveDate {
        self.observations[self.observations.len() - 1].date
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayObservation> {
        self.observations
            .binary_search_by_key(&date, |obs| obs.date)
            .ok()
            .map(|idx| &self.observations[idx])
    }

    /// Days between `start` and `end`, both inclusive.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> &[DayObservation] {
        let from = self.observations.partition_point(|obs| obs.date < start);
        let to = self.observations.partition_point(|obs| obs.date <= end);
        if from >= to {
            return &[];
        }
        &self.observations[from..to]
    }

    /// Builds a `DataFrame` with columns `date`, `tmax` and `tmin`, temperatures in
    /// decimal degrees C and null where missing.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<NaiveDate> = self.observations.iter().map(|obs| obs.date).collect();
        let tmax: Vec<Option<f64>> = self.observations.iter().map(|o| o.tmax_decimal()).collect();
        let tmin: Vec<Option<f64>> = self.observations.iter().map(|o| o.tmin_decimal()).collect();

        DataFrame::new(vec![
            Column::new("date".into(), dates),
            Column::new("tmax".into(), tmax),
            Column::new("tmin".into(), tmin),
        ])
    }

    /// The series as a [`DailyLazyFrame`], ready for date filtering.
    pub fn lazy(&self) -> PolarsResult<DailyLazyFrame> {
        Ok(DailyLazyFrame::new(self.to_dataframe()?.lazy()))
    }

    /// Writes the series as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), DlyParseError> {
        let file =
            File::create(path).map_err(|e| DlyParseError::JsonWrite(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer
            .flush()
            .map_err(|e| DlyParseError::JsonWrite(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Reads a series previously written by [`StationObservations::write_json`],
    /// re-checking its invariants.
    pub fn read_json(path: &Path) -> Result<Self, DlyParseError> {
        let file = File::open(path).map_err(|e| DlyParseError::JsonRead(path.to_path_buf(), e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl<'a> IntoIterator for &'a StationObservations {
    type Item = &'a DayObservation;
    type IntoIter = std::slice::Iter<'a, DayObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
