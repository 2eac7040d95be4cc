//! Contains [`DailyLazyFrame`] for lazy operations on GHCN-d daily temperature data,
//! and [`merge_stations`] for lining several stations up on one date axis.

use crate::error::GhcndError;
use crate::types::observation::StationObservations;
use crate::types::traits::any_date::AnyDate;
use crate::types::traits::date_period::DatePeriod;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;

/// A wrapper around a Polars `LazyFrame` holding daily GHCN-d data.
///
/// The frame has a `date` column (`Date`) and `tmax` / `tmin` columns in decimal
/// degrees C (`Float64`, null where the station reported nothing).
///
/// Instances are obtained from [`StationObservations::lazy`] or
/// [`crate::Ghcnd::daily`].
///
/// # Errors
///
/// The date helpers return [`GhcndError::DateParsingError`] if their input cannot be
/// resolved to dates. Collecting the frame may return a [`PolarsError`].
#[derive(Clone)]
pub struct DailyLazyFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl DailyLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Filters the daily data with an arbitrary Polars predicate.
    ///
    /// # Example
    ///
    /// ```
    /// # use ghcnd::{parse_dly_text, ParseOptions};
    /// use polars::prelude::{col, lit};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let mut line = String::from("USC00050848202208TMAX");
    /// # line.push_str("  339  7  150  7");
    /// # line.push_str(&"-9999   ".repeat(29));
    /// let series = parse_dly_text(&line, &ParseOptions::default())?;
    /// let hot = series.lazy()?.filter(col("tmax").gt(lit(30.0f64)));
    /// assert_eq!(hot.frame.collect()?.height(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> DailyLazyFrame {
        DailyLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps the dates between `start` and `end`, both inclusive.
    ///
    /// Any [`AnyDate`] works as a bound: a `NaiveDate`, a `"YYYY-MM-DD"` string, a
    /// [`crate::Month`] or a [`crate::Year`]. A period used as `start` contributes its
    /// first day, as `end` its last day.
    pub fn get_range(
        &self,
        start: impl AnyDate,
        end: impl AnyDate,
    ) -> Result<DailyLazyFrame, GhcndError> {
        let start_naive = start
            .get_date_range()
            .ok_or(GhcndError::DateParsingError)?
            .start;
        let end_naive = end
            .get_date_range()
            .ok_or(GhcndError::DateParsingError)?
            .end;

        Ok(self.filter(
            col("date")
                .gt_eq(lit(start_naive))
                .and(col("date").lt_eq(lit(end_naive))),
        ))
    }

    /// Keeps the row for a single date (the start of the range if given a period).
    pub fn get_at(&self, date: impl AnyDate) -> Result<DailyLazyFrame, GhcndError> {
        let naive_date = date
            .get_date_range()
            .ok_or(GhcndError::DateParsingError)?
            .start;
        Ok(self.filter(col("date").eq(lit(naive_date))))
    }

    /// Keeps the dates of a period such as a [`crate::Year`] or [`crate::Month`].
    pub fn get_for_period(&self, period: impl DatePeriod) -> Result<DailyLazyFrame, GhcndError> {
        let date_period = period
            .get_date_period()
            .ok_or(GhcndError::DateParsingError)?;
        self.get_range(date_period.start, date_period.end)
    }
}

/// Builds one wide table from several stations.
///
/// Rows are the union of all dates, ascending. Each station contributes
/// `{station_id}_tmax` and `{station_id}_tmin` columns in decimal degrees C, null on
/// dates the station has no entry for or did not observe.
pub fn merge_stations(stations: &[StationObservations]) -> PolarsResult<DataFrame> {
    let dates: Vec<NaiveDate> = stations
        .iter()
        .flat_map(|station| station.iter().map(|obs| obs.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut columns = Vec::with_capacity(1 + stations.len() * 2);
    columns.push(Column::new("date".into(), dates.clone()));

    for station in stations {
        let mut tmax = Vec::with_capacity(dates.len());
        let mut tmin = Vec::with_capacity(dates.len());
        for date in &dates {
            let day = station.get(*date);
            tmax.push(day.and_then(|d| d.tmax_decimal()));
            tmin.push(day.and_then(|d| d.tmin_decimal()));
        }
        let id = station.station_id();
        columns.push(Column::new(format!("{id}_tmax").into(), tmax));
        columns.push(Column::new(format!("{id}_tmin").into(), tmin));
    }

    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::DayObservation;
    use crate::{Month, Year};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn station(id: &str, days: &[(NaiveDate, i32)]) -> StationObservations {
        let observations = days
            .iter()
            .map(|(date, t)| DayObservation {
                date: *date,
                tmax: Some(*t),
                tmin: Some(*t - 100),
            })
            .collect();
        StationObservations::new(id.to_string(), observations).unwrap()
    }

    fn test_frame() -> DailyLazyFrame {
        station(
            "USC00050848",
            &[
                (date(2022, 8, 30), 296),
                (date(2022, 8, 31), 322),
                (date(2022, 9, 1), 287),
                (date(2023, 1, 1), 20),
            ],
        )
        .lazy()
        .unwrap()
    }

    #[test]
    fn test_get_range_inclusive() -> Result<(), Box<dyn std::error::Error>> {
        let df = test_frame()
            .get_range(date(2022, 8, 31), "2022-09-01")?
            .frame
            .collect()?;
        assert_eq!(df.height(), 2);
        Ok(())
    }

    #[test]
    fn test_get_for_period() -> Result<(), Box<dyn std::error::Error>> {
        let df = test_frame().get_for_period(Month(2022, 8))?.frame.collect()?;
        assert_eq!(df.height(), 2);
        let df = test_frame().get_for_period(Year(2023))?.frame.collect()?;
        assert_eq!(df.height(), 1);
        Ok(())
    }

    #[test]
    fn test_get_at() -> Result<(), Box<dyn std::error::Error>> {
        let df = test_frame().get_at(date(2022, 8, 31))?.frame.collect()?;
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("tmax")?.f64()?.get(0), Some(32.2));
        Ok(())
    }

    #[test]
    fn test_unparseable_date_is_an_error() {
        assert!(matches!(
            test_frame().get_at("31/08/2022"),
            Err(GhcndError::DateParsingError)
        ));
    }

    #[test]
    fn test_merge_stations_aligns_dates() -> PolarsResult<()> {
        let boulder = station("USC00050848", &[(date(2022, 8, 1), 339), (date(2022, 8, 3), 316)]);
        let alamosa = station("USW00023061", &[(date(2022, 8, 2), 280)]);

        let df = merge_stations(&[boulder, alamosa])?;
        assert_eq!(df.shape(), (3, 5));
        assert_eq!(
            df.get_column_names(),
            [
                "date",
                "USC00050848_tmax",
                "USC00050848_tmin",
                "USW00023061_tmax",
                "USW00023061_tmin"
            ]
        );
        let boulder_tmax = df.column("USC00050848_tmax")?.f64()?;
        assert_eq!(boulder_tmax.get(0), Some(33.9));
        assert_eq!(boulder_tmax.get(1), None);
        let alamosa_tmin = df.column("USW00023061_tmin")?.f64()?;
        assert_eq!(alamosa_tmin.get(1), Some(18.0));
        Ok(())
    }
}
