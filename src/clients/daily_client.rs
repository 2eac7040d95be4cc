//! Provides the `DailyClient` for requesting GHCN-d daily temperatures as a
//! [`DailyLazyFrame`].
//!
//! The client is obtained via [`Ghcnd::daily()`] and lets the caller pick the data
//! source (a station id or a location) before running the request.

use crate::{DailyLazyFrame, Element, Ghcnd, GhcndError, LatLon};
use bon::bon;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Builder-style entry point for daily data.
///
/// ```no_run
/// use ghcnd::{Ghcnd, GhcndError, LatLon, Year};
///
/// # async fn run() -> Result<(), GhcndError> {
/// let client = Ghcnd::new().await?;
/// let summer = client
///     .daily()
///     .location(LatLon(40.015, -105.2705))
///     .call()
///     .await?
///     .get_range("2022-06-01", "2022-08-31")?
///     .frame
///     .collect()?;
/// # Ok(())
/// # }
/// ```
pub struct DailyClient<'a> {
    client: &'a Ghcnd,
}

#[bon]
impl<'a> DailyClient<'a> {
    pub(crate) fn new(client: &'a Ghcnd) -> Self {
        Self { client }
    }

    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        elements: Option<BTreeSet<Element>>,
        start_date: Option<NaiveDate>,
    ) -> Result<DailyLazyFrame, GhcndError> {
        let observations = self
            .client
            .station_observations()
            .station(station)
            .maybe_elements(elements)
            .maybe_start_date(start_date)
            .call()
            .await?;
        Ok(observations.lazy()?)
    }

    #[builder(start_fn = location)]
    #[doc(hidden)]
    pub async fn build_location(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        elements: Option<BTreeSet<Element>>,
        start_date: Option<NaiveDate>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<DailyLazyFrame, GhcndError> {
        let observations = self
            .client
            .from_location()
            .location(coordinate)
            .maybe_elements(elements)
            .maybe_start_date(start_date)
            .maybe_max_distance_km(max_distance_km)
            .maybe_station_limit(station_limit)
            .call()
            .await?;
        Ok(observations.lazy()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghcnd::tests::offline_client;
    use crate::Month;

    #[tokio::test]
    async fn test_daily_from_station_for_period() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let data = client
            .daily()
            .station("USC00050848")
            .call()
            .await?
            .get_for_period(Month(2022, 9))?
            .frame
            .collect()?;
        assert_eq!(data.height(), 30);
        assert_eq!(data.get_column_names(), ["date", "tmax", "tmin"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_from_station_at_specific_date() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let data = client
            .daily()
            .station("USC00050848")
            .call()
            .await?
            .get_at(NaiveDate::from_ymd_opt(2022, 8, 1).unwrap())?
            .frame
            .collect()?;
        assert_eq!(data.height(), 1);
        assert_eq!(data.column("tmax")?.f64()?.get(0), Some(33.9));
        assert_eq!(data.column("tmin")?.f64()?.get(0), Some(15.6));
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_from_location() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let data = client
            .daily()
            .location(LatLon(40.015, -105.2705))
            .start_date(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap())
            .call()
            .await?
            .frame
            .collect()?;
        assert_eq!(data.height(), 108);
        Ok(())
    }
}
