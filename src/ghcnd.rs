//! The main entry point: a [`Ghcnd`] client that owns the cache folder, the station
//! index and the parsed-series memo.

use crate::clients::daily_client::DailyClient;
use crate::dly::parser::ParseOptions;
use crate::error::GhcndError;
use crate::station_data::fetcher::ObservationFetcher;
use crate::station_data::loader::DEFAULT_MAX_CACHE_AGE;
use crate::stations::locate_station::StationLocator;
use crate::types::element::Element;
use crate::types::observation::StationObservations;
use crate::types::station::Station;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::NaiveDate;
use futures_util::future::try_join_all;
use log::warn;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Represents a geographical coordinate using latitude and longitude.
///
/// # Examples
///
/// ```
/// use ghcnd::LatLon;
///
/// let boulder = LatLon(40.015, -105.2705);
/// assert_eq!(boulder.0, 40.015); // Latitude
/// assert_eq!(boulder.1, -105.2705); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Client for GHCN-d station data.
///
/// Station metadata and raw `.dly` files are cached on disk. Parsed series are kept in
/// memory per station and [`ParseOptions`], so repeated requests are cheap. That
/// memory is held for the lifetime of the client; [`Ghcnd::clear_cache`] releases the
/// series of one station.
///
/// ```no_run
/// use ghcnd::{Ghcnd, GhcndError, LatLon};
///
/// # async fn run() -> Result<(), GhcndError> {
/// let client = Ghcnd::new().await?;
/// let series = client
///     .station_observations()
///     .station("USC00050848")
///     .call()
///     .await?;
/// println!("{} days since {}", series.len(), series.start_date());
///
/// let nearby = client
///     .find_stations()
///     .location(LatLon(40.015, -105.2705))
///     .call()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Ghcnd {
    cache_folder: PathBuf,
    fetcher: ObservationFetcher,
    station_locator: StationLocator,
}

#[bon]
impl Ghcnd {
    /// Creates a client using `cache_folder` for all cached files, creating it if needed.
    /// The station list is downloaded on first use of a folder.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, GhcndError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| GhcndError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            station_locator: StationLocator::new(&cache_folder).await?,
            fetcher: ObservationFetcher::new(&cache_folder, DEFAULT_MAX_CACHE_AGE),
            cache_folder,
        })
    }

    /// Creates a client that caches in `ghcnd_rs_cache` inside the platform cache dir.
    pub async fn new() -> Result<Self, GhcndError> {
        let cache_folder = get_cache_dir().map_err(GhcndError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Sets how old a cached `.dly` file may be before it is downloaded again
    /// (24 hours by default).
    pub fn with_max_cache_age(mut self, max_cache_age: Duration) -> Self {
        self.fetcher = ObservationFetcher::new(&self.cache_folder, max_cache_age);
        self
    }

    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    /// Looks up station metadata by id.
    pub fn get_station(&self, station_id: &str) -> Option<&Station> {
        self.station_locator.get(station_id)
    }

    /// Finds the stations closest to `location`, nearest first.
    ///
    /// Defaults: `max_distance_km` 50.0, `station_limit` 5.
    #[builder]
    pub async fn find_stations(
        &self,
        location: LatLon,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<Vec<Station>, GhcndError> {
        let max_distance_km = max_distance_km.unwrap_or(50.0);
        let station_limit = station_limit.unwrap_or(5);

        Ok(self
            .station_locator
            .query(location.0, location.1, station_limit, max_distance_km)
            .into_iter()
            .map(|(station, _distance)| station)
            .collect())
    }

    /// Parsed daily temperatures for one station.
    ///
    /// `elements` defaults to TMAX and TMIN, `start_date` to 2015-01-01.
    #[builder]
    pub async fn station_observations(
        &self,
        station: &str,
        elements: Option<BTreeSet<Element>>,
        start_date: Option<NaiveDate>,
    ) -> Result<Arc<StationObservations>, GhcndError> {
        let options = ParseOptions::builder()
            .maybe_elements(elements)
            .maybe_start_date(start_date)
            .build();
        Ok(self.fetcher.get_observations(station, &options).await?)
    }

    /// Parsed series for several stations, fetched concurrently. Fails on the first
    /// station that fails; the order of the result matches `stations`.
    pub async fn stations_observations<S: AsRef<str>>(
        &self,
        stations: &[S],
        options: &ParseOptions,
    ) -> Result<Vec<Arc<StationObservations>>, GhcndError> {
        let results = try_join_all(
            stations
                .iter()
                .map(|station| self.fetcher.get_observations(station.as_ref(), options)),
        )
        .await?;
        Ok(results)
    }

    /// The series of the nearest station around `location` that has data.
    ///
    /// Up to `station_limit` candidates (default 5) within `max_distance_km` (default
    /// 50.0) are tried in order of distance. Many GHCN-d stations only report
    /// precipitation, so the nearest one is not always usable.
    #[builder]
    pub async fn from_location(
        &self,
        location: LatLon,
        elements: Option<BTreeSet<Element>>,
        start_date: Option<NaiveDate>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<Arc<StationObservations>, GhcndError> {
        let max_distance_km = max_distance_km.unwrap_or(50.0);
        let station_limit = station_limit.unwrap_or(5);

        let stations =
            self.station_locator
                .query(location.0, location.1, station_limit, max_distance_km);
        if stations.is_empty() {
            return Err(GhcndError::NoStationWithinRadius {
                radius: max_distance_km,
                lat: location.0,
                lon: location.1,
            });
        }

        let options = ParseOptions::builder()
            .maybe_elements(elements)
            .maybe_start_date(start_date)
            .build();
        let mut last_error: Option<GhcndError> = None;

        for (station, distance) in stations.iter() {
            match self.fetcher.get_observations(&station.id, &options).await {
                Ok(observations) => return Ok(observations),
                Err(e) => {
                    warn!(
                        "No usable data for station {} ({:.1} km away): {}",
                        station.id, distance, e
                    );
                    last_error = Some(GhcndError::from(e));
                }
            }
        }

        Err(GhcndError::NoDataFoundForNearbyStations {
            radius: max_distance_km,
            lat: location.0,
            lon: location.1,
            stations_tried: stations.len(),
            last_error: last_error.map(Box::new),
        })
    }

    /// Forgets the parsed series of a station and removes its cached `.dly` file.
    pub async fn clear_cache(&self, station: &str) -> Result<(), GhcndError> {
        Ok(self.fetcher.clear_cache(station).await?)
    }

    /// Entry point for daily data as a Polars [`crate::DailyLazyFrame`].
    pub fn daily(&self) -> DailyClient<'_> {
        DailyClient::new(self)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dly::line::tests::dly_line;
    use crate::station_data::loader::tests::{seed_dly, FIXTURE, STATION};
    use crate::stations::locate_station::BINCODE_CACHE_FILE_NAME;
    use crate::stations::parser::parse_stations_text;
    use crate::stations::parser::tests::SAMPLE;
    use tempfile::TempDir;

    pub(crate) const ALAMOSA: &str = "USW00023061";
    pub(crate) const BERLIN: &str = "GME00127786";

    /// A client whose cache already holds the station list and some `.dly` files:
    /// Boulder has the fixture, Alamosa and Berlin only report precipitation.
    pub(crate) async fn offline_client() -> (TempDir, Ghcnd) {
        let cache_dir = tempfile::tempdir().unwrap();
        StationLocator::cache_stations(
            parse_stations_text(SAMPLE).unwrap(),
            &cache_dir.path().join(BINCODE_CACHE_FILE_NAME),
        )
        .await
        .unwrap();
        seed_dly(cache_dir.path(), STATION, FIXTURE);
        for station in [ALAMOSA, BERLIN] {
            seed_dly(
                cache_dir.path(),
                station,
                &dly_line(station, 2022, 8, "PRCP", &[Some(0), Some(25)]),
            );
        }

        let client = Ghcnd::with_cache_folder(cache_dir.path().to_path_buf())
            .await
            .unwrap();
        (cache_dir, client)
    }

    #[tokio::test]
    async fn test_station_observations() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let series = client
            .station_observations()
            .station(STATION)
            .call()
            .await?;
        assert_eq!(series.station_id(), STATION);
        assert_eq!(series.len(), 77);

        let since_2014 = client
            .station_observations()
            .station(STATION)
            .start_date(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap())
            .call()
            .await?;
        assert_eq!(since_2014.len(), 108);
        Ok(())
    }

    #[tokio::test]
    async fn test_stations_observations_keeps_order() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let results = client
            .stations_observations(&[STATION, STATION], &ParseOptions::default())
            .await?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].observations(), results[1].observations());

        let err = client
            .stations_observations(&[STATION, ALAMOSA], &ParseOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_empty_result());
        Ok(())
    }

    #[tokio::test]
    async fn test_find_stations() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        let stations = client
            .find_stations()
            .location(LatLon(40.015, -105.2705))
            .call()
            .await?;
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, [STATION]);

        let stations = client
            .find_stations()
            .location(LatLon(40.015, -105.2705))
            .max_distance_km(1000.0)
            .station_limit(1)
            .call()
            .await?;
        assert_eq!(stations.len(), 1);

        assert_eq!(
            client.get_station(BERLIN).map(|s| s.name.as_str()),
            Some("BERLIN-TEMPELHOF")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_from_location_skips_stations_without_temperatures() -> Result<(), GhcndError> {
        let (_dir, client) = offline_client().await;
        // Alamosa is closest but only has precipitation.
        let series = client
            .from_location()
            .location(LatLon(37.4389, -105.8611))
            .max_distance_km(500.0)
            .call()
            .await?;
        assert_eq!(series.station_id(), STATION);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_location_errors() {
        let (_dir, client) = offline_client().await;

        let err = client
            .from_location()
            .location(LatLon(0.0, 0.0))
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, GhcndError::NoStationWithinRadius { .. }));

        let err = client
            .from_location()
            .location(LatLon(52.52, 13.40))
            .call()
            .await
            .unwrap_err();
        match err {
            GhcndError::NoDataFoundForNearbyStations {
                stations_tried,
                last_error: Some(last_error),
                ..
            } => {
                assert_eq!(stations_tried, 1);
                assert!(last_error.is_empty_result());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_station_id() {
        let (_dir, client) = offline_client().await;
        let err = client
            .station_observations()
            .station("not-an-id")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GhcndError::StationData(crate::StationDataError::InvalidStationId(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_cache() -> Result<(), GhcndError> {
        let (dir, client) = offline_client().await;
        client.clear_cache(STATION).await?;
        assert!(!dir.path().join("dly").join(format!("{STATION}.dly")).exists());
        Ok(())
    }
}
