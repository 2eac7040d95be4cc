use crate::stations::error::LocateStationError;
use crate::stations::parser::parse_stations_text;
use crate::types::station::Station;
use bincode::config::{Configuration, Fixint, LittleEndian};
use haversine::{distance, Location as HaversineLocation, Units};
use log::info;
use reqwest::Client;
use rstar::RTree;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const DATA_URL: &str = "https://www1.ncdc.noaa.gov/pub/data/ghcn/daily/ghcnd-stations.txt";
pub(crate) const BINCODE_CACHE_FILE_NAME: &str = "ghcnd_stations.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Spatial index over all GHCN-d stations.
#[derive(Debug, Clone)]
pub struct StationLocator {
    rtree: RTree<Station>,
    by_id: HashMap<String, Station>,
}

impl StationLocator {
    /// Loads the station list from the bincode cache in `cache_dir`, downloading and
    /// caching it first if the cache does not exist yet.
    pub async fn new(cache_dir: &Path) -> Result<Self, LocateStationError> {
        let cache_file = cache_dir.join(BINCODE_CACHE_FILE_NAME);

        let stations = if cache_file.exists() {
            let path_clone = cache_file.clone();
            tokio::task::spawn_blocking(move || Self::get_cached_stations(&path_clone)).await??
        } else {
            info!("Station cache not found. Fetching from URL: {}", DATA_URL);
            let stations = Self::fetch_stations().await?;
            Self::cache_stations(stations.clone(), &cache_file).await?;
            stations
        };

        let locator = Self::from_stations(stations);
        info!("Station index holds {} stations", locator.len());
        Ok(locator)
    }

    pub fn from_stations(stations: Vec<Station>) -> Self {
        let by_id = stations
            .iter()
            .map(|station| (station.id.clone(), station.clone()))
            .collect();
        StationLocator {
            rtree: RTree::bulk_load(stations),
            by_id,
        }
    }

    pub fn get(&self, station_id: &str) -> Option<&Station> {
        self.by_id.get(station_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    fn get_cached_stations(cache_path: &Path) -> Result<Vec<Station>, LocateStationError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| LocateStationError::CacheRead(cache_path.to_path_buf(), e))?;
        let (decoded_stations, _) =
            bincode::serde::decode_from_slice::<Vec<Station>, _>(&bytes, BINCODE_CONFIG).map_err(
                |e| LocateStationError::CacheDecode(cache_path.to_path_buf(), Box::from(e)),
            )?;
        Ok(decoded_stations)
    }

    async fn fetch_stations() -> Result<Vec<Station>, LocateStationError> {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| LocateStationError::NetworkRequest(DATA_URL.to_string(), e))?;
        let response = client
            .get(DATA_URL)
            .send()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(DATA_URL.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => LocateStationError::HttpStatus {
                        url: DATA_URL.to_string(),
                        status,
                        source: e,
                    },
                    None => LocateStationError::NetworkRequest(DATA_URL.to_string(), e),
                });
            }
        };
        let body = response
            .bytes()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(DATA_URL.to_string(), e))?;

        let parse_start = std::time::Instant::now();
        let stations = tokio::task::spawn_blocking(move || {
            let text = String::from_utf8(body.to_vec())?;
            parse_stations_text(&text)
        })
        .await??;
        info!(
            "Parsed {} stations from station list in {:?}",
            stations.len(),
            parse_start.elapsed()
        );
        Ok(stations)
    }

    pub(crate) async fn cache_stations(
        stations: Vec<Station>,
        cache_path: &Path,
    ) -> Result<(), LocateStationError> {
        let bincode_data = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(stations, BINCODE_CONFIG)
                .map_err(|e| LocateStationError::CacheEncode(Box::new(e)))
        })
        .await??;
        tokio::fs::write(&cache_path, &bincode_data)
            .await
            .map_err(|e| LocateStationError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Wrote station cache ({} bytes) to {}",
            bincode_data.len(),
            cache_path.display()
        );
        Ok(())
    }

    /// Finds up to `n_results` stations within `max_distance_km`, closest first.
    ///
    /// The R-tree orders candidates by planar distance in degrees, so a few more
    /// candidates than requested are checked with the haversine distance.
    pub fn query(
        &self,
        latitude: f64,
        longitude: f64,
        n_results: usize,
        max_distance_km: f64,
    ) -> Vec<(Station, f64)> {
        if n_results == 0 {
            return vec![];
        }
        let query_point = [latitude, longitude];
        let candidate_limit = (n_results * 2).max(20);

        let mut stations_with_dist: Vec<(Station, f64)> = self
            .rtree
            .nearest_neighbor_iter(&query_point)
            .take(candidate_limit)
            .filter_map(|station| {
                let dist_km = distance(
                    HaversineLocation {
                        latitude,
                        longitude,
                    },
                    HaversineLocation {
                        latitude: station.location.latitude,
                        longitude: station.location.longitude,
                    },
                    Units::Kilometers,
                );
                (dist_km <= max_distance_km).then(|| (station.to_owned(), dist_km))
            })
            .collect();

        stations_with_dist.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        stations_with_dist.truncate(n_results);
        stations_with_dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::parser::tests::SAMPLE;

    fn locator() -> StationLocator {
        StationLocator::from_stations(parse_stations_text(SAMPLE).unwrap())
    }

    #[test]
    fn test_query_orders_by_distance() {
        // Denver
        let results = locator().query(39.7392, -104.9903, 5, 500.0);
        let ids: Vec<&str> = results.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, ["USC00050848", "USW00023061"]);
        assert!(results[0].1 < results[1].1);
        assert!(results[0].1 > 30.0 && results[0].1 < 50.0);
    }

    #[test]
    fn test_query_limits() {
        let locator = locator();
        assert!(locator.query(39.7392, -104.9903, 0, 500.0).is_empty());
        assert_eq!(locator.query(39.7392, -104.9903, 1, 500.0).len(), 1);
        assert!(locator.query(0.0, 0.0, 5, 100.0).is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let locator = locator();
        assert_eq!(locator.len(), 3);
        assert_eq!(
            locator.get("GME00127786").map(|s| s.name.as_str()),
            Some("BERLIN-TEMPELHOF")
        );
        assert!(locator.get("XXX00000000").is_none());
    }

    #[tokio::test]
    async fn test_loads_from_cache_without_network() -> Result<(), Box<dyn std::error::Error>> {
        let cache_dir = tempfile::tempdir()?;
        let stations = parse_stations_text(SAMPLE)?;
        StationLocator::cache_stations(
            stations.clone(),
            &cache_dir.path().join(BINCODE_CACHE_FILE_NAME),
        )
        .await?;

        let locator = StationLocator::new(cache_dir.path()).await?;
        assert_eq!(locator.len(), stations.len());
        assert_eq!(locator.get("USC00050848"), stations.first());
        Ok(())
    }
}
