use crate::station_data::error::StationDataError;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

const DATA_URL: &str = "https://www1.ncdc.noaa.gov/pub/data/ghcn/daily/all";
const DLY_CACHE_DIR_NAME: &str = "dly";
const STATION_ID_LEN: usize = 11;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// GHCN-d publishes updated files daily.
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Rejects anything that is not an 11 character alphanumeric id before it ends up in
/// a URL or file name.
pub fn validate_station_id(station: &str) -> Result<(), StationDataError> {
    if station.len() == STATION_ID_LEN && station.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(StationDataError::InvalidStationId(station.to_string()))
    }
}

/// Downloads raw `.dly` files and keeps them in `{cache_dir}/dly/{station}.dly`.
pub struct DlyLoader {
    dly_dir: PathBuf,
    max_cache_age: Duration,
    download_client: Client,
}

impl DlyLoader {
    pub fn new(cache_dir: &Path, max_cache_age: Duration) -> DlyLoader {
        DlyLoader {
            dly_dir: cache_dir.join(DLY_CACHE_DIR_NAME),
            max_cache_age,
            download_client: Client::new(),
        }
    }

    pub fn cache_path(&self, station: &str) -> PathBuf {
        self.dly_dir.join(format!("{station}.dly"))
    }

    /// Returns the text of the station's `.dly` file, downloading it when the cached
    /// copy is missing or older than the maximum cache age.
    pub async fn get_text(&self, station: &str) -> Result<String, StationDataError> {
        validate_station_id(station)?;
        let dly_path = self.cache_path(station);

        if self.is_fresh(&dly_path).await? {
            info!("Cache hit for station {} at {:?}", station, dly_path);
        } else {
            warn!(
                "Cache miss or stale cache for station {}. Downloading.",
                station
            );
            let bytes = self.download(station).await?;
            fs::create_dir_all(&self.dly_dir)
                .await
                .map_err(|e| StationDataError::CacheDirCreation(self.dly_dir.clone(), e))?;
            Self::cache_file(bytes, &self.dly_dir, &dly_path).await?;
            info!("Cached data for station {} to {:?}", station, dly_path);
        }

        fs::read_to_string(&dly_path)
            .await
            .map_err(|e| StationDataError::CacheRead(dly_path, e))
    }

    /// Removes the cached `.dly` file of a station. A missing file is not an error.
    pub async fn clear_cache(&self, station: &str) -> Result<(), StationDataError> {
        validate_station_id(station)?;
        let dly_path = self.cache_path(station);
        match fs::remove_file(&dly_path).await {
            Ok(()) => {
                info!("Removed cached file {:?}", dly_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StationDataError::CacheDeletion(dly_path, e)),
        }
    }

    async fn is_fresh(&self, path: &Path) -> Result<bool, StationDataError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StationDataError::CacheMetadataRead(path.to_path_buf(), e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| StationDataError::CacheMetadataRead(path.to_path_buf(), e))?;
        let age = SystemTime::now()
            .duration_since(modified)
            .map_err(|e| StationDataError::SystemTimeCalculation(path.to_path_buf(), e))?;
        Ok(age < self.max_cache_age)
    }

    async fn download(&self, station: &str) -> Result<Vec<u8>, StationDataError> {
        let url = format!("{DATA_URL}/{station}.dly");
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(&url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| StationDataError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(status) => StationDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => StationDataError::NetworkRequest(url, e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut stream_reader = StreamReader::new(stream);
        let mut bytes = Vec::new();
        stream_reader.read_to_end(&mut bytes).await?;
        info!(
            "Downloaded {} bytes for station {}",
            bytes.len(),
            station
        );
        Ok(bytes)
    }

    /// Writes to a temp file next to the target and renames it into place.
    async fn cache_file(bytes: Vec<u8>, dir: &Path, path: &Path) -> Result<(), StationDataError> {
        let dir = dir.to_path_buf();
        let path = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new_in(&dir)
                .map_err(|e| StationDataError::CacheWrite(path.clone(), e))?;
            temp_file
                .write_all(&bytes)
                .and_then(|_| temp_file.flush())
                .map_err(|e| StationDataError::CacheWrite(path.clone(), e))?;
            temp_file
                .persist(&path)
                .map_err(|e| StationDataError::CacheWrite(path.clone(), e.error))?;
            Ok::<(), StationDataError>(())
        })
        .await??;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURE: &str = include_str!("../../data/test_daily.dly");
    pub(crate) const STATION: &str = "USC00050848";

    /// Puts a `.dly` file where [`DlyLoader`] looks for it.
    pub(crate) fn seed_dly(cache_dir: &Path, station: &str, text: &str) {
        let dly_dir = cache_dir.join(DLY_CACHE_DIR_NAME);
        std::fs::create_dir_all(&dly_dir).unwrap();
        std::fs::write(dly_dir.join(format!("{station}.dly")), text).unwrap();
    }

    #[test]
    fn test_validate_station_id() {
        assert!(validate_station_id("USC00050848").is_ok());
        assert!(validate_station_id("GME00127786").is_ok());
        for bad in ["", "USC0005084", "USC000508489", "../../etc/x", "USC0005084 ", "USC00050é4"] {
            assert!(
                matches!(
                    validate_station_id(bad),
                    Err(StationDataError::InvalidStationId(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_is_used() -> Result<(), StationDataError> {
        let cache_dir = tempfile::tempdir()?;
        seed_dly(cache_dir.path(), STATION, FIXTURE);

        let loader = DlyLoader::new(cache_dir.path(), DEFAULT_MAX_CACHE_AGE);
        let text = loader.get_text(STATION).await?;
        assert_eq!(text, FIXTURE);
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_freshness() -> Result<(), StationDataError> {
        let cache_dir = tempfile::tempdir()?;
        seed_dly(cache_dir.path(), STATION, FIXTURE);

        let loader = DlyLoader::new(cache_dir.path(), Duration::from_secs(3600));
        assert!(loader.is_fresh(&loader.cache_path(STATION)).await?);
        assert!(!loader.is_fresh(&loader.cache_path("USW00023061")).await?);

        let always_stale = DlyLoader::new(cache_dir.path(), Duration::ZERO);
        assert!(!always_stale.is_fresh(&always_stale.cache_path(STATION)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_id_never_touches_disk() {
        let cache_dir = tempfile::tempdir().unwrap();
        let loader = DlyLoader::new(cache_dir.path(), DEFAULT_MAX_CACHE_AGE);
        assert!(matches!(
            loader.get_text("../secret").await,
            Err(StationDataError::InvalidStationId(_))
        ));
        assert!(!cache_dir.path().join(DLY_CACHE_DIR_NAME).exists());
    }

    #[tokio::test]
    async fn test_clear_cache() -> Result<(), StationDataError> {
        let cache_dir = tempfile::tempdir()?;
        seed_dly(cache_dir.path(), STATION, FIXTURE);
        let loader = DlyLoader::new(cache_dir.path(), DEFAULT_MAX_CACHE_AGE);

        loader.clear_cache(STATION).await?;
        assert!(!loader.cache_path(STATION).exists());
        // Nothing left to remove.
        loader.clear_cache(STATION).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_file_replaces_existing() -> Result<(), StationDataError> {
        let cache_dir = tempfile::tempdir()?;
        seed_dly(cache_dir.path(), STATION, "old");
        let loader = DlyLoader::new(cache_dir.path(), DEFAULT_MAX_CACHE_AGE);

        let path = loader.cache_path(STATION);
        DlyLoader::cache_file(FIXTURE.as_bytes().to_vec(), &loader.dly_dir, &path).await?;
        assert_eq!(std::fs::read_to_string(&path)?, FIXTURE);
        assert_eq!(std::fs::read_dir(&loader.dly_dir)?.count(), 1);
        Ok(())
    }
}
