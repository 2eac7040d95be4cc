use crate::dly::parser::{parse_dly_text, ParseOptions};
use crate::station_data::error::StationDataError;
use crate::station_data::loader::DlyLoader;
use crate::types::observation::StationObservations;
use log::info;
use std::collections::{hash_map::Entry, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task;

type MemoKey = (String, ParseOptions);

/// Parses station files on demand and remembers the result per station and options.
///
/// Entries are never evicted; [`ObservationFetcher::clear_cache`] drops those of one station.
pub struct ObservationFetcher {
    loader: DlyLoader,
    observation_cache: Mutex<HashMap<MemoKey, Arc<StationObservations>>>,
}

impl ObservationFetcher {
    pub fn new(cache_dir: &Path, max_cache_age: Duration) -> Self {
        Self {
            loader: DlyLoader::new(cache_dir, max_cache_age),
            observation_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &DlyLoader {
        &self.loader
    }

    pub async fn get_observations(
        &self,
        station: &str,
        options: &ParseOptions,
    ) -> Result<Arc<StationObservations>, StationDataError> {
        let key = (station.to_string(), options.clone());

        {
            let cache = self.observation_cache.lock().await;
            if let Some(cached) = cache.get(&key) {
                return Ok(Arc::clone(cached));
            }
        }

        // Load outside the lock; other stations must not wait on this download.
        let text = self.loader.get_text(station).await?;
        let parse_options = options.clone();
        let parsed = task::spawn_blocking(move || parse_dly_text(&text, &parse_options))
            .await?
            .map_err(|source| StationDataError::Parse {
                station: station.to_string(),
                source,
            })?;
        info!(
            "Parsed {} days for station {} ({} to {})",
            parsed.len(),
            station,
            parsed.start_date(),
            parsed.end_date()
        );
        let parsed = Arc::new(parsed);

        let mut cache = self.observation_cache.lock().await;
        match cache.entry(key) {
            // Another task finished loading the same key first.
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&parsed));
                Ok(parsed)
            }
        }
    }

    /// Forgets the parsed series of a station and deletes its cached file.
    pub async fn clear_cache(&self, station: &str) -> Result<(), StationDataError> {
        self.observation_cache
            .lock()
            .await
            .retain(|(cached_station, _), _| cached_station != station);
        self.loader.clear_cache(station).await
    }
}
