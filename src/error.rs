use crate::dly::error::DlyParseError;
use crate::station_data::error::StationDataError;
use crate::stations::error::LocateStationError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhcndError {
    #[error(transparent)]
    Parse(#[from] DlyParseError),

    #[error(transparent)]
    StationData(#[from] StationDataError),

    #[error(transparent)]
    LocateStation(#[from] LocateStationError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("No stations found within {radius} km of ({lat}, {lon})")]
    NoStationWithinRadius { radius: f64, lat: f64, lon: f64 },

    #[error("No data found for any of the {stations_tried} stations within {radius} km of ({lat}, {lon})")]
    NoDataFoundForNearbyStations {
        radius: f64,
        lat: f64,
        lon: f64,
        stations_tried: usize,
        #[source]
        last_error: Option<Box<GhcndError>>,
    },

    #[error("Could not resolve the given value to a date")]
    DateParsingError,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl GhcndError {
    /// True when a station was reachable but has no observations for the request.
    pub fn is_empty_result(&self) -> bool {
        match self {
            GhcndError::Parse(e) => e.is_empty_result(),
            GhcndError::StationData(e) => e.is_empty_result(),
            _ => false,
        }
    }
}
