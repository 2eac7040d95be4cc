//! Reader and client for GHCN-Daily (`.dly`) station files.
//!
//! The core is [`parse_dly_text`], which turns the fixed-width monthly records of a
//! `.dly` file into one [`DayObservation`] per day. The [`Ghcnd`] client adds station
//! lookup by location, a download cache and Polars frames on top.

mod clients;
mod dly;
mod error;
mod ghcnd;
mod station_data;
mod stations;
mod types;
mod utils;

pub use error::GhcndError;
pub use ghcnd::*;

pub use clients::daily_client::*;

pub use dly::error::{DlyParseError, MalformedReason};
pub use dly::line::{decode_line, LineRecord, MISSING_VALUE, RECORD_WIDTH};
pub use dly::parser::{parse_dly_text, read_dly_file, ParseOptions, DEFAULT_START_DATE};

pub use types::daily_frame::{merge_stations, DailyLazyFrame};
pub use types::element::Element;
pub use types::observation::{DayObservation, StationObservations};
pub use types::station::*;

pub use types::traits::any_date::AnyDate;
pub use types::traits::date_period::DatePeriod;
pub use types::traits::types::{Month, StartEndDate, Year};
pub use types::traits::utils::days_in_month;

pub use station_data::error::StationDataError;
pub use station_data::loader::{validate_station_id, DEFAULT_MAX_CACHE_AGE};
pub use stations::error::LocateStationError;
