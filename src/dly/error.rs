use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DlyParseError {
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number within the parsed text.
        line: usize,
        reason: MalformedReason,
    },

    #[error("No observations remain for station '{station_id}' after filtering and trimming")]
    NoObservations { station_id: String },

    #[error("Input contains no records to infer a station id from")]
    NoRecords,

    #[error("Failed to read .dly file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Observation series for station '{station_id}' is invalid: {message}")]
    InvalidSeries { station_id: String, message: String },

    #[error("Failed to write observations to '{0}'")]
    JsonWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read observations from '{0}'")]
    JsonRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to (de)serialize observations as JSON")]
    Json(#[from] serde_json::Error),
}

impl DlyParseError {
    /// `true` for the errors meaning "parsing succeeded but produced nothing usable".
    ///
    /// Callers must not treat these as a valid, zero-length series.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            DlyParseError::NoObservations { .. } | DlyParseError::NoRecords
        )
    }
}

/// Why a single `.dly` line could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("record is {found} characters long, expected at least {expected}")]
    TooShort { expected: usize, found: usize },

    #[error("{field} field '{raw}' is not a valid integer")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("value for day {day} '{raw}' is not a valid integer")]
    InvalidValue { day: u32, raw: String },

    #[error("month {0} is out of range")]
    MonthOutOfRange(u32),

    #[error("{0} field contains non-ASCII characters")]
    NonAscii(&'static str),
}
