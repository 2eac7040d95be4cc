//! Parser for the fixed-width `ghcnd-stations.txt` station list.
//!
//! ```text
//! ------------------------------
//! Variable   Columns   Type
//! ------------------------------
//! ID            1-11   Character
//! LATITUDE     13-20   Real
//! LONGITUDE    22-30   Real
//! ELEVATION    32-37   Real
//! STATE        39-40   Character
//! NAME         42-71   Character
//! GSN FLAG     73-75   Character
//! HCN/CRN FLAG 77-79   Character
//! WMO ID       81-85   Character
//! ------------------------------
//! ```
//!
//! Trailing columns are frequently blank and may be stripped, so every column after
//! the longitude is optional.

use crate::stations::error::LocateStationError;
use crate::types::station::{Location, Network, Station};
use std::ops::Range;

const ID: Range<usize> = 0..11;
const LATITUDE: Range<usize> = 12..20;
const LONGITUDE: Range<usize> = 21..30;
const ELEVATION: Range<usize> = 31..37;
const STATE: Range<usize> = 38..40;
const NAME: Range<usize> = 41..71;
const GSN_FLAG: Range<usize> = 72..75;
const NETWORK_FLAG: Range<usize> = 76..79;
const WMO_ID: Range<usize> = 80..85;

/// Elevation value used for "unknown".
const MISSING_ELEVATION: f64 = -999.9;

pub(crate) fn parse_stations_text(text: &str) -> Result<Vec<Station>, LocateStationError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_station_line(line).map_err(|message| LocateStationError::MalformedStation {
                line: idx + 1,
                message,
            })
        })
        .collect()
}

fn parse_station_line(line: &str) -> Result<Station, String> {
    let id = field(line, ID);
    if id.len() != ID.len() {
        return Err(format!("station id '{id}' is not {} characters", ID.len()));
    }
    let latitude = parse_coordinate(line, LATITUDE, "latitude")?;
    let longitude = parse_coordinate(line, LONGITUDE, "longitude")?;
    let elevation = match field(line, ELEVATION) {
        "" => None,
        raw => {
            let value: f64 = raw
                .parse()
                .map_err(|_| format!("invalid elevation '{raw}'"))?;
            (value != MISSING_ELEVATION).then_some(value)
        }
    };

    Ok(Station {
        id: id.to_string(),
        location: Location {
            latitude,
            longitude,
            elevation,
        },
        state: non_empty(field(line, STATE)),
        name: field(line, NAME).to_string(),
        gsn: field(line, GSN_FLAG) == "GSN",
        network: match field(line, NETWORK_FLAG) {
            "HCN" => Some(Network::Hcn),
            "CRN" => Some(Network::Crn),
            _ => None,
        },
        wmo_id: non_empty(field(line, WMO_ID)),
    })
}

fn parse_coordinate(line: &str, range: Range<usize>, name: &str) -> Result<f64, String> {
    let raw = field(line, range);
    raw.parse().map_err(|_| format!("invalid {name} '{raw}'"))
}

/// The trimmed column, or "" when the line ends before it.
fn field(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start..end).unwrap_or_default().trim()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
