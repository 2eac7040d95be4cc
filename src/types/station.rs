//! GHCN-d station metadata as listed in `ghcnd-stations.txt`, plus the `rstar`
//! implementations used for spatial lookups.

use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// A single GHCN-d weather station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The 11-character GHCN-d station identifier (e.g. "USC00050848").
    pub id: String,
    /// Geographical location details.
    pub location: Location,
    /// U.S. postal code of the state or Canadian province, if any.
    pub state: Option<String>,
    pub name: String,
    /// Whether the station is part of the GCOS Surface Network.
    pub gsn: bool,
    /// Network flag from the HCN/CRN column.
    pub network: Option<Network>,
    /// World Meteorological Organization (WMO) identifier, if available.
    pub wmo_id: Option<String>,
}

impl Station {
    /// The country code prefix of the id (FIPS, e.g. "US").
    pub fn country_code(&self) -> &str {
        self.id.get(..2).unwrap_or_default()
    }
}

/// The U.S. networks a station can belong to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// U.S. Historical Climatology Network.
    Hcn,
    /// U.S. Climate Reference Network or Regional Climate Reference Network.
    Crn,
}

/// Represents the geographical location of a weather station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters, if available.
    pub elevation: Option<f64>,
}

// --- R-Tree Implementations ---

impl RTreeObject for Station {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.latitude, self.location.longitude])
    }
}

impl PointDistance for Station {
    /// Squared Euclidean distance in degrees. Only used to order R-tree candidates;
    /// real distances are computed with haversine afterwards.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.latitude - point[0];
        let dy = self.location.longitude - point[1];
        dx * dx + dy * dy
    }
}
