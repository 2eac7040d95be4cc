//! GHCN-d element codes, the 4-character measurement identifiers found in columns 18-21
//! of every `.dly` record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A GHCN-d measurement type.
///
/// The five "core" elements of the dataset get their own variant; every other code is
/// kept verbatim in [`Element::Other`] so that a desired-element set can name
/// measurements this crate does not interpret yet.
///
/// Only [`Element::Tmax`] and [`Element::Tmin`] populate a [`crate::DayObservation`].
///
/// # Examples
///
/// ```
/// use ghcnd::Element;
///
/// let tmax: Element = "TMAX".parse().unwrap();
/// assert_eq!(tmax, Element::Tmax);
/// assert_eq!(Element::from_code("WT01"), Element::Other("WT01".to_string()));
/// assert_eq!(Element::Prcp.to_string(), "PRCP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Element {
    /// Maximum temperature, tenths of degrees C.
    Tmax,
    /// Minimum temperature, tenths of degrees C.
    Tmin,
    /// Precipitation, tenths of mm.
    Prcp,
    /// Snowfall, mm.
    Snow,
    /// Snow depth, mm.
    Snwd,
    Other(String),
}

impl Element {
    /// Resolves a 4-character element code. Unknown codes become [`Element::Other`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "TMAX" => Element::Tmax,
            "TMIN" => Element::Tmin,
            "PRCP" => Element::Prcp,
            "SNOW" => Element::Snow,
            "SNWD" => Element::Snwd,
            other => Element::Other(other.to_string()),
        }
    }

    /// The code as it appears in a `.dly` record.
    pub fn code(&self) -> &str {
        match self {
            Element::Tmax => "TMAX",
            Element::Tmin => "TMIN",
            Element::Prcp => "PRCP",
            Element::Snow => "SNOW",
            Element::Snwd => "SNWD",
            Element::Other(code) => code,
        }
    }

    /// The elements parsed when nothing else is requested: `TMAX` and `TMIN`.
    pub fn temperatures() -> [Element; 2] {
        [Element::Tmax, Element::Tmin]
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Element {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Element::from_code(s))
    }
}

impl From<String> for Element {
    fn from(code: String) -> Self {
        Element::from_code(&code)
    }
}

impl From<Element> for String {
    fn from(element: Element) -> Self {
        element.code().to_string()
    }
}
