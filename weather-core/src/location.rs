use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CITY: &str = "Beijing";

/// Where to ask providers for weather: a coordinate pair or a city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Coordinates { lat: String, lon: String },
    City(String),
}

/// Raw location settings as they come from config/env.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl Location {
    /// Coordinates win when both latitude and longitude are present and
    /// non-empty; otherwise the city name (or [`DEFAULT_CITY`]) is used.
    pub fn resolve(city: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> Self {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        match (non_empty(lat), non_empty(lon)) {
            (Some(lat), Some(lon)) => Location::Coordinates {
                lat: lat.to_string(),
                lon: lon.to_string(),
            },
            _ => {
                let city = non_empty(city).unwrap_or(DEFAULT_CITY);
                Location::City(city.to_string())
            }
        }
    }

    /// Single-string form accepted by providers that take one location
    /// value: `"lat,lon"` or the bare city name.
    pub fn as_query(&self) -> String {
        match self {
            Location::Coordinates { lat, lon } => format!("{lat},{lon}"),
            Location::City(city) => city.clone(),
        }
    }
}

impl From<&LocationConfig> for Location {
    fn from(cfg: &LocationConfig) -> Self {
        Location::resolve(cfg.city.as_deref(), cfg.lat.as_deref(), cfg.lon.as_deref())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates { lat, lon } => write!(f, "({lat}, {lon})"),
            Location::City(city) => f.write_str(city),
        }
    }
}
