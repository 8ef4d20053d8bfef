//! Unit conversions and field mapping helpers shared by the providers.

use chrono::Local;
use serde_json::Value;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn local_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Coarse weather classification shared by code- and text-based providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionBucket {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Fog,
    Clear,
    Cloudy,
    Unknown,
}

impl ConditionBucket {
    /// Bucket an OpenWeatherMap-style numeric condition code.
    pub fn from_code(code: i64) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Fog,
            800 => Self::Clear,
            801..=899 => Self::Cloudy,
            _ => Self::Unknown,
        }
    }

    /// Bucket free text by keyword; `None` when no keyword matches.
    pub fn from_text(text: &str) -> Option<Self> {
        const KEYWORDS: &[(&[&str], ConditionBucket)] = &[
            (&["rain"], ConditionBucket::Rain),
            (&["snow"], ConditionBucket::Snow),
            (&["cloud", "overcast"], ConditionBucket::Cloudy),
            (&["clear", "sunny"], ConditionBucket::Clear),
            (&["fog", "mist"], ConditionBucket::Fog),
            (&["thunder", "storm"], ConditionBucket::Thunderstorm),
        ];

        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
            .map(|(_, bucket)| *bucket)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Unknown => "unknown",
        }
    }
}

/// Keyword bucket for `text`, or the text itself when nothing matches.
pub fn classify_condition_text(text: &str) -> String {
    match ConditionBucket::from_text(text) {
        Some(bucket) => bucket.as_str().to_string(),
        None => text.to_string(),
    }
}

/// Country label from a combined address such as `"Beijing, Beijing, China"`.
pub fn country_from_resolved_address(address: &str) -> String {
    match address.rsplit_once(',') {
        Some((_, country)) => country.trim().to_string(),
        None => String::new(),
    }
}

/// Numeric field of a JSON object, or `0.0` when absent or not a number.
pub fn f64_or_zero(obj: &Value, key: &str) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Integer field of a JSON object, or `0`. Fractional values are truncated.
pub fn i64_or_zero(obj: &Value, key: &str) -> i64 {
    match obj.get(key) {
        Some(v) => v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)).unwrap_or(0),
        None => 0,
    }
}

pub fn str_or_empty<'a>(obj: &'a Value, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or("")
}
