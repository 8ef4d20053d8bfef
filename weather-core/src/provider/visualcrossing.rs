use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
    error::FetchError,
    location::Location,
    model::WeatherData,
    normalize::{
        classify_condition_text, country_from_resolved_address, f64_or_zero, i64_or_zero,
        kmh_to_mps, local_timestamp, str_or_empty,
    },
    provider::{ProviderId, parse_json, require_key, send_for_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: Option<String>, http: Client) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base}/{location}/today`, with the location as a single encoded segment.
    fn request_url(&self, location: &Location) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidUrl {
            provider: ProviderId::VisualCrossing,
            url: self.base_url.clone(),
        };

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(&location.as_query())
            .push("today");

        Ok(url)
    }
}

/// Map a timeline response into [`WeatherData`].
///
/// `currentConditions`, `address` and a non-empty `days` list must be present.
/// Inside `currentConditions` every numeric field defaults to zero.
fn normalize_timeline(payload: &Value, timestamp: String) -> Result<WeatherData, FetchError> {
    let shape = |reason: &str| FetchError::Shape {
        provider: ProviderId::VisualCrossing,
        reason: reason.to_string(),
    };

    let current = payload
        .get("currentConditions")
        .filter(|c| c.as_object().is_some_and(|o| !o.is_empty()))
        .ok_or_else(|| shape("missing `currentConditions`"))?;
    let address = payload
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| shape("missing `address`"))?;
    payload
        .get("days")
        .and_then(Value::as_array)
        .filter(|days| !days.is_empty())
        .ok_or_else(|| shape("missing or empty `days`"))?;

    let conditions = str_or_empty(current, "conditions");
    let resolved = str_or_empty(payload, "resolvedAddress");

    Ok(WeatherData {
        timestamp,
        temperature: f64_or_zero(current, "temp"),
        feels_like: f64_or_zero(current, "feelslike"),
        humidity: i64_or_zero(current, "humidity"),
        pressure: f64_or_zero(current, "pressure"),
        weather_condition: conditions.to_string(),
        weather_description: classify_condition_text(conditions),
        wind_speed: kmh_to_mps(f64_or_zero(current, "windspeed")),
        city: address.to_string(),
        country: country_from_resolved_address(resolved),
        data_source: ProviderId::VisualCrossing.data_source().to_string(),
        precipitation: Some(f64_or_zero(current, "precip")),
        uv_index: Some(f64_or_zero(current, "uvindex")),
        cloud_cover: Some(i64_or_zero(current, "cloudcover")),
    })
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::VisualCrossing
    }

    async fn fetch_current(&self, location: &Location) -> Result<WeatherData, FetchError> {
        let id = self.id();
        let api_key = require_key(id, self.api_key.as_deref())?;
        let url = self.request_url(location)?;

        tracing::debug!(provider = %id, %location, "requesting current weather");
        let request = self.http.get(url).query(&[
            ("unitGroup", "metric"),
            ("include", "current"),
            ("key", api_key),
            ("contentType", "json"),
        ]);
        let body = send_for_body(id, request).await?;

        let payload: Value = parse_json(id, &body)?;
        normalize_timeline(&payload, local_timestamp())
    }
}
