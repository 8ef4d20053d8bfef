use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    location::Location,
    model::WeatherData,
    normalize::{kmh_to_mps, local_timestamp},
    provider::{ProviderId, parse_json, require_key, send_for_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";
pub const DEFAULT_LANG: &str = "zh";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    lang: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: Option<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: i64,
    pressure_mb: f64,
    wind_kph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl WaResponse {
    fn into_weather_data(self, timestamp: String) -> WeatherData {
        let WaResponse { location, current } = self;

        WeatherData {
            timestamp,
            temperature: current.temp_c,
            feels_like: current.feelslike_c,
            humidity: current.humidity,
            pressure: current.pressure_mb,
            weather_condition: current.condition.text.clone(),
            weather_description: current.condition.text,
            wind_speed: kmh_to_mps(current.wind_kph),
            city: location.name,
            country: location.country,
            data_source: ProviderId::WeatherApi.data_source().to_string(),
            precipitation: None,
            uv_index: None,
            cloud_cover: None,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn fetch_current(&self, location: &Location) -> Result<WeatherData, FetchError> {
        let id = self.id();
        let api_key = require_key(id, self.api_key.as_deref())?;
        // WeatherAPI takes one `q` value: a city name or "lat,lon".
        let q = location.as_query();

        tracing::debug!(provider = %id, %location, "requesting current weather");
        let request = self.http.get(&self.base_url).query(&[
            ("key", api_key),
            ("q", q.as_str()),
            ("aqi", "no"),
            ("lang", self.lang.as_str()),
        ]);
        let body = send_for_body(id, request).await?;

        let parsed: WaResponse = parse_json(id, &body)?;
        Ok(parsed.into_weather_data(local_timestamp()))
    }
}
