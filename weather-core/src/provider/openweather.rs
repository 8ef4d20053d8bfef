use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    location::Location,
    model::WeatherData,
    normalize::{ConditionBucket, local_timestamp},
    provider::{ProviderId, parse_json, require_key, send_for_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANG: &str = "zh_cn";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
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
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<i64>,
    main: Option<String>,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_weather_data(self, timestamp: String) -> Result<WeatherData, FetchError> {
        let weather = self.weather.into_iter().next().ok_or_else(|| FetchError::Shape {
            provider: ProviderId::OpenWeather,
            reason: "empty `weather` list".to_string(),
        })?;

        // `main` is the short group name; fall back to the code bucket without it.
        let condition = match weather.main.filter(|m| !m.is_empty()) {
            Some(main) => main,
            None => ConditionBucket::from_code(weather.id.unwrap_or(-1)).as_str().to_string(),
        };

        Ok(WeatherData {
            timestamp,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            weather_condition: condition,
            weather_description: weather.description,
            wind_speed: self.wind.speed,
            city: self.name,
            country: self.sys.country,
            data_source: ProviderId::OpenWeather.data_source().to_string(),
            precipitation: None,
            uv_index: None,
            cloud_cover: None,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch_current(&self, location: &Location) -> Result<WeatherData, FetchError> {
        let id = self.id();
        let api_key = require_key(id, self.api_key.as_deref())?;

        let mut query: Vec<(&str, &str)> =
            vec![("appid", api_key), ("units", "metric"), ("lang", self.lang.as_str())];
        match location {
            Location::Coordinates { lat, lon } => {
                query.push(("lat", lat.as_str()));
                query.push(("lon", lon.as_str()));
            }
            Location::City(city) => query.push(("q", city.as_str())),
        }

        tracing::debug!(provider = %id, %location, "requesting current weather");
        let body = send_for_body(id, self.http.get(&self.base_url).query(&query)).await?;

        let parsed: OwCurrentResponse = parse_json(id, &body)?;
        parsed.into_weather_data(local_timestamp())
    }
}
