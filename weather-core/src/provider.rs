use crate::{
    Config, FetchError, Location, WeatherData,
    provider::{
        openweather::OpenWeatherProvider, visualcrossing::VisualCrossingProvider,
        weatherapi::WeatherApiProvider,
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openweather;
pub mod visualcrossing;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
    VisualCrossing,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::VisualCrossing => "visualcrossing",
        }
    }

    /// Value written to `WeatherData::data_source`.
    pub fn data_source(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OpenWeatherMap",
            ProviderId::WeatherApi => "WeatherAPI",
            ProviderId::VisualCrossing => "VisualCrossing",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_KEY",
            ProviderId::VisualCrossing => "VISUALCROSSING_KEY",
        }
    }

    /// File name of the provider's CSV store.
    pub fn csv_file_name(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweathermap_data.csv",
            ProviderId::WeatherApi => "weatherapi_data.csv",
            ProviderId::VisualCrossing => "visualcrossing_data.csv",
        }
    }

    /// All providers, in crawl order.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi, ProviderId::VisualCrossing]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" | "openweathermap" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "visualcrossing" => Ok(ProviderId::VisualCrossing),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi, visualcrossing."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// One GET against the provider, normalized into [`WeatherData`].
    async fn fetch_current(&self, location: &Location) -> Result<WeatherData, FetchError>;

    /// Like [`WeatherProvider::fetch_current`], but failures are logged and
    /// turned into `None`.
    async fn current_weather(&self, location: &Location) -> Option<WeatherData> {
        match self.fetch_current(location).await {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::error!(provider = %self.id(), error = %err, "failed to fetch current weather");
                None
            }
        }
    }
}

/// HTTP client shared by all providers. No retries; `timeout` bounds each request.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("weather-crawler/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Construct a provider from config. A missing API key is not an error here;
/// the provider reports it when asked to fetch.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Client,
) -> Box<dyn WeatherProvider> {
    let api_key = config.provider_api_key(id).map(str::to_owned);
    let overrides = config.provider_config(id).cloned().unwrap_or_default();

    match id {
        ProviderId::OpenWeather => {
            let mut p = OpenWeatherProvider::new(api_key, http);
            if let Some(url) = overrides.base_url {
                p = p.with_base_url(url);
            }
            if let Some(lang) = overrides.lang {
                p = p.with_lang(lang);
            }
            Box::new(p)
        }
        ProviderId::WeatherApi => {
            let mut p = WeatherApiProvider::new(api_key, http);
            if let Some(url) = overrides.base_url {
                p = p.with_base_url(url);
            }
            if let Some(lang) = overrides.lang {
                p = p.with_lang(lang);
            }
            Box::new(p)
        }
        ProviderId::VisualCrossing => {
            let mut p = VisualCrossingProvider::new(api_key, http);
            if let Some(url) = overrides.base_url {
                p = p.with_base_url(url);
            }
            Box::new(p)
        }
    }
}

/// All providers in crawl order.
pub fn providers_from_config(config: &Config, http: &Client) -> Vec<Box<dyn WeatherProvider>> {
    ProviderId::all()
        .iter()
        .map(|id| provider_from_config(*id, config, http.clone()))
        .collect()
}

pub(crate) fn require_key(id: ProviderId, api_key: Option<&str>) -> Result<&str, FetchError> {
    api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(FetchError::MissingCredential { provider: id, env_var: id.env_var() })
}

/// Send `request` and return the body of a 2xx response.
pub(crate) async fn send_for_body(
    id: ProviderId,
    request: RequestBuilder,
) -> Result<String, FetchError> {
    let res = request
        .send()
        .await
        .map_err(|source| FetchError::Transport { provider: id, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { provider: id, source })?;

    if !status.is_success() {
        return Err(FetchError::Status { provider: id, status, body: truncate_body(&body) });
    }

    tracing::debug!(provider = %id, bytes = body.len(), "received response");
    Ok(body)
}

pub(crate) fn parse_json<T: DeserializeOwned>(id: ProviderId, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Json { provider: id, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
