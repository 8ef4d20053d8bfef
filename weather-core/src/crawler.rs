use anyhow::{Context, Result};

use crate::{
    Config,
    location::Location,
    provider::{ProviderId, WeatherProvider, http_client, providers_from_config},
    sink::{CsvSink, RecordSink},
};

/// What happened to one provider during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    NoData,
    SaveFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub outcomes: Vec<(ProviderId, Outcome)>,
}

impl CrawlReport {
    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == Outcome::Saved).count()
    }

    pub fn outcome(&self, id: ProviderId) -> Option<Outcome> {
        self.outcomes.iter().find(|(p, _)| *p == id).map(|(_, o)| *o)
    }
}

/// Runs every provider once, in order, and hands each record to the sink.
///
/// Providers are isolated from each other: one failing never stops the rest.
pub struct Crawler {
    providers: Vec<Box<dyn WeatherProvider>>,
    sink: Box<dyn RecordSink>,
    location: Location,
}

impl Crawler {
    pub fn new(
        providers: Vec<Box<dyn WeatherProvider>>,
        sink: Box<dyn RecordSink>,
        location: Location,
    ) -> Self {
        Self { providers, sink, location }
    }

    /// All three providers plus a CSV sink under `config.output_dir`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config.timeout()).context("Failed to build HTTP client")?;
        let providers = providers_from_config(config, &http);
        let sink = CsvSink::new(&config.output_dir);

        Ok(Self::new(providers, Box::new(sink), config.location()))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub async fn run(&self) -> CrawlReport {
        tracing::info!(location = %self.location, "starting weather crawl");

        let mut report = CrawlReport::default();
        for provider in &self.providers {
            let outcome = self.crawl_one(provider.as_ref()).await;
            report.outcomes.push((provider.id(), outcome));
        }

        tracing::info!(
            saved = report.saved_count(),
            total = report.outcomes.len(),
            "weather crawl finished"
        );
        report
    }

    async fn crawl_one(&self, provider: &dyn WeatherProvider) -> Outcome {
        let id = provider.id();
        let source = id.data_source();

        let Some(data) = provider.current_weather(&self.location).await else {
            tracing::warn!(source, "no weather data retrieved");
            return Outcome::NoData;
        };

        if !self.sink.save(id, &data) {
            tracing::warn!(source, "weather data retrieved but not saved");
            return Outcome::SaveFailed;
        }

        tracing::info!(source, city = %data.city, temperature = data.temperature, "weather data saved");
        if let (Some(precipitation), Some(uv_index)) = (data.precipitation, data.uv_index) {
            tracing::info!(source, precipitation, uv_index, "precipitation (mm) and UV index");
        }
        Outcome::Saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, PersistError, WeatherData};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct FakeProvider {
        id: ProviderId,
        has_key: bool,
        seen: Arc<Mutex<Vec<Location>>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch_current(&self, location: &Location) -> Result<WeatherData, FetchError> {
            self.seen.lock().expect("lock").push(location.clone());
            if !self.has_key {
                return Err(FetchError::MissingCredential {
                    provider: self.id,
                    env_var: self.id.env_var(),
                });
            }
            Ok(WeatherData {
                timestamp: "2026-10-18 12:00:00".into(),
                temperature: 20.0,
                feels_like: 19.0,
                humidity: 30,
                pressure: 1010.0,
                weather_condition: "Clear".into(),
                weather_description: "clear sky".into(),
                wind_speed: 1.0,
                city: "Beijing".into(),
                country: "CN".into(),
                data_source: self.id.data_source().into(),
                precipitation: None,
                uv_index: None,
                cloud_cover: None,
            })
        }
    }

    #[derive(Default)]
    struct CountingSink {
        appended: Mutex<Vec<(ProviderId, String)>>,
        fail_for: Option<ProviderId>,
    }

    impl RecordSink for Arc<CountingSink> {
        fn append(&self, provider: ProviderId, record: &WeatherData) -> Result<(), PersistError> {
            if self.fail_for == Some(provider) {
                return Err(PersistError::Io {
                    path: "unwritable.csv".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.appended
                .lock()
                .expect("lock")
                .push((provider, record.data_source.clone()));
            Ok(())
        }
    }

    fn crawler_with(
        keys: [bool; 3],
        sink: Arc<CountingSink>,
    ) -> (Crawler, Arc<Mutex<Vec<Location>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let providers: Vec<Box<dyn WeatherProvider>> = ProviderId::all()
            .iter()
            .zip(keys)
            .map(|(id, has_key)| {
                Box::new(FakeProvider { id: *id, has_key, seen: seen.clone() })
                    as Box<dyn WeatherProvider>
            })
            .collect();

        let location = Location::resolve(Some("Shanghai"), Some("31.2"), Some("121.5"));
        (Crawler::new(providers, Box::new(sink), location), seen)
    }

    #[tokio::test]
    async fn all_providers_succeeding_append_three_records() {
        let sink = Arc::new(CountingSink::default());
        let (crawler, _) = crawler_with([true, true, true], sink.clone());

        let report = crawler.run().await;

        assert_eq!(report.saved_count(), 3);
        let appended = sink.appended.lock().expect("lock");
        assert_eq!(
            *appended,
            vec![
                (ProviderId::OpenWeather, "OpenWeatherMap".to_string()),
                (ProviderId::WeatherApi, "WeatherAPI".to_string()),
                (ProviderId::VisualCrossing, "VisualCrossing".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_credential_skips_only_that_provider() {
        let sink = Arc::new(CountingSink::default());
        let (crawler, seen) = crawler_with([false, true, true], sink.clone());

        let report = crawler.run().await;

        assert_eq!(report.outcome(ProviderId::OpenWeather), Some(Outcome::NoData));
        assert_eq!(report.outcome(ProviderId::WeatherApi), Some(Outcome::Saved));
        assert_eq!(report.outcome(ProviderId::VisualCrossing), Some(Outcome::Saved));
        assert_eq!(sink.appended.lock().expect("lock").len(), 2);
        // every provider was still invoked
        assert_eq!(seen.lock().expect("lock").len(), 3);
    }

    #[tokio::test]
    async fn sink_failure_does_not_stop_later_providers() {
        let sink = Arc::new(CountingSink {
            fail_for: Some(ProviderId::WeatherApi),
            ..Default::default()
        });
        let (crawler, _) = crawler_with([true, true, true], sink.clone());

        let report = crawler.run().await;

        assert_eq!(report.outcome(ProviderId::WeatherApi), Some(Outcome::SaveFailed));
        assert_eq!(report.outcome(ProviderId::VisualCrossing), Some(Outcome::Saved));
        assert_eq!(report.saved_count(), 2);
    }

    #[tokio::test]
    async fn every_provider_sees_the_same_location() {
        let sink = Arc::new(CountingSink::default());
        let (crawler, seen) = crawler_with([true, true, true], sink);

        crawler.run().await;

        let seen = seen.lock().expect("lock");
        assert!(seen.iter().all(|loc| loc == crawler.location()));
        assert_eq!(crawler.location().as_query(), "31.2,121.5");
    }

    #[test]
    fn from_config_wires_three_providers() {
        let crawler = Crawler::from_config(&Config::default()).expect("crawler");
        assert_eq!(crawler.providers.len(), 3);
        assert_eq!(crawler.location(), &Location::City("Beijing".into()));
    }
}
