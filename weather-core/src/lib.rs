//! Core library for the `weather-crawler` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Three weather provider clients behind one trait
//! - Normalization of provider payloads into a common [`WeatherData`] record
//! - Per-provider CSV persistence and the crawl orchestration
//!
//! It is used by `weather-crawler`, but can also be reused by other binaries or services.

pub mod config;
pub mod crawler;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod sink;

pub use config::{Config, ProviderConfig};
pub use crawler::{CrawlReport, Crawler, Outcome};
pub use error::{FetchError, PersistError};
pub use location::{Location, LocationConfig};
pub use model::WeatherData;
pub use provider::{ProviderId, WeatherProvider};
pub use sink::{CsvSink, RecordSink};
