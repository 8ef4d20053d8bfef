use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{Config, Crawler, ProviderId, WeatherData, provider};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-crawler",
    version,
    about = "Snapshot current weather from OpenWeatherMap, WeatherAPI and Visual Crossing"
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the per-provider CSV files.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log file, appended to on every run.
    #[arg(long, global = true, default_value = "weather_crawler.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch from every provider once and append to the CSV stores (default).
    Run,

    /// Fetch from one provider and print the record without saving it.
    Show {
        /// Provider short name: "openweather", "weatherapi" or "visualcrossing".
        provider: String,
    },

    /// Store the API key for a provider in the config file.
    Configure {
        /// Provider short name: "openweather", "weatherapi" or "visualcrossing".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Run) {
            Command::Run => {
                let config = load_config(&config_path, self.output_dir)?;
                let crawler = Crawler::from_config(&config)?;
                let report = crawler.run().await;
                tracing::debug!(?report, "crawl report");
            }
            Command::Show { provider: name } => {
                let id = ProviderId::try_from(name.as_str())?;
                let config = load_config(&config_path, self.output_dir)?;
                let http = provider::http_client(config.timeout())
                    .context("Failed to build HTTP client")?;

                let client = provider::provider_from_config(id, &config, http);
                match client.fetch_current(&config.location()).await {
                    Ok(data) => print_record(&data),
                    Err(err) => println!("No weather data from {id}: {err}"),
                }
            }
            Command::Configure { provider: name } => {
                let id = ProviderId::try_from(name.as_str())?;
                let mut config = Config::load_from(&config_path)?;

                let api_key = Password::new(&format!("API key for {}:", id.data_source()))
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                config.upsert_provider_api_key(id, api_key.trim().to_string());
                config.save_to(&config_path)?;
                println!("Saved {id} API key to {}", config_path.display());
            }
        }

        Ok(())
    }
}

/// File config, then environment, then CLI flags.
fn load_config(path: &std::path::Path, output_dir: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = Config::load_from(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    Ok(config)
}

fn print_record(data: &WeatherData) {
    for (name, value) in data.column_names().iter().zip(data.column_values()) {
        println!("{name:>20}: {value}");
    }
}
