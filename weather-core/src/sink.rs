use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use crate::{error::PersistError, model::WeatherData, provider::ProviderId};

/// Destination for normalized records, one logical store per provider.
pub trait RecordSink: Send + Sync {
    fn append(&self, provider: ProviderId, record: &WeatherData) -> Result<(), PersistError>;

    /// [`RecordSink::append`] with the error logged instead of returned.
    fn save(&self, provider: ProviderId, record: &WeatherData) -> bool {
        match self.append(provider, record) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(provider = %provider, error = %err, "failed to save record");
                false
            }
        }
    }
}

/// Appends each provider's records to `<output_dir>/<provider>_data.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn store_path(&self, provider: ProviderId) -> PathBuf {
        self.output_dir.join(provider.csv_file_name())
    }
}

impl RecordSink for CsvSink {
    fn append(&self, provider: ProviderId, record: &WeatherData) -> Result<(), PersistError> {
        let path = self.store_path(provider);
        let io_err = |source| PersistError::Io { path: path.clone(), source };
        let csv_err = |source| PersistError::Csv { path: path.clone(), source };

        fs::create_dir_all(&self.output_dir).map_err(io_err)?;

        // An empty file left behind by a failed first write still needs a header.
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&path).map_err(io_err)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(record.column_names()).map_err(csv_err)?;
        }
        writer.write_record(record.column_values()).map_err(csv_err)?;
        writer.flush().map_err(io_err)?;

        tracing::info!(path = %path.display(), "record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn record(temp: f64) -> WeatherData {
        WeatherData {
            timestamp: "2026-10-18 10:00:00".into(),
            temperature: temp,
            feels_like: temp - 1.0,
            humidity: 50,
            pressure: 1012.0,
            weather_condition: "Clear".into(),
            weather_description: "晴, 微风".into(),
            wind_speed: 2.0,
            city: "Beijing".into(),
            country: "CN".into(),
            data_source: "OpenWeatherMap".into(),
            precipitation: None,
            uv_index: None,
            cloud_cover: None,
        }
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .expect("open csv");
        reader.records().map(|r| r.expect("row")).collect()
    }

    #[test]
    fn header_written_once_then_rows_in_call_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = CsvSink::new(dir.path().join("data"));

        for temp in [1.0, 2.0, 3.0] {
            sink.append(ProviderId::OpenWeather, &record(temp)).expect("append");
        }

        let rows = read_rows(&sink.store_path(ProviderId::OpenWeather));
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "timestamp");
        assert_eq!(&rows[0][10], "data_source");
        assert_eq!(&rows[1][1], "1");
        assert_eq!(&rows[2][1], "2");
        assert_eq!(&rows[3][1], "3");
        // embedded comma survives quoting
        assert_eq!(&rows[1][6], "晴, 微风");
    }

    #[test]
    fn existing_store_never_gets_a_second_header() {
        let dir = tempfile::tempdir().expect("tempdir");

        CsvSink::new(dir.path()).append(ProviderId::WeatherApi, &record(5.0)).expect("append");
        // fresh sink instance, same directory: simulates a second run
        let sink = CsvSink::new(dir.path());
        sink.append(ProviderId::WeatherApi, &record(6.0)).expect("append");

        let rows = read_rows(&sink.store_path(ProviderId::WeatherApi));
        let headers = rows.iter().filter(|r| &r[0] == "timestamp").count();
        assert_eq!(headers, 1);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn providers_get_separate_stores_with_their_own_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = CsvSink::new(dir.path());

        let vc = WeatherData {
            data_source: "VisualCrossing".into(),
            precipitation: Some(0.0),
            uv_index: Some(2.0),
            cloud_cover: Some(10),
            ..record(7.0)
        };
        sink.append(ProviderId::OpenWeather, &record(7.0)).expect("append");
        sink.append(ProviderId::VisualCrossing, &vc).expect("append");

        let ow = read_rows(&dir.path().join("openweathermap_data.csv"));
        let vc_rows = read_rows(&dir.path().join("visualcrossing_data.csv"));
        assert_eq!(ow[0].len(), 11);
        assert_eq!(vc_rows[0].len(), 14);
        assert_eq!(&vc_rows[0][13], "cloud_cover");
        assert_eq!(&vc_rows[1][13], "10");
    }

    #[test]
    fn save_reports_failure_without_panicking() {
        let dir = tempfile::tempdir().expect("tempdir");
        // a regular file where the output directory should be
        let blocker = dir.path().join("data");
        fs::write(&blocker, "not a directory").expect("write");

        let sink = CsvSink::new(&blocker);
        assert!(!sink.save(ProviderId::OpenWeather, &record(1.0)));
        assert!(matches!(
            sink.append(ProviderId::OpenWeather, &record(1.0)),
            Err(PersistError::Io { .. })
        ));
    }
}
