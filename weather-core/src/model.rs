/// Normalized current-weather snapshot shared by every provider.
///
/// Units are fixed regardless of the source: °C, %, hPa and m/s.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherData {
    /// Local capture time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: f64,
    pub weather_condition: String,
    pub weather_description: String,
    pub wind_speed: f64,
    pub city: String,
    pub country: String,
    pub data_source: String,

    /// Only reported by some providers; absence is not an error.
    pub precipitation: Option<f64>,
    pub uv_index: Option<f64>,
    pub cloud_cover: Option<i64>,
}

const BASE_COLUMNS: [&str; 11] = [
    "timestamp",
    "temperature",
    "feels_like",
    "humidity",
    "pressure",
    "weather_condition",
    "weather_description",
    "wind_speed",
    "city",
    "country",
    "data_source",
];

impl WeatherData {
    /// Column names for this record, in declaration order.
    ///
    /// Optional columns are only included when the record carries them, so
    /// each provider's store gets a header matching its own variant.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut cols = BASE_COLUMNS.to_vec();
        if self.precipitation.is_some() {
            cols.push("precipitation");
        }
        if self.uv_index.is_some() {
            cols.push("uv_index");
        }
        if self.cloud_cover.is_some() {
            cols.push("cloud_cover");
        }
        cols
    }

    /// Field values aligned with [`WeatherData::column_names`].
    pub fn column_values(&self) -> Vec<String> {
        let mut values = vec![
            self.timestamp.clone(),
            self.temperature.to_string(),
            self.feels_like.to_string(),
            self.humidity.to_string(),
            self.pressure.to_string(),
            self.weather_condition.clone(),
            self.weather_description.clone(),
            self.wind_speed.to_string(),
            self.city.clone(),
            self.country.clone(),
            self.data_source.clone(),
        ];
        if let Some(p) = self.precipitation {
            values.push(p.to_string());
        }
        if let Some(uv) = self.uv_index {
            values.push(uv.to_string());
        }
        if let Some(cc) = self.cloud_cover {
            values.push(cc.to_string());
        }
        values
    }
}
