//! Open-Meteo daily forecast client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{ForecastProvider, MAX_FORECAST_DAYS};
use crate::PlannerError;
use crate::config::WeatherConfig;
use crate::models::weather::{round_one_decimal, weather_code_to_description};
use crate::models::{Location, WeatherDay};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode";

const MIN_RETRY_BACKOFF: Duration = Duration::from_millis(200);
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// HTTP client for the Open-Meteo forecast API, retrying transient failures
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
    attempt_timeout: Duration,
    max_retries: u32,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, PlannerError> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tripwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to build HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(MIN_RETRY_BACKOFF, MAX_RETRY_BACKOFF)
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            attempt_timeout: config.timeout(),
            max_retries: config.max_retries,
        })
    }

    /// Worst-case wall time of one forecast call: every attempt timing out plus the
    /// longest backoff between attempts
    #[must_use]
    pub fn call_budget(&self) -> Duration {
        self.attempt_timeout
            .saturating_mul(self.max_retries.saturating_add(1))
            .saturating_add(MAX_RETRY_BACKOFF.saturating_mul(self.max_retries))
    }

    fn forecast_url(&self, location: &Location, days: u8) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&daily={DAILY_FIELDS}&timezone=auto&forecast_days={}",
            self.base_url,
            location.latitude,
            location.longitude,
            days.clamp(1, MAX_FORECAST_DAYS)
        )
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    #[instrument(skip(self, location), fields(city = %location.name))]
    async fn daily_forecast(
        &self,
        location: &Location,
        days: u8,
    ) -> Result<Vec<WeatherDay>, PlannerError> {
        let url = self.forecast_url(location, days);
        debug!("Requesting forecast: {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlannerError::transport(e.to_string()))?;
        let elapsed = start.elapsed();

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Open-Meteo API returned {} after {:.2}s",
                status,
                elapsed.as_secs_f64()
            );
            return Err(PlannerError::transport(format!(
                "forecast service returned HTTP {status}"
            )));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::transport(format!("malformed forecast body: {e}")))?;

        let forecast = body.daily.map(DailyData::into_days).unwrap_or_default();
        info!(
            "Open-Meteo forecast for {}: {} days in {:.2}s",
            location.name,
            forecast.len(),
            elapsed.as_secs_f64()
        );
        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<NaiveDate>,
    #[serde(rename = "temperature_2m_max")]
    temperature_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m_min")]
    temperature_min: Option<Vec<Option<f64>>>,
    #[serde(rename = "precipitation_sum")]
    precipitation: Option<Vec<Option<f64>>>,
    #[serde(rename = "weathercode")]
    weather_code: Option<Vec<Option<u8>>>,
}

fn value_at(values: Option<&Vec<Option<f64>>>, index: usize) -> Option<f64> {
    values
        .and_then(|v| v.get(index).copied().flatten())
        .map(round_one_decimal)
}

impl DailyData {
    fn into_days(self) -> Vec<WeatherDay> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let code = self
                    .weather_code
                    .as_ref()
                    .and_then(|codes| codes.get(i).copied().flatten());
                WeatherDay {
                    date: *date,
                    max_temp_c: value_at(self.temperature_max.as_ref(), i),
                    min_temp_c: value_at(self.temperature_min.as_ref(), i),
                    precipitation_mm: value_at(self.precipitation.as_ref(), i),
                    condition: code
                        .map_or("Unknown", weather_code_to_description)
                        .to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_data_mapping() {
        let json = r#"{
            "latitude": 15.3, "longitude": 74.1,
            "daily": {
                "time": ["2026-01-10", "2026-01-11"],
                "temperature_2m_max": [31.26, null],
                "temperature_2m_min": [22.04, 21.5],
                "precipitation_sum": [0.0, 12.36],
                "weathercode": [2, 250]
            }
        }"#;
        let body: ForecastResponse = serde_json::from_str(json).unwrap();
        let days = body.daily.unwrap().into_days();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].max_temp_c, Some(31.3));
        assert_eq!(days[0].min_temp_c, Some(22.0));
        assert_eq!(days[0].condition, "Partly cloudy");
        assert_eq!(days[1].max_temp_c, None);
        assert_eq!(days[1].precipitation_mm, Some(12.4));
        assert_eq!(days[1].condition, "Unknown");
    }

    #[test]
    fn test_missing_series_yield_empty_fields() {
        let json = r#"{"daily": {"time": ["2026-01-10"]}}"#;
        let body: ForecastResponse = serde_json::from_str(json).unwrap();
        let days = body.daily.unwrap().into_days();
        assert_eq!(days[0].max_temp_c, None);
        assert_eq!(days[0].condition, "Unknown");
    }

    #[test]
    fn test_call_budget_leaves_room_for_retries() {
        let config = WeatherConfig::default();
        let client = OpenMeteoClient::new(&config).unwrap();
        // 3 attempts of 10s plus 2 backoffs of at most 2s
        assert_eq!(client.call_budget(), Duration::from_secs(34));
        assert!(client.call_budget() > config.timeout());

        let no_retries = WeatherConfig {
            max_retries: 0,
            ..WeatherConfig::default()
        };
        let client = OpenMeteoClient::new(&no_retries).unwrap();
        assert_eq!(client.call_budget(), no_retries.timeout());
    }

    #[test]
    fn test_forecast_url_clamps_days() {
        let client = OpenMeteoClient::new(&WeatherConfig::default()).unwrap();
        let location = Location::new(15.2993, 74.124, "Goa".to_string());
        let url = client.forecast_url(&location, 12);
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=15.2993"));
        assert!(url.ends_with("&timezone=auto&forecast_days=7"));
        assert!(url.contains("daily=temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode"));
    }
}
