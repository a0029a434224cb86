//! Weather lookup for gazetteer cities

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PlannerError;
use crate::models::WeatherDay;
use crate::weather::{ForecastProvider, MAX_FORECAST_DAYS, resolve_city};

pub const DEFAULT_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WeatherReport {
    Success {
        city: String,
        forecast: Vec<WeatherDay>,
    },
    Error {
        message: String,
        forecast: Vec<WeatherDay>,
    },
}

impl WeatherReport {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            forecast: Vec::new(),
        }
    }
}

/// Fetch up to a week of daily weather for `city`.
///
/// Provider failures and timeouts come back as an error report, never as `Err`.
pub async fn lookup(
    provider: &dyn ForecastProvider,
    city: &str,
    days: u32,
    timeout: Duration,
) -> WeatherReport {
    let Some(location) = resolve_city(city) else {
        return WeatherReport::error(format!("Weather data not available for {city}"));
    };

    let days = u8::try_from(days.min(u32::from(MAX_FORECAST_DAYS))).unwrap_or(MAX_FORECAST_DAYS);
    let outcome = tokio::time::timeout(timeout, provider.daily_forecast(&location, days))
        .await
        .unwrap_or_else(|_| Err(PlannerError::timeout("forecast call", timeout)));

    match outcome {
        Ok(forecast) => WeatherReport::Success {
            city: city.to_string(),
            forecast,
        },
        Err(e) => {
            warn!("Forecast for {} failed: {}", location.name, e);
            WeatherReport::error(format!("Failed to fetch weather data: {e}"))
        }
    }
}
