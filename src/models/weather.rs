//! Daily weather forecast model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a city forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherDay {
    pub date: NaiveDate,
    /// Maximum temperature in Celsius, one decimal
    pub max_temp_c: Option<f64>,
    /// Minimum temperature in Celsius, one decimal
    pub min_temp_c: Option<f64>,
    /// Precipitation sum in mm, one decimal
    pub precipitation_mm: Option<f64>,
    /// Human-readable description of weather conditions
    pub condition: String,
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Round a measurement to one decimal place
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_code_to_description() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(63), "Moderate rain");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(31.46), 31.5);
        assert_eq!(round_one_decimal(24.04), 24.0);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }
}
