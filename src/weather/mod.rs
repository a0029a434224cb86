//! Daily forecasts for the destination cities the planner knows about

use async_trait::async_trait;

use crate::PlannerError;
use crate::models::{Location, WeatherDay};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Longest forecast horizon requested from a provider
pub const MAX_FORECAST_DAYS: u8 = 7;

/// Source of daily forecasts
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch `days` daily forecasts starting today for `location`
    async fn daily_forecast(
        &self,
        location: &Location,
        days: u8,
    ) -> Result<Vec<WeatherDay>, PlannerError>;
}

const GAZETTEER: &[(&str, &str, f64, f64)] = &[
    ("goa", "Goa", 15.2993, 74.1240),
    ("jaipur", "Jaipur", 26.9124, 75.7873),
    ("mumbai", "Mumbai", 19.0760, 72.8777),
    ("bangalore", "Bangalore", 12.9716, 77.5946),
    ("kerala", "Kerala", 10.8505, 76.2711),
    ("delhi", "Delhi", 28.7041, 77.1025),
    ("chennai", "Chennai", 13.0827, 80.2707),
    ("kolkata", "Kolkata", 22.5726, 88.3639),
    ("hyderabad", "Hyderabad", 17.3850, 78.4867),
    ("pune", "Pune", 18.5204, 73.8567),
];

/// Resolve a city name through the fixed gazetteer, ignoring case
#[must_use]
pub fn resolve_city(city: &str) -> Option<Location> {
    let key = city.to_lowercase();
    GAZETTEER
        .iter()
        .find(|(name, ..)| *name == key)
        .map(|(_, display, lat, lon)| Location::new(*lat, *lon, *display).in_country("IN"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Goa", 15.2993, 74.1240)]
    #[case("delhi", 28.7041, 77.1025)]
    #[case("HYDERABAD", 17.385, 78.4867)]
    fn test_resolve_known_city(#[case] city: &str, #[case] lat: f64, #[case] lon: f64) {
        let location = resolve_city(city).unwrap();
        assert!((location.latitude - lat).abs() < 1e-9);
        assert!((location.longitude - lon).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_unknown_city() {
        assert!(resolve_city("Atlantis").is_none());
        assert!(resolve_city("").is_none());
        assert!(resolve_city(" Goa").is_none());
    }
}
