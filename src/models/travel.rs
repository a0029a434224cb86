//! Catalog records for flights, hotels and places
//!
//! These mirror the reference datasets one-to-one. They are loaded once by the
//! catalog cache and shared read-only between requests.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A scheduled flight between two cities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    /// Flight time as text, e.g. "2h 15m"
    pub duration: String,
    /// Ticket price in INR
    pub price: f64,
    #[serde(rename = "class")]
    pub travel_class: String,
}

/// A hotel offering rooms in a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub city: String,
    /// Guest rating, 1 to 5
    pub rating: f64,
    /// Nightly room rate in INR
    pub price_per_night: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub location: String,
}

/// A tourist attraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub city: String,
    /// Category tag such as "Beach" or "Heritage"
    #[serde(rename = "type")]
    pub place_type: String,
    pub rating: f64,
    pub description: String,
    /// Typical time spent on a visit, e.g. "2-3 hours"
    pub avg_visit_duration: String,
}

/// Case-insensitive exact comparison used by every catalog filter
#[must_use]
pub fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_ignores_case_but_not_substrings() {
        assert!(same_name("Goa", "goa"));
        assert!(same_name("NEW DELHI", "new delhi"));
        assert!(!same_name("Goa", "North Goa"));
        assert!(!same_name(" Goa", "Goa"));
    }

    #[test]
    fn test_flight_deserializes_from_catalog_json() {
        let json = r#"{
            "id": "FL001",
            "airline": "IndiGo",
            "source": "Delhi",
            "destination": "Goa",
            "departure_time": "2024-03-15T06:00:00",
            "arrival_time": "2024-03-15T08:30:00",
            "duration": "2h 30m",
            "price": 4500,
            "class": "Economy"
        }"#;
        let flight: Flight = serde_json::from_str(json).unwrap();
        assert_eq!(flight.travel_class, "Economy");
        assert_eq!(flight.price, 4500.0);
        assert_eq!(flight.departure_time.to_string(), "2024-03-15 06:00:00");
    }

    #[test]
    fn test_place_type_field_is_renamed() {
        let json = r#"{
            "id": "PL001",
            "name": "Baga Beach",
            "city": "Goa",
            "type": "Beach",
            "rating": 4.5,
            "description": "Lively beach",
            "avg_visit_duration": "3-4 hours"
        }"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.place_type, "Beach");
        let back = serde_json::to_value(&place).unwrap();
        assert_eq!(back["type"], "Beach");
    }
}
