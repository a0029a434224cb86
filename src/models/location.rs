//! Resolved destination coordinates

use serde::Serialize;

/// A destination the forecast provider can be asked about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Display name, e.g. "Jaipur"
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// ISO 3166-1 alpha-2 code, when known
    pub country: Option<&'static str>,
}

impl Location {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            country: None,
        }
    }

    #[must_use]
    pub fn in_country(mut self, code: &'static str) -> Self {
        self.country = Some(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_country_tags_location() {
        let location = Location::new(28.7041, 77.1025, "Delhi").in_country("IN");
        assert_eq!(location.name, "Delhi");
        assert_eq!(location.country, Some("IN"));
    }
}
