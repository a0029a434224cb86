//! Hotel search with rating-first ranking

use serde::{Deserialize, Serialize};

use crate::models::Hotel;
use crate::models::travel::same_name;

pub const DEFAULT_MAX_PRICE: f64 = 10_000.0;
pub const DEFAULT_MIN_RATING: f64 = 3.0;
const HOTEL_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HotelSearchResult {
    Success {
        total_hotels: usize,
        recommended_hotel: Hotel,
        cheapest_hotel: Hotel,
        highest_rated_hotel: Hotel,
        all_options: Vec<Hotel>,
    },
    Error {
        message: String,
        hotels: Vec<Hotel>,
    },
}

impl HotelSearchResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            hotels: Vec::new(),
        }
    }
}

/// Hotels in `city` within the price cap and above the rating floor.
///
/// Ranking is rating descending, then nightly price ascending. The sort is
/// stable, so hotels equal on both keep their catalog order.
pub fn search(hotels: &[Hotel], city: &str, max_price: f64, min_rating: f64) -> HotelSearchResult {
    let matches: Vec<&Hotel> = hotels
        .iter()
        .filter(|h| {
            same_name(&h.city, city) && h.price_per_night <= max_price && h.rating >= min_rating
        })
        .collect();

    let cheapest = matches
        .iter()
        .min_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night));
    // reversed comparison so the first of equal ratings wins
    let highest_rated = matches
        .iter()
        .min_by(|a, b| b.rating.total_cmp(&a.rating));

    let (Some(cheapest), Some(highest_rated)) = (cheapest, highest_rated) else {
        return HotelSearchResult::error(format!(
            "No hotels found in {city} matching your criteria"
        ));
    };

    let mut ranked = matches.clone();
    ranked.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(a.price_per_night.total_cmp(&b.price_per_night))
    });

    HotelSearchResult::Success {
        total_hotels: matches.len(),
        recommended_hotel: ranked[0].clone(),
        cheapest_hotel: (*cheapest).clone(),
        highest_rated_hotel: (*highest_rated).clone(),
        all_options: ranked
            .into_iter()
            .take(HOTEL_PREVIEW)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(id: &str, city: &str, rating: f64, price: f64) -> Hotel {
        Hotel {
            id: id.to_string(),
            name: format!("Hotel {id}"),
            city: city.to_string(),
            rating,
            price_per_night: price,
            amenities: vec!["WiFi".to_string()],
            location: "Centre".to_string(),
        }
    }

    fn fixture() -> Vec<Hotel> {
        vec![
            hotel("H1", "Goa", 4.5, 6000.0),
            hotel("H2", "Goa", 4.5, 4000.0),
            hotel("H3", "Goa", 3.2, 1500.0),
            hotel("H4", "Goa", 4.8, 12000.0),
            hotel("H5", "Goa", 2.9, 900.0),
            hotel("H6", "Jaipur", 4.9, 3000.0),
            hotel("H7", "Goa", 4.1, 4000.0),
            hotel("H8", "Goa", 4.5, 4000.0),
        ]
    }

    #[test]
    fn test_filters_respect_bounds() {
        let HotelSearchResult::Success {
            all_options,
            total_hotels,
            ..
        } = search(&fixture(), "goa", 8000.0, 3.0)
        else {
            panic!("expected matches");
        };
        assert_eq!(total_hotels, 5);
        for h in &all_options {
            assert!(h.price_per_night <= 8000.0);
            assert!(h.rating >= 3.0);
            assert_eq!(h.city, "Goa");
        }
    }

    #[test]
    fn test_ranking_is_rating_then_price() {
        let HotelSearchResult::Success {
            all_options,
            recommended_hotel,
            ..
        } = search(&fixture(), "Goa", DEFAULT_MAX_PRICE, DEFAULT_MIN_RATING)
        else {
            panic!("expected matches");
        };
        let ids: Vec<&str> = all_options.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["H2", "H8", "H1", "H7", "H3"]);
        assert_eq!(recommended_hotel.id, "H2");

        for pair in all_options.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
            if pair[0].rating == pair[1].rating {
                assert!(pair[0].price_per_night <= pair[1].price_per_night);
            }
        }
    }

    #[test]
    fn test_cheapest_and_highest_rated_take_first_of_ties() {
        let HotelSearchResult::Success {
            cheapest_hotel,
            highest_rated_hotel,
            ..
        } = search(&fixture(), "Goa", 7000.0, 4.0)
        else {
            panic!("expected matches");
        };
        assert_eq!(cheapest_hotel.id, "H2");
        assert_eq!(highest_rated_hotel.id, "H1");
    }

    #[test]
    fn test_no_match_is_error_outcome() {
        let result = search(&fixture(), "Goa", 500.0, 3.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "No hotels found in Goa matching your criteria");
        assert_eq!(json["hotels"], serde_json::json!([]));
    }
}
