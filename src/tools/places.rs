//! Attraction search grouped by place type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Place;
use crate::models::travel::same_name;

pub const ALL_TYPES: &str = "all";
pub const DEFAULT_MIN_RATING: f64 = 4.0;
const TOP_RATED: usize = 10;
const PER_TYPE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlaceSearchResult {
    Success {
        total_places: usize,
        top_rated_places: Vec<Place>,
        places_by_type: BTreeMap<String, Vec<Place>>,
    },
    Error {
        message: String,
        places: Vec<Place>,
    },
}

impl PlaceSearchResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            places: Vec::new(),
        }
    }
}

pub fn search(places: &[Place], city: &str, place_type: &str, min_rating: f64) -> PlaceSearchResult {
    let any_type = same_name(place_type, ALL_TYPES);
    let mut matches: Vec<&Place> = places
        .iter()
        .filter(|p| same_name(&p.city, city) && p.rating >= min_rating)
        .filter(|p| any_type || same_name(&p.place_type, place_type))
        .collect();

    if matches.is_empty() {
        return PlaceSearchResult::error(format!(
            "No places found in {city} matching your criteria"
        ));
    }

    matches.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let mut places_by_type: BTreeMap<String, Vec<Place>> = BTreeMap::new();
    for place in &matches {
        let group = places_by_type.entry(place.place_type.clone()).or_default();
        if group.len() < PER_TYPE {
            group.push((*place).clone());
        }
    }

    PlaceSearchResult::Success {
        total_places: matches.len(),
        top_rated_places: matches.iter().take(TOP_RATED).map(|p| (*p).clone()).collect(),
        places_by_type,
    }
}
