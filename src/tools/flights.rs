//! Flight search over the flight catalog

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Flight;
use crate::models::travel::same_name;

/// Matches returned in `all_flights`
pub const FLIGHT_PREVIEW: usize = 5;

static HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*h").expect("valid regex"));
static MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*m").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FlightSearchResult {
    Success {
        total_flights: usize,
        cheapest_flight: Flight,
        fastest_flight: Flight,
        all_flights: Vec<Flight>,
    },
    Error {
        message: String,
        flights: Vec<Flight>,
    },
}

impl FlightSearchResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            flights: Vec::new(),
        }
    }
}

/// Minutes in a duration label such as "2h 15m"; a missing part counts as zero.
/// Absurdly large labels saturate at `u64::MAX`.
#[must_use]
pub fn duration_minutes(duration: &str) -> u64 {
    // the groups are all digits, so a parse failure means overflow
    let capture = |re: &Regex| {
        re.captures(duration)
            .map_or(0, |c| c[1].parse::<u64>().unwrap_or(u64::MAX))
    };
    capture(&HOURS)
        .saturating_mul(60)
        .saturating_add(capture(&MINUTES))
}

/// Find flights between two cities and pick out the cheapest and fastest
pub fn search(flights: &[Flight], source: &str, destination: &str) -> FlightSearchResult {
    let matches: Vec<&Flight> = flights
        .iter()
        .filter(|f| same_name(&f.source, source) && same_name(&f.destination, destination))
        .collect();

    // min_by keeps the first of equal elements
    let cheapest = matches
        .iter()
        .min_by(|a, b| a.price.total_cmp(&b.price));
    let fastest = matches
        .iter()
        .min_by_key(|f| duration_minutes(&f.duration));

    match (cheapest, fastest) {
        (Some(cheapest), Some(fastest)) => FlightSearchResult::Success {
            total_flights: matches.len(),
            cheapest_flight: (*cheapest).clone(),
            fastest_flight: (*fastest).clone(),
            all_flights: matches
                .iter()
                .take(FLIGHT_PREVIEW)
                .map(|f| (*f).clone())
                .collect(),
        },
        _ => FlightSearchResult::error(format!(
            "No flights found from {source} to {destination}"
        )),
    }
}
