//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Travel: catalog records (flights, hotels, places)
//! - Location: geographic coordinates from the gazetteer
//! - Weather: daily forecast entries
//! - Budget: derived trip cost breakdowns

pub mod budget;
pub mod location;
pub mod travel;
pub mod weather;

// Re-export all public types for convenient access
pub use budget::BudgetBreakdown;
pub use location::Location;
pub use travel::{Flight, Hotel, Place};
pub use weather::WeatherDay;
