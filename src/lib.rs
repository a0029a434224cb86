//! Tripwise - agentic trip planning
//!
//! A language model drives a reasoning loop over five travel tools (flights,
//! hotels, attractions, weather, budget) and writes a day-wise itinerary.
//! This library holds the loop, the tools, the catalog cache and the HTTP API.

pub mod agent;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod llm;
pub mod models;
pub mod plan;
pub mod telemetry;
pub mod tools;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use agent::{AgentRun, AgentSettings, TravelAgent};
pub use catalog::CatalogCache;
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use itinerary::TripPlanSections;
pub use llm::{ChatModel, OpenAiCompatibleModel};
pub use plan::{PlanResult, TripPlanner};
pub use tools::{ToolCall, ToolCatalog, ToolObservation};
pub use weather::{ForecastProvider, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
