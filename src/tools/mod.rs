//! Tool catalog the reasoning loop can call
//!
//! Every tool answers with a JSON object tagged by `"status"`. Lookups that
//! find nothing, and forecast failures, come back as `status: "error"`
//! outcomes instead of `Err`. Only cancellation escapes [`ToolCatalog::execute`].

pub mod budget;
pub mod flights;
pub mod hotels;
pub mod places;
pub mod weather;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::PlannerError;
use crate::catalog::CatalogCache;
use crate::models::{Flight, Hotel, Place};
use crate::weather::ForecastProvider;

pub use budget::BudgetEstimate;
pub use flights::FlightSearchResult;
pub use hotels::HotelSearchResult;
pub use places::PlaceSearchResult;
pub use weather::WeatherReport;

/// Errors raised while turning a proposed call into a [`ToolCall`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolArgsError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
}

/// Function definition published to the model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Argument struct for one tool
pub trait ToolArgs: DeserializeOwned + Serialize + Sized {
    const TOOL: &'static str;

    fn validate(&self) -> Result<(), String>;

    /// Decode and validate arguments; `null` fields fall back to their defaults
    fn from_value(value: Value) -> Result<Self, ToolArgsError> {
        let invalid = |message: String| ToolArgsError::InvalidArguments {
            tool: Self::TOOL,
            message,
        };
        let value = match value {
            Value::Object(mut fields) => {
                fields.retain(|_, v| !v.is_null());
                Value::Object(fields)
            }
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let args: Self = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        args.validate().map_err(invalid)?;
        Ok(args)
    }

    /// Decode the raw argument string a model sends with a tool call
    fn from_json(raw: &str) -> Result<Self, ToolArgsError> {
        if raw.trim().is_empty() {
            return Self::from_value(Value::Null);
        }
        let value = serde_json::from_str(raw).map_err(|e| ToolArgsError::InvalidArguments {
            tool: Self::TOOL,
            message: format!("arguments are not valid JSON: {e}"),
        })?;
        Self::from_value(value)
    }
}

/// Numbers arrive as JSON numbers or as numeric strings
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got \"{text}\""))),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = number(deserializer)?;
        if n.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&n) {
            return Err(D::Error::custom(format!(
                "expected a non-negative whole number, got {n}"
            )));
        }
        Ok(n as u32)
    }
}

fn non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    Ok(())
}

fn amount(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be a non-negative amount, got {value}"));
    }
    Ok(())
}

fn rating(field: &str, value: f64) -> Result<(), String> {
    if !(0.0..=5.0).contains(&value) {
        return Err(format!("{field} must be between 0 and 5, got {value}"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchArgs {
    pub source: String,
    pub destination: String,
}

impl ToolArgs for FlightSearchArgs {
    const TOOL: &'static str = "search_flights";

    fn validate(&self) -> Result<(), String> {
        non_blank("source", &self.source)?;
        non_blank("destination", &self.destination)
    }
}

fn default_max_price() -> f64 {
    hotels::DEFAULT_MAX_PRICE
}

fn default_hotel_rating() -> f64 {
    hotels::DEFAULT_MIN_RATING
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchArgs {
    pub city: String,
    #[serde(default = "default_max_price", deserialize_with = "lenient::number")]
    pub max_price: f64,
    #[serde(default = "default_hotel_rating", deserialize_with = "lenient::number")]
    pub min_rating: f64,
}

impl ToolArgs for HotelSearchArgs {
    const TOOL: &'static str = "search_hotels";

    fn validate(&self) -> Result<(), String> {
        non_blank("city", &self.city)?;
        amount("max_price", self.max_price)?;
        rating("min_rating", self.min_rating)
    }
}

fn default_place_type() -> String {
    places::ALL_TYPES.to_string()
}

fn default_place_rating() -> f64 {
    places::DEFAULT_MIN_RATING
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSearchArgs {
    pub city: String,
    #[serde(default = "default_place_type")]
    pub place_type: String,
    #[serde(default = "default_place_rating", deserialize_with = "lenient::number")]
    pub min_rating: f64,
}

impl ToolArgs for PlaceSearchArgs {
    const TOOL: &'static str = "search_places";

    fn validate(&self) -> Result<(), String> {
        non_blank("city", &self.city)?;
        non_blank("place_type", &self.place_type)?;
        rating("min_rating", self.min_rating)
    }
}

fn default_days() -> u32 {
    weather::DEFAULT_DAYS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherArgs {
    pub city: String,
    #[serde(default = "default_days", deserialize_with = "lenient::count")]
    pub days: u32,
}

impl ToolArgs for WeatherArgs {
    const TOOL: &'static str = "get_weather";

    fn validate(&self) -> Result<(), String> {
        non_blank("city", &self.city)?;
        if self.days == 0 {
            return Err("days must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_daily_expense() -> f64 {
    budget::DEFAULT_DAILY_EXPENSE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetArgs {
    #[serde(deserialize_with = "lenient::number")]
    pub flight_price: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub hotel_price_per_night: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub num_nights: u32,
    #[serde(default = "default_daily_expense", deserialize_with = "lenient::number")]
    pub daily_expense: f64,
}

impl ToolArgs for BudgetArgs {
    const TOOL: &'static str = "estimate_budget";

    fn validate(&self) -> Result<(), String> {
        amount("flight_price", self.flight_price)?;
        amount("hotel_price_per_night", self.hotel_price_per_night)?;
        amount("daily_expense", self.daily_expense)
    }
}

/// A validated call to one of the five tools
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SearchFlights(FlightSearchArgs),
    SearchHotels(HotelSearchArgs),
    SearchPlaces(PlaceSearchArgs),
    GetWeather(WeatherArgs),
    EstimateBudget(BudgetArgs),
}

impl ToolCall {
    /// Parse a model-proposed call by tool name and raw JSON arguments
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolArgsError> {
        match name {
            FlightSearchArgs::TOOL => FlightSearchArgs::from_json(arguments).map(Self::SearchFlights),
            HotelSearchArgs::TOOL => HotelSearchArgs::from_json(arguments).map(Self::SearchHotels),
            PlaceSearchArgs::TOOL => PlaceSearchArgs::from_json(arguments).map(Self::SearchPlaces),
            WeatherArgs::TOOL => WeatherArgs::from_json(arguments).map(Self::GetWeather),
            BudgetArgs::TOOL => BudgetArgs::from_json(arguments).map(Self::EstimateBudget),
            other => Err(ToolArgsError::UnknownTool {
                name: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchFlights(_) => FlightSearchArgs::TOOL,
            Self::SearchHotels(_) => HotelSearchArgs::TOOL,
            Self::SearchPlaces(_) => PlaceSearchArgs::TOOL,
            Self::GetWeather(_) => WeatherArgs::TOOL,
            Self::EstimateBudget(_) => BudgetArgs::TOOL,
        }
    }

    /// Arguments after defaults were applied
    #[must_use]
    pub fn arguments(&self) -> Value {
        match self {
            Self::SearchFlights(args) => to_json(args),
            Self::SearchHotels(args) => to_json(args),
            Self::SearchPlaces(args) => to_json(args),
            Self::GetWeather(args) => to_json(args),
            Self::EstimateBudget(args) => to_json(args),
        }
    }
}

/// One executed (or rejected) tool call, as fed back to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolObservation {
    pub tool: String,
    pub arguments: Value,
    pub result: Value,
}

impl ToolObservation {
    /// Observation for a call that never ran because it failed to parse
    #[must_use]
    pub fn rejected(tool: &str, raw_arguments: &str, error: &ToolArgsError) -> Self {
        Self {
            tool: tool.to_string(),
            arguments: serde_json::from_str(raw_arguments)
                .unwrap_or_else(|_| Value::String(raw_arguments.to_string())),
            result: json!({ "status": "error", "message": error.to_string() }),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.result["status"] == "error"
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        json!({ "status": "error", "message": format!("Failed to encode tool output: {e}") })
    })
}

/// The five planning tools over shared catalog data and a forecast provider
#[derive(Clone)]
pub struct ToolCatalog {
    catalog: Arc<CatalogCache>,
    forecast: Arc<dyn ForecastProvider>,
    weather_timeout: Duration,
}

impl ToolCatalog {
    pub fn new(
        catalog: Arc<CatalogCache>,
        forecast: Arc<dyn ForecastProvider>,
        weather_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            forecast,
            weather_timeout,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Function definitions in the shape chat-completion APIs expect
    #[must_use]
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: FlightSearchArgs::TOOL,
                description: "Search for flights between cities. Returns the cheapest and fastest \
                              flight options with prices and timings.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "source": {"type": "string", "description": "Source city name (e.g. 'Delhi', 'Mumbai')"},
                        "destination": {"type": "string", "description": "Destination city name (e.g. 'Goa', 'Jaipur')"}
                    },
                    "required": ["source", "destination"]
                }),
            },
            ToolDefinition {
                name: HotelSearchArgs::TOOL,
                description: "Search for hotels in a city by budget and rating. Returns recommended \
                              hotels with prices, ratings and amenities.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string", "description": "City name (e.g. 'Goa', 'Jaipur')"},
                        "max_price": {"type": "number", "description": "Maximum price per night in INR (default 10000)"},
                        "min_rating": {"type": "number", "description": "Minimum hotel rating 1-5 (default 3.0)"}
                    },
                    "required": ["city"]
                }),
            },
            ToolDefinition {
                name: PlaceSearchArgs::TOOL,
                description: "Search for tourist attractions in a city. Returns top-rated places \
                              with descriptions and visit durations.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string", "description": "City name (e.g. 'Goa', 'Jaipur')"},
                        "place_type": {"type": "string", "description": "Beach, Heritage, Shopping, Nature, Religious, Scenic, or 'all'"},
                        "min_rating": {"type": "number", "description": "Minimum rating (default 4.0)"}
                    },
                    "required": ["city"]
                }),
            },
            ToolDefinition {
                name: WeatherArgs::TOOL,
                description: "Get the daily weather forecast for a city: temperatures, \
                              precipitation and conditions.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string", "description": "City name (e.g. 'Goa', 'Jaipur')"},
                        "days": {"type": "integer", "description": "Number of days to forecast, 1-7 (default 7)"}
                    },
                    "required": ["city"]
                }),
            },
            ToolDefinition {
                name: BudgetArgs::TOOL,
                description: "Calculate the total trip budget with a breakdown of flight, hotel \
                              and daily expenses.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "flight_price": {"type": "number", "description": "Total flight cost in INR"},
                        "hotel_price_per_night": {"type": "number", "description": "Hotel cost per night in INR"},
                        "num_nights": {"type": "integer", "description": "Number of nights staying"},
                        "daily_expense": {"type": "number", "description": "Daily food and activity spend in INR (default 2000)"}
                    },
                    "required": ["flight_price", "hotel_price_per_night", "num_nights"]
                }),
            },
        ]
    }

    #[instrument(skip(self))]
    pub async fn search_flights(&self, args: &FlightSearchArgs) -> FlightSearchResult {
        match self.catalog.load::<Flight>().await {
            Ok(flights) => flights::search(&flights, &args.source, &args.destination),
            Err(e) => FlightSearchResult::error(e.to_string()),
        }
    }

    #[instrument(skip(self))]
    pub async fn search_hotels(&self, args: &HotelSearchArgs) -> HotelSearchResult {
        match self.catalog.load::<Hotel>().await {
            Ok(hotels) => hotels::search(&hotels, &args.city, args.max_price, args.min_rating),
            Err(e) => HotelSearchResult::error(e.to_string()),
        }
    }

    #[instrument(skip(self))]
    pub async fn search_places(&self, args: &PlaceSearchArgs) -> PlaceSearchResult {
        match self.catalog.load::<Place>().await {
            Ok(places) => places::search(&places, &args.city, &args.place_type, args.min_rating),
            Err(e) => PlaceSearchResult::error(e.to_string()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_weather(&self, args: &WeatherArgs) -> WeatherReport {
        weather::lookup(
            self.forecast.as_ref(),
            &args.city,
            args.days,
            self.weather_timeout,
        )
        .await
    }

    #[must_use]
    pub fn estimate_budget(&self, args: &BudgetArgs) -> BudgetEstimate {
        budget::estimate(
            args.flight_price,
            args.hotel_price_per_night,
            args.num_nights,
            args.daily_expense,
        )
    }

    /// Run one call, aborting with `Cancelled` as soon as `cancel` fires
    pub async fn execute(
        &self,
        call: &ToolCall,
        cancel: &CancellationToken,
    ) -> Result<ToolObservation, PlannerError> {
        let start = Instant::now();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PlannerError::Cancelled),
            result = self.dispatch(call) => result,
        };
        debug!(
            "Tool {} finished in {:.2}s",
            call.name(),
            start.elapsed().as_secs_f64()
        );

        Ok(ToolObservation {
            tool: call.name().to_string(),
            arguments: call.arguments(),
            result,
        })
    }

    async fn dispatch(&self, call: &ToolCall) -> Value {
        match call {
            ToolCall::SearchFlights(args) => to_json(&self.search_flights(args).await),
            ToolCall::SearchHotels(args) => to_json(&self.search_hotels(args).await),
            ToolCall::SearchPlaces(args) => to_json(&self.search_places(args).await),
            ToolCall::GetWeather(args) => to_json(&self.get_weather(args).await),
            ToolCall::EstimateBudget(args) => to_json(&self.estimate_budget(args)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, WeatherDay};
    use async_trait::async_trait;
    use rstest::rstest;

    struct NoForecast;

    #[async_trait]
    impl ForecastProvider for NoForecast {
        async fn daily_forecast(
            &self,
            _location: &Location,
            _days: u8,
        ) -> Result<Vec<WeatherDay>, PlannerError> {
            Ok(Vec::new())
        }
    }

    fn empty_catalog() -> ToolCatalog {
        ToolCatalog::new(
            Arc::new(CatalogCache::from_records(Vec::new(), Vec::new(), Vec::new())),
            Arc::new(NoForecast),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_parse_applies_defaults() {
        let call = ToolCall::parse("search_hotels", r#"{"city": "Goa"}"#).unwrap();
        assert_eq!(
            call,
            ToolCall::SearchHotels(HotelSearchArgs {
                city: "Goa".to_string(),
                max_price: 10_000.0,
                min_rating: 3.0,
            })
        );

        let call = ToolCall::parse("search_places", r#"{"city": "Goa", "place_type": null}"#).unwrap();
        let ToolCall::SearchPlaces(args) = call else {
            panic!("wrong variant");
        };
        assert_eq!(args.place_type, "all");
        assert_eq!(args.min_rating, 4.0);
    }

    #[test]
    fn test_parse_accepts_numeric_strings() {
        let call = ToolCall::parse(
            "estimate_budget",
            r#"{"flight_price": "5000", "hotel_price_per_night": 2000, "num_nights": "3"}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            ToolCall::EstimateBudget(BudgetArgs {
                flight_price: 5000.0,
                hotel_price_per_night: 2000.0,
                num_nights: 3,
                daily_expense: 2000.0,
            })
        );
    }

    #[test]
    fn test_unknown_tool() {
        let err = ToolCall::parse("book_flight", "{}").unwrap_err();
        assert_eq!(
            err,
            ToolArgsError::UnknownTool {
                name: "book_flight".to_string()
            }
        );
    }

    #[rstest]
    #[case("search_flights", r#"{"source": "Delhi", "destination": "  "}"#)]
    #[case("search_flights", r#"{"source": "Delhi"}"#)]
    #[case("search_hotels", r#"{"city": "Goa", "min_rating": 7}"#)]
    #[case("search_hotels", r#"{"city": "Goa", "max_price": -1}"#)]
    #[case("search_places", r#"{"city": ""}"#)]
    #[case("get_weather", r#"{"city": "Goa", "days": 0}"#)]
    #[case("get_weather", r#"{"city": "Goa", "days": "two"}"#)]
    #[case("estimate_budget", r#"{"flight_price": 100, "hotel_price_per_night": 1, "num_nights": 2.5}"#)]
    #[case("estimate_budget", "not json")]
    fn test_invalid_arguments(#[case] tool: &str, #[case] raw: &str) {
        let err = ToolCall::parse(tool, raw).unwrap_err();
        assert!(
            matches!(err, ToolArgsError::InvalidArguments { tool: t, .. } if t == tool),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let names: Vec<&str> = ToolCatalog::definitions().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            ["search_flights", "search_hotels", "search_places", "get_weather", "estimate_budget"]
        );
    }

    #[tokio::test]
    async fn test_execute_records_observation() {
        let tools = empty_catalog();
        let call = ToolCall::parse("search_flights", r#"{"source": "Delhi", "destination": "Goa"}"#)
            .unwrap();
        let observation = tools
            .execute(&call, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(observation.tool, "search_flights");
        assert_eq!(observation.arguments["destination"], "Goa");
        assert!(observation.is_error());
        assert_eq!(observation.result["message"], "No flights found from Delhi to Goa");
    }

    #[tokio::test]
    async fn test_execute_honours_cancellation() {
        let tools = empty_catalog();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let call = ToolCall::parse("get_weather", r#"{"city": "Goa"}"#).unwrap();
        let err = tools.execute(&call, &cancel).await.unwrap_err();
        assert!(matches!(err, PlannerError::Cancelled));
    }

    #[test]
    fn test_rejected_observation_keeps_raw_arguments() {
        let err = ToolCall::parse("teleport", r#"{"to": "Goa"}"#).unwrap_err();
        let observation = ToolObservation::rejected("teleport", r#"{"to": "Goa"}"#, &err);
        assert!(observation.is_error());
        assert_eq!(observation.arguments["to"], "Goa");
        assert_eq!(observation.result["message"], "Unknown tool: teleport");
    }
}
