//! JSON API: planning, plan sections, health, and direct tool access

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::itinerary::TripPlanSections;
use crate::plan::{PlanResult, TripPlanner};
use crate::tools::{
    BudgetArgs, BudgetEstimate, FlightSearchArgs, FlightSearchResult, HotelSearchArgs,
    HotelSearchResult, PlaceSearchArgs, PlaceSearchResult, ToolArgs, ToolArgsError, ToolCatalog,
    WeatherArgs, WeatherReport,
};

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    planner: TripPlanner,
    tools: ToolCatalog,
    shutdown: CancellationToken,
    model_key_set: bool,
}

impl AppState {
    pub fn new(planner: TripPlanner, shutdown: CancellationToken, model_key_set: bool) -> Self {
        let tools = planner.agent().tools().clone();
        Self {
            planner,
            tools,
            shutdown,
            model_key_set,
        }
    }
}

/// Error body returned for rejected requests
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<ToolArgsError> for ApiError {
    fn from(error: ToolArgsError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan_trip))
        .route("/plan/sections", post(plan_sections))
        .route("/flights", post(search_flights))
        .route("/hotels", post(search_hotels))
        .route("/places", post(search_places))
        .route("/weather", post(get_weather))
        .route("/budget", post(estimate_budget))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "model_key_set": state.model_key_set,
        "catalog": state.tools.catalog().stats(),
    }))
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    #[serde(default)]
    request: String,
}

#[instrument(skip_all)]
async fn plan_trip(
    State(state): State<AppState>,
    Json(body): Json<PlanRequest>,
) -> Result<Json<PlanResult>, ApiError> {
    let request = body.request.trim();
    if request.is_empty() {
        return Err(ApiError::bad_request("Missing request"));
    }

    // dropped with this future when the client goes away
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let result = state.planner.plan(request, &cancel).await;
    info!(
        "Plan request finished: {}",
        if result.is_success() { "success" } else { "error" }
    );
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct SectionsRequest {
    trip_plan: String,
}

async fn plan_sections(Json(body): Json<SectionsRequest>) -> Json<TripPlanSections> {
    Json(TripPlanSections::parse(&body.trip_plan))
}

async fn search_flights(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<FlightSearchResult>, ApiError> {
    let args = FlightSearchArgs::from_value(body)?;
    Ok(Json(state.tools.search_flights(&args).await))
}

async fn search_hotels(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<HotelSearchResult>, ApiError> {
    let args = HotelSearchArgs::from_value(body)?;
    Ok(Json(state.tools.search_hotels(&args).await))
}

async fn search_places(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PlaceSearchResult>, ApiError> {
    let args = PlaceSearchArgs::from_value(body)?;
    Ok(Json(state.tools.search_places(&args).await))
}

async fn get_weather(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<WeatherReport>, ApiError> {
    let args = WeatherArgs::from_value(body)?;
    Ok(Json(state.tools.get_weather(&args).await))
}

async fn estimate_budget(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<BudgetEstimate>, ApiError> {
    let args = BudgetArgs::from_value(body)?;
    Ok(Json(state.tools.estimate_budget(&args)))
}
