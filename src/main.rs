use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tripwise::api::AppState;
use tripwise::cli::Cli;
use tripwise::{
    AgentSettings, CatalogCache, OpenAiCompatibleModel, OpenMeteoClient, PlannerConfig,
    ToolCatalog, TravelAgent, TripPlanner, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlannerConfig::load_from_path(Cli::parse().config)?;
    let telemetry = telemetry::init(&config.logging)?;

    info!("Starting tripwise {}", tripwise::VERSION);

    let catalog = Arc::new(CatalogCache::new(&config.catalog.data_dir));
    catalog
        .preload()
        .await
        .context("Failed to load reference datasets")?;

    let forecast = Arc::new(OpenMeteoClient::new(&config.weather)?);
    let forecast_budget = forecast.call_budget();
    let tools = ToolCatalog::new(catalog, forecast, forecast_budget);

    let model_key_set = config.model.api_key_present();
    if !model_key_set {
        warn!(
            "No model API key configured; planning requests will fail until {} is set",
            config.model.api_key_env
        );
    }
    let model = Arc::new(OpenAiCompatibleModel::new(&config.model)?);
    let agent = TravelAgent::new(model, tools, AgentSettings::from_config(&config.model));
    let planner = TripPlanner::new(Arc::new(agent));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        signal_token.cancel();
    });

    let state = AppState::new(planner, shutdown.clone(), model_key_set);
    let served = web::run(&config.server, state, shutdown).await;

    telemetry.shutdown();
    served
}
