//! Result assembly for planning runs

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::PlannerError;
use crate::agent::{AgentRun, TravelAgent};

/// Substrings that identify a credentials failure in an error message
pub const CREDENTIAL_MARKERS: [&str; 5] =
    ["API key", "401", "403", "INVALID_ARGUMENT", "PERMISSION_DENIED"];

/// Outcome of a planning request, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlanResult {
    Success { trip_plan: String },
    Error { error_message: String },
}

impl PlanResult {
    #[must_use]
    pub fn from_outcome(outcome: Result<AgentRun, PlannerError>) -> Self {
        match outcome {
            Ok(run) => PlanResult::Success {
                trip_plan: run.plan,
            },
            Err(e) => PlanResult::Error {
                error_message: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PlanResult::Success { .. })
    }

    /// True when the failure came from a missing or rejected model API key
    #[must_use]
    pub fn is_credential_failure(&self) -> bool {
        match self {
            PlanResult::Success { .. } => false,
            PlanResult::Error { error_message } => CREDENTIAL_MARKERS
                .iter()
                .any(|marker| error_message.contains(marker)),
        }
    }
}

/// Entry point that runs the agent and folds its outcome into a [`PlanResult`]
#[derive(Clone)]
pub struct TripPlanner {
    agent: Arc<TravelAgent>,
}

impl TripPlanner {
    pub fn new(agent: Arc<TravelAgent>) -> Self {
        Self { agent }
    }

    #[must_use]
    pub fn agent(&self) -> &TravelAgent {
        &self.agent
    }

    pub async fn plan(&self, request: &str, cancel: &CancellationToken) -> PlanResult {
        PlanResult::from_outcome(self.agent.run(request, cancel).await)
    }
}
