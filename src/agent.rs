//! Reasoning loop that turns a trip request into a plan
//!
//! The agent alternates between asking the model what to do and running the
//! tools it asks for, feeding each result back into the conversation until
//! the model writes a final answer or the step cap is reached.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::PlannerError;
use crate::config::ModelConfig;
use crate::llm::{ChatMessage, ChatModel, ModelReply, ProposedToolCall};
use crate::tools::{ToolCall, ToolCatalog, ToolDefinition, ToolObservation};

pub const SYSTEM_PROMPT: &str = "\
You are an expert travel planning assistant for trips within India. Build a complete, \
realistic trip plan for the user's request.

Use the tools before answering:
1. search_flights for the outbound journey, and pick one flight.
2. search_hotels in the destination city, and pick one hotel.
3. search_places to find attractions worth visiting.
4. get_weather for the destination.
5. estimate_budget with the chosen flight price, hotel price per night and number of nights.

Then write the final plan in plain text with these sections:
- Selected Flight: airline, timings, price, and why you chose it.
- Selected Hotel: name, rating, price per night, and why.
- Weather Forecast: a short summary and what it means for the trip.
- Day-wise Itinerary: Day 1, Day 2, ... with places to visit each day.
- Budget Breakdown: flight, hotel, daily expenses and total cost in INR.
- Reasoning: a few sentences on the trade-offs you made.

Only use data returned by the tools. If a tool reports an error, say so and plan around it.";

/// Lifecycle of one planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Thinking,
    ActingOnTool,
    ObservingResult,
    Finished,
    Failed,
}

impl AgentState {
    fn advance(&mut self, next: AgentState) {
        debug!("Agent state {} -> {}", self, next);
        *self = next;
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::Thinking => "thinking",
            AgentState::ActingOnTool => "acting",
            AgentState::ObservingResult => "observing",
            AgentState::Finished => "finished",
            AgentState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Upper bound on model calls per run
    pub max_iterations: u32,
    pub model_timeout: Duration,
    pub system_prompt: String,
}

impl AgentSettings {
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            model_timeout: config.timeout(),
            ..Self::default()
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            model_timeout: Duration::from_secs(60),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub plan: String,
    /// Every tool result in the order it was produced
    pub observations: Vec<ToolObservation>,
    /// Number of model calls made
    pub iterations: u32,
}

pub struct TravelAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolCatalog,
    settings: AgentSettings,
}

impl TravelAgent {
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolCatalog, settings: AgentSettings) -> Self {
        Self {
            model,
            tools,
            settings,
        }
    }

    #[must_use]
    pub fn tools(&self) -> &ToolCatalog {
        &self.tools
    }

    /// Plan a trip for `request`, stopping early if `cancel` fires
    #[instrument(skip_all, fields(request_chars = request.chars().count()))]
    pub async fn run(
        &self,
        request: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRun, PlannerError> {
        let start = Instant::now();
        let mut state = AgentState::Thinking;

        let outcome = self.drive(request, cancel, &mut state).await;
        match &outcome {
            Ok(run) => {
                state.advance(AgentState::Finished);
                info!(
                    "Plan finished after {} steps and {} tool calls in {:.2}s",
                    run.iterations,
                    run.observations.len(),
                    start.elapsed().as_secs_f64()
                );
            }
            Err(e) => {
                state.advance(AgentState::Failed);
                warn!(
                    "Planning failed after {:.2}s: {}",
                    start.elapsed().as_secs_f64(),
                    e
                );
            }
        }
        outcome
    }

    async fn drive(
        &self,
        request: &str,
        cancel: &CancellationToken,
        state: &mut AgentState,
    ) -> Result<AgentRun, PlannerError> {
        let definitions = ToolCatalog::definitions();
        let mut conversation = vec![
            ChatMessage::System(self.settings.system_prompt.clone()),
            ChatMessage::User(request.to_string()),
        ];
        let mut observations = Vec::new();

        for iteration in 1..=self.settings.max_iterations {
            if *state != AgentState::Thinking {
                state.advance(AgentState::Thinking);
            }
            debug!("Reasoning step {}/{}", iteration, self.settings.max_iterations);

            match self.think(&conversation, &definitions, cancel).await? {
                ModelReply::Answer(plan) => {
                    return Ok(AgentRun {
                        plan,
                        observations,
                        iterations: iteration,
                    });
                }
                ModelReply::ToolCalls { content, calls } => {
                    conversation.push(ChatMessage::Assistant {
                        content,
                        tool_calls: calls.clone(),
                    });
                    for call in calls {
                        state.advance(AgentState::ActingOnTool);
                        let observation = self.act(&call, cancel).await?;

                        state.advance(AgentState::ObservingResult);
                        conversation.push(ChatMessage::Tool {
                            call_id: call.id,
                            name: call.name,
                            content: observation.result.to_string(),
                        });
                        observations.push(observation);
                    }
                }
            }
        }

        Err(PlannerError::MaxIterations {
            limit: self.settings.max_iterations,
        })
    }

    async fn think(
        &self,
        conversation: &[ChatMessage],
        definitions: &[ToolDefinition],
        cancel: &CancellationToken,
    ) -> Result<ModelReply, PlannerError> {
        let timeout = self.settings.model_timeout;
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PlannerError::Cancelled),
            reply = tokio::time::timeout(timeout, self.model.next_step(conversation, definitions)) => {
                reply.unwrap_or_else(|_| Err(PlannerError::timeout("model call", timeout)))
            }
        }
    }

    async fn act(
        &self,
        call: &ProposedToolCall,
        cancel: &CancellationToken,
    ) -> Result<ToolObservation, PlannerError> {
        match ToolCall::parse(&call.name, &call.arguments) {
            Ok(tool_call) => {
                debug!("Running tool {}", tool_call.name());
                self.tools.execute(&tool_call, cancel).await
            }
            Err(e) => {
                warn!("Rejected tool call {}: {}", call.name, e);
                Ok(ToolObservation::rejected(&call.name, &call.arguments, &e))
            }
        }
    }
}
