//! Scripted chat model for tests
//!
//! [`ScriptedModel`] replays a queue of steps instead of calling a provider.
//! Every call records the conversation it was given so tests can assert on
//! what the loop fed back to the model.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatModel, ModelReply, ProposedToolCall};
use crate::PlannerError;
use crate::tools::ToolDefinition;

/// One queued model behaviour
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Reply(ModelReply),
    /// Fails with a credentials error carrying this message
    Credentials(String),
    /// Fails with a provider error carrying this message
    Provider(String),
    /// Never answers
    Stall,
}

pub struct ScriptedModel {
    steps: Mutex<VecDeque<ScriptedStep>>,
    repeat: Option<ModelReply>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A model that gives the same reply on every call
    #[must_use]
    pub fn repeating(reply: ModelReply) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            repeat: Some(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Convenience for a reply proposing a single tool call
    #[must_use]
    pub fn tool_call(id: &str, name: &str, arguments: &str) -> ScriptedStep {
        ScriptedStep::Reply(ModelReply::ToolCalls {
            content: None,
            calls: vec![ProposedToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        })
    }

    #[must_use]
    pub fn answer(text: &str) -> ScriptedStep {
        ScriptedStep::Reply(ModelReply::Answer(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Conversations passed to each call, oldest first
    pub fn recorded_conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn next_step(
        &self,
        conversation: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<ModelReply, PlannerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(conversation.to_vec());
        }

        let step = self
            .steps
            .lock()
            .ok()
            .and_then(|mut steps| steps.pop_front());

        match (step, &self.repeat) {
            (Some(ScriptedStep::Reply(reply)), _) => Ok(reply),
            (Some(ScriptedStep::Credentials(message)), _) => {
                Err(PlannerError::credentials(message))
            }
            (Some(ScriptedStep::Provider(message)), _) => Err(PlannerError::provider(message)),
            (Some(ScriptedStep::Stall), _) => std::future::pending().await,
            (None, Some(reply)) => Ok(reply.clone()),
            (None, None) => Err(PlannerError::provider("scripted model has no replies left")),
        }
    }
}
