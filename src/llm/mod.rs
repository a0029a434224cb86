//! Chat model abstraction for the reasoning loop

use async_trait::async_trait;

use crate::PlannerError;
use crate::tools::ToolDefinition;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod openai;

pub use openai::OpenAiCompatibleModel;

/// One turn of the planning conversation
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ProposedToolCall>,
    },
    Tool {
        call_id: String,
        name: String,
        content: String,
    },
}

/// A tool invocation as proposed by the model, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument text
    pub arguments: String,
}

/// What the model wants to do next
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    ToolCalls {
        content: Option<String>,
        calls: Vec<ProposedToolCall>,
    },
    Answer(String),
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Ask the model for its next step given the conversation so far
    async fn next_step(
        &self,
        conversation: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, PlannerError>;
}
