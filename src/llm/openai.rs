//! OpenAI-compatible chat-completions client (Groq by default)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::{ChatMessage, ChatModel, ModelReply, ProposedToolCall};
use crate::PlannerError;
use crate::config::ModelConfig;
use crate::tools::ToolDefinition;

/// Chat model reached over an OpenAI-style `/chat/completions` endpoint.
///
/// The API key is looked up on the first call, not at construction, so the
/// service starts without one and reports the gap per request.
pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    configured_key: Option<String>,
    api_key_env: String,
    api_key: OnceCell<String>,
}

impl OpenAiCompatibleModel {
    pub fn new(config: &ModelConfig) -> Result<Self, PlannerError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout(),
            configured_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: OnceCell::new(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn api_key(&self) -> Result<&str, PlannerError> {
        self.api_key
            .get_or_try_init(|| async {
                self.configured_key
                    .clone()
                    .or_else(|| std::env::var(&self.api_key_env).ok())
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        PlannerError::credentials(format!(
                            "Model API key is missing: set {}",
                            self.api_key_env
                        ))
                    })
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    #[instrument(skip_all, fields(model = %self.model, messages = conversation.len()))]
    async fn next_step(
        &self,
        conversation: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, PlannerError> {
        let api_key = self.api_key().await?;

        let request = Request {
            model: &self.model,
            messages: conversation.iter().map(Message::from).collect(),
            temperature: self.temperature,
            tools: tools.iter().map(Tool::from).collect(),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlannerError::timeout("model call", self.timeout)
                } else {
                    PlannerError::transport(format!("Model request failed: {e}"))
                }
            })?;
        let elapsed = start.elapsed();

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Model API returned {} after {:.2}s",
                status,
                elapsed.as_secs_f64()
            );
            return Err(status_error(status, &body));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| PlannerError::provider(format!("Malformed model response: {e}")))?;

        info!(
            "Model call to {} completed in {:.2}s",
            self.model,
            elapsed.as_secs_f64()
        );
        reply_from_response(body)
    }
}

fn status_error(status: StatusCode, body: &str) -> PlannerError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlannerError::credentials(format!(
            "Model provider rejected the API key (HTTP {}): {detail}",
            status.as_u16()
        )),
        _ => PlannerError::provider(format!("HTTP {}: {detail}", status.as_u16())),
    }
}

fn reply_from_response(response: Response) -> Result<ModelReply, PlannerError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| PlannerError::provider("Model response contained no choices"))?;

    let calls: Vec<ProposedToolCall> = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ProposedToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    if !calls.is_empty() {
        debug!("Model proposed {} tool call(s)", calls.len());
        return Ok(ModelReply::ToolCalls {
            content: message.content.filter(|c| !c.trim().is_empty()),
            calls,
        });
    }

    match message.content {
        Some(text) if !text.trim().is_empty() => Ok(ModelReply::Answer(text)),
        _ => Err(PlannerError::provider(
            "Model returned neither tool calls nor an answer",
        )),
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Message {
    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }
}

impl From<&ChatMessage> for Message {
    fn from(message: &ChatMessage) -> Self {
        match message {
            ChatMessage::System(text) => Message::text("system", text),
            ChatMessage::User(text) => Message::text("user", text),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => Message {
                role: "assistant",
                content: content.clone(),
                tool_calls: (!tool_calls.is_empty()).then(|| {
                    tool_calls
                        .iter()
                        .map(|call| ToolCallRequest {
                            id: call.id.clone(),
                            call_type: "function",
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect()
                }),
                tool_call_id: None,
                name: None,
            },
            ChatMessage::Tool {
                call_id,
                name,
                content,
            } => Message {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
                name: Some(name.clone()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ToolCallRequest {
    id: String,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: FunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON string of the arguments
    arguments: String,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: FunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for Tool<'a> {
    fn from(definition: &'a ToolDefinition) -> Self {
        Tool {
            tool_type: "function",
            function: FunctionDef {
                name: definition.name,
                description: definition.description,
                parameters: &definition.parameters,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallResponse>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallResponse {
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_without_key() -> ModelConfig {
        ModelConfig {
            api_key: None,
            api_key_env: "TRIPWISE_TEST_UNSET_KEY".to_string(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_completions_url() {
        let mut config = config_without_key();
        config.base_url = "https://api.groq.com/openai/v1/".to_string();
        let model = OpenAiCompatibleModel::new(&config).unwrap();
        assert_eq!(
            model.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_credentials_error() {
        let model = OpenAiCompatibleModel::new(&config_without_key()).unwrap();
        let err = model
            .next_step(&[ChatMessage::User("Plan a trip".into())], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::Credentials { .. }));
        assert!(err.to_string().contains("API key"));
        assert!(err.to_string().contains("TRIPWISE_TEST_UNSET_KEY"));
    }

    #[tokio::test]
    async fn test_configured_key_wins() {
        let mut config = config_without_key();
        config.api_key = Some("gsk_configured_key".to_string());
        let model = OpenAiCompatibleModel::new(&config).unwrap();
        assert_eq!(model.api_key().await.unwrap(), "gsk_configured_key");
    }

    #[test]
    fn test_status_errors() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        let err = status_error(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, PlannerError::Credentials { .. }));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Invalid API Key"));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, PlannerError::Provider { .. }));
        assert!(err.to_string().contains("429: slow down"));
    }

    #[test]
    fn test_reply_with_tool_calls() {
        let response: Response = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "search_flights", "arguments": "{\"source\":\"Delhi\",\"destination\":\"Goa\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let ModelReply::ToolCalls { content, calls } = reply_from_response(response).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(content, None);
        assert_eq!(calls[0].name, "search_flights");
        assert!(calls[0].arguments.contains("Delhi"));
    }

    #[test]
    fn test_reply_with_answer_and_empty_reply() {
        let response: Response = serde_json::from_value(json!({
            "choices": [{"message": {"content": "Day 1: Baga Beach"}}]
        }))
        .unwrap();
        assert_eq!(
            reply_from_response(response).unwrap(),
            ModelReply::Answer("Day 1: Baga Beach".to_string())
        );

        let response: Response =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  "}}]})).unwrap();
        assert!(matches!(
            reply_from_response(response),
            Err(PlannerError::Provider { .. })
        ));
    }

    #[test]
    fn test_wire_messages() {
        let assistant = ChatMessage::Assistant {
            content: None,
            tool_calls: vec![ProposedToolCall {
                id: "call_1".into(),
                name: "get_weather".into(),
                arguments: "{\"city\":\"Goa\"}".into(),
            }],
        };
        let wire = serde_json::to_value(Message::from(&assistant)).unwrap();
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "get_weather");

        let tool = ChatMessage::Tool {
            call_id: "call_1".into(),
            name: "get_weather".into(),
            content: "{}".into(),
        };
        let wire = serde_json::to_value(Message::from(&tool)).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
    }
}
