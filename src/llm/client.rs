use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Category;

/// Model used when neither the caller nor the configuration names one
pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";

/// Default model for the Anthropic engine
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Per-request HTTP timeout; a completion that takes longer fails upstream
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const ANTHROPIC_VERSION: &str = "2023-06-01";
const RECORD_TOOL: &str = "submit_record";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("environment variable {0} not set")]
    MissingCredentials(&'static str),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {engine} failed: {source}")]
    Request {
        engine: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{engine} API error: {status} - {body}")]
    Api {
        engine: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {engine} response: {source}")]
    Decode {
        engine: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{engine} returned no usable content")]
    EmptyResponse { engine: &'static str },
}

/// Output constraint requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    /// A single JSON object, with no prose around it
    JsonObject,
}

/// One completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Overrides the engine's default model
    pub model: Option<String>,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

/// What an engine hands back
///
/// Engines that can return structured input directly (tool calls) produce
/// `Json`; everything else is `Text` and parsed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    Text(String),
    Json(Value),
}

impl CompletionPayload {
    /// Text form of the payload; JSON is serialized
    pub fn as_text(&self) -> String {
        match self {
            CompletionPayload::Text(text) => text.clone(),
            CompletionPayload::Json(value) => value.to_string(),
        }
    }

    /// The structured value, or the raw text when the engine supplied text
    pub fn into_json(self) -> Result<Value, String> {
        match self {
            CompletionPayload::Json(value) => Ok(value),
            CompletionPayload::Text(text) => Err(text),
        }
    }
}

/// A chat-completion backend
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Short engine name for logs and results
    fn name(&self) -> &'static str;

    fn default_model(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, LlmError>;

    /// Model a request will actually be served by
    fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(self.default_model())
            .to_string()
    }
}

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    OpenAi,
    Anthropic,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(EngineKind::OpenAi),
            "anthropic" | "claude" => Ok(EngineKind::Anthropic),
            other => Err(format!("unknown engine: {} (expected openai or anthropic)", other)),
        }
    }
}

/// Connection settings for a completion engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl EngineConfig {
    /// OPENAI_API_KEY, with OPENAI_BASE_URL for compatible servers
    pub fn openai_from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::MissingCredentials("OPENAI_API_KEY"))?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn anthropic_from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| LlmError::MissingCredentials("ANTHROPIC_API_KEY"))?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn from_env(kind: EngineKind) -> Result<Self, LlmError> {
        match kind {
            EngineKind::OpenAi => Self::openai_from_env(),
            EngineKind::Anthropic => Self::anthropic_from_env(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn http_client(&self) -> Result<Client, LlmError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(LlmError::ClientBuild)
    }
}

/// Build a shareable engine from environment configuration
pub fn build_engine(
    kind: EngineKind,
    model: Option<String>,
) -> Result<Arc<dyn CompletionEngine>, LlmError> {
    let mut config = EngineConfig::from_env(kind)?;
    if let Some(model) = model {
        config = config.with_model(model);
    }

    let engine: Arc<dyn CompletionEngine> = match kind {
        EngineKind::OpenAi => Arc::new(OpenAiEngine::new(config)?),
        EngineKind::Anthropic => Arc::new(AnthropicEngine::new(config)?),
    };
    Ok(engine)
}

/// OpenAI-compatible chat completions client
pub struct OpenAiEngine {
    client: Client,
    config: EngineConfig,
}

impl OpenAiEngine {
    pub fn new(config: EngineConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: config.http_client()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionEngine for OpenAiEngine {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, LlmError> {
        let body = ChatRequest {
            model: self.resolve_model(request.model.as_deref()),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: match request.response_format {
                ResponseFormat::JsonObject => Some(ChatResponseFormat {
                    format_type: "json_object".to_string(),
                }),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                engine: self.name(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                engine: self.name(),
                status,
                body,
            });
        }

        let response: ChatResponse = response.json().await.map_err(|source| LlmError::Decode {
            engine: self.name(),
            source,
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .map(CompletionPayload::Text)
            .ok_or(LlmError::EmptyResponse {
                engine: self.name(),
            })
    }
}

/// Anthropic Messages API client
///
/// JSON output is obtained by forcing a tool call whose input is the record.
pub struct AnthropicEngine {
    client: Client,
    config: EngineConfig,
}

impl AnthropicEngine {
    pub fn new(config: EngineConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: config.http_client()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

/// Tool schema for record submission: one optional object per category
fn record_tool() -> Tool {
    let properties: serde_json::Map<String, Value> = Category::ALL
        .iter()
        .map(|category| {
            (
                category.key().to_string(),
                serde_json::json!({
                    "type": "object",
                    "description": category.title(),
                }),
            )
        })
        .collect();

    Tool {
        name: RECORD_TOOL.to_string(),
        description: "Submit the structured incident record extracted from the conversation"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": properties,
        }),
    }
}

#[async_trait]
impl CompletionEngine for AnthropicEngine {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, LlmError> {
        let wants_json = request.response_format == ResponseFormat::JsonObject;

        let body = AnthropicRequest {
            model: self.resolve_model(request.model.as_deref()),
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
            system: Some(request.system.clone()),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.user.clone(),
            }],
            tools: if wants_json { vec![record_tool()] } else { vec![] },
            tool_choice: wants_json.then(|| ToolChoice {
                choice_type: "tool".to_string(),
                name: RECORD_TOOL.to_string(),
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                engine: self.name(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                engine: self.name(),
                status,
                body,
            });
        }

        let response: AnthropicResponse =
            response.json().await.map_err(|source| LlmError::Decode {
                engine: self.name(),
                source,
            })?;

        if wants_json {
            let input = response.content.into_iter().find_map(|block| {
                (block.content_type == "tool_use" && block.name.as_deref() == Some(RECORD_TOOL))
                    .then_some(block.input)
                    .flatten()
            });
            if let Some(input) = input {
                return Ok(CompletionPayload::Json(input));
            }
            return Err(LlmError::EmptyResponse {
                engine: self.name(),
            });
        }

        let text: String = response
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                engine: self.name(),
            });
        }
        Ok(CompletionPayload::Text(text))
    }
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}
