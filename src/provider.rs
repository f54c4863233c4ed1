//! Model Provider Abstraction
//!
//! Unified interface for the upstream text models (OpenAI, Anthropic, local
//! models via Ollama, custom OpenAI-compatible servers). Each call is one
//! atomic request/response exchange; streaming is not supported.
//!
//! Transport failures are classified into [`ProviderError`] here so the
//! generation client can tell rate limiting apart from other failures.

use crate::error::{ApiError, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub mod profile;

pub use profile::{ProviderConfig, ProviderType};

/// Resolved connection settings for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For custom endpoints (e.g., Azure OpenAI)
    },
    Anthropic {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        model: String,
        endpoint: String, // Full endpoint URL (e.g., http://localhost:8080/v1)
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Function the model is forced to call; `parameters` is a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default)]
    pub temperature: Option<f32>, // 0.0-2.0
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    /// Structured function-call request instead of free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionSpec>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(4096),
            top_p: None,
            stop: None,
            function: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    /// Raw arguments of the forced function call, when one was made.
    pub function_arguments: Option<String>,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

fn role_to_string(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "ratelimit",
    "quota",
    "too many requests",
    "resource_exhausted",
];

/// Classify a non-success HTTP status and its body.
pub fn map_status(status: u16, body: &str) -> ProviderError {
    let lowered = body.to_ascii_lowercase();
    let mentions_rate_limit = RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m));
    match status {
        429 => ProviderError::RateLimited(body.to_string()),
        401 | 403 => ProviderError::Auth(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        _ if mentions_rate_limit => ProviderError::RateLimited(body.to_string()),
        500..=599 => ProviderError::Server {
            status,
            message: body.to_string(),
        },
        _ => ProviderError::Request(format!("status {}: {}", status, body)),
    }
}

fn map_http_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(error.to_string())
    } else if error.is_connect() {
        ProviderError::Connection(error.to_string())
    } else if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_decode() {
        ProviderError::InvalidResponse(error.to_string())
    } else {
        ProviderError::Request(error.to_string())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(map_status(status.as_u16(), &body))
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            ApiError::ProviderError(ProviderError::Request(format!(
                "Failed to create HTTP client: {}",
                e
            )))
        })
}

// OpenAI-compatible wire format
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
    stream: bool,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Deserialize)]
struct ToolCallFunction {
    #[serde(default)]
    arguments: String,
}

/// Client for OpenAI and every server speaking its chat-completions API.
pub struct OpenAICompatibleClient {
    client: Client,
    provider_name: &'static str,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAICompatibleClient {
    pub fn openai(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        Self::build(
            "openai",
            model,
            Some(api_key),
            base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        )
    }

    pub fn ollama(model: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
        let base = base.trim_end_matches('/');
        let base_url = if base.ends_with("/v1") {
            base.to_string()
        } else {
            format!("{}/v1", base)
        };
        Self::build("ollama", model, None, base_url)
    }

    pub fn local(model: String, endpoint: String, api_key: Option<String>) -> Result<Self, ApiError> {
        Self::build("local", model, api_key, endpoint)
    }

    fn build(
        provider_name: &'static str,
        model: String,
        api_key: Option<String>,
        base_url: String,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            provider_name,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn openai_request_body(
    model: &str,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
) -> ChatCompletionRequest {
    let (tools, tool_choice) = match &options.function {
        Some(function) => (
            Some(json!([{
                "type": "function",
                "function": {
                    "name": function.name,
                    "description": function.description,
                    "parameters": function.parameters,
                }
            }])),
            Some(json!({"type": "function", "function": {"name": function.name}})),
        ),
        None => (None, None),
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages: messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: role_to_string(msg.role),
                content: msg.content,
            })
            .collect(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        top_p: options.top_p,
        stop: options.stop,
        tools,
        tool_choice,
        stream: false,
    }
}

#[async_trait]
impl ModelProviderClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = openai_request_body(&self.model, messages, options);

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.json(&request).send().await.map_err(map_http_error)?;
        let response = ensure_success(response).await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        let function_arguments = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| call.function.arguments)
            .find(|arguments| !arguments.trim().is_empty());

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            function_arguments,
            model: if completion.model.is_empty() {
                self.model.clone()
            } else {
                completion.model
            },
            usage: completion.usage.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4096;

impl AnthropicClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            model,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.anthropic.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn anthropic_request_body(model: &str, messages: Vec<ChatMessage>, options: &CompletionOptions) -> Value {
    let system: Vec<String> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.clone())
        .collect();

    let conversation: Vec<Value> = messages
        .into_iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| json!({"role": role_to_string(m.role), "content": m.content}))
        .collect();

    let mut body = json!({
        "model": model,
        "max_tokens": options.max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS),
        "messages": conversation,
    });
    if !system.is_empty() {
        body["system"] = json!(system.join("\n\n"));
    }
    if let Some(temperature) = options.temperature {
        // Anthropic accepts 0.0..=1.0
        body["temperature"] = json!(temperature.min(1.0));
    }
    if let Some(top_p) = options.top_p {
        body["top_p"] = json!(top_p);
    }
    if let Some(stop) = &options.stop {
        body["stop_sequences"] = json!(stop);
    }
    if let Some(function) = &options.function {
        body["tools"] = json!([{
            "name": function.name,
            "description": function.description,
            "input_schema": function.parameters,
        }]);
        body["tool_choice"] = json!({"type": "tool", "name": function.name});
    }
    body
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
    #[serde(default)]
    model: String,
    usage: Option<AnthropicUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text {
        text: String,
    },
    ToolUse {
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl ModelProviderClient for AnthropicClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = anthropic_request_body(&self.model, messages, &options);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = ensure_success(response).await?;

        let completion: AnthropicResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let mut content = String::new();
        let mut function_arguments = None;
        for block in completion.content {
            match block {
                AnthropicContent::Text { text } => content.push_str(&text),
                AnthropicContent::ToolUse { input } if function_arguments.is_none() => {
                    function_arguments = Some(input.to_string());
                }
                _ => {}
            }
        }

        let usage = completion
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            function_arguments,
            model: if completion.model.is_empty() {
                self.model.clone()
            } else {
                completion.model
            },
            usage,
            finish_reason: completion.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(provider: &ModelProvider) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Anthropic {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(AnthropicClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Ollama { model, base_url } => Ok(Box::new(
                OpenAICompatibleClient::ollama(model.clone(), base_url.clone())?,
            )),
            ModelProvider::LocalCustom {
                model,
                endpoint,
                api_key,
            } => Ok(Box::new(OpenAICompatibleClient::local(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
            )?)),
        }
    }

    /// Resolve a configured profile and build its client.
    pub fn from_config(config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::ConfigError(format!("Invalid provider configuration: {}", e)))?;
        Self::create_client(&config.to_model_provider()?)
    }
}
