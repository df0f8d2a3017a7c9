//! LLM backend abstraction
//!
//! Groq, OpenAI and OpenRouter speak the OpenAI chat API and share one
//! client; Anthropic is called over its own messages endpoint.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// Generic LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion with system prompt
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

/// Thread-safe reference to an LLM backend
pub type SharedBackend = Arc<dyn LlmBackend>;

/// Hosted model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAI,
    OpenRouter,
    Anthropic,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAI => "gpt-4o-mini",
            Self::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn api_base(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some(GROQ_API_BASE),
            Self::OpenRouter => Some(OPENROUTER_API_BASE),
            Self::OpenAI | Self::Anthropic => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groq => write!(f, "Groq"),
            Self::OpenAI => write!(f, "OpenAI"),
            Self::OpenRouter => write!(f, "OpenRouter"),
            Self::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// Connection and sampling settings for one backend
#[derive(Clone)]
pub struct BackendConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    /// Overrides the provider's endpoint (local OpenAI-compatible servers)
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u16,
}

impl BackendConfig {
    /// Short, low-temperature completions on the provider's default model
    pub fn new(provider: Provider, api_key: &str) -> Self {
        Self {
            provider,
            api_key: api_key.to_string(),
            model: provider.default_model().to_string(),
            base_url: None,
            temperature: 0.1,
            max_tokens: 100,
        }
    }

    pub fn groq(api_key: &str) -> Self {
        Self::new(Provider::Groq, api_key)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u16) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Backend for every OpenAI-compatible chat API
pub struct OpenAICompatibleBackend {
    client: Client<OpenAIConfig>,
    config: BackendConfig,
}

impl OpenAICompatibleBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config(format!("{} API key is empty", config.provider)));
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base) = config.base_url.as_deref().or(config.provider.api_base()) {
            openai_config = openai_config.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            config,
        })
    }
}

#[async_trait]
impl LlmBackend for OpenAICompatibleBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Anthropic messages API backend
pub struct AnthropicBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("Anthropic API key is empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": system,
            "messages": [
                {"role": "user", "content": user}
            ]
        });

        let url = self.config.base_url.as_deref().unwrap_or(ANTHROPIC_MESSAGES_URL);
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("Anthropic API error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        json["content"]
            .as_array()
            .and_then(|blocks| blocks.iter().find_map(|block| block["text"].as_str()))
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Create a shared backend for the configured provider
pub fn create_backend(config: BackendConfig) -> Result<SharedBackend, LlmError> {
    match config.provider {
        Provider::Anthropic => Ok(Arc::new(AnthropicBackend::new(config)?)),
        _ => Ok(Arc::new(OpenAICompatibleBackend::new(config)?)),
    }
}
