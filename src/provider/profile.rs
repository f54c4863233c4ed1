//! Provider profile as it appears in configuration files.

use crate::error::ApiError;
use crate::provider::{CompletionOptions, ModelProvider};
use serde::{Deserialize, Serialize};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Anthropic,
    Ollama,
    #[serde(alias = "local_custom", alias = "custom")]
    Local,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
            ProviderType::Local => "local",
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some(OPENAI_API_KEY_ENV),
            ProviderType::Anthropic => Some(ANTHROPIC_API_KEY_ENV),
            ProviderType::Ollama | ProviderType::Local => None,
        }
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, ProviderType::OpenAI | ProviderType::Anthropic)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override; required for `local`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub default_options: CompletionOptions,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::default(),
            model: default_model(),
            api_key: None,
            endpoint: None,
            default_options: CompletionOptions::default(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Endpoint must start with http:// or https://: {}",
                    endpoint
                ));
            }
        }
        if self.provider_type == ProviderType::Local && self.endpoint.is_none() {
            return Err("Local providers require an endpoint".to_string());
        }
        if let Some(temperature) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!("Temperature must be within 0.0..=2.0, got {}", temperature));
            }
        }
        Ok(())
    }

    /// Configured key, else the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.provider_type
                    .api_key_env()
                    .and_then(|name| std::env::var(name).ok())
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        let model = self.model.clone();
        let require_key = || {
            self.resolve_api_key().ok_or_else(|| {
                ApiError::ProviderNotConfigured(format!(
                    "No API key for {} (set provider.api_key or {})",
                    self.provider_type.as_str(),
                    self.provider_type.api_key_env().unwrap_or("an API key")
                ))
            })
        };
        Ok(match self.provider_type {
            ProviderType::OpenAI => ModelProvider::OpenAI {
                model,
                api_key: require_key()?,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => ModelProvider::Anthropic {
                model,
                api_key: require_key()?,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Ollama => ModelProvider::Ollama {
                model,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Local => ModelProvider::LocalCustom {
                model,
                endpoint: self.endpoint.clone().ok_or_else(|| {
                    ApiError::ProviderNotConfigured(
                        "Local providers require an endpoint".to_string(),
                    )
                })?,
                api_key: self.resolve_api_key(),
            },
        })
    }
}
