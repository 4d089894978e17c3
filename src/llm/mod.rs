//! Remote text-generation drivers.
//!
//! This module provides a provider-agnostic abstraction for sending a single
//! system instruction plus user message to a hosted model and reading back
//! the generated text.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Generative Language API (`:generateContent`)
//! - [`ChatCompletionsDriver`]: `OpenAI`-compatible Chat Completions API (`/v1/chat/completions`)
//!
//! # Example
//!
//! ```rust,ignore
//! use cyber_assistant::llm::{build_driver, GenerationRequest, LlmSettings, Provider};
//!
//! let settings = LlmSettings {
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     api_key: Some("AIza...".to_string()),
//!     model: "gemini-2.5-flash-lite".to_string(),
//!     provider: Provider::Gemini,
//! };
//! let driver = build_driver(settings);
//! ```

pub mod chat_completions;
pub mod gemini;
pub mod provider;

use std::sync::Arc;

pub use chat_completions::ChatCompletionsDriver;
pub use gemini::GeminiDriver;
pub use provider::Provider;

use crate::config::{ConfigError, ModelConfig};

/// Model connection settings, resolved once at process start.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the model API (e.g., `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gemini-2.5-flash-lite`).
    pub model: String,
    /// Wire protocol family.
    pub provider: Provider,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .finish()
    }
}

impl LlmSettings {
    /// Build settings from the `model` section of the application config.
    ///
    /// The API key is taken from `model.api_key` when set, otherwise from the
    /// provider's conventional environment variable. A missing key is not an
    /// error here; see [`LlmSettings::require_api_key`].
    pub fn from_config(model: &ModelConfig) -> Result<Self, ConfigError> {
        let provider = Provider::from_setting(&model.provider, &model.base_url)?;
        let api_key = crate::config::resolve_api_key(model, provider);

        Ok(Self {
            base_url: model.base_url.clone(),
            api_key,
            model: model.name.clone(),
            provider,
        })
    }

    /// Return the API key, or the configuration error describing where it
    /// should have come from.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: self.provider.label(),
                env_var: self.provider.api_key_env(),
            })
    }
}

/// Role of a prompt message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction.
    System,
    /// Human message.
    User,
}

/// A single, stateless generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Fixed system instruction.
    pub system: String,
    /// Human message carrying the question.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_output_tokens: u32,
}

/// Failures of a remote generation call.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The driver was built without a usable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport-level failure (DNS, TLS, connection reset, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The API answered successfully but no text could be extracted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Trait for remote text-generation drivers.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one request and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] when the driver has no credential, and
    /// any other variant when the remote call fails.
    async fn generate(&self, req: &GenerationRequest) -> Result<String, LlmError>;
}

/// Turn a non-success status into [`LlmError::Status`], otherwise decode JSON.
pub(crate) async fn checked_json(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let v = resp.json::<serde_json::Value>().await?;
    Ok(v)
}

/// Build the driver matching the configured provider.
pub fn build_driver(settings: LlmSettings) -> Arc<dyn TextGenerator> {
    if settings.provider.is_openai_compatible() {
        Arc::new(ChatCompletionsDriver::new(settings))
    } else {
        Arc::new(GeminiDriver::new(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: api_key.map(ToString::to_string),
            model: "gemini-2.5-flash-lite".to_string(),
            provider: Provider::Gemini,
        }
    }

    #[test]
    fn test_require_api_key_present() {
        let s = settings(Some("secret"));
        assert_eq!(s.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_require_api_key_blank_is_missing() {
        let s = settings(Some("   "));
        let err = s.require_api_key().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingApiKey { env_var: "GOOGLE_API_KEY", .. }
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let s = settings(Some("super-secret"));
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
