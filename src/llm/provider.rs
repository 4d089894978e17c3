//! Provider-specific configuration and detection.
//!
//! This module handles differences between model API providers, including
//! URL patterns, credential lookup and wire protocol family.

use crate::config::ConfigError;

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Generative Language API (generativelanguage.googleapis.com)
    Gemini,
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible provider
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = Provider::detect_from_url("https://generativelanguage.googleapis.com");
    /// assert_eq!(provider, Provider::Gemini);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("generativelanguage.googleapis.com") {
            Self::Gemini
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Resolve the `model.provider` setting (`auto`, `gemini`, `openai`).
    ///
    /// `auto` detects from the base URL. `openai` means "any OpenAI-compatible
    /// endpoint" and still distinguishes known hosts for logging.
    pub fn from_setting(setting: &str, base_url: &str) -> Result<Self, ConfigError> {
        match setting.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::detect_from_url(base_url)),
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => match Self::detect_from_url(base_url) {
                Self::Gemini => Ok(Self::Generic),
                other => Ok(other),
            },
            other => Err(ConfigError::InvalidValue {
                key: "model.provider",
                reason: format!("unknown provider `{other}` (expected auto, gemini or openai)"),
            }),
        }
    }

    /// Whether this provider speaks the Chat Completions protocol.
    #[must_use]
    pub fn is_openai_compatible(self) -> bool {
        !matches!(self, Self::Gemini)
    }

    /// Conventional environment variable holding this provider's API key.
    #[must_use]
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAI | Self::OpenRouter | Self::Groq | Self::Generic => "LLM_API_KEY",
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
            Self::Generic => "openai-compatible",
        }
    }

    /// Build the generation endpoint URL for this provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL (trailing slash tolerated)
    /// * `model` - The model name (path segment for Gemini, body field otherwise)
    #[must_use]
    pub fn build_generate_url(self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::Gemini => format!("{base}/v1beta/models/{model}:generateContent"),
            _ => format!("{base}/v1/chat/completions"),
        }
    }
}
