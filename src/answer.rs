//! Cybersecurity question answering.
//!
//! [`CyberAssistant`] wraps a [`TextGenerator`] with a fixed persona prompt.
//! Every call is independent: nothing from earlier questions is sent along.
//!
//! # Example
//!
//! ```rust,ignore
//! let assistant = CyberAssistant::new(build_driver(settings), PromptConfig::default());
//! let answer = assistant.ask("What is phishing and how can I avoid it?").await?;
//! ```

use std::sync::Arc;

use crate::config::{ConfigError, ModelConfig};
use crate::llm::{GenerationRequest, LlmError, TextGenerator};

/// Returned for blank questions; no remote call is made.
pub const EMPTY_QUESTION_REPLY: &str = "Please enter a question.";

/// Returned whenever the remote call fails, whatever the cause.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't process that right now. Please verify your API key and try again.";

/// Persona and answer-shape instructions sent as the system message.
pub const SYSTEM_INSTRUCTION: &str = "You are a concise cybersecurity assistant. \
Answer in simple, beginner-friendly language. \
Focus on core definitions, common signs, and practical steps. \
Keep responses short (2-6 sentences). \
If asked about unsafe actions, refuse and explain safer alternatives. \
Topics include phishing, DDoS, SIEM, ransomware, firewalls, MFA, and basic best practices.";

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl From<&ModelConfig> for PromptConfig {
    fn from(model: &ModelConfig) -> Self {
        Self {
            temperature: model.temperature,
            max_output_tokens: model.max_output_tokens,
        }
    }
}

impl PromptConfig {
    /// Apply per-call overrides on top of these defaults.
    #[must_use]
    pub fn with_overrides(self, temperature: Option<f32>, max_output_tokens: Option<u32>) -> Self {
        Self {
            temperature: temperature.unwrap_or(self.temperature),
            max_output_tokens: max_output_tokens.unwrap_or(self.max_output_tokens),
        }
    }
}

/// Human message wrapping the (already trimmed) question.
pub fn user_message(question: &str) -> String {
    format!(
        "Question: {question}\n\
         Provide a clear, direct answer. If relevant, include 2-3 bullet best practices."
    )
}

/// Build the full two-message request for a question.
pub fn build_request(question: &str, config: PromptConfig) -> GenerationRequest {
    GenerationRequest {
        system: SYSTEM_INSTRUCTION.to_string(),
        user: user_message(question),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
    }
}

/// Answers one question at a time through a remote model.
#[derive(Clone)]
pub struct CyberAssistant {
    generator: Arc<dyn TextGenerator>,
    defaults: PromptConfig,
}

impl std::fmt::Debug for CyberAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyberAssistant")
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl CyberAssistant {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, defaults: PromptConfig) -> Self {
        Self {
            generator,
            defaults,
        }
    }

    /// Answer with the configured temperature and token limit.
    pub async fn ask(&self, question: &str) -> Result<String, ConfigError> {
        self.answer(question, None, None).await
    }

    /// Answer a question, optionally overriding sampling settings.
    ///
    /// Blank questions get [`EMPTY_QUESTION_REPLY`]. Any remote failure
    /// becomes [`FALLBACK_REPLY`]. Only configuration errors are returned as
    /// `Err`.
    pub async fn answer(
        &self,
        question: &str,
        temperature: Option<f32>,
        max_output_tokens: Option<u32>,
    ) -> Result<String, ConfigError> {
        let cleaned = question.trim();
        if cleaned.is_empty() {
            return Ok(EMPTY_QUESTION_REPLY.to_string());
        }

        let config = self.defaults.with_overrides(temperature, max_output_tokens);
        let req = build_request(cleaned, config);

        tracing::debug!(
            question = %cleaned,
            temperature = config.temperature,
            max_output_tokens = config.max_output_tokens,
            "Requesting answer"
        );

        match self.generator.generate(&req).await {
            Ok(text) => {
                tracing::info!(
                    name: "answer.completed",
                    answer_length = text.len(),
                    "Answer received"
                );
                Ok(text)
            }
            Err(LlmError::Config(e)) => Err(e),
            Err(e) => {
                tracing::warn!(name: "answer.remote_failed", error = %e, "Remote call failed");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}
