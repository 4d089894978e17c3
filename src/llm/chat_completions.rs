//! OpenAI Chat Completions API driver.
//!
//! This module implements the [`TextGenerator`] trait for the OpenAI Chat
//! Completions API (`/v1/chat/completions`) and compatible hosts. Requests
//! are sent with `stream: false`; the whole answer arrives in one body.

use super::{GenerationRequest, LlmError, LlmSettings, MessageRole, TextGenerator, checked_json};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ChatCompletionsDriver {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, LlmError> {
        let api_key = self.settings.require_api_key()?;
        let url = self
            .settings
            .provider
            .build_generate_url(&self.settings.base_url, &self.settings.model);

        tracing::debug!(
            provider = self.settings.provider.label(),
            model = %self.settings.model,
            "Sending chat completions request"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body(&self.settings.model, req))
            .send()
            .await?;

        let v = checked_json(resp).await?;
        extract_text(&v)
    }
}

/// Build the non-streaming chat completions body.
pub(crate) fn request_body(model: &str, req: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "stream": false,
        "temperature": req.temperature,
        "max_tokens": req.max_output_tokens,
        "messages": [
            { "role": MessageRole::System, "content": req.system },
            { "role": MessageRole::User, "content": req.user }
        ]
    })
}

/// Read `choices[0].message.content`.
pub(crate) fn extract_text(v: &serde_json::Value) -> Result<String, LlmError> {
    match v["choices"][0]["message"]["content"].as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => {
            let reason = v["choices"][0]["finish_reason"]
                .as_str()
                .unwrap_or("no message content");
            Err(LlmError::Malformed(format!("empty choice ({reason})")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_messages() {
        let req = GenerationRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            temperature: 0.5,
            max_output_tokens: 64,
        };
        let body = request_body("gpt-4o-mini", &req);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], false);
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn test_extract_text() {
        let v = json!({ "choices": [{ "message": { "role": "assistant", "content": "Use a firewall." } }] });
        assert_eq!(extract_text(&v).unwrap(), "Use a firewall.");
    }

    #[test]
    fn test_extract_text_missing() {
        let v = json!({ "choices": [{ "message": { "content": null }, "finish_reason": "length" }] });
        let err = extract_text(&v).unwrap_err();
        assert!(matches!(err, LlmError::Malformed(ref m) if m.contains("length")));
    }
}
