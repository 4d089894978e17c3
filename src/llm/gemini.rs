//! Google Generative Language API driver.
//!
//! This module implements the [`TextGenerator`] trait for the Gemini
//! `models/{model}:generateContent` endpoint (non-streaming).

use super::{GenerationRequest, LlmError, LlmSettings, Provider, TextGenerator, checked_json};

/// Driver for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiDriver {
    /// Create a new Gemini driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiDriver {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, LlmError> {
        let api_key = self.settings.require_api_key()?;
        let url = Provider::Gemini.build_generate_url(&self.settings.base_url, &self.settings.model);

        tracing::debug!(
            model = %self.settings.model,
            temperature = req.temperature,
            max_output_tokens = req.max_output_tokens,
            "Sending generateContent request"
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(req))
            .send()
            .await?;

        let v = checked_json(resp).await?;
        extract_text(&v)
    }
}

/// Build the `generateContent` request body.
pub(crate) fn request_body(req: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": req.system }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": req.user }]
        }],
        "generationConfig": {
            "temperature": req.temperature,
            "maxOutputTokens": req.max_output_tokens
        }
    })
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(v: &serde_json::Value) -> Result<String, LlmError> {
    let candidate = &v["candidates"][0];
    let text: String = candidate["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        let reason = candidate
            .get("finishReason")
            .or_else(|| v["promptFeedback"].get("blockReason"))
            .and_then(|r| r.as_str())
            .unwrap_or("no text parts");
        return Err(LlmError::Malformed(format!("empty candidate ({reason})")));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system: "be brief".to_string(),
            user: "Question: what is MFA?".to_string(),
            temperature: 0.2,
            max_output_tokens: 512,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body(&request());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Question: what is MFA?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let v = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "MFA adds " }, { "text": "a second factor." }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&v).unwrap(), "MFA adds a second factor.");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let v = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_text(&v).unwrap_err();
        assert!(matches!(err, LlmError::Malformed(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_extract_text_empty_parts() {
        let v = json!({ "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }] });
        let err = extract_text(&v).unwrap_err();
        assert!(matches!(err, LlmError::Malformed(ref m) if m.contains("MAX_TOKENS")));
    }
}
