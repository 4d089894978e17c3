//! Calls the real model. Needs network and GOOGLE_API_KEY (or a .env).
//!
//! cargo test --test live_answer -- --ignored

use cyber_assistant::answer::{CyberAssistant, FALLBACK_REPLY, PromptConfig};
use cyber_assistant::config::{AppConfig, DEFAULT_QUESTION};
use cyber_assistant::llm::{LlmSettings, build_driver};
use dotenvy::dotenv;

#[tokio::test]
#[ignore = "requires network access and a real API key"]
async fn test_phishing_question_gets_an_answer() {
    dotenv().ok();

    let config = AppConfig::load_from_args(["cyber-assistant"]).expect("config");
    let settings = LlmSettings::from_config(&config.model).expect("settings");
    settings
        .require_api_key()
        .expect("GOOGLE_API_KEY must be set for live tests");

    let assistant = CyberAssistant::new(build_driver(settings), PromptConfig::from(&config.model));
    let answer = assistant.ask(DEFAULT_QUESTION).await.expect("answer");

    assert!(!answer.trim().is_empty());
    assert_ne!(answer, FALLBACK_REPLY);
}
