//! Cybersecurity AI Assistant
//!
//! A single-page chat front-end that forwards beginner cybersecurity
//! questions to a hosted language model and shows the answers.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server serving the page and a small JSON API
//! - **Presentation**: per-session scrollback, two-phase submit/respond
//! - **Answering**: fixed persona prompt, one stateless model call per question
//! - **Drivers**: Gemini `generateContent` and `OpenAI`-compatible Chat Completions
//!
//! # Modules
//!
//! - [`answer`]: prompt building and the answer/fallback rules
//! - [`chat`]: submit and respond operations behind the page
//! - [`config`]: CLI flags and layered configuration
//! - [`llm`]: remote text-generation drivers
//! - [`session`]: in-memory conversation turns
//! - [`server`]: router and handlers
//! - [`ui`]: HTML page

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod answer;
pub mod chat;
pub mod config;
pub mod llm;
pub mod server;
pub mod session;
pub mod ui;

use crate::config::AppConfig;

use chat::ChatPresenter;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Submit/respond logic and the scrollback store.
    pub presenter: ChatPresenter,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
