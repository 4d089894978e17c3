use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::chat::{ChatPresenter, SubmitOutcome, TurnUpdate};
use crate::config::AppConfig;
use crate::session::ConversationTurn;
use crate::ui;

/// Build the application router.
///
/// The request timeout covers every route except `/api/chat/respond`: a
/// model call is never cut short, so each turn always ends with answer text.
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/chat", post(api_chat))
        .route("/api/sessions/{id}/turns", get(api_get_turns))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        // Added after the timeout layer so it is not wrapped by it.
        .route("/api/chat/respond", post(api_chat_respond))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, presenter: ChatPresenter) -> anyhow::Result<()> {
    let idle = Duration::from_secs(config.server.session_idle_minutes * 60);
    let _sweeper = presenter.sessions().spawn_sweeper(idle);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppState {
        presenter,
        config: Arc::clone(&config),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - The chat page.
async fn index_handler() -> impl IntoResponse {
    Html(ui::chat_page())
}

/// Request body for chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// Raw text from the input box.
    #[serde(default)]
    message: String,
    /// Session ID (creates new if not provided).
    #[serde(default)]
    session_id: Option<String>,
}

/// Request body for the respond API.
#[derive(Debug, Deserialize)]
struct RespondRequest {
    session_id: String,
}

/// POST /api/chat - Append the user's question as a pending turn.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<SubmitOutcome> {
    tracing::debug!(
        message_length = req.message.len(),
        session_id = ?req.session_id,
        "Received chat submission"
    );

    Json(
        state
            .presenter
            .submit(req.session_id.as_deref(), &req.message),
    )
}

/// POST /api/chat/respond - Fill in the answer for the latest turn.
async fn api_chat_respond(
    State(state): State<AppState>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<TurnUpdate>, (StatusCode, String)> {
    match state.presenter.respond(&req.session_id).await {
        Ok(Some(update)) => Ok(Json(update)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "No turn to answer".to_string())),
        Err(e) => {
            tracing::error!(name: "config.invalid", error = %e, "Configuration error during answer");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /api/sessions/:id/turns - Current scrollback.
async fn api_get_turns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ConversationTurn>>, StatusCode> {
    state
        .presenter
        .turns(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
