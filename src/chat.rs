//! Chat presentation logic.
//!
//! A submission is handled in two steps so the page can show the question
//! right away: [`ChatPresenter::submit`] appends a pending turn, then
//! [`ChatPresenter::respond`] asks the model and fills the answer in.

use serde::Serialize;

use crate::answer::CyberAssistant;
use crate::config::ConfigError;
use crate::session::{ConversationTurn, Scrollback, ScrollbackStore};

/// Result of submitting input.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// Session the input was applied to. Absent when blank input arrives
    /// without a known session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// `false` when the input was blank and nothing was appended.
    pub accepted: bool,
    /// Index of the new pending turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_index: Option<usize>,
    /// Scrollback after the submission.
    pub turns: Vec<ConversationTurn>,
}

/// A turn whose answer has arrived.
#[derive(Debug, Clone, Serialize)]
pub struct TurnUpdate {
    pub session_id: String,
    pub turn_index: usize,
    pub turn: ConversationTurn,
}

#[derive(Debug, Clone)]
pub struct ChatPresenter {
    assistant: CyberAssistant,
    sessions: ScrollbackStore,
}

impl ChatPresenter {
    #[must_use]
    pub fn new(assistant: CyberAssistant, sessions: ScrollbackStore) -> Self {
        Self {
            assistant,
            sessions,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &ScrollbackStore {
        &self.sessions
    }

    fn existing(&self, session_id: Option<&str>) -> Option<Scrollback> {
        session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .and_then(|id| self.sessions.get(id))
    }

    /// Append the raw input as a pending turn, unless it is blank.
    ///
    /// Blank input never creates a session.
    pub fn submit(&self, session_id: Option<&str>, raw: &str) -> SubmitOutcome {
        if raw.trim().is_empty() {
            let scrollback = self.existing(session_id);
            tracing::debug!(session_id = ?session_id, "Ignoring blank submission");
            return SubmitOutcome {
                session_id: scrollback.as_ref().map(|s| s.id().to_string()),
                accepted: false,
                turn_index: None,
                turns: scrollback.map(|s| s.turns()).unwrap_or_default(),
            };
        }

        let scrollback = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self.sessions.get_or_create(id),
            None => self.sessions.create(),
        };
        let turn_index = scrollback.push_question(raw);
        tracing::info!(
            name: "chat.turn.created",
            session_id = %scrollback.id(),
            turn_index = turn_index,
            "Turn created"
        );

        SubmitOutcome {
            session_id: Some(scrollback.id().to_string()),
            accepted: true,
            turn_index: Some(turn_index),
            turns: scrollback.turns(),
        }
    }

    /// Answer the most recent turn of a session.
    ///
    /// A turn that already has an answer is returned as is. `Ok(None)` means
    /// the session is unknown or empty.
    pub async fn respond(&self, session_id: &str) -> Result<Option<TurnUpdate>, ConfigError> {
        let Some(scrollback) = self.sessions.get(session_id) else {
            return Ok(None);
        };
        let Some((turn_index, turn)) = scrollback.last_turn() else {
            return Ok(None);
        };

        if !turn.is_pending() {
            return Ok(Some(TurnUpdate {
                session_id: session_id.to_string(),
                turn_index,
                turn,
            }));
        }

        // No lock is held across the remote call.
        let answer = self.assistant.ask(&turn.question).await?;

        let stored = scrollback.fill_answer(turn_index, answer);
        if stored.is_some() {
            tracing::info!(
                name: "chat.turn.answered",
                session_id = %session_id,
                turn_index = turn_index,
                "Turn answered"
            );
        }

        Ok(stored.map(|turn| TurnUpdate {
            session_id: session_id.to_string(),
            turn_index,
            turn,
        }))
    }

    /// Current scrollback of a session.
    #[must_use]
    pub fn turns(&self, session_id: &str) -> Option<Vec<ConversationTurn>> {
        self.sessions.get(session_id).map(|s| s.turns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{FALLBACK_REPLY, PromptConfig};
    use crate::llm::{GenerationRequest, LlmError, TextGenerator};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, req: &GenerationRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LlmError::Malformed("boom".to_string()))
            } else {
                Ok(format!("answer to [{}]", req.user))
            }
        }
    }

    fn presenter(fail: bool) -> (ChatPresenter, Arc<CountingGenerator>) {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail,
        });
        let dyn_gen: Arc<dyn TextGenerator> = Arc::<CountingGenerator>::clone(&generator);
        let assistant = CyberAssistant::new(dyn_gen, PromptConfig::default());
        (ChatPresenter::new(assistant, ScrollbackStore::new()), generator)
    }

    fn session_of(out: &SubmitOutcome) -> &str {
        out.session_id.as_deref().unwrap()
    }

    #[test]
    fn test_blank_submission_creates_no_turn() {
        let (presenter, generator) = presenter(false);
        let first = presenter.submit(None, "   ");
        assert!(!first.accepted);
        assert!(first.session_id.is_none());
        assert!(first.turns.is_empty());
        assert!(presenter.sessions().is_empty());

        let out = presenter.submit(None, "What is a VPN?");
        let id = out.session_id.unwrap();
        let again = presenter.submit(Some(&id), "\n\t");
        assert!(!again.accepted);
        assert_eq!(again.session_id.as_deref(), Some(id.as_str()));
        assert_eq!(again.turns.len(), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_submissions_leave_store_untouched() {
        let (presenter, _) = presenter(false);
        for raw in ["", "  ", "\n"] {
            presenter.submit(None, raw);
            presenter.submit(Some("not-a-session"), raw);
        }
        assert_eq!(presenter.sessions().len(), 0);
        assert!(presenter.turns("not-a-session").is_none());
    }

    #[test]
    fn test_submission_appends_pending_turn() {
        let (presenter, _) = presenter(false);
        let out = presenter.submit(None, "What is ransomware?");
        assert!(out.accepted);
        assert_eq!(out.turn_index, Some(0));
        assert_eq!(out.turns.len(), 1);
        assert_eq!(out.turns[0].question, "What is ransomware?");
        assert!(out.turns[0].is_pending());
    }

    #[tokio::test]
    async fn test_respond_fills_latest_turn_once() {
        let (presenter, generator) = presenter(false);
        let out = presenter.submit(None, "What is MFA?");

        let update = presenter.respond(session_of(&out)).await.unwrap().unwrap();
        assert_eq!(update.turn_index, 0);
        let answer = update.turn.answer.unwrap();
        assert!(answer.contains("What is MFA?"));

        let again = presenter.respond(session_of(&out)).await.unwrap().unwrap();
        assert_eq!(again.turn.answer.as_deref(), Some(answer.as_str()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_respond_targets_most_recent_turn() {
        let (presenter, _) = presenter(false);
        let out = presenter.submit(None, "first");
        presenter.respond(session_of(&out)).await.unwrap();
        presenter.submit(out.session_id.as_deref(), "second");

        let update = presenter.respond(session_of(&out)).await.unwrap().unwrap();
        assert_eq!(update.turn_index, 1);
        assert!(update.turn.answer.unwrap().contains("second"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_answer_text() {
        let (presenter, _) = presenter(true);
        let out = presenter.submit(None, "What is a SIEM?");
        let update = presenter.respond(session_of(&out)).await.unwrap().unwrap();
        assert_eq!(update.turn.answer.as_deref(), Some(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn test_respond_unknown_session() {
        let (presenter, _) = presenter(false);
        assert!(presenter.respond("nope").await.unwrap().is_none());
    }
}
