//! Conversation turns and per-session scrollback storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

/// Default idle timeout (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// One question/answer pair. `answer` is `None` while the model call is pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: Option<String>,
    pub asked_at: DateTime<Utc>,
}

impl ConversationTurn {
    fn pending(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
            asked_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.answer.is_none()
    }
}

/// The ordered turns shown in one browser session.
///
/// Cloning is cheap; clones share the same underlying list.
#[derive(Debug)]
pub struct Scrollback {
    inner: Arc<ScrollbackInner>,
}

#[derive(Debug)]
struct ScrollbackInner {
    id: String,
    turns: RwLock<Vec<ConversationTurn>>,
    last_activity: RwLock<Instant>,
}

impl Clone for Scrollback {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Scrollback {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(ScrollbackInner {
                id,
                turns: RwLock::new(Vec::new()),
                last_activity: RwLock::new(Instant::now()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Append a pending turn and return its index.
    pub fn push_question(&self, question: impl Into<String>) -> usize {
        let mut guard = self.inner.turns.write().unwrap();
        guard.push(ConversationTurn::pending(question));
        let index = guard.len() - 1;
        drop(guard);
        self.touch();
        index
    }

    /// Index and copy of the most recent turn.
    #[must_use]
    pub fn last_turn(&self) -> Option<(usize, ConversationTurn)> {
        let guard = self.inner.turns.read().unwrap();
        guard.last().cloned().map(|t| (guard.len() - 1, t))
    }

    /// Store the answer for the turn at `index` if it is still pending.
    ///
    /// Returns the turn as stored afterwards, or `None` for a bad index.
    pub fn fill_answer(&self, index: usize, answer: impl Into<String>) -> Option<ConversationTurn> {
        let mut guard = self.inner.turns.write().unwrap();
        let turn = guard.get_mut(index)?;
        if turn.answer.is_none() {
            turn.answer = Some(answer.into());
        }
        let stored = turn.clone();
        drop(guard);
        self.touch();
        Some(stored)
    }

    #[must_use]
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.inner.turns.read().unwrap().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.turns.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn touch(&self) {
        let mut guard = self.inner.last_activity.write().unwrap();
        *guard = Instant::now();
    }

    /// Check if the scrollback has been idle for at least `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        self.inner.last_activity.read().unwrap().elapsed() >= timeout
    }
}

/// Thread-safe map of session id to scrollback.
#[derive(Debug, Clone)]
pub struct ScrollbackStore {
    inner: Arc<ScrollbackStoreInner>,
}

#[derive(Debug)]
struct ScrollbackStoreInner {
    sessions: RwLock<HashMap<String, Scrollback>>,
}

impl Default for ScrollbackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollbackStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScrollbackStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a scrollback under a fresh UUID.
    #[must_use]
    pub fn create(&self) -> Scrollback {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Scrollback {
        let id = id.into();
        let scrollback = Scrollback::new(id.clone());
        let mut guard = self.inner.sessions.write().unwrap();
        guard.insert(id, scrollback.clone());
        scrollback
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Scrollback> {
        let guard = self.inner.sessions.read().unwrap();
        guard.get(id).cloned()
    }

    /// Get a scrollback by ID, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Scrollback {
        {
            let guard = self.inner.sessions.read().unwrap();
            if let Some(scrollback) = guard.get(id) {
                return scrollback.clone();
            }
        }

        let mut guard = self.inner.sessions.write().unwrap();
        guard
            .entry(id.to_string())
            .or_insert_with(|| Scrollback::new(id.to_string()))
            .clone()
    }

    pub fn remove(&self, id: &str) -> Option<Scrollback> {
        let mut guard = self.inner.sessions.write().unwrap();
        guard.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop scrollbacks idle longer than `timeout`.
    ///
    /// Returns the number of scrollbacks removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, scrollback| !scrollback.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    /// Periodically sweep idle scrollbacks until the runtime shuts down.
    pub fn spawn_sweeper(&self, idle_timeout: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let period = (idle_timeout / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = store.cleanup_expired_with_timeout(idle_timeout);
                if removed > 0 {
                    tracing::info!(
                        name: "session.expired",
                        removed = removed,
                        remaining = store.len(),
                        "Dropped idle scrollbacks"
                    );
                }
            }
        })
    }
}
