//! In-memory chat scrollback.
//!
//! Each browser session owns a list of [`ConversationTurn`]s, keyed by a
//! UUID. Nothing is persisted; idle scrollbacks are swept away.
//!
//! # Example
//!
//! ```rust
//! use cyber_assistant::session::ScrollbackStore;
//!
//! let store = ScrollbackStore::new();
//! let scrollback = store.create();
//! let idx = scrollback.push_question("What is MFA?");
//! scrollback.fill_answer(idx, "A second login factor.");
//!
//! assert_eq!(scrollback.turns().len(), 1);
//! ```

mod thread;

pub use thread::{ConversationTurn, DEFAULT_IDLE_TIMEOUT, Scrollback, ScrollbackStore};
