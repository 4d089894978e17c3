//! HTML rendering for the chat front-end.
//!
//! - [`page`]: the single-page chat view (shell, styles, client script)

pub mod page;

pub use page::{APP_TITLE, chat_page};
