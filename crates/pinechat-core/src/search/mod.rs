//! Local search over the messages of a chat session.
//!
//! Searching never touches the backend: it filters a snapshot of the
//! message log held by the session.

pub mod filter;
pub mod model;

pub use filter::filter_messages;
pub use model::SearchState;
