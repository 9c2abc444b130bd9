//! Application layer for Pinechat.
//!
//! Use cases that drive the domain types against a backend: the chat
//! session (send, search, error and typing state) and the cached insights
//! fetchers.

pub mod chat_session;
pub mod insights;

pub use chat_session::{ChatSession, ChatSnapshot, SEND_FAILED_MESSAGE};
pub use insights::{InsightsData, InsightsService, QueryCache, QueryKey};
