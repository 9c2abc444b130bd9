//! Chat message types.
//!
//! This module contains the types for a single chat turn: who sent it,
//! what it said and which session it belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback content for the user half of a pair when the backend does not
/// echo the question.
pub const FALLBACK_USER_CONTENT: &str = "User message";

/// Fallback content for the bot half of a pair when the backend sends no answer.
pub const FALLBACK_BOT_CONTENT: &str = "No response received";

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The merchant typing in the chat.
    User,
    /// The backend assistant.
    Bot,
}

/// A single turn in a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-allocated identifier, unique and increasing within a session.
    pub id: i64,
    /// The text of the turn.
    pub content: String,
    /// Who authored the turn.
    pub sender: Sender,
    /// When the turn was recorded locally.
    pub timestamp: DateTime<Utc>,
    /// The session this turn belongs to.
    pub session_id: String,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    /// Case-insensitive substring match on the content.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }
}
