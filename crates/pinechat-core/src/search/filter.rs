//! Substring filter over chat messages.

use crate::session::Message;

/// Returns the messages whose content contains `query`, ignoring case.
///
/// Order is preserved. The query is matched as given; callers decide what
/// an empty or blank query means.
pub fn filter_messages(messages: &[Message], query: &str) -> Vec<Message> {
    let needle = query.to_lowercase();
    messages
        .iter()
        .filter(|m| m.contains_lowercase(&needle))
        .cloned()
        .collect()
}
