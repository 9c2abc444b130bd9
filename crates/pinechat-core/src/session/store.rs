//! In-memory transcript of a chat session.

use chrono::Utc;

use super::identity::MessageIdAllocator;
use super::message::{Message, Sender};

/// Append-only log of the turns of one chat session.
///
/// Turns are only ever added as a user/bot pair, so the log never holds a
/// question without its answer. There is no clear operation: a fresh
/// session starts a fresh store.
#[derive(Debug)]
pub struct MessageStore {
    session_id: String,
    messages: Vec<Message>,
    ids: MessageIdAllocator,
}

impl MessageStore {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            ids: MessageIdAllocator::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends a user turn followed by its bot reply and returns both.
    pub fn append_exchange(
        &mut self,
        user_content: impl Into<String>,
        bot_content: impl Into<String>,
    ) -> (Message, Message) {
        let user = self.build(Sender::User, user_content.into());
        let bot = self.build(Sender::Bot, bot_content.into());
        self.messages.push(user.clone());
        self.messages.push(bot.clone());
        (user, bot)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn build(&mut self, sender: Sender, content: String) -> Message {
        Message {
            id: self.ids.next_id(),
            content,
            sender,
            timestamp: Utc::now(),
            session_id: self.session_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_exchange_orders_user_before_bot() {
        let mut store = MessageStore::new("chat_1_test");
        let (user, bot) = store.append_exchange("question", "answer");

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0], user);
        assert_eq!(store.messages()[1], bot);
        assert!(user.is_user());
        assert!(bot.is_bot());
        assert!(user.id < bot.id);
    }

    #[test]
    fn test_messages_carry_session_id() {
        let mut store = MessageStore::new("chat_1_test");
        store.append_exchange("a", "b");
        store.append_exchange("c", "d");

        assert!(store.messages().iter().all(|m| m.session_id == "chat_1_test"));
    }

    #[test]
    fn test_ids_are_unique_under_rapid_appends() {
        let mut store = MessageStore::new("chat_1_test");
        for i in 0..50 {
            store.append_exchange(format!("q{i}"), format!("a{i}"));
        }

        let ids: Vec<i64> = store.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
