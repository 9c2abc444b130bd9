//! Search state of a chat view.

use serde::{Deserialize, Serialize};

use super::filter::filter_messages;
use crate::session::Message;

/// Whether the search bar is open and what the last search found.
///
/// `results` is a filtered copy of the message log, never the log itself;
/// `None` means the view is not in search-result mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub visible: bool,
    pub results: Option<Vec<Message>>,
}

impl SearchState {
    /// Flips visibility. Closing the search discards the last results.
    pub fn toggle(&mut self) {
        let was_visible = self.visible;
        self.visible = !was_visible;
        if was_visible {
            self.results = None;
        }
    }

    /// Drops the current results without touching visibility.
    pub fn clear(&mut self) {
        self.results = None;
    }

    /// Runs a search over `messages`.
    ///
    /// A blank query leaves search-result mode instead of matching everything.
    pub fn search(&mut self, messages: &[Message], query: &str) {
        if query.trim().is_empty() {
            self.results = None;
        } else {
            self.results = Some(filter_messages(messages, query));
        }
    }

    pub fn is_search_mode(&self) -> bool {
        self.results.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageStore;

    fn refund_store() -> MessageStore {
        let mut store = MessageStore::new("chat_1_state");
        store.append_exchange("Refund policy?", "Refunds process in 5 days.");
        store
    }

    #[test]
    fn test_blank_query_exits_search_mode() {
        let store = refund_store();
        let mut state = SearchState::default();

        state.search(store.messages(), "refund");
        assert!(state.is_search_mode());

        state.search(store.messages(), "   ");
        assert_eq!(state.results, None);
        state.search(store.messages(), "");
        assert_eq!(state.results, None);
    }

    #[test]
    fn test_search_scenario() {
        let store = refund_store();
        let mut state = SearchState::default();

        state.search(store.messages(), "refund");
        assert_eq!(state.results.as_ref().map(Vec::len), Some(2));

        state.search(store.messages(), "xyz");
        assert_eq!(state.results, Some(Vec::new()));
    }

    #[test]
    fn test_toggle_twice_returns_hidden_and_clears_results() {
        let store = refund_store();
        let mut state = SearchState::default();

        state.toggle();
        assert!(state.visible);
        state.search(store.messages(), "refund");

        state.toggle();
        assert!(!state.visible);
        assert_eq!(state.results, None);
    }

    #[test]
    fn test_opening_search_keeps_results() {
        let store = refund_store();
        let mut state = SearchState::default();
        state.search(store.messages(), "policy");

        state.toggle();
        assert!(state.visible);
        assert!(state.is_search_mode());
    }

    #[test]
    fn test_clear_keeps_visibility() {
        let store = refund_store();
        let mut state = SearchState::default();
        state.toggle();
        state.search(store.messages(), "refund");

        state.clear();
        assert!(state.visible);
        assert_eq!(state.results, None);
    }

    #[test]
    fn test_results_are_a_snapshot() {
        let mut store = refund_store();
        let mut state = SearchState::default();
        state.search(store.messages(), "refund");

        store.append_exchange("More refunds?", "No.");
        assert_eq!(state.results.as_ref().map(Vec::len), Some(2));
    }
}
