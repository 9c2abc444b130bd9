//! Chat session use case.
//!
//! `ChatSession` owns everything one chat view needs: the session token, the
//! message log, the search state, the typing flag and the last error. Views
//! call the operations below and re-render from [`ChatSession::snapshot`].

use pinechat_core::backend::{AssistantBackend, QueryAnswer, QueryRequest};
use pinechat_core::merchant::MerchantContext;
use pinechat_core::search::SearchState;
use pinechat_core::session::{
    FALLBACK_BOT_CONTENT, FALLBACK_USER_CONTENT, Message, MessageStore, generate_session_id,
};
use pinechat_core::{PinechatError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Shown to the user whenever a dispatch fails, whatever the cause.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

struct ChatState {
    store: MessageStore,
    search: SearchState,
    error: Option<String>,
}

/// Everything a chat view renders, copied out of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSnapshot {
    pub session_id: String,
    pub merchant: String,
    pub messages: Vec<Message>,
    /// No history is fetched, so this is always false.
    pub is_loading: bool,
    pub is_typing: bool,
    pub search_visible: bool,
    pub search_results: Option<Vec<Message>>,
    pub error: Option<String>,
}

impl ChatSnapshot {
    /// Search results while in search mode, the full log otherwise.
    pub fn visible_messages(&self) -> &[Message] {
        self.search_results.as_deref().unwrap_or(&self.messages)
    }

    pub fn is_search_mode(&self) -> bool {
        self.search_results.is_some()
    }
}

/// Decrements the pending-dispatch counter even if the dispatch future is dropped.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One chat session with the merchant assistant.
///
/// # Ordering
///
/// Dispatches go through a single in-flight slot (a FIFO mutex), so
/// concurrent `send_message` calls reach the backend one at a time and
/// their pairs land in the log in the order the calls were made.
///
/// # Teardown
///
/// [`ChatSession::shutdown`] (or dropping the session) cancels waiting and
/// in-flight dispatches; they fail without touching the log.
pub struct ChatSession {
    session_id: String,
    merchant: MerchantContext,
    backend: Arc<dyn AssistantBackend>,
    state: RwLock<ChatState>,
    dispatch_slot: Mutex<()>,
    pending: AtomicUsize,
    shutdown: CancellationToken,
}

impl ChatSession {
    /// Starts a session; the session token is generated here, once.
    pub fn new(backend: Arc<dyn AssistantBackend>, merchant: MerchantContext) -> Self {
        let session_id = generate_session_id();
        tracing::info!(session_id = %session_id, merchant = %merchant, "Chat session started");

        Self {
            state: RwLock::new(ChatState {
                store: MessageStore::new(session_id.clone()),
                search: SearchState::default(),
                error: None,
            }),
            session_id,
            merchant,
            backend,
            dispatch_slot: Mutex::new(()),
            pending: AtomicUsize::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn merchant(&self) -> &MerchantContext {
        &self.merchant
    }

    /// True while any dispatch is waiting for, or holding, the in-flight slot.
    pub fn is_typing(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Sends `content` as a question and records the exchange.
    ///
    /// Content is sent as typed; blank input is the caller's concern. On
    /// failure the log is untouched, the error state is set to
    /// [`SEND_FAILED_MESSAGE`] and the underlying cause is returned.
    pub async fn send_message(&self, content: &str) -> Result<()> {
        let _pending = PendingGuard::enter(&self.pending);
        self.dispatch(content).await
    }

    async fn fail(&self, err: PinechatError) -> Result<()> {
        tracing::warn!(session_id = %self.session_id, error = %err, "Failed to send message");
        self.state.write().await.error = Some(SEND_FAILED_MESSAGE.to_string());
        Err(err)
    }

    async fn dispatch(&self, content: &str) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return self.fail(PinechatError::Cancelled).await;
        }

        let _slot = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return self.fail(PinechatError::Cancelled).await,
            slot = self.dispatch_slot.lock() => slot,
        };
        // Error state is only touched while holding the slot.
        self.state.write().await.error = None;

        let request = QueryRequest {
            question: content.to_string(),
            merchant: self.merchant.name().to_string(),
        };
        tracing::debug!(session_id = %self.session_id, merchant = %self.merchant, "Dispatching question");

        let answer = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(PinechatError::Cancelled),
            answer = self.backend.ask(&request) => answer,
        };
        let answer = match answer {
            Ok(answer) => answer,
            Err(e) => return self.fail(e).await,
        };

        let (user_content, bot_content) = exchange_contents(answer);
        self.state
            .write()
            .await
            .store
            .append_exchange(user_content, bot_content);
        Ok(())
    }

    /// Filters the current log; a blank query leaves search mode.
    pub async fn search_messages(&self, query: &str) {
        let mut state = self.state.write().await;
        let ChatState { store, search, .. } = &mut *state;
        search.search(store.messages(), query);
    }

    /// Opens or closes the search bar; closing discards results.
    pub async fn toggle_search(&self) {
        self.state.write().await.search.toggle();
    }

    pub async fn clear_search(&self) {
        self.state.write().await.search.clear();
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.store.messages().to_vec()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        let state = self.state.read().await;
        ChatSnapshot {
            session_id: self.session_id.clone(),
            merchant: self.merchant.name().to_string(),
            messages: state.store.messages().to_vec(),
            is_loading: false,
            is_typing: self.is_typing(),
            search_visible: state.search.visible,
            search_results: state.search.results.clone(),
            error: state.error.clone(),
        }
    }

    /// Cancels waiting and in-flight dispatches. Later sends fail immediately.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(session_id = %self.session_id, "Chat session shutting down");
            self.shutdown.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Picks the text of both turns, falling back when the backend omits them.
fn exchange_contents(answer: QueryAnswer) -> (String, String) {
    let user = answer
        .question
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| FALLBACK_USER_CONTENT.to_string());
    let bot = answer
        .response
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| FALLBACK_BOT_CONTENT.to_string());
    (user, bot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_contents_uses_backend_text() {
        let (user, bot) = exchange_contents(QueryAnswer {
            question: Some("Q".into()),
            response: Some("A".into()),
        });
        assert_eq!((user.as_str(), bot.as_str()), ("Q", "A"));
    }

    #[test]
    fn test_exchange_contents_falls_back() {
        let (user, bot) = exchange_contents(QueryAnswer::default());
        assert_eq!(user, FALLBACK_USER_CONTENT);
        assert_eq!(bot, FALLBACK_BOT_CONTENT);

        let (user, bot) = exchange_contents(QueryAnswer {
            question: Some(String::new()),
            response: Some(String::new()),
        });
        assert_eq!(user, FALLBACK_USER_CONTENT);
        assert_eq!(bot, FALLBACK_BOT_CONTENT);
    }

    #[test]
    fn test_snapshot_visible_messages() {
        let mut store = MessageStore::new("chat_1_snap");
        store.append_exchange("Refund policy?", "Refunds process in 5 days.");
        let messages = store.messages().to_vec();

        let mut snapshot = ChatSnapshot {
            session_id: "chat_1_snap".into(),
            merchant: "Acme".into(),
            messages: messages.clone(),
            is_loading: false,
            is_typing: false,
            search_visible: true,
            search_results: None,
            error: None,
        };
        assert_eq!(snapshot.visible_messages().len(), 2);
        assert!(!snapshot.is_search_mode());

        snapshot.search_results = Some(vec![messages[1].clone()]);
        assert_eq!(snapshot.visible_messages(), &messages[1..]);
        assert!(snapshot.is_search_mode());
    }
}
