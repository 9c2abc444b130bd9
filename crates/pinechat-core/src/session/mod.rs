//! Session domain module.
//!
//! # Module Structure
//!
//! - `identity`: session token generation and message id allocation
//! - `message`: chat turn types (`Message`, `Sender`)
//! - `store`: the append-only per-session log (`MessageStore`)

mod identity;
mod message;
mod store;

pub use identity::{MessageIdAllocator, generate_session_id};
pub use message::{FALLBACK_BOT_CONTENT, FALLBACK_USER_CONTENT, Message, Sender};
pub use store::MessageStore;
