//! Domain layer for the Pinechat merchant assistant.
//!
//! Contains the chat session types, local search, insights models and
//! formatting, merchant resolution, configuration and the backend traits.

pub mod backend;
pub mod config;
pub mod error;
pub mod insights;
pub mod merchant;
pub mod search;
pub mod session;

// Re-export common error type
pub use error::{PinechatError, Result};
