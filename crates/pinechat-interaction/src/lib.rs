//! HTTP implementation of the Pinechat backend traits.

pub mod http_backend;

pub use http_backend::HttpBackend;
