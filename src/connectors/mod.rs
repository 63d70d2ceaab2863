//! External service connectors
//!
//! The chat service is reached only through the [`ChatServiceConnector`]
//! trait, so the conversation state can run against the HTTP client or
//! against [`chat_service::mock::MockChatServiceConnector`] in tests.
//! The identity of the session comes from an [`IdentityBootstrap`].

pub mod chat_service;
pub mod config;
pub mod errors;
pub mod identity;

pub use chat_service::{
    ChatServiceClient, ChatServiceConnector, ResponseStream, SseDecoder, StreamChunk,
    StreamOutcome, QUESTION_SEND_FAILED, SERVER_ERROR,
};
pub use config::{ChatServiceConfig, IdentityConfig};
pub use errors::ConnectorError;
pub use identity::{ConfiguredIdentity, IdentityBootstrap};
