pub mod client;
pub mod connector;
pub mod mock;
pub mod stream;
pub mod types;


pub use client::ChatServiceClient;
pub use connector::ChatServiceConnector;
pub use stream::{DecodeError, SseDecoder};
pub use types::{ResponseStream, StreamChunk, StreamOutcome, QUESTION_SEND_FAILED, SERVER_ERROR};
