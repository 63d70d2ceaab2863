use super::types::{ResponseStream, StreamOutcome, QUESTION_SEND_FAILED, SERVER_ERROR};
use crate::connectors::errors::ConnectorError;
use crate::forms::Completion;
use crate::models::Message;

/// Trait for chat service integration
/// Allows mocking in tests and swapping implementations
#[async_trait::async_trait]
pub trait ChatServiceConnector: Send + Sync {
    /// Fetch the messages of a conversation.
    /// Calls GET /conversations/{id}/messages. Transport failures and non-200
    /// answers yield an empty history, a record failing validation yields
    /// `ConnectorError::InvalidResponse`.
    async fn fetch_history(&self, conversation_id: i64) -> Result<Vec<Message>, ConnectorError>;

    /// Store the user's question.
    /// Calls POST /conversations/{id}/messages and returns the id assigned by
    /// the service, or `None` unless it answered 201.
    async fn post_question(&self, question: &str, conversation_id: i64) -> Option<i64>;

    /// Ask for a streamed completion of the conversation.
    /// Calls POST /conversations/{id}/messages:complete with `stream: true`.
    async fn stream_completion(&self, conversation_id: i64)
        -> Result<ResponseStream, ConnectorError>;

    /// Ask for a whole completion at once.
    /// Calls POST /conversations/{id}/messages:complete with `stream: false`.
    async fn complete(&self, question: &str, conversation_id: i64) -> Option<Completion>;

    /// Post the question, then open the streamed answer to it.
    async fn open_response_stream(&self, question: &str, conversation_id: i64) -> StreamOutcome {
        let Some(question_id) = self.post_question(question, conversation_id).await else {
            return StreamOutcome::error(QUESTION_SEND_FAILED);
        };

        match self.stream_completion(conversation_id).await {
            Ok(stream) => StreamOutcome::Ready {
                stream,
                question_id,
            },
            Err(ConnectorError::UnexpectedStatus(status)) => {
                tracing::warn!("Completion refused with status {}", status);
                StreamOutcome::error(SERVER_ERROR)
            }
            Err(err) => StreamOutcome::error(err.to_string()),
        }
    }
}
