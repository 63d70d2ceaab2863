use futures::stream::BoxStream;

/// Reason reported when the question could not be stored by the chat service.
pub const QUESTION_SEND_FAILED: &str = "Erreur à l'envoie de la question";

/// Reason reported when the completion request is refused.
pub const SERVER_ERROR: &str = "Erreur du serveur";

/// One decoded event of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Message { content: String, response_id: i64 },
    /// Terminal: nothing follows an error.
    Error { reason: String },
}

impl StreamChunk {
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }
}

/// Lazily decoded chunks of one completion. Not restartable.
pub type ResponseStream = BoxStream<'static, StreamChunk>;

/// Result of asking for a streamed answer.
pub enum StreamOutcome {
    Ready {
        stream: ResponseStream,
        question_id: i64,
    },
    Error {
        reason: String,
    },
}

impl StreamOutcome {
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Debug for StreamOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready { question_id, .. } => f
                .debug_struct("Ready")
                .field("question_id", question_id)
                .finish_non_exhaustive(),
            Self::Error { reason } => f.debug_struct("Error").field("reason", reason).finish(),
        }
    }
}
