use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::{stream, StreamExt};

use crate::connectors::errors::ConnectorError;
use crate::forms::{Completion, CompletionChoice, CompletionMessage};
use crate::models::Message;

use super::connector::ChatServiceConnector;
use super::stream::SseDecoder;
use super::types::ResponseStream;

/// In-memory chat service for tests and offline runs.
///
/// Streamed answers go through the real [`SseDecoder`], so a canned body
/// behaves exactly like one read from the network.
pub struct MockChatServiceConnector {
    history: Vec<Message>,
    question_id: Option<i64>,
    completion_status: u16,
    stream_body: String,
    read_size: usize,
    posted_questions: Mutex<Vec<String>>,
    completion_requests: AtomicUsize,
}

impl Default for MockChatServiceConnector {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            question_id: Some(1),
            completion_status: 200,
            stream_body: "data: [DONE]\n\n".to_string(),
            read_size: 16,
            posted_questions: Mutex::new(Vec::new()),
            completion_requests: AtomicUsize::new(0),
        }
    }
}

impl MockChatServiceConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// `None` makes every posted question fail.
    pub fn with_question_id(mut self, question_id: Option<i64>) -> Self {
        self.question_id = question_id;
        self
    }

    pub fn with_completion_status(mut self, status: u16) -> Self {
        self.completion_status = status;
        self
    }

    /// Answer with one well-formed event per part, then `[DONE]`.
    pub fn with_answer(mut self, response_id: i64, parts: &[&str]) -> Self {
        self.stream_body = sse_body(response_id, parts);
        self
    }

    /// Answer with an arbitrary event-stream body.
    pub fn with_raw_stream(mut self, body: impl Into<String>) -> Self {
        self.stream_body = body.into();
        self
    }

    pub fn posted_questions(&self) -> Vec<String> {
        self.posted_questions
            .lock()
            .map(|questions| questions.clone())
            .unwrap_or_default()
    }

    pub fn completion_requests(&self) -> usize {
        self.completion_requests.load(Ordering::SeqCst)
    }
}

/// Event-stream body carrying `parts` as successive assistant deltas.
pub fn sse_body(response_id: i64, parts: &[&str]) -> String {
    let mut body = String::new();
    for part in parts {
        let event = serde_json::json!({
            "id": response_id,
            "choices": [{
                "finish_reason": "stop",
                "index": 0,
                "delta": { "role": "assistant", "content": part }
            }]
        });
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[async_trait::async_trait]
impl ChatServiceConnector for MockChatServiceConnector {
    async fn fetch_history(&self, _conversation_id: i64) -> Result<Vec<Message>, ConnectorError> {
        Ok(self.history.clone())
    }

    async fn post_question(&self, question: &str, _conversation_id: i64) -> Option<i64> {
        if let Ok(mut questions) = self.posted_questions.lock() {
            questions.push(question.to_string());
        }
        self.question_id
    }

    async fn stream_completion(
        &self,
        _conversation_id: i64,
    ) -> Result<ResponseStream, ConnectorError> {
        self.completion_requests.fetch_add(1, Ordering::SeqCst);
        if self.completion_status != 200 {
            return Err(ConnectorError::UnexpectedStatus(self.completion_status));
        }

        let reads: Vec<Result<Vec<u8>, String>> = self
            .stream_body
            .as_bytes()
            .chunks(self.read_size.max(1))
            .map(|read| Ok(read.to_vec()))
            .collect();
        Ok(SseDecoder::new(stream::iter(reads)).boxed())
    }

    async fn complete(&self, _question: &str, _conversation_id: i64) -> Option<Completion> {
        self.completion_requests.fetch_add(1, Ordering::SeqCst);
        if self.completion_status != 200 {
            return None;
        }
        Some(Completion {
            id: self.question_id.map_or(1, |id| id + 1),
            choices: vec![CompletionChoice {
                message: CompletionMessage {
                    content: "Réponse complète".to_string(),
                },
            }],
        })
    }
}
