use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Body of `POST /conversations/{id}/messages:complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<super::NewMessageForm>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn streaming() -> Self {
        Self {
            messages: Vec::new(),
            stream: true,
        }
    }

    pub fn blocking(question: &str) -> Self {
        Self {
            messages: vec![super::NewMessageForm::question(question)],
            stream: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompletionMessage {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompletionChoice {
    #[validate]
    pub message: CompletionMessage,
}

/// Response of a non-streaming completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Completion {
    pub id: i64,
    #[validate(min_items = 1)]
    #[validate]
    pub choices: Vec<CompletionChoice>,
}

impl Completion {
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

/// The only finish reason the chat service emits on streamed chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    #[serde(rename = "stop")]
    Stop,
}

/// Streamed deltas are always spoken by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaRole {
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChunkDelta {
    pub role: DeltaRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChunkChoice {
    pub finish_reason: FinishReason,
    #[validate(minimum = 0)]
    pub index: i64,
    #[validate]
    pub delta: ChunkDelta,
}

/// JSON payload of one `data:` event of a streaming completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompletionChunk {
    pub id: i64,
    #[validate(min_items = 1)]
    #[validate]
    pub choices: Vec<ChunkChoice>,
}

impl CompletionChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.delta.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk_json(finish_reason: &str, role: &str) -> serde_json::Value {
        json!({
            "id": 7,
            "choices": [{
                "finish_reason": finish_reason,
                "index": 0,
                "delta": { "role": role, "content": "Hi" }
            }]
        })
    }

    #[test]
    fn test_chunk_parses_and_validates() {
        let chunk: CompletionChunk = serde_json::from_value(chunk_json("stop", "assistant")).unwrap();
        assert!(chunk.validate().is_ok());
        assert_eq!(chunk.id, 7);
        assert_eq!(chunk.content(), Some("Hi"));
    }

    #[test]
    fn test_chunk_rejects_other_finish_reason() {
        assert!(serde_json::from_value::<CompletionChunk>(chunk_json("length", "assistant")).is_err());
    }

    #[test]
    fn test_chunk_rejects_user_delta() {
        assert!(serde_json::from_value::<CompletionChunk>(chunk_json("stop", "user")).is_err());
    }

    #[test]
    fn test_chunk_without_choices_fails_validation() {
        let chunk: CompletionChunk = serde_json::from_value(json!({ "id": 1, "choices": [] })).unwrap();
        assert!(chunk.validate().is_err());
    }

    #[test]
    fn test_request_bodies() {
        assert_eq!(
            serde_json::to_value(CompletionRequest::streaming()).unwrap(),
            json!({ "stream": true })
        );
        assert_eq!(
            serde_json::to_value(CompletionRequest::blocking("Salut")).unwrap(),
            json!({ "messages": [{ "role": "user", "content": "Salut" }], "stream": false })
        );
    }

    #[test]
    fn test_completion_content() {
        let completion: Completion = serde_json::from_value(json!({
            "id": 3,
            "choices": [{ "message": { "content": "Réponse" } }]
        }))
        .unwrap();
        assert!(completion.validate().is_ok());
        assert_eq!(completion.content(), Some("Réponse"));
    }
}
