use crate::connectors::config::ChatServiceConfig;
use crate::connectors::errors::ConnectorError;
use crate::forms::{ApiMessage, Completion, CompletionRequest, CreatedMessage, NewMessageForm};
use crate::models::Message;

use futures::StreamExt;
use reqwest::StatusCode;
use serde_valid::Validate;
use tracing::Instrument;

use super::connector::ChatServiceConnector;
use super::stream::SseDecoder;
use super::types::ResponseStream;

/// HTTP-based chat service client
pub struct ChatServiceClient {
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
}

impl ChatServiceClient {
    /// Create new chat service client. No request timeout is set: a streamed
    /// answer lasts as long as the service keeps writing.
    pub fn new(config: ChatServiceConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: ChatServiceConfig, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn messages_url(&self, conversation_id: i64) -> String {
        format!("{}/conversations/{}/messages", self.base_url, conversation_id)
    }

    fn complete_url(&self, conversation_id: i64) -> String {
        format!(
            "{}/conversations/{}/messages:complete",
            self.base_url, conversation_id
        )
    }
}

/// Validate every history record and project it, failing on the first bad one.
pub(crate) fn parse_history(text: &str) -> Result<Vec<Message>, ConnectorError> {
    let records: Vec<ApiMessage> = serde_json::from_str(text)
        .map_err(|e| ConnectorError::InvalidResponse(format!("history: {}", e)))?;

    records
        .into_iter()
        .map(|record| {
            record.validate().map_err(|e| {
                ConnectorError::InvalidResponse(format!("message {}: {}", record.id, e))
            })?;
            let id = record.id;
            Message::try_from(record)
                .map_err(|e| ConnectorError::InvalidResponse(format!("message {}: {}", id, e)))
        })
        .collect()
}

#[async_trait::async_trait]
impl ChatServiceConnector for ChatServiceClient {
    async fn fetch_history(&self, conversation_id: i64) -> Result<Vec<Message>, ConnectorError> {
        let span = tracing::info_span!("chat_service_fetch_history", conversation_id);

        let resp = match self
            .http_client
            .get(self.messages_url(conversation_id))
            .send()
            .instrument(span.clone())
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(parent: &span, "fetch_history transport error: {:?}", e);
                return Ok(Vec::new());
            }
        };

        if resp.status() != StatusCode::OK {
            tracing::warn!(parent: &span, "fetch_history answered {}", resp.status());
            return Ok(Vec::new());
        }

        let text = match resp.text().instrument(span.clone()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(parent: &span, "fetch_history body error: {:?}", e);
                return Ok(Vec::new());
            }
        };

        let messages = parse_history(&text).map_err(|e| {
            tracing::error!(parent: &span, "fetch_history rejected payload: {}", e);
            e
        })?;
        tracing::debug!(parent: &span, "Fetched {} messages", messages.len());
        Ok(messages)
    }

    async fn post_question(&self, question: &str, conversation_id: i64) -> Option<i64> {
        let span = tracing::info_span!("chat_service_post_question", conversation_id);

        let resp = self
            .http_client
            .post(self.messages_url(conversation_id))
            .json(&NewMessageForm::question(question))
            .send()
            .instrument(span.clone())
            .await
            .map_err(|e| {
                tracing::warn!(parent: &span, "post_question transport error: {:?}", e);
            })
            .ok()?;

        if resp.status() != StatusCode::CREATED {
            tracing::warn!(parent: &span, "post_question answered {}", resp.status());
            return None;
        }

        match resp.json::<CreatedMessage>().instrument(span.clone()).await {
            Ok(created) => Some(created.id),
            Err(e) => {
                tracing::warn!(parent: &span, "post_question invalid body: {:?}", e);
                None
            }
        }
    }

    async fn stream_completion(
        &self,
        conversation_id: i64,
    ) -> Result<ResponseStream, ConnectorError> {
        let span = tracing::info_span!("chat_service_stream_completion", conversation_id);

        let resp = self
            .http_client
            .post(self.complete_url(conversation_id))
            .json(&CompletionRequest::streaming())
            .send()
            .instrument(span.clone())
            .await
            .map_err(|e| {
                tracing::warn!(parent: &span, "stream_completion transport error: {:?}", e);
                ConnectorError::from(e)
            })?;

        if resp.status() != StatusCode::OK {
            return Err(ConnectorError::UnexpectedStatus(resp.status().as_u16()));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("text/event-stream") {
            tracing::debug!(parent: &span, "Unexpected completion content type `{}`", content_type);
        }

        let body = Box::pin(resp.bytes_stream());
        Ok(SseDecoder::new(body).boxed())
    }

    async fn complete(&self, question: &str, conversation_id: i64) -> Option<Completion> {
        let span = tracing::info_span!("chat_service_complete", conversation_id);

        let resp = self
            .http_client
            .post(self.complete_url(conversation_id))
            .json(&CompletionRequest::blocking(question))
            .send()
            .instrument(span.clone())
            .await
            .map_err(|e| {
                tracing::warn!(parent: &span, "complete transport error: {:?}", e);
            })
            .ok()?;

        if resp.status() != StatusCode::OK {
            tracing::warn!(parent: &span, "complete answered {}", resp.status());
            return None;
        }

        let completion = resp
            .json::<Completion>()
            .instrument(span.clone())
            .await
            .map_err(|e| {
                tracing::warn!(parent: &span, "complete invalid body: {:?}", e);
            })
            .ok()?;

        match completion.validate() {
            Ok(()) => Some(completion),
            Err(e) => {
                tracing::warn!(parent: &span, "complete rejected payload: {}", e);
                None
            }
        }
    }
}
