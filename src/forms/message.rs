use crate::helpers::date::{pretty_format_from_api, TimestampError};
use crate::models::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// A history record as returned by `GET /conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApiMessage {
    pub role: Role,
    pub content: String,
    pub id: i64,
    #[validate(min_length = 1)]
    pub created_at: String,
}

impl TryFrom<ApiMessage> for Message {
    type Error = TimestampError;

    fn try_from(record: ApiMessage) -> Result<Self, Self::Error> {
        let created_at = pretty_format_from_api(&record.created_at)?;
        Ok(Message::new(record.id, record.role, record.content, created_at))
    }
}

/// Body of `POST /conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewMessageForm {
    pub role: Role,
    #[validate(min_length = 1)]
    pub content: String,
}

impl NewMessageForm {
    pub fn question(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Response of `POST /conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreatedMessage {
    pub id: i64,
}
