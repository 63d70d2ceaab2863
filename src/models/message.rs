use serde::{Deserialize, Serialize};
use std::fmt;

/// Id carried by a message the chat service has not acknowledged yet.
pub const PENDING_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A message as held by the conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Server-assigned id, or [`PENDING_ID`] for optimistic messages.
    pub id: i64,
    pub role: Role,
    pub content: String,
    /// Display timestamp (`HH:MM DD/MM/YYYY`).
    pub created_at: String,
}

impl Message {
    pub fn new(id: i64, role: Role, content: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: created_at.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.id == PENDING_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
        assert!(serde_json::from_str::<Role>("\"tool\"").is_err());
    }

    #[test]
    fn test_new_message_is_pending() {
        let message = Message::new(PENDING_ID, Role::User, "hello", "10:00 01/02/2026");
        assert!(message.is_pending());
        assert_eq!(message.role.to_string(), "user");
    }
}
