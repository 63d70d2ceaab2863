use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_SERVICE_URL: &str = "http://localhost:8000";

/// Chat service connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatServiceConfig {
    /// Base URL of the chat service API (e.g., http://localhost:8000/api)
    pub base_url: String,
}

impl ChatServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_SERVICE_URL)
    }
}

/// Who the client talks as, and in which conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub user_id: i64,
    /// Conversation to open; nothing can be loaded until one is set
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub conversation_title: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_id: 0,
            conversation_id: None,
            conversation_title: String::new(),
        }
    }
}
