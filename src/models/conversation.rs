use serde::{Deserialize, Serialize};

/// Id of a user or conversation that has not been resolved yet.
pub const UNRESOLVED_ID: i64 = -1;

/// Who is talking and in which conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub conversation_id: i64,
    pub conversation_title: String,
}

impl Identity {
    pub fn unresolved() -> Self {
        Self {
            user_id: UNRESOLVED_ID,
            conversation_id: UNRESOLVED_ID,
            conversation_title: String::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.user_id >= 0 && self.conversation_id >= 0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::unresolved()
    }
}
