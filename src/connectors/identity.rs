use crate::connectors::config::IdentityConfig;
use crate::connectors::errors::ConnectorError;
use crate::models::Identity;

/// Resolves which user is talking and in which conversation.
/// Called by the conversation state whenever its identity is unresolved.
#[async_trait::async_trait]
pub trait IdentityBootstrap: Send + Sync {
    async fn resolve(&self) -> Result<Identity, ConnectorError>;
}

/// Identity taken from configuration
pub struct ConfiguredIdentity {
    config: IdentityConfig,
}

impl ConfiguredIdentity {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl IdentityBootstrap for ConfiguredIdentity {
    async fn resolve(&self) -> Result<Identity, ConnectorError> {
        let conversation_id = self.config.conversation_id.ok_or_else(|| {
            ConnectorError::NotFound(
                "no conversation configured (set identity.conversation_id or pass --conversation)"
                    .to_string(),
            )
        })?;

        if conversation_id < 0 || self.config.user_id < 0 {
            return Err(ConnectorError::Internal(format!(
                "invalid identity: user {} / conversation {}",
                self.config.user_id, conversation_id
            )));
        }

        let conversation_title = if self.config.conversation_title.is_empty() {
            format!("Conversation {}", conversation_id)
        } else {
            self.config.conversation_title.clone()
        };

        Ok(Identity {
            user_id: self.config.user_id,
            conversation_id,
            conversation_title,
        })
    }
}
