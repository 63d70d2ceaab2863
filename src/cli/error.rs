use std::fmt;

use crate::connectors::ConnectorError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError: failures reported by the parley commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Config errors
    ConfigLoad(config::ConfigError),
    ConversationMissing,

    // Chat errors
    LoadFailed(ConnectorError),
    SendFailed { reason: String },
    AnswerInterrupted { reason: String },
    NoAnswer,

    // Terminal errors
    Prompt(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoad(err) => {
                write!(f, "Failed to load configuration: {err}")
            }
            Self::ConversationMissing => {
                write!(
                    f,
                    "No conversation selected.\n\
                     Pass --conversation <ID> or set PARLEY__IDENTITY__CONVERSATION_ID."
                )
            }
            Self::LoadFailed(err) => {
                write!(f, "Failed to load the conversation: {err}")
            }
            Self::SendFailed { reason } => write!(f, "{reason}"),
            Self::AnswerInterrupted { reason } => {
                write!(f, "Answer interrupted: {reason}")
            }
            Self::NoAnswer => write!(f, "{}", crate::connectors::SERVER_ERROR),
            Self::Prompt(msg) => write!(f, "Prompt failed: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigLoad(err)
    }
}

impl From<ConnectorError> for CliError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::NotFound(_) => Self::ConversationMissing,
            other => Self::LoadFailed(other),
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_conversation_mentions_flag() {
        let err = CliError::from(ConnectorError::NotFound("conversation".to_string()));
        assert!(err.to_string().contains("--conversation"));
    }

    #[test]
    fn test_send_failed_shows_reason_verbatim() {
        let err = CliError::SendFailed {
            reason: crate::connectors::QUESTION_SEND_FAILED.to_string(),
        };
        assert_eq!(err.to_string(), "Erreur à l'envoie de la question");
    }
}
