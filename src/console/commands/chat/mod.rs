//! Conversation commands: `history`, `ask` and `chat`.
//!
//! Each command builds its own [`ConversationState`] over the HTTP chat
//! service client and drives it on a single-threaded tokio runtime.

pub mod ask;
pub mod history;
pub mod session;

pub use ask::AskCommand;
pub use history::HistoryCommand;
pub use session::ChatCommand;

use std::io::Write;
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::cli::error::CliError;
use crate::cli::progress;
use crate::cli::render::message_header;
use crate::configuration::Settings;
use crate::connectors::{ChatServiceClient, ChatServiceConfig, ChatServiceConnector, ConfiguredIdentity};
use crate::models::Role;
use crate::services::{ConversationState, SendOutcome, StateEvent};

/// Command-line overrides applied on top of the loaded settings.
#[derive(Debug, Clone, Default)]
pub struct ChatTarget {
    pub url: Option<String>,
    pub conversation: Option<i64>,
}

impl ChatTarget {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.url {
            settings.chat_service = ChatServiceConfig::new(url);
        }
        if let Some(conversation_id) = self.conversation {
            settings.identity.conversation_id = Some(conversation_id);
        }
        settings
    }
}

pub(crate) fn build_state(settings: &Settings) -> (ConversationState, Arc<dyn ChatServiceConnector>) {
    let connector: Arc<dyn ChatServiceConnector> =
        Arc::new(ChatServiceClient::new(settings.chat_service.clone()));
    let bootstrap = Arc::new(ConfiguredIdentity::new(settings.identity.clone()));
    (ConversationState::new(Arc::clone(&connector), bootstrap), connector)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Send `question` and print the answer as its chunks are applied to `state`.
pub(crate) async fn stream_answer(
    state: &mut ConversationState,
    question: &str,
) -> Result<(), CliError> {
    let mut events = state.subscribe();
    let mut printer = AnswerPrinter::new();

    let outcome = {
        let send = state.send_message(question);
        tokio::pin!(send);
        loop {
            tokio::select! {
                outcome = &mut send => break outcome,
                event = events.recv() => match event {
                    Some(event) => printer.on_event(event)?,
                    None => break (&mut send).await,
                },
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        printer.on_event(event)?;
    }
    printer.finish();

    match outcome {
        SendOutcome::Completed { .. } => Ok(()),
        SendOutcome::StreamError { reason, .. } => Err(CliError::AnswerInterrupted { reason }),
        SendOutcome::SendFailed { reason } => Err(CliError::SendFailed { reason }),
    }
}

/// Prints the assistant placeholder as it fills up.
struct AnswerPrinter {
    spinner: ProgressBar,
    answer: Option<(usize, String)>,
    started: bool,
}

impl AnswerPrinter {
    fn new() -> Self {
        Self {
            spinner: progress::answer_spinner(),
            answer: None,
            started: false,
        }
    }

    fn on_event(&mut self, event: StateEvent) -> Result<(), CliError> {
        match event {
            StateEvent::Appended { index, message } if message.role == Role::Assistant => {
                self.answer = Some((index, message_header(&message)));
            }
            StateEvent::ContentAppended { index, delta } => {
                let Some((answer_index, header)) = &self.answer else {
                    return Ok(());
                };
                if index != *answer_index {
                    return Ok(());
                }
                let mut stdout = std::io::stdout().lock();
                if !self.started {
                    self.spinner.finish_and_clear();
                    writeln!(stdout, "{}", header)?;
                    self.started = true;
                }
                write!(stdout, "{}", delta)?;
                stdout.flush()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) {
        if self.started {
            println!();
        } else {
            self.spinner.finish_and_clear();
        }
    }
}
