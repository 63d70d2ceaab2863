use crate::cli::error::CliError;
use crate::cli::progress;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;

use super::{build_state, runtime, stream_answer};

/// `parley ask "<question>" [--no-stream]`
///
/// Sends one question to the conversation and prints the answer. The
/// streamed answer is printed as it arrives; `--no-stream` waits for the
/// whole completion instead.
pub struct AskCommand {
    pub settings: Settings,
    pub question: String,
    pub stream: bool,
}

impl AskCommand {
    pub fn new(settings: Settings, question: String, stream: bool) -> Self {
        Self {
            settings,
            question,
            stream,
        }
    }
}

impl CallableTrait for AskCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime()?;

        rt.block_on(async {
            let (mut state, connector) = build_state(&self.settings);
            state.load_conversation().await?;

            if self.stream {
                return stream_answer(&mut state, &self.question).await;
            }

            let spinner = progress::answer_spinner();
            let completion = connector
                .complete(&self.question, state.conversation_id())
                .await;
            spinner.finish_and_clear();

            let completion = completion.ok_or(CliError::NoAnswer)?;
            println!("assistant #{}", completion.id);
            println!("{}", completion.content().unwrap_or_default());
            Ok::<(), CliError>(())
        })?;

        Ok(())
    }
}
