use dialoguer::Input;

use crate::cli::error::CliError;
use crate::cli::render::format_conversation;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;

use super::{build_state, runtime, stream_answer};

const QUIT: &str = "/quit";
const HISTORY: &str = "/history";

/// `parley chat`
///
/// Interactive session over one conversation. An empty line or `/quit`
/// ends it, `/history` prints the messages exchanged so far.
pub struct ChatCommand {
    pub settings: Settings,
}

impl ChatCommand {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl CallableTrait for ChatCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime()?;

        rt.block_on(async {
            let (mut state, _) = build_state(&self.settings);
            state.load_conversation().await?;
            print!(
                "{}",
                format_conversation(state.conversation_title(), state.messages())
            );
            eprintln!("\n{} pour quitter.", QUIT);

            loop {
                let line = Input::<String>::new()
                    .with_prompt("vous")
                    .allow_empty(true)
                    .interact_text()?;
                let question = line.trim();

                match question {
                    "" | QUIT => break,
                    HISTORY => print!(
                        "{}",
                        format_conversation(state.conversation_title(), state.messages())
                    ),
                    _ => {
                        // A failed turn is reported and the session goes on.
                        if let Err(err) = stream_answer(&mut state, question).await {
                            eprintln!("{}", err);
                        }
                    }
                }
            }

            Ok::<(), CliError>(())
        })?;

        Ok(())
    }
}
