use crate::cli::error::CliError;
use crate::cli::render::format_conversation;
use crate::configuration::Settings;
use crate::console::commands::CallableTrait;

use super::{build_state, runtime};

/// `parley history [--json]`
///
/// Loads the configured conversation and prints its messages.
pub struct HistoryCommand {
    pub settings: Settings,
    pub json: bool,
}

impl HistoryCommand {
    pub fn new(settings: Settings, json: bool) -> Self {
        Self { settings, json }
    }
}

impl CallableTrait for HistoryCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime()?;

        rt.block_on(async {
            let (mut state, _) = build_state(&self.settings);
            state.load_conversation().await.map_err(CliError::from)?;

            if self.json {
                println!("{}", serde_json::to_string_pretty(state.messages())?);
            } else {
                print!(
                    "{}",
                    format_conversation(state.conversation_title(), state.messages())
                );
            }

            Ok::<(), Box<dyn std::error::Error>>(())
        })
    }
}
