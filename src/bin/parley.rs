//! `parley` terminal chat client.
//!
//! ```text
//! parley --conversation 12 history
//! parley ask "Comment ça marche ?"
//! parley --url http://localhost:8000 chat
//! ```

use clap::{Parser, Subcommand};
use parley::configuration::get_configuration;
use parley::console::commands::chat::{AskCommand, ChatCommand, ChatTarget, HistoryCommand};
use parley::console::commands::CallableTrait;
use parley::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "parley",
    version,
    about = "Chat with a conversation service from the terminal",
    long_about = "parley fetches a conversation's history, posts questions and prints\n\
        the assistant's answer as it streams in.\n\n\
        The service URL comes from CHAT_SERVICE_URL, PARLEY__CHAT_SERVICE__BASE_URL\n\
        or a configuration file, and can be overridden with --url."
)]
struct Cli {
    /// Chat service base URL
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,
    /// Conversation to open
    #[arg(long, global = true, value_name = "ID")]
    conversation: Option<i64>,
    #[command(subcommand)]
    command: ParleyCommands,
}

#[derive(Debug, Subcommand)]
enum ParleyCommands {
    /// Print the conversation history
    History {
        /// Print messages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask one question and print the answer
    Ask {
        /// The question to send
        question: String,
        /// Wait for the whole answer instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Start an interactive chat session
    Chat,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = match get_command(cli) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = command.call() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn get_command(cli: Cli) -> Result<Box<dyn CallableTrait>, Box<dyn std::error::Error>> {
    let target = ChatTarget {
        url: cli.url,
        conversation: cli.conversation,
    };
    let settings = target.apply(get_configuration()?);

    let subscriber = get_subscriber("parley".into(), settings.log_level.clone(), std::io::stderr);
    init_subscriber(subscriber);

    let cmd: Box<dyn CallableTrait> = match cli.command {
        ParleyCommands::History { json } => Box::new(HistoryCommand::new(settings, json)),
        ParleyCommands::Ask {
            question,
            no_stream,
        } => Box::new(AskCommand::new(settings, question, !no_stream)),
        ParleyCommands::Chat => Box::new(ChatCommand::new(settings)),
    };

    Ok(cmd)
}
