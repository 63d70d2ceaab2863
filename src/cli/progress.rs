//! Spinners shown while waiting on the chat service.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create an animated spinner on stderr with the given message.
///
/// Call `spinner.finish_and_clear()` or [`finish_error`] when done.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner shown until the first piece of an answer arrives.
pub fn answer_spinner() -> ProgressBar {
    spinner("En attente de la réponse...")
}

/// Finish a spinner with a cross.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✗ {}", msg));
}
