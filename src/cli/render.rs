//! Plain-text rendering of conversation messages.

use crate::models::{Message, Role};

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "vous",
        Role::Assistant => "assistant",
        Role::System => "système",
    }
}

/// Header line printed above a message body.
pub fn message_header(message: &Message) -> String {
    if message.is_pending() {
        format!("[{}] {}", message.created_at, role_label(message.role))
    } else {
        format!(
            "[{}] {} #{}",
            message.created_at,
            role_label(message.role),
            message.id
        )
    }
}

pub fn format_message(message: &Message) -> String {
    format!("{}\n{}\n", message_header(message), message.content)
}

pub fn format_conversation(title: &str, messages: &[Message]) -> String {
    let mut out = format!("== {} ==\n", title);
    if messages.is_empty() {
        out.push_str("(aucun message)\n");
    }
    for message in messages {
        out.push('\n');
        out.push_str(&format_message(message));
    }
    out
}
