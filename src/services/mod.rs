pub mod chat_state;

pub use chat_state::{ConversationState, MessageHandle, SendOutcome, StateEvent};
