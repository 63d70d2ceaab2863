//! Conversation state shared by every front-end surface.
//!
//! [`ConversationState`] owns the message list of the current conversation
//! and is the only place it is mutated. Readers either borrow it through the
//! accessors or [`subscribe`](ConversationState::subscribe) to the
//! [`StateEvent`]s emitted for every change, in the order they happen.
//! Each subscriber has its own unbounded queue, so a slow reader never misses
//! an event.
//!
//! `send_message` and `load_conversation` take `&mut self`, so two sends can
//! never interleave on one state.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::connectors::{
    ChatServiceConnector, ConnectorError, IdentityBootstrap, StreamChunk, StreamOutcome,
};
use crate::helpers::date::pretty_format_now;
use crate::models::{Identity, Message, Role, PENDING_ID};

/// Addresses a message appended to a [`ConversationState`].
/// A handle taken before a reload does not resolve afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    index: usize,
    generation: u64,
}

impl MessageHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    IdentityResolved(Identity),
    /// The whole list was replaced by a history load.
    Reloaded { count: usize },
    Appended { index: usize, message: Message },
    ContentAppended { index: usize, delta: String },
    IdAssigned { index: usize, id: i64 },
}

/// How a `send_message` call ended. The state holds the same messages
/// whichever it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Completed {
        question_id: i64,
        response_id: Option<i64>,
    },
    /// The answer stream broke off; its reason was appended to the answer.
    StreamError { question_id: i64, reason: String },
    /// Nothing was streamed, the placeholder answer stays empty.
    SendFailed { reason: String },
}

pub struct ConversationState {
    identity: Identity,
    messages: Vec<Message>,
    generation: u64,
    connector: Arc<dyn ChatServiceConnector>,
    bootstrap: Arc<dyn IdentityBootstrap>,
    subscribers: Vec<mpsc::UnboundedSender<StateEvent>>,
}

impl ConversationState {
    pub fn new(
        connector: Arc<dyn ChatServiceConnector>,
        bootstrap: Arc<dyn IdentityBootstrap>,
    ) -> Self {
        Self {
            identity: Identity::unresolved(),
            messages: Vec::new(),
            generation: 0,
            connector,
            bootstrap,
            subscribers: Vec::new(),
        }
    }

    /// Receive every event emitted from now on. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StateEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    pub fn conversation_id(&self) -> i64 {
        self.identity.conversation_id
    }

    pub fn conversation_title(&self) -> &str {
        &self.identity.conversation_title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, handle: MessageHandle) -> Option<&Message> {
        if handle.generation != self.generation {
            return None;
        }
        self.messages.get(handle.index)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn append(
        &mut self,
        id: i64,
        role: Role,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> MessageHandle {
        let message = Message::new(id, role, content, created_at);
        let index = self.messages.len();
        self.messages.push(message.clone());
        self.emit(StateEvent::Appended { index, message });
        MessageHandle {
            index,
            generation: self.generation,
        }
    }

    /// Append text to a message. Returns `false` for a stale handle.
    pub fn append_content(&mut self, handle: MessageHandle, delta: &str) -> bool {
        let Some(message) = self.resolve_mut(handle) else {
            return false;
        };
        message.content.push_str(delta);
        self.emit(StateEvent::ContentAppended {
            index: handle.index,
            delta: delta.to_string(),
        });
        true
    }

    /// Give a pending message its server id. An id is assigned at most once.
    pub fn assign_id(&mut self, handle: MessageHandle, id: i64) -> bool {
        let Some(message) = self.resolve_mut(handle) else {
            return false;
        };
        if !message.is_pending() {
            return false;
        }
        message.id = id;
        self.emit(StateEvent::IdAssigned {
            index: handle.index,
            id,
        });
        true
    }

    /// Resolve the identity if needed, then replace the message list with the
    /// conversation history.
    ///
    /// Fails only when the identity cannot be resolved, in which case the
    /// message list is left untouched. A history rejected by validation
    /// empties the list, like an unreachable service does.
    pub async fn load_conversation(&mut self) -> Result<(), ConnectorError> {
        if !self.identity.is_resolved() {
            let identity = self.bootstrap.resolve().await.map_err(|e| {
                tracing::error!("Failed to resolve the conversation: {}", e);
                e
            })?;
            tracing::info!(
                user_id = identity.user_id,
                conversation_id = identity.conversation_id,
                "Conversation resolved"
            );
            self.identity = identity.clone();
            self.emit(StateEvent::IdentityResolved(identity));
        }

        let history = match self.connector.fetch_history(self.identity.conversation_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(
                    conversation_id = self.identity.conversation_id,
                    "History rejected, showing an empty conversation: {}",
                    e
                );
                Vec::new()
            }
        };

        self.messages.clear();
        self.messages.extend(history);
        self.generation += 1;
        self.emit(StateEvent::Reloaded {
            count: self.messages.len(),
        });
        Ok(())
    }

    /// Send a question and stream its answer into a placeholder message.
    ///
    /// The question and an empty assistant answer are appended before any
    /// network call. Nothing is rolled back or retried on failure.
    pub async fn send_message(&mut self, question: &str) -> SendOutcome {
        let question_handle = self.append(PENDING_ID, Role::User, question, pretty_format_now());
        let answer_handle = self.append(PENDING_ID, Role::Assistant, "", pretty_format_now());

        let connector = Arc::clone(&self.connector);
        let (mut stream, question_id) = match connector
            .open_response_stream(question, self.identity.conversation_id)
            .await
        {
            StreamOutcome::Ready {
                stream,
                question_id,
            } => (stream, question_id),
            StreamOutcome::Error { reason } => {
                tracing::error!(
                    conversation_id = self.identity.conversation_id,
                    "Question not sent: {}",
                    reason
                );
                return SendOutcome::SendFailed { reason };
            }
        };

        self.assign_id(question_handle, question_id);

        let mut response_id = None;
        while let Some(chunk) = stream.next().await {
            match chunk {
                StreamChunk::Message {
                    content,
                    response_id: id,
                } => {
                    self.append_content(answer_handle, &content);
                    if response_id.is_none() {
                        self.assign_id(answer_handle, id);
                        response_id = Some(id);
                    }
                }
                StreamChunk::Error { reason } => {
                    tracing::error!(question_id, "Answer stream failed: {}", reason);
                    self.append_content(answer_handle, &format!(" (erreur: {})", reason));
                    return SendOutcome::StreamError {
                        question_id,
                        reason,
                    };
                }
            }
        }

        tracing::debug!(question_id, ?response_id, "Answer complete");
        SendOutcome::Completed {
            question_id,
            response_id,
        }
    }

    fn resolve_mut(&mut self, handle: MessageHandle) -> Option<&mut Message> {
        if handle.generation != self.generation {
            return None;
        }
        self.messages.get_mut(handle.index)
    }

    fn emit(&mut self, event: StateEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
