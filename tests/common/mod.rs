#![allow(dead_code)]

use std::sync::Arc;

use parley::connectors::{ChatServiceClient, ChatServiceConfig, ConfiguredIdentity, IdentityConfig};
use parley::services::ConversationState;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CONVERSATION_ID: i64 = 7;

pub struct TestApp {
    pub chat_server: MockServer,
}

impl TestApp {
    pub fn client(&self) -> ChatServiceClient {
        ChatServiceClient::new(ChatServiceConfig::new(&self.chat_server.uri()))
    }

    pub fn state(&self) -> ConversationState {
        let bootstrap = ConfiguredIdentity::new(IdentityConfig {
            user_id: 1,
            conversation_id: Some(CONVERSATION_ID),
            conversation_title: "Support".to_string(),
        });
        ConversationState::new(Arc::new(self.client()), Arc::new(bootstrap))
    }

    /// A state loaded against an empty conversation.
    pub async fn loaded_state(&self) -> ConversationState {
        Mock::given(method("GET"))
            .and(path(messages_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&self.chat_server)
            .await;

        let mut state = self.state();
        state.load_conversation().await.expect("load failed");
        state
    }
}

pub async fn spawn_app() -> TestApp {
    TestApp {
        chat_server: MockServer::start().await,
    }
}

pub fn messages_path() -> String {
    format!("/conversations/{}/messages", CONVERSATION_ID)
}

pub fn complete_path() -> String {
    format!("/conversations/{}/messages:complete", CONVERSATION_ID)
}

pub fn history_record(id: i64, role: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "role": role,
        "content": content,
        "created_at": "2026-01-22 19:17:31.887+01",
    })
}
