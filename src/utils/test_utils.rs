use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::ChatRequest;
use crate::core::app::App;
use crate::core::completion::{CompletionClient, CompletionResult};
use crate::core::config::SessionSettings;
use crate::ui::theme::ThemeMode;

/// A [`CompletionClient`] that replays queued results and records every call.
#[derive(Default)]
pub struct ScriptedCompletionClient {
    replies: Mutex<VecDeque<CompletionResult>>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = CompletionResult>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, _api_key: &str, request: &ChatRequest) -> CompletionResult {
        self.calls.lock().expect("calls lock").push(request.clone());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

pub fn test_settings() -> SessionSettings {
    SessionSettings {
        model: "test-model".to_string(),
        base_url: "https://api.test.com/v1".to_string(),
        api_key: Some("test-key".to_string()),
        theme: ThemeMode::Light,
    }
}

pub fn create_test_app() -> App {
    create_test_app_with_client(Arc::new(ScriptedCompletionClient::new()))
}

pub fn create_test_app_with_client(client: Arc<dyn CompletionClient>) -> App {
    App::new(&test_settings(), client)
}
