use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::completion::CompletionClient;
use crate::core::config::SessionSettings;

/// Connection-side state of a chat session: who we talk to and whether a
/// request is outstanding.
pub struct SessionContext {
    pub client: Arc<dyn CompletionClient>,
    pub model: String,
    pub api_key: Option<String>,
    pub in_flight: bool,
    pub current_request_id: u64,
    /// Cancelled once, when the session shuts down.
    pub cancel_token: CancellationToken,
}

impl SessionContext {
    pub fn new(settings: &SessionSettings, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            in_flight: false,
            current_request_id: 0,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Mark a new request as outstanding and return its id.
    pub fn begin_request(&mut self) -> u64 {
        self.current_request_id = self.current_request_id.wrapping_add(1);
        self.in_flight = true;
        self.current_request_id
    }

    pub fn is_current_request(&self, request_id: u64) -> bool {
        self.in_flight && self.current_request_id == request_id
    }

    pub fn finish_request(&mut self) {
        self.in_flight = false;
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
