//! The chat session controller.
//!
//! [`App`] owns the transcript, the input buffer, the theme and the in-flight
//! flag. State changes arrive as [`AppAction`]s; anything that has to leave
//! the UI thread comes back out as an [`AppCommand`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::api::ChatRequest;
use crate::core::completion::{
    reply_text, CompletionClient, CompletionError, CompletionParams, CompletionResult,
};
use crate::core::config::SessionSettings;
use crate::core::constants::SAMPLING_TEMPERATURE;
use crate::core::message::Message;
use crate::ui::theme::Theme;

pub mod actions;
pub mod session;
pub mod ui_state;


pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use session::SessionContext;
pub use ui_state::UiState;

pub struct App {
    pub session: SessionContext,
    pub ui: UiState,
}

impl App {
    pub fn new(settings: &SessionSettings, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            session: SessionContext::new(settings, client),
            ui: UiState::new(settings.theme),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.in_flight
    }

    pub fn theme(&self) -> &Theme {
        &self.ui.theme
    }

    /// Submit whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Option<CompletionParams> {
        let text = self.ui.get_input_text().to_string();
        self.submit_message(&text)
    }

    /// Append `text` as a user message and build the request for it.
    ///
    /// Blank text, or a submission while another request is outstanding, is a
    /// no-op. Without an API key the configuration notice is appended right
    /// away and no request is built.
    pub fn submit_message(&mut self, text: &str) -> Option<CompletionParams> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.session.in_flight {
            debug!("submission ignored: a request is already in flight");
            return None;
        }

        self.ui.transcript.push(Message::user(text));
        self.ui.clear_input();
        self.ui.scroll_to_bottom();

        let Some(api_key) = self.session.api_key.clone() else {
            warn!("cannot send message: no API key configured");
            self.ui
                .transcript
                .push(Message::bot(CompletionError::MissingCredential.user_message()));
            return None;
        };

        let request = ChatRequest {
            model: self.session.model.clone(),
            messages: self.ui.transcript.outbound_messages(),
            temperature: SAMPLING_TEMPERATURE,
        };
        let request_id = self.session.begin_request();
        self.ui.pulse_start = Instant::now();
        debug!(
            request_id,
            messages = request.messages.len(),
            "submitting message"
        );

        Some(CompletionParams {
            client: Arc::clone(&self.session.client),
            api_key,
            request,
            request_id,
            cancel_token: self.session.cancel_token.clone(),
        })
    }

    /// Resolve the outstanding request. Returns false for a stale id.
    pub fn apply_completion(&mut self, request_id: u64, result: CompletionResult) -> bool {
        if !self.session.is_current_request(request_id) {
            debug!(request_id, "ignoring completion for a stale request");
            return false;
        }
        self.session.finish_request();
        self.ui.transcript.push(Message::bot(reply_text(&result)));
        true
    }

    pub fn toggle_theme(&mut self) {
        let mode = self.ui.theme_mode.toggled();
        debug!(theme = %mode, "theme toggled");
        self.ui.set_theme_mode(mode);
    }

    /// Drop any outstanding request. Called once when the session ends.
    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }
}
