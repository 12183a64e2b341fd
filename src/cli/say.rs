//! TUI-less "say" command

use std::error::Error;
use std::sync::Arc;

use tracing::info;

use crate::core::app::App;
use crate::core::completion::{run_completion, CompletionClient, HttpCompletionClient};
use crate::core::config::SessionSettings;

/// Bot text a one-shot submission resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SayReply {
    pub text: String,
    /// The reply is an error notice rather than an answer.
    pub is_error: bool,
}

pub async fn run_say(prompt: Vec<String>, settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: chatbox say <prompt>");
        std::process::exit(1);
    }

    let client = Arc::new(HttpCompletionClient::new(settings.base_url.clone())?);
    let reply = say_once(&settings, client, &prompt).await;

    if reply.is_error {
        eprintln!("❌ {}", reply.text);
        std::process::exit(1);
    }
    println!("{}", reply.text);
    Ok(())
}

/// Run one submission through a fresh session and return the bot's answer.
pub async fn say_once(
    settings: &SessionSettings,
    client: Arc<dyn CompletionClient>,
    prompt: &str,
) -> SayReply {
    info!(model = %settings.model, "sending one-shot message");
    let mut app = App::new(settings, client);

    let is_error = match app.submit_message(prompt) {
        Some(params) => match run_completion(params).await {
            Some(outcome) => {
                let is_error = outcome.result.is_err();
                app.apply_completion(outcome.request_id, outcome.result);
                is_error
            }
            None => true,
        },
        // Nothing was sent: the credential notice is already in the transcript.
        None => true,
    };

    let text = app
        .ui
        .transcript
        .last()
        .filter(|message| message.is_bot())
        .map(|message| message.text().to_string())
        .unwrap_or_default();
    app.shutdown();

    SayReply { text, is_error }
}
