use tokio::sync::mpsc;

use super::App;
use crate::core::completion::{CompletionParams, CompletionResult};
use crate::utils::input::sanitize_text_input;

pub enum AppAction {
    SubmitInput,
    SubmitMessage {
        message: String,
    },
    CompletionFinished {
        request_id: u64,
        result: CompletionResult,
    },
    ToggleTheme,
    InsertIntoInput {
        text: String,
    },
    ScrollUp {
        lines: u16,
    },
    ScrollDown {
        lines: u16,
    },
    PageUp,
    PageDown,
    RequestExit,
}

/// Terminal facts captured when an action was dispatched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

pub enum AppCommand {
    SendCompletion(CompletionParams),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput => app.submit_input().map(AppCommand::SendCompletion),
        AppAction::SubmitMessage { message } => {
            app.submit_message(&message).map(AppCommand::SendCompletion)
        }
        AppAction::CompletionFinished { request_id, result } => {
            if app.apply_completion(request_id, result) && app.ui.auto_scroll {
                app.ui.scroll_to_bottom();
            }
            None
        }
        AppAction::ToggleTheme => {
            app.toggle_theme();
            None
        }
        AppAction::InsertIntoInput { text } => {
            let sanitized = sanitize_text_input(&text);
            if !sanitized.is_empty() {
                app.ui.insert_into_input(&sanitized);
            }
            None
        }
        AppAction::ScrollUp { lines } => {
            app.ui.scroll_up(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            app.ui.scroll_down(lines);
            None
        }
        AppAction::PageUp => {
            let lines = app.ui.page_lines(ctx.term_height);
            app.ui.scroll_up(lines);
            None
        }
        AppAction::PageDown => {
            let lines = app.ui.page_lines(ctx.term_height);
            app.ui.scroll_down(lines);
            None
        }
        AppAction::RequestExit => {
            app.ui.exit_requested = true;
            None
        }
    }
}
