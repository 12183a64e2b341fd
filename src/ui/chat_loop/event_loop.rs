//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a background task and turned into
//! [`AppAction`]s. Actions are applied in batches; a submission comes back as
//! [`AppCommand::SendCompletion`], which runs on its own task and reports back
//! through the same action queue.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::prelude::Size;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand,
};
use crate::core::completion::{run_completion, CompletionParams, HttpCompletionClient};
use crate::core::config::SessionSettings;
use crate::ui::renderer::ui;

use super::keybindings::{resolve_key, KeyCommand};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::AppHandle;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

async fn is_exit_requested(app: &AppHandle) -> bool {
    app.read(|app| app.ui.exit_requested).await
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.update(|app| {
        let theme = app.ui.theme.clone();
        terminal_guard.draw(|f| ui(f, app, &theme)).map(|_| ())
    })
    .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

struct EventProcessingOutcome {
    events_processed: bool,
    exit_requested: bool,
}

async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    term_size: Size,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        exit_requested: false,
    };
    let ctx = AppActionContext {
        term_height: term_size.height,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if route_keyboard_event(app, dispatcher, key, ctx).await {
                    outcome.exit_requested = true;
                    break;
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                dispatcher.dispatch(AppAction::InsertIntoInput { text }, ctx);
            }
            UiEvent::Crossterm(_) => {}
        }
    }

    outcome
}

/// Returns true when the key asks to quit.
async fn route_keyboard_event(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    key: KeyEvent,
    ctx: AppActionContext,
) -> bool {
    let input_empty = app.read(|app| app.ui.get_input_text().is_empty()).await;

    match resolve_key(&key, input_empty) {
        KeyCommand::Quit => {
            dispatcher.dispatch(AppAction::RequestExit, ctx);
            return true;
        }
        KeyCommand::Submit => dispatcher.dispatch(AppAction::SubmitInput, ctx),
        KeyCommand::ToggleTheme => dispatcher.dispatch(AppAction::ToggleTheme, ctx),
        KeyCommand::ScrollUp(lines) => dispatcher.dispatch(AppAction::ScrollUp { lines }, ctx),
        KeyCommand::ScrollDown(lines) => {
            dispatcher.dispatch(AppAction::ScrollDown { lines }, ctx)
        }
        KeyCommand::PageUp => dispatcher.dispatch(AppAction::PageUp, ctx),
        KeyCommand::PageDown => dispatcher.dispatch(AppAction::PageDown, ctx),
        KeyCommand::InsertNewline => {
            app.update(|app| app.ui.apply_textarea_edit(|ta| ta.insert_newline()))
                .await;
        }
        KeyCommand::Edit => {
            app.update(|app| {
                app.ui.apply_textarea_edit(|ta| {
                    ta.input(tui_textarea::Input::from(key));
                })
            })
            .await;
        }
    }
    false
}

fn spawn_completion(dispatcher: AppActionDispatcher, params: CompletionParams) {
    tokio::spawn(async move {
        if let Some(outcome) = run_completion(params).await {
            dispatcher.dispatch(
                AppAction::CompletionFinished {
                    request_id: outcome.request_id,
                    result: outcome.result,
                },
                AppActionContext::default(),
            );
        }
    });
}

async fn drain_action_queue(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        match cmd {
            AppCommand::SendCompletion(params) => {
                debug!(request_id = params.request_id, "spawning completion request");
                spawn_completion(dispatcher.clone(), params);
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    let client = Arc::new(HttpCompletionClient::new(settings.base_url.clone())?);
    info!(
        model = %settings.model,
        base_url = %settings.base_url,
        theme = %settings.theme,
        api_key_configured = settings.api_key.is_some(),
        "starting chat session"
    );
    let app = AppHandle::new(Arc::new(Mutex::new(App::new(&settings, client))));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);

    let terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if is_exit_requested(&app).await {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break 'main_loop Err(err.into());
        }

        let term_size = current_terminal_size(&terminal).await;
        let event_outcome =
            process_ui_events(&app, &mut event_rx, &action_dispatcher, term_size).await;
        if event_outcome.events_processed {
            request_redraw = true;
        }

        let actions_applied = drain_action_queue(&app, &action_dispatcher, &mut action_rx).await;
        if actions_applied {
            request_redraw = true;
        }

        if event_outcome.exit_requested {
            break 'main_loop Ok(());
        }

        // Keep the loading dots moving.
        if app.read(|app| app.is_in_flight()).await {
            request_redraw = true;
        }

        let idle = !event_outcome.events_processed && !actions_applied && !request_redraw;
        if idle {
            tokio::time::sleep(Duration::from_millis(16)).await;
        } else if request_redraw {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };

    app.update(|app| app.shutdown()).await;
    event_reader_handle.abort();
    restore_terminal(&terminal).await?;
    info!("chat session ended");

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Sender;
    use crate::utils::test_utils::{create_test_app_with_client, ScriptedCompletionClient};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    const CTX: AppActionContext = AppActionContext { term_height: 24 };

    fn handle_with(client: Arc<ScriptedCompletionClient>) -> AppHandle {
        AppHandle::new(Arc::new(Mutex::new(create_test_app_with_client(client))))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    async fn type_text(app: &AppHandle, dispatcher: &AppActionDispatcher, text: &str) {
        for ch in text.chars() {
            route_keyboard_event(app, dispatcher, key(KeyCode::Char(ch), KeyModifiers::NONE), CTX)
                .await;
        }
    }

    #[tokio::test]
    async fn typed_text_then_enter_round_trips_through_the_queue() {
        let client = Arc::new(ScriptedCompletionClient::with_replies([Ok(Some(
            "pong".to_string(),
        ))]));
        let app = handle_with(client.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);

        type_text(&app, &dispatcher, "ping").await;
        assert_eq!(app.read(|app| app.ui.get_input_text().to_string()).await, "ping");

        route_keyboard_event(&app, &dispatcher, key(KeyCode::Enter, KeyModifiers::NONE), CTX)
            .await;
        assert!(drain_action_queue(&app, &dispatcher, &mut rx).await);
        assert!(app.read(|app| app.is_in_flight()).await);

        let envelope = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("completion arrives")
            .expect("channel open");
        app.update(|app| apply_actions(app, [envelope])).await;

        let last = app
            .read(|app| {
                app.ui
                    .transcript
                    .last()
                    .map(|m| (m.sender(), m.text().to_string()))
            })
            .await;
        assert_eq!(last, Some((Sender::Bot, "pong".to_string())));
        assert!(!app.read(|app| app.is_in_flight()).await);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn shift_enter_inserts_newline_without_submitting() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let app = handle_with(client.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);

        type_text(&app, &dispatcher, "a").await;
        route_keyboard_event(&app, &dispatcher, key(KeyCode::Enter, KeyModifiers::SHIFT), CTX)
            .await;
        type_text(&app, &dispatcher, "b").await;

        assert!(!drain_action_queue(&app, &dispatcher, &mut rx).await);
        assert_eq!(app.read(|app| app.ui.get_input_text().to_string()).await, "a\nb");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn page_up_scrolls_by_the_visible_transcript_height() {
        let app = handle_with(Arc::new(ScriptedCompletionClient::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);
        app.update(|app| app.ui.update_scroll_bounds(100)).await;

        route_keyboard_event(&app, &dispatcher, key(KeyCode::PageUp, KeyModifiers::NONE), CTX)
            .await;
        assert!(drain_action_queue(&app, &dispatcher, &mut rx).await);

        // 24 rows minus header, input borders and one input row.
        assert_eq!(app.read(|app| app.ui.scroll_offset).await, 81);
        assert!(!app.read(|app| app.ui.auto_scroll).await);
    }

    #[tokio::test]
    async fn ctrl_c_requests_exit() {
        let app = handle_with(Arc::new(ScriptedCompletionClient::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);

        let quit = route_keyboard_event(
            &app,
            &dispatcher,
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            CTX,
        )
        .await;
        assert!(quit);
        drain_action_queue(&app, &dispatcher, &mut rx).await;
        assert!(is_exit_requested(&app).await);
    }

    #[tokio::test]
    async fn paste_events_are_dispatched_as_input() {
        let app = handle_with(Arc::new(ScriptedCompletionClient::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        event_tx
            .send(UiEvent::Crossterm(Event::Paste("line one\r\nline two".into())))
            .expect("send paste");

        let outcome = process_ui_events(
            &app,
            &mut event_rx,
            &dispatcher,
            Size {
                width: 80,
                height: 24,
            },
        )
        .await;
        assert!(outcome.events_processed);
        assert!(!outcome.exit_requested);

        drain_action_queue(&app, &dispatcher, &mut rx).await;
        assert_eq!(
            app.read(|app| app.ui.get_input_text().to_string()).await,
            "line one\nline two"
        );
    }
}
