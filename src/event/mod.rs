//! Event handling module for PortalUI
//!
//! This module runs the main loop: it draws, collects replies from the
//! device, fires the poll timers and routes keyboard input.

mod handlers;

use crate::{
    app::{AppState, CommandKind, Panel, PortalEvent, PortalRequest, WaitState},
    config,
    portal::PortalClient,
    ui::render,
};
use color_eyre::eyre::Result;
use crossterm::{
    cursor::SetCursorStyle,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
};
use handlers::{
    handle_autoexec, handle_connect, handle_connect_details, handle_connect_manual,
    handle_connect_wait, handle_credits, handle_dialog, handle_wifi,
};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

pub async fn run(
    mut terminal: DefaultTerminal,
    state: &mut AppState,
    client: PortalClient,
) -> Result<()> {
    // Set cursor style to blinking block
    crossterm::execute!(std::io::stdout(), SetCursorStyle::BlinkingBlock)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    info!(url = client.base_url(), "starting portal session");
    state.startup(Instant::now());

    loop {
        terminal.draw(|frame| render(frame, state))?;

        while let Ok(event) = rx.try_recv() {
            state.handle_event(event);
        }

        state.tick(Instant::now());
        for request in state.take_requests() {
            dispatch(&client, request, tx.clone());
        }

        if event::poll(Duration::from_millis(config::EVENT_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != event::KeyEventKind::Press {
                    continue;
                }

                if state.ui.show_key_logger {
                    state.ui.last_key_press = Some((describe_key(&key), Instant::now()));
                }

                // Clear error message on any key press
                state.ui.error_message = None;

                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }

                let should_quit = if state.ui.dialog.is_some() {
                    handle_dialog(key, state)
                } else {
                    match state.ui.panel {
                        Panel::Wifi => handle_wifi(key, state),
                        Panel::Connect => handle_connect(key, state),
                        Panel::ConnectManual => handle_connect_manual(key, state),
                        Panel::ConnectWait => handle_connect_wait(key, state),
                        Panel::ConnectDetails => handle_connect_details(key, state),
                        Panel::Autoexec => handle_autoexec(key, state),
                        Panel::Credits => handle_credits(key, state),
                    }
                };

                if should_quit {
                    break;
                }
            }
        } else if state.ui.panel == Panel::ConnectWait && state.ui.wait == WaitState::Loading {
            state.ui.loading_frame = (state.ui.loading_frame + 1) % config::LOADING_CHARS.len();
        }
    }
    Ok(())
}

/// Run one request in the background and report its outcome on `tx`
fn dispatch(client: &PortalClient, request: PortalRequest, tx: UnboundedSender<PortalEvent>) {
    let client = client.clone();
    tokio::spawn(async move {
        let event = match request {
            PortalRequest::Scan => PortalEvent::AccessPoints(client.access_points().await),
            PortalRequest::Status { generation } => PortalEvent::Status {
                generation,
                result: client.status().await,
            },
            PortalRequest::Config => PortalEvent::Config(client.config().await),
            PortalRequest::Connect { ssid, password } => PortalEvent::CommandDone {
                kind: CommandKind::Connect,
                result: client.connect(&ssid, &password).await,
            },
            PortalRequest::Disconnect => PortalEvent::CommandDone {
                kind: CommandKind::Disconnect,
                result: client.disconnect().await,
            },
            PortalRequest::SaveConfig {
                autoexec,
                autoexec1,
            } => PortalEvent::CommandDone {
                kind: CommandKind::SaveConfig,
                result: client.save_config(autoexec, &autoexec1).await,
            },
            PortalRequest::FactoryReset => PortalEvent::CommandDone {
                kind: CommandKind::FactoryReset,
                result: client.factory_reset().await,
            },
        };
        let _ = tx.send(event);
    });
}

/// Human readable name of a key press, for the key logger
fn describe_key(key: &KeyEvent) -> String {
    let mut key_str = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        key_str.push_str("Ctrl+");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        key_str.push_str("Alt+");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) && !matches!(key.code, KeyCode::Char(_)) {
        key_str.push_str("Shift+");
    }

    let code_str = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::BackTab => "Tab".to_string(),
        other => format!("{other:?}"),
    };
    key_str.push_str(&code_str);
    key_str
}
