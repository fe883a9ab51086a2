use crate::app::{AppState, AutoexecField, ConnectKind, Dialog, ManualField, Panel};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Handle keyboard events for the confirmation dialogs
pub fn handle_dialog(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) {
        state.ui.dialog = None;
        return false;
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => match state.ui.dialog {
            Some(Dialog::Disconnect) => state.confirm_disconnect(Instant::now()),
            Some(Dialog::FactoryReset) => state.confirm_factory_reset(),
            None => {}
        },
        KeyCode::Char('n') => state.ui.dialog = None,
        _ => {}
    }
    false
}

/// Handle keyboard events for the network list
pub fn handle_wifi(key: KeyEvent, state: &mut AppState) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => state.next(),
        KeyCode::Char('k') | KeyCode::Up => state.previous(),
        KeyCode::Char('g') | KeyCode::Home => state.go_to_top(),
        KeyCode::Char('G') | KeyCode::End => state.go_to_bottom(),
        KeyCode::Enter => {
            if let Some(ssid) = state.highlighted_access_point().map(|ap| ap.ssid.clone()) {
                state.select_network(&ssid);
            }
        }
        KeyCode::Char('n') => state.open_manual(),
        KeyCode::Char('d') => state.open_details(),
        KeyCode::Char('c') => state.ui.panel = Panel::Autoexec,
        KeyCode::Char('i') => state.ui.panel = Panel::Credits,
        KeyCode::Char('r') => state.request_rescan(Instant::now()),
        _ => {}
    }
    false
}

/// Handle keyboard events for the password prompt of a listed network
pub fn handle_connect(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) {
        state.cancel_connect();
        return false;
    }
    match key.code {
        KeyCode::Enter => state.perform_connect(ConnectKind::Listed, Instant::now()),
        _ => {
            state.inputs.password.handle_key(&key);
        }
    }
    false
}

/// Handle keyboard events for the manual network form
pub fn handle_connect_manual(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) {
        state.cancel_connect();
        return false;
    }
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            state.inputs.manual_field = match state.inputs.manual_field {
                Some(ManualField::Ssid) => Some(ManualField::Password),
                _ => Some(ManualField::Ssid),
            };
        }
        KeyCode::Enter => {
            if state.inputs.manual_ssid.value.trim().is_empty() {
                state.ui.error_message = Some("Enter the network name first".to_string());
                state.inputs.manual_field = Some(ManualField::Ssid);
            } else {
                state.perform_connect(ConnectKind::Manual, Instant::now());
            }
        }
        _ => {
            let input = match state.inputs.manual_field {
                Some(ManualField::Password) => &mut state.inputs.manual_password,
                _ => &mut state.inputs.manual_ssid,
            };
            input.handle_key(&key);
        }
    }
    false
}

/// Handle keyboard events while waiting for a join attempt
pub fn handle_connect_wait(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) || key.code == KeyCode::Enter {
        state.close_wait();
    }
    false
}

/// Handle keyboard events for the connection details panel
pub fn handle_connect_details(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) {
        state.ui.panel = Panel::Wifi;
        return false;
    }
    match key.code {
        KeyCode::Char('x') => state.ui.dialog = Some(Dialog::Disconnect),
        KeyCode::Enter | KeyCode::Char('q') => state.ui.panel = Panel::Wifi,
        _ => {}
    }
    false
}

/// Handle keyboard events for the autoexec / command line panel
pub fn handle_autoexec(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) {
        state.ui.panel = Panel::Wifi;
        return false;
    }
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            state.focus_next_autoexec(true);
            return false;
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus_next_autoexec(false);
            return false;
        }
        _ => {}
    }

    let activate = matches!(key.code, KeyCode::Enter | KeyCode::Char(' '));
    match state.autoexec.field {
        AutoexecField::Enabled if activate => state.autoexec.enabled = !state.autoexec.enabled,
        AutoexecField::Output
            if activate || matches!(key.code, KeyCode::Left | KeyCode::Right) =>
        {
            state.cycle_output();
        }
        AutoexecField::Command => {
            state.inputs.autoexec1.handle_key(&key);
        }
        AutoexecField::Player => {
            state.inputs.player.handle_key(&key);
        }
        AutoexecField::BtSink => {
            state.inputs.bt_sink.handle_key(&key);
        }
        AutoexecField::Optional => {
            state.inputs.optional.handle_key(&key);
        }
        AutoexecField::Generate if key.code == KeyCode::Enter => state.generate_command(),
        AutoexecField::Save if key.code == KeyCode::Enter => state.save_autoexec(),
        AutoexecField::Factory if key.code == KeyCode::Enter => {
            state.ui.dialog = Some(Dialog::FactoryReset);
        }
        _ => {}
    }
    false
}

/// Handle keyboard events for the credits panel
pub fn handle_credits(key: KeyEvent, state: &mut AppState) -> bool {
    if is_cancel(&key) || matches!(key.code, KeyCode::Enter | KeyCode::Char('q')) {
        state.ui.panel = Panel::Wifi;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{PortalRequest, WaitState};
    use crate::command::AudioOutput;
    use crate::portal::AccessPoint;
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, handler: fn(KeyEvent, &mut AppState) -> bool, text: &str) {
        for c in text.chars() {
            handler(press(KeyCode::Char(c)), state);
        }
    }

    fn state_with_networks() -> AppState {
        let mut state = AppState::new(Duration::from_millis(950), Duration::from_millis(2800), false, true);
        state.apply_access_points(vec![
            AccessPoint {
                ssid: "cafe".into(),
                rssi: -70,
                auth: 0,
            },
            AccessPoint {
                ssid: "home".into(),
                rssi: -45,
                auth: 3,
            },
        ]);
        state
    }

    #[test]
    fn join_listed_network_from_keyboard() {
        let mut state = state_with_networks();
        handle_wifi(press(KeyCode::Enter), &mut state);
        assert_eq!(state.ui.panel, Panel::Connect);
        assert_eq!(state.network.selected_ssid, "home");

        type_text(&mut state, handle_connect, "pass word");
        handle_connect(press(KeyCode::Enter), &mut state);
        assert_eq!(state.ui.panel, Panel::ConnectWait);
        assert!(matches!(
            &state.take_requests()[..],
            [PortalRequest::Connect { ssid, .. }] if ssid == "home"
        ));

        // locked until the device answers
        handle_connect_wait(press(KeyCode::Enter), &mut state);
        assert_eq!(state.ui.panel, Panel::ConnectWait);
        state.ui.wait = WaitState::Failed;
        handle_connect_wait(press(KeyCode::Enter), &mut state);
        assert_eq!(state.ui.panel, Panel::Wifi);
    }

    #[test]
    fn escape_cancels_connect() {
        let mut state = state_with_networks();
        handle_wifi(press(KeyCode::Char('j')), &mut state);
        handle_wifi(press(KeyCode::Enter), &mut state);
        assert_eq!(state.network.selected_ssid, "cafe");
        handle_connect(press(KeyCode::Esc), &mut state);
        assert_eq!(state.ui.panel, Panel::Wifi);
        assert!(state.network.selected_ssid.is_empty());
    }

    #[test]
    fn manual_form_requires_ssid() {
        let mut state = state_with_networks();
        handle_wifi(press(KeyCode::Char('n')), &mut state);
        assert_eq!(state.ui.panel, Panel::ConnectManual);

        handle_connect_manual(press(KeyCode::Enter), &mut state);
        assert!(state.ui.error_message.is_some());
        assert!(state.take_requests().is_empty());

        type_text(&mut state, handle_connect_manual, "attic");
        handle_connect_manual(press(KeyCode::Tab), &mut state);
        type_text(&mut state, handle_connect_manual, "pw");
        assert_eq!(state.inputs.manual_ssid.value, "attic");
        assert_eq!(state.inputs.manual_password.value, "pw");

        handle_connect_manual(press(KeyCode::Enter), &mut state);
        assert_eq!(state.network.selected_ssid, "attic");
    }

    #[test]
    fn disconnect_dialog_confirms_with_y() {
        let mut state = state_with_networks();
        state.network.connection = Some(crate::portal::ConnectionDetails {
            ssid: "home".into(),
            ip: "10.0.0.2".into(),
            netmask: "255.0.0.0".into(),
            gw: "10.0.0.1".into(),
        });
        handle_wifi(press(KeyCode::Char('d')), &mut state);
        handle_connect_details(press(KeyCode::Char('x')), &mut state);
        assert_eq!(state.ui.dialog, Some(Dialog::Disconnect));

        handle_dialog(press(KeyCode::Char('n')), &mut state);
        assert!(state.ui.dialog.is_none());

        handle_connect_details(press(KeyCode::Char('x')), &mut state);
        handle_dialog(press(KeyCode::Char('y')), &mut state);
        assert_eq!(state.ui.panel, Panel::Wifi);
        assert!(matches!(state.take_requests()[..], [PortalRequest::Disconnect]));
    }

    #[test]
    fn autoexec_panel_generates_and_saves() {
        let mut state = state_with_networks();
        handle_wifi(press(KeyCode::Char('c')), &mut state);
        assert_eq!(state.ui.panel, Panel::Autoexec);

        handle_autoexec(press(KeyCode::Char(' ')), &mut state);
        assert!(state.autoexec.enabled);

        // Enabled -> Command -> Output
        handle_autoexec(press(KeyCode::Tab), &mut state);
        handle_autoexec(press(KeyCode::Tab), &mut state);
        handle_autoexec(press(KeyCode::Right), &mut state);
        handle_autoexec(press(KeyCode::Right), &mut state);
        assert_eq!(state.autoexec.output, AudioOutput::Bluetooth);

        handle_autoexec(press(KeyCode::Tab), &mut state);
        handle_autoexec(press(KeyCode::Tab), &mut state);
        assert_eq!(state.autoexec.field, AutoexecField::BtSink);
        type_text(&mut state, handle_autoexec, "speaker");

        state.autoexec.field = AutoexecField::Generate;
        handle_autoexec(press(KeyCode::Enter), &mut state);
        assert!(state.inputs.autoexec1.value.ends_with("-o \"BT -n 'speaker'\" -R -Z 192000"));

        handle_autoexec(press(KeyCode::Tab), &mut state);
        handle_autoexec(press(KeyCode::Enter), &mut state);
        assert!(matches!(
            state.take_requests()[..],
            [PortalRequest::SaveConfig { autoexec: true, .. }]
        ));

        handle_autoexec(press(KeyCode::Tab), &mut state);
        handle_autoexec(press(KeyCode::Enter), &mut state);
        assert_eq!(state.ui.dialog, Some(Dialog::FactoryReset));
        handle_dialog(press(KeyCode::Esc), &mut state);
        assert!(state.ui.dialog.is_none());
        assert!(state.take_requests().is_empty());
    }

    #[test]
    fn quit_only_from_wifi_panel() {
        let mut state = state_with_networks();
        state.ui.panel = Panel::Credits;
        assert!(!handle_credits(press(KeyCode::Char('q')), &mut state));
        assert_eq!(state.ui.panel, Panel::Wifi);
        assert!(handle_wifi(press(KeyCode::Char('q')), &mut state));
    }
}
