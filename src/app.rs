use crate::command::{AudioOutput, build_command};
use crate::config::{self, IconSet};
use crate::error::PortalResult;
use crate::input::InputState;
use crate::poll::PollTimer;
use crate::portal::{
    AccessPoint, ConnectionDetails, ConnectionStatus, PortalConfig, StatusTransition, classify,
    sort_by_signal,
};
use ratatui::widgets::ListState;
use secrecy::SecretString;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which screen of the portal is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Wifi,
    Connect,
    ConnectManual,
    ConnectWait,
    ConnectDetails,
    Autoexec,
    Credits,
}

/// Modal confirmations drawn on top of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Disconnect,
    FactoryReset,
}

/// Progress of the last join request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitState {
    Loading,
    Success { ip: String },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectKind {
    Listed,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualField {
    Ssid,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoexecField {
    Enabled,
    Command,
    Output,
    Player,
    BtSink,
    Optional,
    Generate,
    Save,
    Factory,
}

/// One-shot commands whose replies carry no data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Connect,
    Disconnect,
    SaveConfig,
    FactoryReset,
}

impl CommandKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Connect => "Connect",
            CommandKind::Disconnect => "Disconnect",
            CommandKind::SaveConfig => "Saving configuration",
            CommandKind::FactoryReset => "Factory reset",
        }
    }

    // The device drops its access point while joining or rebooting, so
    // those replies often never arrive.
    fn reports_failure(&self) -> bool {
        matches!(self, CommandKind::Disconnect | CommandKind::SaveConfig)
    }
}

/// Work for the event loop to hand to the portal client
#[derive(Debug)]
pub enum PortalRequest {
    Scan,
    /// Status poll tagged with the polling generation it was sent in
    Status { generation: u64 },
    Config,
    Connect {
        ssid: String,
        password: SecretString,
    },
    Disconnect,
    SaveConfig {
        autoexec: bool,
        autoexec1: String,
    },
    FactoryReset,
}

/// Results coming back from background requests
#[derive(Debug)]
pub enum PortalEvent {
    AccessPoints(PortalResult<Vec<AccessPoint>>),
    Status {
        generation: u64,
        result: PortalResult<ConnectionStatus>,
    },
    Config(PortalResult<PortalConfig>),
    CommandDone {
        kind: CommandKind,
        result: PortalResult<()>,
    },
}

#[derive(Debug)]
pub struct NetworkState {
    pub access_points: Vec<AccessPoint>,
    /// SSID of the last join attempt, empty when none
    pub selected_ssid: String,
    /// Shown as the "connected to" banner when set
    pub connection: Option<ConnectionDetails>,
}

#[derive(Debug)]
pub struct UiState {
    pub panel: Panel,
    pub dialog: Option<Dialog>,
    pub l_state: ListState,
    pub wait: WaitState,
    pub error_message: Option<String>,
    pub loading_frame: usize,
    pub icons: IconSet,
    pub show_key_logger: bool,
    pub last_key_press: Option<(String, Instant)>,
}

#[derive(Debug, Default)]
pub struct InputsState {
    pub password: InputState,
    pub manual_ssid: InputState,
    pub manual_password: InputState,
    pub manual_field: Option<ManualField>,
    pub autoexec1: InputState,
    pub player: InputState,
    pub bt_sink: InputState,
    pub optional: InputState,
}

#[derive(Debug)]
pub struct AutoexecState {
    pub enabled: bool,
    pub output: AudioOutput,
    pub field: AutoexecField,
}

#[derive(Debug)]
pub struct RefreshState {
    pub status_timer: PollTimer,
    pub ap_timer: PollTimer,
    pub status_in_flight: bool,
    /// Bumped whenever a reply from an earlier poll must no longer count
    pub status_generation: u64,
    pub ap_in_flight: bool,
    pub config_in_flight: bool,
    pub last_manual_refresh: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub network: NetworkState,
    pub ui: UiState,
    pub inputs: InputsState,
    pub autoexec: AutoexecState,
    pub refresh: RefreshState,
    outbox: Vec<PortalRequest>,
}

impl AppState {
    pub fn new(
        status_interval: Duration,
        ap_interval: Duration,
        show_key_logger: bool,
        ascii: bool,
    ) -> AppState {
        AppState {
            network: NetworkState {
                access_points: Vec::new(),
                selected_ssid: String::new(),
                connection: None,
            },
            ui: UiState {
                panel: Panel::Wifi,
                dialog: None,
                l_state: ListState::default().with_selected(Some(0)),
                wait: WaitState::Loading,
                error_message: None,
                loading_frame: 0,
                icons: if ascii { IconSet::Ascii } else { IconSet::Nerd },
                show_key_logger,
                last_key_press: None,
            },
            inputs: InputsState {
                player: InputState::with_value(config::DEFAULT_PLAYER_NAME),
                ..Default::default()
            },
            autoexec: AutoexecState {
                enabled: false,
                output: AudioOutput::default(),
                field: AutoexecField::Enabled,
            },
            refresh: RefreshState {
                status_timer: PollTimer::new(status_interval),
                ap_timer: PollTimer::new(ap_interval),
                status_in_flight: false,
                status_generation: 0,
                ap_in_flight: false,
                config_in_flight: false,
                last_manual_refresh: Instant::now()
                    .checked_sub(Duration::from_millis(config::MANUAL_REFRESH_DEBOUNCE_MS))
                    .unwrap_or_else(Instant::now),
            },
            outbox: Vec::new(),
        }
    }

    /// First load: scan, start both timers, read the stored configuration
    pub fn startup(&mut self, now: Instant) {
        self.queue_scan();
        self.refresh.status_timer.start(now);
        self.refresh.ap_timer.start(now);
        self.refresh.config_in_flight = true;
        self.outbox.push(PortalRequest::Config);
    }

    pub fn take_requests(&mut self) -> Vec<PortalRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Fire whichever timers are due, skipping any poll still in flight
    pub fn tick(&mut self, now: Instant) {
        if self.refresh.status_timer.take_due(now) && !self.refresh.status_in_flight {
            self.refresh.status_in_flight = true;
            self.outbox.push(PortalRequest::Status {
                generation: self.refresh.status_generation,
            });
        }
        if self.refresh.ap_timer.take_due(now) {
            self.queue_scan();
        }
    }

    /// Forget any status poll still on the wire
    fn discard_pending_status(&mut self) {
        self.refresh.status_generation += 1;
        self.refresh.status_in_flight = false;
    }

    fn queue_scan(&mut self) {
        if !self.refresh.ap_in_flight {
            self.refresh.ap_in_flight = true;
            self.outbox.push(PortalRequest::Scan);
        }
    }

    /// Rescan on demand, debounced
    pub fn request_rescan(&mut self, now: Instant) {
        if now.duration_since(self.refresh.last_manual_refresh)
            < Duration::from_millis(config::MANUAL_REFRESH_DEBOUNCE_MS)
        {
            return;
        }
        self.refresh.last_manual_refresh = now;
        self.queue_scan();
    }

    pub fn handle_event(&mut self, event: PortalEvent) {
        match event {
            PortalEvent::AccessPoints(result) => {
                self.refresh.ap_in_flight = false;
                match result {
                    Ok(list) => self.apply_access_points(list),
                    Err(e) => debug!("access point refresh failed: {e}"),
                }
            }
            PortalEvent::Status { generation, result } => {
                if generation != self.refresh.status_generation {
                    debug!(generation, "dropping stale status reply");
                    return;
                }
                self.refresh.status_in_flight = false;
                match result {
                    Ok(status) => self.apply_status(&status),
                    // the device may be recalibrating its radio
                    Err(e) => debug!("status poll failed: {e}"),
                }
            }
            PortalEvent::Config(result) => {
                self.refresh.config_in_flight = false;
                match result {
                    Ok(config) => self.apply_config(&config),
                    Err(e) => {
                        warn!("failed to fetch config: {e}");
                        self.ui.error_message = Some(format!("Failed to fetch config: {}", e.summary()));
                    }
                }
            }
            PortalEvent::CommandDone { kind, result } => match result {
                Ok(()) => debug!(command = kind.label(), "command accepted"),
                Err(e) => {
                    warn!(command = kind.label(), "command failed: {e}");
                    if kind.reports_failure() {
                        self.ui.error_message =
                            Some(format!("{} failed: {}", kind.label(), e.summary()));
                    }
                }
            },
        }
    }

    /// Replace the scan list wholesale. An empty scan keeps the old list.
    pub fn apply_access_points(&mut self, mut list: Vec<AccessPoint>) {
        if list.is_empty() {
            return;
        }
        sort_by_signal(&mut list);

        let selected = self
            .ui
            .l_state
            .selected()
            .and_then(|i| self.network.access_points.get(i))
            .map(|ap| ap.ssid.clone());

        self.network.access_points = list;

        let position = selected
            .and_then(|ssid| {
                self.network
                    .access_points
                    .iter()
                    .position(|ap| ap.ssid == ssid)
            })
            .unwrap_or(0);
        self.ui.l_state.select(Some(position));
    }

    pub fn apply_status(&mut self, status: &ConnectionStatus) {
        match classify(status, &self.network.selected_ssid) {
            StatusTransition::AttemptSucceeded(details) => {
                info!(ssid = %details.ssid, ip = %details.ip, "connected");
                self.ui.wait = WaitState::Success {
                    ip: details.ip.clone(),
                };
                self.network.connection = Some(details);
            }
            StatusTransition::AttemptFailed => {
                info!(ssid = %self.network.selected_ssid, "connection attempt failed");
                self.network.connection = None;
                self.ui.wait = WaitState::Failed;
            }
            StatusTransition::AlreadyConnected(details) => {
                if self.network.connection.is_none() {
                    info!(ssid = %details.ssid, "device already connected");
                    self.network.connection = Some(details);
                }
                // Keep polling until a pending join attempt has an outcome
                if !self.attempt_pending() {
                    self.refresh.status_timer.stop();
                    self.refresh.ap_timer.stop();
                }
            }
            StatusTransition::UserDisconnected => {
                if self.network.connection.take().is_some() {
                    info!("connection dropped");
                }
            }
            StatusTransition::Unchanged => {}
        }
    }

    pub fn apply_config(&mut self, config: &PortalConfig) {
        if let Some(enabled) = config.autoexec_enabled() {
            debug!(enabled, "autoexec flag loaded");
            self.autoexec.enabled = enabled;
        }
        if let Some(command) = config.get("autoexec1") {
            self.inputs.autoexec1.set(command);
        }
    }

    /// The wait screen's OK is locked until the device answers
    pub fn wait_unlocked(&self) -> bool {
        self.ui.wait != WaitState::Loading
    }

    fn attempt_pending(&self) -> bool {
        self.ui.panel == Panel::ConnectWait && !self.wait_unlocked()
    }

    pub fn highlighted_access_point(&self) -> Option<&AccessPoint> {
        self.ui
            .l_state
            .selected()
            .and_then(|i| self.network.access_points.get(i))
    }

    pub fn select_network(&mut self, ssid: &str) {
        self.network.selected_ssid = ssid.to_string();
        self.inputs.password.clear();
        self.ui.panel = Panel::Connect;
        self.ui.wait = WaitState::Loading;
    }

    pub fn open_manual(&mut self) {
        self.inputs.manual_ssid.clear();
        self.inputs.manual_password.clear();
        self.inputs.manual_field = Some(ManualField::Ssid);
        self.ui.panel = Panel::ConnectManual;
        self.ui.wait = WaitState::Loading;
    }

    pub fn cancel_connect(&mut self) {
        self.network.selected_ssid.clear();
        self.inputs.password.clear();
        self.inputs.manual_password.clear();
        self.inputs.manual_field = None;
        self.ui.panel = Panel::Wifi;
    }

    pub fn perform_connect(&mut self, kind: ConnectKind, now: Instant) {
        // Pause polling so a stale status from the previous network can't
        // be read as the outcome of this attempt.
        self.refresh.status_timer.stop();
        self.refresh.ap_timer.stop();
        self.discard_pending_status();

        let password = match kind {
            ConnectKind::Manual => {
                self.network.selected_ssid = self.inputs.manual_ssid.value.clone();
                std::mem::take(&mut self.inputs.manual_password.value)
            }
            ConnectKind::Listed => std::mem::take(&mut self.inputs.password.value),
        };
        self.inputs.password.clear();
        self.inputs.manual_password.clear();
        self.inputs.manual_field = None;

        self.ui.wait = WaitState::Loading;
        self.ui.panel = Panel::ConnectWait;

        info!(ssid = %self.network.selected_ssid, "joining network");
        self.outbox.push(PortalRequest::Connect {
            ssid: self.network.selected_ssid.clone(),
            password: SecretString::from(password),
        });

        self.refresh.status_timer.start(now);
        self.refresh.ap_timer.start(now);
    }

    pub fn close_wait(&mut self) {
        if self.wait_unlocked() {
            self.ui.panel = Panel::Wifi;
        }
    }

    pub fn open_details(&mut self) {
        if self.network.connection.is_some() {
            self.ui.panel = Panel::ConnectDetails;
        }
    }

    pub fn confirm_disconnect(&mut self, now: Instant) {
        self.refresh.status_timer.stop();
        self.discard_pending_status();
        self.network.selected_ssid.clear();
        self.ui.dialog = None;

        info!("disconnecting");
        self.outbox.push(PortalRequest::Disconnect);

        self.refresh.status_timer.start(now);
        self.ui.panel = Panel::Wifi;
    }

    pub fn save_autoexec(&mut self) {
        info!(enabled = self.autoexec.enabled, "saving autoexec");
        self.outbox.push(PortalRequest::SaveConfig {
            autoexec: self.autoexec.enabled,
            autoexec1: self.inputs.autoexec1.value.clone(),
        });
    }

    pub fn generate_command(&mut self) {
        let command = build_command(
            &self.inputs.player.value,
            self.autoexec.output,
            &self.inputs.bt_sink.value,
            &self.inputs.optional.value,
        );
        self.inputs.autoexec1.set(command);
    }

    pub fn confirm_factory_reset(&mut self) {
        self.ui.dialog = None;
        info!("requesting factory reset");
        self.outbox.push(PortalRequest::FactoryReset);
    }

    /// Autoexec fields in tab order; the sink name only exists for Bluetooth
    pub fn autoexec_fields(&self) -> Vec<AutoexecField> {
        let mut fields = vec![
            AutoexecField::Enabled,
            AutoexecField::Command,
            AutoexecField::Output,
            AutoexecField::Player,
        ];
        if self.autoexec.output == AudioOutput::Bluetooth {
            fields.push(AutoexecField::BtSink);
        }
        fields.extend([
            AutoexecField::Optional,
            AutoexecField::Generate,
            AutoexecField::Save,
            AutoexecField::Factory,
        ]);
        fields
    }

    pub fn focus_next_autoexec(&mut self, forward: bool) {
        let fields = self.autoexec_fields();
        let current = fields
            .iter()
            .position(|f| *f == self.autoexec.field)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.autoexec.field = fields[next];
    }

    pub fn cycle_output(&mut self) {
        self.autoexec.output = self.autoexec.output.next();
        if self.autoexec.field == AutoexecField::BtSink
            && self.autoexec.output != AudioOutput::Bluetooth
        {
            self.autoexec.field = AutoexecField::Output;
        }
    }

    pub fn next(&mut self) {
        let last = self.network.access_points.len().saturating_sub(1);
        let i = self.ui.l_state.selected().map_or(0, |i| (i + 1).min(last));
        self.ui.l_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = self
            .ui
            .l_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.ui.l_state.select(Some(i));
    }

    pub fn go_to_top(&mut self) {
        if !self.network.access_points.is_empty() {
            self.ui.l_state.select(Some(0));
        }
    }

    pub fn go_to_bottom(&mut self) {
        if !self.network.access_points.is_empty() {
            self.ui
                .l_state
                .select(Some(self.network.access_points.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;
    use secrecy::ExposeSecret;

    fn state() -> AppState {
        AppState::new(
            Duration::from_millis(config::STATUS_POLL_INTERVAL_MS),
            Duration::from_millis(config::AP_REFRESH_INTERVAL_MS),
            false,
            true,
        )
    }

    fn ap(ssid: &str, rssi: i32) -> AccessPoint {
        AccessPoint {
            ssid: ssid.to_string(),
            rssi,
            auth: 3,
        }
    }

    fn status(ssid: &str, urc: u8) -> ConnectionStatus {
        ConnectionStatus {
            ssid: Some(ssid.to_string()),
            urc: Some(urc),
            ip: Some("192.168.1.42".into()),
            netmask: Some("255.255.255.0".into()),
            gw: Some("192.168.1.1".into()),
        }
    }

    #[test]
    fn startup_queues_scan_and_config_and_starts_timers() {
        let mut state = state();
        state.startup(Instant::now());

        let requests = state.take_requests();
        assert!(matches!(requests[..], [PortalRequest::Scan, PortalRequest::Config]));
        assert!(state.refresh.status_timer.is_active());
        assert!(state.refresh.ap_timer.is_active());
        assert!(state.take_requests().is_empty());
    }

    #[test]
    fn tick_skips_polls_in_flight() {
        let mut state = state();
        let t0 = Instant::now();
        state.startup(t0);
        state.take_requests();

        // scan from startup is still pending
        state.tick(t0 + Duration::from_secs(3));
        let requests = state.take_requests();
        assert!(matches!(requests[..], [PortalRequest::Status { generation: 0 }]));

        state.handle_event(PortalEvent::AccessPoints(Ok(vec![ap("a", -50)])));
        state.tick(t0 + Duration::from_secs(6));
        let requests = state.take_requests();
        assert!(matches!(requests[..], [PortalRequest::Scan]));

        state.handle_event(PortalEvent::Status {
            generation: 0,
            result: Ok(ConnectionStatus::default()),
        });
        state.tick(t0 + Duration::from_secs(7));
        assert!(matches!(state.take_requests()[..], [PortalRequest::Status { .. }]));
    }

    #[test]
    fn status_reply_from_before_join_is_ignored() {
        let mut state = state();
        let t0 = Instant::now();
        state.startup(t0);
        state.apply_status(&status("home", 0));
        state.refresh.status_timer.start(t0);
        state.refresh.ap_timer.start(t0);
        state.take_requests();

        state.tick(t0 + Duration::from_secs(1));
        let generation = match state.take_requests()[..] {
            [PortalRequest::Status { generation }] => generation,
            ref other => panic!("unexpected {other:?}"),
        };

        state.select_network("office");
        state.perform_connect(ConnectKind::Listed, t0 + Duration::from_secs(1));
        state.take_requests();

        state.handle_event(PortalEvent::Status {
            generation,
            result: Ok(status("home", 0)),
        });
        assert!(state.refresh.status_timer.is_active());
        assert!(state.refresh.ap_timer.is_active());
        assert_eq!(state.ui.wait, WaitState::Loading);

        // polling carries on and picks up the real outcome
        state.tick(t0 + Duration::from_secs(3));
        let generation = match state.take_requests()[..] {
            [PortalRequest::Status { generation }, ..] => generation,
            ref other => panic!("unexpected {other:?}"),
        };
        state.handle_event(PortalEvent::Status {
            generation,
            result: Ok(status("office", 0)),
        });
        assert!(state.wait_unlocked());
        state.close_wait();
        assert_eq!(state.ui.panel, Panel::Wifi);
    }

    #[test]
    fn previous_network_still_reported_while_joining() {
        let mut state = state();
        let t0 = Instant::now();
        state.startup(t0);
        state.select_network("office");
        state.perform_connect(ConnectKind::Listed, t0);

        state.apply_status(&status("home", 0));
        assert!(state.refresh.status_timer.is_active());
        assert!(state.refresh.ap_timer.is_active());
        assert!(!state.wait_unlocked());
    }

    #[test]
    fn access_points_sorted_and_selection_kept() {
        let mut state = state();
        state.apply_access_points(vec![ap("weak", -80), ap("strong", -40), ap("mid", -65)]);
        let order: Vec<&str> = state
            .network
            .access_points
            .iter()
            .map(|a| a.ssid.as_str())
            .collect();
        assert_eq!(order, ["strong", "mid", "weak"]);

        state.go_to_bottom();
        state.apply_access_points(vec![ap("weak", -45), ap("strong", -40)]);
        assert_eq!(state.highlighted_access_point().unwrap().ssid, "weak");
    }

    #[test]
    fn empty_scan_keeps_previous_list() {
        let mut state = state();
        state.apply_access_points(vec![ap("home", -50)]);
        state.handle_event(PortalEvent::AccessPoints(Ok(Vec::new())));
        assert_eq!(state.network.access_points.len(), 1);
    }

    #[test]
    fn connect_flow_succeeds() {
        let mut state = state();
        let t0 = Instant::now();
        state.startup(t0);
        state.take_requests();

        state.select_network("home");
        assert_eq!(state.ui.panel, Panel::Connect);
        for c in "secret".chars() {
            state.inputs.password.insert(c);
        }
        state.perform_connect(ConnectKind::Listed, t0);

        assert_eq!(state.ui.panel, Panel::ConnectWait);
        assert!(!state.wait_unlocked());
        assert!(state.inputs.password.value.is_empty());
        match &state.take_requests()[..] {
            [PortalRequest::Connect { ssid, password }] => {
                assert_eq!(ssid, "home");
                assert_eq!(password.expose_secret(), "secret");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(state.refresh.status_timer.is_active());
        assert!(state.refresh.ap_timer.is_active());

        state.close_wait();
        assert_eq!(state.ui.panel, Panel::ConnectWait);

        state.apply_status(&status("home", 0));
        assert_eq!(
            state.ui.wait,
            WaitState::Success {
                ip: "192.168.1.42".into()
            }
        );
        assert_eq!(state.network.connection.as_ref().unwrap().ssid, "home");

        state.close_wait();
        assert_eq!(state.ui.panel, Panel::Wifi);
    }

    #[test]
    fn connect_flow_fails() {
        let mut state = state();
        state.network.connection = Some(ConnectionDetails::from_status(&status("old", 0)));
        state.select_network("home");
        state.perform_connect(ConnectKind::Listed, Instant::now());

        state.apply_status(&status("home", 1));
        assert_eq!(state.ui.wait, WaitState::Failed);
        assert!(state.network.connection.is_none());
        assert!(state.wait_unlocked());
    }

    #[test]
    fn manual_connect_uses_typed_ssid() {
        let mut state = state();
        state.open_manual();
        state.inputs.manual_ssid.set("hidden-net");
        state.inputs.manual_password.set("pw");
        state.perform_connect(ConnectKind::Manual, Instant::now());

        assert_eq!(state.network.selected_ssid, "hidden-net");
        assert!(matches!(
            &state.take_requests()[..],
            [PortalRequest::Connect { ssid, .. }] if ssid == "hidden-net"
        ));
    }

    #[test]
    fn already_connected_stops_polling() {
        let mut state = state();
        state.startup(Instant::now());

        state.apply_status(&status("office", 0));
        assert_eq!(state.network.connection.as_ref().unwrap().ssid, "office");
        assert!(!state.refresh.status_timer.is_active());
        assert!(!state.refresh.ap_timer.is_active());

        // a banner already on screen is left alone
        state.network.connection.as_mut().unwrap().ip = "10.1.1.1".into();
        state.apply_status(&status("office", 0));
        assert_eq!(state.network.connection.as_ref().unwrap().ip, "10.1.1.1");
    }

    #[test]
    fn disconnect_flow() {
        let mut state = state();
        state.network.selected_ssid = "home".into();
        state.network.connection = Some(ConnectionDetails::from_status(&status("home", 0)));
        state.open_details();
        assert_eq!(state.ui.panel, Panel::ConnectDetails);
        state.ui.dialog = Some(Dialog::Disconnect);

        state.confirm_disconnect(Instant::now());
        assert_eq!(state.ui.panel, Panel::Wifi);
        assert!(state.ui.dialog.is_none());
        assert!(state.network.selected_ssid.is_empty());
        assert!(state.refresh.status_timer.is_active());
        assert!(matches!(state.take_requests()[..], [PortalRequest::Disconnect]));

        state.apply_status(&ConnectionStatus {
            urc: Some(2),
            ..Default::default()
        });
        assert!(state.network.connection.is_none());
    }

    #[test]
    fn details_need_a_connection() {
        let mut state = state();
        state.open_details();
        assert_eq!(state.ui.panel, Panel::Wifi);
    }

    #[test]
    fn cancel_clears_selection() {
        let mut state = state();
        state.select_network("home");
        state.cancel_connect();
        assert!(state.network.selected_ssid.is_empty());
        assert_eq!(state.ui.panel, Panel::Wifi);
    }

    #[test]
    fn config_fills_autoexec() {
        let mut state = state();
        let config: PortalConfig =
            serde_json::from_str(r#"{"autoexec":1,"list":[{"autoexec1":"squeezelite -o I2S"}]}"#)
                .unwrap();
        state.handle_event(PortalEvent::Config(Ok(config)));
        assert!(state.autoexec.enabled);
        assert_eq!(state.inputs.autoexec1.value, "squeezelite -o I2S");
    }

    #[test]
    fn config_failure_shows_banner() {
        let mut state = state();
        state.handle_event(PortalEvent::Config(Err(PortalError::Status {
            endpoint: "/config.json",
            code: 404,
        })));
        assert!(state.ui.error_message.as_deref().unwrap().contains("404"));
    }

    #[test]
    fn connect_failure_is_not_reported() {
        let mut state = state();
        state.handle_event(PortalEvent::CommandDone {
            kind: CommandKind::Connect,
            result: Err(PortalError::Status {
                endpoint: "/connect.json",
                code: 500,
            }),
        });
        assert!(state.ui.error_message.is_none());

        state.handle_event(PortalEvent::CommandDone {
            kind: CommandKind::SaveConfig,
            result: Err(PortalError::Status {
                endpoint: "/config.json",
                code: 500,
            }),
        });
        assert!(state.ui.error_message.is_some());
    }

    #[test]
    fn generate_and_save_command() {
        let mut state = state();
        state.inputs.player.set("kitchen");
        state.cycle_output();
        state.generate_command();
        assert_eq!(
            state.inputs.autoexec1.value,
            "squeezelite -b 500:2000 -d all=info -n kitchen -o SPDIF -R -Z 192000"
        );

        state.autoexec.enabled = true;
        state.save_autoexec();
        assert!(matches!(
            &state.take_requests()[..],
            [PortalRequest::SaveConfig { autoexec: true, autoexec1 }] if autoexec1.contains("SPDIF")
        ));
    }

    #[test]
    fn bt_sink_field_only_for_bluetooth() {
        let mut state = state();
        assert!(!state.autoexec_fields().contains(&AutoexecField::BtSink));

        state.autoexec.output = AudioOutput::Bluetooth;
        state.autoexec.field = AutoexecField::Player;
        state.focus_next_autoexec(true);
        assert_eq!(state.autoexec.field, AutoexecField::BtSink);

        state.cycle_output();
        assert_eq!(state.autoexec.output, AudioOutput::I2s);
        assert_eq!(state.autoexec.field, AutoexecField::Output);

        state.autoexec.field = AutoexecField::Enabled;
        state.focus_next_autoexec(false);
        assert_eq!(state.autoexec.field, AutoexecField::Factory);
    }

    #[test]
    fn rescan_is_debounced() {
        let mut state = state();
        let t0 = Instant::now() + Duration::from_secs(1);
        state.request_rescan(t0);
        assert_eq!(state.take_requests().len(), 1);

        state.handle_event(PortalEvent::AccessPoints(Ok(Vec::new())));
        state.request_rescan(t0 + Duration::from_millis(100));
        assert!(state.take_requests().is_empty());
    }

    #[test]
    fn factory_reset_queues_request() {
        let mut state = state();
        state.ui.dialog = Some(Dialog::FactoryReset);
        state.confirm_factory_reset();
        assert!(state.ui.dialog.is_none());
        assert!(matches!(state.take_requests()[..], [PortalRequest::FactoryReset]));
    }
}
