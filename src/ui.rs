use crate::app::{AppState, AutoexecField, Dialog, ManualField, Panel, WaitState};
use crate::command::AudioOutput;
use crate::config::{self, IconSet};
use crate::input::InputState;
use crate::theme;
use ratatui::{
    prelude::*,
    widgets::{
        Block, BorderType, Borders, Clear, List, ListItem, Padding, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use std::time::Duration;

pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BACKGROUND).fg(theme::FOREGROUND)),
        area,
    );

    // Match the parity of the terminal size so the window sits exactly centered
    let height = match_parity(config::MAIN_WINDOW_HEIGHT, area.height);
    let width = match_parity(config::MAIN_WINDOW_WIDTH, area.width);

    let vertical_layout = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);
    let horizontal_layout = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(vertical_layout[1]);
    let main_area = horizontal_layout[1];

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::DIMMED))
        .title(format!(" PORTALUI v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(theme::CYAN).add_modifier(Modifier::BOLD));
    frame.render_widget(main_block, main_area);

    let inner_area = main_area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });
    let content_layout = Layout::vertical([
        Constraint::Length(3), // Connection banner
        Constraint::Min(10),   // Panel
        Constraint::Length(2), // Bottom bar
    ])
    .split(inner_area);

    let dimmed = state.ui.dialog.is_some();
    render_banner(frame, state, content_layout[0], dimmed);

    let body = content_layout[1];
    match state.ui.panel {
        Panel::Wifi => render_wifi(frame, state, body, dimmed),
        Panel::Connect => render_connect(frame, state, body),
        Panel::ConnectManual => render_connect_manual(frame, state, body),
        Panel::ConnectWait => render_connect_wait(frame, state, body),
        Panel::ConnectDetails => render_connect_details(frame, state, body, dimmed),
        Panel::Autoexec => render_autoexec(frame, state, body, dimmed),
        Panel::Credits => render_credits(frame, body),
    }

    let help_paragraph = Paragraph::new(help_lines(state))
        .style(Style::default().fg(theme::DIMMED))
        .alignment(Alignment::Center);
    frame.render_widget(help_paragraph, content_layout[2]);

    if let Some(dialog) = state.ui.dialog {
        render_dialog(frame, dialog, body);
    }

    if let Some(error) = &state.ui.error_message {
        let error_area = Rect::new(
            area.x + 2,
            area.height.saturating_sub(4),
            area.width.saturating_sub(4),
            3.min(area.height),
        );
        let error_paragraph = Paragraph::new(error.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme::RED))
                    .title(" ERROR "),
            )
            .style(Style::default().fg(theme::RED).bg(theme::BACKGROUND))
            .wrap(Wrap { trim: true });
        frame.render_widget(Clear, error_area);
        frame.render_widget(error_paragraph, error_area);
    }

    if state.ui.show_key_logger {
        render_key_logger(frame, state, main_area);
    }
}

fn match_parity(target: u16, available: u16) -> u16 {
    if target % 2 == available % 2 {
        target
    } else {
        target + 1
    }
}

fn panel_block(title: &str, color: Color, dimmed: bool) -> Block<'static> {
    let color = if dimmed { theme::DIMMED } else { color };
    Block::default()
        .title(format!(" {title} "))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .padding(Padding::new(1, 1, 0, 0))
}

/// A text field with a block cursor when focused
fn input_line(input: &InputState, width: u16, focused: bool, mask: Option<char>) -> Line<'static> {
    let (text, cursor_x) = input.visible(width as usize, mask);
    let cursor_style = Style::default().bg(theme::FOREGROUND).fg(theme::BACKGROUND);

    let chars: Vec<char> = text.chars().collect();
    let mut spans: Vec<Span> = chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if focused && i == cursor_x {
                Span::styled(c.to_string(), cursor_style)
            } else {
                Span::raw(c.to_string())
            }
        })
        .collect();
    if focused && cursor_x == chars.len() {
        spans.push(Span::styled(" ", cursor_style));
    }
    Line::from(spans)
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &InputState,
    focused: bool,
    mask: Option<char>,
) {
    let style = if focused {
        Style::default().fg(theme::YELLOW)
    } else {
        Style::default().fg(theme::FOREGROUND)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .border_style(style)
        .style(Style::default().bg(theme::BACKGROUND));
    let line = input_line(input, area.width.saturating_sub(2), focused, mask);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_banner(frame: &mut Frame, state: &AppState, area: Rect, dimmed: bool) {
    let icons = state.ui.icons;
    let (line, color) = match &state.network.connection {
        Some(details) => (
            Line::from(vec![
                Span::raw(icons.connected()),
                Span::styled("Connected to ", Style::default().fg(theme::FOREGROUND)),
                Span::styled(
                    details.ssid.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", details.ip), Style::default().fg(theme::CYAN)),
            ]),
            theme::GREEN,
        ),
        None => (
            Line::from(Span::styled(
                "Not connected to any network",
                Style::default().fg(theme::DIMMED),
            )),
            theme::DIMMED,
        ),
    };
    let color = if dimmed { theme::DIMMED } else { color };
    let banner = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(banner, area);
}

fn render_wifi(frame: &mut Frame, state: &mut AppState, area: Rect, dimmed: bool) {
    let title = if state.refresh.ap_timer.is_active() {
        "Networks"
    } else {
        "Networks (paused)"
    };
    if state.network.access_points.is_empty() {
        let waiting = Paragraph::new("Waiting for scan results...")
            .style(Style::default().fg(theme::DIMMED))
            .alignment(Alignment::Center)
            .block(panel_block(title, theme::BLUE, dimmed));
        frame.render_widget(waiting, area);
        return;
    }

    let icons = state.ui.icons;
    let list_items: Vec<ListItem> = state
        .network
        .access_points
        .iter()
        .map(|ap| {
            let level = ap.signal();
            let is_connected = state
                .network
                .connection
                .as_ref()
                .is_some_and(|c| c.ssid == ap.ssid);

            let mut ssid_style = Style::default();
            if is_connected {
                ssid_style = ssid_style.fg(theme::GREEN).add_modifier(Modifier::BOLD);
            }
            let bar_style = Style::default().fg(theme::signal_color(level));
            let (ssid_style, bar_style) = if dimmed {
                let d = Style::default().fg(theme::DIMMED);
                (d, d)
            } else {
                (ssid_style, bar_style)
            };

            ListItem::new(Line::from(vec![
                Span::styled(icons.bars(level.bars()), bar_style),
                Span::raw(" "),
                Span::raw(if ap.is_secured() {
                    icons.locked()
                } else {
                    icons.open()
                }),
                Span::styled(ap.ssid.clone(), ssid_style),
                Span::styled(
                    format!("  {} dBm", ap.rssi),
                    Style::default().fg(theme::DIMMED),
                ),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(panel_block(title, theme::BLUE, dimmed).padding(Padding::ZERO))
        .highlight_symbol(icons.highlight())
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(if dimmed {
            theme::BACKGROUND
        } else {
            theme::SELECTION_BG
        }));

    frame.render_stateful_widget(list, area, &mut state.ui.l_state);

    let viewport_height = area.height.saturating_sub(2) as usize;
    let content_len = state.network.access_points.len();
    if content_len > viewport_height {
        let mut scroll_state = ScrollbarState::new(content_len)
            .position(state.ui.l_state.selected().unwrap_or(0))
            .viewport_content_length(viewport_height);
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some(""))
            .end_symbol(Some(""))
            .thumb_symbol("█")
            .track_symbol(Some("│"))
            .style(Style::default().fg(if dimmed { theme::DIMMED } else { theme::BLUE }));
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scroll_state,
        );
    }
}

fn render_connect(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = panel_block(
        &format!("Join {}", state.network.selected_ssid),
        theme::YELLOW,
        false,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let secured = state
        .network
        .access_points
        .iter()
        .find(|ap| ap.ssid == state.network.selected_ssid)
        .is_none_or(|ap| ap.is_secured());
    let hint = if secured {
        "Enter the network password"
    } else {
        "Open network, leave the password empty"
    };

    let layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .split(inner);
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(theme::DIMMED)),
        layout[0],
    );
    render_input(frame, layout[2], "Password", &state.inputs.password, true, Some('•'));
}

fn render_connect_manual(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = panel_block("Add Network", theme::CYAN, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .split(inner);
    frame.render_widget(
        Paragraph::new("Join a hidden network by name")
            .style(Style::default().fg(theme::DIMMED)),
        layout[0],
    );
    let field = state.inputs.manual_field;
    render_input(
        frame,
        layout[1],
        "SSID",
        &state.inputs.manual_ssid,
        field == Some(ManualField::Ssid),
        None,
    );
    render_input(
        frame,
        layout[2],
        "Password",
        &state.inputs.manual_password,
        field == Some(ManualField::Password),
        Some('•'),
    );
}

fn render_connect_wait(frame: &mut Frame, state: &AppState, area: Rect) {
    let ssid = state.network.selected_ssid.as_str();
    let (lines, color) = match &state.ui.wait {
        WaitState::Loading => {
            let spinner = config::LOADING_CHARS[state.ui.loading_frame % config::LOADING_CHARS.len()];
            (
                vec![Line::from(format!("{spinner} Connecting to {ssid}..."))],
                theme::YELLOW,
            )
        }
        WaitState::Success { ip } => (
            vec![
                Line::from(format!("Connected to {ssid}")),
                Line::from(""),
                Line::from(vec![
                    Span::raw("Your IP address now is: "),
                    Span::styled(ip.clone(), Style::default().fg(theme::CYAN)),
                ]),
            ],
            theme::GREEN,
        ),
        WaitState::Failed => (
            vec![
                Line::from(format!("Could not join {ssid}")),
                Line::from(""),
                Line::from("Check the password and try again."),
            ],
            theme::RED,
        ),
    };
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel_block("Connecting", color, false).padding(Padding::new(1, 1, 1, 0)));
    frame.render_widget(paragraph, area);
}

fn render_connect_details(frame: &mut Frame, state: &AppState, area: Rect, dimmed: bool) {
    let label_style = Style::default().fg(if dimmed { theme::DIMMED } else { theme::CYAN });
    let lines = match &state.network.connection {
        Some(details) => vec![
            Line::from(vec![
                Span::styled("SSID: ", label_style),
                Span::raw(details.ssid.clone()),
            ]),
            Line::from(vec![
                Span::styled("IP address: ", label_style),
                Span::raw(details.ip.clone()),
            ]),
            Line::from(vec![
                Span::styled("Subnet mask: ", label_style),
                Span::raw(details.netmask.clone()),
            ]),
            Line::from(vec![
                Span::styled("Default gateway: ", label_style),
                Span::raw(details.gw.clone()),
            ]),
        ],
        None => vec![Line::from("Not connected")],
    };
    let paragraph = Paragraph::new(lines).block(panel_block("Details", theme::PURPLE, dimmed));
    frame.render_widget(paragraph, area);
}

fn render_autoexec(frame: &mut Frame, state: &AppState, area: Rect, dimmed: bool) {
    let icons = state.ui.icons;
    let title = if state.refresh.config_in_flight {
        "Command Line (loading...)"
    } else {
        "Command Line"
    };
    let block = panel_block(title, theme::PURPLE, dimmed);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = state.autoexec_fields();
    let focus = state.autoexec.field;
    let has_sink = fields.contains(&AutoexecField::BtSink);

    let mut constraints = vec![
        Constraint::Length(1), // Enabled
        Constraint::Length(3), // Command
        Constraint::Length(1), // Output
        Constraint::Length(3), // Player
    ];
    if has_sink {
        constraints.push(Constraint::Length(3));
    }
    constraints.extend([Constraint::Length(3), Constraint::Length(1)]);
    let layout = Layout::vertical(constraints).split(inner);

    let focus_style = |field: AutoexecField| {
        if focus == field && !dimmed {
            Style::default().fg(theme::YELLOW)
        } else {
            Style::default().fg(theme::FOREGROUND)
        }
    };

    frame.render_widget(
        Paragraph::new(format!(
            "{} Run command at boot",
            icons.checkbox(state.autoexec.enabled)
        ))
        .style(focus_style(AutoexecField::Enabled)),
        layout[0],
    );

    render_input(
        frame,
        layout[1],
        "autoexec1",
        &state.inputs.autoexec1,
        focus == AutoexecField::Command,
        None,
    );

    let mut output_spans = vec![Span::styled("Output: ", focus_style(AutoexecField::Output))];
    for output in AudioOutput::ALL {
        output_spans.push(Span::styled(
            format!(
                "{} {}  ",
                icons.radio(output == state.autoexec.output),
                output.label()
            ),
            focus_style(AutoexecField::Output),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(output_spans)), layout[2]);

    render_input(
        frame,
        layout[3],
        "Player name",
        &state.inputs.player,
        focus == AutoexecField::Player,
        None,
    );

    let mut next = 4;
    if has_sink {
        render_input(
            frame,
            layout[next],
            "Bluetooth sink",
            &state.inputs.bt_sink,
            focus == AutoexecField::BtSink,
            None,
        );
        next += 1;
    }
    render_input(
        frame,
        layout[next],
        "Optional arguments",
        &state.inputs.optional,
        focus == AutoexecField::Optional,
        None,
    );

    let buttons = [
        (AutoexecField::Generate, "Generate", theme::BLUE),
        (AutoexecField::Save, "Save", theme::GREEN),
        (AutoexecField::Factory, "Factory reset", theme::RED),
    ];
    let spans: Vec<Span> = buttons
        .iter()
        .flat_map(|(field, label, color)| {
            let style = if focus == *field && !dimmed {
                Style::default().bg(*color).fg(theme::BACKGROUND)
            } else {
                Style::default().fg(*color)
            };
            [Span::styled(format!(" {label} "), style), Span::raw("  ")]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        layout[next + 1],
    );
}

fn render_credits(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "squeezelite-esp32",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("WiFi configuration portal client"),
        Line::from("Player based on squeezelite by Adrian Smith"),
        Line::from("ESP32 port and WiFi manager by the squeezelite-esp32 contributors"),
        Line::from(""),
        Line::from(format!("portalui v{}", env!("CARGO_PKG_VERSION"))),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel_block("Credits", theme::CYAN, false).padding(Padding::new(1, 1, 1, 0)));
    frame.render_widget(paragraph, area);
}

fn render_dialog(frame: &mut Frame, dialog: Dialog, within: Rect) {
    let (title, message) = match dialog {
        Dialog::Disconnect => (" Disconnect ", "Disconnect from the current network?"),
        Dialog::FactoryReset => (
            " Factory reset ",
            "Reboot the device into its factory partition?",
        ),
    };
    let width = (message.chars().count() as u16 + 6).min(within.width);
    let height = 5.min(within.height);
    let area = Rect::new(
        within.x + (within.width - width) / 2,
        within.y + (within.height - height) / 2,
        width,
        height,
    );

    let lines = vec![
        Line::from(message),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme::FOREGROUND)),
            Span::styled(" yes • ", Style::default().fg(theme::DIMMED)),
            Span::styled("n", Style::default().fg(theme::FOREGROUND)),
            Span::styled(" no", Style::default().fg(theme::DIMMED)),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme::FOREGROUND).bg(theme::BACKGROUND))
        .block(
            Block::default()
                .title(title)
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme::YELLOW)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn key_hint(key: &str, action: &str) -> [Span<'static>; 2] {
    [
        Span::styled(key.to_string(), Style::default().fg(theme::FOREGROUND)),
        Span::styled(format!(" {action} "), Style::default().fg(theme::DIMMED)),
    ]
}

fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let spans: Vec<Span> = hints
        .iter()
        .enumerate()
        .flat_map(|(i, (key, action))| {
            let mut spans = Vec::with_capacity(3);
            if i > 0 {
                spans.push(Span::styled("• ", Style::default().fg(theme::DIMMED)));
            }
            spans.extend(key_hint(key, action));
            spans
        })
        .collect();
    Line::from(spans)
}

fn help_lines(state: &AppState) -> Vec<Line<'static>> {
    let icons: IconSet = state.ui.icons;
    if state.ui.dialog.is_some() {
        return vec![hint_line(&[("y", "confirm"), ("n / esc", "cancel")])];
    }
    match state.ui.panel {
        Panel::Wifi => vec![
            hint_line(&[
                ("q", "quit"),
                ("j/k", "nav"),
                (icons.enter(), "join"),
                ("n", "add hidden"),
                ("r", "rescan"),
            ]),
            hint_line(&[("d", "details"), ("c", "command line"), ("i", "credits")]),
        ],
        Panel::Connect => vec![hint_line(&[(icons.enter(), "join"), ("esc", "cancel")])],
        Panel::ConnectManual => vec![hint_line(&[
            (icons.tab_next(), "next field"),
            (icons.enter(), "join"),
            ("esc", "cancel"),
        ])],
        Panel::ConnectWait if state.wait_unlocked() => {
            vec![hint_line(&[(icons.enter(), "ok")])]
        }
        Panel::ConnectWait => vec![hint_line(&[("", "waiting for the device...")])],
        Panel::ConnectDetails => vec![hint_line(&[("x", "disconnect"), ("esc", "back")])],
        Panel::Autoexec => vec![
            hint_line(&[(icons.tab_next(), "next field"), ("esc", "back")]),
            hint_line(&[(icons.space(), "toggle"), (icons.enter(), "press button")]),
        ],
        Panel::Credits => vec![hint_line(&[("esc", "back")])],
    }
}

fn render_key_logger(frame: &mut Frame, state: &AppState, main_area: Rect) {
    let Some((key, time)) = &state.ui.last_key_press else {
        return;
    };
    if time.elapsed() >= Duration::from_secs(config::KEY_LOGGER_VISIBLE_SECS) {
        return;
    }

    let key_text = format!(" {key} ");
    let width = key_text.chars().count() as u16 + 2;
    let area = frame.area();
    // Right below the bottom right of the main window, if there is room
    if main_area.y + main_area.height + 3 > area.height || width > main_area.width {
        return;
    }
    let key_area = Rect::new(
        main_area.x + main_area.width - width,
        main_area.y + main_area.height,
        width,
        3,
    );

    let paragraph = Paragraph::new(key_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme::BRIGHT_PURPLE))
                .style(Style::default().bg(theme::BACKGROUND)),
        )
        .style(
            Style::default()
                .fg(theme::BRIGHT_PURPLE)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(Clear, key_area);
    frame.render_widget(paragraph, key_area);
}
