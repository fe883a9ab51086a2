/// Centralized configuration constants for PortalUI

// UI Dimensions
pub const MAIN_WINDOW_HEIGHT: u16 = 30;
pub const MAIN_WINDOW_WIDTH: u16 = 77;

// Device defaults
pub const DEFAULT_PORTAL_URL: &str = "http://192.168.4.1";
pub const REQUEST_TIMEOUT_MS: u64 = 4000;

// Timing
pub const STATUS_POLL_INTERVAL_MS: u64 = 950;
pub const AP_REFRESH_INTERVAL_MS: u64 = 2800;
pub const EVENT_POLL_MS: u64 = 100;
pub const MANUAL_REFRESH_DEBOUNCE_MS: u64 = 500;
pub const KEY_LOGGER_VISIBLE_SECS: u64 = 2;

// Signal buckets (dBm), strongest first
pub const RSSI_EXCELLENT: i32 = -60;
pub const RSSI_GOOD: i32 = -67;
pub const RSSI_FAIR: i32 = -75;

// Squeezelite command line
pub const COMMAND_HEADER: &str = "squeezelite -b 500:2000 -d all=info ";
pub const DEFAULT_PLAYER_NAME: &str = "squeezelite";

// Loading animation frames
pub const LOADING_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// Icons - Nerd Fonts
pub mod icons {
    pub mod nerd {
        pub const OPEN: &str = " "; // nf-fa-rss
        pub const LOCKED: &str = " "; // nf-fa-lock
        pub const CONNECTED: &str = "󰖩 "; // nf-md-wifi_check
        pub const HIGHLIGHT: &str = "  ";
        pub const ENTER: &str = "󰌑"; // nf-md-keyboard_return
        pub const TAB_NEXT: &str = "⇥ / ↓";
        pub const SPACE: &str = "󱁐"; // nf-md-keyboard_space
        pub const CHECKBOX_ON: &str = " "; // nf-fa-check_square_o
        pub const CHECKBOX_OFF: &str = " "; // nf-fa-square_o
        pub const RADIO_ON: &str = "◉";
        pub const RADIO_OFF: &str = "○";
        pub const BAR: &str = "▂▄▆█";
    }

    pub mod ascii {
        pub const OPEN: &str = "[O] ";
        pub const LOCKED: &str = "[*] ";
        pub const CONNECTED: &str = "<> ";
        pub const HIGHLIGHT: &str = "> ";
        pub const ENTER: &str = "Enter";
        pub const TAB_NEXT: &str = "Tab/Down";
        pub const SPACE: &str = "Space";
        pub const CHECKBOX_ON: &str = "[x]";
        pub const CHECKBOX_OFF: &str = "[ ]";
        pub const RADIO_ON: &str = "(*)";
        pub const RADIO_OFF: &str = "( )";
        pub const BAR: &str = "||||";
    }
}

/// Icon set to use based on configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSet {
    #[default]
    Nerd,
    Ascii,
}

impl IconSet {
    pub fn open(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::OPEN,
            IconSet::Ascii => icons::ascii::OPEN,
        }
    }

    pub fn locked(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::LOCKED,
            IconSet::Ascii => icons::ascii::LOCKED,
        }
    }

    pub fn connected(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::CONNECTED,
            IconSet::Ascii => icons::ascii::CONNECTED,
        }
    }

    pub fn highlight(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::HIGHLIGHT,
            IconSet::Ascii => icons::ascii::HIGHLIGHT,
        }
    }

    pub fn enter(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::ENTER,
            IconSet::Ascii => icons::ascii::ENTER,
        }
    }

    pub fn tab_next(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::TAB_NEXT,
            IconSet::Ascii => icons::ascii::TAB_NEXT,
        }
    }

    pub fn space(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::SPACE,
            IconSet::Ascii => icons::ascii::SPACE,
        }
    }

    pub fn checkbox(&self, checked: bool) -> &'static str {
        match (self, checked) {
            (IconSet::Nerd, true) => icons::nerd::CHECKBOX_ON,
            (IconSet::Nerd, false) => icons::nerd::CHECKBOX_OFF,
            (IconSet::Ascii, true) => icons::ascii::CHECKBOX_ON,
            (IconSet::Ascii, false) => icons::ascii::CHECKBOX_OFF,
        }
    }

    pub fn radio(&self, selected: bool) -> &'static str {
        match (self, selected) {
            (IconSet::Nerd, true) => icons::nerd::RADIO_ON,
            (IconSet::Nerd, false) => icons::nerd::RADIO_OFF,
            (IconSet::Ascii, true) => icons::ascii::RADIO_ON,
            (IconSet::Ascii, false) => icons::ascii::RADIO_OFF,
        }
    }

    /// Signal bars, `filled` out of four
    pub fn bars(&self, filled: usize) -> String {
        let glyphs = match self {
            IconSet::Nerd => icons::nerd::BAR,
            IconSet::Ascii => icons::ascii::BAR,
        };
        glyphs
            .chars()
            .enumerate()
            .map(|(i, c)| if i < filled { c } else { ' ' })
            .collect()
    }
}
