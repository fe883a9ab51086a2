use crate::config;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One entry of the device's scan result (`/ap.json`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub rssi: i32,
    /// 0 for open networks, any other auth mode means a password is needed
    #[serde(default)]
    pub auth: u32,
}

impl AccessPoint {
    pub fn is_secured(&self) -> bool {
        self.auth != 0
    }

    pub fn signal(&self) -> SignalLevel {
        SignalLevel::from_rssi(self.rssi)
    }
}

/// Signal strength buckets used by the portal for its icons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl SignalLevel {
    pub fn from_rssi(rssi: i32) -> Self {
        if rssi >= config::RSSI_EXCELLENT {
            SignalLevel::Excellent
        } else if rssi >= config::RSSI_GOOD {
            SignalLevel::Good
        } else if rssi >= config::RSSI_FAIR {
            SignalLevel::Fair
        } else {
            SignalLevel::Weak
        }
    }

    /// Number of filled bars out of four
    pub fn bars(&self) -> usize {
        match self {
            SignalLevel::Excellent => 4,
            SignalLevel::Good => 3,
            SignalLevel::Fair => 2,
            SignalLevel::Weak => 1,
        }
    }
}

/// Strongest first. Ties keep the order the device reported.
pub fn sort_by_signal(list: &mut [AccessPoint]) {
    list.sort_by(|a, b| b.rssi.cmp(&a.rssi));
}

/// Station status as reported by `/status.json`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionStatus {
    pub ssid: Option<String>,
    pub urc: Option<u8>,
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gw: Option<String>,
}

impl ConnectionStatus {
    pub fn reason(&self) -> Option<UpdateReason> {
        self.urc.map(UpdateReason::from)
    }

    /// The SSID, if the device reported a non-empty one
    pub fn connected_ssid(&self) -> Option<&str> {
        self.ssid.as_deref().filter(|s| !s.is_empty())
    }
}

/// Why the device last updated its connection status (`urc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    Connected,
    Failed,
    UserDisconnect,
    Unknown(u8),
}

impl From<u8> for UpdateReason {
    fn from(code: u8) -> Self {
        match code {
            0 => UpdateReason::Connected,
            1 => UpdateReason::Failed,
            2 => UpdateReason::UserDisconnect,
            other => UpdateReason::Unknown(other),
        }
    }
}

/// An established connection, as shown in the "connected to" banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub ssid: String,
    pub ip: String,
    pub netmask: String,
    pub gw: String,
}

impl ConnectionDetails {
    pub const UNASSIGNED: &'static str = "0.0.0.0";

    pub fn from_status(status: &ConnectionStatus) -> Self {
        let addr = |value: &Option<String>| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| Self::UNASSIGNED.to_string())
        };
        ConnectionDetails {
            ssid: status.ssid.clone().unwrap_or_default(),
            ip: addr(&status.ip),
            netmask: addr(&status.netmask),
            gw: addr(&status.gw),
        }
    }
}

/// One key/value line of the persisted configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// Persisted configuration from `/config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawConfig")]
pub struct PortalConfig {
    pub autoexec: Option<u8>,
    pub list: Vec<ConfigEntry>,
}

impl PortalConfig {
    pub fn autoexec_enabled(&self) -> Option<bool> {
        self.autoexec.map(|flag| flag == 1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

// The device sends `list` as an array of single-key objects.
#[derive(Deserialize)]
struct RawConfig {
    autoexec: Option<u8>,
    #[serde(default)]
    list: Vec<Map<String, Value>>,
}

impl From<RawConfig> for PortalConfig {
    fn from(raw: RawConfig) -> Self {
        let list = raw
            .list
            .into_iter()
            .flat_map(|line| line.into_iter())
            .map(|(key, value)| ConfigEntry {
                key,
                value: match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            })
            .collect();
        PortalConfig {
            autoexec: raw.autoexec,
            list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(ssid: &str, rssi: i32) -> AccessPoint {
        AccessPoint {
            ssid: ssid.to_string(),
            rssi,
            auth: 3,
        }
    }

    #[test]
    fn rssi_buckets_match_portal_icons() {
        assert_eq!(SignalLevel::from_rssi(-40), SignalLevel::Excellent);
        assert_eq!(SignalLevel::from_rssi(-60), SignalLevel::Excellent);
        assert_eq!(SignalLevel::from_rssi(-61), SignalLevel::Good);
        assert_eq!(SignalLevel::from_rssi(-67), SignalLevel::Good);
        assert_eq!(SignalLevel::from_rssi(-75), SignalLevel::Fair);
        assert_eq!(SignalLevel::from_rssi(-76), SignalLevel::Weak);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut list = vec![ap("a", -80), ap("b", -50), ap("c", -80), ap("d", -65)];
        sort_by_signal(&mut list);
        let order: Vec<&str> = list.iter().map(|a| a.ssid.as_str()).collect();
        assert_eq!(order, ["b", "d", "a", "c"]);
    }

    #[test]
    fn access_point_ignores_extra_fields() {
        let list: Vec<AccessPoint> = serde_json::from_str(
            r#"[{"ssid":"home","chan":6,"rssi":-52,"auth":3},{"ssid":"cafe","rssi":-70,"auth":0}]"#,
        )
        .unwrap();
        assert!(list[0].is_secured());
        assert!(!list[1].is_secured());
        assert_eq!(list[1].signal(), SignalLevel::Fair);
    }

    #[test]
    fn status_with_missing_fields() {
        let status: ConnectionStatus = serde_json::from_str(r#"{"urc":2}"#).unwrap();
        assert_eq!(status.connected_ssid(), None);
        assert_eq!(status.reason(), Some(UpdateReason::UserDisconnect));

        let status: ConnectionStatus = serde_json::from_str(r#"{"ssid":"","urc":7}"#).unwrap();
        assert_eq!(status.connected_ssid(), None);
        assert_eq!(status.reason(), Some(UpdateReason::Unknown(7)));
    }

    #[test]
    fn details_fill_missing_addresses() {
        let status = ConnectionStatus {
            ssid: Some("home".into()),
            urc: Some(0),
            ip: Some("192.168.1.20".into()),
            netmask: None,
            gw: Some(String::new()),
        };
        let details = ConnectionDetails::from_status(&status);
        assert_eq!(details.ip, "192.168.1.20");
        assert_eq!(details.netmask, "0.0.0.0");
        assert_eq!(details.gw, "0.0.0.0");
    }

    #[test]
    fn config_list_keeps_order_and_stringifies() {
        let config: PortalConfig = serde_json::from_str(
            r#"{"autoexec":1,"list":[{"autoexec1":"squeezelite -o I2S"},{"autoexec2":5}]}"#,
        )
        .unwrap();
        assert_eq!(config.autoexec_enabled(), Some(true));
        assert_eq!(config.get("autoexec1"), Some("squeezelite -o I2S"));
        assert_eq!(config.get("autoexec2"), Some("5"));
        assert_eq!(config.list[0].key, "autoexec1");
    }

    #[test]
    fn config_without_fields() {
        let config: PortalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.autoexec_enabled(), None);
        assert!(config.list.is_empty());

        let config: PortalConfig = serde_json::from_str(r#"{"autoexec":0}"#).unwrap();
        assert_eq!(config.autoexec_enabled(), Some(false));
    }
}
