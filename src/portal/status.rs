use crate::portal::types::{ConnectionDetails, ConnectionStatus, UpdateReason};

/// What a status poll means for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The network the user asked for is up
    AttemptSucceeded(ConnectionDetails),
    /// The network the user asked for could not be joined
    AttemptFailed,
    /// The device is on a network the user did not pick in this session
    AlreadyConnected(ConnectionDetails),
    /// The connection was dropped on request
    UserDisconnected,
    Unchanged,
}

/// Interpret a status poll against the SSID the user last selected.
///
/// `selected_ssid` is empty when nothing is selected; a reported SSID is
/// never empty, so the two can't match by accident.
pub fn classify(status: &ConnectionStatus, selected_ssid: &str) -> StatusTransition {
    let reason = status.reason();

    if let Some(ssid) = status.connected_ssid() {
        if ssid == selected_ssid {
            return match reason {
                Some(UpdateReason::Connected) => {
                    StatusTransition::AttemptSucceeded(ConnectionDetails::from_status(status))
                }
                Some(UpdateReason::Failed) => StatusTransition::AttemptFailed,
                _ => StatusTransition::Unchanged,
            };
        }
        if reason == Some(UpdateReason::Connected) {
            return StatusTransition::AlreadyConnected(ConnectionDetails::from_status(status));
        }
        return StatusTransition::Unchanged;
    }

    if reason == Some(UpdateReason::UserDisconnect) {
        StatusTransition::UserDisconnected
    } else {
        StatusTransition::Unchanged
    }
}
