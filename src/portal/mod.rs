//! Device portal module for PortalUI
//!
//! This module talks to the JSON API the device serves while it runs its
//! configuration access point, and interprets what it reports.

mod client;
mod status;
mod types;

// Re-export public API
pub use client::PortalClient;
pub use status::{StatusTransition, classify};
pub use types::{
    AccessPoint, ConnectionDetails, ConnectionStatus, PortalConfig, SignalLevel, sort_by_signal,
};
