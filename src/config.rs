//! Runtime configuration.
//!
//! Configuration is plain serde data, usually read from a YAML file:
//!
//! ```yaml
//! connection:
//!   host: 192.168.1.20
//!   read_timeout_ms: 2000
//! schema:
//!   exclude_channels:
//!     - SCS_TELEMETRY_TRUCK_CHANNEL_adblue_average_consumption
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Result, TelemetryError};

/// TCP port the telemetry plugin listens on.
pub const DEFAULT_PORT: u16 = 52878;

/// Number of physical trailer slots the SDK exposes.
pub const DEFAULT_TRAILER_COUNT: u32 = 10;

/// Largest frame accepted by default.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 1 << 20;

/// Event domains whose records are part of the schema.
pub const TELEMETRY_EVENTS: [&str; 2] =
    ["SCS_TELEMETRY_EVENT_configuration", "SCS_TELEMETRY_EVENT_gameplay"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruckConnectConfig {
    pub connection: ConnectionConfig,
    pub schema: SchemaConfig,
}

impl TruckConnectConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::parse_error("configuration", e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    /// Frames announcing a larger payload put the collector in its error state.
    pub max_frame_size: u32,
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub trailer_count: u32,
    /// Channel macros skipped while building the schema.
    pub exclude_channels: Vec<String>,
    /// Event macros whose records become schema nodes.
    pub telemetry_events: Vec<String>,
}

impl SchemaConfig {
    pub fn is_excluded(&self, channel_macro: &str) -> bool {
        self.exclude_channels.iter().any(|excluded| excluded == channel_macro)
    }

    pub fn is_telemetry_event(&self, event_macro: &str) -> bool {
        self.telemetry_events.iter().any(|event| event == event_macro)
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            trailer_count: DEFAULT_TRAILER_COUNT,
            exclude_channels: Vec::new(),
            telemetry_events: TELEMETRY_EVENTS.iter().map(|event| event.to_string()).collect(),
        }
    }
}
