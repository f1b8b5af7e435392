//! Raw channel and event definitions as shipped in the SDK description file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::types::PrimitiveType;
use crate::{Result, TelemetryError};

/// A continuously updated telemetry channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub expansion: String,
    #[serde(rename = "type")]
    pub value_type: PrimitiveType,
    pub indexed: bool,
    pub simple_name: String,
    pub is_trailer_channel: bool,
    pub max_count: u32,
}

/// A field of an event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
    #[serde(rename = "type")]
    pub value_type: PrimitiveType,
    pub indexed: bool,
}

/// One record kind published under an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfoDefinition {
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
    pub attributes: Vec<AttributeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
    pub event_infos: Vec<EventInfoDefinition>,
}

/// Complete definition list the schema tree is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryDefinitions {
    #[serde(default)]
    pub channels: Vec<ChannelDefinition>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

impl TelemetryDefinitions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TelemetryError::parse_error("telemetry definitions (JSON)", e.to_string()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::parse_error("telemetry definitions (YAML)", e.to_string()))
    }

    /// Load definitions, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(extension.as_str(), "json" | "yaml" | "yml") {
            return Err(TelemetryError::parse_error(
                "telemetry definitions",
                format!("unsupported file extension for {}", path.display()),
            ));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        let definitions = if extension == "json" {
            Self::from_json_str(&contents)?
        } else {
            Self::from_yaml_str(&contents)?
        };

        debug!(
            path = %path.display(),
            channels = definitions.channels.len(),
            events = definitions.events.len(),
            "Loaded telemetry definitions"
        );
        Ok(definitions)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TelemetryError::parse_error("telemetry definitions (JSON)", e.to_string()))
    }
}
