//! Request kinds and request arguments as they appear on the wire.

use serde::{Deserialize, Serialize};

use crate::{CommunicationResult, Result, TelemetryError};

/// TCP port the plugin listens on.
pub const PORT: u16 = crate::config::DEFAULT_PORT;

/// Offset of the payload in a telemetry response: kind, id, trailer argument.
pub const TELEMETRY_DATA_START: usize = 3;

/// Offset of the payload in a data definition response.
pub const DATA_DEFINITION_DATA_START: usize = 2;

/// Offset of the payload in a defined data response.
pub const DEFINED_DATA_DATA_START: usize = 2;

/// Leading byte of every request and response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[repr(u8)]
pub enum RequestKind {
    #[default]
    NoRequest = 0,
    TelemetryID = 1,
    RegisterDataDefinition = 2,
    DefinedData = 3,
    UnregisterDataDefinition = 4,
    Version = 5,
    ErrorResponse = 6,
}

impl RequestKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => RequestKind::NoRequest,
            1 => RequestKind::TelemetryID,
            2 => RequestKind::RegisterDataDefinition,
            3 => RequestKind::DefinedData,
            4 => RequestKind::UnregisterDataDefinition,
            5 => RequestKind::Version,
            6 => RequestKind::ErrorResponse,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Trailer argument of a telemetry request: either one trailer slot or the
/// number of leading slots to return.
///
/// Packs into one byte as `is_count | magnitude << 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct TrailerIndexOrCount {
    pub is_count: bool,
    pub index_or_count: u8,
}

impl TrailerIndexOrCount {
    /// Largest magnitude that fits the packed byte.
    pub const MAX_MAGNITUDE: u8 = 0x7f;

    pub const fn index(index: u8) -> Self {
        Self { is_count: false, index_or_count: index }
    }

    pub const fn count(count: u8) -> Self {
        Self { is_count: true, index_or_count: count }
    }

    pub const fn unpack(packed: u8) -> Self {
        Self { is_count: packed & 1 != 0, index_or_count: packed >> 1 }
    }

    pub fn pack(self) -> Result<u8> {
        if self.index_or_count > Self::MAX_MAGNITUDE {
            let result = if self.is_count {
                CommunicationResult::TrailerCountOutOfBounds
            } else {
                CommunicationResult::TrailerIndexOutOfBounds
            };
            return Err(TelemetryError::communication(result));
        }
        Ok(u8::from(self.is_count) | self.index_or_count << 1)
    }

    /// Whether this is the argument used for telemetry outside trailers.
    pub fn is_default(self) -> bool {
        self == Self::default()
    }
}

impl std::fmt::Display for TrailerIndexOrCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_count {
            write!(f, "count {}", self.index_or_count)
        } else {
            write!(f, "index {}", self.index_or_count)
        }
    }
}

/// Plugin protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self { major: bytes[0], minor: bytes[1], patch: bytes[2] }
    }

    /// Decode from the low three bytes of a little-endian integer.
    pub const fn from_int(value: u32) -> Self {
        let bytes = value.to_le_bytes();
        Self::from_bytes([bytes[0], bytes[1], bytes[2]])
    }

    pub const fn to_int(self) -> u32 {
        u32::from_le_bytes([self.major, self.minor, self.patch, 0])
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
