//! Primitive value type catalog

use serde::{Deserialize, Serialize};

use crate::{Result, TelemetryError};

/// Underlying value kinds of the SCS telemetry SDK.
/// Maps to the SDK's `SCS_VALUE_TYPE_*` identifiers; serde uses the short names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PrimitiveType {
    /// Placeholder for an unknown or unset type
    Invalid = 0,
    Bool = 1,
    /// 32-bit signed integer
    S32 = 2,
    /// 32-bit unsigned integer
    U32 = 3,
    /// 64-bit unsigned integer
    U64 = 4,
    /// 32-bit float
    Float = 5,
    /// 64-bit float
    Double = 6,
    /// Three 32-bit floats
    FVector = 7,
    /// Three 64-bit floats
    DVector = 8,
    /// Heading, pitch and roll as 32-bit floats
    Euler = 9,
    /// FVector position followed by Euler orientation
    FPlacement = 10,
    /// DVector position, Euler orientation and 4 trailing padding bytes
    DPlacement = 11,
    /// Null-terminated UTF-8 string
    String = 12,
    /// 64-bit signed integer
    S64 = 13,
}

/// Padding bytes embedded in an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub offset: usize,
    pub size: usize,
}

impl PrimitiveType {
    /// All types in id order.
    pub const ALL: [PrimitiveType; 14] = [
        PrimitiveType::Invalid,
        PrimitiveType::Bool,
        PrimitiveType::S32,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::FVector,
        PrimitiveType::DVector,
        PrimitiveType::Euler,
        PrimitiveType::FPlacement,
        PrimitiveType::DPlacement,
        PrimitiveType::String,
        PrimitiveType::S64,
    ];

    /// Look up a type by its SDK id.
    pub fn from_id(id: u32) -> Result<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index))
            .copied()
            .ok_or(TelemetryError::InvalidValueType { id })
    }

    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Returns the encoded size in bytes of this type.
    /// Zero means variable-sized (String) or invalid.
    pub const fn size(self) -> u32 {
        match self {
            PrimitiveType::Invalid | PrimitiveType::String => 0,
            PrimitiveType::Bool => 1,
            PrimitiveType::S32 | PrimitiveType::U32 | PrimitiveType::Float => 4,
            PrimitiveType::U64 | PrimitiveType::Double | PrimitiveType::S64 => 8,
            PrimitiveType::FVector | PrimitiveType::Euler => 12,
            PrimitiveType::DVector | PrimitiveType::FPlacement => 24,
            PrimitiveType::DPlacement => 40,
        }
    }

    /// [`PrimitiveType::size`] widened for buffer offset arithmetic.
    pub const fn byte_len(self) -> usize {
        self.size() as usize
    }

    pub const fn is_constant_size(self) -> bool {
        !matches!(self, PrimitiveType::Invalid | PrimitiveType::String)
    }

    /// Padding carried inside the encoded value, if any.
    pub const fn padding(self) -> Option<Padding> {
        match self {
            PrimitiveType::DPlacement => Some(Padding { offset: 36, size: 4 }),
            _ => None,
        }
    }

    /// Short type name as used in the telemetry definitions.
    pub const fn short_name(self) -> &'static str {
        match self {
            PrimitiveType::Invalid => "invalid",
            PrimitiveType::Bool => "bool",
            PrimitiveType::S32 => "s32",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::FVector => "fvector",
            PrimitiveType::DVector => "dvector",
            PrimitiveType::Euler => "euler",
            PrimitiveType::FPlacement => "fplacement",
            PrimitiveType::DPlacement => "dplacement",
            PrimitiveType::String => "string",
            PrimitiveType::S64 => "s64",
        }
    }

    /// The SDK macro naming this type, e.g. `SCS_VALUE_TYPE_float`.
    pub fn sdk_macro(self) -> String {
        match self {
            PrimitiveType::Invalid => "SCS_VALUE_TYPE_INVALID".to_string(),
            other => format!("SCS_VALUE_TYPE_{}", other.short_name()),
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}
