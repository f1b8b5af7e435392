//! Error types for telemetry processing.
//!
//! Two layers live here. [`CommunicationResult`] is the wire-level taxonomy shared
//! with the in-game plugin: every value fits in one byte and travels inside error
//! response frames. [`TelemetryError`] is the Rust-side error returned by every
//! fallible operation in this crate; it wraps a [`CommunicationResult`] for protocol
//! failures and adds context for decoding, schema and file problems.
//!
//! ## Error Categories
//!
//! - **Connection state**: AlreadyConnected, NotConnected, Disconnected, GenericSocketError
//! - **Framing**: Incomplete, CollectorError, UnknownData
//! - **Protocol discipline**: NoPendingRequest, OtherRequestPending, OtherTelemetryIDPending
//! - **Response mismatch**: ReceivedOtherResponse, ReceivedOtherTelemetry, ReceivedOtherTrailerIndex
//! - **Decoding and schema**: deserialization, invalid value types, malformed definitions
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use truckconnect::{CommunicationResult, TelemetryError};
//!
//! let error = TelemetryError::communication(CommunicationResult::Disconnected);
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! assert_eq!(error.communication_result(), Some(CommunicationResult::Disconnected));
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Outcome codes exchanged between the plugin and its clients.
///
/// The discriminants are the on-wire byte values and must never be reordered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[repr(u8)]
pub enum CommunicationResult {
    #[error("success")]
    Success = 0,
    #[error("generic socket error")]
    GenericSocketError = 1,
    #[error("already connected")]
    AlreadyConnected = 2,
    #[error("not connected")]
    NotConnected = 3,
    #[error("disconnected")]
    Disconnected = 4,
    #[error("incomplete data")]
    Incomplete = 5,
    #[error("frame collector error")]
    CollectorError = 6,
    #[error("no pending request")]
    NoPendingRequest = 7,
    #[error("invalid telemetry")]
    InvalidTelemetry = 8,
    #[error("invalid trailer index")]
    InvalidTrailerIndex = 9,
    #[error("another request is pending")]
    OtherRequestPending = 10,
    #[error("another telemetry id is pending")]
    OtherTelemetryIDPending = 11,
    #[error("another trailer index request is pending")]
    OtherTrailerIndexRequestPending = 12,
    #[error("received a response of another kind")]
    ReceivedOtherResponse = 13,
    #[error("received another telemetry")]
    ReceivedOtherTelemetry = 14,
    #[error("received another trailer index")]
    ReceivedOtherTrailerIndex = 15,
    #[error("deserialization failure")]
    DeserializationFailure = 16,
    #[error("trailer index out of bounds")]
    TrailerIndexOutOfBounds = 17,
    #[error("trailer count out of bounds")]
    TrailerCountOutOfBounds = 18,
    #[error("trailer index or count was a count")]
    TrailerIndexOrCountWasCount = 19,
    #[error("null argument")]
    NullArgument = 20,
    #[error("empty")]
    Empty = 21,
    #[error("already registered")]
    AlreadyRegistered = 22,
    #[error("other defined data pending")]
    OtherDefinedDataPending = 23,
    #[error("not registered")]
    NotRegistered = 24,
    #[error("arrange error")]
    ArrangeError = 25,
    #[error("badly formed")]
    BadlyFormed = 26,
    #[error("unknown data")]
    UnknownData = 27,
}

impl CommunicationResult {
    /// All results in wire order.
    pub const ALL: [CommunicationResult; 28] = [
        CommunicationResult::Success,
        CommunicationResult::GenericSocketError,
        CommunicationResult::AlreadyConnected,
        CommunicationResult::NotConnected,
        CommunicationResult::Disconnected,
        CommunicationResult::Incomplete,
        CommunicationResult::CollectorError,
        CommunicationResult::NoPendingRequest,
        CommunicationResult::InvalidTelemetry,
        CommunicationResult::InvalidTrailerIndex,
        CommunicationResult::OtherRequestPending,
        CommunicationResult::OtherTelemetryIDPending,
        CommunicationResult::OtherTrailerIndexRequestPending,
        CommunicationResult::ReceivedOtherResponse,
        CommunicationResult::ReceivedOtherTelemetry,
        CommunicationResult::ReceivedOtherTrailerIndex,
        CommunicationResult::DeserializationFailure,
        CommunicationResult::TrailerIndexOutOfBounds,
        CommunicationResult::TrailerCountOutOfBounds,
        CommunicationResult::TrailerIndexOrCountWasCount,
        CommunicationResult::NullArgument,
        CommunicationResult::Empty,
        CommunicationResult::AlreadyRegistered,
        CommunicationResult::OtherDefinedDataPending,
        CommunicationResult::NotRegistered,
        CommunicationResult::ArrangeError,
        CommunicationResult::BadlyFormed,
        CommunicationResult::UnknownData,
    ];

    /// Decode a wire byte. Returns `None` for values outside the taxonomy.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// The wire byte for this result.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn is_success(self) -> bool {
        matches!(self, CommunicationResult::Success)
    }
}

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Communication failed: {result}")]
    Communication {
        result: CommunicationResult,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Deserialization failed at offset {offset}: {details}")]
    Deserialization { offset: usize, details: String },

    #[error("Invalid value type id {id}")]
    InvalidValueType { id: u32 },

    #[error("Schema build failed: {reason}")]
    Schema { reason: String },

    #[error("Definition file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Field '{field}' not found in telemetry schema")]
    FieldNotFound { field: String },

    #[error("Type conversion error: {details}")]
    TypeConversion { details: String },
}

impl TelemetryError {
    /// Project this error onto the wire taxonomy, when it has a wire meaning.
    pub fn communication_result(&self) -> Option<CommunicationResult> {
        match self {
            TelemetryError::Communication { result, .. } => Some(*result),
            TelemetryError::Deserialization { .. } => {
                Some(CommunicationResult::DeserializationFailure)
            }
            TelemetryError::Timeout { .. } => Some(CommunicationResult::Incomplete),
            TelemetryError::InvalidValueType { .. }
            | TelemetryError::Schema { .. }
            | TelemetryError::File { .. }
            | TelemetryError::Parse { .. }
            | TelemetryError::FieldNotFound { .. }
            | TelemetryError::TypeConversion { .. } => None,
        }
    }

    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Communication { result, .. } => matches!(
                result,
                CommunicationResult::Disconnected
                    | CommunicationResult::GenericSocketError
                    | CommunicationResult::Incomplete
                    | CommunicationResult::CollectorError
                    | CommunicationResult::UnknownData
            ),
            TelemetryError::Timeout { .. } => true,
            TelemetryError::Deserialization { .. } => false,
            TelemetryError::InvalidValueType { .. } => false,
            TelemetryError::Schema { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::FieldNotFound { .. } => false,
            TelemetryError::TypeConversion { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Communication { result, .. } => match result {
                CommunicationResult::Disconnected | CommunicationResult::GenericSocketError => vec![
                    "Ensure the game is running with the telemetry plugin loaded",
                    "Reconnect before issuing further requests",
                    "Check that nothing else is bound to the telemetry port",
                ],
                CommunicationResult::NotConnected | CommunicationResult::AlreadyConnected => {
                    vec!["Check the connection lifecycle around connect and disconnect calls"]
                }
                CommunicationResult::OtherRequestPending
                | CommunicationResult::OtherTelemetryIDPending
                | CommunicationResult::OtherTrailerIndexRequestPending
                | CommunicationResult::NoPendingRequest => vec![
                    "Receive the outstanding response before sending another request",
                    "Pass the same telemetry id and trailer argument that were sent",
                ],
                CommunicationResult::ReceivedOtherResponse
                | CommunicationResult::ReceivedOtherTelemetry
                | CommunicationResult::ReceivedOtherTrailerIndex
                | CommunicationResult::UnknownData
                | CommunicationResult::CollectorError => vec![
                    "Reconnect to resynchronise the stream",
                    "Verify client and plugin protocol versions match",
                ],
                CommunicationResult::InvalidTelemetry
                | CommunicationResult::InvalidTrailerIndex
                | CommunicationResult::TrailerIndexOutOfBounds
                | CommunicationResult::TrailerCountOutOfBounds
                | CommunicationResult::TrailerIndexOrCountWasCount => vec![
                    "Check the telemetry id against the schema",
                    "Only pass trailer arguments to trailer telemetry",
                ],
                _ => vec!["Verify client and plugin schemas were built from the same definitions"],
            },
            TelemetryError::Deserialization { .. } => vec![
                "Verify the schema matches the plugin build",
                "Check buffer bounds before decoding",
            ],
            TelemetryError::InvalidValueType { .. } => {
                vec!["Check the value type ids in the telemetry definitions"]
            }
            TelemetryError::Schema { .. } => vec![
                "Check the telemetry definitions file for duplicates and unknown prefixes",
                "Regenerate the definitions from the SDK headers",
            ],
            TelemetryError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            TelemetryError::Parse { .. } => {
                vec!["Check data format compatibility", "Verify source data integrity"]
            }
            TelemetryError::Timeout { .. } => vec![
                "Increase the read timeout",
                "Verify the game is not paused in a loading screen",
            ],
            TelemetryError::FieldNotFound { .. } => {
                vec!["Check field name spelling", "Verify the field exists in the loaded schema"]
            }
            TelemetryError::TypeConversion { .. } => vec![
                "Check data type compatibility",
                "Verify expected vs actual primitive types",
            ],
        }
    }

    /// Helper constructor for protocol failures without an underlying cause.
    pub fn communication(result: CommunicationResult) -> Self {
        TelemetryError::Communication { result, source: None }
    }

    /// Helper constructor for protocol failures caused by another error.
    pub fn communication_with_source(
        result: CommunicationResult,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Communication { result, source: Some(source) }
    }

    /// Helper constructor for reads past the end of a buffer.
    pub fn out_of_bounds(offset: usize, needed: usize, available: usize) -> Self {
        TelemetryError::Deserialization {
            offset,
            details: format!("needed {} bytes, {} available", needed, available),
        }
    }

    /// Helper constructor for malformed encoded data.
    pub fn deserialization(offset: usize, details: impl Into<String>) -> Self {
        TelemetryError::Deserialization { offset, details: details.into() }
    }

    /// Helper constructor for malformed schema definitions.
    pub fn schema(reason: impl Into<String>) -> Self {
        TelemetryError::Schema { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for type mismatches.
    pub fn type_conversion(details: impl Into<String>) -> Self {
        TelemetryError::TypeConversion { details: details.into() }
    }
}

impl From<CommunicationResult> for TelemetryError {
    fn from(result: CommunicationResult) -> Self {
        TelemetryError::communication(result)
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        let result = match err.kind() {
            std::io::ErrorKind::UnexpectedEof => CommunicationResult::Disconnected,
            _ => CommunicationResult::GenericSocketError,
        };
        TelemetryError::communication_with_source(result, Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn wire_bytes_round_trip_through_the_taxonomy(byte in any::<u8>()) {
            match CommunicationResult::from_u8(byte) {
              Some(result) => {
                prop_assert!(byte < 28);
                prop_assert_eq!(result.as_u8(), byte);
              }
              None => prop_assert!(byte >= 28),
            }
          }

          #[test]
          fn error_messages_carry_their_context(
            offset in 0usize..0x10000usize,
            details in "[a-z ]{1,32}",
            field in "\\w+",
          ) {
            let deserialization = TelemetryError::deserialization(offset, details.clone());
            let msg = deserialization.to_string();
            prop_assert!(msg.contains(&offset.to_string()));
            prop_assert!(msg.contains(&details));

            let missing = TelemetryError::FieldNotFound { field: field.clone() };
            prop_assert!(missing.to_string().contains(&field));
          }

          #[test]
          fn io_errors_become_socket_failures(reason in ".*") {
            let converted: TelemetryError = std::io::Error::other(reason.clone()).into();
            prop_assert_eq!(
              converted.communication_result(),
              Some(CommunicationResult::GenericSocketError)
            );
            let source = std::error::Error::source(&converted);
            prop_assert!(source.is_some());
            prop_assert_eq!(source.map(|s| s.to_string()), Some(reason));
          }
        }
    }

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(CommunicationResult::Success.as_u8(), 0);
        assert_eq!(CommunicationResult::Disconnected.as_u8(), 4);
        assert_eq!(CommunicationResult::OtherRequestPending.as_u8(), 10);
        assert_eq!(CommunicationResult::DeserializationFailure.as_u8(), 16);
        assert_eq!(CommunicationResult::OtherDefinedDataPending.as_u8(), 23);
        assert_eq!(CommunicationResult::UnknownData.as_u8(), 27);
        for (i, result) in CommunicationResult::ALL.iter().enumerate() {
            assert_eq!(usize::from(result.as_u8()), i);
        }
    }

    #[test]
    fn success_is_explicit() {
        assert!(CommunicationResult::Success.is_success());
        assert!(!CommunicationResult::Empty.is_success());
    }

    #[test]
    fn decoding_errors_map_to_deserialization_failure() {
        let err = TelemetryError::out_of_bounds(10, 4, 2);
        assert_eq!(err.communication_result(), Some(CommunicationResult::DeserializationFailure));
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_results() {
        assert!(TelemetryError::communication(CommunicationResult::Disconnected).is_retryable());
        assert!(TelemetryError::Timeout { duration: Duration::from_millis(5) }.is_retryable());
        assert!(!TelemetryError::communication(CommunicationResult::OtherRequestPending).is_retryable());
        assert!(!TelemetryError::schema("duplicate").is_retryable());
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = vec![
            TelemetryError::communication(CommunicationResult::Disconnected),
            TelemetryError::communication(CommunicationResult::ArrangeError),
            TelemetryError::out_of_bounds(0, 1, 0),
            TelemetryError::InvalidValueType { id: 99 },
            TelemetryError::schema("bad"),
            TelemetryError::file_error(
                PathBuf::from("defs.json"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            ),
            TelemetryError::parse_error("defs", "bad json"),
            TelemetryError::Timeout { duration: Duration::from_secs(1) },
            TelemetryError::FieldNotFound { field: "speed".to_string() },
            TelemetryError::type_conversion("f32 vs u32"),
        ];
        for error in errors {
            assert!(!error.recovery_suggestions().is_empty(), "{error}");
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn unexpected_eof_is_a_disconnect() {
        let err: TelemetryError =
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof").into();
        assert_eq!(err.communication_result(), Some(CommunicationResult::Disconnected));
    }
}
