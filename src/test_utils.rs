//! Test utilities shared by unit tests and benchmarks
//!
//! Provides fixture lookup, canned telemetry definitions and a scripted in-memory
//! transport for driving a [`Connection`](crate::connection::Connection) without a
//! running game.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connection::{RequestKind, Transport, encode_with_size};
use crate::schema::{ChannelDefinition, TelemetryDefinitions};
use crate::types::PrimitiveType;
use crate::{CommunicationResult, Result, TelemetryError};

/// Definitions fixture shipped with the crate.
pub const DEFINITIONS_FIXTURE: &str = "scssdk_telemetry.json";

/// Error returned when a required fixture cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Directory holding test fixtures.
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// Path of a fixture inside `test-data/`, whether or not it exists.
pub fn fixture_path(file_name: &str) -> PathBuf {
    test_data_dir().join(file_name)
}

/// Path of a fixture inside `test-data/`, failing when it is missing.
pub fn require_fixture(file_name: &str) -> std::result::Result<PathBuf, FixtureError> {
    let path = fixture_path(file_name);
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError {
            message: format!("Missing fixture: {}. Fixtures live under test-data/.", path.display()),
        })
    }
}

/// Non-indexed channel named after its macro.
pub fn channel_definition(macro_name: &str, value_type: PrimitiveType) -> ChannelDefinition {
    let simple_name = macro_name.rsplit("CHANNEL_").next().unwrap_or(macro_name).to_string();
    ChannelDefinition {
        macro_name: macro_name.to_string(),
        expansion: simple_name.replace('_', "."),
        value_type,
        indexed: false,
        simple_name,
        is_trailer_channel: macro_name.starts_with("SCS_TELEMETRY_TRAILER_CHANNEL"),
        max_count: 1,
    }
}

/// Two truck channels and no events: a float speed and a four slot wheel array.
pub fn minimal_definitions() -> TelemetryDefinitions {
    let mut wheels = channel_definition("SCS_TELEMETRY_TRUCK_CHANNEL_wheel_substance", PrimitiveType::U32);
    wheels.indexed = true;
    wheels.max_count = 4;
    TelemetryDefinitions {
        channels: vec![
            channel_definition("SCS_TELEMETRY_TRUCK_CHANNEL_speed", PrimitiveType::Float),
            wheels,
        ],
        events: Vec::new(),
    }
}

/// The bundled definitions fixture.
pub fn sample_definitions() -> TelemetryDefinitions {
    // embedded so benchmarks do not depend on the working directory
    let json = include_str!("../test-data/scssdk_telemetry.json");
    match TelemetryDefinitions::from_json_str(json) {
        Ok(definitions) => definitions,
        Err(e) => panic!("bundled definitions fixture is invalid: {}", e),
    }
}

/// Frame sent by the plugin in reply to a version request.
pub fn version_response(major: u8, minor: u8, patch: u8) -> Vec<u8> {
    vec![RequestKind::Version.as_u8(), major, minor, patch, 0]
}

/// Frame sent by the plugin in reply to a telemetry request.
pub fn telemetry_response(id: u8, packed_argument: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![RequestKind::TelemetryID.as_u8(), id, packed_argument];
    frame.extend_from_slice(payload);
    frame
}

pub fn error_response(result: CommunicationResult) -> Vec<u8> {
    vec![RequestKind::ErrorResponse.as_u8(), result.as_u8()]
}

/// In-memory transport replaying scripted inbound bytes.
///
/// Reads past the end of the script report an orderly close.
#[derive(Debug, Default)]
pub struct MockTransport {
    inbound: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
    refuse_connect: bool,
    connects: usize,
    closes: usize,
    reads: usize,
    interruption: Option<(usize, TelemetryError)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose `connect` always fails.
    pub fn refusing() -> Self {
        Self { refuse_connect: true, ..Self::default() }
    }

    /// Fail the read following the first `reads` bytes with `error`, once.
    pub fn interrupt_after(&mut self, reads: usize, error: TelemetryError) -> &mut Self {
        self.interruption = Some((self.reads + reads, error));
        self
    }

    /// Like [`MockTransport::interrupt_after`] with a read timeout.
    pub fn time_out_after(&mut self, reads: usize) -> &mut Self {
        self.interrupt_after(reads, TelemetryError::Timeout { duration: Duration::from_millis(1) })
    }

    /// Queue a size-prefixed frame.
    pub fn push_frame(&mut self, payload: &[u8]) -> &mut Self {
        self.inbound.extend(encode_with_size(payload).iter());
        self
    }

    /// Queue raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.inbound.extend(bytes);
        self
    }

    /// Frames written so far, size prefix included.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn unread(&self) -> usize {
        self.inbound.len()
    }

    pub fn connects(&self) -> usize {
        self.connects
    }

    pub fn closes(&self) -> usize {
        self.closes
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Result<()> {
        if self.refuse_connect {
            return Err(TelemetryError::communication(CommunicationResult::GenericSocketError));
        }
        self.connects += 1;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv_byte(&mut self) -> Result<Option<u8>> {
        if self.interruption.as_ref().is_some_and(|(at, _)| *at == self.reads) {
            if let Some((_, error)) = self.interruption.take() {
                return Err(error);
            }
        }
        let byte = self.inbound.pop_front();
        if byte.is_some() {
            self.reads += 1;
        }
        Ok(byte)
    }

    fn close(&mut self) -> Result<()> {
        self.closes += 1;
        Ok(())
    }
}
