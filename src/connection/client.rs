//! Request/response state machine.

use tracing::{debug, info, warn};

use super::collector::{Collector, encode_with_size};
use super::payload::{DecodedTelemetry, decode_telemetry, validate_request};
use super::request::{RequestKind, TELEMETRY_DATA_START, TrailerIndexOrCount, Version};
use super::transport::{TcpTransport, Transport};
use crate::config::ConnectionConfig;
use crate::schema::{SchemaTree, TelemetryId};
use crate::{CommunicationResult, Result, TelemetryError};

/// Length of a version response: kind byte plus a little-endian `u32`.
const VERSION_FRAME_LEN: u32 = 5;

/// Client side of the plugin protocol.
///
/// Requests and responses strictly alternate. Every sent request must be received
/// (or the connection dropped) before the next one is issued; the pending fields
/// enforce this.
#[derive(Debug)]
pub struct Connection<T: Transport = TcpTransport> {
    transport: T,
    collector: Collector,
    connected: bool,
    pending_request: RequestKind,
    pending_telemetry_id: Option<TelemetryId>,
    pending_trailer: TrailerIndexOrCount,
}

impl Connection<TcpTransport> {
    /// TCP connection to the plugin described by `config`. Does not connect yet.
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::with_collector(TcpTransport::new(config.clone()), Collector::new(config.max_frame_size))
    }
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Self {
        Self::with_collector(transport, Collector::default())
    }

    pub fn with_collector(transport: T, collector: Collector) -> Self {
        Self {
            transport,
            collector,
            connected: false,
            pending_request: RequestKind::NoRequest,
            pending_telemetry_id: None,
            pending_trailer: TrailerIndexOrCount::default(),
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(CommunicationResult::AlreadyConnected.into());
        }
        self.transport.connect()?;
        self.connected = true;
        self.collector.reset();
        self.clear_pending();
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn pending_request(&self) -> RequestKind {
        self.pending_request
    }

    pub fn pending_telemetry_id(&self) -> Option<TelemetryId> {
        self.pending_telemetry_id
    }

    pub fn pending_trailer_index_or_count(&self) -> TrailerIndexOrCount {
        self.pending_trailer
    }

    /// The last collected frame, kind byte included.
    pub fn response(&self) -> &[u8] {
        self.collector.bytes()
    }

    /// Payload of the last telemetry response.
    pub fn telemetry_payload(&self) -> &[u8] {
        self.collector.bytes().get(TELEMETRY_DATA_START..).unwrap_or_default()
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Feed exactly one byte from the transport into the collector.
    pub fn receive_one(&mut self) -> Result<()> {
        self.ensure_connected()?;
        if self.pending_request == RequestKind::NoRequest {
            return Err(CommunicationResult::NoPendingRequest.into());
        }
        let byte = match self.transport.recv_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => return Err(self.drop_connection(None)),
            Err(e) if e.communication_result() == Some(CommunicationResult::Disconnected) => {
                return Err(self.drop_connection(Some(e)));
            }
            Err(e) => return Err(e),
        };
        self.collector.collect(byte);
        Ok(())
    }

    /// Collect a complete frame, discarding a previously completed one first.
    pub fn receive_all(&mut self) -> Result<()> {
        self.ensure_connected()?;
        if self.pending_request == RequestKind::NoRequest {
            return Err(CommunicationResult::NoPendingRequest.into());
        }
        if self.collector.data_ready() {
            self.collector.reset();
        }
        while !self.collector.data_ready() {
            if self.collector.error_state() {
                warn!(size = self.collector.next_size(), "Frame collector rejected frame");
                self.collector.reset();
                return Err(CommunicationResult::CollectorError.into());
            }
            self.receive_one()?;
        }
        Ok(())
    }

    /// Request the plugin version.
    ///
    /// After a timeout the version request stays pending; calling again resumes
    /// collecting its response instead of sending a new request.
    pub fn get_version(&mut self) -> Result<Version> {
        self.ensure_connected()?;
        if self.pending_request != RequestKind::Version {
            self.ensure_pending(RequestKind::NoRequest)?;
            self.transport.send(&encode_with_size(&[RequestKind::Version.as_u8()]))?;
            self.pending_request = RequestKind::Version;
        }

        let received = self.receive_all();
        self.finish_receive(received)?;

        let frame = self.collector.bytes();
        check_response_kind(frame, RequestKind::Version)?;
        if self.collector.next_size() != VERSION_FRAME_LEN {
            return Err(CommunicationResult::UnknownData.into());
        }
        let version = Version::from_bytes([frame[1], frame[2], frame[3]]);
        info!(%version, "Plugin version");
        Ok(version)
    }

    /// Send a telemetry request and record it as pending.
    pub fn send_request_for(&mut self, id: TelemetryId, argument: TrailerIndexOrCount) -> Result<()> {
        self.ensure_connected()?;
        self.ensure_pending(RequestKind::NoRequest)?;
        let frame = encode_with_size(&[RequestKind::TelemetryID.as_u8(), id.to_wire()?, argument.pack()?]);
        self.transport.send(&frame)?;
        debug!(%id, %argument, "Sent telemetry request");

        self.pending_request = RequestKind::TelemetryID;
        self.pending_telemetry_id = Some(id);
        self.pending_trailer = argument;
        Ok(())
    }

    /// Receive the response to the pending telemetry request.
    ///
    /// On success the payload is available through [`Connection::telemetry_payload`].
    /// A timeout keeps the request pending with its partial frame, so the call can be
    /// repeated to resume.
    pub fn receive_for_request(&mut self, id: TelemetryId, argument: TrailerIndexOrCount) -> Result<()> {
        self.ensure_connected()?;
        self.ensure_pending(RequestKind::TelemetryID)?;
        if self.pending_telemetry_id != Some(id) {
            return Err(CommunicationResult::OtherTelemetryIDPending.into());
        }
        if self.pending_trailer != argument {
            return Err(CommunicationResult::OtherTrailerIndexRequestPending.into());
        }

        let received = self.receive_all();
        self.finish_receive(received)?;

        let frame = self.collector.bytes();
        if frame.len() < 2 {
            return Err(CommunicationResult::UnknownData.into());
        }
        check_response_kind(frame, RequestKind::TelemetryID)?;
        if frame[1] != id.to_wire()? {
            return Err(CommunicationResult::ReceivedOtherTelemetry.into());
        }
        let echoed = frame.get(2).copied().map(TrailerIndexOrCount::unpack);
        if echoed != Some(argument) {
            return Err(CommunicationResult::ReceivedOtherTrailerIndex.into());
        }
        debug!(%id, %argument, len = frame.len(), "Received telemetry response");
        Ok(())
    }

    /// Validate, send, receive and decode one telemetry request.
    pub fn request(
        &mut self,
        tree: &SchemaTree,
        id: TelemetryId,
        argument: TrailerIndexOrCount,
    ) -> Result<DecodedTelemetry> {
        validate_request(tree, id, argument)?;
        self.send_request_for(id, argument)?;
        self.receive_for_request(id, argument)?;

        let payload = self.telemetry_payload();
        let (decoded, read) = decode_telemetry(tree, id, argument, payload, 0)?;
        if read != payload.len() {
            warn!(%id, read, len = payload.len(), "Trailing bytes after telemetry payload");
            return Err(CommunicationResult::BadlyFormed.into());
        }
        Ok(decoded)
    }

    pub fn disconnect(&mut self) -> Result<()> {
        self.ensure_connected()?;
        self.connected = false;
        self.clear_pending();
        self.collector.reset();
        self.transport.close()?;
        info!("Disconnected from telemetry plugin");
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(CommunicationResult::NotConnected.into())
        }
    }

    fn ensure_pending(&self, expected: RequestKind) -> Result<()> {
        if self.pending_request == expected {
            Ok(())
        } else {
            Err(CommunicationResult::OtherRequestPending.into())
        }
    }

    fn clear_pending(&mut self) {
        self.pending_request = RequestKind::NoRequest;
        self.pending_telemetry_id = None;
        self.pending_trailer = TrailerIndexOrCount::default();
    }

    /// Settle the pending request after a receive attempt.
    ///
    /// Timeouts leave the request pending and the partial frame collected. Any
    /// other failure abandons both so the next request starts on a fresh frame.
    fn finish_receive(&mut self, received: Result<()>) -> Result<()> {
        match received {
            Ok(()) => {
                self.clear_pending();
                Ok(())
            }
            Err(e @ TelemetryError::Timeout { .. }) => {
                debug!(
                    pending = ?self.pending_request,
                    collected = self.collector.bytes().len(),
                    "Receive timed out, request stays pending"
                );
                Err(e)
            }
            Err(e) => {
                self.clear_pending();
                self.collector.reset();
                Err(e)
            }
        }
    }

    /// Mark the peer as gone and build the `Disconnected` error.
    fn drop_connection(&mut self, source: Option<TelemetryError>) -> TelemetryError {
        warn!("Telemetry plugin closed the connection");
        self.connected = false;
        self.clear_pending();
        self.collector.reset();
        if let Err(e) = self.transport.close() {
            debug!(error = %e, "Ignoring close failure after disconnect");
        }
        match source {
            Some(source) => TelemetryError::communication_with_source(
                CommunicationResult::Disconnected,
                Box::new(source),
            ),
            None => CommunicationResult::Disconnected.into(),
        }
    }
}

/// Check the leading byte of a response frame.
///
/// An error response fails with the result it carries; one carrying `Success` or an
/// unknown code fails with `UnknownData`.
fn check_response_kind(frame: &[u8], expected: RequestKind) -> Result<()> {
    let Some(&kind) = frame.first() else {
        return Err(CommunicationResult::UnknownData.into());
    };
    if kind == RequestKind::ErrorResponse.as_u8() {
        let result = frame
            .get(1)
            .copied()
            .and_then(CommunicationResult::from_u8)
            .filter(|result| !result.is_success())
            .unwrap_or(CommunicationResult::UnknownData);
        warn!(%result, "Plugin returned an error response");
        return Err(result.into());
    }
    if kind != expected.as_u8() {
        return Err(CommunicationResult::ReceivedOtherResponse.into());
    }
    Ok(())
}
