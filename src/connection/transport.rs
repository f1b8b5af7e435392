//! Byte-stream transports.

use std::io::{BufReader, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::{CommunicationResult, Result, TelemetryError};

/// Blocking byte stream a [`Connection`](super::Connection) runs over.
///
/// Implementations:
/// - [`TcpTransport`]: the plugin socket
/// - `MockTransport` (tests): scripted inbound bytes
pub trait Transport {
    fn connect(&mut self) -> Result<()>;

    /// Write a complete frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Read one byte, blocking.
    ///
    /// Returns:
    /// - `Ok(Some(byte))` - next byte of the stream
    /// - `Ok(None)` - the peer closed the stream
    /// - `Err(e)` - socket error or timeout
    fn recv_byte(&mut self) -> Result<Option<u8>>;

    fn close(&mut self) -> Result<()>;
}

/// TCP transport to the plugin.
#[derive(Debug)]
pub struct TcpTransport {
    config: ConnectionConfig,
    stream: Option<BufReader<TcpStream>>,
}

impl TcpTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config, stream: None }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn open(&self) -> Result<TcpStream> {
        let address = (self.config.host.as_str(), self.config.port);
        let Some(timeout) = self.config.connect_timeout() else {
            return Ok(TcpStream::connect(address)?);
        };

        let mut last_error = None;
        for candidate in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(match last_error {
            Some(e) if e.kind() == ErrorKind::TimedOut => TelemetryError::Timeout { duration: timeout },
            Some(e) => e.into(),
            None => TelemetryError::communication(CommunicationResult::GenericSocketError),
        })
    }

    fn stream(&mut self) -> Result<&mut BufReader<TcpStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| TelemetryError::communication(CommunicationResult::NotConnected))
    }

    fn read_timeout(&self) -> Duration {
        self.config.read_timeout().unwrap_or_default()
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<()> {
        let stream = self.open()?;
        stream.set_read_timeout(self.config.read_timeout())?;
        stream.set_nodelay(true)?;
        info!(host = %self.config.host, port = self.config.port, "Connected to telemetry plugin");
        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.stream()?.get_mut();
        stream.write_all(frame)?;
        stream.flush()?;
        Ok(())
    }

    fn recv_byte(&mut self) -> Result<Option<u8>> {
        let timeout = self.read_timeout();
        let mut byte = [0u8; 1];
        loop {
            match self.stream()?.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(TelemetryError::Timeout { duration: timeout });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            debug!("Closing telemetry socket");
            match stream.get_ref().shutdown(Shutdown::Both) {
                Ok(()) => {}
                // the peer may already be gone
                Err(e) if e.kind() == ErrorKind::NotConnected => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
