//! Plugin protocol client.
//!
//! A [`Connection`] talks to the in-game telemetry plugin over a blocking byte
//! stream. Each exchange is one size-prefixed request frame followed by one
//! size-prefixed response frame:
//!
//! ```text
//! request:        [TelemetryID][id: u8][trailer index or count: u8]
//! response:       [TelemetryID][id: u8][trailer index or count: u8][payload...]
//! error response: [ErrorResponse][CommunicationResult: u8]
//! ```
//!
//! # Architecture
//!
//! - [`Transport`] abstracts the byte stream ([`TcpTransport`] in production)
//! - [`Collector`] assembles frames byte by byte
//! - [`Connection`] enforces request/response alternation through its pending fields
//! - [`decode_telemetry`] turns a response payload into [`DecodedTelemetry`] using the
//!   schema tree
//!
//! # Usage
//!
//! ```rust,no_run
//! use truckconnect::config::TruckConnectConfig;
//! use truckconnect::connection::{Connection, TrailerIndexOrCount};
//! use truckconnect::schema::{SchemaTree, TelemetryDefinitions};
//!
//! let config = TruckConnectConfig::default();
//! let definitions = TelemetryDefinitions::load("scssdk_telemetry.json")?;
//! let tree = SchemaTree::build(&definitions, &config.schema)?;
//!
//! let mut connection = Connection::from_config(&config.connection);
//! connection.connect()?;
//! println!("plugin {}", connection.get_version()?);
//!
//! let paused = tree.lookup("channel_paused")?.id;
//! let decoded = connection.request(&tree, paused, TrailerIndexOrCount::default())?;
//! println!("{:?}", decoded);
//! connection.disconnect()?;
//! # Ok::<(), truckconnect::TelemetryError>(())
//! ```

mod client;
mod collector;
mod payload;
mod request;
mod transport;

pub use client::Connection;
pub use collector::{Collector, CollectorState, encode_with_size};
pub use payload::{AttributeValue, DecodedTelemetry, EventRecord, decode_telemetry, validate_request};
pub use request::{
    DATA_DEFINITION_DATA_START, DEFINED_DATA_DATA_START, PORT, RequestKind, TELEMETRY_DATA_START,
    TrailerIndexOrCount, Version,
};
pub use transport::{TcpTransport, Transport};
