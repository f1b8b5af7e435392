//! Rust client library for SCS truck simulator telemetry.
//!
//! truckconnect talks to the telemetry plugin loaded into Euro Truck Simulator 2 and
//! American Truck Simulator, and decodes the values it publishes.
//!
//! # Features
//!
//! - **Value codec**: every SDK value type, with initialized flags, fixed arrays and
//!   bit-packed vectors
//! - **Schema tree**: stable telemetry ids and store offsets built from the SDK
//!   definition list
//! - **Protocol client**: blocking request/response connection with strict
//!   request discipline
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use truckconnect::{Connection, SchemaTree, TelemetryDefinitions, TrailerIndexOrCount};
//! use truckconnect::config::TruckConnectConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TruckConnectConfig::from_file("truckconnect.yaml")?;
//!     let definitions = TelemetryDefinitions::load("scssdk_telemetry.json")?;
//!     let tree = SchemaTree::build(&definitions, &config.schema)?;
//!
//!     let mut connection = Connection::from_config(&config.connection);
//!     connection.connect()?;
//!     let speed = tree.lookup("truck_channel_speed")?.id;
//!     let decoded = connection.request(&tree, speed, TrailerIndexOrCount::default())?;
//!     if let Some(speed) = decoded.as_channel().and_then(|c| c.as_plain()) {
//!         println!("Speed: {:?}", speed.get::<f32>()?);
//!     }
//!     connection.disconnect()?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
pub mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Schema and protocol
pub mod connection;
pub mod schema;

// Core exports
pub use error::*;
pub use types::*;

// Schema exports
pub use schema::{FieldOffsets, SchemaTree, StoreView, TelemetryDefinitions, TelemetryId, TelemetryNode};

// Protocol exports
pub use connection::{Connection, DecodedTelemetry, TrailerIndexOrCount, Version};
