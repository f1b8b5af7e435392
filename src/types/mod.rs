//! Core types for telemetry data representation.
//!
//! ## Architecture
//!
//! - [`PrimitiveType`] is the catalog of SDK value kinds with their fixed encoded sizes
//! - [`Value`] holds one decoded value of any kind
//! - [`ScsValue`] provides typed extraction from a [`Value`]
//!
//! ## Usage Example
//!
//! ```rust
//! use truckconnect::types::{PrimitiveType, Value, FVector};
//!
//! assert_eq!(PrimitiveType::FVector.size(), 12);
//! assert_eq!(PrimitiveType::from_id(5).unwrap(), PrimitiveType::Float);
//!
//! let value = Value::FVector(FVector { x: 1.0, y: 2.0, z: 3.0 });
//! let vector: FVector = value.get().unwrap();
//! assert_eq!(vector.y, 2.0);
//! ```

mod primitive_type;
mod value;

pub use primitive_type::{Padding, PrimitiveType};
pub use value::{DPlacement, DVector, Euler, FPlacement, FVector, ScsValue, Value};
