//! Binary value codec.
//!
//! Decodes and encodes typed telemetry values at arbitrary buffer offsets. Every
//! decoder takes `(type, buffer, offset)` and returns the decoded item together with
//! the number of bytes consumed, so callers can chain reads through a frame. All
//! multi-byte values are little-endian.
//!
//! Decoding never panics on malformed input: reads past the end of the buffer and
//! unterminated strings fail with [`TelemetryError::Deserialization`](crate::TelemetryError),
//! and the invalid type tag fails with `InvalidValueType`.
//!
//! ## Usage
//!
//! ```rust
//! use truckconnect::codec::{decode_fixed_array_storage, encode_plain_storage, PlainStorage};
//! use truckconnect::types::{PrimitiveType, Value};
//!
//! let mut buffer = Vec::new();
//! encode_plain_storage(PrimitiveType::Float, &PlainStorage::new(Value::Float(12.5)), &mut buffer)?;
//! assert_eq!(buffer.len(), 5);
//!
//! let wheels = [1u8, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0];
//! let (storage, read) = decode_fixed_array_storage(PrimitiveType::U32, 2, &wheels, 0)?;
//! assert_eq!(read, wheels.len());
//! assert_eq!(storage.live(), &[Value::U32(3), Value::U32(4)]);
//! # Ok::<(), truckconnect::TelemetryError>(())
//! ```

pub(crate) mod reader;
mod scalar;
mod storage;

pub use scalar::{decode_scalar, encode_scalar};
pub use storage::{
    ArrayStorage, COUNT_FIELD_SIZE, ChannelStorage, INITIALIZED_FLAG_SIZE, PlainStorage,
    array_storage_size, channel_storage_size, decode_dynamic_vector, decode_fixed_array_storage,
    decode_plain_storage, encode_dynamic_vector, encode_fixed_array_storage, encode_plain_storage,
    pack_bools, plain_storage_size, unpack_bools,
};

pub(crate) use storage::{read_dynamic_vector, read_fixed_array_storage, read_plain_storage};

use crate::Result;
use crate::types::PrimitiveType;

/// Decode a channel slot: array storage when indexed, plain storage otherwise.
pub fn decode_channel_storage(
    ty: PrimitiveType,
    indexed: bool,
    capacity: u32,
    data: &[u8],
    offset: usize,
) -> Result<(ChannelStorage, usize)> {
    if indexed {
        let (array, read) = decode_fixed_array_storage(ty, capacity, data, offset)?;
        Ok((ChannelStorage::Array(array), read))
    } else {
        let (plain, read) = decode_plain_storage(ty, data, offset)?;
        Ok((ChannelStorage::Plain(plain), read))
    }
}

/// Encode a channel slot. Inverse of [`decode_channel_storage`].
pub fn encode_channel_storage<B: bytes::BufMut>(
    ty: PrimitiveType,
    capacity: u32,
    storage: &ChannelStorage,
    out: &mut B,
) -> Result<()> {
    match storage {
        ChannelStorage::Plain(plain) => encode_plain_storage(ty, plain, out),
        ChannelStorage::Array(array) => encode_fixed_array_storage(ty, capacity, array, out),
    }
}
