//! Storage wrappers around single values
//!
//! Four repetition strategies exist on the wire:
//! - plain storage: `[initialized: u8][value]`
//! - fixed array storage: `[initialized: u8][count: u32][capacity × value]`
//! - dynamic vector: `[len: u32][len × value]`
//! - bit-packed bool vector: `[len: u32][ceil(len / 8) bytes]`, element `i` at bit `i % 8`

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::reader::ByteReader;
use super::scalar::{encode_typed, read_value};
use crate::types::{PrimitiveType, ScsValue, Value};
use crate::{Result, TelemetryError};

/// Size of the initialized flag preceding every stored value.
pub const INITIALIZED_FLAG_SIZE: usize = 1;

/// Size of the live-count field of array storage and the length prefix of vectors.
pub const COUNT_FIELD_SIZE: usize = 4;

/// A single value plus its initialized flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PlainStorage {
    pub initialized: bool,
    pub value: Value,
}

impl PlainStorage {
    pub fn new(value: Value) -> Self {
        Self { initialized: true, value }
    }

    /// An unset slot of type `ty`, holding its zero value.
    pub fn uninitialized(ty: PrimitiveType) -> Result<Self> {
        Ok(Self { initialized: false, value: Value::default_for(ty)? })
    }

    /// Typed value, or `None` when the simulation never populated the slot.
    pub fn get<T: ScsValue>(&self) -> Result<Option<T>> {
        if !self.initialized {
            return Ok(None);
        }
        self.value.get().map(Some)
    }
}

/// Fixed-capacity array with a live count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ArrayStorage {
    pub initialized: bool,
    /// Every physical slot, `capacity` long.
    pub values: Vec<Value>,
    pub count: u32,
}

impl ArrayStorage {
    /// The first `count` values.
    pub fn live(&self) -> &[Value] {
        let count = usize::try_from(self.count).unwrap_or(usize::MAX);
        &self.values[..count.min(self.values.len())]
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }
}

/// Storage of a channel, plain or indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ChannelStorage {
    Plain(PlainStorage),
    Array(ArrayStorage),
}

impl ChannelStorage {
    pub fn initialized(&self) -> bool {
        match self {
            ChannelStorage::Plain(plain) => plain.initialized,
            ChannelStorage::Array(array) => array.initialized,
        }
    }

    pub fn as_plain(&self) -> Option<&PlainStorage> {
        match self {
            ChannelStorage::Plain(plain) => Some(plain),
            ChannelStorage::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayStorage> {
        match self {
            ChannelStorage::Plain(_) => None,
            ChannelStorage::Array(array) => Some(array),
        }
    }
}

pub const fn plain_storage_size(ty: PrimitiveType) -> usize {
    ty.byte_len() + INITIALIZED_FLAG_SIZE
}

pub const fn array_storage_size(ty: PrimitiveType, capacity: u32) -> usize {
    ty.byte_len() * capacity as usize + INITIALIZED_FLAG_SIZE + COUNT_FIELD_SIZE
}

/// Encoded size of a channel slot; plain when not indexed.
pub const fn channel_storage_size(ty: PrimitiveType, indexed: bool, capacity: u32) -> usize {
    if indexed { array_storage_size(ty, capacity) } else { plain_storage_size(ty) }
}

pub fn decode_plain_storage(
    ty: PrimitiveType,
    data: &[u8],
    offset: usize,
) -> Result<(PlainStorage, usize)> {
    let mut reader = ByteReader::new(data, offset);
    let storage = read_plain_storage(ty, &mut reader)?;
    Ok((storage, reader.consumed()))
}

pub(crate) fn read_plain_storage(
    ty: PrimitiveType,
    reader: &mut ByteReader<'_>,
) -> Result<PlainStorage> {
    let initialized = reader.read_flag()?;
    let value = read_value(ty, reader)?;
    Ok(PlainStorage { initialized, value })
}

pub fn encode_plain_storage<B: BufMut>(
    ty: PrimitiveType,
    storage: &PlainStorage,
    out: &mut B,
) -> Result<()> {
    out.put_u8(u8::from(storage.initialized));
    encode_typed(ty, &storage.value, out)
}

/// Decode array storage with `capacity` physical slots.
///
/// A live count above the capacity is malformed.
pub fn decode_fixed_array_storage(
    ty: PrimitiveType,
    capacity: u32,
    data: &[u8],
    offset: usize,
) -> Result<(ArrayStorage, usize)> {
    let mut reader = ByteReader::new(data, offset);
    let storage = read_fixed_array_storage(ty, capacity, &mut reader)?;
    Ok((storage, reader.consumed()))
}

pub(crate) fn read_fixed_array_storage(
    ty: PrimitiveType,
    capacity: u32,
    reader: &mut ByteReader<'_>,
) -> Result<ArrayStorage> {
    let initialized = reader.read_flag()?;
    let count_offset = reader.position();
    let count = reader.read_u32()?;
    if count > capacity {
        return Err(TelemetryError::deserialization(
            count_offset,
            format!("array count {} exceeds capacity {}", count, capacity),
        ));
    }
    let values = (0..capacity).map(|_| read_value(ty, reader)).collect::<Result<Vec<_>>>()?;
    Ok(ArrayStorage { initialized, values, count })
}

/// Encode array storage. `values` must hold exactly `capacity` elements of type `ty`.
pub fn encode_fixed_array_storage<B: BufMut>(
    ty: PrimitiveType,
    capacity: u32,
    storage: &ArrayStorage,
    out: &mut B,
) -> Result<()> {
    if storage.values.len() != capacity as usize {
        return Err(TelemetryError::type_conversion(format!(
            "array storage holds {} values, capacity is {}",
            storage.values.len(),
            capacity
        )));
    }
    if storage.count > capacity {
        return Err(TelemetryError::type_conversion(format!(
            "array count {} exceeds capacity {}",
            storage.count, capacity
        )));
    }
    out.put_u8(u8::from(storage.initialized));
    out.put_u32_le(storage.count);
    for value in &storage.values {
        encode_typed(ty, value, out)?;
    }
    Ok(())
}

/// Decode a length-prefixed vector. Booleans are bit-packed.
pub fn decode_dynamic_vector(
    ty: PrimitiveType,
    data: &[u8],
    offset: usize,
) -> Result<(Vec<Value>, usize)> {
    let mut reader = ByteReader::new(data, offset);
    let values = read_dynamic_vector(ty, &mut reader)?;
    Ok((values, reader.consumed()))
}

pub(crate) fn read_dynamic_vector(
    ty: PrimitiveType,
    reader: &mut ByteReader<'_>,
) -> Result<Vec<Value>> {
    let len = reader.read_u32()? as usize;
    if ty == PrimitiveType::Bool {
        let packed = reader.take(len.div_ceil(8))?;
        return Ok(unpack_bools(packed, len).into_iter().map(Value::Bool).collect());
    }
    // every element takes at least one byte, so a larger length cannot be satisfied
    if len > reader.remaining() {
        return Err(TelemetryError::out_of_bounds(
            reader.position(),
            len.saturating_mul(ty.byte_len().max(1)),
            reader.remaining(),
        ));
    }
    (0..len).map(|_| read_value(ty, reader)).collect()
}

pub fn encode_dynamic_vector<B: BufMut>(
    ty: PrimitiveType,
    values: &[Value],
    out: &mut B,
) -> Result<()> {
    let len = u32::try_from(values.len()).map_err(|_| {
        TelemetryError::type_conversion(format!("vector of {} values is too long", values.len()))
    })?;
    out.put_u32_le(len);
    if ty == PrimitiveType::Bool {
        let bools = values.iter().map(bool::from_value).collect::<Result<Vec<_>>>()?;
        out.put_slice(&pack_bools(&bools));
        return Ok(());
    }
    for value in values {
        encode_typed(ty, value, out)?;
    }
    Ok(())
}

/// Pack booleans eight to a byte, element `i` at bit `i % 8` of byte `i / 8`.
pub fn pack_bools(values: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; values.len().div_ceil(8)];
    for (i, _) in values.iter().enumerate().filter(|(_, set)| **set) {
        packed[i / 8] |= 1 << (i % 8);
    }
    packed
}

/// Inverse of [`pack_bools`] for the first `len` bits of `packed`.
pub fn unpack_bools(packed: &[u8], len: usize) -> Vec<bool> {
    (0..len).map(|i| packed.get(i / 8).is_some_and(|byte| byte & (1 << (i % 8)) != 0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FVector;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bool_vectors_survive_packing(values in prop::collection::vec(any::<bool>(), 0..70)) {
                let wrapped: Vec<Value> = values.iter().copied().map(Value::Bool).collect();
                let mut out = Vec::new();
                encode_dynamic_vector(PrimitiveType::Bool, &wrapped, &mut out).unwrap();
                prop_assert_eq!(out.len(), 4 + values.len().div_ceil(8));

                let (decoded, read) = decode_dynamic_vector(PrimitiveType::Bool, &out, 0).unwrap();
                prop_assert_eq!(read, out.len());
                prop_assert_eq!(decoded, wrapped);
            }

            #[test]
            fn array_count_is_bounded_by_capacity(capacity in 0u32..8, count in 0u32..16) {
                let mut bytes = vec![1u8];
                bytes.extend_from_slice(&count.to_le_bytes());
                bytes.extend(std::iter::repeat_n(0u8, capacity as usize * 4));
                let result = decode_fixed_array_storage(PrimitiveType::U32, capacity, &bytes, 0);
                if count <= capacity {
                    let (storage, read) = result.unwrap();
                    prop_assert_eq!(read, array_storage_size(PrimitiveType::U32, capacity));
                    prop_assert_eq!(storage.live().len(), count as usize);
                } else {
                    prop_assert!(result.is_err());
                }
            }
        }
    }

    #[test]
    fn plain_storage_reads_flag_then_value() {
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&12.5f32.to_le_bytes());
        let (storage, read) = decode_plain_storage(PrimitiveType::Float, &bytes, 0).unwrap();
        assert_eq!(read, plain_storage_size(PrimitiveType::Float));
        assert!(storage.initialized);
        assert_eq!(storage.get::<f32>().unwrap(), Some(12.5));
    }

    #[test]
    fn uninitialized_plain_storage_hides_value() {
        let storage = PlainStorage::uninitialized(PrimitiveType::U32).unwrap();
        assert_eq!(storage.get::<u32>().unwrap(), None);

        let mut out = Vec::new();
        encode_plain_storage(PrimitiveType::U32, &storage, &mut out).unwrap();
        assert_eq!(out, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn fixed_array_skips_unused_slots() {
        let mut bytes = vec![0x01, 0x02, 0, 0, 0];
        for v in [7u32, 9, 0xAAAA, 0xBBBB] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.push(0xFF);
        let (storage, read) = decode_fixed_array_storage(PrimitiveType::U32, 4, &bytes, 0).unwrap();
        assert_eq!(read, 21);
        assert_eq!(storage.count, 2);
        assert_eq!(storage.capacity(), 4);
        assert_eq!(storage.live(), &[Value::U32(7), Value::U32(9)]);
    }

    #[test]
    fn fixed_array_round_trip_with_strings() {
        let storage = ArrayStorage {
            initialized: true,
            values: vec![
                Value::String("left".into()),
                Value::String(String::new()),
                Value::String("right".into()),
            ],
            count: 2,
        };
        let mut out = Vec::new();
        encode_fixed_array_storage(PrimitiveType::String, 3, &storage, &mut out).unwrap();
        let (decoded, read) =
            decode_fixed_array_storage(PrimitiveType::String, 3, &out, 0).unwrap();
        assert_eq!(read, out.len());
        assert_eq!(decoded, storage);
    }

    #[test]
    fn fixed_array_encoding_requires_full_capacity() {
        let storage =
            ArrayStorage { initialized: true, values: vec![Value::U32(1)], count: 1 };
        let mut out = Vec::new();
        assert!(encode_fixed_array_storage(PrimitiveType::U32, 4, &storage, &mut out).is_err());
    }

    #[test]
    fn empty_vectors_consume_only_length() {
        for ty in [PrimitiveType::Bool, PrimitiveType::FVector, PrimitiveType::String] {
            let (values, read) = decode_dynamic_vector(ty, &[0, 0, 0, 0], 0).unwrap();
            assert!(values.is_empty());
            assert_eq!(read, 4);
        }
    }

    #[test]
    fn bool_bits_are_little_endian_within_bytes() {
        let values = [true, false, false, false, false, false, false, false, false, true];
        assert_eq!(pack_bools(&values), vec![0b0000_0001, 0b0000_0010]);
        assert_eq!(unpack_bools(&[0b0000_0001, 0b0000_0010], 10), values.to_vec());
    }

    #[test]
    fn bool_vector_missing_bytes_fails() {
        // 9 bools need 2 packed bytes
        let bytes = [9, 0, 0, 0, 0xFF];
        assert!(decode_dynamic_vector(PrimitiveType::Bool, &bytes, 0).is_err());
    }

    #[test]
    fn oversized_vector_length_fails_without_allocating() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        assert!(decode_dynamic_vector(PrimitiveType::U64, &bytes, 0).is_err());
    }

    #[test]
    fn vector_of_vectors() {
        let values = vec![
            Value::FVector(FVector { x: 1.0, y: 0.0, z: -1.0 }),
            Value::FVector(FVector { x: 0.5, y: 0.5, z: 0.5 }),
        ];
        let mut out = Vec::new();
        encode_dynamic_vector(PrimitiveType::FVector, &values, &mut out).unwrap();
        assert_eq!(out.len(), 4 + 24);
        let (decoded, _) = decode_dynamic_vector(PrimitiveType::FVector, &out, 0).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn storage_sizes() {
        assert_eq!(plain_storage_size(PrimitiveType::Float), 5);
        assert_eq!(array_storage_size(PrimitiveType::U32, 4), 21);
        assert_eq!(channel_storage_size(PrimitiveType::DPlacement, false, 1), 41);
        assert_eq!(channel_storage_size(PrimitiveType::Bool, true, 19), 24);
    }
}
