//! Single value encoding

use bytes::BufMut;

use super::reader::ByteReader;
use crate::types::{DPlacement, DVector, Euler, FPlacement, FVector, PrimitiveType, Value};
use crate::{Result, TelemetryError};

/// Decode one value of type `ty` at `offset`.
///
/// Returns the value and the number of bytes consumed. For `DPlacement` the count
/// includes the 4 padding bytes; for `String` it includes the terminator.
pub fn decode_scalar(ty: PrimitiveType, data: &[u8], offset: usize) -> Result<(Value, usize)> {
    let mut reader = ByteReader::new(data, offset);
    let value = read_value(ty, &mut reader)?;
    Ok((value, reader.consumed()))
}

pub(crate) fn read_value(ty: PrimitiveType, reader: &mut ByteReader<'_>) -> Result<Value> {
    Ok(match ty {
        PrimitiveType::Invalid => return Err(TelemetryError::InvalidValueType { id: ty.id() }),
        PrimitiveType::Bool => Value::Bool(reader.read_flag()?),
        PrimitiveType::S32 => Value::S32(reader.read_i32()?),
        PrimitiveType::U32 => Value::U32(reader.read_u32()?),
        PrimitiveType::U64 => Value::U64(reader.read_u64()?),
        PrimitiveType::Float => Value::Float(reader.read_f32()?),
        PrimitiveType::Double => Value::Double(reader.read_f64()?),
        PrimitiveType::FVector => Value::FVector(read_fvector(reader)?),
        PrimitiveType::DVector => Value::DVector(read_dvector(reader)?),
        PrimitiveType::Euler => Value::Euler(read_euler(reader)?),
        PrimitiveType::FPlacement => Value::FPlacement(FPlacement {
            position: read_fvector(reader)?,
            orientation: read_euler(reader)?,
        }),
        PrimitiveType::DPlacement => {
            let placement =
                DPlacement { position: read_dvector(reader)?, orientation: read_euler(reader)? };
            reader.skip(DPLACEMENT_PADDING)?;
            Value::DPlacement(placement)
        }
        PrimitiveType::String => Value::String(reader.read_c_string()?),
        PrimitiveType::S64 => Value::S64(reader.read_i64()?),
    })
}

const DPLACEMENT_PADDING: usize = 4;

fn read_fvector(reader: &mut ByteReader<'_>) -> Result<FVector> {
    Ok(FVector { x: reader.read_f32()?, y: reader.read_f32()?, z: reader.read_f32()? })
}

fn read_dvector(reader: &mut ByteReader<'_>) -> Result<DVector> {
    Ok(DVector { x: reader.read_f64()?, y: reader.read_f64()?, z: reader.read_f64()? })
}

fn read_euler(reader: &mut ByteReader<'_>) -> Result<Euler> {
    Ok(Euler { heading: reader.read_f32()?, pitch: reader.read_f32()?, roll: reader.read_f32()? })
}

/// Encode one value. Exact inverse of [`decode_scalar`].
///
/// Fails for strings with interior NUL bytes, which could not be decoded back.
pub fn encode_scalar<B: BufMut>(value: &Value, out: &mut B) -> Result<()> {
    match value {
        Value::Bool(v) => out.put_u8(u8::from(*v)),
        Value::S32(v) => out.put_i32_le(*v),
        Value::U32(v) => out.put_u32_le(*v),
        Value::U64(v) => out.put_u64_le(*v),
        Value::Float(v) => out.put_f32_le(*v),
        Value::Double(v) => out.put_f64_le(*v),
        Value::FVector(v) => put_fvector(v, out),
        Value::DVector(v) => put_dvector(v, out),
        Value::Euler(v) => put_euler(v, out),
        Value::FPlacement(v) => {
            put_fvector(&v.position, out);
            put_euler(&v.orientation, out);
        }
        Value::DPlacement(v) => {
            put_dvector(&v.position, out);
            put_euler(&v.orientation, out);
            out.put_bytes(0, DPLACEMENT_PADDING);
        }
        Value::String(v) => {
            if v.as_bytes().contains(&0) {
                return Err(TelemetryError::type_conversion(
                    "strings with interior NUL bytes cannot be encoded",
                ));
            }
            out.put_slice(v.as_bytes());
            out.put_u8(0);
        }
        Value::S64(v) => out.put_i64_le(*v),
    }
    Ok(())
}

/// Encode `value` after checking it has type `ty`.
pub(crate) fn encode_typed<B: BufMut>(ty: PrimitiveType, value: &Value, out: &mut B) -> Result<()> {
    if value.primitive_type() != ty {
        return Err(TelemetryError::type_conversion(format!(
            "Expected {}, got {}",
            ty,
            value.primitive_type()
        )));
    }
    encode_scalar(value, out)
}

fn put_fvector<B: BufMut>(v: &FVector, out: &mut B) {
    out.put_f32_le(v.x);
    out.put_f32_le(v.y);
    out.put_f32_le(v.z);
}

fn put_dvector<B: BufMut>(v: &DVector, out: &mut B) {
    out.put_f64_le(v.x);
    out.put_f64_le(v.y);
    out.put_f64_le(v.z);
}

fn put_euler<B: BufMut>(v: &Euler, out: &mut B) {
    out.put_f32_le(v.heading);
    out.put_f32_le(v.pitch);
    out.put_f32_le(v.roll);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        encode_scalar(value, &mut out).unwrap();
        out
    }

    #[test]
    fn fixed_size_values_consume_their_catalog_size() {
        for ty in PrimitiveType::ALL.into_iter().filter(|ty| ty.is_constant_size()) {
            let value = Value::default_for(ty).unwrap();
            let bytes = encoded(&value);
            assert_eq!(bytes.len(), ty.byte_len(), "{ty}");
            let (decoded, read) = decode_scalar(ty, &bytes, 0).unwrap();
            assert_eq!(read, ty.byte_len());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn dplacement_skips_padding() {
        let value = Value::DPlacement(DPlacement {
            position: DVector { x: 1.5, y: -2.25, z: 1e9 },
            orientation: Euler { heading: 0.25, pitch: -0.125, roll: 0.5 },
        });
        let mut bytes = encoded(&value);
        assert_eq!(&bytes[36..40], &[0, 0, 0, 0]);
        // padding content is ignored
        bytes[36..40].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let (decoded, read) = decode_scalar(PrimitiveType::DPlacement, &bytes, 0).unwrap();
        assert_eq!(read, 40);
        assert_eq!(decoded, value);
    }

    #[test]
    fn fplacement_chains_vector_then_euler() {
        let mut bytes = Vec::new();
        for f in [1.0f32, 2.0, 3.0, 0.1, 0.2, 0.3] {
            bytes.extend_from_slice(&f.to_le_bytes());
        }
        let (decoded, read) = decode_scalar(PrimitiveType::FPlacement, &bytes, 0).unwrap();
        assert_eq!(read, 24);
        let placement: FPlacement = decoded.get().unwrap();
        assert_eq!(placement.position, FVector { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(placement.orientation.roll, 0.3);
    }

    #[test]
    fn empty_string_consumes_terminator() {
        let (value, read) = decode_scalar(PrimitiveType::String, &[0x00], 0).unwrap();
        assert_eq!(value, Value::String(String::new()));
        assert_eq!(read, 1);
    }

    #[test]
    fn unterminated_string_fails() {
        let err = decode_scalar(PrimitiveType::String, b"abc", 0).unwrap_err();
        assert!(matches!(err, TelemetryError::Deserialization { .. }));
    }

    #[test]
    fn string_at_offset() {
        let (value, read) = decode_scalar(PrimitiveType::String, b"xxcargo\0", 2).unwrap();
        assert_eq!(value, Value::String("cargo".to_string()));
        assert_eq!(read, 6);
    }

    #[test]
    fn bool_accepts_any_non_zero_byte() {
        let (value, _) = decode_scalar(PrimitiveType::Bool, &[0x7F], 0).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn truncated_buffer_is_deserialization_failure() {
        let bytes = 12.5f32.to_le_bytes();
        let err = decode_scalar(PrimitiveType::Float, &bytes[..3], 0).unwrap_err();
        assert_eq!(
            err.communication_result(),
            Some(crate::CommunicationResult::DeserializationFailure)
        );
        assert!(decode_scalar(PrimitiveType::Double, &[0u8; 8], 1).is_err());
    }

    #[test]
    fn invalid_type_is_rejected() {
        let err = decode_scalar(PrimitiveType::Invalid, &[0u8; 8], 0).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidValueType { id: 0 }));
    }

    #[test]
    fn extremes_survive_encoding() {
        for value in [
            Value::S32(i32::MIN),
            Value::U32(u32::MAX),
            Value::U64(u64::MAX),
            Value::S64(i64::MIN),
            Value::Double(f64::MAX),
            Value::String("Köln → Berlin".to_string()),
        ] {
            let bytes = encoded(&value);
            let (decoded, read) = decode_scalar(value.primitive_type(), &bytes, 0).unwrap();
            assert_eq!(read, bytes.len());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn interior_nul_cannot_be_encoded() {
        let mut out = Vec::new();
        assert!(encode_scalar(&Value::String("a\0b".to_string()), &mut out).is_err());
    }

    #[test]
    fn typed_encoding_checks_type() {
        let mut out = Vec::new();
        assert!(encode_typed(PrimitiveType::U32, &Value::S32(1), &mut out).is_err());
        assert!(out.is_empty());
    }
}
