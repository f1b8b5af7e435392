//! Runtime telemetry values and typed extraction

use serde::{Deserialize, Serialize};

use super::PrimitiveType;
use crate::{Result, TelemetryError};

/// Vector of three 32-bit floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Vector of three 64-bit floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation in SDK units (fractions of a full turn).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Euler {
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FPlacement {
    pub position: FVector,
    pub orientation: Euler,
}

/// Double precision placement. Encoded with 4 trailing padding bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DPlacement {
    pub position: DVector,
    pub orientation: Euler,
}

/// Runtime value type that can hold any telemetry data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Value {
    Bool(bool),
    S32(i32),
    U32(u32),
    U64(u64),
    Float(f32),
    Double(f64),
    FVector(FVector),
    DVector(DVector),
    Euler(Euler),
    FPlacement(FPlacement),
    DPlacement(DPlacement),
    String(String),
    S64(i64),
}

impl Value {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Value::Bool(_) => PrimitiveType::Bool,
            Value::S32(_) => PrimitiveType::S32,
            Value::U32(_) => PrimitiveType::U32,
            Value::U64(_) => PrimitiveType::U64,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            Value::FVector(_) => PrimitiveType::FVector,
            Value::DVector(_) => PrimitiveType::DVector,
            Value::Euler(_) => PrimitiveType::Euler,
            Value::FPlacement(_) => PrimitiveType::FPlacement,
            Value::DPlacement(_) => PrimitiveType::DPlacement,
            Value::String(_) => PrimitiveType::String,
            Value::S64(_) => PrimitiveType::S64,
        }
    }

    /// Zero value of the given type, as stored by an uninitialized slot.
    pub fn default_for(ty: PrimitiveType) -> Result<Self> {
        Ok(match ty {
            PrimitiveType::Invalid => {
                return Err(TelemetryError::InvalidValueType { id: ty.id() });
            }
            PrimitiveType::Bool => Value::Bool(false),
            PrimitiveType::S32 => Value::S32(0),
            PrimitiveType::U32 => Value::U32(0),
            PrimitiveType::U64 => Value::U64(0),
            PrimitiveType::Float => Value::Float(0.0),
            PrimitiveType::Double => Value::Double(0.0),
            PrimitiveType::FVector => Value::FVector(FVector::default()),
            PrimitiveType::DVector => Value::DVector(DVector::default()),
            PrimitiveType::Euler => Value::Euler(Euler::default()),
            PrimitiveType::FPlacement => Value::FPlacement(FPlacement::default()),
            PrimitiveType::DPlacement => Value::DPlacement(DPlacement::default()),
            PrimitiveType::String => Value::String(String::new()),
            PrimitiveType::S64 => Value::S64(0),
        })
    }

    /// Extract a typed value.
    pub fn get<T: ScsValue>(&self) -> Result<T> {
        T::from_value(self)
    }
}

/// Trait for Rust types that can be read out of a decoded [`Value`].
pub trait ScsValue: Sized {
    /// The primitive type this Rust type maps to.
    const TYPE: PrimitiveType;

    fn from_value(value: &Value) -> Result<Self>;

    fn into_value(self) -> Value;
}

fn mismatch<T>(expected: PrimitiveType, value: &Value) -> Result<T> {
    Err(TelemetryError::type_conversion(format!(
        "Expected {}, got {}",
        expected,
        value.primitive_type()
    )))
}

macro_rules! impl_scs_value {
    ($rust:ty, $variant:ident) => {
        impl ScsValue for $rust {
            const TYPE: PrimitiveType = PrimitiveType::$variant;

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner.clone()),
                    other => mismatch(Self::TYPE, other),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_scs_value!(bool, Bool);
impl_scs_value!(i32, S32);
impl_scs_value!(u32, U32);
impl_scs_value!(u64, U64);
impl_scs_value!(f32, Float);
impl_scs_value!(f64, Double);
impl_scs_value!(FVector, FVector);
impl_scs_value!(DVector, DVector);
impl_scs_value!(Euler, Euler);
impl_scs_value!(FPlacement, FPlacement);
impl_scs_value!(DPlacement, DPlacement);
impl_scs_value!(String, String);
impl_scs_value!(i64, S64);
