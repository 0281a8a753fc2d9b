//! # Type Coercion Table
//!
//! Turns the raw text typed by the user into a [`TypedValue`] according to the declared kind of
//! the field.
//!
//! Two conversions are kept as they have always behaved, even if they look surprising:
//!
//! * `sfixed32` is parsed as an unsigned 64-bit integer and then wrapped into an `i32`.
//! * `sfixed64` is parsed as an unsigned 64-bit integer and reinterpreted as an `i64`.
//!
//! Negative input is therefore rejected for both.
use crate::message::TypedValue;
use crate::schema::{FieldKind, FieldSchema};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("Unsupported kind '{kind}' for field '{field}'")]
    UnsupportedKind { field: String, kind: String },
    #[error("Invalid {kind} value '{input}' for field '{field}': {reason}")]
    Parse {
        field: String,
        kind: String,
        input: String,
        reason: String,
    },
    #[error("Field '{field}' is a message and cannot be read from text")]
    MessageField { field: String },
}

/// Coerces `raw` into the typed representation of `field`'s declared kind.
pub fn coerce(field: &FieldSchema, raw: &str) -> Result<TypedValue, CoercionError> {
    let parse_error = |reason: String| CoercionError::Parse {
        field: field.name.clone(),
        kind: field.kind.name().to_string(),
        input: raw.to_string(),
        reason,
    };

    match &field.kind {
        FieldKind::Double => parse::<f64>(raw).map(TypedValue::F64),
        // Parsed wide first, then narrowed.
        FieldKind::Float => parse::<f64>(raw).map(|v| TypedValue::F32(v as f32)),
        FieldKind::Int32 | FieldKind::Sint32 => parse::<i32>(raw).map(TypedValue::I32),
        FieldKind::Int64 | FieldKind::Sint64 => parse::<i64>(raw).map(TypedValue::I64),
        FieldKind::Uint32 | FieldKind::Fixed32 => parse::<u32>(raw).map(TypedValue::U32),
        FieldKind::Uint64 | FieldKind::Fixed64 => parse::<u64>(raw).map(TypedValue::U64),
        FieldKind::Sfixed32 => parse::<u64>(raw).map(|v| TypedValue::I32(v as i32)),
        FieldKind::Sfixed64 => parse::<u64>(raw).map(|v| TypedValue::I64(v as i64)),
        FieldKind::Bool => parse_bool(raw).map(TypedValue::Bool),
        FieldKind::String => Ok(TypedValue::String(raw.to_string())),
        FieldKind::Bytes => Ok(TypedValue::Bytes(raw.as_bytes().to_vec())),
        FieldKind::Enum(enumeration) => enumeration
            .value(raw)
            .map(|v| TypedValue::EnumNumber(v.number))
            .ok_or_else(|| format!("not a value of enum '{}'", enumeration.full_name)),
        FieldKind::Message(_) | FieldKind::Recursive(_) => {
            return Err(CoercionError::MessageField {
                field: field.name.clone(),
            });
        }
        FieldKind::Unsupported(kind) => {
            return Err(CoercionError::UnsupportedKind {
                field: field.name.clone(),
                kind: kind.clone(),
            });
        }
    }
    .map_err(parse_error)
}

fn parse<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| e.to_string())
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}
