//! # Typed Messages
//!
//! [`TypedMessage`] is the output of the assembler: a tree of fields whose leaves already carry
//! their final protobuf representation. Right before the request is sent it is turned into a
//! `prost_reflect::DynamicMessage` bound to the method's input descriptor.
use crate::schema::FieldSchema;
use prost_reflect::{DynamicMessage, MessageDescriptor, SetFieldError, Value};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Field '{field}' (number {number}) does not exist in message '{message}'")]
    UnknownField {
        message: String,
        field: String,
        number: u32,
    },
    #[error("Field '{field}' is not a message field in '{message}'")]
    NotAMessage { message: String, field: String },
    #[error("Failed to set field '{field}': '{source}'")]
    SetField {
        field: String,
        #[source]
        source: SetFieldError,
    },
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    F64(f64),
    F32(f32),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    EnumNumber(i32),
    Message(TypedMessage),
    List(Vec<TypedValue>),
}

/// Identity of a populated field inside a [`TypedMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub number: u32,
    /// Full name of the oneof group the field belongs to, if any.
    pub oneof: Option<String>,
}

impl From<&FieldSchema> for FieldRef {
    fn from(field: &FieldSchema) -> Self {
        FieldRef {
            name: field.name.clone(),
            number: field.number,
            oneof: field.oneof.as_ref().map(|o| o.full_name.clone()),
        }
    }
}

/// An assembled message. Fields are kept in the order they were set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedMessage {
    full_name: String,
    fields: Vec<(FieldRef, TypedValue)>,
}

impl TypedMessage {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Sets a field, replacing any previous value.
    ///
    /// Setting a member of a oneof clears every other member of the same group.
    pub fn set(&mut self, field: FieldRef, value: TypedValue) {
        self.fields.retain(|(existing, _)| {
            existing.number != field.number
                && (field.oneof.is_none() || existing.oneof != field.oneof)
        });
        self.fields.push((field, value));
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.name == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldRef, &TypedValue)> {
        self.fields.iter().map(|(field, value)| (field, value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a `DynamicMessage` for `descriptor`, matching fields by number.
    pub fn into_dynamic(self, descriptor: MessageDescriptor) -> Result<DynamicMessage, EncodeError> {
        let mut message = DynamicMessage::new(descriptor.clone());

        for (field, value) in self.fields {
            let field_desc = descriptor.get_field(field.number).ok_or_else(|| {
                EncodeError::UnknownField {
                    message: descriptor.full_name().to_string(),
                    field: field.name.clone(),
                    number: field.number,
                }
            })?;

            let value = into_value(value, &field_desc, &descriptor)?;

            message
                .try_set_field(&field_desc, value)
                .map_err(|source| EncodeError::SetField {
                    field: field.name,
                    source,
                })?;
        }

        Ok(message)
    }
}

fn into_value(
    value: TypedValue,
    field: &prost_reflect::FieldDescriptor,
    parent: &MessageDescriptor,
) -> Result<Value, EncodeError> {
    let value = match value {
        TypedValue::F64(v) => Value::F64(v),
        TypedValue::F32(v) => Value::F32(v),
        TypedValue::I32(v) => Value::I32(v),
        TypedValue::I64(v) => Value::I64(v),
        TypedValue::U32(v) => Value::U32(v),
        TypedValue::U64(v) => Value::U64(v),
        TypedValue::Bool(v) => Value::Bool(v),
        TypedValue::String(v) => Value::String(v),
        TypedValue::Bytes(v) => Value::Bytes(v.into()),
        TypedValue::EnumNumber(v) => Value::EnumNumber(v),
        TypedValue::Message(nested) => {
            let descriptor =
                field
                    .kind()
                    .as_message()
                    .cloned()
                    .ok_or_else(|| EncodeError::NotAMessage {
                        message: parent.full_name().to_string(),
                        field: field.name().to_string(),
                    })?;
            Value::Message(nested.into_dynamic(descriptor)?)
        }
        TypedValue::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| into_value(item, field, parent))
                .collect::<Result<_, _>>()?,
        ),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_ref(name: &str, number: u32, oneof: Option<&str>) -> FieldRef {
        FieldRef {
            name: name.to_string(),
            number,
            oneof: oneof.map(str::to_string),
        }
    }

    #[test]
    fn setting_a_field_twice_keeps_the_last_value() {
        let mut message = TypedMessage::new("pkg.Request");

        message.set(field_ref("name", 1, None), TypedValue::String("a".into()));
        message.set(field_ref("name", 1, None), TypedValue::String("b".into()));

        assert_eq!(message.fields().count(), 1);
        assert_eq!(message.get("name"), Some(&TypedValue::String("b".into())));
    }

    #[test]
    fn setting_a_oneof_member_clears_its_siblings() {
        let mut message = TypedMessage::new("pkg.Request");

        message.set(field_ref("name", 1, None), TypedValue::String("a".into()));
        message.set(field_ref("text", 2, Some("pkg.Request.value")), TypedValue::String("t".into()));
        message.set(field_ref("number", 3, Some("pkg.Request.value")), TypedValue::I64(4));

        assert_eq!(message.get("text"), None);
        assert_eq!(message.get("number"), Some(&TypedValue::I64(4)));
        assert_eq!(message.get("name"), Some(&TypedValue::String("a".into())));
    }
}
