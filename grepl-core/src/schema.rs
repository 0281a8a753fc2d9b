//! # Message Schemas
//!
//! A self-contained description of a request message: its fields in declaration order, the kind
//! of each field, the oneof group it belongs to and, for enum fields, the named values.
//!
//! The walker and the assembler only work on these types. They are built once per call from the
//! `prost-reflect` descriptors (see [`reflect`]) so that the interactive part of the engine is a
//! plain structural recursion over a closed set of kinds.
use std::fmt;
use std::sync::Arc;

pub mod reflect;

/// An ordered list of fields describing one message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Fully qualified name (e.g. `my.package.MyMessage`).
    pub full_name: String,
    pub fields: Vec<FieldSchema>,
}

impl MessageSchema {
    pub fn new(full_name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            full_name: full_name.into(),
            fields,
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the first field, in depth-first declaration order, whose kind cannot be collected.
    ///
    /// Oneof candidates are included whether or not they would be chosen.
    pub fn find_unsupported(&self) -> Option<UnsupportedField> {
        for field in &self.fields {
            match &field.kind {
                FieldKind::Unsupported(kind) => {
                    return Some(UnsupportedField {
                        path: field.name.clone(),
                        kind: kind.clone(),
                    });
                }
                FieldKind::Message(nested) => {
                    if let Some(inner) = nested.find_unsupported() {
                        return Some(UnsupportedField {
                            path: format!("{}.{}", field.name, inner.path),
                            kind: inner.kind,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// A field whose declared kind is not supported, as reported by [`MessageSchema::find_unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedField {
    /// Dot separated path from the root message (e.g. `meta.labels`).
    pub path: String,
    pub kind: String,
}

/// Describes one field of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
    /// `repeated` fields are collected as a single element.
    pub repeated: bool,
    /// The (non synthetic) oneof group this field belongs to.
    pub oneof: Option<Arc<OneofSchema>>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
            repeated: false,
            oneof: None,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn in_oneof(mut self, oneof: Arc<OneofSchema>) -> Self {
        self.oneof = Some(oneof);
        self
    }
}

/// A set of fields of which at most one can be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofSchema {
    /// Fully qualified name (e.g. `my.package.MyMessage.payload`).
    pub full_name: String,
    pub name: String,
    /// Names of the candidate fields, in declaration order.
    pub choices: Vec<String>,
}

/// A named enumeration and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub full_name: String,
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumSchema {
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// The declared kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Bool,
    String,
    Bytes,
    Message(Arc<MessageSchema>),
    Enum(Arc<EnumSchema>),
    /// A message field whose type is already one of its ancestors. It is left unset.
    Recursive(String),
    /// Any kind the engine does not know how to collect (maps, groups, ...).
    Unsupported(String),
}

impl FieldKind {
    /// The protobuf spelling of the kind (e.g. `int32`), used in prompt labels and errors.
    pub fn name(&self) -> &str {
        match self {
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Sfixed32 => "sfixed32",
            FieldKind::Sfixed64 => "sfixed64",
            FieldKind::Sint32 => "sint32",
            FieldKind::Sint64 => "sint64",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Message(_) | FieldKind::Recursive(_) => "message",
            FieldKind::Enum(_) => "enum",
            FieldKind::Unsupported(kind) => kind,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_unsupported_reports_nested_path() {
        let meta = MessageSchema::new(
            "pkg.Meta",
            vec![
                FieldSchema::new("count", 1, FieldKind::Int32),
                FieldSchema::new("labels", 2, FieldKind::Unsupported("map".to_string())),
            ],
        );
        let request = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("name", 1, FieldKind::String),
                FieldSchema::new("meta", 2, FieldKind::Message(Arc::new(meta))),
            ],
        );

        assert_eq!(
            request.find_unsupported(),
            Some(UnsupportedField {
                path: "meta.labels".to_string(),
                kind: "map".to_string()
            })
        );
    }

    #[test]
    fn supported_schema_has_no_unsupported_field() {
        let request = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("name", 1, FieldKind::String),
                FieldSchema::new("tree", 2, FieldKind::Recursive("pkg.Request".to_string())),
            ],
        );

        assert_eq!(request.find_unsupported(), None);
    }
}
