//! Conversion from `prost-reflect` descriptors into [`MessageSchema`]s.
use super::{EnumSchema, EnumValue, FieldKind, FieldSchema, MessageSchema, OneofSchema};
use prost_reflect::{EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

impl From<&MessageDescriptor> for MessageSchema {
    fn from(descriptor: &MessageDescriptor) -> Self {
        convert_message(descriptor, &mut Vec::new())
    }
}

impl From<&EnumDescriptor> for EnumSchema {
    fn from(descriptor: &EnumDescriptor) -> Self {
        EnumSchema {
            full_name: descriptor.full_name().to_string(),
            name: descriptor.name().to_string(),
            values: descriptor
                .values()
                .map(|v| EnumValue {
                    name: v.name().to_string(),
                    number: v.number(),
                })
                .collect(),
        }
    }
}

impl From<&OneofDescriptor> for OneofSchema {
    fn from(descriptor: &OneofDescriptor) -> Self {
        OneofSchema {
            full_name: descriptor.full_name().to_string(),
            name: descriptor.name().to_string(),
            choices: descriptor.fields().map(|f| f.name().to_string()).collect(),
        }
    }
}

/// `ancestors` holds the full names of the messages currently being converted, so a type that
/// contains itself is cut at its first repetition.
fn convert_message(descriptor: &MessageDescriptor, ancestors: &mut Vec<String>) -> MessageSchema {
    ancestors.push(descriptor.full_name().to_string());

    // proto3 `optional` fields live in synthetic oneofs, they behave like plain fields here.
    let oneofs: HashMap<String, Arc<OneofSchema>> = descriptor
        .oneofs()
        .filter(|o| !o.is_synthetic())
        .map(|o| (o.full_name().to_string(), Arc::new(OneofSchema::from(&o))))
        .collect();

    let fields = descriptor
        .fields()
        .map(|f| convert_field(&f, &oneofs, ancestors))
        .collect();

    ancestors.pop();

    MessageSchema::new(descriptor.full_name(), fields)
}

fn convert_field(
    field: &FieldDescriptor,
    oneofs: &HashMap<String, Arc<OneofSchema>>,
    ancestors: &mut Vec<String>,
) -> FieldSchema {
    let kind = if field.is_map() {
        FieldKind::Unsupported("map".to_string())
    } else if field.is_group() {
        FieldKind::Unsupported("group".to_string())
    } else {
        match field.kind() {
            Kind::Double => FieldKind::Double,
            Kind::Float => FieldKind::Float,
            Kind::Int32 => FieldKind::Int32,
            Kind::Int64 => FieldKind::Int64,
            Kind::Uint32 => FieldKind::Uint32,
            Kind::Uint64 => FieldKind::Uint64,
            Kind::Sint32 => FieldKind::Sint32,
            Kind::Sint64 => FieldKind::Sint64,
            Kind::Fixed32 => FieldKind::Fixed32,
            Kind::Fixed64 => FieldKind::Fixed64,
            Kind::Sfixed32 => FieldKind::Sfixed32,
            Kind::Sfixed64 => FieldKind::Sfixed64,
            Kind::Bool => FieldKind::Bool,
            Kind::String => FieldKind::String,
            Kind::Bytes => FieldKind::Bytes,
            Kind::Enum(e) => FieldKind::Enum(Arc::new(EnumSchema::from(&e))),
            Kind::Message(m) if ancestors.iter().any(|a| a == m.full_name()) => {
                FieldKind::Recursive(m.full_name().to_string())
            }
            Kind::Message(m) => FieldKind::Message(Arc::new(convert_message(&m, ancestors))),
        }
    };

    let oneof = field
        .containing_oneof()
        .and_then(|o| oneofs.get(o.full_name()).cloned());

    FieldSchema {
        name: field.name().to_string(),
        number: field.number(),
        kind,
        repeated: field.is_list(),
        oneof,
    }
}
