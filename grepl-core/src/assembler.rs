//! # Message Assembler
//!
//! Converts the [`CollectedField`] tree produced by the walker into a [`TypedMessage`].
//!
//! Every answer is coerced before anything is written: if one of them is malformed the target
//! message is left exactly as it was.
use crate::coerce::{CoercionError, coerce};
use crate::message::{FieldRef, TypedMessage, TypedValue};
use crate::schema::{FieldKind, MessageSchema};
use crate::walker::CollectedField;

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error("Field '{0}' was collected as a message but is not a message field")]
    NotAMessage(String),
}

/// Builds a fresh message for `schema` out of `fields`.
pub fn build(
    schema: &MessageSchema,
    fields: &[CollectedField<'_>],
) -> Result<TypedMessage, AssembleError> {
    let mut message = TypedMessage::new(&schema.full_name);
    assemble(&mut message, fields)?;
    Ok(message)
}

/// Sets every collected field on `target`, in tree order.
pub fn assemble(
    target: &mut TypedMessage,
    fields: &[CollectedField<'_>],
) -> Result<(), AssembleError> {
    let staged = stage(fields)?;

    for (field, value) in staged {
        target.set(field, value);
    }

    Ok(())
}

fn stage(fields: &[CollectedField<'_>]) -> Result<Vec<(FieldRef, TypedValue)>, AssembleError> {
    fields
        .iter()
        .map(|collected| {
            let field = collected.field();

            let value = match collected {
                CollectedField::Scalar { raw, .. } => coerce(field, raw)?,
                CollectedField::Composite { children, .. } => match &field.kind {
                    FieldKind::Message(nested) => TypedValue::Message(build(nested, children)?),
                    FieldKind::Recursive(type_name) if children.is_empty() => {
                        TypedValue::Message(TypedMessage::new(type_name))
                    }
                    _ => return Err(AssembleError::NotAMessage(field.name.clone())),
                },
            };

            let value = if field.repeated {
                TypedValue::List(vec![value])
            } else {
                value
            };

            Ok((FieldRef::from(field), value))
        })
        .collect()
}
