//! # Oneof & Enum Resolver
//!
//! Collapses a oneof group or an enumeration into a single selection by asking the
//! [`ChoiceSource`].
//!
//! Enumerations are resolved at most once per collection pass: the first selection for an enum
//! (keyed by its fully qualified name) is reused for every other field of that enum. Oneof groups
//! are tracked by the walker for each message it collects, see [`OneofTracker`].
use crate::schema::{EnumSchema, FieldSchema, MessageSchema, OneofSchema};
use crate::source::{ChoiceSource, InputError};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("'{choice}' is not one of the options of '{title}'")]
    UnknownChoice { title: String, choice: String },
    #[error("'{0}' has no options to choose from")]
    NoOptions(String),
}

/// Resolution state of one collection pass.
pub struct Resolver<C> {
    choices: C,
    enums: HashMap<String, String>,
}

impl<C: ChoiceSource> Resolver<C> {
    pub fn new(choices: C) -> Self {
        Self {
            choices,
            enums: HashMap::new(),
        }
    }

    /// Asks which member of `oneof` should be populated and returns its schema.
    pub fn resolve_oneof<'s>(
        &mut self,
        oneof: &OneofSchema,
        message: &'s MessageSchema,
    ) -> Result<&'s FieldSchema, ResolveError> {
        let choice = self.choose(&oneof.name, &oneof.choices)?;
        debug!(oneof = %oneof.full_name, %choice, "resolved oneof");

        message
            .field(&choice)
            .ok_or_else(|| ResolveError::UnknownChoice {
                title: oneof.name.clone(),
                choice,
            })
    }

    /// Returns the selected value name of `enumeration`, asking only the first time.
    pub fn resolve_enum(&mut self, enumeration: &EnumSchema) -> Result<String, ResolveError> {
        if let Some(choice) = self.enums.get(&enumeration.full_name) {
            return Ok(choice.clone());
        }

        let options: Vec<String> = enumeration.values.iter().map(|v| v.name.clone()).collect();
        let choice = self.choose(&enumeration.name, &options)?;
        debug!(enumeration = %enumeration.full_name, %choice, "resolved enum");

        self.enums
            .insert(enumeration.full_name.clone(), choice.clone());
        Ok(choice)
    }

    fn choose(&mut self, title: &str, options: &[String]) -> Result<String, ResolveError> {
        if options.is_empty() {
            return Err(ResolveError::NoOptions(title.to_string()));
        }

        let choice = self.choices.choose(title, options)?;

        if options.contains(&choice) {
            Ok(choice)
        } else {
            Err(ResolveError::UnknownChoice {
                title: title.to_string(),
                choice,
            })
        }
    }
}

/// The oneof groups already resolved while collecting one message.
#[derive(Debug, Default)]
pub struct OneofTracker {
    resolved: HashSet<String>,
}

impl OneofTracker {
    /// Marks `oneof` as resolved. Returns `false` if it already was.
    pub fn first_encounter(&mut self, oneof: &OneofSchema) -> bool {
        self.resolved.insert(oneof.full_name.clone())
    }
}
