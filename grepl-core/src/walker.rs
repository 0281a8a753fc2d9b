//! # Schema Walker
//!
//! Walks a [`MessageSchema`] in declaration order, depth-first, and gathers one answer per leaf
//! field:
//!
//! * A member of a oneof group triggers a selection among the group's candidates. Only the chosen
//!   candidate is collected; the other members are skipped.
//! * An enum field triggers a selection among the enum's values (see [`Resolver`]).
//! * A message field is collected recursively, one accent further.
//! * A field whose message type contains itself is skipped, unless it is the chosen member of a
//!   oneof: it is then collected as an empty message.
//! * Any other field is read as raw text from the [`PromptSource`].
//!
//! Nothing is converted here. The result is a tree of [`CollectedField`]s handed over to the
//! [`crate::assembler`].
use crate::BoxError;
use crate::resolver::{OneofTracker, ResolveError, Resolver};
use crate::schema::{FieldKind, FieldSchema, MessageSchema};
use crate::source::{Accent, ChoiceSource, InputError, PromptSource};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The human ended the input. Not a failure.
    #[error("Input cancelled")]
    Cancelled,
    #[error("Unsupported kind '{kind}' for field '{field}'")]
    UnsupportedKind { field: String, kind: String },
    #[error(transparent)]
    Resolve(ResolveError),
    #[error("Failed to read field '{field}': '{source}'")]
    Prompt {
        field: String,
        #[source]
        source: BoxError,
    },
}

impl From<ResolveError> for CollectError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Input(InputError::EndOfInput) => CollectError::Cancelled,
            err => CollectError::Resolve(err),
        }
    }
}

/// One collected answer.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectedField<'s> {
    Scalar {
        field: &'s FieldSchema,
        raw: String,
    },
    Composite {
        field: &'s FieldSchema,
        children: Vec<CollectedField<'s>>,
    },
}

impl<'s> CollectedField<'s> {
    pub fn field(&self) -> &'s FieldSchema {
        match self {
            CollectedField::Scalar { field, .. } | CollectedField::Composite { field, .. } => *field,
        }
    }
}

/// Template used to render prompt labels.
///
/// Supported placeholders: `{ancestor}`, `{name}` and `{type}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormat {
    pub template: String,
    /// Separator between ancestor names.
    pub delimiter: String,
}

impl Default for LabelFormat {
    fn default() -> Self {
        Self {
            template: "{ancestor}{name} ({type}) => ".to_string(),
            delimiter: "::".to_string(),
        }
    }
}

impl LabelFormat {
    /// Renders the label of a field. `{ancestor}` expands to every ancestor name followed by the
    /// delimiter, or to nothing for top-level fields.
    pub fn render(&self, ancestors: &[&str], name: &str, kind: &FieldKind) -> String {
        let ancestor: String = ancestors
            .iter()
            .map(|a| format!("{a}{}", self.delimiter))
            .collect();

        self.template
            .replace("{ancestor}", &ancestor)
            .replace("{name}", name)
            .replace("{type}", kind.name())
    }
}

/// Collects the answers for every field of `schema`, starting a fresh resolution pass.
pub fn collect<'s, P, C>(
    prompt: P,
    choices: C,
    format: &LabelFormat,
    schema: &'s MessageSchema,
) -> Result<Vec<CollectedField<'s>>, CollectError>
where
    P: PromptSource,
    C: ChoiceSource,
{
    Walker::new(prompt, choices, format).collect(&[], schema, Accent::default())
}

pub struct Walker<'f, P, C> {
    prompt: P,
    resolver: Resolver<C>,
    format: &'f LabelFormat,
}

impl<'f, P, C> Walker<'f, P, C>
where
    P: PromptSource,
    C: ChoiceSource,
{
    pub fn new(prompt: P, choices: C, format: &'f LabelFormat) -> Self {
        Self {
            prompt,
            resolver: Resolver::new(choices),
            format,
        }
    }

    pub fn collect<'s>(
        &mut self,
        ancestors: &[&str],
        schema: &'s MessageSchema,
        accent: Accent,
    ) -> Result<Vec<CollectedField<'s>>, CollectError> {
        let mut oneofs = OneofTracker::default();
        let mut collected = Vec::with_capacity(schema.fields.len());

        for iterated in &schema.fields {
            let field = match &iterated.oneof {
                Some(oneof) if !oneofs.first_encounter(oneof) => continue,
                Some(oneof) => self.resolver.resolve_oneof(oneof, schema)?,
                None => iterated,
            };

            let entry = match &field.kind {
                FieldKind::Unsupported(kind) => {
                    return Err(CollectError::UnsupportedKind {
                        field: field.name.clone(),
                        kind: kind.clone(),
                    });
                }
                // A chosen oneof member is always set, here as an empty message.
                FieldKind::Recursive(_) if field.oneof.is_some() => CollectedField::Composite {
                    field,
                    children: Vec::new(),
                },
                FieldKind::Recursive(type_name) => {
                    debug!(field = %field.name, %type_name, "skipping recursive message field");
                    continue;
                }
                FieldKind::Enum(enumeration) => CollectedField::Scalar {
                    field,
                    raw: self.resolver.resolve_enum(enumeration)?,
                },
                FieldKind::Message(nested) => {
                    let mut path = ancestors.to_vec();
                    path.push(&field.name);

                    let children = self.collect(&path, nested, accent.next())?;
                    CollectedField::Composite { field, children }
                }
                kind => {
                    let label = self.format.render(ancestors, &field.name, kind);
                    let raw = self
                        .prompt
                        .read_line(&label, accent)
                        .map_err(|err| match err {
                            InputError::EndOfInput => CollectError::Cancelled,
                            InputError::Failed(source) => CollectError::Prompt {
                                field: field.name.clone(),
                                source,
                            },
                        })?;

                    CollectedField::Scalar { field, raw }
                }
            };

            collected.push(entry);
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, EnumValue, OneofSchema};
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct Lines {
        answers: VecDeque<&'static str>,
        asked: Vec<(String, Accent)>,
    }

    impl Lines {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl PromptSource for Lines {
        fn read_line(&mut self, label: &str, accent: Accent) -> Result<String, InputError> {
            self.asked.push((label.to_string(), accent));
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or(InputError::EndOfInput)
        }
    }

    #[derive(Default)]
    struct Picks {
        answers: VecDeque<&'static str>,
        titles: Vec<String>,
    }

    impl Picks {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                titles: Vec::new(),
            }
        }
    }

    impl ChoiceSource for Picks {
        fn choose(&mut self, title: &str, _options: &[String]) -> Result<String, InputError> {
            self.titles.push(title.to_string());
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or(InputError::EndOfInput)
        }
    }

    fn message(name: &str, fields: Vec<FieldSchema>) -> FieldKind {
        FieldKind::Message(Arc::new(MessageSchema::new(name, fields)))
    }

    fn status() -> FieldKind {
        FieldKind::Enum(Arc::new(EnumSchema {
            full_name: "pkg.Status".to_string(),
            name: "Status".to_string(),
            values: vec![
                EnumValue {
                    name: "UNKNOWN".to_string(),
                    number: 0,
                },
                EnumValue {
                    name: "ACTIVE".to_string(),
                    number: 1,
                },
            ],
        }))
    }

    fn raw_values(fields: &[CollectedField<'_>]) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for field in fields {
            match field {
                CollectedField::Scalar { field, raw } => out.push((field.name.clone(), raw.clone())),
                CollectedField::Composite { field, children } => {
                    for (name, raw) in raw_values(children) {
                        out.push((format!("{}.{name}", field.name), raw));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn renders_labels_from_ancestors() {
        let format = LabelFormat::default();

        assert_eq!(
            format.render(&[], "name", &FieldKind::String),
            "name (string) => "
        );
        assert_eq!(
            format.render(&["meta", "inner"], "count", &FieldKind::Int32),
            "meta::inner::count (int32) => "
        );

        let custom = LabelFormat {
            template: "[{ancestor}] {name}: {type}> ".to_string(),
            delimiter: "/".to_string(),
        };
        assert_eq!(
            custom.render(&["a"], "b", &FieldKind::Bool),
            "[a/] b: bool> "
        );
    }

    #[test]
    fn prompts_depth_first_in_declared_order() {
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("name", 1, FieldKind::String),
                FieldSchema::new(
                    "meta",
                    2,
                    message(
                        "pkg.Meta",
                        vec![
                            FieldSchema::new("count", 1, FieldKind::Int32),
                            FieldSchema::new("ratio", 2, FieldKind::Double),
                        ],
                    ),
                ),
                FieldSchema::new("flag", 3, FieldKind::Bool),
            ],
        );
        let format = LabelFormat::default();
        let mut lines = Lines::new(&["hello", "7", "0.5", "true"]);

        let collected = collect(&mut lines, Picks::default(), &format, &schema).unwrap();

        assert_eq!(
            raw_values(&collected),
            vec![
                ("name".to_string(), "hello".to_string()),
                ("meta.count".to_string(), "7".to_string()),
                ("meta.ratio".to_string(), "0.5".to_string()),
                ("flag".to_string(), "true".to_string()),
            ]
        );
        assert_eq!(
            lines.asked,
            vec![
                ("name (string) => ".to_string(), Accent::Green),
                ("meta::count (int32) => ".to_string(), Accent::Cyan),
                ("meta::ratio (double) => ".to_string(), Accent::Cyan),
                ("flag (bool) => ".to_string(), Accent::Green),
            ]
        );
    }

    #[test]
    fn only_the_chosen_oneof_member_is_collected() {
        let oneof = Arc::new(OneofSchema {
            full_name: "pkg.Request.value".to_string(),
            name: "value".to_string(),
            choices: vec!["text".to_string(), "number".to_string(), "nested".to_string()],
        });
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("text", 1, FieldKind::String).in_oneof(oneof.clone()),
                FieldSchema::new("number", 2, FieldKind::Int64).in_oneof(oneof.clone()),
                FieldSchema::new(
                    "nested",
                    3,
                    message("pkg.Inner", vec![FieldSchema::new("x", 1, FieldKind::Int32)]),
                )
                .in_oneof(oneof.clone()),
                FieldSchema::new("after", 4, FieldKind::String),
            ],
        );
        let format = LabelFormat::default();
        let mut picks = Picks::new(&["number"]);

        let collected = collect(Lines::new(&["42", "tail"]), &mut picks, &format, &schema).unwrap();

        assert_eq!(
            raw_values(&collected),
            vec![
                ("number".to_string(), "42".to_string()),
                ("after".to_string(), "tail".to_string()),
            ]
        );
        assert_eq!(picks.titles, vec!["value"]);
    }

    #[test]
    fn shared_enum_is_resolved_once_across_nesting() {
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("status", 1, status()),
                FieldSchema::new(
                    "meta",
                    2,
                    message(
                        "pkg.Meta",
                        vec![FieldSchema::new("previous", 1, status())],
                    ),
                ),
                FieldSchema::new("other", 3, status()),
            ],
        );
        let format = LabelFormat::default();
        let mut picks = Picks::new(&["ACTIVE"]);

        let collected = collect(Lines::default(), &mut picks, &format, &schema).unwrap();

        // The selection is bound to every field of the enum.
        assert_eq!(
            raw_values(&collected),
            vec![
                ("status".to_string(), "ACTIVE".to_string()),
                ("meta.previous".to_string(), "ACTIVE".to_string()),
                ("other".to_string(), "ACTIVE".to_string()),
            ]
        );
        assert_eq!(picks.titles, vec!["Status"]);
    }

    #[test]
    fn oneof_state_is_independent_per_message_level() {
        let oneof = Arc::new(OneofSchema {
            full_name: "pkg.Pair.side".to_string(),
            name: "side".to_string(),
            choices: vec!["left".to_string(), "right".to_string()],
        });
        let pair = message(
            "pkg.Pair",
            vec![
                FieldSchema::new("left", 1, FieldKind::String).in_oneof(oneof.clone()),
                FieldSchema::new("right", 2, FieldKind::String).in_oneof(oneof.clone()),
            ],
        );
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("first", 1, pair.clone()),
                FieldSchema::new("second", 2, pair),
            ],
        );
        let format = LabelFormat::default();

        let collected = collect(
            Lines::new(&["a", "b"]),
            Picks::new(&["left", "right"]),
            &format,
            &schema,
        )
        .unwrap();

        assert_eq!(
            raw_values(&collected),
            vec![
                ("first.left".to_string(), "a".to_string()),
                ("second.right".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn end_of_input_cancels_the_pass() {
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new(
                    "meta",
                    1,
                    message("pkg.Meta", vec![FieldSchema::new("count", 1, FieldKind::Int32)]),
                ),
                FieldSchema::new("name", 2, FieldKind::String),
            ],
        );
        let format = LabelFormat::default();

        let err = collect(Lines::default(), Picks::default(), &format, &schema).unwrap_err();
        assert!(matches!(err, CollectError::Cancelled));

        let enum_schema = MessageSchema::new("pkg.Request", vec![FieldSchema::new("s", 1, status())]);
        let err = collect(Lines::default(), Picks::default(), &format, &enum_schema).unwrap_err();
        assert!(matches!(err, CollectError::Cancelled));
    }

    #[test]
    fn unsupported_kind_stops_the_walk() {
        let schema = MessageSchema::new(
            "pkg.Request",
            vec![
                FieldSchema::new("labels", 1, FieldKind::Unsupported("map".to_string())),
                FieldSchema::new("name", 2, FieldKind::String),
            ],
        );
        let format = LabelFormat::default();
        let mut lines = Lines::new(&["never"]);

        let err = collect(&mut lines, Picks::default(), &format, &schema).unwrap_err();

        assert!(matches!(
            err,
            CollectError::UnsupportedKind { ref field, ref kind } if field == "labels" && kind == "map"
        ));
        assert!(lines.asked.is_empty());
    }

    #[test]
    fn recursive_fields_are_skipped() {
        let schema = MessageSchema::new(
            "pkg.Node",
            vec![
                FieldSchema::new("label", 1, FieldKind::String),
                FieldSchema::new("next", 2, FieldKind::Recursive("pkg.Node".to_string())),
            ],
        );
        let format = LabelFormat::default();

        let collected = collect(Lines::new(&["root"]), Picks::default(), &format, &schema).unwrap();

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].field().name, "label");
    }

    #[test]
    fn chosen_recursive_oneof_member_is_collected_empty() {
        let oneof = Arc::new(OneofSchema {
            full_name: "pkg.Node.kind".to_string(),
            name: "kind".to_string(),
            choices: vec!["leaf".to_string(), "child".to_string()],
        });
        let schema = MessageSchema::new(
            "pkg.Node",
            vec![
                FieldSchema::new("leaf", 1, FieldKind::String).in_oneof(oneof.clone()),
                FieldSchema::new("child", 2, FieldKind::Recursive("pkg.Node".to_string()))
                    .in_oneof(oneof.clone()),
            ],
        );
        let format = LabelFormat::default();
        let mut lines = Lines::default();

        let collected = collect(&mut lines, Picks::new(&["child"]), &format, &schema).unwrap();

        assert_eq!(
            collected,
            vec![CollectedField::Composite {
                field: schema.field("child").unwrap(),
                children: vec![],
            }]
        );
        assert!(lines.asked.is_empty());
    }
}
