//! # Input Sources
//!
//! The engine never talks to a terminal directly. Raw text comes from a [`PromptSource`] and
//! oneof/enum selections from a [`ChoiceSource`]. Both are synchronous: the caller blocks until
//! the human answers.
use crate::BoxError;

/// Errors returned by input sources.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The human closed the input (Ctrl-D, Ctrl-C, Esc...). This is not a failure, the current
    /// call is abandoned without output.
    #[error("End of input")]
    EndOfInput,
    #[error("Failed to read input: '{0}'")]
    Failed(#[source] BoxError),
}

/// Visual accent used to tell nesting levels apart when prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accent {
    #[default]
    Green,
    Cyan,
    Blue,
    Magenta,
    Yellow,
    Red,
}

impl Accent {
    /// The accent of the next nesting level. Cycles through every variant.
    pub fn next(self) -> Self {
        match self {
            Accent::Green => Accent::Cyan,
            Accent::Cyan => Accent::Blue,
            Accent::Blue => Accent::Magenta,
            Accent::Magenta => Accent::Yellow,
            Accent::Yellow => Accent::Red,
            Accent::Red => Accent::Green,
        }
    }
}

/// Provides the raw text of scalar fields.
pub trait PromptSource {
    fn read_line(&mut self, label: &str, accent: Accent) -> Result<String, InputError>;
}

/// Lets the human pick one option out of a list.
pub trait ChoiceSource {
    /// Returns the selected label, which must be one of `options`.
    fn choose(&mut self, title: &str, options: &[String]) -> Result<String, InputError>;
}

impl<T: PromptSource + ?Sized> PromptSource for &mut T {
    fn read_line(&mut self, label: &str, accent: Accent) -> Result<String, InputError> {
        (**self).read_line(label, accent)
    }
}

impl<T: ChoiceSource + ?Sized> ChoiceSource for &mut T {
    fn choose(&mut self, title: &str, options: &[String]) -> Result<String, InputError> {
        (**self).choose(title, options)
    }
}
