//! # Terminal Input
//!
//! The interactive sources used by the CLI: field values are typed on a `rustyline` prompt whose
//! label is colored after the nesting level, and oneof/enum options are picked from a `dialoguer`
//! menu.
//!
//! Ctrl-D or Ctrl-C on the prompt, and Esc or `q` on a menu, end the input.
use colored::{Color, Colorize};
use dialoguer::{Select, theme::ColorfulTheme};
use grepl_core::source::{Accent, ChoiceSource, InputError, PromptSource};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::debug;

pub struct LinePrompt {
    editor: DefaultEditor,
}

impl LinePrompt {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl PromptSource for LinePrompt {
    fn read_line(&mut self, label: &str, accent: Accent) -> Result<String, InputError> {
        let prompt = label.color(color(accent)).to_string();

        match self.editor.readline(&prompt) {
            Ok(line) => {
                if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                    debug!(%err, "failed to record history entry");
                }
                Ok(line)
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Err(InputError::EndOfInput),
            Err(err) => Err(InputError::Failed(err.to_string().into())),
        }
    }
}

#[derive(Default)]
pub struct MenuChoice {
    theme: ColorfulTheme,
}

impl ChoiceSource for MenuChoice {
    fn choose(&mut self, title: &str, options: &[String]) -> Result<String, InputError> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(title)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(|e| InputError::Failed(e.into()))?;

        selection
            .and_then(|index| options.get(index).cloned())
            .ok_or(InputError::EndOfInput)
    }
}

fn color(accent: Accent) -> Color {
    match accent {
        Accent::Green => Color::Green,
        Accent::Cyan => Color::Cyan,
        Accent::Blue => Color::Blue,
        Accent::Magenta => Color::Magenta,
        Accent::Yellow => Color::Yellow,
        Accent::Red => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nesting_level_of_a_cycle_has_its_own_color() {
        let mut accent = Accent::default();
        let mut colors = Vec::new();
        for _ in 0..6 {
            colors.push(color(accent));
            accent = accent.next();
        }

        assert_eq!(accent, Accent::default());
        for (i, c) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(c));
        }
    }
}
