//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::error::{MakeError, Result};

fn map_dialoguer_err(e: dialoguer::Error) -> MakeError {
    MakeError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask for a free-form line; an empty answer is allowed.
pub fn prompt_line(question: &str, term: &Term) -> Result<String> {
    let answer: String = Input::with_theme(&prompt_theme())
        .with_prompt(question)
        .allow_empty(true)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;
    Ok(answer.trim().to_string())
}

/// Pick one of `items`; returns its index.
pub fn select_item(question: &str, items: &[String], term: &Term) -> Result<usize> {
    Select::with_theme(&prompt_theme())
        .with_prompt(question)
        .items(items)
        .default(0)
        .interact_on(term)
        .map_err(map_dialoguer_err)
}
