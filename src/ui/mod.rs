//! Terminal presentation: headings, error lines and prompts.

pub mod prompts;

use std::io::IsTerminal;

use console::style;

fn colors_for(term: &console::Term) -> bool {
    // https://no-color.org/
    std::env::var_os("NO_COLOR").is_none() && term.is_term()
}

/// Check if colors should be enabled on stdout.
pub fn should_use_colors() -> bool {
    colors_for(&console::Term::stdout())
}

/// Whether a person is at the terminal to answer prompts.
pub fn is_interactive() -> bool {
    console::user_attended() && std::io::stdin().is_terminal()
}

/// A step heading, bold when `color` is set.
pub fn heading(text: &str, color: bool) -> String {
    if color {
        style(text).bold().force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

/// The single line printed to stderr for a failed run.
pub fn error_line(message: &str) -> String {
    let line = format!("ERROR: {}", message);
    if colors_for(&console::Term::stderr()) {
        style(line).red().force_styling(true).to_string()
    } else {
        line
    }
}
