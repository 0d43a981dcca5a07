//! Splitting positional words into actions and an input file.

use std::path::PathBuf;

use crate::actions::RequestedSet;
use crate::error::{MakeError, Result};

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub actions: RequestedSet,
    pub input_file: Option<PathBuf>,
}

impl Invocation {
    /// Trailing words containing a `.` are input files; the rest are
    /// case-insensitive action names. No actions means `help`.
    pub fn from_words(words: &[String]) -> Result<Self> {
        let split = words
            .iter()
            .rposition(|w| !w.contains('.'))
            .map_or(0, |i| i + 1);
        let (names, files) = words.split_at(split);

        let input_file = match files {
            [] => None,
            [single] => Some(PathBuf::from(single)),
            _ => return Err(MakeError::usage("Multiple input files are not supported yet")),
        };

        let mut actions: RequestedSet = names.iter().map(|n| n.to_lowercase()).collect();
        if actions.is_empty() {
            actions.insert("help".to_string());
        }

        Ok(Self {
            actions,
            input_file,
        })
    }
}
