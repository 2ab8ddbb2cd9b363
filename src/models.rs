// src/models.rs

//! Session configuration and the command type.

use crate::constants::DEFAULT_LINE_BREAK;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

// --- Session Configuration ---

/// Configuration for a [`Shell`](crate::Shell) session.
///
/// All fields have defaults, so a partial TOML table (or `ShellOptions::default()`
/// followed by a few setter calls) is enough to describe a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellOptions {
    /// The child expects data on its stdin; `run` returns before the process completes
    /// and a later `write`/`wait` finishes it.
    pub has_input: bool,
    /// Captured stdout accumulates in the session buffer.
    pub record_output: bool,
    /// Captured stderr accumulates in the session buffer.
    pub record_errors: bool,
    /// A non-zero exit code becomes a `ShellError::Command`.
    #[serde(alias = "die")]
    pub die_on_error: bool,
    /// Separator used to split buffers into lines and to join `write_lines` input.
    #[serde(alias = "line_breaks")]
    pub line_break: String,
    /// Drop every empty line (not just the trailing one) when splitting output.
    pub strip_empty: bool,
    /// Working directory for spawned processes. Inherited when absent.
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables for spawned processes, on top of the inherited ones.
    pub env: HashMap<String, String>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            has_input: false,
            record_output: true,
            record_errors: true,
            die_on_error: false,
            line_break: DEFAULT_LINE_BREAK.to_string(),
            strip_empty: false,
            current_dir: None,
            env: HashMap::new(),
        }
    }
}

impl ShellOptions {
    /// Sets whether the session feeds input to its processes.
    pub fn has_input(mut self, value: bool) -> Self {
        self.has_input = value;
        self
    }

    /// Sets whether stdout is kept.
    pub fn record_output(mut self, value: bool) -> Self {
        self.record_output = value;
        self
    }

    /// Sets whether stderr is kept.
    pub fn record_errors(mut self, value: bool) -> Self {
        self.record_errors = value;
        self
    }

    /// Sets whether a failing command is reported as an error.
    pub fn die_on_error(mut self, value: bool) -> Self {
        self.die_on_error = value;
        self
    }

    /// Sets the line separator.
    pub fn line_break(mut self, value: impl Into<String>) -> Self {
        self.line_break = value.into();
        self
    }

    /// Sets whether empty lines are removed from `output()`/`errors()`.
    pub fn strip_empty(mut self, value: bool) -> Self {
        self.strip_empty = value;
        self
    }

    /// Sets the working directory of spawned processes.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds one environment variable for spawned processes.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

// --- Commands ---

/// A command as supplied by the caller: either a single line still to be split,
/// or an argument vector that is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A whitespace-delimited command line. Quotes are not interpreted.
    Raw(String),
    /// A pre-tokenized argument vector. The first element is the program.
    Tokens(Vec<String>),
}

impl Command {
    /// The unsplit form of the command, as recorded in `Shell::last_command`.
    pub fn display(&self) -> String {
        match self {
            Self::Raw(line) => line.clone(),
            Self::Tokens(tokens) => tokens.join(" "),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Self::Raw(line.to_string())
    }
}

impl From<String> for Command {
    fn from(line: String) -> Self {
        Self::Raw(line)
    }
}

impl From<&String> for Command {
    fn from(line: &String) -> Self {
        Self::Raw(line.clone())
    }
}

impl From<Vec<String>> for Command {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<Vec<&str>> for Command {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Command {
    fn from(tokens: &[&str]) -> Self {
        Self::Tokens(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Command {
    fn from(tokens: [&str; N]) -> Self {
        Self::Tokens(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ShellOptions::default();
        assert!(!options.has_input);
        assert!(options.record_output);
        assert!(options.record_errors);
        assert!(!options.die_on_error);
        assert_eq!(options.line_break, "\n");
        assert!(!options.strip_empty);
        assert!(options.current_dir.is_none());
        assert!(options.env.is_empty());
    }

    #[test]
    fn test_builder_setters() {
        let options = ShellOptions::default()
            .has_input(true)
            .record_output(false)
            .record_errors(false)
            .die_on_error(true)
            .line_break("\r\n")
            .env("GREETING", "hi");

        assert!(options.has_input);
        assert!(!options.record_output);
        assert!(!options.record_errors);
        assert!(options.die_on_error);
        assert_eq!(options.line_break, "\r\n");
        assert_eq!(options.env.get("GREETING").map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_command_display_keeps_unsplit_form() {
        assert_eq!(Command::from("ls   -alh").display(), "ls   -alh");
        assert_eq!(Command::from(["ls", "-alh"]).display(), "ls -alh");
        assert_eq!(Command::from(vec!["echo"]).to_string(), "echo");
    }
}
