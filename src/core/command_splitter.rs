// src/core/command_splitter.rs

//! Command resolution into argument vectors.

use crate::models::Command;
use crate::system::executor::ExecutionError;

/// Turns a caller-supplied command into the argument vector handed to the OS.
///
/// # Logic:
/// - `Tokens` are returned unchanged; the caller is trusted to have quoted them.
/// - `Raw` lines are split on whitespace. Quotes are *not* interpreted, so
///   `echo "a b"` yields `["echo", "\"a", "b\""]`. Use [`shell_words`] when
///   quoting matters.
/// - An empty or all-whitespace line yields an empty vector.
pub fn split_command(command: &Command) -> Vec<String> {
    match command {
        Command::Tokens(tokens) => tokens.clone(),
        Command::Raw(line) => line.split_whitespace().map(str::to_string).collect(),
    }
}

/// Splits a line with POSIX shell-word rules (quotes and backslash escapes) and
/// returns it as a pre-tokenized command.
pub fn shell_words(line: &str) -> Result<Command, ExecutionError> {
    shlex::split(line)
        .map(Command::Tokens)
        .ok_or_else(|| ExecutionError::CommandParse(line.to_string()))
}

impl Command {
    /// Builds a `Tokens` command from a line using shell quoting rules.
    /// See [`shell_words`].
    pub fn shell_words(line: &str) -> Result<Self, ExecutionError> {
        shell_words(line)
    }
}
