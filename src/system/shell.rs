// EN: src/system/shell.rs

//! The `Shell` session and its errors.

use crate::{
    core::{command_splitter::split_command, output::OutputBuffer},
    models::{Command, ShellOptions},
    system::executor::{self, Completion, ExecutionError},
};
use std::process::Child;
use thiserror::Error;

/// A command finished with a non-zero exit code while the session had `die_on_error` set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Command '{command}' exited with non-zero code {code}.")]
pub struct CommandError {
    /// The exit code of the failed process.
    pub code: i32,
    /// The command, in the form it was given to `run`.
    pub command: String,
    /// Everything the failed process wrote to stderr, unstripped.
    pub stderr: String,
}

/// Errors surfaced by [`Shell`] operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Spawning, talking to or decoding the output of a process failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// A process exited non-zero in a `die_on_error` session.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// `write` or `wait` on a session without `has_input`.
    #[error("This session was not created with `has_input`; there is no stdin to write to.")]
    InputNotExpected,
    /// `write` or `wait` with no process pending.
    #[error("No process is waiting for input. Call `run` first.")]
    NoActiveProcess,
    /// `run` while the previous process still waits for input.
    #[error("Command '{0}' is still waiting for input; call `write`, `wait` or `kill` before running another command.")]
    ProcessPending(String),
}

/// A reusable session around external commands.
///
/// Every mutating call returns `&mut Self`, so a whole interaction reads as one chain:
///
/// ```no_run
/// use shellout::{Shell, ShellOptions};
///
/// # fn main() -> Result<(), shellout::ShellError> {
/// let mut sh = Shell::with_options(ShellOptions::default().has_input(true));
/// let lines = sh.run("cat -u")?.write("Hello, world!")?.output();
/// assert_eq!(lines, vec!["Hello, world!"]);
/// # Ok(())
/// # }
/// ```
///
/// Output from consecutive runs accumulates in the same buffers; `exit_code`,
/// `pid` and `last_command` always describe the most recent process.
#[derive(Debug)]
pub struct Shell {
    options: ShellOptions,
    last_command: String,
    exit_code: i32,
    pid: u32,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
    /// The child spawned by `run` in input mode, until `write`, `wait` or `kill` reaps it.
    active: Option<Child>,
}

impl Default for Shell {
    fn default() -> Self {
        Self::with_options(ShellOptions::default())
    }
}

impl Shell {
    /// Creates a session with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with the given options.
    pub fn with_options(options: ShellOptions) -> Self {
        Self {
            stdout: OutputBuffer::new(options.record_output),
            stderr: OutputBuffer::new(options.record_errors),
            options,
            last_command: String::new(),
            exit_code: 0,
            pid: 0,
            active: None,
        }
    }

    /// Runs a command.
    ///
    /// Without `has_input`, this blocks until the process exits and its output is
    /// captured. With `has_input`, it returns as soon as the process is spawned and
    /// a later [`write`](Self::write) or [`wait`](Self::wait) finishes it.
    pub fn run(&mut self, command: impl Into<Command>) -> Result<&mut Self, ShellError> {
        if self.active.is_some() {
            return Err(ShellError::ProcessPending(self.last_command.clone()));
        }

        let command = command.into();
        let argv = split_command(&command);
        self.last_command = command.display();

        let child = executor::spawn(&argv, &self.last_command, &self.options)?;
        self.pid = child.id();

        if self.options.has_input {
            log::debug!("'{}' is waiting for input.", self.last_command);
            self.active = Some(child);
        } else {
            self.complete(child, None)?;
        }
        Ok(self)
    }

    /// Sends `data` to the pending process, closes its stdin and waits for it to exit.
    pub fn write(&mut self, data: &str) -> Result<&mut Self, ShellError> {
        let child = self.take_pending()?;
        self.complete(child, Some(data.as_bytes()))?;
        Ok(self)
    }

    /// Like [`write`](Self::write), with the lines joined by the session's line break.
    pub fn write_lines<I, S>(&mut self, lines: I) -> Result<&mut Self, ShellError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&self.options.line_break);
        self.write(&joined)
    }

    /// Closes the pending process's stdin without sending anything and waits for it.
    pub fn wait(&mut self) -> Result<&mut Self, ShellError> {
        let child = self.take_pending()?;
        self.complete(child, None)?;
        Ok(self)
    }

    /// Forcibly terminates the pending process, if any, and reaps it.
    ///
    /// Output produced before the kill is still captured. A kill is never reported
    /// as a `ShellError::Command`, even with `die_on_error` set. If the process
    /// had already exited on its own, its real exit code is recorded, which may be 0.
    pub fn kill(&mut self) -> Result<&mut Self, ShellError> {
        let Some(child) = self.active.take() else {
            log::debug!("kill() called with no active process; nothing to do.");
            return Ok(self);
        };
        let completion = executor::terminate(child, &self.last_command)?;
        self.record(completion, false)?;
        Ok(self)
    }

    /// Captured stdout split into lines.
    pub fn output(&self) -> Vec<String> {
        self.stdout
            .lines(&self.options.line_break, self.options.strip_empty)
    }

    /// Captured stdout exactly as the processes wrote it.
    pub fn output_raw(&self) -> &str {
        self.stdout.as_str()
    }

    /// Captured stderr split into lines.
    pub fn errors(&self) -> Vec<String> {
        self.stderr
            .lines(&self.options.line_break, self.options.strip_empty)
    }

    /// Captured stderr exactly as the processes wrote it.
    pub fn errors_raw(&self) -> &str {
        self.stderr.as_str()
    }

    /// Exit code of the most recent process; 0 until one has completed.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// OS process id of the most recently spawned process; 0 if none was spawned.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The most recent command, unsplit.
    pub fn last_command(&self) -> &str {
        &self.last_command
    }

    /// The options this session was created with.
    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    /// Whether a process spawned in input mode is still waiting to be completed.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    fn take_pending(&mut self) -> Result<Child, ShellError> {
        if !self.options.has_input {
            return Err(ShellError::InputNotExpected);
        }
        self.active.take().ok_or(ShellError::NoActiveProcess)
    }

    fn complete(&mut self, child: Child, input: Option<&[u8]>) -> Result<(), ShellError> {
        let completion = executor::collect(child, input, &self.last_command)?;
        self.record(completion, true)
    }

    /// Stores the results of a reaped process and applies the die-on-error policy.
    fn record(&mut self, completion: Completion, check: bool) -> Result<(), ShellError> {
        let Completion {
            code,
            stdout,
            stderr,
        } = completion;
        self.exit_code = code;
        log::debug!(
            "'{}' (PID: {}) exited with code {}.",
            self.last_command,
            self.pid,
            code
        );

        let failed = check && self.options.die_on_error && code != 0;

        // Both streams are decoded before either is stored, so one bad stream
        // never hides the other or the die-on-error check.
        let stdout_text = self
            .stdout
            .is_recording()
            .then(|| self.decode(stdout))
            .transpose();
        let stderr_text = (self.stderr.is_recording() || failed)
            .then(|| self.decode(stderr))
            .transpose();

        if let Ok(Some(text)) = &stdout_text {
            self.stdout.append(text);
        }
        if let Ok(Some(text)) = &stderr_text {
            self.stderr.append(text);
        }
        let stderr_text = stderr_text?.unwrap_or_default();

        if failed {
            return Err(CommandError {
                code,
                command: self.last_command.clone(),
                stderr: stderr_text,
            }
            .into());
        }
        stdout_text?;
        Ok(())
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<String, ExecutionError> {
        String::from_utf8(bytes).map_err(|e| ExecutionError::InvalidUtf8Output {
            command: self.last_command.clone(),
            source: e,
        })
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(child) = self.active.take() {
            log::debug!(
                "Session dropped while '{}' was pending; killing it.",
                self.last_command
            );
            if let Err(e) = executor::terminate(child, &self.last_command) {
                log::warn!("Failed to reap '{}': {}", self.last_command, e);
            }
        }
    }
}

/// Creates a session from `options`, runs `command` on it and hands the session back.
pub fn shell(command: impl Into<Command>, options: ShellOptions) -> Result<Shell, ShellError> {
    let mut session = Shell::with_options(options);
    session.run(command)?;
    Ok(session)
}
