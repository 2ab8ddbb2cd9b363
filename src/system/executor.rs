// EN: src/system/executor.rs

//! Spawning, feeding, draining, killing and reaping child processes.

use crate::constants::UNKNOWN_EXIT_CODE;
use crate::models::ShellOptions;
use std::io::{self, ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command as StdCommand, ExitStatus, Stdio};
use std::thread::{self, ScopedJoinHandle};
use thiserror::Error;

/// Failures while turning a command into a running process and talking to it.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A line with unbalanced quotes was given to shell-word splitting.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The command resolved to no tokens at all.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The OS refused to start the process (not found, permission denied, ...).
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] io::Error),
    /// Writing input, reading output or waiting on the process failed.
    #[error("I/O error while communicating with '{command}': {source}")]
    Io {
        /// The command being serviced.
        command: String,
        /// The underlying pipe or wait error.
        #[source]
        source: io::Error,
    },
    /// A recorded stream was not valid UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The command that produced the output.
        command: String,
        /// Where decoding failed.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Everything a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Exit code, see [`exit_code`].
    pub code: i32,
    /// Everything written to stdout.
    pub stdout: Vec<u8>,
    /// Everything written to stderr.
    pub stderr: Vec<u8>,
}

/// Spawns `argv` with stdout and stderr connected to pipes.
///
/// Stdin is piped only when the options say the process expects input; otherwise
/// it is inherited from the current process. The working directory and extra
/// environment variables are passed through untouched.
///
/// On Unix, a process that expects input leads its own process group, so that
/// [`terminate`] also reaches anything it started.
pub fn spawn(argv: &[String], command: &str, options: &ShellOptions) -> Result<Child, ExecutionError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ExecutionError::EmptyCommand);
    };

    let mut process = StdCommand::new(program);
    process
        .args(args)
        .envs(&options.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if options.has_input {
        process.stdin(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }
    }
    if let Some(dir) = &options.current_dir {
        process.current_dir(dunce::simplified(dir));
    }

    let child = process
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(command.to_string(), e))?;
    log::debug!("Spawned '{}' (PID: {}).", command, child.id());
    Ok(child)
}

/// Feeds `input` to the child, drains both output streams and reaps it.
///
/// Stdin, stdout and stderr are each serviced by their own thread, so a child
/// that fills one pipe while we are busy with another can never stall us. The
/// child is always waited on, even when one of the pipes failed.
pub fn collect(mut child: Child, input: Option<&[u8]>, command: &str) -> Result<Completion, ExecutionError> {
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (written, stdout, stderr) = thread::scope(|s| {
        let writer = s.spawn(move || feed_input(stdin, input));
        let out_reader = s.spawn(move || drain(stdout));
        let err_reader = s.spawn(move || drain(stderr));
        (join(writer), join(out_reader), join(err_reader))
    });

    let status = child.wait().map_err(|e| io_error(command, e))?;
    written.map_err(|e| io_error(command, e))?;

    Ok(Completion {
        code: exit_code(status),
        stdout: stdout.map_err(|e| io_error(command, e))?,
        stderr: stderr.map_err(|e| io_error(command, e))?,
    })
}

/// Forcibly stops the child, then reaps it like [`collect`] so that whatever it
/// printed before dying is still returned.
///
/// The child's whole process group is killed first. Otherwise a grandchild that
/// inherited the output pipes would keep them open and the drain would block
/// until it exited on its own.
pub fn terminate(mut child: Child, command: &str) -> Result<Completion, ExecutionError> {
    log::debug!("Killing child process '{}' (PID: {})...", command, child.id());
    #[cfg(unix)]
    kill_process_group(&child);
    if let Err(e) = child.kill() {
        // The process may already have exited on its own; reaping below still applies.
        log::warn!("Failed to kill child process {}: {}", child.id(), e);
    }
    collect(child, None, command)
}

/// Maps an exit status to a single integer code.
///
/// Processes killed by a signal report `128 + signal` on Unix, so the code is
/// never zero for them.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return crate::constants::SIGNAL_EXIT_BASE + signal;
        }
    }
    UNKNOWN_EXIT_CODE
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: `kill` only sends a signal. The child has not been reaped yet, so its
    // pid cannot have been reused as the id of an unrelated group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        // ESRCH when the child was spawned without its own group.
        log::debug!(
            "Could not signal process group {}: {}",
            pgid,
            io::Error::last_os_error()
        );
    }
}

fn feed_input(stdin: Option<ChildStdin>, input: Option<&[u8]>) -> io::Result<()> {
    // Dropping the pipe at the end of this function is what signals EOF to the child.
    let (Some(mut pipe), Some(data)) = (stdin, input) else {
        return Ok(());
    };
    match pipe.write_all(data).and_then(|()| pipe.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            log::debug!("Child closed its stdin before reading all input.");
            Ok(())
        }
        other => other,
    }
}

fn drain(pipe: Option<impl Read>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

fn join<T>(handle: ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe worker thread panicked")))
}

fn io_error(command: &str, source: io::Error) -> ExecutionError {
    ExecutionError::Io {
        command: command.to_string(),
        source,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    fn run_sh(script: &str, options: &ShellOptions, input: Option<&[u8]>) -> Completion {
        let child = spawn(&argv(&["sh", "-c", script]), script, options).unwrap();
        collect(child, input, script).unwrap()
    }

    #[test]
    fn test_spawn_empty_command() {
        let result = spawn(&[], "", &ShellOptions::default());
        assert!(matches!(result, Err(ExecutionError::EmptyCommand)));
    }

    #[test]
    fn test_spawn_missing_program() {
        let result = spawn(
            &argv(&["definitely-not-a-real-program-4242"]),
            "definitely-not-a-real-program-4242",
            &ShellOptions::default(),
        );
        match result {
            Err(ExecutionError::CommandFailed(command, e)) => {
                assert_eq!(command, "definitely-not-a-real-program-4242");
                assert_eq!(e.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_reports_exit_code_and_streams() {
        let completion = run_sh("echo out; echo err >&2; exit 3", &ShellOptions::default(), None);
        assert_eq!(completion.code, 3);
        assert_eq!(completion.stdout, b"out\n");
        assert_eq!(completion.stderr, b"err\n");
    }

    #[test]
    fn test_collect_drains_both_streams_without_deadlock() {
        // Well past the usual 64 KiB pipe capacity on both streams.
        let script = "head -c 300000 /dev/zero; head -c 300000 /dev/zero >&2; \
                      head -c 300000 /dev/zero";
        let completion = run_sh(script, &ShellOptions::default(), None);
        assert_eq!(completion.code, 0);
        assert_eq!(completion.stdout.len(), 600_000);
        assert_eq!(completion.stderr.len(), 300_000);
    }

    #[test]
    fn test_collect_feeds_large_input() {
        let options = ShellOptions::default().has_input(true);
        let input = vec![b'x'; 500_000];
        let completion = run_sh("cat", &options, Some(&input));
        assert_eq!(completion.code, 0);
        assert_eq!(completion.stdout.len(), input.len());
    }

    #[test]
    fn test_collect_tolerates_child_ignoring_input() {
        let options = ShellOptions::default().has_input(true);
        let input = vec![b'x'; 500_000];
        let completion = run_sh("exec 0<&-; echo done", &options, Some(&input));
        assert_eq!(completion.code, 0);
        assert_eq!(completion.stdout, b"done\n");
    }

    #[test]
    fn test_terminate_records_signal_exit_code() {
        let options = ShellOptions::default().has_input(true);
        let child = spawn(&argv(&["sleep", "30"]), "sleep 30", &options).unwrap();
        let completion = terminate(child, "sleep 30").unwrap();
        assert_eq!(completion.code, 128 + 9);
        assert!(completion.stdout.is_empty());
    }

    #[test]
    fn test_terminate_reaches_grandchildren() {
        // --- Setup ---
        let options = ShellOptions::default().has_input(true);
        let script = "sleep 30; echo done";
        let child = spawn(&argv(&["sh", "-c", script]), script, &options).unwrap();

        // --- Execute ---
        let started = std::time::Instant::now();
        let completion = terminate(child, script).unwrap();

        // --- Assert ---
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert_eq!(completion.code, 128 + 9);
        assert!(completion.stdout.is_empty());
    }

    #[test]
    fn test_spawn_passes_env_through() {
        let options = ShellOptions::default().env("SHELLOUT_TEST_VAR", "passed");
        let completion = run_sh("printf %s \"$SHELLOUT_TEST_VAR\"", &options, None);
        assert_eq!(completion.stdout, b"passed");
    }
}
