// src/constants.rs

//! Shared constants.

/// The separator used to split captured output into lines and to join input lines.
pub const DEFAULT_LINE_BREAK: &str = "\n";

/// Base added to a signal number to form the exit code of a signal-terminated process,
/// following the convention used by POSIX shells (e.g. `SIGKILL` becomes 137).
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Exit code recorded when the OS reports neither an exit code nor a signal.
pub const UNKNOWN_EXIT_CODE: i32 = -1;
