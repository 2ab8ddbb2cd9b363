//! # System Interaction Layer
//!
//! This module is the boundary between the session logic and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns processes with piped streams, feeds their input and drains
//!   their output concurrently, kills them and maps their exit status to a code.
//! - **`shell`**: The `Shell` session that chains `run`, `write`, `wait` and `kill`
//!   and accumulates what the processes printed.
//! - **`options_loader`**: Reads `ShellOptions` from TOML.

pub mod executor;
pub mod options_loader;
pub mod shell;
