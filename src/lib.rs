//! Run external commands, feed them input and capture what they print.
//!
//! ```no_run
//! use shellout::{shell, ShellOptions};
//!
//! # fn main() -> Result<(), shellout::ShellError> {
//! let sh = shell("ls -alh", ShellOptions::default())?;
//! for line in sh.output() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use models::{Command, ShellOptions};
pub use system::executor::ExecutionError;
pub use system::options_loader::{ConfigError, load_options, parse_options};
pub use system::shell::{CommandError, Shell, ShellError, shell};
