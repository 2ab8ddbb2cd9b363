// src/system/options_loader.rs

//! Loading `ShellOptions` from TOML.

use std::{fs, path::Path};

use crate::models::ShellOptions;
use thiserror::Error;

/// Errors from loading `ShellOptions`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has a field of the wrong type.
    #[error("Failed to parse shell options: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Reads session options from a TOML file. Missing keys take their default values.
pub fn load_options(path: &Path) -> Result<ShellOptions, ConfigError> {
    log::debug!("Loading shell options from '{}'.", path.display());
    let content = fs::read_to_string(path)?;
    parse_options(&content)
}

/// Parses session options from TOML text.
pub fn parse_options(content: &str) -> Result<ShellOptions, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_table_fills_defaults() {
        let options = parse_options("has_input = true\nline_break = \"\\r\\n\"\n").unwrap();
        assert!(options.has_input);
        assert_eq!(options.line_break, "\r\n");
        assert!(options.record_output);
        assert!(!options.die_on_error);
    }

    #[test]
    fn test_parse_accepts_short_aliases() {
        let options = parse_options("die = true\nline_breaks = \";\"").unwrap();
        assert!(options.die_on_error);
        assert_eq!(options.line_break, ";");
    }

    #[test]
    fn test_parse_env_and_dir() {
        let content = r#"
current_dir = "/tmp"

[env]
GREETING = "hi"
"#;
        let options = parse_options(content).unwrap();
        assert_eq!(options.current_dir.as_deref(), Some(Path::new("/tmp")));
        assert_eq!(options.env.get("GREETING").map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let result = parse_options("has_input = \"yes\"");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_options_from_file() {
        // --- Setup ---
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"record_errors = false\n").unwrap();
        file.flush().unwrap();

        // --- Execute ---
        let options = load_options(file.path()).unwrap();

        // --- Assert ---
        assert!(!options.record_errors);
        assert!(options.record_output);
    }

    #[test]
    fn test_load_options_missing_file() {
        let result = load_options(Path::new("non_existent_options_for_test.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
