// src/core/output.rs

//! Buffers for captured text and splitting it into lines.

/// An append-only text buffer that silently drops everything while recording is off.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    text: String,
    recording: bool,
}

impl OutputBuffer {
    /// Creates an empty buffer.
    pub fn new(recording: bool) -> Self {
        Self {
            text: String::new(),
            recording,
        }
    }

    /// Whether appended text is kept.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Appends `chunk` if recording is on.
    pub fn append(&mut self, chunk: &str) {
        if self.recording {
            self.text.push_str(chunk);
        }
    }

    /// The accumulated text, unmodified.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The accumulated text split into lines. See [`split_lines`].
    pub fn lines(&self, line_break: &str, strip_empty: bool) -> Vec<String> {
        split_lines(&self.text, line_break, strip_empty)
    }
}

/// Splits `text` on `line_break`.
///
/// Exactly one trailing empty segment (from a final separator) is dropped, so
/// `"a\n"` gives `["a"]` while `"a\n\n"` gives `["a", ""]`. Internal empty lines are
/// kept unless `strip_empty` is set, in which case every empty line goes.
pub fn split_lines(text: &str, line_break: &str, strip_empty: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if line_break.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = text.split(line_break).map(str::to_string).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    if strip_empty {
        lines.retain(|line| !line.is_empty());
    }
    lines
}
