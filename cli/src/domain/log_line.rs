//! Classification of apply log lines.
//!
//! Pure functions only — the streaming loop lives in the application layer.

use cloud_apply_types::JsonLog;

/// Leading apply-log lines that repeat the version and os/arch banner
/// already shown during the plan phase.
pub const APPLY_LOG_BANNER_LINES: usize = 3;

/// One logical line of the apply log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// Plain text, shown verbatim.
    Raw(String),
    /// A structured record for the renderer.
    Structured(JsonLog),
}

impl LogLine {
    /// Parse a line, falling back to raw text when it is not a JSON record.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match serde_json::from_str::<JsonLog>(line) {
            Ok(log) => Self::Structured(log),
            Err(_) => Self::Raw(line.to_string()),
        }
    }
}

/// Stateful filter applied to each logical line in stream order.
#[derive(Debug, Default)]
pub struct ApplyLogFilter {
    seen: usize,
}

impl ApplyLogFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the line to display, or `None` when it is skipped.
    ///
    /// The banner lines are skipped unconditionally, whatever they contain.
    pub fn accept(&mut self, line: &str) -> Option<LogLine> {
        self.seen += 1;
        if self.seen <= APPLY_LOG_BANNER_LINES || line.is_empty() {
            return None;
        }
        Some(LogLine::parse(line))
    }
}

/// Strip the line terminator (`\n` or `\r\n`) from a raw read.
#[must_use]
pub fn trim_line_ending(mut bytes: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = bytes {
        bytes = rest;
        if let [rest @ .., b'\r'] = bytes {
            bytes = rest;
        }
    }
    bytes
}
