//! Output formatting module

pub mod log_renderer;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use log_renderer::HumanLogRenderer;
pub use styles::Styles;

use crate::application::ports::OutputSink;
use crate::domain::diagnostics::{Diagnostic, Diagnostics, Severity};

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("{} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {msg}", "✗".style(self.styles.error));
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("{}  {value}", key.style(self.styles.dim));
        }
    }

    /// Print every diagnostic to stderr. Never suppressed.
    pub fn diagnostics(&self, diags: &Diagnostics) {
        for diag in diags {
            eprintln!("{}", self.format_diagnostic(diag));
        }
    }

    /// `Error: summary` (or `Warning:`) followed by the detail paragraph.
    #[must_use]
    pub fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let (label, style) = match diag.severity {
            Severity::Error => ("Error:", self.styles.error),
            Severity::Warning => ("Warning:", self.styles.warning),
        };
        let head = format!("{} {}", label.style(style), diag.summary.style(self.styles.bold));
        if diag.detail.is_empty() {
            format!("\n{head}\n")
        } else {
            format!("\n{head}\n\n{}\n", diag.detail)
        }
    }
}

impl OutputSink for OutputContext {
    fn line(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    fn header(&self, text: &str) {
        if !self.quiet {
            println!("{}", text.style(self.styles.warning));
        }
    }
}
