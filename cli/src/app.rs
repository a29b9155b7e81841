//! Application context — unified state passed to every command handler.

use std::io::IsTerminal as _;

use console::Term;

use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Backend configuration store.
    pub config_store: YamlConfigStore,
    /// Both stdin and stdout are terminals.
    pub ui_attached: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config_store: YamlConfigStore::new(),
            ui_attached: Term::stdout().is_term() && std::io::stdin().is_terminal(),
        }
    }
}
