//! Human rendering of structured apply log records.

use anyhow::Result;
use cloud_apply_types::{JsonLog, LogMessageType};
use owo_colors::OwoColorize as _;
use serde_json::Value;

use crate::application::ports::LogRenderer;
use crate::output::Styles;

/// Renders [`JsonLog`] records as terminal text on stdout.
pub struct HumanLogRenderer {
    styles: Styles,
}

impl HumanLogRenderer {
    #[must_use]
    pub fn new(styles: Styles) -> Self {
        Self { styles }
    }

    /// Text for one record, or `None` for records that are not shown.
    #[must_use]
    pub fn format_log(&self, log: &JsonLog) -> Option<String> {
        match log.kind {
            LogMessageType::Version | LogMessageType::Log | LogMessageType::Unknown => None,
            LogMessageType::ApplyStart
            | LogMessageType::ApplyComplete
            | LogMessageType::RefreshStart
            | LogMessageType::RefreshComplete
            | LogMessageType::ProvisionStart
            | LogMessageType::ProvisionComplete => {
                Some(format!("{}", log.message.style(self.styles.bold)))
            }
            LogMessageType::ChangeSummary => Some(format!(
                "\n{}",
                log.message.style(self.styles.success.bold())
            )),
            LogMessageType::Outputs => self.format_outputs(log),
            LogMessageType::Diagnostic => Some(self.format_diagnostic(log)),
            LogMessageType::ApplyErrored | LogMessageType::ProvisionErrored => {
                Some(format!("{}", log.message.style(self.styles.error)))
            }
            LogMessageType::PlannedChange
            | LogMessageType::ResourceDrift
            | LogMessageType::ApplyProgress
            | LogMessageType::ProvisionProgress => Some(log.message.clone()),
        }
    }

    fn format_diagnostic(&self, log: &JsonLog) -> String {
        let Some(diag) = &log.diagnostic else {
            return log.message.clone();
        };
        let (label, style) = if diag.severity == "warning" {
            ("Warning:", self.styles.warning)
        } else {
            ("Error:", self.styles.error)
        };
        let mut text = format!(
            "\n{} {}",
            label.style(style),
            diag.summary.style(self.styles.bold)
        );
        if !diag.detail.is_empty() {
            text.push_str("\n\n");
            text.push_str(&diag.detail);
        }
        text
    }

    fn format_outputs(&self, log: &JsonLog) -> Option<String> {
        let outputs = log.outputs.as_ref().filter(|o| !o.is_empty())?;
        let mut text = format!("\n{}\n", "Outputs:".style(self.styles.success.bold()));
        for (name, output) in outputs {
            let value = if output.get("sensitive").and_then(Value::as_bool) == Some(true) {
                "(sensitive value)".to_string()
            } else {
                output.get("value").map_or_else(String::new, Value::to_string)
            };
            text.push_str(&format!("\n{name} = {value}"));
        }
        Some(text)
    }
}

impl LogRenderer for HumanLogRenderer {
    fn render_log(&self, log: &JsonLog) -> Result<()> {
        if let Some(text) = self.format_log(log) {
            println!("{text}");
        }
        Ok(())
    }
}
