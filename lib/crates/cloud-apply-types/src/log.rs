use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Severity of a structured log record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    #[serde(other)]
    Unknown,
}

/// Kind of event a structured log record describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogMessageType {
    Version,
    #[default]
    Log,
    Diagnostic,
    PlannedChange,
    ChangeSummary,
    Outputs,
    ResourceDrift,
    ApplyStart,
    ApplyProgress,
    ApplyComplete,
    ApplyErrored,
    RefreshStart,
    RefreshComplete,
    ProvisionStart,
    ProvisionProgress,
    ProvisionComplete,
    ProvisionErrored,
    #[serde(other)]
    Unknown,
}

/// Diagnostic payload attached to `diagnostic` records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDiagnostic {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

/// One machine-readable line of the remote run log.
///
/// Every field is optional on the wire, so any JSON object parses; only
/// non-object lines fail and fall back to raw display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JsonLog {
    #[serde(rename = "@level", default)]
    pub level: LogLevel,
    #[serde(rename = "@message", default)]
    pub message: String,
    #[serde(rename = "@module", default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    /// `None` when absent or not RFC 3339.
    #[serde(
        rename = "@timestamp",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: LogMessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<LogDiagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<serde_json::Map<String, serde_json::Value>>,
}

fn lenient_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(de)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}
