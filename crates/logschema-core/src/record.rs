//! WES run and task log records carrying structured logging.
//!
//! These mirror the `RunLog` / `TaskLog` objects of the WES API with the
//! proposed `structured_log` and `log_schema` additions. A task never holds a
//! reference to its run: inheritance is resolved by passing the run's
//! descriptor into [`crate::Validator::validate_task`].
//!
//! Timestamps are kept as the producer wrote them. They play no part in
//! validation, so a loosely formatted time never rejects a record.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::descriptor::{has_http_scheme, LogSchema};

/// Structured log content: embedded inline or referenced by URI.
///
/// On the wire this is a plain string. A string is treated as remote only
/// when it carries an `http(s)://` prefix and parses as an absolute URL, so a
/// broken URI is checked like any other inline payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StructuredLog {
    Inline(String),
    Remote(String),
}

impl StructuredLog {
    /// Classify raw wire content.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if has_http_scheme(&raw) && url::Url::parse(&raw).is_ok() {
            StructuredLog::Remote(raw)
        } else {
            StructuredLog::Inline(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StructuredLog::Inline(content) | StructuredLog::Remote(content) => content,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StructuredLog::Remote(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<String> for StructuredLog {
    fn from(raw: String) -> Self {
        StructuredLog::new(raw)
    }
}

impl From<&str> for StructuredLog {
    fn from(raw: &str) -> Self {
        StructuredLog::new(raw)
    }
}

impl From<StructuredLog> for String {
    fn from(log: StructuredLog) -> Self {
        match log {
            StructuredLog::Inline(content) | StructuredLog::Remote(content) => content,
        }
    }
}

impl fmt::Display for StructuredLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow-level log with structured logging support.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Canonical location for machine-readable logs.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_log_as_none"
    )]
    pub structured_log: Option<StructuredLog>,

    /// Shape of `structured_log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_schema: Option<LogSchema>,
}

impl RunLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_structured_log(mut self, content: impl Into<StructuredLog>) -> Self {
        self.structured_log = Some(content.into());
        self
    }

    pub fn with_log_schema(mut self, schema: LogSchema) -> Self {
        self.log_schema = Some(schema);
        self
    }
}

/// Per-attempt executor log inside a task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttemptLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Task-level log with structured logging support.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskLog {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<AttemptLog>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_log_as_none"
    )]
    pub structured_log: Option<StructuredLog>,

    /// Shape of `structured_log`. Inherited from the run when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_schema: Option<LogSchema>,
}

impl TaskLog {
    pub fn with_structured_log(mut self, content: impl Into<StructuredLog>) -> Self {
        self.structured_log = Some(content.into());
        self
    }

    pub fn with_log_schema(mut self, schema: LogSchema) -> Self {
        self.log_schema = Some(schema);
        self
    }
}

/// Run status document as returned by `GET /runs/{run_id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub run_log: RunLog,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_logs: Vec<TaskLog>,
}

impl RunResponse {
    /// Parse a run document: either a full run response (detected by its
    /// `run_log` key) or a bare `RunLog`.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if value.get("run_log").is_some() {
            return Ok(serde_json::from_value(value)?);
        }
        Ok(RunResponse {
            run_log: serde_json::from_value(value)?,
            ..RunResponse::default()
        })
    }

    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

fn empty_log_as_none<'de, D>(deserializer: D) -> Result<Option<StructuredLog>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(StructuredLog::new))
}
