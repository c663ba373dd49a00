//! Validation engine for `structured_log` payloads.
//!
//! Validation never fails hard: every problem with a payload is reported as
//! an entry in [`ValidationOutcome::errors`]. The shared check runs three
//! stages in order and stops at the first failing one:
//!
//! 1. descriptor self-validation
//! 2. media-type parseability (inline content only)
//! 3. format-specific structure (inline content only)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::descriptor::{LogFormat, LogSchema};
use crate::format::check_format;
use crate::obs::{
    emit_schema_inherited, emit_schema_missing, emit_stage_failed, emit_validation_finished,
    ValidationSpan,
};
use crate::record::{RunLog, StructuredLog, TaskLog};

/// Error reported when a run carries structured content but no descriptor.
pub const RUN_SCHEMA_MISSING: &str =
    "structured_log is set but log_schema is missing; clients cannot determine log shape";

/// Error reported when neither a task nor its run declares a descriptor.
pub const TASK_SCHEMA_MISSING: &str =
    "structured_log is set but no log_schema found (neither on task nor inherited from run)";

/// Which record a validation outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Run,
    Task,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Run => "run",
            ValidationLevel::Task => "task",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record sits inside a run document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordPosition {
    Run,
    /// Index into the run's task list.
    Task(usize),
}

/// Result of validating one record's structured log.
///
/// `errors` is empty if and only if `valid` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub level: ValidationLevel,
    /// Format of the resolved descriptor, if any.
    pub format: Option<LogFormat>,
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

impl ValidationOutcome {
    fn invalid(level: ValidationLevel, format: Option<LogFormat>, error: String) -> Self {
        Self {
            valid: false,
            level,
            format,
            errors: vec![error],
            elapsed: Duration::ZERO,
        }
    }
}

/// Validates structured log payloads against their declared descriptors.
///
/// Holds no state; a single value can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Validator
    }

    /// Validate the structured log of a run against its own descriptor.
    ///
    /// Returns `None` when the run has no structured log.
    pub fn validate_run(&self, run: &RunLog) -> Option<ValidationOutcome> {
        let content = present(run.structured_log.as_ref())?;
        let _span = ValidationSpan::enter(ValidationLevel::Run);

        match &run.log_schema {
            Some(schema) => Some(self.validate(ValidationLevel::Run, content, schema)),
            None => {
                emit_schema_missing(ValidationLevel::Run);
                Some(ValidationOutcome::invalid(
                    ValidationLevel::Run,
                    None,
                    RUN_SCHEMA_MISSING.to_string(),
                ))
            }
        }
    }

    /// Validate the structured log of a task.
    ///
    /// The task's own descriptor wins; otherwise `parent` (the enclosing
    /// run's descriptor) is used as a whole. Returns `None` when the task has
    /// no structured log.
    pub fn validate_task(
        &self,
        task: &TaskLog,
        parent: Option<&LogSchema>,
    ) -> Option<ValidationOutcome> {
        let content = present(task.structured_log.as_ref())?;
        let _span = ValidationSpan::enter(ValidationLevel::Task);

        let schema = match (task.log_schema.as_ref(), parent) {
            (Some(own), _) => own,
            (None, Some(inherited)) => {
                emit_schema_inherited(&inherited.schema_uri);
                inherited
            }
            (None, None) => {
                emit_schema_missing(ValidationLevel::Task);
                return Some(ValidationOutcome::invalid(
                    ValidationLevel::Task,
                    None,
                    TASK_SCHEMA_MISSING.to_string(),
                ));
            }
        };
        Some(self.validate(ValidationLevel::Task, content, schema))
    }

    /// Validate a run and each of its tasks, tasks inheriting the run's
    /// descriptor. Records without structured logs produce no outcome; the
    /// run comes first, then tasks in order.
    pub fn validate_run_with_tasks(
        &self,
        run: &RunLog,
        tasks: &[TaskLog],
    ) -> Vec<(RecordPosition, ValidationOutcome)> {
        let parent = run.log_schema.as_ref();
        let run_outcome = self
            .validate_run(run)
            .map(|outcome| (RecordPosition::Run, outcome));
        let task_outcomes = tasks.iter().enumerate().filter_map(|(i, task)| {
            self.validate_task(task, parent)
                .map(|outcome| (RecordPosition::Task(i), outcome))
        });
        run_outcome.into_iter().chain(task_outcomes).collect()
    }

    /// Shared three-stage check against an already resolved descriptor.
    pub fn validate(
        &self,
        level: ValidationLevel,
        content: &StructuredLog,
        schema: &LogSchema,
    ) -> ValidationOutcome {
        let start = Instant::now();
        let result = run_stages(content, schema);
        let elapsed = start.elapsed();

        let format = schema.format.clone();
        emit_validation_finished(
            level,
            format.as_ref().map(LogFormat::as_str).unwrap_or("unset"),
            result.is_ok(),
            elapsed,
        );

        ValidationOutcome {
            valid: result.is_ok(),
            level,
            format,
            errors: result.err().into_iter().collect(),
            elapsed,
        }
    }
}

fn present(log: Option<&StructuredLog>) -> Option<&StructuredLog> {
    log.filter(|content| !content.is_empty())
}

fn run_stages(content: &StructuredLog, schema: &LogSchema) -> Result<(), String> {
    if let Err(err) = schema.validate() {
        emit_stage_failed("descriptor", &err.to_string());
        return Err(format!("invalid log_schema: {}", err));
    }

    // Remote content cannot be checked without fetching it.
    let inline = match content {
        StructuredLog::Remote(_) => return Ok(()),
        StructuredLog::Inline(inline) => inline,
    };

    let media_type = schema.media_type_or_default();
    if let Err(reason) = check_media_type(inline, media_type) {
        emit_stage_failed("media_type", &reason);
        return Err(format!(
            "content does not match media_type {:?}: {}",
            media_type, reason
        ));
    }

    if let Err(reason) = check_format(schema.format.as_ref(), inline) {
        emit_stage_failed("format", &reason);
        return Err(format!("format validation failed: {}", reason));
    }

    Ok(())
}

/// JSON media types must carry syntactically valid JSON (any value).
/// Other media types are not inspected.
fn check_media_type(content: &str, media_type: &str) -> Result<(), String> {
    if !is_json_media_type(media_type) {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(content)
        .map(|_| ())
        .map_err(|e| format!("not valid JSON: {}", e))
}

fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(essence.as_str(), "application/json" | "application/ld+json")
}
