//! WES structured log validation
//!
//! Checks that the `structured_log` of a WES `RunLog` or `TaskLog` conforms
//! to the `log_schema` descriptor declared alongside it, with task-level
//! descriptors inherited from the enclosing run.
//!
//! ```ignore
//! let run = RunLog::new("variant-calling")
//!     .with_structured_log(r#"{"@context": "...", "@graph": []}"#)
//!     .with_log_schema(LogSchema::new("https://w3id.org/ro/crate/1.1").with_format(LogFormat::RoCrate));
//! let outcome = Validator::new().validate_run(&run);
//! ```

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod format;
pub mod obs;
pub mod record;
pub mod reporter;
pub mod telemetry;

pub use descriptor::{LogFormat, LogSchema, DEFAULT_MEDIA_TYPE};
pub use engine::{
    RecordPosition, ValidationLevel, ValidationOutcome, Validator, RUN_SCHEMA_MISSING,
    TASK_SCHEMA_MISSING,
};
pub use error::{DescriptorError, FetchError, LogSchemaError, Result};
pub use fetch::{FetchConfig, SchemaFetcher, DEFAULT_FETCH_TIMEOUT, FETCH_TIMEOUT_ENV};
pub use format::{check_format, PROV_KEYS, RO_CRATE_KEYS};
pub use obs::{
    emit_schema_fetch_failed, emit_schema_fetched, emit_schema_inherited, emit_schema_missing,
    emit_stage_failed, emit_validation_finished, ValidationSpan,
};
pub use record::{AttemptLog, RunLog, RunResponse, StructuredLog, TaskLog};
pub use reporter::{
    render_outcome, render_report_md, write_report_json, write_report_md, ReportEntry,
    ReportSummary, ValidationReport,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
