//! Structured observability hooks for validation and fetch events.
//!
//! This module provides:
//! - Validation-scoped tracing spans via the `ValidationSpan` RAII guard
//! - Emission functions for validation outcomes, missing descriptors and
//!   remote schema fetches
//!
//! Events are emitted at `info!` level unless noted (filter with `RUST_LOG`).

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::ValidationLevel;

/// RAII guard that enters a span for the duration of one validation.
///
/// # Example
///
/// ```ignore
/// let _span = ValidationSpan::enter(ValidationLevel::Task);
/// // tracing calls in this scope carry validation_level = "task"
/// ```
pub struct ValidationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ValidationSpan {
    pub fn enter(level: ValidationLevel) -> Self {
        let span = tracing::debug_span!("logschema.validate", validation_level = %level);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a validation finished.
pub fn emit_validation_finished(
    level: ValidationLevel,
    format: &str,
    valid: bool,
    elapsed: Duration,
) {
    info!(
        event = "validation.finished",
        validation_level = %level,
        format = %format,
        valid = valid,
        elapsed_us = elapsed.as_micros() as u64,
    );
}

/// Emit event: a stage rejected the content (debug level).
pub fn emit_stage_failed(stage: &str, reason: &str) {
    debug!(event = "validation.stage_failed", stage = %stage, reason = %reason);
}

/// Emit event: structured content has no descriptor (warning level).
pub fn emit_schema_missing(level: ValidationLevel) {
    warn!(event = "validation.schema_missing", validation_level = %level);
}

/// Emit event: a task adopted the run's descriptor.
pub fn emit_schema_inherited(schema_uri: &str) {
    debug!(event = "validation.schema_inherited", schema_uri = %schema_uri);
}

/// Emit event: remote schema document retrieved.
pub fn emit_schema_fetched(schema_uri: &str, bytes: usize) {
    info!(event = "schema.fetched", schema_uri = %schema_uri, bytes = bytes);
}

/// Emit event: remote schema fetch failed (warning level).
pub fn emit_schema_fetch_failed(schema_uri: &str, error: &dyn std::fmt::Display) {
    warn!(event = "schema.fetch_failed", schema_uri = %schema_uri, error = %error);
}
