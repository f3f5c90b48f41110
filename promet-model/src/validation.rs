//! Name and label legality checks.
//!
//! Metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*` and label names must
//! match `[a-zA-Z_][a-zA-Z0-9_]*`; the `__` prefix is reserved for internal
//! use.  The checks reject instead of rewriting, so an illegal name is a
//! caller error rather than a silently different time series.

use crate::MetricError;

#[inline]
fn valid_metric_name_start_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z_:].
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

#[inline]
fn valid_metric_name_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z0-9_:].
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

#[inline]
fn valid_label_name_start_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z_].
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn valid_label_name_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z0-9_].
    c.is_ascii_alphanumeric() || c == '_'
}

/// Checks a metric name against the Prometheus data model.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if valid_metric_name_start_character(c) => {}
        _ => return false,
    }
    chars.all(valid_metric_name_character)
}

/// Checks a label name against the Prometheus data model, excluding the
/// reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if valid_label_name_start_character(c) => {}
        _ => return false,
    }
    chars.all(valid_label_name_character)
}

/// Validates a metric name, rejecting empty and illegal names.
pub fn validate_metric_name(name: &str) -> Result<(), MetricError> {
    if name.is_empty() {
        return Err(MetricError::MissingRequired("name"));
    }
    if !is_valid_metric_name(name) {
        return Err(MetricError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validates a label name.
pub fn validate_label_name(name: &str) -> Result<(), MetricError> {
    if !is_valid_label_name(name) {
        return Err(MetricError::InvalidLabel(format!("illegal label name `{name}`")));
    }
    Ok(())
}

/// Validates a label value.  Values are arbitrary UTF-8 but may not contain
/// a NUL byte, which neither text format can carry.
pub fn validate_label_value(value: &str) -> Result<(), MetricError> {
    if value.contains('\0') {
        return Err(MetricError::InvalidLabel("label value contains a NUL byte".to_string()));
    }
    Ok(())
}
