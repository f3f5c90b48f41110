//! Shared line-assembly helpers for both text formats.
//!
//! Lines are built in a reusable `String` and flushed to the sink whole, so
//! an I/O failure never leaves a partial line behind it unreported.

use std::fmt::Write as _;
use std::io;

use promet_model::{Exemplar, Labels};

/// Escapes a label value: backslash, double quote, and newline.
pub(crate) fn escape_label_value(buf: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '"' => buf.push_str("\\\""),
            '\n' => buf.push_str("\\n"),
            c => buf.push(c),
        }
    }
}

/// Escapes help text.  Both formats escape backslash and newline; only
/// OpenMetrics escapes the double quote.
pub(crate) fn escape_help(buf: &mut String, help: &str, escape_quotes: bool) {
    for c in help.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '"' if escape_quotes => buf.push_str("\\\""),
            '\n' => buf.push_str("\\n"),
            c => buf.push(c),
        }
    }
}

/// Writes a floating-point sample value.
///
/// Infinities render as `+Inf`/`-Inf` and NaN as `NaN`.  Finite values use
/// the shortest decimal that round-trips, except that whole values keep a
/// trailing `.0` (`17.0`, not `17`), matching what scrapers receive from
/// the reference clients.
pub(crate) fn write_double(buf: &mut String, value: f64) {
    if value.is_nan() {
        buf.push_str("NaN");
    } else if value == f64::INFINITY {
        buf.push_str("+Inf");
    } else if value == f64::NEG_INFINITY {
        buf.push_str("-Inf");
    } else if value == value.trunc() && value.abs() < 1e15 {
        let _ = write!(buf, "{value:.1}");
    } else {
        let _ = write!(buf, "{value}");
    }
}

/// Writes an epoch-millisecond timestamp as seconds with exactly three
/// decimal places (`1672850685.829`).
pub(crate) fn write_timestamp(buf: &mut String, millis: i64) {
    let _ = write!(buf, "{}.{:03}", millis / 1000, (millis % 1000).abs());
}

/// Writes the `{...}` label block, omitted entirely when there is nothing
/// to put in it.  `extra` is a format-owned label such as `le` or
/// `quantile`, emitted after the canonical labels.
pub(crate) fn write_label_block(buf: &mut String, labels: &Labels, extra: Option<(&str, &str)>) {
    if labels.is_empty() && extra.is_none() {
        return;
    }
    buf.push('{');
    let mut first = true;
    for label in labels {
        if !first {
            buf.push(',');
        }
        first = false;
        buf.push_str(label.name());
        buf.push_str("=\"");
        escape_label_value(buf, label.value());
        buf.push('"');
    }
    if let Some((name, value)) = extra {
        if !first {
            buf.push(',');
        }
        buf.push_str(name);
        buf.push_str("=\"");
        escape_label_value(buf, value);
        buf.push('"');
    }
    buf.push('}');
}

/// Starts a sample line: suffixed metric name, label block, and the space
/// before the value.
pub(crate) fn start_sample(
    buf: &mut String,
    name: &str,
    suffix: &str,
    labels: &Labels,
    extra: Option<(&str, &str)>,
) {
    buf.push_str(name);
    buf.push_str(suffix);
    write_label_block(buf, labels, extra);
    buf.push(' ');
}

/// Ends a sample line: optional scrape timestamp, then an optional
/// exemplar comment (OpenMetrics only; Prometheus callers pass `None`).
pub(crate) fn finish_sample(
    buf: &mut String,
    scrape_timestamp_millis: Option<i64>,
    exemplar: Option<&Exemplar>,
) {
    if let Some(timestamp) = scrape_timestamp_millis {
        buf.push(' ');
        write_timestamp(buf, timestamp);
    }
    if let Some(exemplar) = exemplar {
        write_exemplar(buf, exemplar);
    }
}

/// Writes ` # {labels} value [timestamp]` after a sample value.  The
/// braces are mandatory even for an empty label set.
pub(crate) fn write_exemplar(buf: &mut String, exemplar: &Exemplar) {
    buf.push_str(" # {");
    let mut first = true;
    for label in exemplar.labels() {
        if !first {
            buf.push(',');
        }
        first = false;
        buf.push_str(label.name());
        buf.push_str("=\"");
        escape_label_value(buf, label.value());
        buf.push('"');
    }
    buf.push_str("} ");
    write_double(buf, exemplar.value());
    if let Some(timestamp) = exemplar.timestamp_millis() {
        buf.push(' ');
        write_timestamp(buf, timestamp);
    }
}

/// Terminates the buffered line and flushes it to the sink.
pub(crate) fn flush_line<W: io::Write>(out: &mut W, line: &mut String) -> io::Result<()> {
    line.push('\n');
    let result = out.write_all(line.as_bytes());
    line.clear();
    result
}
