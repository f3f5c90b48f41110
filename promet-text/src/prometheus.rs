use std::fmt::Write as _;
use std::io;

use promet_model::{
    CounterSnapshot, GaugeSnapshot, HistogramSnapshot, InfoSnapshot, Labels, MetricSnapshot,
    MetricSnapshots, StateSetSnapshot, SummaryData, SummarySnapshot, UnknownSnapshot,
};

use crate::render::{
    escape_help, finish_sample, flush_line, start_sample, write_double, write_timestamp,
};

/// MIME type of the Prometheus text format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Writes snapshot sets in the legacy Prometheus text format.
///
/// Differences from OpenMetrics: `# HELP` precedes `# TYPE`, there is no
/// `# UNIT` line and no terminal sentinel, exemplars are never emitted,
/// help text keeps raw double quotes, counters are headed under their
/// `_total` name, and `_created` series are split into companion gauge
/// blocks because older scrapers cannot parse them inline.
#[derive(Debug, Default)]
pub struct PrometheusTextWriter;

impl PrometheusTextWriter {
    /// Creates a writer.
    pub fn new() -> Self {
        PrometheusTextWriter
    }

    /// Renders `snapshots` to `out`.
    ///
    /// On I/O failure the bytes already written stay on the sink.
    pub fn write<W: io::Write>(
        &self,
        out: &mut W,
        snapshots: &MetricSnapshots,
    ) -> io::Result<()> {
        let mut line = String::new();
        for snapshot in snapshots.iter() {
            match snapshot {
                MetricSnapshot::Counter(counter) => write_counter(out, &mut line, counter)?,
                MetricSnapshot::Gauge(gauge) => write_gauge(out, &mut line, gauge)?,
                MetricSnapshot::Histogram(histogram) => {
                    write_histogram(out, &mut line, histogram)?
                }
                MetricSnapshot::Summary(summary) => write_summary(out, &mut line, summary)?,
                MetricSnapshot::Info(info) => write_info(out, &mut line, info)?,
                MetricSnapshot::StateSet(states) => write_state_set(out, &mut line, states)?,
                MetricSnapshot::Unknown(unknown) => write_unknown(out, &mut line, unknown)?,
            }
        }
        Ok(())
    }
}

fn write_headers<W: io::Write>(
    out: &mut W,
    line: &mut String,
    name: &str,
    help: Option<&str>,
    type_literal: &str,
) -> io::Result<()> {
    if let Some(help) = help {
        line.push_str("# HELP ");
        line.push_str(name);
        line.push(' ');
        escape_help(line, help, false);
        flush_line(out, line)?;
    }
    line.push_str("# TYPE ");
    line.push_str(name);
    line.push(' ');
    line.push_str(type_literal);
    flush_line(out, line)
}

/// Emits the `<name>_created` series of a metric as its own gauge block,
/// skipped entirely when no record carries a creation timestamp.
fn write_created_block<'a, W, I>(
    out: &mut W,
    line: &mut String,
    name: &str,
    help: Option<&str>,
    records: I,
) -> io::Result<()>
where
    W: io::Write,
    I: Iterator<Item = (&'a Labels, Option<i64>, Option<i64>)> + Clone,
{
    if !records.clone().any(|(_, created, _)| created.is_some()) {
        return Ok(());
    }
    let created_name = format!("{name}_created");
    write_headers(out, line, &created_name, help, "gauge")?;
    for (labels, created, scrape) in records {
        let Some(created) = created else { continue };
        start_sample(line, &created_name, "", labels, None);
        write_timestamp(line, created);
        finish_sample(line, scrape, None);
        flush_line(out, line)?;
    }
    Ok(())
}

fn write_counter<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &CounterSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    let total_name = format!("{}_total", metadata.name());
    write_headers(out, line, &total_name, metadata.help(), "counter")?;
    for record in snapshot.data() {
        start_sample(line, &total_name, "", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;
    }
    write_created_block(
        out,
        line,
        metadata.name(),
        metadata.help(),
        snapshot.data().iter().map(|record| {
            (&record.labels, record.created_timestamp_millis, record.scrape_timestamp_millis)
        }),
    )
}

fn write_gauge<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &GaugeSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "gauge")?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;
    }
    Ok(())
}

fn write_histogram<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &HistogramSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    if snapshot.is_gauge_histogram() {
        return write_gauge_histogram(out, line, snapshot);
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "histogram")?;

    let mut bound = String::new();
    for record in snapshot.data() {
        for bucket in record.buckets.iter() {
            bound.clear();
            write_double(&mut bound, bucket.upper_bound());
            start_sample(line, metadata.name(), "_bucket", &record.labels, Some(("le", &bound)));
            let _ = write!(line, "{}", bucket.cumulative_count());
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }

        // Unlike OpenMetrics, a count line is always present: it is
        // synthesized from the +Inf bucket when no sum was tracked.
        start_sample(line, metadata.name(), "_count", &record.labels, None);
        let _ = write!(line, "{}", record.count());
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;

        if let Some(sum) = record.sum {
            start_sample(line, metadata.name(), "_sum", &record.labels, None);
            write_double(line, sum);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }
    write_created_block(
        out,
        line,
        metadata.name(),
        metadata.help(),
        snapshot.data().iter().map(|record| {
            (&record.labels, record.created_timestamp_millis, record.scrape_timestamp_millis)
        }),
    )
}

/// Prometheus has no native gauge-histogram type: the buckets render as a
/// plain histogram, while `_gcount` and `_gsum` become companion gauge
/// blocks.  The `_gcount` block is always emitted.
fn write_gauge_histogram<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &HistogramSnapshot,
) -> io::Result<()> {
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "histogram")?;

    let mut bound = String::new();
    for record in snapshot.data() {
        for bucket in record.buckets.iter() {
            bound.clear();
            write_double(&mut bound, bucket.upper_bound());
            start_sample(line, metadata.name(), "_bucket", &record.labels, Some(("le", &bound)));
            let _ = write!(line, "{}", bucket.cumulative_count());
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }

    let gcount_name = format!("{}_gcount", metadata.name());
    write_headers(out, line, &gcount_name, metadata.help(), "gauge")?;
    for record in snapshot.data() {
        start_sample(line, &gcount_name, "", &record.labels, None);
        let _ = write!(line, "{}", record.count());
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;
    }

    if snapshot.data().iter().any(|record| record.sum.is_some()) {
        let gsum_name = format!("{}_gsum", metadata.name());
        write_headers(out, line, &gsum_name, metadata.help(), "gauge")?;
        for record in snapshot.data() {
            let Some(sum) = record.sum else { continue };
            start_sample(line, &gsum_name, "", &record.labels, None);
            write_double(line, sum);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }

    write_created_block(
        out,
        line,
        metadata.name(),
        metadata.help(),
        snapshot.data().iter().map(|record| {
            (&record.labels, record.created_timestamp_millis, record.scrape_timestamp_millis)
        }),
    )
}

fn write_summary<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &SummarySnapshot,
) -> io::Result<()> {
    if snapshot.data().iter().all(SummaryData::is_empty) {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "summary")?;

    let mut quantile = String::new();
    for record in snapshot.data() {
        if record.is_empty() {
            continue;
        }
        for reported in record.quantiles.iter() {
            quantile.clear();
            write_double(&mut quantile, reported.quantile());
            start_sample(line, metadata.name(), "", &record.labels, Some(("quantile", &quantile)));
            write_double(line, reported.value());
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
        if let Some(count) = record.count {
            start_sample(line, metadata.name(), "_count", &record.labels, None);
            let _ = write!(line, "{count}");
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
        if let Some(sum) = record.sum {
            start_sample(line, metadata.name(), "_sum", &record.labels, None);
            write_double(line, sum);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }
    write_created_block(
        out,
        line,
        metadata.name(),
        metadata.help(),
        snapshot.data().iter().filter(|record| !record.is_empty()).map(|record| {
            (&record.labels, record.created_timestamp_millis, record.scrape_timestamp_millis)
        }),
    )
}

fn write_info<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &InfoSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    let info_name = format!("{}_info", metadata.name());
    write_headers(out, line, &info_name, metadata.help(), "gauge")?;
    for record in snapshot.data() {
        start_sample(line, &info_name, "", &record.labels, None);
        line.push('1');
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;
    }
    Ok(())
}

fn write_state_set<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &StateSetSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "gauge")?;
    for record in snapshot.data() {
        for (state, enabled) in record.states() {
            start_sample(line, metadata.name(), "", record.labels(), Some(("state", state)));
            line.push(if enabled { '1' } else { '0' });
            finish_sample(line, record.scrape_timestamp_millis(), None);
            flush_line(out, line)?;
        }
    }
    Ok(())
}

fn write_unknown<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &UnknownSnapshot,
) -> io::Result<()> {
    if snapshot.data().is_empty() {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata.name(), metadata.help(), "untyped")?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, None);
        flush_line(out, line)?;
    }
    Ok(())
}
