use std::fmt::Write as _;
use std::io;

use promet_model::{
    CounterSnapshot, GaugeSnapshot, HistogramSnapshot, InfoSnapshot, Metadata, MetricSnapshot,
    MetricSnapshots, StateSetSnapshot, SummaryData, SummarySnapshot, UnknownSnapshot,
};

use crate::render::{
    escape_help, finish_sample, flush_line, start_sample, write_double, write_timestamp,
};

/// MIME type of the OpenMetrics text format.
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Writes snapshot sets in the OpenMetrics text format.
///
/// Per metric: `# TYPE`, then `# UNIT` and `# HELP` when present, then the
/// sample lines of each data record in snapshot order.  A single `# EOF`
/// terminates the document, even for an empty set.
#[derive(Debug, Default)]
pub struct OpenMetricsTextWriter;

impl OpenMetricsTextWriter {
    /// Creates a writer.
    pub fn new() -> Self {
        OpenMetricsTextWriter
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
        out.write_all(b"# EOF\n")
    }
}

fn write_headers<W: io::Write>(
    out: &mut W,
    line: &mut String,
    metadata: &Metadata,
) -> io::Result<()> {
    line.push_str("# TYPE ");
    line.push_str(metadata.name());
    line.push(' ');
    line.push_str(metadata.metric_type().as_str());
    flush_line(out, line)?;

    if let Some(unit) = metadata.unit() {
        line.push_str("# UNIT ");
        line.push_str(metadata.name());
        line.push(' ');
        line.push_str(unit.as_str());
        flush_line(out, line)?;
    }
    if let Some(help) = metadata.help() {
        line.push_str("# HELP ");
        line.push_str(metadata.name());
        line.push(' ');
        escape_help(line, help, true);
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
    write_headers(out, line, metadata)?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "_total", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, record.exemplar.as_ref());
        flush_line(out, line)?;

        if let Some(created) = record.created_timestamp_millis {
            start_sample(line, metadata.name(), "_created", &record.labels, None);
            write_timestamp(line, created);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }
    Ok(())
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
    write_headers(out, line, metadata)?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, record.exemplar.as_ref());
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
    let metadata = snapshot.metadata();
    let (count_suffix, sum_suffix) =
        if snapshot.is_gauge_histogram() { ("_gcount", "_gsum") } else { ("_count", "_sum") };
    write_headers(out, line, metadata)?;

    let mut bound = String::new();
    for record in snapshot.data() {
        let mut lower = f64::NEG_INFINITY;
        for bucket in record.buckets.iter() {
            bound.clear();
            write_double(&mut bound, bucket.upper_bound());
            start_sample(line, metadata.name(), "_bucket", &record.labels, Some(("le", &bound)));
            let _ = write!(line, "{}", bucket.cumulative_count());
            let exemplar = record.exemplars.in_bucket(lower, bucket.upper_bound());
            finish_sample(line, record.scrape_timestamp_millis, exemplar);
            flush_line(out, line)?;
            lower = bucket.upper_bound();
        }

        // A histogram may carry a count line if and only if it carries a
        // sum line.
        if let Some(sum) = record.sum {
            start_sample(line, metadata.name(), count_suffix, &record.labels, None);
            let _ = write!(line, "{}", record.count());
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;

            start_sample(line, metadata.name(), sum_suffix, &record.labels, None);
            write_double(line, sum);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
        if let Some(created) = record.created_timestamp_millis {
            start_sample(line, metadata.name(), "_created", &record.labels, None);
            write_timestamp(line, created);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }
    Ok(())
}

fn write_summary<W: io::Write>(
    out: &mut W,
    line: &mut String,
    snapshot: &SummarySnapshot,
) -> io::Result<()> {
    // Empty records produce no lines; the headers are suppressed only when
    // every record is empty.
    if snapshot.data().iter().all(SummaryData::is_empty) {
        return Ok(());
    }
    let metadata = snapshot.metadata();
    write_headers(out, line, metadata)?;

    let mut quantile = String::new();
    for record in snapshot.data() {
        if record.is_empty() {
            continue;
        }
        let exemplar = record.exemplars.latest();
        for reported in record.quantiles.iter() {
            quantile.clear();
            write_double(&mut quantile, reported.quantile());
            start_sample(line, metadata.name(), "", &record.labels, Some(("quantile", &quantile)));
            write_double(line, reported.value());
            finish_sample(line, record.scrape_timestamp_millis, exemplar);
            flush_line(out, line)?;
        }
        if let Some(count) = record.count {
            start_sample(line, metadata.name(), "_count", &record.labels, None);
            let _ = write!(line, "{count}");
            finish_sample(line, record.scrape_timestamp_millis, exemplar);
            flush_line(out, line)?;
        }
        if let Some(sum) = record.sum {
            start_sample(line, metadata.name(), "_sum", &record.labels, None);
            write_double(line, sum);
            finish_sample(line, record.scrape_timestamp_millis, exemplar);
            flush_line(out, line)?;
        }
        if let Some(created) = record.created_timestamp_millis {
            start_sample(line, metadata.name(), "_created", &record.labels, None);
            write_timestamp(line, created);
            finish_sample(line, record.scrape_timestamp_millis, None);
            flush_line(out, line)?;
        }
    }
    Ok(())
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
    write_headers(out, line, metadata)?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "_info", &record.labels, None);
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
    write_headers(out, line, metadata)?;
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
    write_headers(out, line, metadata)?;
    for record in snapshot.data() {
        start_sample(line, metadata.name(), "", &record.labels, None);
        write_double(line, record.value);
        finish_sample(line, record.scrape_timestamp_millis, record.exemplar.as_ref());
        flush_line(out, line)?;
    }
    Ok(())
}
