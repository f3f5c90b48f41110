//! Text exposition writers.
//!
//! Two writers turn a [`promet_model::MetricSnapshots`] set into the
//! line-based exposition formats scrapers consume: the OpenMetrics text
//! format and the legacy Prometheus text format.  Rendering is
//! deterministic byte-for-byte: snapshot sets are name-ordered, data
//! records are label-ordered, and numeric formatting is fixed.
#![deny(missing_docs)]

mod openmetrics;
mod prometheus;
mod render;

pub use self::openmetrics::{OpenMetricsTextWriter, OPENMETRICS_CONTENT_TYPE};
pub use self::prometheus::{PrometheusTextWriter, PROMETHEUS_CONTENT_TYPE};
