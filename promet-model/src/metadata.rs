use crate::{validation, Labels, MetricError};

/// The eight metric kinds of the OpenMetrics data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// A monotonically increasing value.
    Counter,
    /// A value that can go up and down.
    Gauge,
    /// Cumulative counts of observations below fixed upper bounds.
    Histogram,
    /// A histogram whose buckets describe current state rather than an
    /// ever-growing tally.
    GaugeHistogram,
    /// Count, sum, and estimated quantiles over observations.
    Summary,
    /// Constant metadata exposed as labels with a fixed value of 1.
    Info,
    /// A set of named boolean states.
    StateSet,
    /// A value whose semantics the producer does not know.
    Unknown,
}

impl MetricType {
    /// The literal used by the OpenMetrics `# TYPE` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::GaugeHistogram => "gaugehistogram",
            MetricType::Summary => "summary",
            MetricType::Info => "info",
            MetricType::StateSet => "stateset",
            MetricType::Unknown => "unknown",
        }
    }
}

/// A unit of measurement, named the way the exposition formats expect it
/// as a metric-name suffix (`seconds`, `bytes`, `ratio`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit(String);

impl Unit {
    /// A custom unit.
    pub fn new<S: Into<String>>(unit: S) -> Unit {
        Unit(unit.into())
    }

    /// Seconds.
    pub fn seconds() -> Unit {
        Unit::new("seconds")
    }

    /// Bytes.
    pub fn bytes() -> Unit {
        Unit::new("bytes")
    }

    /// A dimensionless ratio.
    pub fn ratio() -> Unit {
        Unit::new("ratio")
    }

    /// The unit name as written on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Descriptive metadata shared by every snapshot of one metric: its name,
/// kind, optional help text and unit, and the labels attached to every data
/// record it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    name: String,
    metric_type: MetricType,
    help: Option<String>,
    unit: Option<Unit>,
    const_labels: Labels,
}

impl Metadata {
    /// Validates the metric name and assembles the metadata.
    pub fn new(
        name: impl Into<String>,
        metric_type: MetricType,
        help: Option<String>,
        unit: Option<Unit>,
        const_labels: Labels,
    ) -> Result<Self, MetricError> {
        let name = name.into();
        validation::validate_metric_name(&name)?;
        Ok(Metadata { name, metric_type, help, unit, const_labels })
    }

    /// The metric name, without any exposition suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metric kind.
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Help text, if set.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Unit, if set.
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// Labels attached to every data record of this metric.
    pub fn const_labels(&self) -> &Labels {
        &self.const_labels
    }
}
