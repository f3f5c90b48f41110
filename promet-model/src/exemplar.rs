use crate::{Labels, MetricError};

/// Upper bound on the combined length, in characters, of an exemplar's
/// label names and values, from the OpenMetrics specification.
pub const MAX_EXEMPLAR_LABEL_CHARS: usize = 128;

/// A single sampled observation attached to a metric cell or histogram
/// bucket, used for trace correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar {
    labels: Labels,
    value: f64,
    timestamp_millis: Option<i64>,
}

impl Exemplar {
    /// The observed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Labels identifying the observation, trace and span ids included.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// When the observation happened, in milliseconds since the epoch.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.timestamp_millis
    }
}

/// Configuration for an [`Exemplar`].
///
/// Fill in the fields and call [`build`](ExemplarBuilder::build); trace and
/// span ids are folded into `trace_id` and `span_id` labels.
#[derive(Debug, Clone, Default)]
pub struct ExemplarBuilder {
    /// The observed value.
    pub value: f64,
    /// Labels identifying the observation.
    pub labels: Labels,
    /// When the observation happened, in milliseconds since the epoch.
    pub timestamp_millis: Option<i64>,
    /// Trace id of the observation, if any.
    pub trace_id: Option<String>,
    /// Span id of the observation, if any.
    pub span_id: Option<String>,
}

impl ExemplarBuilder {
    /// Validates the configuration and builds the exemplar.
    pub fn build(self) -> Result<Exemplar, MetricError> {
        let mut labels = self.labels;
        let mut ids = Vec::new();
        if let Some(trace_id) = self.trace_id {
            ids.push(("trace_id".to_string(), trace_id));
        }
        if let Some(span_id) = self.span_id {
            ids.push(("span_id".to_string(), span_id));
        }
        if !ids.is_empty() {
            labels = labels.merge(&Labels::from_pairs(ids)?)?;
        }

        let total: usize = labels
            .iter()
            .map(|label| label.name().chars().count() + label.value().chars().count())
            .sum();
        if total > MAX_EXEMPLAR_LABEL_CHARS {
            return Err(MetricError::InvalidLabel(format!(
                "exemplar labels are {total} characters combined, the limit is {MAX_EXEMPLAR_LABEL_CHARS}"
            )));
        }

        Ok(Exemplar { labels, value: self.value, timestamp_millis: self.timestamp_millis })
    }
}

/// An immutable, ordered collection of exemplars belonging to one data
/// record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exemplars(Vec<Exemplar>);

impl Exemplars {
    /// The empty collection.
    pub fn empty() -> Self {
        Exemplars(Vec::new())
    }

    /// Builds a collection from the given exemplars, in order.
    pub fn of<I>(exemplars: I) -> Self
    where
        I: IntoIterator<Item = Exemplar>,
    {
        Exemplars(exemplars.into_iter().collect())
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the exemplars in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Exemplar> {
        self.0.iter()
    }

    /// The newest exemplar by timestamp.  Exemplars without a timestamp
    /// lose ties; among equals, the later insertion wins.
    pub fn latest(&self) -> Option<&Exemplar> {
        self.0.iter().max_by_key(|exemplar| exemplar.timestamp_millis.unwrap_or(i64::MIN))
    }

    /// The newest exemplar whose value falls in the half-open bucket
    /// interval `(lower, upper]`.
    pub fn in_bucket(&self, lower: f64, upper: f64) -> Option<&Exemplar> {
        self.0
            .iter()
            .filter(|exemplar| exemplar.value > lower && exemplar.value <= upper)
            .max_by_key(|exemplar| exemplar.timestamp_millis.unwrap_or(i64::MIN))
    }
}
