use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use promet_model::{
    Exemplar, ExemplarBuilder, Exemplars, HistogramBuckets, HistogramData, HistogramSnapshot,
    Labels, Metadata, MetricError, MetricSnapshot, MetricType, Unit,
};

use crate::atomics::{AtomicF64, AtomicU64};
use crate::exemplar_slot::ExemplarSlot;
use crate::family;
use crate::registry::Collect;
use crate::sampler::{system_millis, AgeReplaceSampler, ExemplarSampler};

/// Default bucket bounds, matching the classic Prometheus client defaults.
pub const DEFAULT_BUCKETS: [f64; 14] =
    [0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0];

/// Returns `count` bucket bounds starting at `start`, spaced `width` apart.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|step| start + width * step as f64).collect()
}

/// Returns `count` bucket bounds starting at `start`, each `factor` times
/// the previous one.
pub fn exponential_buckets(start: f64, factor: f64, count: usize) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(count);
    let mut bound = start;
    for _ in 0..count {
        bounds.push(bound);
        bound *= factor;
    }
    bounds
}

/// Configuration for a [`Histogram`].  Fill in the fields and call
/// [`build`](HistogramBuilder::build).
pub struct HistogramBuilder {
    /// Metric name (required).
    pub name: String,
    /// Help text.
    pub help: Option<String>,
    /// Unit of the observed values.
    pub unit: Option<Unit>,
    /// Labels attached to every data record.
    pub const_labels: Labels,
    /// Names of the labels whose values select a cell.
    pub label_names: Vec<String>,
    /// Bucket upper bounds.  Sorted and deduplicated at build time; a final
    /// `+Inf` bound is appended when missing.  `NaN` is rejected.
    pub buckets: Vec<f64>,
    /// Snapshot as a gauge histogram (current-state buckets) instead of a
    /// cumulative one.
    pub gauge_histogram: bool,
    /// Whether observations may record exemplars.
    pub exemplars: bool,
    /// Sampling policy; [`AgeReplaceSampler`] when unset.
    pub sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Default for HistogramBuilder {
    fn default() -> Self {
        HistogramBuilder {
            name: String::new(),
            help: None,
            unit: None,
            const_labels: Labels::empty(),
            label_names: Vec::new(),
            buckets: DEFAULT_BUCKETS.to_vec(),
            gauge_histogram: false,
            exemplars: true,
            sampler: None,
        }
    }
}

impl HistogramBuilder {
    /// Validates the configuration and creates the histogram.
    pub fn build(self) -> Result<Histogram, MetricError> {
        let metric_type =
            if self.gauge_histogram { MetricType::GaugeHistogram } else { MetricType::Histogram };
        let metadata =
            Metadata::new(self.name, metric_type, self.help, self.unit, self.const_labels)?;
        family::validate_label_names(&self.label_names, metadata.const_labels(), Some("le"))?;

        let mut bounds = self.buckets;
        for bound in &bounds {
            if bound.is_nan() {
                return Err(MetricError::InvalidAmount(
                    "histogram bucket bound is NaN".to_string(),
                ));
            }
        }
        bounds.sort_by(f64::total_cmp);
        bounds.dedup();
        if bounds.last() != Some(&f64::INFINITY) {
            bounds.push(f64::INFINITY);
        }
        let bounds: Arc<[f64]> = bounds.into();

        let sampler = self
            .exemplars
            .then(|| self.sampler.unwrap_or_else(|| Arc::new(AgeReplaceSampler::default())));
        let unlabeled = self
            .label_names
            .is_empty()
            .then(|| Arc::new(HistogramCell::new(Arc::clone(&bounds), sampler.clone())));

        Ok(Histogram {
            metadata,
            label_names: self.label_names,
            bounds,
            cells: DashMap::new(),
            unlabeled,
            sampler,
        })
    }
}

/// Cumulative counts of observations below fixed upper bounds.
///
/// An observation lands in the first bucket whose bound is at or above the
/// value; `NaN` lands in the final `+Inf` bucket but still counts toward
/// the total.
pub struct Histogram {
    metadata: Metadata,
    label_names: Vec<String>,
    bounds: Arc<[f64]>,
    cells: DashMap<Vec<String>, Arc<HistogramCell>>,
    unlabeled: Option<Arc<HistogramCell>>,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Histogram {
    /// Handle for the cell with the given label values, created on first
    /// use.
    pub fn labels(&self, values: &[&str]) -> Result<HistogramHandle, MetricError> {
        family::validate_label_values(&self.label_names, values)?;
        let key: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        let cell = self.cells.entry(key).or_insert_with(|| {
            Arc::new(HistogramCell::new(Arc::clone(&self.bounds), self.sampler.clone()))
        });
        Ok(HistogramHandle { cell: Arc::clone(&cell) })
    }

    /// Records an observation into the unlabeled cell.
    pub fn observe(&self, value: f64) -> Result<(), MetricError> {
        self.unlabeled().map(|cell| cell.observe(value))
    }

    /// Records an observation and installs a fresh exemplar carrying
    /// `labels` on the bucket it lands in, bypassing the sampler.
    pub fn observe_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.unlabeled()?.observe_with_exemplar(value, labels)
    }

    /// The normalized bucket upper bounds, `+Inf` included.
    pub fn bucket_bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Takes an immutable snapshot of every cell.
    pub fn snapshot(&self) -> Result<HistogramSnapshot, MetricError> {
        let mut data = Vec::with_capacity(self.cells.len() + 1);
        if let Some(cell) = &self.unlabeled {
            data.push(cell.snapshot(self.metadata.const_labels().clone())?);
        }
        for entry in self.cells.iter() {
            let labels =
                family::cell_labels(self.metadata.const_labels(), &self.label_names, entry.key())?;
            data.push(entry.value().snapshot(labels)?);
        }
        HistogramSnapshot::new(self.metadata.clone(), data)
    }

    fn unlabeled(&self) -> Result<&HistogramCell, MetricError> {
        self.unlabeled.as_deref().ok_or_else(|| {
            MetricError::InvalidLabel(format!(
                "metric `{}` declares label names; select a cell with labels()",
                self.metadata.name()
            ))
        })
    }
}

impl Collect for Histogram {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}

/// A cheap, cloneable handle to one histogram cell.
#[derive(Clone)]
pub struct HistogramHandle {
    cell: Arc<HistogramCell>,
}

impl HistogramHandle {
    /// Records an observation.
    pub fn observe(&self, value: f64) {
        self.cell.observe(value);
    }

    /// Records an observation and installs a fresh exemplar carrying
    /// `labels` on the bucket it lands in, bypassing the sampler.
    pub fn observe_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.cell.observe_with_exemplar(value, labels)
    }
}

struct HistogramCell {
    bounds: Arc<[f64]>,
    counts: Box<[AtomicU64]>,
    sum: AtomicF64,
    created_millis: i64,
    exemplars: Box<[ExemplarSlot]>,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl HistogramCell {
    fn new(bounds: Arc<[f64]>, sampler: Option<Arc<dyn ExemplarSampler>>) -> Self {
        let counts = (0..bounds.len()).map(|_| AtomicU64::new(0)).collect();
        let exemplars = (0..bounds.len()).map(|_| ExemplarSlot::new()).collect();
        HistogramCell {
            bounds,
            counts,
            sum: AtomicF64::new(0.0),
            created_millis: system_millis(),
            exemplars,
            sampler,
        }
    }

    fn observe(&self, value: f64) {
        let index = self.bucket_index(value);
        self.counts[index].fetch_add(1, Ordering::Release);
        self.sum.add(value);
        if let Some(sampler) = &self.sampler {
            self.exemplars[index].offer(value, sampler.as_ref());
        }
    }

    fn observe_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        if self.sampler.is_none() {
            self.observe(value);
            return Ok(());
        }
        let exemplar = ExemplarBuilder {
            value,
            labels,
            timestamp_millis: Some(system_millis()),
            ..Default::default()
        }
        .build()?;
        let index = self.bucket_index(value);
        self.counts[index].fetch_add(1, Ordering::Release);
        self.sum.add(value);
        self.exemplars[index].replace(exemplar);
        Ok(())
    }

    /// The first bucket whose bound is at or above `value`; a value equal
    /// to a bound stays in that bucket.  `NaN` falls through to `+Inf`.
    fn bucket_index(&self, value: f64) -> usize {
        if value.is_nan() {
            return self.bounds.len() - 1;
        }
        self.bounds.partition_point(|bound| *bound < value)
    }

    fn snapshot(&self, labels: Labels) -> Result<HistogramData, MetricError> {
        // Exemplar slots first, numeric state second.
        let sampled: Vec<Exemplar> =
            self.exemplars.iter().filter_map(ExemplarSlot::peek).collect();

        let mut cumulative = 0;
        let mut pairs = Vec::with_capacity(self.bounds.len());
        for (bound, count) in self.bounds.iter().zip(self.counts.iter()) {
            cumulative += count.load(Ordering::Acquire);
            pairs.push((*bound, cumulative));
        }

        Ok(HistogramData {
            buckets: HistogramBuckets::new(pairs)?,
            sum: Some(self.sum.load()),
            labels,
            exemplars: Exemplars::of(sampled),
            created_timestamp_millis: Some(self.created_millis),
            scrape_timestamp_millis: None,
        })
    }
}
