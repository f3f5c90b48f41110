use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use promet_model::{
    ExemplarBuilder, Exemplars, Labels, Metadata, MetricError, MetricSnapshot, MetricType,
    Quantile, Quantiles, SummaryData, SummarySnapshot, Unit,
};
use sketches_ddsketch::{Config, DDSketch};

use crate::atomics::{AtomicF64, AtomicU64};
use crate::exemplar_slot::ExemplarSlot;
use crate::family;
use crate::registry::Collect;
use crate::sampler::{system_millis, AgeReplaceSampler, ExemplarSampler};

/// Streaming quantile estimation fed by summary observations.
///
/// The estimation algorithm is a plug point; the summary only requires that
/// whatever quantiles the estimator reports serialize deterministically.
pub trait QuantileEstimator: Send {
    /// Records one observation.
    fn observe(&mut self, value: f64);

    /// The estimated value at quantile `q` within `0.0..=1.0`, or `None`
    /// when no estimate exists yet.
    fn quantile(&self, q: f64) -> Option<f64>;
}

/// Factory producing a fresh estimator for each new summary cell.
pub type EstimatorFactory = Arc<dyn Fn() -> Box<dyn QuantileEstimator> + Send + Sync>;

/// The default estimator: a DDSketch with relative-error guarantees.
pub struct SketchEstimator {
    sketch: DDSketch,
}

impl SketchEstimator {
    /// Creates an estimator with the default sketch configuration.
    pub fn new() -> Self {
        SketchEstimator { sketch: DDSketch::new(Config::defaults()) }
    }
}

impl Default for SketchEstimator {
    fn default() -> Self {
        SketchEstimator::new()
    }
}

impl QuantileEstimator for SketchEstimator {
    fn observe(&mut self, value: f64) {
        self.sketch.add(value);
    }

    fn quantile(&self, q: f64) -> Option<f64> {
        self.sketch.quantile(q).ok().flatten()
    }
}

/// Configuration for a [`Summary`].  Fill in the fields and call
/// [`build`](SummaryBuilder::build).
pub struct SummaryBuilder {
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
    /// Quantiles reported by each cell, within `0.0..=1.0`.  Empty means
    /// only count and sum are tracked.
    pub quantiles: Vec<f64>,
    /// Estimator factory; a DDSketch-backed [`SketchEstimator`] when unset.
    pub estimator: Option<EstimatorFactory>,
    /// Whether observations may record exemplars.
    pub exemplars: bool,
    /// Sampling policy; [`AgeReplaceSampler`] when unset.
    pub sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        SummaryBuilder {
            name: String::new(),
            help: None,
            unit: None,
            const_labels: Labels::empty(),
            label_names: Vec::new(),
            quantiles: Vec::new(),
            estimator: None,
            exemplars: true,
            sampler: None,
        }
    }
}

impl SummaryBuilder {
    /// Validates the configuration and creates the summary.
    pub fn build(self) -> Result<Summary, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::Summary, self.help, self.unit, self.const_labels)?;
        family::validate_label_names(&self.label_names, metadata.const_labels(), Some("quantile"))?;

        let mut quantiles = self.quantiles;
        for q in &quantiles {
            if !(0.0..=1.0).contains(q) {
                return Err(MetricError::InvalidAmount(format!(
                    "quantile {q} is outside 0.0..=1.0"
                )));
            }
        }
        quantiles.sort_by(f64::total_cmp);
        quantiles.dedup();
        let quantiles: Arc<[f64]> = quantiles.into();

        let estimator = if quantiles.is_empty() {
            None
        } else {
            Some(self.estimator.unwrap_or_else(|| {
                Arc::new(|| Box::new(SketchEstimator::new()) as Box<dyn QuantileEstimator>)
            }))
        };
        let sampler = self
            .exemplars
            .then(|| self.sampler.unwrap_or_else(|| Arc::new(AgeReplaceSampler::default())));
        let unlabeled = self.label_names.is_empty().then(|| {
            Arc::new(SummaryCell::new(estimator.as_deref().map(|make| make()), sampler.clone()))
        });

        Ok(Summary {
            metadata,
            label_names: self.label_names,
            quantiles,
            estimator,
            cells: DashMap::new(),
            unlabeled,
            sampler,
        })
    }
}

/// Count, sum, and estimated quantiles over observations.
pub struct Summary {
    metadata: Metadata,
    label_names: Vec<String>,
    quantiles: Arc<[f64]>,
    estimator: Option<EstimatorFactory>,
    cells: DashMap<Vec<String>, Arc<SummaryCell>>,
    unlabeled: Option<Arc<SummaryCell>>,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Summary {
    /// Handle for the cell with the given label values, created on first
    /// use.
    pub fn labels(&self, values: &[&str]) -> Result<SummaryHandle, MetricError> {
        family::validate_label_values(&self.label_names, values)?;
        let key: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        let cell = self.cells.entry(key).or_insert_with(|| {
            Arc::new(SummaryCell::new(
                self.estimator.as_deref().map(|make| make()),
                self.sampler.clone(),
            ))
        });
        Ok(SummaryHandle { cell: Arc::clone(&cell) })
    }

    /// Records an observation into the unlabeled cell.
    pub fn observe(&self, value: f64) -> Result<(), MetricError> {
        self.unlabeled().map(|cell| cell.observe(value))
    }

    /// Records an observation and installs a fresh exemplar carrying
    /// `labels`, bypassing the sampler.
    pub fn observe_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.unlabeled()?.observe_with_exemplar(value, labels)
    }

    /// Takes an immutable snapshot of every cell.
    pub fn snapshot(&self) -> Result<SummarySnapshot, MetricError> {
        let mut data = Vec::with_capacity(self.cells.len() + 1);
        if let Some(cell) = &self.unlabeled {
            data.push(cell.snapshot(self.metadata.const_labels().clone(), &self.quantiles)?);
        }
        for entry in self.cells.iter() {
            let labels =
                family::cell_labels(self.metadata.const_labels(), &self.label_names, entry.key())?;
            data.push(entry.value().snapshot(labels, &self.quantiles)?);
        }
        SummarySnapshot::new(self.metadata.clone(), data)
    }

    fn unlabeled(&self) -> Result<&SummaryCell, MetricError> {
        self.unlabeled.as_deref().ok_or_else(|| {
            MetricError::InvalidLabel(format!(
                "metric `{}` declares label names; select a cell with labels()",
                self.metadata.name()
            ))
        })
    }
}

impl Collect for Summary {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}

/// A cheap, cloneable handle to one summary cell.
#[derive(Clone)]
pub struct SummaryHandle {
    cell: Arc<SummaryCell>,
}

impl SummaryHandle {
    /// Records an observation.
    pub fn observe(&self, value: f64) {
        self.cell.observe(value);
    }

    /// Records an observation and installs a fresh exemplar carrying
    /// `labels`, bypassing the sampler.
    pub fn observe_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.cell.observe_with_exemplar(value, labels)
    }
}

struct SummaryCell {
    count: AtomicU64,
    sum: AtomicF64,
    estimator: Option<Mutex<Box<dyn QuantileEstimator>>>,
    created_millis: i64,
    exemplar: ExemplarSlot,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl SummaryCell {
    fn new(
        estimator: Option<Box<dyn QuantileEstimator>>,
        sampler: Option<Arc<dyn ExemplarSampler>>,
    ) -> Self {
        SummaryCell {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
            estimator: estimator.map(Mutex::new),
            created_millis: system_millis(),
            exemplar: ExemplarSlot::new(),
            sampler,
        }
    }

    fn observe(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Release);
        self.sum.add(value);
        if let Some(estimator) = &self.estimator {
            estimator.lock().observe(value);
        }
        if let Some(sampler) = &self.sampler {
            self.exemplar.offer(value, sampler.as_ref());
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
        self.count.fetch_add(1, Ordering::Release);
        self.sum.add(value);
        if let Some(estimator) = &self.estimator {
            estimator.lock().observe(value);
        }
        self.exemplar.replace(exemplar);
        Ok(())
    }

    fn snapshot(&self, labels: Labels, grid: &[f64]) -> Result<SummaryData, MetricError> {
        // Exemplar slot first, numeric state second.
        let exemplars = Exemplars::of(self.exemplar.peek());

        let quantiles = match &self.estimator {
            None => Quantiles::empty(),
            Some(estimator) => {
                let estimator = estimator.lock();
                let mut reported = Vec::with_capacity(grid.len());
                for q in grid {
                    if let Some(value) = estimator.quantile(*q) {
                        reported.push(Quantile::new(*q, value)?);
                    }
                }
                Quantiles::new(reported)
            }
        };

        Ok(SummaryData {
            count: Some(self.count.load(Ordering::Acquire)),
            sum: Some(self.sum.load()),
            quantiles,
            labels,
            exemplars,
            created_timestamp_millis: Some(self.created_millis),
            scrape_timestamp_millis: None,
        })
    }
}
