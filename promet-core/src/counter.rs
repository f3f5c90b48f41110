use std::sync::Arc;

use dashmap::DashMap;
use promet_model::{
    CounterData, CounterSnapshot, ExemplarBuilder, Labels, Metadata, MetricError, MetricSnapshot,
    MetricType, Unit,
};

use crate::atomics::AtomicF64;
use crate::exemplar_slot::ExemplarSlot;
use crate::family;
use crate::registry::Collect;
use crate::sampler::{system_millis, AgeReplaceSampler, ExemplarSampler};

/// Configuration for a [`Counter`].  Fill in the fields and call
/// [`build`](CounterBuilder::build).
pub struct CounterBuilder {
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
    /// Whether observations may record exemplars.
    pub exemplars: bool,
    /// Sampling policy; [`AgeReplaceSampler`] when unset.
    pub sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Default for CounterBuilder {
    fn default() -> Self {
        CounterBuilder {
            name: String::new(),
            help: None,
            unit: None,
            const_labels: Labels::empty(),
            label_names: Vec::new(),
            exemplars: true,
            sampler: None,
        }
    }
}

impl CounterBuilder {
    /// Validates the configuration and creates the counter.
    pub fn build(self) -> Result<Counter, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::Counter, self.help, self.unit, self.const_labels)?;
        family::validate_label_names(&self.label_names, metadata.const_labels(), None)?;

        let sampler = self
            .exemplars
            .then(|| self.sampler.unwrap_or_else(|| Arc::new(AgeReplaceSampler::default())));
        let unlabeled =
            self.label_names.is_empty().then(|| Arc::new(CounterCell::new(sampler.clone())));

        Ok(Counter {
            metadata,
            label_names: self.label_names,
            cells: DashMap::new(),
            unlabeled,
            sampler,
        })
    }
}

/// A monotonically non-decreasing metric.
///
/// Negative and `NaN` increments are rejected without mutating the value.
pub struct Counter {
    metadata: Metadata,
    label_names: Vec<String>,
    cells: DashMap<Vec<String>, Arc<CounterCell>>,
    unlabeled: Option<Arc<CounterCell>>,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Counter {
    /// Handle for the cell with the given label values, created on first
    /// use.
    pub fn labels(&self, values: &[&str]) -> Result<CounterHandle, MetricError> {
        family::validate_label_values(&self.label_names, values)?;
        let key: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        let cell =
            self.cells.entry(key).or_insert_with(|| Arc::new(CounterCell::new(self.sampler.clone())));
        Ok(CounterHandle { cell: Arc::clone(&cell) })
    }

    /// Increments the unlabeled cell by 1.
    pub fn inc(&self) -> Result<(), MetricError> {
        self.inc_by(1.0)
    }

    /// Increments the unlabeled cell by `amount`.
    pub fn inc_by(&self, amount: f64) -> Result<(), MetricError> {
        self.unlabeled()?.inc_by(amount)
    }

    /// Increments the unlabeled cell and installs a fresh exemplar carrying
    /// `labels`, bypassing the sampler.
    pub fn inc_by_with_exemplar(&self, amount: f64, labels: Labels) -> Result<(), MetricError> {
        self.unlabeled()?.inc_by_with_exemplar(amount, labels)
    }

    /// Takes an immutable snapshot of every cell.
    pub fn snapshot(&self) -> Result<CounterSnapshot, MetricError> {
        let mut data = Vec::with_capacity(self.cells.len() + 1);
        if let Some(cell) = &self.unlabeled {
            data.push(cell.snapshot(self.metadata.const_labels().clone()));
        }
        for entry in self.cells.iter() {
            let labels =
                family::cell_labels(self.metadata.const_labels(), &self.label_names, entry.key())?;
            data.push(entry.value().snapshot(labels));
        }
        CounterSnapshot::new(self.metadata.clone(), data)
    }

    fn unlabeled(&self) -> Result<&CounterCell, MetricError> {
        self.unlabeled.as_deref().ok_or_else(|| {
            MetricError::InvalidLabel(format!(
                "metric `{}` declares label names; select a cell with labels()",
                self.metadata.name()
            ))
        })
    }
}

impl Collect for Counter {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}

/// A cheap, cloneable handle to one counter cell.
#[derive(Clone)]
pub struct CounterHandle {
    cell: Arc<CounterCell>,
}

impl CounterHandle {
    /// Increments the counter by 1.
    pub fn inc(&self) -> Result<(), MetricError> {
        self.cell.inc_by(1.0)
    }

    /// Increments the counter by `amount`.
    pub fn inc_by(&self, amount: f64) -> Result<(), MetricError> {
        self.cell.inc_by(amount)
    }

    /// Increments the counter and installs a fresh exemplar carrying
    /// `labels`, bypassing the sampler.
    pub fn inc_by_with_exemplar(&self, amount: f64, labels: Labels) -> Result<(), MetricError> {
        self.cell.inc_by_with_exemplar(amount, labels)
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        self.cell.value.load()
    }
}

struct CounterCell {
    value: AtomicF64,
    created_millis: i64,
    exemplar: ExemplarSlot,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl CounterCell {
    fn new(sampler: Option<Arc<dyn ExemplarSampler>>) -> Self {
        CounterCell {
            value: AtomicF64::new(0.0),
            created_millis: system_millis(),
            exemplar: ExemplarSlot::new(),
            sampler,
        }
    }

    fn inc_by(&self, amount: f64) -> Result<(), MetricError> {
        self.validate_and_add(amount)?;
        if let Some(sampler) = &self.sampler {
            self.exemplar.offer(amount, sampler.as_ref());
        }
        Ok(())
    }

    fn inc_by_with_exemplar(&self, amount: f64, labels: Labels) -> Result<(), MetricError> {
        if self.sampler.is_none() {
            return self.validate_and_add(amount);
        }
        // Build the exemplar up front so an invalid one leaves the value
        // untouched.
        let exemplar = ExemplarBuilder {
            value: amount,
            labels,
            timestamp_millis: Some(system_millis()),
            ..Default::default()
        }
        .build()?;
        self.validate_and_add(amount)?;
        self.exemplar.replace(exemplar);
        Ok(())
    }

    fn validate_and_add(&self, amount: f64) -> Result<(), MetricError> {
        if amount.is_nan() || amount < 0.0 {
            return Err(MetricError::InvalidAmount(format!(
                "counter increment must be a non-negative number, got {amount}"
            )));
        }
        self.value.add(amount);
        Ok(())
    }

    fn snapshot(&self, labels: Labels) -> CounterData {
        // Exemplar first, value second; the other order could expose an
        // exemplar for an observation the value does not include yet.
        let exemplar = self.exemplar.peek();
        CounterData {
            value: self.value.load(),
            labels,
            exemplar,
            created_timestamp_millis: Some(self.created_millis),
            scrape_timestamp_millis: None,
        }
    }
}
