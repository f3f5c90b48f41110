use std::sync::Arc;

use dashmap::DashMap;
use promet_model::{
    ExemplarBuilder, Labels, Metadata, MetricError, MetricSnapshot, MetricType, Unit, UnknownData,
    UnknownSnapshot,
};

use crate::atomics::AtomicF64;
use crate::exemplar_slot::ExemplarSlot;
use crate::family;
use crate::registry::Collect;
use crate::sampler::{system_millis, AgeReplaceSampler, ExemplarSampler};

/// Configuration for an [`Unknown`] metric.  Fill in the fields and call
/// [`build`](UnknownBuilder::build).
pub struct UnknownBuilder {
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

impl Default for UnknownBuilder {
    fn default() -> Self {
        UnknownBuilder {
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

impl UnknownBuilder {
    /// Validates the configuration and creates the metric.
    pub fn build(self) -> Result<Unknown, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::Unknown, self.help, self.unit, self.const_labels)?;
        family::validate_label_names(&self.label_names, metadata.const_labels(), None)?;

        let sampler = self
            .exemplars
            .then(|| self.sampler.unwrap_or_else(|| Arc::new(AgeReplaceSampler::default())));
        let unlabeled =
            self.label_names.is_empty().then(|| Arc::new(UnknownCell::new(sampler.clone())));

        Ok(Unknown { metadata, label_names: self.label_names, cells: DashMap::new(), unlabeled, sampler })
    }
}

/// A metric whose semantics the producer does not know, typically one
/// mirrored from a third-party system.
pub struct Unknown {
    metadata: Metadata,
    label_names: Vec<String>,
    cells: DashMap<Vec<String>, Arc<UnknownCell>>,
    unlabeled: Option<Arc<UnknownCell>>,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl Unknown {
    /// Handle for the cell with the given label values, created on first
    /// use.
    pub fn labels(&self, values: &[&str]) -> Result<UnknownHandle, MetricError> {
        family::validate_label_values(&self.label_names, values)?;
        let key: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        let cell =
            self.cells.entry(key).or_insert_with(|| Arc::new(UnknownCell::new(self.sampler.clone())));
        Ok(UnknownHandle { cell: Arc::clone(&cell) })
    }

    /// Sets the unlabeled cell.
    pub fn set(&self, value: f64) -> Result<(), MetricError> {
        self.unlabeled().map(|cell| cell.set(value))
    }

    /// Sets the unlabeled cell and installs a fresh exemplar carrying
    /// `labels`, bypassing the sampler.
    pub fn set_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.unlabeled()?.set_with_exemplar(value, labels)
    }

    /// Takes an immutable snapshot of every cell.
    pub fn snapshot(&self) -> Result<UnknownSnapshot, MetricError> {
        let mut data = Vec::with_capacity(self.cells.len() + 1);
        if let Some(cell) = &self.unlabeled {
            data.push(cell.snapshot(self.metadata.const_labels().clone()));
        }
        for entry in self.cells.iter() {
            let labels =
                family::cell_labels(self.metadata.const_labels(), &self.label_names, entry.key())?;
            data.push(entry.value().snapshot(labels));
        }
        UnknownSnapshot::new(self.metadata.clone(), data)
    }

    fn unlabeled(&self) -> Result<&UnknownCell, MetricError> {
        self.unlabeled.as_deref().ok_or_else(|| {
            MetricError::InvalidLabel(format!(
                "metric `{}` declares label names; select a cell with labels()",
                self.metadata.name()
            ))
        })
    }
}

impl Collect for Unknown {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}

/// A cheap, cloneable handle to one unknown-kind cell.
#[derive(Clone)]
pub struct UnknownHandle {
    cell: Arc<UnknownCell>,
}

impl UnknownHandle {
    /// Sets the value.
    pub fn set(&self, value: f64) {
        self.cell.set(value);
    }

    /// Sets the value and installs a fresh exemplar carrying `labels`,
    /// bypassing the sampler.
    pub fn set_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        self.cell.set_with_exemplar(value, labels)
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        self.cell.value.load()
    }
}

struct UnknownCell {
    value: AtomicF64,
    exemplar: ExemplarSlot,
    sampler: Option<Arc<dyn ExemplarSampler>>,
}

impl UnknownCell {
    fn new(sampler: Option<Arc<dyn ExemplarSampler>>) -> Self {
        UnknownCell { value: AtomicF64::new(0.0), exemplar: ExemplarSlot::new(), sampler }
    }

    fn set(&self, value: f64) {
        self.value.store(value);
        if let Some(sampler) = &self.sampler {
            self.exemplar.offer(value, sampler.as_ref());
        }
    }

    fn set_with_exemplar(&self, value: f64, labels: Labels) -> Result<(), MetricError> {
        if self.sampler.is_none() {
            self.value.store(value);
            return Ok(());
        }
        let exemplar = ExemplarBuilder {
            value,
            labels,
            timestamp_millis: Some(system_millis()),
            ..Default::default()
        }
        .build()?;
        self.value.store(value);
        self.exemplar.replace(exemplar);
        Ok(())
    }

    fn snapshot(&self, labels: Labels) -> UnknownData {
        let exemplar = self.exemplar.peek();
        UnknownData { value: self.value.load(), labels, exemplar, scrape_timestamp_millis: None }
    }
}
