use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use promet_model::{Metadata, MetricError, MetricSnapshot, MetricSnapshots};

/// A source of one metric snapshot, registrable with [`Registry`].
///
/// Every live metric in this crate implements it; external collectors
/// (process stats, runtime stats) plug in the same way.
pub trait Collect: Send + Sync {
    /// Descriptive metadata; the name keys the registry.
    fn metadata(&self) -> &Metadata;

    /// Takes an immutable snapshot of the live state.
    fn collect(&self) -> Result<MetricSnapshot, MetricError>;
}

/// The process-wide listing of metrics.
///
/// Lookups and collection are lock-free reads; registration contends only
/// on a map shard.
#[derive(Default)]
pub struct Registry {
    metrics: DashMap<String, Arc<dyn Collect>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Registry { metrics: DashMap::new() }
    }

    /// Registers `metric` under its metadata name.
    ///
    /// A second registration under the same name is rejected.
    pub fn register(&self, metric: Arc<dyn Collect>) -> Result<(), MetricError> {
        let name = metric.metadata().name().to_string();
        match self.metrics.entry(name) {
            Entry::Occupied(entry) => Err(MetricError::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(metric);
                Ok(())
            }
        }
    }

    /// Removes the metric with the given name, returning whether it was
    /// present.
    pub fn unregister(&self, name: &str) -> bool {
        self.metrics.remove(name).is_some()
    }

    /// Snapshots every registered metric into a set ordered by name.
    ///
    /// The pass is not a cross-metric atomic cut: each metric's records are
    /// individually consistent, but observations racing the pass may land
    /// in some metrics and not others.
    pub fn collect(&self) -> Result<MetricSnapshots, MetricError> {
        let mut snapshots = Vec::with_capacity(self.metrics.len());
        for entry in self.metrics.iter() {
            snapshots.push(entry.value().collect()?);
        }
        MetricSnapshots::of(snapshots)
    }
}
