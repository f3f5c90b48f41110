use promet_model::{
    CounterData, CounterSnapshot, Labels, Metadata, MetricError, MetricSnapshot, MetricType, Unit,
};

use crate::registry::Collect;
use crate::sampler::system_millis;

/// Configuration for a [`CounterCallback`].  Fill in the fields and call
/// [`build`](CounterCallbackBuilder::build).
#[derive(Default)]
pub struct CounterCallbackBuilder {
    /// Metric name (required).
    pub name: String,
    /// Help text.
    pub help: Option<String>,
    /// Unit of the reported value.
    pub unit: Option<Unit>,
    /// Labels attached to the data record.
    pub const_labels: Labels,
    /// Returns the current counter value on every collect (required).
    pub callback: Option<Box<dyn Fn() -> f64 + Send + Sync>>,
}

impl CounterCallbackBuilder {
    /// Validates the configuration and creates the metric.
    pub fn build(self) -> Result<CounterCallback, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::Counter, self.help, self.unit, self.const_labels)?;
        let callback = self.callback.ok_or(MetricError::MissingRequired("callback"))?;
        Ok(CounterCallback { metadata, callback, created_millis: system_millis() })
    }
}

/// A counter whose value is read from a callback at collect time, for
/// mirroring a count the process tracks elsewhere.
pub struct CounterCallback {
    metadata: Metadata,
    callback: Box<dyn Fn() -> f64 + Send + Sync>,
    created_millis: i64,
}

impl CounterCallback {
    /// Takes an immutable snapshot; the callback is invoked once.
    pub fn snapshot(&self) -> Result<CounterSnapshot, MetricError> {
        let data = CounterData {
            value: (self.callback)(),
            labels: self.metadata.const_labels().clone(),
            exemplar: None,
            created_timestamp_millis: Some(self.created_millis),
            scrape_timestamp_millis: None,
        };
        CounterSnapshot::new(self.metadata.clone(), vec![data])
    }
}

impl Collect for CounterCallback {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}
