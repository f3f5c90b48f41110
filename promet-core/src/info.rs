use std::sync::Arc;

use arc_swap::ArcSwap;
use promet_model::{
    InfoData, InfoSnapshot, Labels, Metadata, MetricError, MetricSnapshot, MetricType,
};

use crate::registry::Collect;

/// Configuration for an [`Info`] metric.  Fill in the fields and call
/// [`build`](InfoBuilder::build).
#[derive(Default)]
pub struct InfoBuilder {
    /// Metric name (required), without the `_info` suffix.
    pub name: String,
    /// Help text.
    pub help: Option<String>,
    /// Labels attached to every data record.
    pub const_labels: Labels,
    /// The initial information labels.
    pub labels: Labels,
}

impl InfoBuilder {
    /// Validates the configuration and creates the info metric.
    pub fn build(self) -> Result<Info, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::Info, self.help, None, self.const_labels)?;
        // Validate the initial labels against the const labels up front.
        metadata.const_labels().merge(&self.labels)?;
        Ok(Info { metadata, labels: ArcSwap::new(Arc::new(self.labels)) })
    }
}

/// Constant metadata exposed as labels; the serialized value is always 1.
pub struct Info {
    metadata: Metadata,
    labels: ArcSwap<Labels>,
}

impl Info {
    /// Replaces the information labels.
    pub fn set(&self, labels: Labels) -> Result<(), MetricError> {
        self.metadata.const_labels().merge(&labels)?;
        self.labels.store(Arc::new(labels));
        Ok(())
    }

    /// Takes an immutable snapshot.
    pub fn snapshot(&self) -> Result<InfoSnapshot, MetricError> {
        let labels = self.labels.load_full();
        let merged = self.metadata.const_labels().merge(&labels)?;
        InfoSnapshot::new(
            self.metadata.clone(),
            vec![InfoData { labels: merged, scrape_timestamp_millis: None }],
        )
    }
}

impl Collect for Info {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}
