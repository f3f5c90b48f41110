//! Immutable data model for client-side metrics.
//!
//! This crate holds the value types shared by the live-metric layer and the
//! exposition writers: label sets with a canonical ordering, exemplars,
//! metric metadata, and the per-kind snapshot types produced by a collect
//! pass.  Everything here is immutable after construction and validated at
//! construction time.
#![deny(missing_docs)]

mod error;
mod exemplar;
mod label;
mod metadata;
mod snapshot;
pub mod validation;

pub use self::error::MetricError;
pub use self::exemplar::{Exemplar, ExemplarBuilder, Exemplars, MAX_EXEMPLAR_LABEL_CHARS};
pub use self::label::{Label, Labels};
pub use self::metadata::{Metadata, MetricType, Unit};
pub use self::snapshot::{
    Bucket, CounterData, CounterSnapshot, GaugeData, GaugeSnapshot, HistogramBuckets,
    HistogramData, HistogramSnapshot, InfoData, InfoSnapshot, MetricSnapshot, MetricSnapshots,
    Quantile, Quantiles, StateSetData, StateSetSnapshot, SummaryData, SummarySnapshot,
    UnknownData, UnknownSnapshot,
};
