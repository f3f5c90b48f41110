//! Live metric state.
//!
//! Each metric kind owns a set of cells, one per label-value combination,
//! holding atomic numeric state and a lock-free exemplar slot.  Observers
//! mutate cells without blocking; a collect pass reads them atomically into
//! the immutable snapshot types of `promet-model`, which the writers in
//! `promet-text` render.
#![deny(missing_docs)]

mod atomics;
mod callback;
mod counter;
mod exemplar_slot;
mod family;
mod gauge;
mod histogram;
mod info;
mod registry;
mod sampler;
mod stateset;
mod summary;
mod unknown;

pub use self::atomics::AtomicF64;
pub use self::callback::{CounterCallback, CounterCallbackBuilder};
pub use self::counter::{Counter, CounterBuilder, CounterHandle};
pub use self::gauge::{Gauge, GaugeBuilder, GaugeHandle};
pub use self::histogram::{
    exponential_buckets, linear_buckets, Histogram, HistogramBuilder, HistogramHandle,
    DEFAULT_BUCKETS,
};
pub use self::info::{Info, InfoBuilder};
pub use self::registry::{Collect, Registry};
pub use self::sampler::{system_millis, AgeReplaceSampler, ExemplarSampler, MillisClock};
pub use self::stateset::{StateSet, StateSetBuilder, StateSetHandle};
pub use self::summary::{
    EstimatorFactory, QuantileEstimator, SketchEstimator, Summary, SummaryBuilder, SummaryHandle,
};
pub use self::unknown::{Unknown, UnknownBuilder, UnknownHandle};
