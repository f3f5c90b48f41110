//! Immutable views of metric state, produced by a collect pass and consumed
//! by the exposition writers.
//!
//! Snapshots form a tagged sum over the metric kinds; each kind carries its
//! own data-record shape.  Constructors validate the per-kind invariants and
//! sort data records by label set, so a writer emits records in a
//! deterministic order without sorting anything itself.

use indexmap::IndexMap;

use crate::{Exemplar, Exemplars, Labels, Metadata, MetricError, MetricType};

fn expect_kind(metadata: &Metadata, allowed: &[MetricType]) -> Result<(), MetricError> {
    if allowed.contains(&metadata.metric_type()) {
        return Ok(());
    }
    Err(MetricError::InvalidName(format!(
        "metadata for `{}` declares type `{}`, which this snapshot kind cannot carry",
        metadata.name(),
        metadata.metric_type().as_str()
    )))
}

/// A single bucket of a classic histogram: the upper bound and the
/// cumulative count of observations at or below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    upper_bound: f64,
    cumulative_count: u64,
}

impl Bucket {
    /// The inclusive upper bound.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Observations at or below the upper bound.
    pub fn cumulative_count(&self) -> u64 {
        self.cumulative_count
    }
}

/// The ordered bucket list of one histogram data record.
///
/// Bounds are strictly ascending and end at `+Inf`; cumulative counts never
/// decrease from one bucket to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBuckets(Vec<Bucket>);

impl HistogramBuckets {
    /// Validates and assembles a bucket list from `(upper_bound,
    /// cumulative_count)` pairs.
    pub fn new(pairs: Vec<(f64, u64)>) -> Result<Self, MetricError> {
        if pairs.is_empty() {
            return Err(MetricError::MissingRequired("buckets"));
        }
        let buckets: Vec<Bucket> = pairs
            .into_iter()
            .map(|(upper_bound, cumulative_count)| {
                if upper_bound.is_nan() {
                    return Err(MetricError::InvalidAmount(
                        "histogram bucket bound is NaN".to_string(),
                    ));
                }
                Ok(Bucket { upper_bound, cumulative_count })
            })
            .collect::<Result<_, _>>()?;

        for pair in buckets.windows(2) {
            if pair[0].upper_bound >= pair[1].upper_bound {
                return Err(MetricError::InvalidAmount(format!(
                    "bucket bounds must be strictly ascending, got {} before {}",
                    pair[0].upper_bound, pair[1].upper_bound
                )));
            }
            if pair[0].cumulative_count > pair[1].cumulative_count {
                return Err(MetricError::InvalidAmount(format!(
                    "bucket counts must be non-decreasing, got {} before {}",
                    pair[0].cumulative_count, pair[1].cumulative_count
                )));
            }
        }
        match buckets.last() {
            Some(last) if last.upper_bound == f64::INFINITY => {}
            _ => {
                return Err(MetricError::InvalidAmount(
                    "the last bucket bound must be +Inf".to_string(),
                ))
            }
        }

        Ok(HistogramBuckets(buckets))
    }

    /// Iterates the buckets in ascending bound order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.0.iter()
    }

    /// Number of buckets, the `+Inf` bucket included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a bucket list holds at least the `+Inf` bucket.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The total observation count, i.e. the `+Inf` bucket's cumulative
    /// count.
    pub fn count(&self) -> u64 {
        self.0.last().map_or(0, |bucket| bucket.cumulative_count)
    }
}

/// One quantile/value pair reported by a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    quantile: f64,
    value: f64,
}

impl Quantile {
    /// Creates a quantile; `quantile` must be within `0.0..=1.0`.
    pub fn new(quantile: f64, value: f64) -> Result<Self, MetricError> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(MetricError::InvalidAmount(format!(
                "quantile {quantile} is outside 0.0..=1.0"
            )));
        }
        Ok(Quantile { quantile, value })
    }

    /// The quantile, within `0.0..=1.0`.
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// The estimated value at this quantile.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// The ordered quantile list of one summary data record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quantiles(Vec<Quantile>);

impl Quantiles {
    /// The empty list.
    pub fn empty() -> Self {
        Quantiles(Vec::new())
    }

    /// Builds a list sorted ascending by quantile.
    pub fn new(mut quantiles: Vec<Quantile>) -> Self {
        quantiles.sort_by(|a, b| a.quantile.total_cmp(&b.quantile));
        Quantiles(quantiles)
    }

    /// Iterates the quantiles in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Quantile> {
        self.0.iter()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The state of one counter label combination.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterData {
    /// Accumulated value; never negative.
    pub value: f64,
    /// Labels identifying this record.
    pub labels: Labels,
    /// Most recently sampled exemplar, if any.
    pub exemplar: Option<Exemplar>,
    /// When the cell was created, in milliseconds since the epoch.
    pub created_timestamp_millis: Option<i64>,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

impl Default for CounterData {
    fn default() -> Self {
        CounterData {
            value: 0.0,
            labels: Labels::empty(),
            exemplar: None,
            created_timestamp_millis: None,
            scrape_timestamp_millis: None,
        }
    }
}

/// A point-in-time view of one counter metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSnapshot {
    metadata: Metadata,
    data: Vec<CounterData>,
}

impl CounterSnapshot {
    /// Assembles a counter snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<CounterData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Counter])?;
        for record in &data {
            if record.value.is_nan() || record.value < 0.0 {
                return Err(MetricError::InvalidAmount(format!(
                    "counter value must be non-negative, got {}",
                    record.value
                )));
            }
        }
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(CounterSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[CounterData] {
        &self.data
    }
}

/// The state of one gauge label combination.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeData {
    /// Current value.
    pub value: f64,
    /// Labels identifying this record.
    pub labels: Labels,
    /// Most recently sampled exemplar, if any.
    pub exemplar: Option<Exemplar>,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

impl Default for GaugeData {
    fn default() -> Self {
        GaugeData {
            value: 0.0,
            labels: Labels::empty(),
            exemplar: None,
            scrape_timestamp_millis: None,
        }
    }
}

/// A point-in-time view of one gauge metric.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSnapshot {
    metadata: Metadata,
    data: Vec<GaugeData>,
}

impl GaugeSnapshot {
    /// Assembles a gauge snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<GaugeData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Gauge])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(GaugeSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[GaugeData] {
        &self.data
    }
}

/// The state of one histogram label combination.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    /// Cumulative buckets, ending at `+Inf`.
    pub buckets: HistogramBuckets,
    /// Sum of all observed values, if tracked.
    pub sum: Option<f64>,
    /// Labels identifying this record.
    pub labels: Labels,
    /// Sampled exemplars; writers place each on the bucket its value falls
    /// in.
    pub exemplars: Exemplars,
    /// When the cell was created, in milliseconds since the epoch.
    pub created_timestamp_millis: Option<i64>,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

impl HistogramData {
    /// The total observation count, from the `+Inf` bucket.
    pub fn count(&self) -> u64 {
        self.buckets.count()
    }
}

/// A point-in-time view of one classic histogram or gauge histogram.
///
/// The two flavors share the shape; the metadata's kind tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    metadata: Metadata,
    data: Vec<HistogramData>,
}

impl HistogramSnapshot {
    /// Assembles a histogram snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<HistogramData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Histogram, MetricType::GaugeHistogram])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(HistogramSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether this snapshot is the gauge-histogram flavor.
    pub fn is_gauge_histogram(&self) -> bool {
        self.metadata.metric_type() == MetricType::GaugeHistogram
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[HistogramData] {
        &self.data
    }
}

/// The state of one summary label combination.
///
/// Every field may be absent; a record with no count, no sum, and no
/// quantiles serializes to nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryData {
    /// Number of observations, if tracked.
    pub count: Option<u64>,
    /// Sum of all observed values, if tracked.
    pub sum: Option<f64>,
    /// Estimated quantiles.
    pub quantiles: Quantiles,
    /// Labels identifying this record.
    pub labels: Labels,
    /// Sampled exemplars.
    pub exemplars: Exemplars,
    /// When the cell was created, in milliseconds since the epoch.
    pub created_timestamp_millis: Option<i64>,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

impl SummaryData {
    /// Whether the record carries nothing to serialize.
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.sum.is_none() && self.quantiles.is_empty()
    }
}

/// A point-in-time view of one summary metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    metadata: Metadata,
    data: Vec<SummaryData>,
}

impl SummarySnapshot {
    /// Assembles a summary snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<SummaryData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Summary])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(SummarySnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[SummaryData] {
        &self.data
    }
}

/// The state of one info label combination; the serialized value is always
/// 1, so only the labels matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoData {
    /// Labels carrying the exposed information.
    pub labels: Labels,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

/// A point-in-time view of one info metric.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSnapshot {
    metadata: Metadata,
    data: Vec<InfoData>,
}

impl InfoSnapshot {
    /// Assembles an info snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<InfoData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Info])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(InfoSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[InfoData] {
        &self.data
    }
}

/// The state of one state-set label combination.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSetData {
    states: Vec<(String, bool)>,
    labels: Labels,
    scrape_timestamp_millis: Option<i64>,
}

impl StateSetData {
    /// Validates and assembles a state-set record.
    ///
    /// At least one state is required; names must be unique.  States are
    /// stored sorted ascending by name, which is also the render order.
    pub fn new(
        mut states: Vec<(String, bool)>,
        labels: Labels,
        scrape_timestamp_millis: Option<i64>,
    ) -> Result<Self, MetricError> {
        if states.is_empty() {
            return Err(MetricError::MissingRequired("states"));
        }
        states.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in states.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(MetricError::InvalidLabel(format!("duplicate state `{}`", pair[0].0)));
            }
        }
        Ok(StateSetData { states, labels, scrape_timestamp_millis })
    }

    /// Iterates the states in ascending name order.
    pub fn states(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }

    /// Labels identifying this record.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// When the record was scraped, in milliseconds since the epoch.
    pub fn scrape_timestamp_millis(&self) -> Option<i64> {
        self.scrape_timestamp_millis
    }
}

/// A point-in-time view of one state-set metric.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSetSnapshot {
    metadata: Metadata,
    data: Vec<StateSetData>,
}

impl StateSetSnapshot {
    /// Assembles a state-set snapshot, sorting data records by label set.
    pub fn new(metadata: Metadata, mut data: Vec<StateSetData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::StateSet])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(StateSetSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[StateSetData] {
        &self.data
    }
}

/// The state of one unknown-kind label combination.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownData {
    /// Current value.
    pub value: f64,
    /// Labels identifying this record.
    pub labels: Labels,
    /// Most recently sampled exemplar, if any.
    pub exemplar: Option<Exemplar>,
    /// When the record was scraped, in milliseconds since the epoch.
    pub scrape_timestamp_millis: Option<i64>,
}

impl Default for UnknownData {
    fn default() -> Self {
        UnknownData {
            value: 0.0,
            labels: Labels::empty(),
            exemplar: None,
            scrape_timestamp_millis: None,
        }
    }
}

/// A point-in-time view of one unknown-kind metric.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownSnapshot {
    metadata: Metadata,
    data: Vec<UnknownData>,
}

impl UnknownSnapshot {
    /// Assembles an unknown-kind snapshot, sorting data records by label
    /// set.
    pub fn new(metadata: Metadata, mut data: Vec<UnknownData>) -> Result<Self, MetricError> {
        expect_kind(&metadata, &[MetricType::Unknown])?;
        data.sort_by(|a, b| a.labels.cmp(&b.labels));
        Ok(UnknownSnapshot { metadata, data })
    }

    /// The metric metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data records, ordered by label set.
    pub fn data(&self) -> &[UnknownData] {
        &self.data
    }
}

/// A point-in-time view of one metric, tagged by kind.
///
/// Writers dispatch on the variant; there is no trait hierarchy to walk.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSnapshot {
    /// A counter.
    Counter(CounterSnapshot),
    /// A gauge.
    Gauge(GaugeSnapshot),
    /// A classic histogram or gauge histogram.
    Histogram(HistogramSnapshot),
    /// A summary.
    Summary(SummarySnapshot),
    /// An info metric.
    Info(InfoSnapshot),
    /// A state set.
    StateSet(StateSetSnapshot),
    /// An unknown-kind metric.
    Unknown(UnknownSnapshot),
}

impl MetricSnapshot {
    /// The metadata of the underlying snapshot.
    pub fn metadata(&self) -> &Metadata {
        match self {
            MetricSnapshot::Counter(snapshot) => snapshot.metadata(),
            MetricSnapshot::Gauge(snapshot) => snapshot.metadata(),
            MetricSnapshot::Histogram(snapshot) => snapshot.metadata(),
            MetricSnapshot::Summary(snapshot) => snapshot.metadata(),
            MetricSnapshot::Info(snapshot) => snapshot.metadata(),
            MetricSnapshot::StateSet(snapshot) => snapshot.metadata(),
            MetricSnapshot::Unknown(snapshot) => snapshot.metadata(),
        }
    }

    /// The metric name.
    pub fn name(&self) -> &str {
        self.metadata().name()
    }
}

impl From<CounterSnapshot> for MetricSnapshot {
    fn from(snapshot: CounterSnapshot) -> Self {
        MetricSnapshot::Counter(snapshot)
    }
}

impl From<GaugeSnapshot> for MetricSnapshot {
    fn from(snapshot: GaugeSnapshot) -> Self {
        MetricSnapshot::Gauge(snapshot)
    }
}

impl From<HistogramSnapshot> for MetricSnapshot {
    fn from(snapshot: HistogramSnapshot) -> Self {
        MetricSnapshot::Histogram(snapshot)
    }
}

impl From<SummarySnapshot> for MetricSnapshot {
    fn from(snapshot: SummarySnapshot) -> Self {
        MetricSnapshot::Summary(snapshot)
    }
}

impl From<InfoSnapshot> for MetricSnapshot {
    fn from(snapshot: InfoSnapshot) -> Self {
        MetricSnapshot::Info(snapshot)
    }
}

impl From<StateSetSnapshot> for MetricSnapshot {
    fn from(snapshot: StateSetSnapshot) -> Self {
        MetricSnapshot::StateSet(snapshot)
    }
}

impl From<UnknownSnapshot> for MetricSnapshot {
    fn from(snapshot: UnknownSnapshot) -> Self {
        MetricSnapshot::Unknown(snapshot)
    }
}

/// An ordered set of metric snapshots, indexed by unique metric name.
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshots {
    inner: IndexMap<String, MetricSnapshot>,
}

impl MetricSnapshots {
    /// Assembles a snapshot set ordered by metric name.
    ///
    /// Duplicate metric names are rejected.
    pub fn of<I>(snapshots: I) -> Result<Self, MetricError>
    where
        I: IntoIterator<Item = MetricSnapshot>,
    {
        let mut inner = IndexMap::new();
        for snapshot in snapshots {
            let name = snapshot.name().to_string();
            if inner.insert(name.clone(), snapshot).is_some() {
                return Err(MetricError::DuplicateName(name));
            }
        }
        inner.sort_unstable_keys();
        Ok(MetricSnapshots { inner })
    }

    /// Looks up a snapshot by metric name.
    pub fn get(&self, name: &str) -> Option<&MetricSnapshot> {
        self.inner.get(name)
    }

    /// Iterates the snapshots in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSnapshot> {
        self.inner.values()
    }

    /// Number of snapshots in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_metadata(name: &str) -> Metadata {
        Metadata::new(name, MetricType::Counter, None, None, Labels::empty()).unwrap()
    }

    #[test]
    fn buckets_require_inf_and_order() {
        assert!(HistogramBuckets::new(vec![(2.2, 2), (f64::INFINITY, 4)]).is_ok());
        assert!(HistogramBuckets::new(vec![]).is_err());
        assert!(HistogramBuckets::new(vec![(2.2, 2)]).is_err());
        assert!(HistogramBuckets::new(vec![(f64::NAN, 0), (f64::INFINITY, 0)]).is_err());
        assert!(HistogramBuckets::new(vec![(3.0, 1), (2.0, 2), (f64::INFINITY, 3)]).is_err());
        // Cumulative counts may not drop.
        assert!(HistogramBuckets::new(vec![(1.0, 5), (f64::INFINITY, 4)]).is_err());
    }

    #[test]
    fn bucket_count_is_inf_bucket() {
        let buckets = HistogramBuckets::new(vec![(1.0, 3), (f64::INFINITY, 7)]).unwrap();
        assert_eq!(buckets.count(), 7);
    }

    #[test]
    fn counter_snapshot_rejects_negative_values() {
        let data = CounterData { value: -1.0, ..Default::default() };
        assert!(CounterSnapshot::new(counter_metadata("c"), vec![data]).is_err());
    }

    #[test]
    fn counter_snapshot_rejects_mismatched_metadata() {
        let metadata = Metadata::new("g", MetricType::Gauge, None, None, Labels::empty()).unwrap();
        assert!(CounterSnapshot::new(metadata, vec![]).is_err());
    }

    #[test]
    fn data_records_sorted_by_labels() {
        let metadata = counter_metadata("requests");
        let snapshot = CounterSnapshot::new(
            metadata,
            vec![
                CounterData {
                    value: 2.0,
                    labels: Labels::of(&[("status", "500")]).unwrap(),
                    ..Default::default()
                },
                CounterData {
                    value: 1.0,
                    labels: Labels::of(&[("status", "200")]).unwrap(),
                    ..Default::default()
                },
            ],
        )
        .unwrap();
        let values: Vec<_> = snapshot.data().iter().map(|d| d.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn state_set_data_sorted_and_unique() {
        let data = StateSetData::new(
            vec![("state2".to_string(), false), ("state1".to_string(), true)],
            Labels::empty(),
            None,
        )
        .unwrap();
        let names: Vec<_> = data.states().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["state1", "state2"]);

        assert!(StateSetData::new(vec![], Labels::empty(), None).is_err());
        assert!(StateSetData::new(
            vec![("a".to_string(), true), ("a".to_string(), false)],
            Labels::empty(),
            None,
        )
        .is_err());
    }

    #[test]
    fn summary_data_emptiness() {
        assert!(SummaryData::default().is_empty());
        assert!(!SummaryData { count: Some(1), ..Default::default() }.is_empty());
        assert!(!SummaryData { sum: Some(0.5), ..Default::default() }.is_empty());
    }

    #[test]
    fn snapshot_set_sorted_and_unique() {
        let a = CounterSnapshot::new(counter_metadata("bbb"), vec![]).unwrap();
        let b = CounterSnapshot::new(counter_metadata("aaa"), vec![]).unwrap();
        let snapshots = MetricSnapshots::of([a.into(), b.into()]).unwrap();
        let names: Vec<_> = snapshots.iter().map(MetricSnapshot::name).collect();
        assert_eq!(names, vec!["aaa", "bbb"]);

        let dup1 = CounterSnapshot::new(counter_metadata("same"), vec![]).unwrap();
        let dup2 = CounterSnapshot::new(counter_metadata("same"), vec![]).unwrap();
        let result = MetricSnapshots::of([dup1.into(), dup2.into()]);
        assert_eq!(result.unwrap_err(), MetricError::DuplicateName("same".to_string()));
    }

    #[test]
    fn quantiles_sorted() {
        let quantiles = Quantiles::new(vec![
            Quantile::new(0.99, 3.0).unwrap(),
            Quantile::new(0.5, 1.0).unwrap(),
        ]);
        let order: Vec<_> = quantiles.iter().map(|q| q.quantile()).collect();
        assert_eq!(order, vec![0.5, 0.99]);
        assert!(Quantile::new(1.5, 0.0).is_err());
    }
}
