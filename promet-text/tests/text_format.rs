//! Byte-exact rendering checks for both text formats, one scenario per
//! metric kind plus the escaping and empty-data edge cases.

use promet_model::{
    CounterData, CounterSnapshot, Exemplar, ExemplarBuilder, Exemplars, GaugeData, GaugeSnapshot,
    HistogramBuckets, HistogramData, HistogramSnapshot, InfoData, InfoSnapshot, Labels, Metadata,
    MetricSnapshot, MetricSnapshots, MetricType, Quantile, Quantiles, StateSetData,
    StateSetSnapshot, SummaryData, SummarySnapshot, Unit, UnknownData, UnknownSnapshot,
};
use promet_text::{OpenMetricsTextWriter, PrometheusTextWriter};

const CREATED_1: i64 = 1672850385800;
const CREATED_1_S: &str = "1672850385.800";
const CREATED_2: i64 = 1672850285000;
const CREATED_2_S: &str = "1672850285.000";
const SCRAPE_1: i64 = 1672850685829;
const SCRAPE_1_S: &str = "1672850685.829";
const SCRAPE_2: i64 = 1672850585820;
const SCRAPE_2_S: &str = "1672850585.820";

const EXEMPLAR_1_S: &str = "{env=\"prod\",span_id=\"12345\",trace_id=\"abcde\"} 1.7 1672850685.829";
const EXEMPLAR_2_S: &str = "{env=\"dev\",span_id=\"23456\",trace_id=\"bcdef\"} 2.4 1672850685.830";

fn exemplar_1() -> Exemplar {
    ExemplarBuilder {
        value: 1.7,
        labels: Labels::of(&[("env", "prod")]).unwrap(),
        timestamp_millis: Some(1672850685829),
        trace_id: Some("abcde".to_string()),
        span_id: Some("12345".to_string()),
    }
    .build()
    .unwrap()
}

fn exemplar_2() -> Exemplar {
    ExemplarBuilder {
        value: 2.4,
        labels: Labels::of(&[("env", "dev")]).unwrap(),
        timestamp_millis: Some(1672850685830),
        trace_id: Some("bcdef".to_string()),
        span_id: Some("23456".to_string()),
    }
    .build()
    .unwrap()
}

fn metadata(
    name: &str,
    metric_type: MetricType,
    help: Option<&str>,
    unit: Option<Unit>,
) -> Metadata {
    Metadata::new(name, metric_type, help.map(str::to_string), unit, Labels::empty()).unwrap()
}

fn render_openmetrics(snapshot: MetricSnapshot) -> String {
    let snapshots = MetricSnapshots::of([snapshot]).unwrap();
    let mut out = Vec::new();
    OpenMetricsTextWriter::new().write(&mut out, &snapshots).unwrap();
    String::from_utf8(out).unwrap()
}

fn render_prometheus(snapshot: MetricSnapshot) -> String {
    let snapshots = MetricSnapshots::of([snapshot]).unwrap();
    let mut out = Vec::new();
    PrometheusTextWriter::new().write(&mut out, &snapshots).unwrap();
    String::from_utf8(out).unwrap()
}

fn assert_formats(openmetrics: &str, prometheus: &str, snapshot: MetricSnapshot) {
    assert_eq!(openmetrics, render_openmetrics(snapshot.clone()));
    assert_eq!(prometheus, render_prometheus(snapshot));
}

#[test]
fn counter_complete() {
    let openmetrics = format!(
        "# TYPE service_time_seconds counter\n\
         # UNIT service_time_seconds seconds\n\
         # HELP service_time_seconds total time spent serving\n\
         service_time_seconds_total{{path=\"/hello\",status=\"200\"}} 0.8 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         service_time_seconds_created{{path=\"/hello\",status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         service_time_seconds_total{{path=\"/hello\",status=\"500\"}} 0.9 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         service_time_seconds_created{{path=\"/hello\",status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP service_time_seconds_total total time spent serving\n\
         # TYPE service_time_seconds_total counter\n\
         service_time_seconds_total{{path=\"/hello\",status=\"200\"}} 0.8 {SCRAPE_1_S}\n\
         service_time_seconds_total{{path=\"/hello\",status=\"500\"}} 0.9 {SCRAPE_2_S}\n\
         # HELP service_time_seconds_created total time spent serving\n\
         # TYPE service_time_seconds_created gauge\n\
         service_time_seconds_created{{path=\"/hello\",status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         service_time_seconds_created{{path=\"/hello\",status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n"
    );
    let snapshot = CounterSnapshot::new(
        metadata(
            "service_time_seconds",
            MetricType::Counter,
            Some("total time spent serving"),
            Some(Unit::seconds()),
        ),
        vec![
            CounterData {
                value: 0.8,
                labels: Labels::of(&[("path", "/hello"), ("status", "200")]).unwrap(),
                exemplar: Some(exemplar_1()),
                created_timestamp_millis: Some(CREATED_1),
                scrape_timestamp_millis: Some(SCRAPE_1),
            },
            CounterData {
                value: 0.9,
                labels: Labels::of(&[("path", "/hello"), ("status", "500")]).unwrap(),
                exemplar: Some(exemplar_2()),
                created_timestamp_millis: Some(CREATED_2),
                scrape_timestamp_millis: Some(SCRAPE_2),
            },
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn counter_minimal() {
    let snapshot = CounterSnapshot::new(
        metadata("my_counter", MetricType::Counter, None, None),
        vec![CounterData { value: 1.1, ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE my_counter counter\nmy_counter_total 1.1\n# EOF\n",
        "# TYPE my_counter_total counter\nmy_counter_total 1.1\n",
        snapshot.into(),
    );
}

#[test]
fn gauge_complete() {
    let openmetrics = format!(
        "# TYPE disk_usage_ratio gauge\n\
         # UNIT disk_usage_ratio ratio\n\
         # HELP disk_usage_ratio percentage used\n\
         disk_usage_ratio{{device=\"/dev/sda1\"}} 0.2 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         disk_usage_ratio{{device=\"/dev/sda2\"}} 0.7 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP disk_usage_ratio percentage used\n\
         # TYPE disk_usage_ratio gauge\n\
         disk_usage_ratio{{device=\"/dev/sda1\"}} 0.2 {SCRAPE_1_S}\n\
         disk_usage_ratio{{device=\"/dev/sda2\"}} 0.7 {SCRAPE_2_S}\n"
    );
    // Records are handed over unsorted; the snapshot orders them.
    let snapshot = GaugeSnapshot::new(
        metadata(
            "disk_usage_ratio",
            MetricType::Gauge,
            Some("percentage used"),
            Some(Unit::ratio()),
        ),
        vec![
            GaugeData {
                value: 0.7,
                labels: Labels::of(&[("device", "/dev/sda2")]).unwrap(),
                exemplar: Some(exemplar_2()),
                scrape_timestamp_millis: Some(SCRAPE_2),
            },
            GaugeData {
                value: 0.2,
                labels: Labels::of(&[("device", "/dev/sda1")]).unwrap(),
                exemplar: Some(exemplar_1()),
                scrape_timestamp_millis: Some(SCRAPE_1),
            },
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn gauge_minimal() {
    let snapshot = GaugeSnapshot::new(
        metadata("temperature_centigrade", MetricType::Gauge, None, None),
        vec![GaugeData { value: 22.3, ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE temperature_centigrade gauge\ntemperature_centigrade 22.3\n# EOF\n",
        "# TYPE temperature_centigrade gauge\ntemperature_centigrade 22.3\n",
        snapshot.into(),
    );
}

fn summary_quantiles() -> Quantiles {
    Quantiles::new(vec![
        Quantile::new(0.5, 225.3).unwrap(),
        Quantile::new(0.9, 240.7).unwrap(),
        Quantile::new(0.95, 245.1).unwrap(),
    ])
}

#[test]
fn summary_complete() {
    let openmetrics = format!(
        "# TYPE http_request_duration_seconds summary\n\
         # UNIT http_request_duration_seconds seconds\n\
         # HELP http_request_duration_seconds request duration\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.5\"}} 225.3 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.9\"}} 240.7 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.95\"}} 245.1 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         http_request_duration_seconds_count{{status=\"200\"}} 3 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         http_request_duration_seconds_sum{{status=\"200\"}} 1.2 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         http_request_duration_seconds_created{{status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.5\"}} 225.3 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.9\"}} 240.7 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.95\"}} 245.1 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         http_request_duration_seconds_count{{status=\"500\"}} 7 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         http_request_duration_seconds_sum{{status=\"500\"}} 2.2 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         http_request_duration_seconds_created{{status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP http_request_duration_seconds request duration\n\
         # TYPE http_request_duration_seconds summary\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.5\"}} 225.3 {SCRAPE_1_S}\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.9\"}} 240.7 {SCRAPE_1_S}\n\
         http_request_duration_seconds{{status=\"200\",quantile=\"0.95\"}} 245.1 {SCRAPE_1_S}\n\
         http_request_duration_seconds_count{{status=\"200\"}} 3 {SCRAPE_1_S}\n\
         http_request_duration_seconds_sum{{status=\"200\"}} 1.2 {SCRAPE_1_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.5\"}} 225.3 {SCRAPE_2_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.9\"}} 240.7 {SCRAPE_2_S}\n\
         http_request_duration_seconds{{status=\"500\",quantile=\"0.95\"}} 245.1 {SCRAPE_2_S}\n\
         http_request_duration_seconds_count{{status=\"500\"}} 7 {SCRAPE_2_S}\n\
         http_request_duration_seconds_sum{{status=\"500\"}} 2.2 {SCRAPE_2_S}\n\
         # HELP http_request_duration_seconds_created request duration\n\
         # TYPE http_request_duration_seconds_created gauge\n\
         http_request_duration_seconds_created{{status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         http_request_duration_seconds_created{{status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n"
    );
    let snapshot = SummarySnapshot::new(
        metadata(
            "http_request_duration_seconds",
            MetricType::Summary,
            Some("request duration"),
            Some(Unit::seconds()),
        ),
        vec![
            SummaryData {
                count: Some(7),
                sum: Some(2.2),
                quantiles: summary_quantiles(),
                labels: Labels::of(&[("status", "500")]).unwrap(),
                exemplars: Exemplars::of([exemplar_2()]),
                created_timestamp_millis: Some(CREATED_2),
                scrape_timestamp_millis: Some(SCRAPE_2),
            },
            SummaryData {
                count: Some(3),
                sum: Some(1.2),
                quantiles: summary_quantiles(),
                labels: Labels::of(&[("status", "200")]).unwrap(),
                exemplars: Exemplars::of([exemplar_1()]),
                created_timestamp_millis: Some(CREATED_1),
                scrape_timestamp_millis: Some(SCRAPE_1),
            },
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn summary_without_quantiles() {
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, Some("latency"), Some(Unit::seconds())),
        vec![SummaryData { count: Some(3), sum: Some(1.2), ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE latency_seconds summary\n\
         # UNIT latency_seconds seconds\n\
         # HELP latency_seconds latency\n\
         latency_seconds_count 3\n\
         latency_seconds_sum 1.2\n\
         # EOF\n",
        "# HELP latency_seconds latency\n\
         # TYPE latency_seconds summary\n\
         latency_seconds_count 3\n\
         latency_seconds_sum 1.2\n",
        snapshot.into(),
    );
}

#[test]
fn summary_no_count_and_sum() {
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, None, None),
        vec![SummaryData {
            quantiles: Quantiles::new(vec![Quantile::new(0.95, 200.0).unwrap()]),
            ..Default::default()
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE latency_seconds summary\nlatency_seconds{quantile=\"0.95\"} 200.0\n# EOF\n",
        "# TYPE latency_seconds summary\nlatency_seconds{quantile=\"0.95\"} 200.0\n",
        snapshot.into(),
    );
}

#[test]
fn summary_just_count() {
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, None, None),
        vec![SummaryData { count: Some(1), ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE latency_seconds summary\nlatency_seconds_count 1\n# EOF\n",
        "# TYPE latency_seconds summary\nlatency_seconds_count 1\n",
        snapshot.into(),
    );
}

#[test]
fn summary_just_sum() {
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, None, None),
        vec![SummaryData { sum: Some(12.3), ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE latency_seconds summary\nlatency_seconds_sum 12.3\n# EOF\n",
        "# TYPE latency_seconds summary\nlatency_seconds_sum 12.3\n",
        snapshot.into(),
    );
}

#[test]
fn summary_empty_data() {
    // A present-but-empty record is treated like no data at all.
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, Some("latency"), Some(Unit::seconds())),
        vec![SummaryData::default()],
    )
    .unwrap();
    assert_formats("# EOF\n", "", snapshot.into());
}

#[test]
fn summary_empty_and_non_empty() {
    let expected_body = "# TYPE latency_seconds summary\n\
         latency_seconds_count{path=\"/v2\"} 2\n\
         latency_seconds_sum{path=\"/v2\"} 10.7\n";
    let snapshot = SummarySnapshot::new(
        metadata("latency_seconds", MetricType::Summary, None, None),
        vec![
            SummaryData { labels: Labels::of(&[("path", "/v1")]).unwrap(), ..Default::default() },
            SummaryData {
                labels: Labels::of(&[("path", "/v2")]).unwrap(),
                count: Some(2),
                sum: Some(10.7),
                ..Default::default()
            },
            SummaryData { labels: Labels::of(&[("path", "/v3")]).unwrap(), ..Default::default() },
        ],
    )
    .unwrap();
    assert_formats(
        &format!("{expected_body}# EOF\n"),
        expected_body,
        snapshot.into(),
    );
}

fn histogram_data(
    buckets: Vec<(f64, u64)>,
    sum: Option<f64>,
    labels: Labels,
    timestamps: Option<(i64, i64)>,
) -> HistogramData {
    HistogramData {
        buckets: HistogramBuckets::new(buckets).unwrap(),
        sum,
        labels,
        exemplars: Exemplars::of([exemplar_1(), exemplar_2()]),
        created_timestamp_millis: timestamps.map(|(created, _)| created),
        scrape_timestamp_millis: timestamps.map(|(_, scrape)| scrape),
    }
}

#[test]
fn histogram_complete() {
    let openmetrics = format!(
        "# TYPE response_size_bytes histogram\n\
         # UNIT response_size_bytes bytes\n\
         # HELP response_size_bytes help\n\
         response_size_bytes_bucket{{status=\"200\",le=\"2.2\"}} 2 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         response_size_bytes_bucket{{status=\"200\",le=\"+Inf\"}} 4 {SCRAPE_1_S} # {EXEMPLAR_2_S}\n\
         response_size_bytes_count{{status=\"200\"}} 4 {SCRAPE_1_S}\n\
         response_size_bytes_sum{{status=\"200\"}} 4.1 {SCRAPE_1_S}\n\
         response_size_bytes_created{{status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         response_size_bytes_bucket{{status=\"500\",le=\"2.2\"}} 2 {SCRAPE_2_S} # {EXEMPLAR_1_S}\n\
         response_size_bytes_bucket{{status=\"500\",le=\"+Inf\"}} 2 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         response_size_bytes_count{{status=\"500\"}} 2 {SCRAPE_2_S}\n\
         response_size_bytes_sum{{status=\"500\"}} 3.2 {SCRAPE_2_S}\n\
         response_size_bytes_created{{status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP response_size_bytes help\n\
         # TYPE response_size_bytes histogram\n\
         response_size_bytes_bucket{{status=\"200\",le=\"2.2\"}} 2 {SCRAPE_1_S}\n\
         response_size_bytes_bucket{{status=\"200\",le=\"+Inf\"}} 4 {SCRAPE_1_S}\n\
         response_size_bytes_count{{status=\"200\"}} 4 {SCRAPE_1_S}\n\
         response_size_bytes_sum{{status=\"200\"}} 4.1 {SCRAPE_1_S}\n\
         response_size_bytes_bucket{{status=\"500\",le=\"2.2\"}} 2 {SCRAPE_2_S}\n\
         response_size_bytes_bucket{{status=\"500\",le=\"+Inf\"}} 2 {SCRAPE_2_S}\n\
         response_size_bytes_count{{status=\"500\"}} 2 {SCRAPE_2_S}\n\
         response_size_bytes_sum{{status=\"500\"}} 3.2 {SCRAPE_2_S}\n\
         # HELP response_size_bytes_created help\n\
         # TYPE response_size_bytes_created gauge\n\
         response_size_bytes_created{{status=\"200\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         response_size_bytes_created{{status=\"500\"}} {CREATED_2_S} {SCRAPE_2_S}\n"
    );
    let snapshot = HistogramSnapshot::new(
        metadata("response_size_bytes", MetricType::Histogram, Some("help"), Some(Unit::bytes())),
        vec![
            histogram_data(
                vec![(2.2, 2), (f64::INFINITY, 2)],
                Some(3.2),
                Labels::of(&[("status", "500")]).unwrap(),
                Some((CREATED_2, SCRAPE_2)),
            ),
            histogram_data(
                vec![(2.2, 2), (f64::INFINITY, 4)],
                Some(4.1),
                Labels::of(&[("status", "200")]).unwrap(),
                Some((CREATED_1, SCRAPE_1)),
            ),
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn histogram_minimal() {
    // In OpenMetrics a histogram may have a _count iff it has a _sum; in
    // the Prometheus format the _count is synthesized from the +Inf bucket.
    let snapshot = HistogramSnapshot::new(
        metadata("request_latency_seconds", MetricType::Histogram, None, None),
        vec![HistogramData {
            buckets: HistogramBuckets::new(vec![(f64::INFINITY, 2)]).unwrap(),
            sum: None,
            labels: Labels::empty(),
            exemplars: Exemplars::empty(),
            created_timestamp_millis: None,
            scrape_timestamp_millis: None,
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE request_latency_seconds histogram\n\
         request_latency_seconds_bucket{le=\"+Inf\"} 2\n\
         # EOF\n",
        "# TYPE request_latency_seconds histogram\n\
         request_latency_seconds_bucket{le=\"+Inf\"} 2\n\
         request_latency_seconds_count 2\n",
        snapshot.into(),
    );
}

#[test]
fn histogram_count_and_sum() {
    let snapshot = HistogramSnapshot::new(
        metadata("request_latency_seconds", MetricType::Histogram, None, None),
        vec![HistogramData {
            buckets: HistogramBuckets::new(vec![(f64::INFINITY, 2)]).unwrap(),
            sum: Some(3.2),
            labels: Labels::empty(),
            exemplars: Exemplars::empty(),
            created_timestamp_millis: None,
            scrape_timestamp_millis: None,
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE request_latency_seconds histogram\n\
         request_latency_seconds_bucket{le=\"+Inf\"} 2\n\
         request_latency_seconds_count 2\n\
         request_latency_seconds_sum 3.2\n\
         # EOF\n",
        "# TYPE request_latency_seconds histogram\n\
         request_latency_seconds_bucket{le=\"+Inf\"} 2\n\
         request_latency_seconds_count 2\n\
         request_latency_seconds_sum 3.2\n",
        snapshot.into(),
    );
}

#[test]
fn gauge_histogram_complete() {
    let openmetrics = format!(
        "# TYPE cache_size_bytes gaugehistogram\n\
         # UNIT cache_size_bytes bytes\n\
         # HELP cache_size_bytes number of bytes in the cache\n\
         cache_size_bytes_bucket{{db=\"items\",le=\"2.0\"}} 3 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         cache_size_bytes_bucket{{db=\"items\",le=\"+Inf\"}} 7 {SCRAPE_1_S} # {EXEMPLAR_2_S}\n\
         cache_size_bytes_gcount{{db=\"items\"}} 7 {SCRAPE_1_S}\n\
         cache_size_bytes_gsum{{db=\"items\"}} 17.0 {SCRAPE_1_S}\n\
         cache_size_bytes_created{{db=\"items\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         cache_size_bytes_bucket{{db=\"options\",le=\"2.0\"}} 4 {SCRAPE_2_S} # {EXEMPLAR_1_S}\n\
         cache_size_bytes_bucket{{db=\"options\",le=\"+Inf\"}} 8 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         cache_size_bytes_gcount{{db=\"options\"}} 8 {SCRAPE_2_S}\n\
         cache_size_bytes_gsum{{db=\"options\"}} 18.0 {SCRAPE_2_S}\n\
         cache_size_bytes_created{{db=\"options\"}} {CREATED_2_S} {SCRAPE_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP cache_size_bytes number of bytes in the cache\n\
         # TYPE cache_size_bytes histogram\n\
         cache_size_bytes_bucket{{db=\"items\",le=\"2.0\"}} 3 {SCRAPE_1_S}\n\
         cache_size_bytes_bucket{{db=\"items\",le=\"+Inf\"}} 7 {SCRAPE_1_S}\n\
         cache_size_bytes_bucket{{db=\"options\",le=\"2.0\"}} 4 {SCRAPE_2_S}\n\
         cache_size_bytes_bucket{{db=\"options\",le=\"+Inf\"}} 8 {SCRAPE_2_S}\n\
         # HELP cache_size_bytes_gcount number of bytes in the cache\n\
         # TYPE cache_size_bytes_gcount gauge\n\
         cache_size_bytes_gcount{{db=\"items\"}} 7 {SCRAPE_1_S}\n\
         cache_size_bytes_gcount{{db=\"options\"}} 8 {SCRAPE_2_S}\n\
         # HELP cache_size_bytes_gsum number of bytes in the cache\n\
         # TYPE cache_size_bytes_gsum gauge\n\
         cache_size_bytes_gsum{{db=\"items\"}} 17.0 {SCRAPE_1_S}\n\
         cache_size_bytes_gsum{{db=\"options\"}} 18.0 {SCRAPE_2_S}\n\
         # HELP cache_size_bytes_created number of bytes in the cache\n\
         # TYPE cache_size_bytes_created gauge\n\
         cache_size_bytes_created{{db=\"items\"}} {CREATED_1_S} {SCRAPE_1_S}\n\
         cache_size_bytes_created{{db=\"options\"}} {CREATED_2_S} {SCRAPE_2_S}\n"
    );
    let snapshot = HistogramSnapshot::new(
        metadata(
            "cache_size_bytes",
            MetricType::GaugeHistogram,
            Some("number of bytes in the cache"),
            Some(Unit::bytes()),
        ),
        vec![
            histogram_data(
                vec![(2.0, 3), (f64::INFINITY, 7)],
                Some(17.0),
                Labels::of(&[("db", "items")]).unwrap(),
                Some((CREATED_1, SCRAPE_1)),
            ),
            histogram_data(
                vec![(2.0, 4), (f64::INFINITY, 8)],
                Some(18.0),
                Labels::of(&[("db", "options")]).unwrap(),
                Some((CREATED_2, SCRAPE_2)),
            ),
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn gauge_histogram_minimal() {
    let snapshot = HistogramSnapshot::new(
        metadata("queue_size_bytes", MetricType::GaugeHistogram, None, None),
        vec![HistogramData {
            buckets: HistogramBuckets::new(vec![(f64::INFINITY, 130)]).unwrap(),
            sum: None,
            labels: Labels::empty(),
            exemplars: Exemplars::empty(),
            created_timestamp_millis: None,
            scrape_timestamp_millis: None,
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE queue_size_bytes gaugehistogram\n\
         queue_size_bytes_bucket{le=\"+Inf\"} 130\n\
         # EOF\n",
        "# TYPE queue_size_bytes histogram\n\
         queue_size_bytes_bucket{le=\"+Inf\"} 130\n\
         # TYPE queue_size_bytes_gcount gauge\n\
         queue_size_bytes_gcount 130\n",
        snapshot.into(),
    );
}

#[test]
fn gauge_histogram_count_and_sum() {
    let snapshot = HistogramSnapshot::new(
        metadata("queue_size_bytes", MetricType::GaugeHistogram, None, None),
        vec![HistogramData {
            buckets: HistogramBuckets::new(vec![(f64::INFINITY, 130)]).unwrap(),
            sum: Some(27000.0),
            labels: Labels::empty(),
            exemplars: Exemplars::empty(),
            created_timestamp_millis: None,
            scrape_timestamp_millis: None,
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE queue_size_bytes gaugehistogram\n\
         queue_size_bytes_bucket{le=\"+Inf\"} 130\n\
         queue_size_bytes_gcount 130\n\
         queue_size_bytes_gsum 27000.0\n\
         # EOF\n",
        "# TYPE queue_size_bytes histogram\n\
         queue_size_bytes_bucket{le=\"+Inf\"} 130\n\
         # TYPE queue_size_bytes_gcount gauge\n\
         queue_size_bytes_gcount 130\n\
         # TYPE queue_size_bytes_gsum gauge\n\
         queue_size_bytes_gsum 27000.0\n",
        snapshot.into(),
    );
}

#[test]
fn info() {
    let snapshot = InfoSnapshot::new(
        metadata("version", MetricType::Info, Some("version information"), None),
        vec![InfoData {
            labels: Labels::of(&[("version", "1.2.3")]).unwrap(),
            scrape_timestamp_millis: None,
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE version info\n\
         # HELP version version information\n\
         version_info{version=\"1.2.3\"} 1\n\
         # EOF\n",
        "# HELP version_info version information\n\
         # TYPE version_info gauge\n\
         version_info{version=\"1.2.3\"} 1\n",
        snapshot.into(),
    );
}

#[test]
fn state_set_complete() {
    let openmetrics = format!(
        "# TYPE state stateset\n\
         # HELP state complete state set example\n\
         state{{env=\"dev\",state=\"state1\"}} 1 {SCRAPE_1_S}\n\
         state{{env=\"dev\",state=\"state2\"}} 0 {SCRAPE_1_S}\n\
         state{{env=\"prod\",state=\"state1\"}} 0 {SCRAPE_2_S}\n\
         state{{env=\"prod\",state=\"state2\"}} 1 {SCRAPE_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP state complete state set example\n\
         # TYPE state gauge\n\
         state{{env=\"dev\",state=\"state1\"}} 1 {SCRAPE_1_S}\n\
         state{{env=\"dev\",state=\"state2\"}} 0 {SCRAPE_1_S}\n\
         state{{env=\"prod\",state=\"state1\"}} 0 {SCRAPE_2_S}\n\
         state{{env=\"prod\",state=\"state2\"}} 1 {SCRAPE_2_S}\n"
    );
    let snapshot = StateSetSnapshot::new(
        metadata("state", MetricType::StateSet, Some("complete state set example"), None),
        vec![
            StateSetData::new(
                vec![("state1".to_string(), false), ("state2".to_string(), true)],
                Labels::of(&[("env", "prod")]).unwrap(),
                Some(SCRAPE_2),
            )
            .unwrap(),
            StateSetData::new(
                vec![("state2".to_string(), false), ("state1".to_string(), true)],
                Labels::of(&[("env", "dev")]).unwrap(),
                Some(SCRAPE_1),
            )
            .unwrap(),
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn state_set_minimal() {
    let snapshot = StateSetSnapshot::new(
        metadata("state", MetricType::StateSet, None, None),
        vec![StateSetData::new(
            vec![("a".to_string(), true), ("bb".to_string(), false)],
            Labels::empty(),
            None,
        )
        .unwrap()],
    )
    .unwrap();
    assert_formats(
        "# TYPE state stateset\nstate{state=\"a\"} 1\nstate{state=\"bb\"} 0\n# EOF\n",
        "# TYPE state gauge\nstate{state=\"a\"} 1\nstate{state=\"bb\"} 0\n",
        snapshot.into(),
    );
}

#[test]
fn unknown_complete() {
    let openmetrics = format!(
        "# TYPE my_special_thing_bytes unknown\n\
         # UNIT my_special_thing_bytes bytes\n\
         # HELP my_special_thing_bytes help message\n\
         my_special_thing_bytes{{env=\"dev\"}} 0.2 {SCRAPE_1_S} # {EXEMPLAR_1_S}\n\
         my_special_thing_bytes{{env=\"prod\"}} 0.7 {SCRAPE_2_S} # {EXEMPLAR_2_S}\n\
         # EOF\n"
    );
    let prometheus = format!(
        "# HELP my_special_thing_bytes help message\n\
         # TYPE my_special_thing_bytes untyped\n\
         my_special_thing_bytes{{env=\"dev\"}} 0.2 {SCRAPE_1_S}\n\
         my_special_thing_bytes{{env=\"prod\"}} 0.7 {SCRAPE_2_S}\n"
    );
    let snapshot = UnknownSnapshot::new(
        metadata(
            "my_special_thing_bytes",
            MetricType::Unknown,
            Some("help message"),
            Some(Unit::bytes()),
        ),
        vec![
            UnknownData {
                value: 0.7,
                labels: Labels::of(&[("env", "prod")]).unwrap(),
                exemplar: Some(exemplar_2()),
                scrape_timestamp_millis: Some(SCRAPE_2),
            },
            UnknownData {
                value: 0.2,
                labels: Labels::of(&[("env", "dev")]).unwrap(),
                exemplar: Some(exemplar_1()),
                scrape_timestamp_millis: Some(SCRAPE_1),
            },
        ],
    )
    .unwrap();
    assert_formats(&openmetrics, &prometheus, snapshot.into());
}

#[test]
fn unknown_minimal() {
    let snapshot = UnknownSnapshot::new(
        metadata("other", MetricType::Unknown, None, None),
        vec![UnknownData { value: 22.3, ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE other unknown\nother 22.3\n# EOF\n",
        "# TYPE other untyped\nother 22.3\n",
        snapshot.into(),
    );
}

#[test]
fn help_escape() {
    let snapshot = CounterSnapshot::new(
        metadata(
            "test",
            MetricType::Counter,
            Some("Some text and \n some \" escaping"),
            None,
        ),
        vec![CounterData { value: 1.0, ..Default::default() }],
    )
    .unwrap();
    assert_formats(
        "# TYPE test counter\n\
         # HELP test Some text and \\n some \\\" escaping\n\
         test_total 1.0\n\
         # EOF\n",
        "# HELP test_total Some text and \\n some \" escaping\n\
         # TYPE test_total counter\n\
         test_total 1.0\n",
        snapshot.into(),
    );
}

#[test]
fn label_value_escape() {
    let snapshot = CounterSnapshot::new(
        metadata("test", MetricType::Counter, None, None),
        vec![CounterData {
            value: 1.0,
            labels: Labels::of(&[("a", "x"), ("b", "escaping\" example \n ")]).unwrap(),
            ..Default::default()
        }],
    )
    .unwrap();
    assert_formats(
        "# TYPE test counter\n\
         test_total{a=\"x\",b=\"escaping\\\" example \\n \"} 1.0\n\
         # EOF\n",
        "# TYPE test_total counter\n\
         test_total{a=\"x\",b=\"escaping\\\" example \\n \"} 1.0\n",
        snapshot.into(),
    );
}

#[test]
fn empty_set_still_terminated() {
    let snapshots = MetricSnapshots::of(Vec::<MetricSnapshot>::new()).unwrap();

    let mut openmetrics = Vec::new();
    OpenMetricsTextWriter::new().write(&mut openmetrics, &snapshots).unwrap();
    assert_eq!(openmetrics, b"# EOF\n");

    let mut prometheus = Vec::new();
    PrometheusTextWriter::new().write(&mut prometheus, &snapshots).unwrap();
    assert!(prometheus.is_empty());
}

#[test]
fn one_type_header_per_metric_and_one_eof() {
    let counter = CounterSnapshot::new(
        metadata("requests", MetricType::Counter, None, None),
        vec![
            CounterData {
                value: 1.0,
                labels: Labels::of(&[("status", "200")]).unwrap(),
                ..Default::default()
            },
            CounterData {
                value: 2.0,
                labels: Labels::of(&[("status", "500")]).unwrap(),
                ..Default::default()
            },
        ],
    )
    .unwrap();
    let gauge = GaugeSnapshot::new(
        metadata("temperature", MetricType::Gauge, None, None),
        vec![GaugeData { value: 20.0, ..Default::default() }],
    )
    .unwrap();
    let snapshots = MetricSnapshots::of([counter.into(), gauge.into()]).unwrap();

    let mut out = Vec::new();
    OpenMetricsTextWriter::new().write(&mut out, &snapshots).unwrap();
    let rendered = String::from_utf8(out).unwrap();

    assert_eq!(rendered.matches("# TYPE requests ").count(), 1);
    assert_eq!(rendered.matches("# TYPE temperature ").count(), 1);
    assert_eq!(rendered.matches("# EOF").count(), 1);
    assert!(rendered.ends_with("# EOF\n"));
    assert!(rendered.is_ascii());
}

#[test]
fn writer_error_leaves_partial_output() {
    struct FailAfter {
        budget: usize,
        written: Vec<u8>,
    }

    impl std::io::Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.budget == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "sink full"));
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let snapshot = CounterSnapshot::new(
        metadata("my_counter", MetricType::Counter, None, None),
        vec![CounterData { value: 1.1, ..Default::default() }],
    )
    .unwrap();
    let snapshots = MetricSnapshots::of([snapshot.into()]).unwrap();

    let mut sink = FailAfter { budget: 1, written: Vec::new() };
    let result = OpenMetricsTextWriter::new().write(&mut sink, &snapshots);
    assert!(result.is_err());
    assert_eq!(sink.written, b"# TYPE my_counter counter\n");
}
