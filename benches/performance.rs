//! Performance benchmarks for the read path
//!
//! The adapters reload and rescan the whole results log on every poll, so
//! these track how aggregation scales with log length.

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use speedtest_graphing::{
    timestamp::normalize_with_offset, Aggregator, Metric, ResultsLog, ZabbixKey,
};

/// One record every 30 minutes ending at the reference time, alternating
/// naive and offset-aware timestamps
fn create_sample_records(count: usize) -> Vec<Value> {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let taken_at = now - Duration::minutes(30 * (count - i) as i64);
            let timestamp = if i % 2 == 0 {
                taken_at.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
            } else {
                taken_at.to_rfc3339()
            };
            json!({
                "timestamp": timestamp,
                "download_mbps": 90.0 + (i % 10) as f64,
                "upload_mbps": 18.0 + (i % 5) as f64,
                "ping_ms": 10.0 + (i % 7) as f64,
                "server": {"name": "Example ISP", "location": "Springfield", "country": "US"}
            })
        })
        .collect()
}

fn create_aggregator(count: usize) -> Aggregator {
    Aggregator::new(ResultsLog::new(create_sample_records(count)))
        .with_reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        .with_local_offset(FixedOffset::east_opt(0).unwrap())
}

/// Benchmark timestamp normalisation
fn benchmark_timestamp_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp");
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();

    let inputs = [
        ("naive_fractional", "2024-06-01T10:15:30.123456"),
        ("naive_seconds", "2024-06-01 10:15:30"),
        ("rfc3339", "2024-06-01T10:15:30+02:00"),
        ("zulu", "2024-06-01T10:15:30Z"),
    ];

    for (name, raw) in inputs.iter() {
        group.bench_with_input(BenchmarkId::new("normalize", name), raw, |b, raw| {
            b.iter(|| {
                let instant = normalize_with_offset(black_box(raw), offset);
                black_box(instant.ok());
            });
        });
    }

    group.bench_function("normalize_invalid", |b| {
        b.iter(|| {
            let instant = normalize_with_offset(black_box("not a timestamp"), offset);
            black_box(instant.is_err());
        });
    });

    group.finish();
}

/// Benchmark loading the log from its JSON text
fn benchmark_log_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("results_log");

    for size in [10, 100, 1000, 5000].iter() {
        let content = ResultsLog::new(create_sample_records(*size))
            .to_pretty_json()
            .unwrap();

        group.bench_with_input(BenchmarkId::new("from_json_str", size), &content, |b, content| {
            b.iter(|| {
                let log = ResultsLog::from_json_str(black_box(content)).unwrap();
                black_box(log.len());
            });
        });
    }

    group.finish();
}

/// Benchmark windowed statistics
fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for size in [10, 100, 1000, 5000].iter() {
        let aggregator = create_aggregator(*size);

        group.bench_with_input(BenchmarkId::new("average_24h", size), size, |b, _| {
            b.iter(|| black_box(aggregator.average(black_box(Metric::Download), 24)));
        });

        group.bench_with_input(BenchmarkId::new("count_24h", size), size, |b, _| {
            b.iter(|| black_box(aggregator.count(black_box(24))));
        });

        group.bench_with_input(BenchmarkId::new("window_summary", size), size, |b, _| {
            b.iter(|| black_box(aggregator.window_summary(black_box(24))));
        });
    }

    group.finish();
}

/// Benchmark one full Zabbix poll for every key
fn benchmark_zabbix_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("zabbix");
    let aggregator = create_aggregator(1000);

    for key in ZabbixKey::ALL.iter() {
        group.bench_with_input(BenchmarkId::new("evaluate", key.as_str()), key, |b, key| {
            b.iter(|| black_box(key.evaluate(black_box(&aggregator)).to_string()));
        });
    }

    group.bench_function("parse_key", |b| {
        b.iter(|| black_box("speedtest.download_avg_24h".parse::<ZabbixKey>().is_ok()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_timestamp_parsing,
    benchmark_log_parsing,
    benchmark_aggregation,
    benchmark_zabbix_keys
);

criterion_main!(benches);
