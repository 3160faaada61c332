use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use liveness::{
    EndpointProber, HttpProber, ProbeScheduler, ProbeTask, ProberSettings, selection::pick_live,
};
use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn selection_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    for len in [4usize, 64, 1024].iter() {
        // Worst case: only the candidate just before the start index is
        // live, forcing a full wrap
        let results: HashMap<usize, bool> = (0..*len).map(|i| (i, i + 2 == *len)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, &len| {
            b.iter(|| black_box(pick_live(len, len - 1, &results)));
        });
    }

    group.finish();
}

fn http_probe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("http_probe");

    // Probe against a refused port (measures the failure path)
    let prober = HttpProber::new(ProberSettings {
        timeout: Duration::from_millis(100),
        ..ProberSettings::default()
    })
    .unwrap();

    group.bench_function("connection_refused", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        b.iter(|| rt.block_on(async { black_box(prober.probe("http://127.0.0.1:1/s.ts").await) }));
    });

    group.finish();
}

struct InstantProber;

#[async_trait]
impl EndpointProber for InstantProber {
    async fn probe(&self, _url: &str) -> bool {
        true
    }
}

fn scheduler_overhead_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_overhead");
    group.sample_size(20);

    for count in [10usize, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let scheduler = ProbeScheduler::new(Arc::new(InstantProber), 3);
            b.iter(|| {
                rt.block_on(async {
                    let tasks: Vec<_> = (0..count)
                        .map(|i| ProbeTask::new("bench", i, format!("http://host-{}/s.ts", i)))
                        .collect();
                    black_box(scheduler.run(tasks).await)
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    selection_benchmark,
    http_probe_benchmark,
    scheduler_overhead_benchmark,
);

criterion_main!(benches);
