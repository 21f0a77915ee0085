use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostpulse::format::format_bytes;
use hostpulse::system::process::{ProcessEntry, rank_by_cpu};

fn make_entries(n: usize) -> Vec<ProcessEntry> {
    (0..n)
        .map(|i| ProcessEntry {
            pid: i as u32 + 1,
            name: format!("proc_{i}"),
            username: Some(format!("u{}", i % 8)),
            cpu_percent: if i % 7 == 0 {
                None
            } else {
                Some((i % 100) as f32 * 0.37)
            },
            memory_percent: Some((i % 50) as f64 * 0.1),
            start_time: Some(1_700_000_000 + i as u64),
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_by_cpu_500_1000_2000");
    for size in [500usize, 1000, 2000] {
        let entries = make_entries(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| rank_by_cpu(black_box(entries.clone()), 10));
        });
    }
    group.finish();
}

fn bench_format(c: &mut Criterion) {
    c.bench_function("format_bytes_mixed", |b| {
        b.iter(|| {
            for shift in [0u32, 10, 20, 30, 40, 50, 60] {
                black_box(format_bytes(black_box(3u64 << shift)));
            }
        });
    });
}

criterion_group!(benches, bench_rank, bench_format);
criterion_main!(benches);
