//! Performance benchmarks for TrackLayout
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use track_layout::core::{
    CoordinateRemapper, GroupBlocks, Interval, IntervalPacker, LayoutConfig, LayoutEngine,
    PackingMode, ShrinkRegionCalculator, ShrinkThreshold, Span,
};

/// Deterministic pseudo-random transcripts: `groups` groups of 2-10 exons
fn synthetic_transcripts(groups: usize, chromosomes: usize) -> Vec<Interval> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut intervals = Vec::new();
    for g in 0..groups {
        let chrom = format!("chr{}", g % chromosomes + 1);
        let mut pos = next() % 50_000_000;
        let exons = 2 + next() % 9;
        for _ in 0..exons {
            let len = 50 + next() % 400;
            intervals.push(Interval::new(chrom.as_str(), pos, pos + len).with_group(format!("tx{}", g)));
            pos += len + 100 + next() % 20_000;
        }
    }
    intervals
}

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    for size in [1_000usize, 10_000, 50_000] {
        let intervals = synthetic_transcripts(size, 1);
        let spans: Vec<Span> = intervals.iter().map(|iv| iv.span()).collect();
        group.throughput(Throughput::Elements(spans.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &spans, |b, spans| {
            let packer = IntervalPacker::new(PackingMode::Packed);
            b.iter(|| black_box(packer.pack(black_box(spans)).unwrap()))
        });
    }
    group.finish();
}

fn bench_shrink_and_remap(c: &mut Criterion) {
    let intervals = synthetic_transcripts(10_000, 1);
    let mut by_group: std::collections::BTreeMap<String, GroupBlocks> = Default::default();
    for iv in &intervals {
        by_group
            .entry(iv.group_id.clone().unwrap_or_default())
            .or_default()
            .push(iv.span());
    }
    let groups: Vec<GroupBlocks> = by_group.into_values().collect();
    let calc = ShrinkRegionCalculator::new(500);

    c.bench_function("shrink_regions_10k", |b| {
        b.iter(|| black_box(calc.compute("chr1", black_box(&groups))))
    });

    let regions = calc.compute("chr1", &groups);
    let remapper = CoordinateRemapper::new(&regions);
    c.bench_function("remap_100k_points", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for x in (0..50_000_000u64).step_by(500) {
                acc = acc.wrapping_add(remapper.remap(black_box(x)));
            }
            black_box(acc)
        })
    });
}

fn bench_engine(c: &mut Criterion) {
    let intervals = synthetic_transcripts(20_000, 8);
    let config = LayoutConfig {
        shrink: true,
        shrink_threshold: ShrinkThreshold::Absolute(500),
        max_shown: None,
        ..Default::default()
    };
    let engine = LayoutEngine::new(config);

    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(intervals.len() as u64));
    group.bench_function("layout_20k_groups_8_chroms", |b| {
        b.iter(|| black_box(engine.run(black_box(&intervals)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_packing, bench_shrink_and_remap, bench_engine);
criterion_main!(benches);
