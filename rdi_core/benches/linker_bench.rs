use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rdi_core::config::{AnalysisConfig, AssignmentStrategy};
use rdi_core::linker::link;
use rdi_core::pipeline::analyze;
use rdi_core::types::{Detection, DetectionSet, Frame};

/// `n` cells per frame on a staggered grid, all drifting +20 px/frame,
/// spaced tightly enough that the search radius overlaps neighbours.
fn make_flow(n: usize, frames: u64) -> DetectionSet {
    let frames = (0..frames)
        .map(|f| {
            let detections = (0..n)
                .map(|i| {
                    let col = (i % 20) as f64;
                    let row = (i / 20) as f64;
                    let x = col * 40.0 + row * 7.0 + 20.0 * f as f64;
                    let y = row * 30.0;
                    Detection::new(f, x, y, 12.0, 2000.0 + i as f64)
                })
                .collect();
            Frame::new(f, detections)
        })
        .collect();
    DetectionSet::from_frames(frames).unwrap()
}

fn bench_linker(c: &mut Criterion) {
    let mut group = c.benchmark_group("linker");
    let config = AnalysisConfig::default();

    for n in [20, 100, 400] {
        let set = make_flow(n, 20);
        group.bench_function(format!("{n}_cells_optimal"), |b| {
            b.iter(|| black_box(link(&set, &config.linker).unwrap()));
        });

        let mut greedy = config.linker.clone();
        greedy.assignment = AssignmentStrategy::Greedy;
        group.bench_function(format!("{n}_cells_greedy"), |b| {
            b.iter(|| black_box(link(&set, &greedy).unwrap()));
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let set = make_flow(100, 40);
    let config = AnalysisConfig::default();
    c.bench_function("analyze_100_cells", |b| {
        b.iter(|| black_box(analyze(&set, &config).unwrap()));
    });
}

criterion_group!(benches, bench_linker, bench_analyze);
criterion_main!(benches);
