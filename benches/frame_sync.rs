use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_complex::Complex32;

use blocksat_rx_core::config::FrameSyncConfig;
use blocksat_rx_core::logging::SignalLogger;
use blocksat_rx_core::signal_processing::FrameSynchronizer;

fn preamble_qpsk(len: usize) -> (Vec<f32>, Vec<f32>) {
    let i: Vec<f32> = (0..len).map(|n| if n % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let q: Vec<f32> = (0..len)
        .map(|n| if (n / 2) % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    (i, q)
}

fn benchmark_frame_sync_search(c: &mut Criterion) {
    let (pi, pq) = preamble_qpsk(32);
    let preamble: Vec<Complex32> = pi
        .iter()
        .zip(pq.iter())
        .map(|(&i, &q)| Complex32::new(i, q))
        .collect();

    let config = FrameSyncConfig {
        preamble_i: pi,
        preamble_q: pq,
        frame_len: 256,
        ..FrameSyncConfig::default()
    };

    let mut block = vec![Complex32::new(0.05, -0.03); 512];
    block.extend(preamble);
    block.extend(vec![Complex32::new(0.7, 0.7); 256]);

    c.bench_function("frame_sync_search_1024_block", |b| {
        b.iter(|| {
            let mut fs = FrameSynchronizer::new(&config);
            let mut logger = SignalLogger::default();
            fs.process(black_box(&block), &mut logger)
        })
    });
}

criterion_group!(benches, benchmark_frame_sync_search);
criterion_main!(benches);
