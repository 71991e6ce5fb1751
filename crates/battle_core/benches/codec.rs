//! Codec benchmarks for battle_core.
//!
//! Run with: `cargo bench -p battle_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::fmt::Write;

use battle_core::combatant::Combatant;
use battle_core::og::{self, OgUnit};
use battle_core::protocol::{decode_response, encode_request, ResponseShape};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn full_fleet() -> Combatant {
    Combatant::new(
        12,
        12,
        12,
        OgUnit::ALL.iter().map(|unit| (unit.kind(), 10_000)),
    )
    .expect("valid fleet")
}

/// Six rounds of a 3-vs-2 battle over the OG registry, `num_simulations` times.
fn canned_output(num_simulations: usize) -> String {
    let shape = ResponseShape::new(OgUnit::ALL.len(), 3, 2);
    let mut out = String::new();
    for _ in 0..num_simulations {
        let _ = write!(out, "6");
        for token in 0..shape.payload_len(6).unwrap_or_default() {
            let _ = write!(out, " {}", token % 997);
        }
        out.push('\n');
    }
    out
}

pub fn encode_benchmark(c: &mut Criterion) {
    let registry = og::registry();
    let attackers = vec![full_fleet(); 3];
    let defenders = vec![full_fleet(); 2];

    c.bench_function("encode_og_request", |b| {
        b.iter(|| encode_request(black_box(registry), &attackers, &defenders))
    });
}

pub fn decode_benchmark(c: &mut Criterion) {
    let shape = ResponseShape::new(OgUnit::ALL.len(), 3, 2);
    let output = canned_output(100);

    c.bench_function("decode_100_simulations", |b| {
        b.iter(|| decode_response(black_box(&output), shape, 100))
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
