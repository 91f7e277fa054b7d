// Copyright 2025 The Stabsim Developers
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use stabsim::prelude::*;

fn bench_pauli_multiplication(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut a = PauliString::random(100_000, &mut rng);
    let b = PauliString::random(100_000, &mut rng);
    c.bench_function("pauli_mul_100k", |bencher| {
        bencher.iter(|| {
            std::hint::black_box(a.mul_with_log_i(b.view()));
        });
    });
}

fn bench_random_tableau(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    c.bench_function("tableau_random_256", |bencher| {
        bencher.iter(|| std::hint::black_box(Tableau::random(256, &mut rng)));
    });
}

fn bench_prepend(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut t = Tableau::random(4096, &mut rng);
    c.bench_function("tableau_prepend_cx_4096", |bencher| {
        bencher.iter(|| {
            t.prepend_cx(100, 3000);
            std::hint::black_box(&t);
        });
    });
}

fn bench_measure_many(c: &mut Criterion) {
    let n = 1024;
    let targets: Vec<usize> = (0..n).collect();
    c.bench_function("sim_layered_ghz_measure_1024", |bencher| {
        bencher.iter(|| {
            let mut sim = TableauSim::with_rng(n, ChaCha8Rng::seed_from_u64(3));
            sim.h(0);
            for k in 1..n {
                sim.cx(k - 1, k);
            }
            std::hint::black_box(sim.measure_many(&targets));
        });
    });
}

criterion_group!(
    benches,
    bench_pauli_multiplication,
    bench_random_tableau,
    bench_prepend,
    bench_measure_many
);
criterion_main!(benches);
