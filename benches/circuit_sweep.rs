use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eisy::circuits::{evaluate, CircuitElements, CircuitSpec, Topology};
use eisy::record::{simulate, AlterationRequest, SimulationOptions};
use eisy::alterations::Alteration;
use eisy::sweep::freq_gen;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn randles() -> CircuitSpec {
    CircuitSpec::new(
        Topology::Randles,
        CircuitElements::from_pairs([
            ("Rs", 20.0),
            ("Rp", 250.0),
            ("Q", 2e-5),
            ("alpha", 0.85),
            ("sigma", 150.0),
        ]),
    )
    .expect("valid spec")
}

fn bench_circuit_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_sweep");
    let sweep = freq_gen(1.0e8, 1.0e-3, 100).expect("valid range");
    let spec = randles();

    group.bench_function(BenchmarkId::new("randles_evaluate", sweep.len()), |b| {
        b.iter(|| evaluate(&spec, sweep.angular_frequency()))
    });

    let request = AlterationRequest::new(Alteration::CurrentNoise, 0.2);
    let options = SimulationOptions::default();
    let mut rng = StdRng::seed_from_u64(0);
    group.bench_function(BenchmarkId::new("randles_simulate_current_noise", sweep.len()), |b| {
        b.iter(|| simulate(&sweep, &spec, Some(&request), &options, &mut rng))
    });
    group.finish();
}

criterion_group!(benches, bench_circuit_sweep);
criterion_main!(benches);
