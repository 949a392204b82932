//! Reconstruction benchmarks
//!
//! Run with: cargo bench -p ttreco-core
//!
//! Covers the neutrino solver, both reconstructors as jet multiplicity grows,
//! and the parallel batch driver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ttreco_core::{
    reconstruct_events, solve_neutrino_pz, EventInput, FourMomentum, HadronicWReconstructor, Jet,
    JetCandidates, LeptonInput, MetInput, PzSelection, ReconstructionConfig,
};

fn jets(n: usize) -> Vec<Jet> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            let btag = if i % 3 == 0 { 0.9 - 0.01 * f } else { 0.1 };
            Jet::new(120.0 - 8.0 * f, -2.0 + 0.37 * f, 0.9 * f, 5.0, btag)
        })
        .collect()
}

fn lepton() -> FourMomentum {
    FourMomentum::from_pt_eta_phi_m(40.0, 0.5, 0.0, 0.000511)
}

fn met() -> FourMomentum {
    FourMomentum::transverse(30.0, 10.0)
}

// ═══════════════════════════════════════════════════════════════════════════
// SOLVER
// ═══════════════════════════════════════════════════════════════════════════

fn bench_neutrino(c: &mut Criterion) {
    let (l, m) = (lepton(), met());
    c.bench_function("neutrino_pz", |b| {
        b.iter(|| {
            solve_neutrino_pz(
                black_box(&l),
                black_box(&m),
                0.000511,
                80.4,
                PzSelection::Default,
            )
        })
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// RECONSTRUCTORS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_ttbar(c: &mut Criterion) {
    let reco = ReconstructionConfig::default()
        .ttbar_reconstructor()
        .expect("default widths are positive");
    let (l, m) = (lepton(), met());

    let mut group = c.benchmark_group("ttbar");
    for n in [4usize, 6, 8, 12] {
        let jets = jets(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &jets, |b, jets| {
            b.iter(|| {
                let cands = JetCandidates::all(jets.as_slice()).ok()?;
                reco.reconstruct(black_box(&l), black_box(&m), &cands).ok()
            })
        });
    }
    group.finish();
}

fn bench_hadronic_w(c: &mut Criterion) {
    let reco = HadronicWReconstructor::new(0.71, 80.4, 24.0).expect("positive W width");

    let mut group = c.benchmark_group("hadronic_w");
    for n in [4usize, 8, 12] {
        let jets = jets(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &jets, |b, jets| {
            b.iter(|| {
                let cands = JetCandidates::all(jets.as_slice()).ok()?;
                reco.reconstruct(&cands).ok()
            })
        });
    }
    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// BATCH
// ═══════════════════════════════════════════════════════════════════════════

fn bench_batch(c: &mut Criterion) {
    let config = ReconstructionConfig::default();
    let events: Vec<EventInput> = (0..1024u64)
        .map(|i| EventInput {
            event_id: i,
            lepton: LeptonInput {
                pt: 40.0,
                eta: 0.5,
                phi: 0.001 * i as f64,
                mass: 0.000511,
            },
            met: MetInput {
                pt: 31.6,
                phi: 0.32,
            },
            jets: jets(4 + (i as usize % 5)),
            candidates: None,
        })
        .collect();

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("reconstruct_events_1024", |b| {
        b.iter(|| reconstruct_events(black_box(&events), &config))
    });
    group.finish();
}

criterion_group!(benches, bench_neutrino, bench_ttbar, bench_hadronic_w, bench_batch);
criterion_main!(benches);
