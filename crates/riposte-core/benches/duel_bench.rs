//! Performance benchmarks for the duel core.
//!
//! Run with: cargo bench --package riposte-core
//!
//! This will generate HTML reports in target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use riposte_core::config::OpponentAiConfig;
use riposte_core::{
    ActorId, CombatSession, DecisionEngine, FixedTimings, NullPresentation, SessionBuilder,
    SessionConfig, Side,
};

const FRAME: f32 = 1.0 / 60.0;

fn new_session(seed: u64) -> CombatSession {
    let config = SessionConfig {
        seed,
        ..SessionConfig::default()
    };
    SessionBuilder::new()
        .config(config)
        .timings(FixedTimings::standard())
        .presentation(NullPresentation)
        .build()
        .expect("default config is valid")
}

fn bench_action_selection(c: &mut Criterion) {
    let engine = DecisionEngine::new(OpponentAiConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("choose_next_action", |b| {
        b.iter(|| black_box(engine.choose_next_action(None, &mut rng)));
    });
}

fn bench_duel(c: &mut Criterion) {
    let mut group = c.benchmark_group("duel");

    for seconds in [10_usize, 60] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{seconds}s")),
            &seconds,
            |b, &seconds| {
                b.iter(|| {
                    let mut session = new_session(7);
                    let mut side = Side::Left;
                    for frame in 0..seconds * 60 {
                        if let Some(guard) = session.pending_impact(ActorId::Opponent) {
                            session.player_defend(guard);
                        } else if frame % 45 == 0 {
                            session.player_attack(side);
                            side = side.opposite();
                        }
                        session.step(FRAME);
                    }
                    black_box(session.take_events())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_action_selection, bench_duel);
criterion_main!(benches);
