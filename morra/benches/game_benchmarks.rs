use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use morra::{
    GameRecord, GameService, PlayerId,
    commitment::{Salt, commit},
    functional::determine_outcome,
    game::{Card, Prediction},
    state_machine,
};

fn card(v: u8) -> Card {
    Card::new(v).unwrap()
}

fn prediction(v: u8) -> Prediction {
    Prediction::new(v).unwrap()
}

/// Benchmark commitment hashing with different salt lengths
fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for salt_len in [8, 64, 512].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_byte_salt", salt_len)),
            salt_len,
            |b, &n| {
                let salt = Salt::new(&"s".repeat(n));
                b.iter(|| commit(card(3), prediction(7), &salt));
            },
        );
    }

    group.finish();
}

/// Benchmark scoring every possible round
fn bench_determine_outcome_all_rounds(c: &mut Criterion) {
    c.bench_function("determine_outcome_all_rounds", |b| {
        b.iter(|| {
            let mut creator_wins = 0u32;
            for c1 in 1..=5 {
                for c2 in 1..=5 {
                    for p1 in 1..=10 {
                        for p2 in 1..=10 {
                            let result =
                                determine_outcome(card(c1), prediction(p1), card(c2), prediction(p2));
                            if result == morra::functional::RoundResult::CreatorWins {
                                creator_wins += 1;
                            }
                        }
                    }
                }
            }
            creator_wins
        });
    });
}

/// Benchmark the pure transitions of one round, no store involved
fn bench_state_machine_round(c: &mut Criterion) {
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");
    let (s1, s2) = (Salt::new("abc"), Salt::new("xyz"));
    let (c1, c2) = (
        commit(card(3), prediction(7), &s1),
        commit(card(4), prediction(7), &s2),
    );

    c.bench_function("state_machine_round", |b| {
        b.iter_batched(
            || GameRecord::new(alice.clone(), 0),
            |mut record| {
                state_machine::join(&mut record, &bob).unwrap();
                state_machine::submit_move(&mut record, &alice, c1.clone()).unwrap();
                state_machine::submit_move(&mut record, &bob, c2.clone()).unwrap();
                state_machine::reveal_move(&mut record, &alice, card(3), prediction(7), &s1)
                    .unwrap();
                state_machine::reveal_move(&mut record, &bob, card(4), prediction(7), &s2)
                    .unwrap();
                record
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark a full round through the service and in-memory store
fn bench_service_round(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let service = GameService::in_memory();
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");
    let (s1, s2) = (Salt::new("abc"), Salt::new("xyz"));

    c.bench_function("service_round", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let id = service.create_game(&alice, 0).await.unwrap();
                service.join_game(id, &bob).await.unwrap();
                service
                    .submit_move(id, &alice, commit(card(3), prediction(7), &s1))
                    .await
                    .unwrap();
                service
                    .submit_move(id, &bob, commit(card(4), prediction(7), &s2))
                    .await
                    .unwrap();
                service.reveal_move(id, &alice, 3, 7, &s1).await.unwrap();
                service.reveal_move(id, &bob, 4, 7, &s2).await.unwrap()
            })
        });
    });
}

criterion_group!(
    scoring,
    bench_commit,
    bench_determine_outcome_all_rounds,
);

criterion_group!(
    game_operations,
    bench_state_machine_round,
    bench_service_round,
);

criterion_main!(scoring, game_operations);
