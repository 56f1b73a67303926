//! Search benchmarks for performance profiling.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - Full search with varying simulation counts and board sizes
//! - Search from different game phases (opening, midgame, late game)
//! - Tree operations (expansion, incremental search, root advancement)
//! - Batched lookahead at different batch widths
//! - Evaluator and exploration-constant comparisons

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use go_mcts::{
    immediate_lookahead, AreaEvaluator, GameRules, PlacementGame, PlacementState, SearchConfig,
    SearchTree, UniformEvaluator,
};

/// Canonical state reached by playing a fixed move sequence from the empty
/// board.
fn state_after(game: &PlacementGame, moves: &[usize]) -> PlacementState {
    let mut state = game.init_board();
    for &action in moves {
        state = game.next_state(&state, action);
    }
    game.canonical_form(&state, game.turn(&state))
}

// =============================================================================
// Full Search Benchmarks
// =============================================================================

fn bench_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_simulations");

    for sims in [8, 32, 128, 512] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("9x9", sims), &sims, |b, &sims| {
            let game = PlacementGame::new(9);
            let config = SearchConfig::for_testing();

            b.iter(|| {
                let evaluator = UniformEvaluator::new(game.action_size());
                let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
                black_box(tree.action_probs(sims, 1.0).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_board_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_board_sizes");
    let sims = 64u32;

    for size in [5, 9, 13] {
        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, &size| {
            let game = PlacementGame::new(size);
            let config = SearchConfig::for_testing();

            b.iter(|| {
                let evaluator = UniformEvaluator::new(game.action_size());
                let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
                black_box(tree.action_probs(sims, 1.0).unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Game Phase Benchmarks
// =============================================================================

fn bench_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_game_phases");
    let sims = 64u32;
    let game = PlacementGame::new(9);
    let config = SearchConfig::for_testing();

    // Empty board, every action legal
    group.bench_function("opening", |b| {
        b.iter(|| {
            let evaluator = UniformEvaluator::new(game.action_size());
            let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
            black_box(tree.action_probs(sims, 1.0).unwrap())
        });
    });

    // Ten stones on the board
    let midgame = state_after(&game, &[40, 0, 20, 60, 41, 1, 21, 61, 42, 2]);
    group.bench_function("midgame", |b| {
        b.iter(|| {
            let evaluator = UniformEvaluator::new(game.action_size());
            let mut tree =
                SearchTree::from_state(game, evaluator, &config, midgame.clone()).unwrap();
            black_box(tree.action_probs(sims, 1.0).unwrap())
        });
    });

    // One pass on the streak: expansions reach terminal children
    let late = state_after(&game, &[40, game.pass_action()]);
    group.bench_function("late", |b| {
        b.iter(|| {
            let evaluator = UniformEvaluator::new(game.action_size());
            let mut tree = SearchTree::from_state(game, evaluator, &config, late.clone()).unwrap();
            black_box(tree.action_probs(sims, 1.0).unwrap())
        });
    });

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_tree_ops");
    let game = PlacementGame::new(9);
    let config = SearchConfig::for_testing();

    // One simulation from a fresh tree: dominated by the first expansion,
    // a single 82-state lookahead call
    group.bench_function("first_expansion", |b| {
        b.iter(|| {
            let evaluator = UniformEvaluator::new(game.action_size());
            let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
            black_box(tree.action_probs(1, 1.0).unwrap())
        });
    });

    // Steady-state per-simulation cost on a warm tree
    group.bench_function("incremental_search", |b| {
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
        tree.action_probs(128, 1.0).unwrap();

        b.iter(|| black_box(tree.action_probs(1, 1.0).unwrap()));
    });

    // Promoting a searched child to root, discarding the rest of the arena
    group.bench_function("step_promotion", |b| {
        b.iter_batched(
            || {
                let evaluator = UniformEvaluator::new(game.action_size());
                let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
                tree.action_probs(32, 1.0).unwrap();
                tree
            },
            |mut tree| {
                tree.step(0).unwrap();
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("reset", |b| {
        b.iter_batched(
            || {
                let evaluator = UniformEvaluator::new(game.action_size());
                let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
                tree.action_probs(32, 1.0).unwrap();
                tree
            },
            |mut tree| {
                tree.reset().unwrap();
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    // Per-action mean values over a searched root
    group.bench_function("action_values", |b| {
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
        tree.action_probs(64, 1.0).unwrap();

        b.iter(|| black_box(tree.action_values(tree.root())));
    });

    group.finish();
}

// =============================================================================
// Lookahead Batch Benchmarks
// =============================================================================

fn bench_lookahead_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_lookahead_batches");
    let game = PlacementGame::new(9);
    let evaluator = UniformEvaluator::new(game.action_size());

    for batch in [1usize, 4, 16] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("states", batch), &batch, |b, &batch| {
            // Distinct single-stone states so each contributes 81 children
            let states: Vec<PlacementState> =
                (0..batch).map(|i| state_after(&game, &[i])).collect();

            b.iter(|| black_box(immediate_lookahead(&game, &evaluator, &states).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Configuration Comparison Benchmarks
// =============================================================================

fn bench_exploration_constants(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_exploration");
    let sims = 64u32;
    let game = PlacementGame::new(9);

    for u_const in [0.5, 1.0, 2.5] {
        group.bench_with_input(
            BenchmarkId::new("u_const", u_const),
            &u_const,
            |b, &u_const| {
                let config = SearchConfig::for_testing().with_exploration(u_const);

                b.iter(|| {
                    let evaluator = UniformEvaluator::new(game.action_size());
                    let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
                    black_box(tree.action_probs(sims, 1.0).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_evaluators(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_evaluators");
    let sims = 64u32;
    let game = PlacementGame::new(9);
    let config = SearchConfig::for_testing();

    group.bench_function("uniform", |b| {
        b.iter(|| {
            let evaluator = UniformEvaluator::new(game.action_size());
            let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
            black_box(tree.action_probs(sims, 1.0).unwrap())
        });
    });

    group.bench_function("area", |b| {
        b.iter(|| {
            let evaluator = AreaEvaluator::new(game);
            let mut tree = SearchTree::new(game, evaluator, &config).unwrap();
            black_box(tree.action_probs(sims, 1.0).unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_search_simulations,
    bench_board_sizes,
    bench_game_phases,
    bench_tree_operations,
    bench_lookahead_batches,
    bench_exploration_constants,
    bench_evaluators,
);

criterion_main!(benches);
