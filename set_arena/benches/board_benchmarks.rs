use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use set_arena::{
    game::{Board, Card, ClassicRules, Deck, TokenSet, find_sets},
    table::EventBus,
};
use std::hint::black_box;

/// Helper to create a full board dealt from a shuffled deck
fn setup_board(size: usize, seed: u64) -> Board {
    let board = Board::new(size, EventBus::new());
    let mut deck = Deck::full(81);
    deck.shuffle(&mut StdRng::seed_from_u64(seed));
    for slot in 0..size {
        if let Some(card) = deck.deal() {
            board.place_card(slot, card);
        }
    }
    board
}

/// Benchmark a token toggle on one slot
fn bench_token_toggle(c: &mut Criterion) {
    let board = setup_board(12, 1);

    c.bench_function("token_toggle", |b| {
        b.iter(|| {
            board.place_token(black_box(0), black_box(5));
            board.remove_token(black_box(0), black_box(5));
        });
    });
}

/// Benchmark the atomic three-slot claim snapshot
fn bench_snapshot_claim(c: &mut Criterion) {
    let board = setup_board(12, 2);
    let mut tokens = TokenSet::new();
    for slot in [2, 7, 11] {
        board.place_token(0, slot);
        tokens.insert(slot);
    }

    c.bench_function("snapshot_claim", |b| {
        b.iter(|| board.snapshot_claim(black_box(0), black_box(&tokens)));
    });
}

/// Benchmark set search across board sizes
fn bench_find_sets(c: &mut Criterion) {
    let rules = ClassicRules::default();
    let mut group = c.benchmark_group("find_sets");

    for size in [12, 15, 21] {
        let board = setup_board(size, 3);
        let cards: Vec<Card> = board.cards();
        group.bench_with_input(BenchmarkId::from_parameter(size), &cards, |b, cards| {
            b.iter(|| find_sets(&rules, black_box(cards), usize::MAX));
        });
    }

    group.finish();
}

/// Benchmark the game-over check over a whole deck
fn bench_any_set_in_deck(c: &mut Criterion) {
    let rules = ClassicRules::default();
    let cards: Vec<Card> = Deck::full(81).iter().collect();

    c.bench_function("any_set_in_deck", |b| {
        b.iter(|| find_sets(&rules, black_box(&cards), 1));
    });
}

criterion_group!(board_operations, bench_token_toggle, bench_snapshot_claim);

criterion_group!(set_search, bench_find_sets, bench_any_set_in_deck);

criterion_main!(board_operations, set_search);
