/// Property-based tests for token bookkeeping and set rules using proptest
///
/// These tests verify the token limit, board token idempotence and the
/// structure of the classic rules across randomly generated inputs.
use proptest::prelude::*;
use set_arena::game::{Board, Card, ClassicRules, MAX_TOKENS, SetValidator, TokenSet, find_sets};
use set_arena::table::EventBus;
use std::collections::BTreeSet;

const SLOTS: usize = 12;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize),
    Remove(usize),
}

// Strategy to generate token operations on a small table
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SLOTS).prop_map(Op::Insert),
        (0..SLOTS).prop_map(Op::Remove),
    ]
}

// Strategy to generate a card of the 81-card deck
fn card_strategy() -> impl Strategy<Value = Card> {
    (0u16..81).prop_map(Card)
}

proptest! {
    #[test]
    fn test_token_set_never_exceeds_limit(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut tokens = TokenSet::new();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(slot) => {
                    let expected = model.len() < MAX_TOKENS && model.insert(slot);
                    prop_assert_eq!(tokens.insert(slot), expected);
                }
                Op::Remove(slot) => {
                    prop_assert_eq!(tokens.remove(slot), model.remove(&slot));
                }
            }
            prop_assert!(tokens.len() <= MAX_TOKENS);
            prop_assert_eq!(tokens.to_sorted_vec(), model.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_board_token_removal_is_idempotent(
        ops in prop::collection::vec((0usize..3, op_strategy()), 0..64)
    ) {
        let board = Board::new(SLOTS, EventBus::new());
        for slot in 0..SLOTS {
            board.place_card(slot, Card(slot as u16));
        }

        for (player, op) in ops {
            match op {
                Op::Insert(slot) => {
                    let had = board.has_token(player, slot);
                    prop_assert_eq!(board.place_token(player, slot), !had);
                }
                Op::Remove(slot) => {
                    let had = board.has_token(player, slot);
                    prop_assert_eq!(board.remove_token(player, slot), had);
                    prop_assert!(!board.remove_token(player, slot));
                    prop_assert!(!board.has_token(player, slot));
                }
            }
        }
    }

    #[test]
    fn test_set_is_order_independent(a in card_strategy(), b in card_strategy(), c in card_strategy()) {
        let rules = ClassicRules::default();
        let expected = rules.is_set(a, b, c);
        prop_assert_eq!(rules.is_set(b, a, c), expected);
        prop_assert_eq!(rules.is_set(c, b, a), expected);
        prop_assert_eq!(rules.is_set(a, c, b), expected);
    }

    #[test]
    fn test_two_cards_have_exactly_one_completion(a in card_strategy(), b in card_strategy()) {
        prop_assume!(a != b);
        let rules = ClassicRules::default();

        let completions = (0u16..81)
            .map(Card)
            .filter(|&c| rules.is_set(a, b, c))
            .count();
        prop_assert_eq!(completions, 1);
    }

    #[test]
    fn test_found_sets_are_valid(cards in prop::collection::btree_set(card_strategy(), 0..15)) {
        let rules = ClassicRules::default();
        let cards: Vec<Card> = cards.into_iter().collect();

        for [a, b, c] in find_sets(&rules, &cards, usize::MAX) {
            prop_assert!(rules.is_set(a, b, c));
            prop_assert!(cards.contains(&a) && cards.contains(&b) && cards.contains(&c));
        }
    }
}

#[test]
fn test_cards_without_token_cannot_be_claimed() {
    let board = Board::new(3, EventBus::new());
    assert!(!board.place_token(0, 1), "no card on slot");
    assert!(!board.place_token(0, 7), "slot out of range");
    assert!(board.tokens_of(0).is_empty());
}
