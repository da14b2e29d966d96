//! Draw pile of cards not currently on the board.

use super::entities::Card;
use rand::{Rng, seq::SliceRandom};
use std::collections::VecDeque;

/// Cards waiting to be dealt, drawn from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// A deck holding every card id in `0..size`, in order.
    pub fn full(size: usize) -> Self {
        let size = u16::try_from(size).unwrap_or(u16::MAX);
        Self {
            cards: (0..size).map(Card).collect(),
        }
    }

    /// A deck that deals `cards` in the given order.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Put cards back at the bottom of the deck.
    pub fn return_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn test_full_deck_is_unique() {
        let deck = Deck::full(81);
        let unique: HashSet<_> = deck.iter().collect();
        assert_eq!(deck.len(), 81);
        assert_eq!(unique.len(), 81);
    }

    #[test]
    fn test_deals_in_order() {
        let mut deck = Deck::from_cards([Card(7), Card(3)]);
        assert_eq!(deck.deal(), Some(Card(7)));
        assert_eq!(deck.deal(), Some(Card(3)));
        assert_eq!(deck.deal(), None);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut deck = Deck::full(27);
        let mut rng = StdRng::seed_from_u64(7);
        deck.shuffle(&mut rng);
        let mut cards: Vec<_> = deck.iter().collect();
        cards.sort();
        assert_eq!(cards, (0..27).map(Card).collect::<Vec<_>>());
    }

    #[test]
    fn test_return_cards_goes_to_bottom() {
        let mut deck = Deck::from_cards([Card(1)]);
        deck.return_cards([Card(2), Card(3)]);
        assert_eq!(deck.deal(), Some(Card(1)));
        assert_eq!(deck.len(), 2);
    }
}
