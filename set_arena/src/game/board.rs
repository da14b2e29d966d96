//! Shared board: cards and player tokens per slot.
//!
//! Each slot sits behind its own lock so players touching different slots
//! never contend. Operations spanning several slots ([`Board::lock_slots`],
//! [`Board::take_all_cards`]) always lock in ascending slot order, which rules
//! out lock-order deadlocks. No lock is ever held across an `.await`.

use super::entities::{Card, Claim, MAX_TOKENS, PlayerId, SlotIndex, TokenSet};
use crate::table::events::{EventBus, TableEvent};
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct Slot {
    card: Option<Card>,
    tokens: BTreeSet<PlayerId>,
}

/// What [`Board::clear_slot`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedSlot {
    pub slot: SlotIndex,
    pub card: Card,
    /// Players whose tokens were on the slot
    pub displaced: Vec<PlayerId>,
}

pub struct Board {
    slots: Vec<Mutex<Slot>>,
    events: EventBus,
}

impl Board {
    pub fn new(size: usize, events: EventBus) -> Self {
        Self {
            slots: (0..size).map(|_| Mutex::new(Slot::default())).collect(),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Place `player`'s token on `slot`.
    ///
    /// Fails without side effects if the slot holds no card or already
    /// carries this player's token.
    pub fn place_token(&self, player: PlayerId, slot: SlotIndex) -> bool {
        let Some(cell) = self.slots.get(slot) else {
            return false;
        };
        let mut guard = cell.lock();
        if guard.card.is_none() || !guard.tokens.insert(player) {
            return false;
        }
        self.events.publish(TableEvent::TokenPlaced { player, slot });
        true
    }

    /// Remove `player`'s token from `slot`. Idempotent.
    pub fn remove_token(&self, player: PlayerId, slot: SlotIndex) -> bool {
        let Some(cell) = self.slots.get(slot) else {
            return false;
        };
        let mut guard = cell.lock();
        if !guard.tokens.remove(&player) {
            return false;
        }
        self.events.publish(TableEvent::TokenRemoved { player, slot });
        true
    }

    pub fn has_token(&self, player: PlayerId, slot: SlotIndex) -> bool {
        self.slots
            .get(slot)
            .is_some_and(|cell| cell.lock().tokens.contains(&player))
    }

    pub fn is_slot_occupied_by_card(&self, slot: SlotIndex) -> bool {
        self.card_at(slot).is_some()
    }

    pub fn card_at(&self, slot: SlotIndex) -> Option<Card> {
        self.slots.get(slot).and_then(|cell| cell.lock().card)
    }

    /// Slots carrying `player`'s token, ascending.
    pub fn tokens_of(&self, player: PlayerId) -> Vec<SlotIndex> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.lock().tokens.contains(&player))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Put a card on an empty slot. Dealer only.
    pub fn place_card(&self, slot: SlotIndex, card: Card) -> bool {
        let Some(cell) = self.slots.get(slot) else {
            return false;
        };
        let mut guard = cell.lock();
        if guard.card.is_some() {
            return false;
        }
        guard.card = Some(card);
        self.events.publish(TableEvent::CardPlaced { slot, card });
        true
    }

    /// Remove the card and every token on `slot` in one step. Dealer only.
    pub fn clear_slot(&self, slot: SlotIndex) -> Option<ClearedSlot> {
        let cell = self.slots.get(slot)?;
        let mut guard = cell.lock();
        clear_locked(&self.events, slot, &mut guard)
    }

    /// Remove every card and token atomically. Dealer only.
    ///
    /// Returns the removed cards and, per player, the slots their tokens were on.
    pub fn take_all_cards(&self) -> (Vec<Card>, BTreeMap<PlayerId, Vec<SlotIndex>>) {
        let mut guards: Vec<_> = self.slots.iter().map(|cell| cell.lock()).collect();
        let mut cards = Vec::new();
        let mut displaced: BTreeMap<PlayerId, Vec<SlotIndex>> = BTreeMap::new();
        for (slot, guard) in guards.iter_mut().enumerate() {
            if let Some(cleared) = clear_locked(&self.events, slot, guard) {
                cards.push(cleared.card);
                for player in cleared.displaced {
                    displaced.entry(player).or_default().push(slot);
                }
            }
        }
        (cards, displaced)
    }

    /// Cards currently on the board, in slot order.
    pub fn cards(&self) -> Vec<Card> {
        self.slots.iter().filter_map(|cell| cell.lock().card).collect()
    }

    pub fn count_cards(&self) -> usize {
        self.slots
            .iter()
            .filter(|cell| cell.lock().card.is_some())
            .count()
    }

    pub fn empty_slots(&self) -> Vec<SlotIndex> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.lock().card.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Lock several slots at once, in ascending order.
    ///
    /// Returns `None` if any index is out of range. Duplicates are ignored.
    pub fn lock_slots(&self, slots: &[SlotIndex]) -> Option<SlotGroup<'_>> {
        let wanted: BTreeSet<SlotIndex> = slots.iter().copied().collect();
        if wanted.iter().any(|&slot| slot >= self.slots.len()) {
            return None;
        }
        let guards = wanted
            .into_iter()
            .map(|slot| (slot, self.slots[slot].lock()))
            .collect();
        Some(SlotGroup {
            events: &self.events,
            guards,
        })
    }

    /// Form a claim from a full token set if all three tokens are on the
    /// board, each on a card, at the same instant.
    pub fn snapshot_claim(&self, player: PlayerId, tokens: &TokenSet) -> Option<Claim> {
        let slots = tokens.as_triple()?;
        let group = self.lock_slots(&slots)?;
        let mut cards = [Card(0); MAX_TOKENS];
        for (card, &slot) in cards.iter_mut().zip(slots.iter()) {
            if !group.has_token(player, slot) {
                return None;
            }
            *card = group.card(slot)?;
        }
        Some(Claim::new(player, slots, cards))
    }
}

/// Several slots held locked together.
pub struct SlotGroup<'a> {
    events: &'a EventBus,
    guards: Vec<(SlotIndex, MutexGuard<'a, Slot>)>,
}

impl SlotGroup<'_> {
    fn get(&self, slot: SlotIndex) -> Option<&Slot> {
        self.guards
            .iter()
            .find(|(index, _)| *index == slot)
            .map(|(_, guard)| &**guard)
    }

    pub fn card(&self, slot: SlotIndex) -> Option<Card> {
        self.get(slot).and_then(|s| s.card)
    }

    pub fn has_token(&self, player: PlayerId, slot: SlotIndex) -> bool {
        self.get(slot).is_some_and(|s| s.tokens.contains(&player))
    }

    /// Remove `player`'s tokens from every locked slot. Returns how many were removed.
    pub fn remove_tokens_of(&mut self, player: PlayerId) -> usize {
        let mut removed = 0;
        for (slot, guard) in &mut self.guards {
            if guard.tokens.remove(&player) {
                self.events.publish(TableEvent::TokenRemoved {
                    player,
                    slot: *slot,
                });
                removed += 1;
            }
        }
        removed
    }

    /// Remove cards and all tokens from every locked slot.
    pub fn clear(&mut self) -> Vec<ClearedSlot> {
        self.guards
            .iter_mut()
            .filter_map(|(slot, guard)| clear_locked(self.events, *slot, guard))
            .collect()
    }
}

fn clear_locked(events: &EventBus, slot: SlotIndex, state: &mut Slot) -> Option<ClearedSlot> {
    let displaced: Vec<PlayerId> = std::mem::take(&mut state.tokens).into_iter().collect();
    for &player in &displaced {
        events.publish(TableEvent::TokenRemoved { player, slot });
    }
    let card = state.card.take()?;
    events.publish(TableEvent::CardRemoved { slot, card });
    Some(ClearedSlot {
        slot,
        card,
        displaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_cards(cards: &[u16]) -> Board {
        let board = Board::new(cards.len(), EventBus::new());
        for (slot, &card) in cards.iter().enumerate() {
            assert!(board.place_card(slot, Card(card)));
        }
        board
    }

    #[test]
    fn test_place_token_requires_card() {
        let board = Board::new(2, EventBus::new());
        assert!(!board.place_token(0, 0));
        assert!(board.place_card(0, Card(5)));
        assert!(board.place_token(0, 0));
        assert!(!board.place_token(0, 0), "one token per player per slot");
        assert!(board.place_token(1, 0), "other players may share the slot");
        assert!(board.has_token(0, 0) && board.has_token(1, 0));
    }

    #[test]
    fn test_out_of_range_slot() {
        let board = board_with_cards(&[1]);
        assert!(!board.place_token(0, 5));
        assert!(!board.remove_token(0, 5));
        assert!(!board.has_token(0, 5));
        assert!(!board.is_slot_occupied_by_card(5));
        assert!(board.clear_slot(5).is_none());
        assert!(board.lock_slots(&[0, 5]).is_none());
    }

    #[test]
    fn test_remove_token_idempotent() {
        let board = board_with_cards(&[1, 2]);
        board.place_token(3, 1);
        assert!(board.remove_token(3, 1));
        assert!(!board.remove_token(3, 1));
        assert!(!board.has_token(3, 1));
        assert_eq!(board.tokens_of(3), Vec::<SlotIndex>::new());
    }

    #[test]
    fn test_clear_slot_removes_card_and_tokens() {
        let board = board_with_cards(&[10, 11]);
        board.place_token(0, 0);
        board.place_token(1, 0);
        board.place_token(1, 1);

        let cleared = board.clear_slot(0).unwrap();
        assert_eq!(cleared.card, Card(10));
        assert_eq!(cleared.displaced, vec![0, 1]);
        assert!(!board.is_slot_occupied_by_card(0));
        assert!(!board.has_token(0, 0) && !board.has_token(1, 0));
        assert!(board.has_token(1, 1), "other slots untouched");
        assert!(!board.place_token(0, 0), "no token without a card");
    }

    #[test]
    fn test_place_card_only_on_empty_slot() {
        let board = board_with_cards(&[1]);
        assert!(!board.place_card(0, Card(2)));
        assert_eq!(board.card_at(0), Some(Card(1)));
        assert_eq!(board.empty_slots(), Vec::<SlotIndex>::new());
    }

    #[test]
    fn test_take_all_cards() {
        let board = board_with_cards(&[4, 5, 6]);
        board.place_token(0, 0);
        board.place_token(0, 2);
        board.place_token(1, 2);

        let (cards, displaced) = board.take_all_cards();
        assert_eq!(cards, vec![Card(4), Card(5), Card(6)]);
        assert_eq!(displaced.get(&0), Some(&vec![0, 2]));
        assert_eq!(displaced.get(&1), Some(&vec![2]));
        assert_eq!(board.count_cards(), 0);
        assert_eq!(board.empty_slots(), vec![0, 1, 2]);
    }

    #[test]
    fn test_snapshot_claim_requires_all_tokens() {
        let board = board_with_cards(&[7, 8, 9, 10]);
        let mut tokens = TokenSet::new();
        for slot in [3, 0, 1] {
            assert!(board.place_token(2, slot));
            tokens.insert(slot);
        }

        let claim = board.snapshot_claim(2, &tokens).unwrap();
        assert_eq!(claim.player(), 2);
        assert_eq!(claim.slots(), &[0, 1, 3]);
        assert_eq!(claim.cards(), &[Card(7), Card(8), Card(10)]);

        board.clear_slot(1);
        assert!(board.snapshot_claim(2, &tokens).is_none());
    }

    #[test]
    fn test_snapshot_claim_requires_full_set() {
        let board = board_with_cards(&[7, 8]);
        let mut tokens = TokenSet::new();
        tokens.insert(0);
        board.place_token(0, 0);
        assert!(board.snapshot_claim(0, &tokens).is_none());
    }

    #[test]
    fn test_slot_group_remove_tokens_of() {
        let board = board_with_cards(&[1, 2, 3]);
        for slot in 0..3 {
            board.place_token(0, slot);
            board.place_token(1, slot);
        }

        let mut group = board.lock_slots(&[2, 0, 1, 0]).unwrap();
        assert_eq!(group.remove_tokens_of(0), 3);
        assert!(group.has_token(1, 0));
        drop(group);

        assert_eq!(board.tokens_of(0), Vec::<SlotIndex>::new());
        assert_eq!(board.tokens_of(1), vec![0, 1, 2]);
        assert_eq!(board.count_cards(), 3);
    }

    #[test]
    fn test_board_events() {
        let events = EventBus::new();
        let mut receiver = events.subscribe(16);
        let board = Board::new(1, events);

        board.place_card(0, Card(3));
        board.place_token(4, 0);
        board.clear_slot(0);

        let received: Vec<_> = std::iter::from_fn(|| receiver.try_recv().ok()).collect();
        assert_eq!(
            received,
            vec![
                TableEvent::CardPlaced { slot: 0, card: Card(3) },
                TableEvent::TokenPlaced { player: 4, slot: 0 },
                TableEvent::TokenRemoved { player: 4, slot: 0 },
                TableEvent::CardRemoved { slot: 0, card: Card(3) },
            ]
        );
    }
}
