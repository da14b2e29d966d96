//! Set validation rules.
//!
//! The coordination core treats set validity as an opaque, pure predicate
//! over three cards. [`ClassicRules`] provides the usual feature-based rule:
//! each card has `feature_count` features with three values each, and three
//! cards form a set when every feature is either all-same or all-different.

use super::entities::Card;

/// Default number of features per card (81-card deck).
pub const DEFAULT_FEATURE_COUNT: u32 = 4;

/// Largest supported feature count (729-card deck).
pub const MAX_FEATURE_COUNT: u32 = 6;

/// Pure predicate deciding whether three cards form a set.
pub trait SetValidator: Send + Sync {
    fn is_set(&self, a: Card, b: Card, c: Card) -> bool;
}

impl<F> SetValidator for F
where
    F: Fn(Card, Card, Card) -> bool + Send + Sync,
{
    fn is_set(&self, a: Card, b: Card, c: Card) -> bool {
        self(a, b, c)
    }
}

/// Feature-based rules where card ids encode base-3 feature values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicRules {
    feature_count: u32,
}

impl Default for ClassicRules {
    fn default() -> Self {
        Self {
            feature_count: DEFAULT_FEATURE_COUNT,
        }
    }
}

impl ClassicRules {
    /// Create rules with the given feature count, clamped to `1..=MAX_FEATURE_COUNT`.
    pub fn new(feature_count: u32) -> Self {
        Self {
            feature_count: feature_count.clamp(1, MAX_FEATURE_COUNT),
        }
    }

    pub fn feature_count(&self) -> u32 {
        self.feature_count
    }

    /// Number of distinct cards (3^features).
    pub fn deck_size(&self) -> usize {
        3usize.pow(self.feature_count)
    }

    /// Feature values of a card, least significant first.
    pub fn features(&self, card: Card) -> Vec<u16> {
        let mut id = card.0;
        (0..self.feature_count)
            .map(|_| {
                let value = id % 3;
                id /= 3;
                value
            })
            .collect()
    }
}

impl SetValidator for ClassicRules {
    fn is_set(&self, a: Card, b: Card, c: Card) -> bool {
        if a == b || b == c || a == c {
            return false;
        }
        self.features(a)
            .into_iter()
            .zip(self.features(b))
            .zip(self.features(c))
            .all(|((fa, fb), fc)| (fa + fb + fc) % 3 == 0)
    }
}

/// Find up to `limit` sets among `cards`.
pub fn find_sets(rules: &dyn SetValidator, cards: &[Card], limit: usize) -> Vec<[Card; 3]> {
    let mut found = Vec::new();
    if limit == 0 {
        return found;
    }
    for (i, &a) in cards.iter().enumerate() {
        for (j, &b) in cards.iter().enumerate().skip(i + 1) {
            for &c in cards.iter().skip(j + 1) {
                if rules.is_set(a, b, c) {
                    found.push([a, b, c]);
                    if found.len() == limit {
                        return found;
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_deck_size() {
        assert_eq!(ClassicRules::default().deck_size(), 81);
        assert_eq!(ClassicRules::new(2).deck_size(), 9);
        assert_eq!(ClassicRules::new(0).feature_count(), 1);
        assert_eq!(ClassicRules::new(10).feature_count(), MAX_FEATURE_COUNT);
    }

    #[test]
    fn test_features_base_three() {
        let rules = ClassicRules::default();
        // 5 = 2 + 1*3
        assert_eq!(rules.features(Card(5)), vec![2, 1, 0, 0]);
        assert_eq!(rules.features(Card(80)), vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_all_different_is_set() {
        let rules = ClassicRules::default();
        assert!(rules.is_set(Card(0), Card(1), Card(2)));
        assert!(rules.is_set(Card(0), Card(40), Card(80)));
    }

    #[test]
    fn test_two_same_one_different_is_not_set() {
        let rules = ClassicRules::default();
        assert!(!rules.is_set(Card(0), Card(1), Card(3)));
        assert!(!rules.is_set(Card(0), Card(0), Card(0)));
    }

    #[test]
    fn test_closure_validator() {
        let always = |_: Card, _: Card, _: Card| true;
        assert!(always.is_set(Card(0), Card(0), Card(0)));
    }

    #[test]
    fn test_find_sets_respects_limit() {
        let rules = ClassicRules::new(2);
        let cards: Vec<Card> = (0..9).map(Card).collect();
        // 9-card deck with 2 features has 12 sets
        assert_eq!(find_sets(&rules, &cards, usize::MAX).len(), 12);
        assert_eq!(find_sets(&rules, &cards, 1).len(), 1);
        assert!(find_sets(&rules, &cards, 0).is_empty());
        assert!(find_sets(&rules, &[Card(0), Card(1), Card(3)], 1).is_empty());
    }
}
