/// Scored values: the currency passed between selection, normalization and merging.
///
/// `ScoredItem` deliberately splits its comparison semantics:
/// - `==` and `Hash` look at the value only (the score is ignored),
/// - `<`/`>` look at the score only (the value is ignored).
///
/// So two hits for the same document with different scores are equal, and two
/// different documents with the same score compare as neither less nor greater.
/// Resource de-duplication depends on the first half, sorting on the second.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem<T> {
    value: T,
    score: f64,
}

impl<T> ScoredItem<T> {
    pub fn new(value: T, score: f64) -> Self {
        ScoredItem { value, score }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Same value, new score.
    pub fn rescored(&self, score: f64) -> Self
    where
        T: Clone,
    {
        ScoredItem { value: self.value.clone(), score }
    }

    /// Swap the value while keeping the score.
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> ScoredItem<U> {
        ScoredItem { value: f(self.value), score: self.score }
    }
}

impl<T: PartialEq> PartialEq for ScoredItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for ScoredItem<T> {}

impl<T: Hash> Hash for ScoredItem<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: PartialEq> PartialOrd for ScoredItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.score.total_cmp(&other.score))
    }
}

/// Orders by score alone, so two items can compare `Equal` without being `==`.
impl<T: Eq> Ord for ScoredItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl<T: fmt::Display> fmt::Display for ScoredItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, (self.score * 100.0).round() / 100.0)
    }
}

/// Direction for [`sort_scored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort of a copy of `items` by score. Equal scores keep their input order.
pub fn sort_scored<T: Clone>(items: &[ScoredItem<T>], order: SortOrder) -> Vec<ScoredItem<T>> {
    let mut sorted = items.to_vec();
    sort_scored_in_place(&mut sorted, order);
    sorted
}

pub(crate) fn sort_scored_in_place<T>(items: &mut [ScoredItem<T>], order: SortOrder) {
    match order {
        SortOrder::Ascending => items.sort_by(|a, b| a.score.total_cmp(&b.score)),
        SortOrder::Descending => items.sort_by(|a, b| b.score.total_cmp(&a.score)),
    }
}

/// True when no score is followed by a strictly greater one.
pub fn is_sorted_descending<T>(items: &[ScoredItem<T>]) -> bool {
    items.windows(2).all(|w| !(w[0].score < w[1].score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_score() {
        let a = ScoredItem::new("test entity", 42.0);
        let b = ScoredItem::new("test entity", 0.0);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b), "same value must hash identically");
    }

    #[test]
    fn test_ordering_ignores_value() {
        let low = ScoredItem::new("x", -42.0);
        let high = ScoredItem::new("y", 42.0);
        assert_eq!(low.partial_cmp(&high), Some(Ordering::Less));

        let a = ScoredItem::new("x", 23.542);
        let b = ScoredItem::new("y", 23.542);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert_ne!(a, b);
    }

    #[test]
    fn test_total_ordering_by_score() {
        let mut items = vec![
            ScoredItem::new("b", 0.5),
            ScoredItem::new("c", -1.0),
            ScoredItem::new("a", 2.0),
        ];
        items.sort();
        let values: Vec<&str> = items.iter().map(|i| *i.value()).collect();
        assert_eq!(values, vec!["c", "b", "a"]);

        let best = items.iter().max().map(|i| *i.value());
        assert_eq!(best, Some("a"));
        assert_eq!(ScoredItem::new("x", 1.0).cmp(&ScoredItem::new("y", 1.0)), Ordering::Equal);
    }

    #[test]
    fn test_accessors() {
        let item = ScoredItem::new(42, 42.42);
        assert_eq!(*item.value(), 42);
        assert!((item.score() - 42.42).abs() < 1e-9);
        assert_eq!(item.rescored(1.0).score(), 1.0);
        assert_eq!(item.into_value(), 42);
    }

    #[test]
    fn test_display_rounds_score() {
        assert_eq!(ScoredItem::new("d1", 1.23456).to_string(), "d1:1.23");
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let items = vec![
            ScoredItem::new("a", 1.0),
            ScoredItem::new("b", 3.0),
            ScoredItem::new("c", 1.0),
            ScoredItem::new("d", 2.0),
        ];
        let sorted = sort_scored(&items, SortOrder::Descending);
        let values: Vec<_> = sorted.iter().map(|i| *i.value()).collect();
        assert_eq!(values, vec!["b", "d", "a", "c"]);
        assert!(is_sorted_descending(&sorted));
        // input untouched
        assert_eq!(*items[0].value(), "a");
    }

    #[test]
    fn test_sort_ascending() {
        let items: Vec<_> = [5.0, -1.0, 3.0]
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredItem::new(i, *s))
            .collect();
        let sorted = sort_scored(&items, SortOrder::Ascending);
        let scores: Vec<f64> = sorted.iter().map(|i| i.score()).collect();
        assert_eq!(scores, vec![-1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_sort_many_random_scores() {
        // deterministic pseudo-random scores
        let mut state: u64 = 1234;
        let items: Vec<_> = (0..173)
            .map(|i| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ScoredItem::new(i, ((state >> 33) % 1000) as f64)
            })
            .collect();
        let sorted = sort_scored(&items, SortOrder::Descending);
        assert!(is_sorted_descending(&sorted));
        assert_eq!(sorted.len(), items.len());
    }
}
