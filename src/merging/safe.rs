/// SAFE (sample-agglomerate fitting estimate) results merging.
///
/// Pairs centralized sample scores with ranks in the source's own list:
/// - a sample document the source also returned sits at its true 1-based rank,
/// - sample documents after the last such overlap are spread past the end of
///   the list, `rank_ratio` source ranks apart (half a step in for the first).
///
/// Four rank-to-score fits (`x`, `ln x`, `sqrt x`, `1/x`) are tried and the one
/// with the strongest correlation (`|r|`) predicts each returned document's
/// score from its rank.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::regression::{best_fit, Transform, TransformedRegression};
use crate::scored::ScoredItem;

pub const DEFAULT_MIN_OBSERVATIONS: usize = 3;
pub const DEFAULT_RANK_RATIO: f64 = 1.0;

const CANDIDATE_TRANSFORMS: [Transform; 4] = [
    Transform::Linear,
    Transform::Log,
    Transform::Sqrt,
    Transform::Reciprocal,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Safe {
    min_observations: usize,
}

impl Default for Safe {
    fn default() -> Self {
        Safe { min_observations: DEFAULT_MIN_OBSERVATIONS }
    }
}

impl Safe {
    pub fn new(min_observations: usize) -> Result<Self> {
        if min_observations < 2 {
            return Err(FedRankError::invalid(
                "min_observations",
                format!("The minimum number of observations is less than 2: {}", min_observations),
            ));
        }
        Ok(Safe { min_observations })
    }

    /// Estimate centralized scores for a source's result list.
    ///
    /// `sample` is the centralized sample ranking of this source's documents,
    /// best first. `rank_ratio` is the source's `full_size / sample_size`.
    /// Returns an empty list when fewer than `min_observations` rank/score
    /// pairs could be built.
    pub fn normalize<T: Clone + Eq + Hash>(
        &self,
        unnorm_scored_docs: &[ScoredItem<T>],
        sample: &[ScoredItem<T>],
        rank_ratio: f64,
    ) -> Result<Vec<ScoredItem<T>>> {
        if !(rank_ratio > 0.0) {
            return Err(FedRankError::invalid(
                "rank_ratio",
                format!("The rank ratio is not positive: {}", rank_ratio),
            ));
        }

        let observations = rank_to_score(sample, unnorm_scored_docs, rank_ratio);
        let mut models = TransformedRegression::family(&CANDIDATE_TRANSFORMS);
        for (rank, score) in &observations {
            for model in models.iter_mut() {
                model.add(*rank as f64, *score);
            }
        }

        let hybrid = match best_fit(models, |m| m.r().abs()) {
            Some(model) if model.len() >= self.min_observations as u64 => model,
            _ => {
                tracing::debug!(
                    observations = observations.len(),
                    documents = unnorm_scored_docs.len(),
                    "SAFE has too few rank/score observations"
                );
                return Ok(Vec::new());
            }
        };

        tracing::debug!(
            transform = ?hybrid.transform(),
            r = hybrid.r(),
            observations = observations.len(),
            "SAFE fit selected"
        );

        Ok(unnorm_scored_docs
            .iter()
            .enumerate()
            .map(|(i, doc)| doc.rescored(hybrid.predict((i + 1) as f64)))
            .collect())
    }
}

/// Source rank to centralized score. A later entry at an already used rank
/// replaces the earlier one.
fn rank_to_score<T: Eq + Hash>(
    sample: &[ScoredItem<T>],
    scored_docs: &[ScoredItem<T>],
    rank_ratio: f64,
) -> BTreeMap<i64, f64> {
    let doc_ranks: HashMap<&T, i64> = scored_docs
        .iter()
        .enumerate()
        .map(|(i, doc)| (doc.value(), i as i64 + 1))
        .collect();

    let mut observations = BTreeMap::new();
    let mut last_overlap: Option<usize> = None;
    for (i, sampled) in sample.iter().enumerate() {
        if let Some(&rank) = doc_ranks.get(sampled.value()) {
            observations.insert(rank, sampled.score());
            last_overlap = Some(i);
        }
    }

    let offset = scored_docs.len() as f64;
    let first_unseen = last_overlap.map_or(0, |i| i + 1);
    let last = last_overlap.map_or(-1.0, |i| i as f64);
    for (i, sampled) in sample.iter().enumerate().skip(first_unseen) {
        let rank = (offset + (i as f64 - last - 0.5) * rank_ratio).trunc() as i64;
        observations.insert(rank, sampled.score());
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(n: usize) -> Vec<ScoredItem<String>> {
        (0..n).map(|i| ScoredItem::new(format!("d{}", i), 50.0 - i as f64)).collect()
    }

    #[test]
    fn test_overlap_uses_true_ranks() {
        let docs = source(5);
        let sample = vec![
            ScoredItem::new("d0".to_string(), 9.0),
            ScoredItem::new("d2".to_string(), 7.0),
            ScoredItem::new("d4".to_string(), 5.0),
        ];
        let observations = rank_to_score(&sample, &docs, 1.0);
        assert_eq!(observations.get(&1), Some(&9.0));
        assert_eq!(observations.get(&3), Some(&7.0));
        assert_eq!(observations.get(&5), Some(&5.0));
        assert_eq!(observations.len(), 3);
    }

    #[test]
    fn test_unseen_tail_is_spread_past_the_list() {
        let docs = source(4);
        let sample = vec![
            ScoredItem::new("d1".to_string(), 9.0),
            ScoredItem::new("x".to_string(), 8.0),
            ScoredItem::new("y".to_string(), 7.0),
        ];
        let observations = rank_to_score(&sample, &docs, 10.0);
        // 4 + 0.5 * 10 and 4 + 1.5 * 10
        assert_eq!(observations.get(&2), Some(&9.0));
        assert_eq!(observations.get(&9), Some(&8.0));
        assert_eq!(observations.get(&19), Some(&7.0));
    }

    #[test]
    fn test_no_overlap_starts_at_list_end() {
        let docs = source(2);
        let sample = vec![ScoredItem::new("x".to_string(), 3.0)];
        let observations = rank_to_score(&sample, &docs, 2.0);
        // 2 + (0 + 1 - 0.5) * 2
        assert_eq!(observations.get(&3), Some(&3.0));
    }

    #[test]
    fn test_predicts_linear_scores() {
        let docs = source(6);
        // centralized score falls by 2 per rank
        let sample = vec![
            ScoredItem::new("d0".to_string(), 20.0),
            ScoredItem::new("d1".to_string(), 18.0),
            ScoredItem::new("d3".to_string(), 14.0),
            ScoredItem::new("d5".to_string(), 10.0),
        ];
        let merged = Safe::default().normalize(&docs, &sample, 1.0).unwrap();
        assert_eq!(merged.len(), 6);
        assert_eq!(merged[2].value(), "d2");
        assert!((merged[2].score() - 16.0).abs() < 1e-9);
        assert!((merged[4].score() - 12.0).abs() < 1e-9);
        assert!(merged.windows(2).all(|w| w[0].score() >= w[1].score()));
    }

    #[test]
    fn test_insufficient_observations_is_empty() {
        let docs = source(3);
        let sample = vec![
            ScoredItem::new("d0".to_string(), 20.0),
            ScoredItem::new("d1".to_string(), 18.0),
        ];
        assert!(Safe::default().normalize(&docs, &sample, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_non_positive_rank_ratio() {
        let docs = source(3);
        assert!(Safe::default().normalize(&docs, &[], 0.0).is_err());
        assert!(Safe::default().normalize(&docs, &[], -2.0).is_err());
        assert!(Safe::new(1).is_err());
    }
}
