/// SSL (semi-supervised learning) results merging.
///
/// Documents that appear both in a source's result list and in the centralized
/// sample ranking give `(source score, centralized score)` pairs. A linear
/// regression over those pairs maps every source score onto the centralized scale.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::regression::OnlineRegression;
use crate::scored::ScoredItem;

pub const DEFAULT_MAX_TRAINING_POINTS: usize = 10;
pub const DEFAULT_MIN_TRAINING_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ssl {
    max_training_points: usize,
    min_training_points: usize,
}

impl Default for Ssl {
    fn default() -> Self {
        Ssl {
            max_training_points: DEFAULT_MAX_TRAINING_POINTS,
            min_training_points: DEFAULT_MIN_TRAINING_POINTS,
        }
    }
}

impl Ssl {
    pub fn new(max_training_points: usize, min_training_points: usize) -> Result<Self> {
        if min_training_points < 2 {
            return Err(FedRankError::invalid(
                "min_training_points",
                format!("The minimum number of training points is less than 2: {}", min_training_points),
            ));
        }
        if max_training_points < min_training_points {
            return Err(FedRankError::invalid(
                "max_training_points",
                format!(
                    "The maximum number of training points is below the minimum: {} < {}",
                    max_training_points, min_training_points
                ),
            ));
        }
        Ok(Ssl { max_training_points, min_training_points })
    }

    /// Map source scores onto the centralized scale learned from `sample`.
    ///
    /// Returns an empty list when fewer than `min_training_points` documents
    /// overlap: there is not enough evidence to calibrate this source.
    pub fn normalize<T: Clone + Eq + Hash>(
        &self,
        unnorm_scored_docs: &[ScoredItem<T>],
        sample: &[ScoredItem<T>],
    ) -> Vec<ScoredItem<T>> {
        // a document sampled twice keeps its last centralized score
        let centralized: HashMap<&T, f64> = sample.iter().map(|d| (d.value(), d.score())).collect();
        let regression = self.train(unnorm_scored_docs, &centralized);

        if regression.len() < self.min_training_points as u64 {
            tracing::debug!(
                training_points = regression.len(),
                documents = unnorm_scored_docs.len(),
                "SSL has too few overlapping documents"
            );
            return Vec::new();
        }

        let (slope, intercept) = (regression.slope(), regression.intercept());
        unnorm_scored_docs
            .iter()
            .map(|doc| doc.rescored(slope * doc.score() + intercept))
            .collect()
    }

    fn train<T: Eq + Hash>(
        &self,
        scored_docs: &[ScoredItem<T>],
        centralized: &HashMap<&T, f64>,
    ) -> OnlineRegression {
        let mut regression = OnlineRegression::new();
        let mut seen_x: HashSet<u64> = HashSet::new();
        for doc in scored_docs {
            let Some(&centralized_score) = centralized.get(doc.value()) else {
                continue;
            };
            if !seen_x.insert(doc.score().to_bits()) {
                continue;
            }
            regression.add(doc.score(), centralized_score);
            if regression.len() >= self.max_training_points as u64 {
                break;
            }
        }
        regression
    }
}
