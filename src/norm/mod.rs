/// Linear score normalization.
///
/// Each method fits a transform `(score - shift) / scale` on a result list and
/// applies it to every entry, so value order and list length never change.
/// With a rank cutoff the transform is fitted on the top `cutoff` scores,
/// zero-padded when the list is shorter, which keeps lists of different
/// lengths on the same footing.

pub mod linear;

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::scored::ScoredItem;

pub use linear::LinearTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Scores left as they are.
    Identity,
    /// `(s - min) / (max - min)`.
    #[default]
    MinMax,
    /// `(s - mean) / stddev`.
    ZScore,
    /// `(s - min) / Σ(s - min)`.
    Sum,
}

impl Normalization {
    /// Fit this method's transform on `scores`.
    pub fn fit(self, scores: &[f64]) -> LinearTransform {
        match self {
            Normalization::Identity => LinearTransform::IDENTITY,
            Normalization::MinMax => linear::fit_min_max(scores),
            Normalization::ZScore => linear::fit_z_score(scores),
            Normalization::Sum => linear::fit_sum(scores),
        }
    }
}

/// A normalization method plus an optional rank cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreNormalizer {
    method: Normalization,
    rank_cutoff: Option<usize>,
}

impl ScoreNormalizer {
    pub fn new(method: Normalization) -> Self {
        ScoreNormalizer { method, rank_cutoff: None }
    }

    pub fn with_rank_cutoff(self, rank_cutoff: usize) -> Result<Self> {
        if rank_cutoff == 0 {
            return Err(FedRankError::invalid(
                "rank_cutoff",
                "The rank cutoff is less or equal to zero: 0",
            ));
        }
        Ok(ScoreNormalizer { rank_cutoff: Some(rank_cutoff), ..self })
    }

    pub fn method(&self) -> Normalization {
        self.method
    }

    pub fn rank_cutoff(&self) -> Option<usize> {
        self.rank_cutoff
    }

    /// The transform this normalizer would apply to `scored_docs`.
    pub fn fit<T>(&self, scored_docs: &[ScoredItem<T>]) -> LinearTransform {
        let mut window: Vec<f64> = match self.rank_cutoff {
            Some(cutoff) => scored_docs.iter().take(cutoff).map(|d| d.score()).collect(),
            None => scored_docs.iter().map(|d| d.score()).collect(),
        };
        if let Some(cutoff) = self.rank_cutoff {
            window.resize(cutoff, 0.0);
        }
        self.method.fit(&window)
    }

    /// Rescale every score; values and positions are kept.
    pub fn normalize<T: Clone>(&self, scored_docs: &[ScoredItem<T>]) -> Vec<ScoredItem<T>> {
        if scored_docs.is_empty() {
            return Vec::new();
        }
        let transform = self.fit(scored_docs);
        scored_docs
            .iter()
            .map(|doc| doc.rescored(transform.apply(doc.score())))
            .collect()
    }
}
