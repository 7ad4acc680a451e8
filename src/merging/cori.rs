/// CORI results merging: a base normalization weighted by how relevant the
/// whole result list's resource was judged to be.
///
/// `merged = normalized * (1 + lambda * relevance) / (1 + lambda)`

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::norm::{Normalization, ScoreNormalizer};
use crate::scored::ScoredItem;

pub const DEFAULT_LAMBDA: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cori {
    lambda: f64,
    base: ScoreNormalizer,
}

impl Default for Cori {
    fn default() -> Self {
        Cori {
            lambda: DEFAULT_LAMBDA,
            base: ScoreNormalizer::new(Normalization::MinMax),
        }
    }
}

impl Cori {
    pub fn new(lambda: f64, base: ScoreNormalizer) -> Result<Self> {
        if !(lambda >= 0.0) {
            return Err(FedRankError::invalid(
                "lambda",
                format!("The CORI parameter lambda is negative: {}", lambda),
            ));
        }
        Ok(Cori { lambda, base })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn base(&self) -> ScoreNormalizer {
        self.base
    }

    /// `relevance` is the selection score of the list's resource, in `[0, 1]`.
    pub fn normalize<T: Clone>(
        &self,
        unnorm_scored_docs: &[ScoredItem<T>],
        relevance: f64,
    ) -> Result<Vec<ScoredItem<T>>> {
        if !(0.0..=1.0).contains(&relevance) {
            return Err(FedRankError::invalid(
                "relevance",
                format!(
                    "The relevance of a result list to be normalized is outside the range [0, 1]: {}",
                    relevance
                ),
            ));
        }
        let weight = (1.0 + self.lambda * relevance) / (1.0 + self.lambda);
        Ok(self
            .base
            .normalize(unnorm_scored_docs)
            .into_iter()
            .map(|doc| {
                let score = doc.score() * weight;
                doc.rescored(score)
            })
            .collect())
    }
}
