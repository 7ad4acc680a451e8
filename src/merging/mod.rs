/// Results merging: putting per-source result lists on one comparable scale.
///
/// CORI, SSL and SAFE each need a different piece of per-call evidence
/// (resource relevance, the centralized sample, the source's size ratio).
/// [`MergeContext`] carries all of it so a caller can run any method the same
/// way; each method reads only what it needs.

pub mod cori;
pub mod safe;
pub mod ssl;

use std::hash::Hash;

use crate::errors::Result;
use crate::norm::ScoreNormalizer;
use crate::scored::ScoredItem;

pub use cori::Cori;
pub use safe::Safe;
pub use ssl::Ssl;

/// Per-call evidence about the source whose list is being merged.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a, T> {
    /// Selection score of the source, in `[0, 1]` (CORI).
    pub relevance: f64,
    /// Centralized sample ranking, best first (SSL, SAFE).
    pub sample: &'a [ScoredItem<T>],
    /// `full_size / sample_size` of the source (SAFE).
    pub rank_ratio: f64,
}

impl<'a, T> MergeContext<'a, T> {
    pub fn new(sample: &'a [ScoredItem<T>]) -> Self {
        MergeContext {
            relevance: 1.0,
            sample,
            rank_ratio: safe::DEFAULT_RANK_RATIO,
        }
    }

    pub fn with_relevance(self, relevance: f64) -> Self {
        MergeContext { relevance, ..self }
    }

    pub fn with_rank_ratio(self, rank_ratio: f64) -> Self {
        MergeContext { rank_ratio, ..self }
    }
}

/// The merging methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergingMethod {
    /// A plain linear normalizer, no per-source evidence.
    Normalize(ScoreNormalizer),
    Cori(Cori),
    Ssl(Ssl),
    Safe(Safe),
}

impl Default for MergingMethod {
    fn default() -> Self {
        MergingMethod::Cori(Cori::default())
    }
}

impl MergingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            MergingMethod::Normalize(_) => "normalize",
            MergingMethod::Cori(_) => "cori",
            MergingMethod::Ssl(_) => "ssl",
            MergingMethod::Safe(_) => "safe",
        }
    }

    /// Rescore one source's result list.
    ///
    /// An empty result from SSL or SAFE means the source could not be
    /// calibrated, not that it returned nothing.
    pub fn merge<T: Clone + Eq + Hash>(
        &self,
        unnorm_scored_docs: &[ScoredItem<T>],
        ctx: &MergeContext<'_, T>,
    ) -> Result<Vec<ScoredItem<T>>> {
        match self {
            MergingMethod::Normalize(normalizer) => Ok(normalizer.normalize(unnorm_scored_docs)),
            MergingMethod::Cori(cori) => cori.normalize(unnorm_scored_docs, ctx.relevance),
            MergingMethod::Ssl(ssl) => Ok(ssl.normalize(unnorm_scored_docs, ctx.sample)),
            MergingMethod::Safe(safe) => safe.normalize(unnorm_scored_docs, ctx.sample, ctx.rank_ratio),
        }
    }

    /// Whether an empty output can stand for "too little evidence".
    pub fn needs_evidence(&self) -> bool {
        matches!(self, MergingMethod::Ssl(_) | MergingMethod::Safe(_))
    }
}
