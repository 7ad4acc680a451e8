/// Resource selection over a centralized sample ranking.
///
/// Every algorithm shares one orchestration (`ResourceSelection::select`):
/// 1. Validate the parallel document/resource lists
/// 2. Sort a private copy best-first when the input is not already sorted
/// 3. Turn the rank cutoff into a sample rank
/// 4. Run the algorithm-specific scoring step
/// 5. Add every unscored input resource at 0 and sort best-first
///
/// Algorithms are values of [`SelectionMethod`], not types, so a configured
/// selection can be stored, serialized and shared freely.

pub mod ciss;
pub mod redde;
pub mod resource;
pub mod sushi;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::scored::{is_sorted_descending, sort_scored_in_place, ScoredItem, SortOrder};

pub use redde::RankWeighting;
pub use resource::Resource;
pub use sushi::SushiParams;

pub const DEFAULT_COMPLETE_RANK_CUTOFF: usize = 100;

/// How deep into the sample ranking documents count as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCutoff {
    /// A rank in the hypothetical full collection, mapped onto the sample.
    Complete(usize),
    /// A rank in the sample ranking itself.
    Sample(usize),
}

impl Default for RankCutoff {
    fn default() -> Self {
        RankCutoff::Complete(DEFAULT_COMPLETE_RANK_CUTOFF)
    }
}

impl RankCutoff {
    fn validate(self) -> Result<()> {
        match self {
            RankCutoff::Complete(0) => Err(FedRankError::invalid(
                "complete_rank_cutoff",
                "The complete rank cutoff is not positive: 0",
            )),
            RankCutoff::Sample(0) => Err(FedRankError::invalid(
                "sample_rank_cutoff",
                "The sample rank cutoff is not positive: 0",
            )),
            _ => Ok(()),
        }
    }

    fn sample_rank(self, ranked: &[SampleDoc<'_>]) -> usize {
        match self {
            RankCutoff::Sample(rank) => rank,
            RankCutoff::Complete(rank) => {
                complete_to_sample_rank(ranked.iter().map(|doc| doc.resource), rank)
            }
        }
    }
}

/// Map a complete-collection rank onto the sample ranking.
///
/// Walks the best-first resource assignments, adding each resource's
/// truncated size ratio, and returns the 1-based position at which the running
/// total first reaches `complete_rank`. Returns the list length when it never does.
pub fn complete_to_sample_rank<'a, I>(resources: I, complete_rank: usize) -> usize
where
    I: IntoIterator<Item = &'a Resource>,
{
    let mut estimated: u64 = 0;
    let mut seen = 0;
    for resource in resources {
        seen += 1;
        estimated += resource.integral_size_ratio();
        if estimated >= complete_rank as u64 {
            return seen;
        }
    }
    seen
}

/// The selection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Rank-count estimator with a pluggable per-rank weighting
    /// (ReDDE, CRCS-exp, CRCS-linear, GAVG-log, ReDDE.top).
    Redde {
        #[serde(default)]
        weighting: RankWeighting,
    },
    /// Regression-based rank-to-score estimator.
    Sushi(SushiParams),
    /// Integral under the `(ln rank, exp score)` curve.
    Ciss,
    /// Two-point approximation of the CiSS integral.
    CissApprox,
}

impl Default for SelectionMethod {
    fn default() -> Self {
        SelectionMethod::Redde { weighting: RankWeighting::Uniform }
    }
}

impl SelectionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionMethod::Redde { weighting } => weighting.name(),
            SelectionMethod::Sushi(_) => "sushi",
            SelectionMethod::Ciss => "ciss",
            SelectionMethod::CissApprox => "ciss_approx",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            SelectionMethod::Redde { weighting } => weighting.validate(),
            SelectionMethod::Sushi(params) => params.validate(),
            SelectionMethod::Ciss | SelectionMethod::CissApprox => Ok(()),
        }
    }
}

/// A configured resource selection algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSelection {
    method: SelectionMethod,
    cutoff: RankCutoff,
}

impl Default for ResourceSelection {
    fn default() -> Self {
        ResourceSelection {
            method: SelectionMethod::default(),
            cutoff: RankCutoff::default(),
        }
    }
}

impl ResourceSelection {
    /// Validates the method parameters and the cutoff.
    pub fn new(method: SelectionMethod, cutoff: RankCutoff) -> Result<Self> {
        method.validate()?;
        cutoff.validate()?;
        Ok(ResourceSelection { method, cutoff })
    }

    /// `method` with the default complete rank cutoff.
    pub fn with_method(method: SelectionMethod) -> Result<Self> {
        Self::new(method, RankCutoff::default())
    }

    pub fn method(&self) -> SelectionMethod {
        self.method
    }

    pub fn cutoff(&self) -> RankCutoff {
        self.cutoff
    }

    /// Rank resources by their estimated number of relevant documents.
    ///
    /// `documents[i]` is a centralized sample hit and `resources[i]` the
    /// resource it was sampled from. Neither slice is modified. The result holds
    /// every distinct input resource exactly once, best first.
    pub fn select<D>(
        &self,
        documents: &[ScoredItem<D>],
        resources: &[Resource],
    ) -> Result<Vec<ScoredItem<Resource>>> {
        if documents.len() != resources.len() {
            return Err(FedRankError::invalid(
                "resources",
                format!(
                    "The list of scored documents and the list of resources are of different size: {} != {}",
                    documents.len(),
                    resources.len()
                ),
            ));
        }

        let mut ranked: Vec<SampleDoc<'_>> = documents
            .iter()
            .zip(resources)
            .map(|(doc, resource)| SampleDoc { score: doc.score(), resource })
            .collect();
        if !is_sorted_descending(documents) {
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        let cutoff = self.cutoff.sample_rank(&ranked);
        let scores = match self.method {
            SelectionMethod::Redde { weighting } => redde::resource_scores(&ranked, cutoff, weighting),
            SelectionMethod::Sushi(params) => sushi::resource_scores(&ranked, cutoff, &params),
            SelectionMethod::Ciss => ciss::resource_scores(&ranked, cutoff, ciss::integral_score),
            SelectionMethod::CissApprox => ciss::resource_scores(&ranked, cutoff, ciss::approx_score),
        };

        tracing::debug!(
            method = self.method.name(),
            documents = documents.len(),
            sample_cutoff = cutoff,
            scored_resources = scores.len(),
            "Resource selection complete"
        );

        Ok(scores.into_ranking(ranked.iter().map(|doc| doc.resource)))
    }
}

/// One sample hit reduced to what the scoring steps need.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SampleDoc<'a> {
    pub score: f64,
    pub resource: &'a Resource,
}

/// Per-resource accumulator that remembers first-seen order, so equal scores
/// come out in a deterministic order.
#[derive(Debug, Default)]
pub(crate) struct ResourceScores<'a> {
    entries: Vec<(&'a Resource, f64)>,
    index: HashMap<&'a Resource, usize>,
}

impl<'a> ResourceScores<'a> {
    pub fn add(&mut self, resource: &'a Resource, delta: f64) {
        match self.index.get(resource) {
            Some(&i) => self.entries[i].1 += delta,
            None => {
                self.index.insert(resource, self.entries.len());
                self.entries.push((resource, delta));
            }
        }
    }

    pub fn map_scores(&mut self, f: impl Fn(f64, &Resource) -> f64) {
        for (resource, score) in self.entries.iter_mut() {
            *score = f(*score, resource);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, resource: &Resource) -> Option<f64> {
        self.index.get(resource).map(|&i| self.entries[i].1)
    }

    fn into_ranking<I>(self, resources: I) -> Vec<ScoredItem<Resource>>
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let mut seen: HashSet<&Resource> = self.index.keys().copied().collect();
        let mut ranking: Vec<ScoredItem<Resource>> = self
            .entries
            .iter()
            .map(|(resource, score)| ScoredItem::new((*resource).clone(), *score))
            .collect();
        for resource in resources {
            if seen.insert(resource) {
                ranking.push(ScoredItem::new(resource.clone(), 0.0));
            }
        }
        sort_scored_in_place(&mut ranking, SortOrder::Descending);
        ranking
    }
}
