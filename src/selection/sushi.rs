/// SUSHI: fit each resource's sample scores against estimated complete-collection
/// ranks, extrapolate the top of every resource's full ranking, and score
/// resources by how much of the merged top `rank_threshold` they own.
///
/// Rank estimation walks the cutoff documents best-first with a single running
/// complete rank `c`. A hit from a resource with truncated size ratio `s` is placed
/// at `trunc(c + s / 2)`, then `c` advances by `s`.
///
/// Three fits are tried per resource (`x`, `ln x`, `exp x`) and the one with the
/// highest r² is kept, provided it saw at least `min_docs` hits. Resources
/// without a kept fit contribute their raw sample hits instead.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ResourceScores, SampleDoc};
use crate::errors::{FedRankError, Result};
use crate::regression::{best_fit, Transform, TransformedRegression};
use crate::selection::Resource;

const CANDIDATE_TRANSFORMS: [Transform; 3] = [Transform::Linear, Transform::Log, Transform::Exp];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SushiParams {
    /// Hits a resource needs in the cutoff before its fit is trusted (>= 2).
    pub min_docs: usize,
    /// Depth of the extrapolated merged ranking (> 0).
    pub rank_threshold: usize,
}

impl Default for SushiParams {
    fn default() -> Self {
        SushiParams {
            min_docs: 5,
            rank_threshold: 1000,
        }
    }
}

impl SushiParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.min_docs < 2 {
            return Err(FedRankError::invalid(
                "min_docs",
                format!("The minimum number of documents is less than 2: {}", self.min_docs),
            ));
        }
        if self.rank_threshold == 0 {
            return Err(FedRankError::invalid(
                "rank_threshold",
                "The rank threshold is less or equal to zero: 0",
            ));
        }
        Ok(())
    }
}

pub(crate) fn resource_scores<'a>(
    ranked: &[SampleDoc<'a>],
    cutoff: usize,
    params: &SushiParams,
) -> ResourceScores<'a> {
    let cut = &ranked[..cutoff.min(ranked.len())];
    let models = fit_models(cut, params.min_docs);
    let modelled: HashSet<&Resource> = models.iter().map(|(resource, _)| *resource).collect();

    // Sample hits of unmodelled resources stand in for their full rankings
    let mut complete: Vec<(f64, &'a Resource)> = cut
        .iter()
        .filter(|doc| !modelled.contains(doc.resource))
        .map(|doc| (doc.score, doc.resource))
        .collect();

    for (resource, model) in &models {
        for rank in 1..=params.rank_threshold {
            let score = model.predict(rank as f64);
            // exp fits overflow far from the sampled ranks
            if score.is_finite() {
                complete.push((score, *resource));
            }
        }
    }

    complete.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut scores = ResourceScores::default();
    for (_, resource) in &complete {
        scores.add(*resource, 0.0);
    }
    for (score, resource) in complete.iter().take(params.rank_threshold) {
        scores.add(*resource, *score);
    }
    scores
}

/// Best-fit rank-to-score model per resource, in first-seen order. Resources
/// whose model saw fewer than `min_docs` hits are left out.
fn fit_models<'a>(cut: &[SampleDoc<'a>], min_docs: usize) -> Vec<(&'a Resource, TransformedRegression)> {
    let mut fits: Vec<(&'a Resource, Vec<TransformedRegression>)> = Vec::new();
    let mut complete_rank: u64 = 0;

    for doc in cut {
        let ratio = doc.resource.integral_size_ratio();
        let estimated_rank = (complete_rank as f64 + 0.5 * ratio as f64).trunc();
        complete_rank += ratio;

        let position = match fits.iter().position(|(resource, _)| *resource == doc.resource) {
            Some(i) => i,
            None => {
                fits.push((doc.resource, TransformedRegression::family(&CANDIDATE_TRANSFORMS)));
                fits.len() - 1
            }
        };
        for model in fits[position].1.iter_mut() {
            model.add(estimated_rank, doc.score);
        }
    }

    fits.into_iter()
        .filter_map(|(resource, models)| {
            let best = best_fit(models, |m| m.r_square())?;
            if best.len() < min_docs as u64 {
                return None;
            }
            tracing::debug!(
                resource = resource.id(),
                transform = ?best.transform(),
                r_square = best.r_square(),
                documents = best.len(),
                "SUSHI fit selected"
            );
            Some((resource, best))
        })
        .collect()
}
