/// ReDDE: estimate relevant documents per resource by counting sample hits
/// above the cutoff and scaling by how much of the resource the sample covers.
///
/// The variants only change what a single hit contributes:
///
/// | Weighting | Contribution of the hit at 0-based rank `i` |
/// |-----------|---------------------------------------------|
/// | `Uniform` (ReDDE) | `1` |
/// | `CrcsExp` | `exp(-beta * i)` |
/// | `CrcsLinear` | `cutoff - i` |
/// | `GavgLog` | `ln(score)` |
/// | `Top` (ReDDE.top) | `score` |

use serde::{Deserialize, Serialize};

use super::{ResourceScores, SampleDoc};
use crate::errors::{FedRankError, Result};

pub const DEFAULT_BETA: f64 = 0.5;

fn default_beta() -> f64 {
    DEFAULT_BETA
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RankWeighting {
    #[default]
    Uniform,
    CrcsExp {
        #[serde(default = "default_beta")]
        beta: f64,
    },
    CrcsLinear,
    /// Requires positive scores; non-positive scores yield −∞/NaN.
    GavgLog,
    Top,
}

impl RankWeighting {
    pub fn name(&self) -> &'static str {
        match self {
            RankWeighting::Uniform => "redde",
            RankWeighting::CrcsExp { .. } => "crcs_exp",
            RankWeighting::CrcsLinear => "crcs_linear",
            RankWeighting::GavgLog => "gavg_log",
            RankWeighting::Top => "redde_top",
        }
    }

    /// Contribution of a sample hit with `score` at 0-based `rank`.
    pub fn score_at_rank(&self, score: f64, rank: usize, cutoff: usize) -> f64 {
        match *self {
            RankWeighting::Uniform => 1.0,
            RankWeighting::CrcsExp { beta } => (-beta * rank as f64).exp(),
            RankWeighting::CrcsLinear => cutoff.saturating_sub(rank) as f64,
            RankWeighting::GavgLog => score.ln(),
            RankWeighting::Top => score,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            RankWeighting::CrcsExp { beta } if !(beta > 0.0) => Err(FedRankError::invalid(
                "beta",
                format!("The beta is not positive: {}", beta),
            )),
            _ => Ok(()),
        }
    }
}

pub(crate) fn resource_scores<'a>(
    ranked: &[SampleDoc<'a>],
    cutoff: usize,
    weighting: RankWeighting,
) -> ResourceScores<'a> {
    let mut scores = ResourceScores::default();
    for (rank, doc) in ranked.iter().take(cutoff).enumerate() {
        scores.add(doc.resource, weighting.score_at_rank(doc.score, rank, cutoff));
    }
    scores.map_scores(|total, resource| {
        total * resource.full_size() as f64 / resource.sample_size() as f64
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scored::ScoredItem;
    use crate::selection::{RankCutoff, Resource, ResourceSelection, SelectionMethod};

    fn scenario() -> (Vec<ScoredItem<&'static str>>, Vec<Resource>) {
        let r1 = Resource::new("R1", 1561, 98).unwrap();
        let r2 = Resource::new("R2", 3122, 196).unwrap();
        let docs = vec![
            ScoredItem::new("A", 29.0),
            ScoredItem::new("B", 15.0),
            ScoredItem::new("C", 10.0),
            ScoredItem::new("D", 6.0),
        ];
        (docs, vec![r1.clone(), r1, r2.clone(), r2])
    }

    fn select(weighting: RankWeighting, cutoff: RankCutoff) -> Vec<ScoredItem<Resource>> {
        let (docs, resources) = scenario();
        ResourceSelection::new(SelectionMethod::Redde { weighting }, cutoff)
            .unwrap()
            .select(&docs, &resources)
            .unwrap()
    }

    #[test]
    fn test_redde_counts_and_scales() {
        let ranking = select(RankWeighting::Uniform, RankCutoff::Sample(4));
        assert_eq!(ranking.len(), 2);
        let expected_r1 = 2.0 * 1561.0 / 98.0;
        let expected_r2 = 2.0 * 3122.0 / 196.0;
        for item in &ranking {
            let expected = if item.value().id() == "R1" { expected_r1 } else { expected_r2 };
            assert!((item.score() - expected).abs() < 1e-9, "{}", item);
        }
        assert!(ranking[0].score() >= ranking[1].score());
    }

    #[test]
    fn test_complete_cutoff_maps_to_first_document() {
        // each hit stands for 15 complete-collection documents
        let ranking = select(RankWeighting::Uniform, RankCutoff::Complete(4));
        assert_eq!(ranking[0].value().id(), "R1");
        assert!((ranking[0].score() - 1561.0 / 98.0).abs() < 1e-9);
        assert_eq!(ranking[1].score(), 0.0);
    }

    #[test]
    fn test_crcs_exp() {
        let ranking = select(RankWeighting::CrcsExp { beta: 0.5 }, RankCutoff::Sample(4));
        let r1 = (1.0 + (-0.5f64).exp()) * 1561.0 / 98.0;
        assert_eq!(ranking[0].value().id(), "R1");
        assert!((ranking[0].score() - r1).abs() < 1e-9);
    }

    #[test]
    fn test_crcs_linear() {
        let ranking = select(RankWeighting::CrcsLinear, RankCutoff::Sample(4));
        // R1 gets 4 + 3, R2 gets 2 + 1
        assert!((ranking[0].score() - 7.0 * 1561.0 / 98.0).abs() < 1e-9);
        assert!((ranking[1].score() - 3.0 * 3122.0 / 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_gavg_log_and_top() {
        let ranking = select(RankWeighting::GavgLog, RankCutoff::Sample(4));
        let r1 = (29f64.ln() + 15f64.ln()) * 1561.0 / 98.0;
        assert!((ranking[0].score() - r1).abs() < 1e-9);

        let ranking = select(RankWeighting::Top, RankCutoff::Sample(4));
        assert!((ranking[0].score() - 44.0 * 1561.0 / 98.0).abs() < 1e-9);
        assert!((ranking[1].score() - 16.0 * 3122.0 / 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_at_rank_beyond_cutoff() {
        assert_eq!(RankWeighting::CrcsLinear.score_at_rank(1.0, 7, 5), 0.0);
        assert_eq!(RankWeighting::CrcsLinear.score_at_rank(1.0, 0, 5), 5.0);
    }

    #[test]
    fn test_non_positive_beta_rejected() {
        let err = ResourceSelection::with_method(SelectionMethod::Redde {
            weighting: RankWeighting::CrcsExp { beta: 0.0 },
        })
        .unwrap_err();
        assert!(matches!(err, FedRankError::InvalidArgument { .. }));
    }
}
