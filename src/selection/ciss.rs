/// CiSS: score a resource by the area under its sampled score curve.
///
/// A resource's cutoff hits `d_1..d_m` (best first) become the points
/// `(ln k, exp(score_k))`, closed by `(ln(size_ratio * m), 0)` where the
/// resource's estimated full ranking runs out. The trapezoidal rule gives the area.
///
/// CiSS-approx keeps only the first and last points:
/// `exp(top_score) * ln(size_ratio * m) / 2`.

use super::{ResourceScores, SampleDoc};
use crate::selection::Resource;

pub(crate) fn resource_scores<'a>(
    ranked: &[SampleDoc<'a>],
    cutoff: usize,
    score_fn: fn(&Resource, &[f64]) -> f64,
) -> ResourceScores<'a> {
    let mut grouped: Vec<(&'a Resource, Vec<f64>)> = Vec::new();
    for doc in ranked.iter().take(cutoff) {
        match grouped.iter_mut().find(|(resource, _)| *resource == doc.resource) {
            Some((_, scores)) => scores.push(doc.score),
            None => grouped.push((doc.resource, vec![doc.score])),
        }
    }

    let mut scores = ResourceScores::default();
    for (resource, doc_scores) in grouped {
        scores.add(resource, score_fn(resource, &doc_scores));
    }
    scores
}

/// Trapezoidal area under the `(ln rank, exp score)` curve of one resource.
pub fn integral_score(resource: &Resource, scores: &[f64]) -> f64 {
    let Some(&top) = scores.first() else {
        return 0.0;
    };

    let mut area = 0.0;
    let mut left_x = 0.0; // ln(1)
    let mut left_y = top.exp();
    for (i, score) in scores.iter().enumerate().skip(1) {
        let right_x = ((i + 1) as f64).ln();
        let right_y = score.exp();
        area += (right_x - left_x) * (left_y + right_y) / 2.0;
        left_x = right_x;
        left_y = right_y;
    }

    let last_x = max_rank(resource, scores.len()).ln();
    area + (last_x - left_x) * left_y / 2.0
}

/// Two-point approximation of [`integral_score`].
pub fn approx_score(resource: &Resource, scores: &[f64]) -> f64 {
    match scores.first() {
        Some(top) => top.exp() * max_rank(resource, scores.len()).ln() / 2.0,
        None => 0.0,
    }
}

fn max_rank(resource: &Resource, hits: usize) -> f64 {
    resource.size_ratio() * hits as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scored::ScoredItem;
    use crate::selection::{RankCutoff, ResourceSelection, SelectionMethod};

    #[test]
    fn test_empty_scores_zero() {
        let r = Resource::new("r", 10, 1).unwrap();
        assert_eq!(integral_score(&r, &[]), 0.0);
        assert_eq!(approx_score(&r, &[]), 0.0);
    }

    #[test]
    fn test_single_document_matches_approximation() {
        let r = Resource::new("r", 100, 10).unwrap();
        let exact = integral_score(&r, &[0.5]);
        let approx = approx_score(&r, &[0.5]);
        let expected = 0.5f64.exp() * 10f64.ln() / 2.0;
        assert!((exact - expected).abs() < 1e-12);
        assert!((approx - expected).abs() < 1e-12);
    }

    #[test]
    fn test_two_documents_trapezoids() {
        let r = Resource::new("r", 40, 10).unwrap();
        let (s1, s2) = (1.0f64, 0.0f64);
        let first = 2f64.ln() * (s1.exp() + s2.exp()) / 2.0;
        // terminal point at ln(4 * 2)
        let second = (8f64.ln() - 2f64.ln()) * s2.exp() / 2.0;
        let score = integral_score(&r, &[s1, s2]);
        assert!((score - (first + second)).abs() < 1e-12);
    }

    #[test]
    fn test_select_orders_by_area() {
        let big = Resource::new("big", 1000, 10).unwrap();
        let small = Resource::new("small", 20, 10).unwrap();
        let documents = vec![
            ScoredItem::new("a", 2.0),
            ScoredItem::new("b", 1.5),
            ScoredItem::new("c", 1.0),
        ];
        let resources = vec![big.clone(), small.clone(), big.clone()];
        for method in [SelectionMethod::Ciss, SelectionMethod::CissApprox] {
            let ranking = ResourceSelection::new(method, RankCutoff::Sample(3))
                .unwrap()
                .select(&documents, &resources)
                .unwrap();
            assert_eq!(ranking.len(), 2);
            assert_eq!(ranking[0].value(), &big);
            assert!(ranking[0].score() > ranking[1].score());
        }
    }
}
