/// Fitting of the linear normalization transforms.
///
/// A zero (or otherwise unusable) divisor falls back to 1, so degenerate lists
/// are shifted but never divided by zero.

use serde::{Deserialize, Serialize};

/// `x -> (x - shift) / scale`, with `scale` always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTransform {
    pub shift: f64,
    pub scale: f64,
}

impl LinearTransform {
    pub const IDENTITY: LinearTransform = LinearTransform { shift: 0.0, scale: 1.0 };

    fn new(shift: f64, scale: f64) -> Self {
        let scale = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
        LinearTransform { shift, scale }
    }

    pub fn apply(&self, x: f64) -> f64 {
        (x - self.shift) / self.scale
    }
}

pub fn fit_min_max(scores: &[f64]) -> LinearTransform {
    if scores.is_empty() {
        return LinearTransform::IDENTITY;
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    LinearTransform::new(min, max - min)
}

/// Welford's single-pass mean and sample standard deviation.
pub fn fit_z_score(scores: &[f64]) -> LinearTransform {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in scores.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    let stddev = if scores.len() > 1 {
        (m2 / (scores.len() - 1) as f64).sqrt()
    } else {
        0.0
    };
    LinearTransform::new(mean, stddev)
}

pub fn fit_sum(scores: &[f64]) -> LinearTransform {
    if scores.is_empty() {
        return LinearTransform::IDENTITY;
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted_sum: f64 = scores.iter().sum::<f64>() - scores.len() as f64 * min;
    LinearTransform::new(min, shifted_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let t = fit_min_max(&[2.0, 6.0, 4.0]);
        assert_eq!(t.shift, 2.0);
        assert_eq!(t.scale, 4.0);
        assert_eq!(t.apply(4.0), 0.5);
    }

    #[test]
    fn test_min_max_all_negative() {
        let t = fit_min_max(&[-1.0, -3.0]);
        assert_eq!(t.apply(-1.0), 1.0);
        assert_eq!(t.apply(-3.0), 0.0);
    }

    #[test]
    fn test_z_score_matches_two_pass() {
        let scores = [29.0, 15.0, 10.0, 6.0, 4.0, 3.0, 1.0];
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
        let t = fit_z_score(&scores);
        assert!((t.shift - mean).abs() < 1e-12);
        assert!((t.scale - var.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_z_score_degenerate() {
        assert_eq!(fit_z_score(&[5.0]).scale, 1.0);
        assert_eq!(fit_z_score(&[5.0]).apply(5.0), 0.0);
        assert_eq!(fit_z_score(&[2.0, 2.0]).scale, 1.0);
        assert_eq!(fit_z_score(&[]), LinearTransform::IDENTITY);
    }

    #[test]
    fn test_sum() {
        // shifted values 2, 0, 1 sum to 3
        let t = fit_sum(&[3.0, 1.0, 2.0]);
        assert_eq!(t.shift, 1.0);
        assert_eq!(t.scale, 3.0);
        assert!((t.apply(3.0) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sum_constant_list() {
        let t = fit_sum(&[4.0, 4.0]);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.apply(4.0), 0.0);
    }
}
