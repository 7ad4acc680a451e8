/// Online simple linear regression.
///
/// Sufficient statistics are updated one point at a time with the
/// numerically stable centred updates (no raw sums of squares), so long
/// rankings with large rank values do not lose precision.
///
/// Degenerate fits are resolved locally instead of producing NaN:
/// - fewer than two points: slope 0, prediction 0, fit quality 0
/// - no spread in x: slope 0, fit quality 0
/// - no spread in y, or non-finite statistics: fit quality 0

use serde::{Deserialize, Serialize};

/// Smallest usable spread in x before the slope is treated as undefined.
const MIN_SUM_XX: f64 = 10.0 * f64::MIN_POSITIVE;

#[derive(Debug, Clone, Default)]
pub struct OnlineRegression {
    n: u64,
    x_bar: f64,
    y_bar: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl OnlineRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: f64, y: f64) {
        if self.n == 0 {
            self.x_bar = x;
            self.y_bar = y;
        } else {
            let n = self.n as f64;
            let fact1 = 1.0 + n;
            let fact2 = n / (1.0 + n);
            let dx = x - self.x_bar;
            let dy = y - self.y_bar;
            self.sum_xx += dx * dx * fact2;
            self.sum_yy += dy * dy * fact2;
            self.sum_xy += dx * dy * fact2;
            self.x_bar += dx / fact1;
            self.y_bar += dy / fact1;
        }
        self.n += 1;
    }

    /// Number of points added so far.
    pub fn len(&self) -> u64 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn slope(&self) -> f64 {
        if self.n < 2 || !(self.sum_xx.abs() >= MIN_SUM_XX) {
            return 0.0;
        }
        let slope = self.sum_xy / self.sum_xx;
        if slope.is_finite() { slope } else { 0.0 }
    }

    pub fn intercept(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        self.y_bar - self.slope() * self.x_bar
    }

    /// Coefficient of determination.
    pub fn r_square(&self) -> f64 {
        if self.n < 2 || !(self.sum_xx.abs() >= MIN_SUM_XX) || self.sum_yy == 0.0 {
            return 0.0;
        }
        let sse = (self.sum_yy - self.sum_xy * self.sum_xy / self.sum_xx).max(0.0);
        let r_square = (self.sum_yy - sse) / self.sum_yy;
        if r_square.is_finite() { r_square } else { 0.0 }
    }

    /// Pearson's r, signed like the slope.
    pub fn r(&self) -> f64 {
        let r = self.r_square().sqrt();
        if self.slope() < 0.0 { -r } else { r }
    }

    pub fn predict(&self, x: f64) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        self.slope() * x + self.intercept()
    }
}

/// Transform applied to x before it enters a regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Linear,
    /// `ln(x)`, −∞ for `x <= 0`.
    Log,
    Exp,
    /// `sqrt(x)`, 0 for `x < 0`.
    Sqrt,
    /// `1/x`, 0 for `x == 0`.
    Reciprocal,
}

impl Transform {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Transform::Linear => x,
            Transform::Log => {
                if x <= 0.0 {
                    f64::NEG_INFINITY
                } else {
                    x.ln()
                }
            }
            Transform::Exp => x.exp(),
            Transform::Sqrt => {
                if x < 0.0 {
                    0.0
                } else {
                    x.sqrt()
                }
            }
            Transform::Reciprocal => {
                if x == 0.0 {
                    0.0
                } else {
                    1.0 / x
                }
            }
        }
    }
}

/// A regression of `y` against `transform(x)`.
#[derive(Debug, Clone)]
pub struct TransformedRegression {
    transform: Transform,
    regression: OnlineRegression,
}

impl TransformedRegression {
    pub fn new(transform: Transform) -> Self {
        TransformedRegression { transform, regression: OnlineRegression::new() }
    }

    /// One fresh model per transform, in the given order.
    pub fn family(transforms: &[Transform]) -> Vec<Self> {
        transforms.iter().map(|t| Self::new(*t)).collect()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn add(&mut self, x: f64, y: f64) {
        self.regression.add(self.transform.apply(x), y);
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.regression.predict(self.transform.apply(x))
    }

    pub fn len(&self) -> u64 {
        self.regression.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regression.is_empty()
    }

    pub fn r_square(&self) -> f64 {
        self.regression.r_square()
    }

    pub fn r(&self) -> f64 {
        self.regression.r()
    }
}

/// Pick the model with the highest `quality`. A later model must be strictly
/// better to replace an earlier one, so the first wins ties.
pub fn best_fit<F>(models: Vec<TransformedRegression>, quality: F) -> Option<TransformedRegression>
where
    F: Fn(&TransformedRegression) -> f64,
{
    let mut best: Option<(f64, TransformedRegression)> = None;
    for model in models {
        let q = quality(&model);
        match &best {
            Some((best_q, _)) if !(q > *best_q) => {}
            _ => best = Some((q, model)),
        }
    }
    best.map(|(_, model)| model)
}
