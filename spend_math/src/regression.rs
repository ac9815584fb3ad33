//! Multiple linear regression fitted by ordinary least squares
//!
//! The model is `y = intercept + Σ coefficient[i] * x[i]`. Fitting centres
//! every column on its mean, which removes the intercept from the normal
//! equations; the intercept is recovered afterwards from the means.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Relative pivot size below which a column is treated as linearly dependent
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Linear regression over fixed-width feature rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    n_features: usize,
    coefficients: Option<Vec<f64>>,
    intercept: Option<f64>,
}

impl LinearRegression {
    /// Create an unfitted regression expecting `n_features` values per row
    pub fn new(n_features: usize) -> Result<Self> {
        if n_features == 0 {
            return Err(MathError::InvalidInput(
                "Regression needs at least one feature".to_string(),
            ));
        }

        Ok(Self {
            n_features,
            coefficients: None,
            intercept: None,
        })
    }

    /// Rebuild a fitted regression from stored parameters
    pub fn from_parts(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(MathError::InvalidInput(
                "Regression needs at least one coefficient".to_string(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::InvalidInput(
                "Regression parameters must be finite".to_string(),
            ));
        }

        Ok(Self {
            n_features: coefficients.len(),
            coefficients: Some(coefficients),
            intercept: Some(intercept),
        })
    }

    /// Fit the regression to `rows` (one feature vector per observation) and `targets`
    pub fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if rows.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a regression without observations".to_string(),
            ));
        }
        if rows.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Row count ({}) doesn't match target count ({})",
                rows.len(),
                targets.len()
            )));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != self.n_features) {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features per row, found {}",
                self.n_features,
                row.len()
            )));
        }
        if rows.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Observations must be finite".to_string(),
            ));
        }

        let k = self.n_features;
        let n = rows.len() as f64;

        let mut x_mean = vec![0.0; k];
        for row in rows {
            for (mean, value) in x_mean.iter_mut().zip(row) {
                *mean += value;
            }
        }
        x_mean.iter_mut().for_each(|mean| *mean /= n);
        let y_mean = targets.iter().sum::<f64>() / n;

        // Centred normal equations: (XcᵀXc) β = Xcᵀyc
        let mut gram = vec![vec![0.0; k]; k];
        let mut moment = vec![0.0; k];
        for (row, &target) in rows.iter().zip(targets) {
            let centred: Vec<f64> = row.iter().zip(&x_mean).map(|(x, m)| x - m).collect();
            let y = target - y_mean;
            for i in 0..k {
                moment[i] += centred[i] * y;
                for j in 0..k {
                    gram[i][j] += centred[i] * centred[j];
                }
            }
        }

        let coefficients = solve_symmetric(gram, moment);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(beta, mean)| beta * mean)
                .sum::<f64>();

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);

        Ok(())
    }

    /// Predict the target for a single feature row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        let (coefficients, intercept) = match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) => (coefficients, intercept),
            _ => {
                return Err(MathError::NotFitted(
                    "call fit() before predict()".to_string(),
                ))
            }
        };

        if row.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, found {}",
                self.n_features,
                row.len()
            )));
        }

        Ok(intercept
            + coefficients
                .iter()
                .zip(row)
                .map(|(beta, x)| beta * x)
                .sum::<f64>())
    }

    /// Number of features per row
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Whether `fit` (or `from_parts`) has produced parameters
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some() && self.intercept.is_some()
    }

    /// Fitted coefficients, one per feature
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    /// Fitted intercept
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }
}

/// Solve `a x = b` for a symmetric positive semi-definite `a`.
///
/// Gaussian elimination with partial pivoting. Columns whose pivot falls
/// below the tolerance are dependent on earlier ones; their coefficient is
/// fixed at zero, so rank-deficient systems still yield a solution.
fn solve_symmetric(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let k = b.len();
    let scale = (0..k).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let tolerance = PIVOT_TOLERANCE * scale;

    let mut pivots: Vec<(usize, usize)> = Vec::with_capacity(k);
    let mut row = 0;

    for col in 0..k {
        if row == k {
            break;
        }

        let best = (row..k)
            .max_by(|&p, &q| a[p][col].abs().total_cmp(&a[q][col].abs()))
            .unwrap_or(row);
        if scale == 0.0 || a[best][col].abs() <= tolerance {
            continue;
        }

        a.swap(row, best);
        b.swap(row, best);

        for r in row + 1..k {
            let factor = a[r][col] / a[row][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..k {
                a[r][c] -= factor * a[row][c];
            }
            b[r] -= factor * b[row];
        }

        pivots.push((row, col));
        row += 1;
    }

    let mut x = vec![0.0; k];
    for &(r, c) in pivots.iter().rev() {
        let tail: f64 = (c + 1..k).map(|j| a[r][j] * x[j]).sum();
        x[c] = (b[r] - tail) / a[r][c];
    }

    x
}
