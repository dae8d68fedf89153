//! Penalised least squares
//!
//! Solves `(XᵀX + diag(λ)) β = Xᵀy` through the normal equations and a
//! Cholesky factorisation. The design matrices used for trend and
//! seasonality fits are small (tens of columns), so the dense solve is cheap.

use crate::{MathError, Result};

/// Smallest pivot accepted by the Cholesky factorisation
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Fit ridge regression coefficients.
///
/// `design` holds one row per observation, every row with the same number of
/// columns as `penalties`. A zero penalty leaves that coefficient unregularised.
pub fn ridge_solve(design: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but {} targets were given",
            design.len(),
            targets.len()
        )));
    }
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit a regression without observations".to_string(),
        ));
    }

    let k = penalties.len();
    if let Some(row) = design.iter().find(|row| row.len() != k) {
        return Err(MathError::InvalidInput(format!(
            "Design row has {} columns, expected {}",
            row.len(),
            k
        )));
    }
    if penalties.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    let mut gram = vec![vec![0.0; k]; k];
    let mut rhs = vec![0.0; k];
    for (row, &y) in design.iter().zip(targets) {
        for i in 0..k {
            rhs[i] += row[i] * y;
            for j in 0..=i {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[j][i] = gram[i][j];
        }
    }

    let lower = cholesky(&gram)?;
    Ok(cholesky_solve(&lower, &rhs))
}

/// Lower-triangular factor `L` with `L Lᵀ = a`
fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    let mut lower = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|m| lower[i][m] * lower[j][m]).sum();
            if i == j {
                let pivot = a[i][i] - dot;
                if pivot <= PIVOT_TOLERANCE || !pivot.is_finite() {
                    return Err(MathError::CalculationError(format!(
                        "Normal equations are not positive definite (pivot {} at column {})",
                        pivot, i
                    )));
                }
                lower[i][j] = pivot.sqrt();
            } else {
                lower[i][j] = (a[i][j] - dot) / lower[j][j];
            }
        }
    }

    Ok(lower)
}

fn cholesky_solve(lower: &[Vec<f64>], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();

    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let dot: f64 = (0..i).map(|m| lower[i][m] * z[m]).sum();
        z[i] = (rhs[i] - dot) / lower[i][i];
    }

    // Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot: f64 = (i + 1..n).map(|m| lower[m][i] * x[m]).sum();
        x[i] = (z[i] - dot) / lower[i][i];
    }

    x
}
