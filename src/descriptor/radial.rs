//! Orthonormal radial basis for the density expansion.
//!
//! The primitive functions are shifted powers `φ_n(r) = (rcut - r)^(n+2)`,
//! which vanish smoothly at the cutoff. They are orthonormalized against the
//! weight `r²` on `[0, rcut]` using the analytic overlap matrix
//! `S_nm = ∫ φ_n φ_m r² dr = rcut^(n+m+7) · 2 / ((n+m+5)(n+m+6)(n+m+7))`
//! and a Cholesky factorization: with `S = L Lᵀ`, the rows of `L⁻¹` give the
//! orthonormal combinations `g_n = Σ_m (L⁻¹)_nm φ_m`.

use super::error::Error;

#[derive(Debug, Clone)]
pub struct RadialBasis {
    nmax: usize,
    rcut: f64,
    /// Lower-triangular transform `L⁻¹`, row n holding the φ coefficients of g_n.
    transform: Vec<Vec<f64>>,
}

impl RadialBasis {
    pub fn new(nmax: usize, rcut: f64) -> Result<Self, Error> {
        let overlap = overlap_matrix(nmax, rcut);
        let cholesky = cholesky_lower(&overlap)
            .ok_or_else(|| Error::RadialBasis("overlap matrix is not positive definite".into()))?;
        let transform = invert_lower(&cholesky);
        Ok(Self {
            nmax,
            rcut,
            transform,
        })
    }

    /// Evaluates all `g_n(r)`; zero beyond the cutoff.
    pub fn evaluate(&self, r: f64) -> Vec<f64> {
        if r >= self.rcut {
            return vec![0.0; self.nmax];
        }
        let shifted = self.rcut - r;
        // φ_m(r) = shifted^(m+2)
        let mut primitives = Vec::with_capacity(self.nmax);
        let mut power = shifted * shifted;
        for _ in 0..self.nmax {
            primitives.push(power);
            power *= shifted;
        }
        self.transform
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&primitives)
                    .map(|(w, phi)| w * phi)
                    .sum::<f64>()
            })
            .collect()
    }
}

fn overlap_matrix(nmax: usize, rcut: f64) -> Vec<Vec<f64>> {
    let mut overlap = vec![vec![0.0; nmax]; nmax];
    for n in 0..nmax {
        for m in 0..nmax {
            let p = (n + m + 4) as f64;
            overlap[n][m] =
                rcut.powi(n as i32 + m as i32 + 7) * 2.0 / ((p + 1.0) * (p + 2.0) * (p + 3.0));
        }
    }
    overlap
}

/// Cholesky factor `L` of a symmetric positive-definite matrix, or `None` if
/// a pivot collapses to a non-positive value.
fn cholesky_lower(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let size = matrix.len();
    let mut lower = vec![vec![0.0; size]; size];
    for i in 0..size {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for k in 0..j {
                sum -= lower[i][k] * lower[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                lower[i][j] = sum.sqrt();
            } else {
                lower[i][j] = sum / lower[j][j];
            }
        }
    }
    Some(lower)
}

/// Inverse of a lower-triangular matrix by forward substitution.
fn invert_lower(lower: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let size = lower.len();
    let mut inverse = vec![vec![0.0; size]; size];
    for i in 0..size {
        inverse[i][i] = 1.0 / lower[i][i];
        for j in 0..i {
            let mut sum = 0.0;
            for k in j..i {
                sum += lower[i][k] * inverse[k][j];
            }
            inverse[i][j] = -sum / lower[i][i];
        }
    }
    inverse
}
