// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Cholesky Factorisation
// ─────────────────────────────────────────────────────────────────────
//! `A = L·Lᵀ` for symmetric positive (semi-)definite matrices.
//!
//! A non-positive pivot is clamped to a floor instead of failing, and the
//! clamp is recorded as a [`NumericalWarning`]. Storage is n×n row-major.

use serde::Serialize;

use foundry_types::NumericalWarning;

#[derive(Debug, Clone, Serialize)]
pub struct Cholesky {
    n: usize,
    l: Vec<f64>,
    warnings: Vec<NumericalWarning>,
}

impl Cholesky {
    /// Factor the row-major `n × n` matrix `a` (only the lower triangle is
    /// read).
    pub fn factor(a: &[f64], n: usize, floor: f64) -> Self {
        let mut l = vec![0.0; n * n];
        let mut warnings = Vec::new();

        for j in 0..n {
            let mut pivot = a[j * n + j];
            for k in 0..j {
                pivot -= l[j * n + k] * l[j * n + k];
            }
            if !(pivot > 0.0) {
                warnings.push(
                    NumericalWarning::ClampedPivot {
                        index: j,
                        value: pivot,
                        floor,
                    }
                    .emit("foundry_gp::cholesky"),
                );
                pivot = floor;
            }
            let d = pivot.sqrt();
            l[j * n + j] = d;

            for i in (j + 1)..n {
                let mut s = a[i * n + j];
                for k in 0..j {
                    s -= l[i * n + k] * l[j * n + k];
                }
                l[i * n + j] = s / d;
            }
        }

        Self { n, l, warnings }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// Lower-triangular factor, row-major.
    pub fn factor_matrix(&self) -> &[f64] {
        &self.l
    }

    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    /// Solve `L·x = b`.
    pub fn solve_lower(&self, b: &[f64]) -> Vec<f64> {
        let n = self.n;
        let mut x = vec![0.0; n];
        for i in 0..n {
            let mut s = b[i];
            for k in 0..i {
                s -= self.l[i * n + k] * x[k];
            }
            x[i] = s / self.l[i * n + i];
        }
        x
    }

    /// Solve `Lᵀ·x = b`.
    pub fn solve_upper(&self, b: &[f64]) -> Vec<f64> {
        let n = self.n;
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut s = b[i];
            for k in (i + 1)..n {
                s -= self.l[k * n + i] * x[k];
            }
            x[i] = s / self.l[i * n + i];
        }
        x
    }

    /// Solve `A·x = b` by forward then back substitution.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        self.solve_upper(&self.solve_lower(b))
    }

    /// `log|A| = 2·Σ log L_ii`.
    pub fn log_det(&self) -> f64 {
        2.0 * (0..self.n).map(|i| self.l[i * self.n + i].ln()).sum::<f64>()
    }
}
