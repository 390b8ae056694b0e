// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Dense Linear Solver
// ─────────────────────────────────────────────────────────────────────
//! Gaussian elimination with partial pivoting.
//!
//! A column whose best pivot is below the tolerance is skipped; its
//! unknown is left at 0 and reported as a
//! [`NumericalWarning::SingularPivot`].

use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSolution {
    pub x: Vec<f64>,
    pub warnings: Vec<NumericalWarning>,
}

impl LinearSolution {
    pub fn is_singular(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Solve the row-major `n × n` system `A·x = b`.
pub fn solve_linear_system(a: &[f64], b: &[f64], tolerance: f64) -> FoundryResult<LinearSolution> {
    let n = b.len();
    if a.len() != n * n {
        return Err(FoundryError::mismatch("linear system matrix", n * n, a.len()));
    }
    let mut m = a.to_vec();
    let mut rhs = b.to_vec();
    let mut singular = vec![false; n];
    let mut warnings = Vec::new();

    for k in 0..n {
        let mut p = k;
        let mut best = m[k * n + k].abs();
        for i in (k + 1)..n {
            let v = m[i * n + k].abs();
            if v > best {
                best = v;
                p = i;
            }
        }
        if !(best >= tolerance) {
            singular[k] = true;
            warnings.push(NumericalWarning::SingularPivot { index: k }.emit("foundry_kriging::solver"));
            continue;
        }
        if p != k {
            for j in 0..n {
                m.swap(k * n + j, p * n + j);
            }
            rhs.swap(k, p);
        }
        let pivot = m[k * n + k];
        for i in (k + 1)..n {
            let f = m[i * n + k] / pivot;
            if f == 0.0 {
                continue;
            }
            for j in k..n {
                m[i * n + j] -= f * m[k * n + j];
            }
            rhs[i] -= f * rhs[k];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        if singular[i] {
            continue;
        }
        let mut s = rhs[i];
        for j in (i + 1)..n {
            s -= m[i * n + j] * x[j];
        }
        x[i] = s / m[i * n + i];
    }

    Ok(LinearSolution { x, warnings })
}
