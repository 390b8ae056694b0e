// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Graph Laplacians
// ─────────────────────────────────────────────────────────────────────
//! L = D − W and its two normalisations.
//!
//! Isolated nodes (degree ≤ [`ISOLATED_DEGREE`]) get zero rows and columns
//! in the normalised forms.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

pub const ISOLATED_DEGREE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaplacianKind {
    /// L = D − W.
    Unnormalized,
    /// L_sym = I − D^{-1/2} W D^{-1/2}. Default.
    #[default]
    SymmetricNormalized,
    /// L_rw = I − D^{-1} W. Not symmetric.
    RandomWalk,
}

impl LaplacianKind {
    pub fn is_symmetric(self) -> bool {
        !matches!(self, Self::RandomWalk)
    }
}

/// `1/√d` per node, 0 for isolated nodes.
fn inv_sqrt_degrees(degrees: &[f64]) -> Vec<f64> {
    degrees
        .iter()
        .map(|&d| if d > ISOLATED_DEGREE { 1.0 / d.sqrt() } else { 0.0 })
        .collect()
}

impl Graph {
    /// n×n row-major Laplacian of the requested kind.
    pub fn laplacian(&self, kind: LaplacianKind) -> Vec<f64> {
        let n = self.n();
        let w = self.adjacency();
        let degrees = self.degrees();
        let mut l = vec![0.0; n * n];
        match kind {
            LaplacianKind::Unnormalized => {
                for i in 0..n {
                    for j in 0..n {
                        l[i * n + j] = -w[i * n + j];
                    }
                    l[i * n + i] += degrees[i];
                }
            }
            LaplacianKind::SymmetricNormalized => {
                let s = inv_sqrt_degrees(&degrees);
                for i in 0..n {
                    if s[i] == 0.0 {
                        continue;
                    }
                    for j in 0..n {
                        l[i * n + j] = -(s[i] * w[i * n + j] * s[j]);
                    }
                    l[i * n + i] += 1.0;
                }
            }
            LaplacianKind::RandomWalk => {
                for i in 0..n {
                    if degrees[i] <= ISOLATED_DEGREE {
                        continue;
                    }
                    for j in 0..n {
                        l[i * n + j] = -w[i * n + j] / degrees[i];
                    }
                    l[i * n + i] += 1.0;
                }
            }
        }
        l
    }

    /// Unit-norm `D^{1/2}·1`, the null vector of L_sym on every component.
    /// `None` for an edgeless graph.
    pub fn trivial_eigenvector(&self) -> Option<Vec<f64>> {
        let mut t: Vec<f64> = self
            .degrees()
            .iter()
            .map(|&d| if d > ISOLATED_DEGREE { d.sqrt() } else { 0.0 })
            .collect();
        let norm = t.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        t.iter_mut().for_each(|x| *x /= norm);
        Some(t)
    }
}
