// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Weighted Graphs
// ─────────────────────────────────────────────────────────────────────
//! Dense symmetric non-negative adjacency.
//!
//! Constructors validate indices and weights; the stored matrix is always
//! symmetric with a zero diagonal.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult};

/// Relative tolerance for the symmetry check in [`Graph::from_adjacency`].
const SYMMETRY_TOL: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    n: usize,
    /// n×n row-major.
    adjacency: Vec<f64>,
}

fn check_weight(w: f64) -> FoundryResult<()> {
    if w >= 0.0 && w.is_finite() {
        Ok(())
    } else {
        Err(FoundryError::Validation(format!(
            "edge weight must be finite and >= 0, got {w}"
        )))
    }
}

impl Graph {
    fn empty(n: usize) -> FoundryResult<Self> {
        if n == 0 {
            return Err(FoundryError::EmptyInput("graph with no nodes".into()));
        }
        Ok(Self {
            n,
            adjacency: vec![0.0; n * n],
        })
    }

    fn check_node(&self, i: usize) -> FoundryResult<()> {
        if i < self.n {
            Ok(())
        } else {
            Err(FoundryError::Validation(format!(
                "node index {i} out of range for {} nodes",
                self.n
            )))
        }
    }

    fn set(&mut self, i: usize, j: usize, w: f64) {
        self.adjacency[i * self.n + j] = w;
        self.adjacency[j * self.n + i] = w;
    }

    /// Unit weight on every listed edge. Self-loops are dropped.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> FoundryResult<Self> {
        let weighted: Vec<(usize, usize, f64)> = edges.iter().map(|&(i, j)| (i, j, 1.0)).collect();
        Self::from_weighted_edges(n, &weighted)
    }

    /// Explicit weights. A repeated edge keeps its last weight.
    pub fn from_weighted_edges(n: usize, edges: &[(usize, usize, f64)]) -> FoundryResult<Self> {
        let mut g = Self::empty(n)?;
        for &(i, j, w) in edges {
            g.check_node(i)?;
            g.check_node(j)?;
            check_weight(w)?;
            if i == j {
                debug!("dropping self-loop on node {i}");
                continue;
            }
            g.set(i, j, w);
        }
        Ok(g)
    }

    /// From a full n×n row-major matrix. Must be symmetric and
    /// non-negative; the diagonal is ignored.
    pub fn from_adjacency(n: usize, matrix: &[f64]) -> FoundryResult<Self> {
        if matrix.len() != n * n {
            return Err(FoundryError::mismatch("adjacency matrix", n * n, matrix.len()));
        }
        let mut g = Self::empty(n)?;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (matrix[i * n + j], matrix[j * n + i]);
                check_weight(a)?;
                check_weight(b)?;
                if (a - b).abs() > SYMMETRY_TOL * a.abs().max(b.abs()).max(1.0) {
                    return Err(FoundryError::Validation(format!(
                        "adjacency not symmetric at ({i}, {j}): {a} vs {b}"
                    )));
                }
                g.set(i, j, 0.5 * (a + b));
            }
        }
        Ok(g)
    }

    /// Face-adjacency graph weighted by normal similarity,
    /// `w = exp(−angle/σ)` with `angle` the angle between face normals.
    pub fn from_face_normals(
        normals: &[[f64; 3]],
        edges: &[(usize, usize)],
        sigma: f64,
    ) -> FoundryResult<Self> {
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(FoundryError::Validation(format!(
                "adjacency sigma must be finite and > 0, got {sigma}"
            )));
        }
        let unit: Vec<[f64; 3]> = normals
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
                if len > 0.0 && len.is_finite() {
                    Ok([v[0] / len, v[1] / len, v[2] / len])
                } else {
                    Err(FoundryError::Validation(format!(
                        "face {i} has a degenerate normal {v:?}"
                    )))
                }
            })
            .collect::<FoundryResult<_>>()?;
        let mut weighted = Vec::with_capacity(edges.len());
        for &(i, j) in edges {
            let (a, b) = (
                unit.get(i).ok_or_else(|| out_of_range(i, unit.len()))?,
                unit.get(j).ok_or_else(|| out_of_range(j, unit.len()))?,
            );
            let cos = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]).clamp(-1.0, 1.0);
            weighted.push((i, j, (-cos.acos() / sigma).exp()));
        }
        Self::from_weighted_edges(normals.len(), &weighted)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn adjacency(&self) -> &[f64] {
        &self.adjacency
    }

    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.adjacency[i * self.n + j]
    }

    /// Row sums of the adjacency.
    pub fn degrees(&self) -> Vec<f64> {
        self.adjacency
            .chunks_exact(self.n)
            .map(|row| row.iter().sum())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        let n = self.n;
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.adjacency[i * n + j] > 0.0)
            .count()
    }

    /// Connected components as node lists, ordered by smallest member.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.n;
        let mut label = vec![usize::MAX; n];
        let mut components = Vec::new();
        for start in 0..n {
            if label[start] != usize::MAX {
                continue;
            }
            let id = components.len();
            let mut members = vec![start];
            label[start] = id;
            let mut head = 0;
            while head < members.len() {
                let u = members[head];
                head += 1;
                for v in 0..n {
                    if label[v] == usize::MAX && self.adjacency[u * n + v] > 0.0 {
                        label[v] = id;
                        members.push(v);
                    }
                }
            }
            members.sort_unstable();
            components.push(members);
        }
        components
    }
}

fn out_of_range(i: usize, n: usize) -> FoundryError {
    FoundryError::Validation(format!("node index {i} out of range for {n} nodes"))
}
