// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Spectral Clustering
// ─────────────────────────────────────────────────────────────────────
//! Normalised spectral clustering.
//!
//! Embedding = the k−1 smallest eigenvectors of L_sym orthogonal to the
//! trivial vector `D^{1/2}·1`, rows scaled to unit length, then k-means.
//! Together with the trivial vector these span the k lowest modes; a
//! further column would be drawn from the next eigenspace, which is
//! degenerate on a graph of k cliques and scatters rows within a clique.
//! Labels are canonical: clusters are numbered by their smallest node.

use log::info;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig};

use crate::eigen::{smallest_eigenpairs_deflated, EigenOptions};
use crate::graph::Graph;
use crate::kmeans::{kmeans, KMeansOptions};
use crate::laplacian::LaplacianKind;

/// Rows shorter than this stay unnormalised.
const MIN_ROW_NORM: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClusterOptions {
    pub eigen: EigenOptions,
    pub kmeans: KMeansOptions,
}

impl ClusterOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            eigen: EigenOptions::from_config(config),
            kmeans: KMeansOptions::from_config(config),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Cluster id per node.
    pub labels: Vec<usize>,
    pub k: usize,
    /// One row per node, k−1 columns.
    pub embedding: Vec<Vec<f64>>,
    /// Non-trivial L_sym eigenvalues behind the embedding, ascending.
    pub eigenvalues: Vec<f64>,
    pub inertia: f64,
    /// Eigenpairs and k-means both converged.
    pub converged: bool,
    pub warnings: Vec<NumericalWarning>,
}

impl ClusterAssignment {
    pub fn cluster_of(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied()
    }

    pub fn nodes_in_cluster(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c == cluster).then_some(i))
            .collect()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &c in &self.labels {
            sizes[c] += 1;
        }
        sizes
    }
}

/// Renumber labels in order of first appearance.
fn canonical_labels(raw: &[usize], k: usize) -> Vec<usize> {
    let mut map = vec![usize::MAX; k];
    let mut next = 0;
    raw.iter()
        .map(|&c| {
            if map[c] == usize::MAX {
                map[c] = next;
                next += 1;
            }
            map[c]
        })
        .collect()
}

/// A caller-chosen `k` must satisfy `0 < k < n`.
pub(crate) fn check_cluster_count(k: usize, nodes: usize) -> FoundryResult<()> {
    if k == 0 || k >= nodes {
        return Err(FoundryError::InvalidClusterCount { k, nodes });
    }
    Ok(())
}

/// Partition `graph` into `k` clusters.
///
/// `k = 0` or `k ≥ n` is rejected; `k = 1` puts every node in cluster 0.
pub fn spectral_cluster(
    graph: &Graph,
    k: usize,
    options: &ClusterOptions,
) -> FoundryResult<ClusterAssignment> {
    let n = graph.n();
    check_cluster_count(k, n)?;
    if k == 1 {
        return Ok(ClusterAssignment {
            labels: vec![0; n],
            k,
            embedding: vec![Vec::new(); n],
            eigenvalues: Vec::new(),
            inertia: 0.0,
            converged: true,
            warnings: Vec::new(),
        });
    }

    let laplacian = graph.laplacian(LaplacianKind::SymmetricNormalized);
    let trivial: Vec<Vec<f64>> = graph.trivial_eigenvector().into_iter().collect();
    let eig = smallest_eigenpairs_deflated(&laplacian, n, k - 1, &trivial, &options.eigen)?;

    let embedding: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row: Vec<f64> = eig.vectors.iter().map(|v| v[i]).collect();
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > MIN_ROW_NORM {
                row.iter_mut().for_each(|x| *x /= norm);
            }
            row
        })
        .collect();

    let km = kmeans(&embedding, k, &options.kmeans)?;
    let converged = eig.converged() && km.converged;
    let mut warnings = eig.warnings;
    warnings.extend(km.warnings);

    info!(
        "spectral clustering: n={n} k={k} λ={:?} inertia={:.3e} converged={converged}",
        eig.values, km.inertia
    );
    Ok(ClusterAssignment {
        labels: canonical_labels(&km.labels, k),
        k,
        embedding,
        eigenvalues: eig.values,
        inertia: km.inertia,
        converged,
        warnings,
    })
}
