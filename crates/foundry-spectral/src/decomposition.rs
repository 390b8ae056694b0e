// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Part Decomposition
// ─────────────────────────────────────────────────────────────────────
//! Face-adjacency graph → spectral clusters → machining setups.
//!
//! Each cluster of faces becomes one setup. Setups are ranked by face
//! count (largest first); each carries the dominant axis of its
//! mean face normal and a workholding hint keyed on that axis.

use log::info;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig};

use crate::clustering::{check_cluster_count, spectral_cluster, ClusterOptions};
use crate::eigen::{smallest_eigenpairs_deflated, EigenOptions};
use crate::graph::Graph;
use crate::laplacian::LaplacianKind;

/// Largest cluster count the eigen-gap heuristic considers.
pub const MAX_SUGGESTED_CLUSTERS: usize = 8;

/// Below this mean-normal length a region faces every direction.
const SPREAD_NORMAL_LENGTH: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCountSuggestion {
    pub k: usize,
    /// `1 − λ_k/λ_{k+1}` in [0, 1].
    pub confidence: f64,
    /// The `max_k + 1` smallest L_sym eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
}

/// Pick `k ∈ 2..=max_k` maximising `λ_{k+1} − λ_k` (1-based, ascending).
/// Ties keep the smaller k. `None` when fewer than three eigenvalues
/// are available.
pub fn eigengap_heuristic(eigenvalues: &[f64], max_k: usize) -> Option<ClusterCountSuggestion> {
    let max_k = max_k.min(eigenvalues.len().checked_sub(1)?);
    let mut best: Option<(usize, f64)> = None;
    for k in 2..=max_k {
        let gap = eigenvalues[k] - eigenvalues[k - 1];
        if best.map_or(true, |(_, g)| gap > g) {
            best = Some((k, gap));
        }
    }
    let (k, _) = best?;
    let (lo, hi) = (eigenvalues[k - 1], eigenvalues[k]);
    let confidence = if hi > 0.0 {
        (1.0 - lo / hi).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some(ClusterCountSuggestion {
        k,
        confidence,
        eigenvalues: eigenvalues.to_vec(),
    })
}

/// Eigen-gap estimate of the natural cluster count of `graph`.
pub fn suggest_cluster_count(
    graph: &Graph,
    max_k: usize,
    options: &EigenOptions,
) -> FoundryResult<ClusterCountSuggestion> {
    let n = graph.n();
    if max_k < 2 || max_k >= n {
        return Err(FoundryError::InvalidClusterCount { k: max_k, nodes: n });
    }
    let laplacian = graph.laplacian(LaplacianKind::SymmetricNormalized);
    let eigenvalues = match graph.trivial_eigenvector() {
        Some(t) => {
            let eig = smallest_eigenpairs_deflated(&laplacian, n, max_k, &[t], options)?;
            std::iter::once(0.0).chain(eig.values).collect()
        }
        None => {
            let eig = smallest_eigenpairs_deflated(&laplacian, n, max_k + 1, &[], options)?;
            eig.values
        }
    };
    eigengap_heuristic(&eigenvalues, max_k)
        .ok_or_else(|| FoundryError::InvalidClusterCount { k: max_k, nodes: n })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Axis {
    /// Axis of the largest-magnitude component; ties prefer Z, then Y.
    pub fn dominant(v: [f64; 3]) -> Self {
        let [x, y, z] = v.map(f64::abs);
        if z >= x && z >= y {
            if v[2] >= 0.0 {
                Self::PosZ
            } else {
                Self::NegZ
            }
        } else if y >= x {
            if v[1] >= 0.0 {
                Self::PosY
            } else {
                Self::NegY
            }
        } else if v[0] >= 0.0 {
            Self::PosX
        } else {
            Self::NegX
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workholding {
    /// Top-down access: plain vise.
    Vise,
    /// Second operation after flipping: soft jaws on finished faces.
    SoftJaws,
    /// Side access: angle plate or tombstone.
    AnglePlate,
    /// Faces in many directions: 4th-axis rotary fixture.
    Rotary,
}

impl Workholding {
    pub fn for_region(axis: Axis, mean_normal_length: f64) -> Self {
        if mean_normal_length < SPREAD_NORMAL_LENGTH {
            return Self::Rotary;
        }
        match axis {
            Axis::PosZ => Self::Vise,
            Axis::NegZ => Self::SoftJaws,
            _ => Self::AnglePlate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachiningSetup {
    /// 1-based, largest region first.
    pub rank: usize,
    pub cluster: usize,
    pub faces: Vec<usize>,
    /// Mean of the unit face normals (not renormalised).
    pub mean_normal: [f64; 3],
    pub axis: Axis,
    pub workholding: Workholding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionOptions {
    /// Fixed setup count; `None` asks the eigen-gap heuristic.
    pub setups: Option<usize>,
    /// Angular decay σ of the face weights.
    pub sigma: f64,
    pub cluster: ClusterOptions,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl DecompositionOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            setups: None,
            sigma: config.adjacency_sigma,
            cluster: ClusterOptions::from_config(config),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDecomposition {
    /// Setup rank (0-based) per face.
    pub face_setup: Vec<usize>,
    pub setups: Vec<MachiningSetup>,
    /// Present when the count came from the eigen-gap heuristic.
    pub suggestion: Option<ClusterCountSuggestion>,
    pub warnings: Vec<NumericalWarning>,
}

impl PartDecomposition {
    pub fn setup_count(&self) -> usize {
        self.setups.len()
    }
}

fn unit(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        v.map(|x| x / len)
    } else {
        v
    }
}

/// Split a part into machining setups from its face normals and
/// face-adjacency pairs.
pub fn decompose_part(
    normals: &[[f64; 3]],
    adjacency: &[(usize, usize)],
    options: &DecompositionOptions,
) -> FoundryResult<PartDecomposition> {
    let graph = Graph::from_face_normals(normals, adjacency, options.sigma)?;
    let n = graph.n();

    let (k, suggestion) = match options.setups {
        Some(k) => {
            check_cluster_count(k, n)?;
            (k, None)
        }
        None => {
            let max_k = MAX_SUGGESTED_CLUSTERS.min(n.saturating_sub(1));
            if max_k < 2 {
                (1, None)
            } else {
                let s = suggest_cluster_count(&graph, max_k, &options.cluster.eigen)?;
                (s.k, Some(s))
            }
        }
    };

    let (labels, warnings) = if k == 1 {
        (vec![0; n], Vec::new())
    } else {
        let assignment = spectral_cluster(&graph, k, &options.cluster)?;
        (assignment.labels, assignment.warnings)
    };

    let mut setups: Vec<MachiningSetup> = (0..k)
        .map(|cluster| {
            let faces: Vec<usize> = (0..n).filter(|&f| labels[f] == cluster).collect();
            let mut sum = [0.0; 3];
            for &f in &faces {
                let u = unit(normals[f]);
                for (s, x) in sum.iter_mut().zip(u) {
                    *s += x;
                }
            }
            let count = faces.len().max(1) as f64;
            let mean_normal = sum.map(|s| s / count);
            let length = mean_normal.iter().map(|x| x * x).sum::<f64>().sqrt();
            let axis = Axis::dominant(mean_normal);
            MachiningSetup {
                rank: 0,
                cluster,
                faces,
                mean_normal,
                axis,
                workholding: Workholding::for_region(axis, length),
            }
        })
        .filter(|s| !s.faces.is_empty())
        .collect();
    // Stable: equal sizes keep cluster order
    setups.sort_by(|a, b| b.faces.len().cmp(&a.faces.len()));

    let mut face_setup = vec![0; n];
    for (rank, setup) in setups.iter_mut().enumerate() {
        setup.rank = rank + 1;
        for &f in &setup.faces {
            face_setup[f] = rank;
        }
    }

    info!(
        "decomposed {n} faces into {} setups: {:?}",
        setups.len(),
        setups.iter().map(|s| (s.axis, s.faces.len())).collect::<Vec<_>>()
    );
    Ok(PartDecomposition {
        face_setup,
        setups,
        suggestion,
        warnings,
    })
}
