// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Spectral Graph Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Spectral graph analysis and part decomposition.
//!
//! Architecture:
//!   - Graph: dense weighted adjacency (binary, weighted, face-normal)
//!   - Laplacian: L, L_sym, L_rw derived on demand
//!   - eigen: deflated power iteration (default) or cyclic Jacobi
//!   - kmeans: k-means++ seeding + Lloyd
//!   - spectral_cluster: L_sym embedding → k-means
//!   - decompose_part: face clusters → ranked machining setups

pub mod clustering;
pub mod decomposition;
pub mod eigen;
pub mod graph;
pub mod kmeans;
pub mod laplacian;

pub use clustering::{spectral_cluster, ClusterAssignment, ClusterOptions};
pub use decomposition::{
    decompose_part, eigengap_heuristic, suggest_cluster_count, Axis, ClusterCountSuggestion,
    DecompositionOptions, MachiningSetup, PartDecomposition, Workholding,
};
pub use eigen::{
    fiedler_value, smallest_eigenpairs, smallest_eigenpairs_deflated, spectral_gap,
    EigenDecomposition, EigenOptions, EigenSolver,
};
pub use graph::Graph;
pub use kmeans::{kmeans, KMeansOptions, KMeansResult};
pub use laplacian::LaplacianKind;
