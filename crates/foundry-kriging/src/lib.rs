// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Kriging Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Kriging spatial interpolation.
//!
//! Architecture:
//!   - variogram: model catalogue, empirical bins, fit with fallback
//!   - solver: Gaussian elimination with partial pivoting
//!   - kriging: Ordinary / Simple Kriging, leave-one-out validation
//!   - grid: global fit + per-node Ordinary Kriging → SurfaceGrid

pub mod grid;
pub mod kriging;
pub mod solver;
pub mod variogram;

pub use grid::{interpolate_grid, reconstruct_surface, GridSpec, ProbeSample, SurfaceGrid};
pub use kriging::{
    cross_validate, ordinary_kriging, simple_kriging, CrossValidation, KrigingEstimate,
    KrigingOptions, OrdinaryKriging,
};
pub use solver::{solve_linear_system, LinearSolution};
pub use variogram::{
    empirical_variogram, fit_variogram, EmpiricalBin, EmpiricalVariogram, VariogramFamily,
    VariogramFit, VariogramModel,
};
