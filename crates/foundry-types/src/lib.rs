// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Shared Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Error hierarchy, runtime configuration, numerical diagnostics and the
//! deterministic RNG shared by the four numerical engines
//! (interval, GP, Kriging, spectral).
//!
//! # Failure taxonomy
//!
//! 1. **Domain errors** (sqrt of a negative interval, division by `[0,0]`)
//!    never surface here: the engines return NaN-sentinel values.
//! 2. **Numerical instability** (non-positive Cholesky pivot, singular
//!    elimination pivot, non-converged eigenpair) is recovered locally and
//!    reported as a [`NumericalWarning`] attached to the result.
//! 3. **Input errors** (dimension mismatch, empty data, invalid cluster
//!    count) propagate as [`FoundryError`].

pub mod config;
pub mod error;
pub mod rng;
pub mod warning;

pub use config::NumericsConfig;
pub use error::{FoundryError, FoundryResult};
pub use rng::SimpleRng;
pub use warning::NumericalWarning;
