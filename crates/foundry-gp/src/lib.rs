// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Gaussian Process Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Gaussian Process regression.
//!
//! Architecture:
//!   - Kernel: closed covariance catalogue (RBF, Matérn, RQ, periodic, linear)
//!   - Cholesky: dense factorisation with pivot floor + triangular solves
//!   - train / GpModel: α, log marginal likelihood, mean/variance prediction
//!   - FeaturePredictor: z-scored features + reliability flag

pub mod cholesky;
pub mod kernel;
pub mod model;
pub mod predictor;

pub use cholesky::Cholesky;
pub use kernel::Kernel;
pub use model::{
    select_kernel, train, ConfidenceInterval, GpModel, GpPrediction, TrainOptions, TrainingSet,
};
pub use predictor::{
    FeaturePredictor, FeatureScaler, KernelFamily, PredictorOptions, ReliablePrediction,
};
