// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Runtime Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{FoundryError, FoundryResult};

/// Tolerances and defaults shared by the numerical engines.
///
/// Every engine also accepts these values as explicit parameters; this
/// struct only collects them so a caller can load one JSON document and
/// derive each engine's options from it (`…Options::from_config`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericsConfig {
    /// Value substituted for a non-positive Cholesky pivot.
    /// Default: 1e-10.
    pub cholesky_floor: f64,

    /// Observation noise variance added to the GP kernel diagonal.
    /// Default: 1e-6.
    pub gp_noise_variance: f64,

    /// A prediction is reliable iff std-dev < ratio · |mean|.
    /// Default: 0.2.
    pub reliability_ratio: f64,

    /// Pivots smaller than this are skipped by Gaussian elimination.
    /// Default: 1e-12.
    pub pivot_tolerance: f64,

    /// Number of equal-width lag bins in the empirical variogram.
    /// Default: 10.
    pub variogram_bins: usize,

    /// Angular decay σ of normal-weighted adjacency, exp(-angle/σ).
    /// Default: 0.5.
    pub adjacency_sigma: f64,

    /// Power-iteration cap per eigenpair.
    /// Default: 1000.
    pub eigen_max_iterations: usize,

    /// Eigenvector convergence tolerance.
    /// Default: 1e-10.
    pub eigen_tolerance: f64,

    /// Lloyd iteration cap for k-means.
    /// Default: 100.
    pub kmeans_max_iterations: usize,

    /// Seed for k-means++ and power-iteration start vectors.
    /// Default: 42.
    pub seed: u64,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            cholesky_floor: 1e-10,
            gp_noise_variance: 1e-6,
            reliability_ratio: 0.2,
            pivot_tolerance: 1e-12,
            variogram_bins: 10,
            adjacency_sigma: 0.5,
            eigen_max_iterations: 1000,
            eigen_tolerance: 1e-10,
            kmeans_max_iterations: 100,
            seed: 42,
        }
    }
}

impl NumericsConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> FoundryResult<()> {
        if !(self.cholesky_floor > 0.0 && self.cholesky_floor.is_finite()) {
            return Err(FoundryError::Config(format!(
                "cholesky_floor must be finite and > 0, got {}",
                self.cholesky_floor
            )));
        }
        if !(self.gp_noise_variance >= 0.0 && self.gp_noise_variance.is_finite()) {
            return Err(FoundryError::Config(format!(
                "gp_noise_variance must be finite and >= 0, got {}",
                self.gp_noise_variance
            )));
        }
        if !(self.reliability_ratio > 0.0 && self.reliability_ratio.is_finite()) {
            return Err(FoundryError::Config(format!(
                "reliability_ratio must be finite and > 0, got {}",
                self.reliability_ratio
            )));
        }
        if !(self.pivot_tolerance >= 0.0 && self.pivot_tolerance.is_finite()) {
            return Err(FoundryError::Config(format!(
                "pivot_tolerance must be finite and >= 0, got {}",
                self.pivot_tolerance
            )));
        }
        if self.variogram_bins < 2 {
            return Err(FoundryError::Config(format!(
                "variogram_bins must be >= 2, got {}",
                self.variogram_bins
            )));
        }
        if !(self.adjacency_sigma > 0.0 && self.adjacency_sigma.is_finite()) {
            return Err(FoundryError::Config(format!(
                "adjacency_sigma must be finite and > 0, got {}",
                self.adjacency_sigma
            )));
        }
        if self.eigen_max_iterations == 0 {
            return Err(FoundryError::Config(
                "eigen_max_iterations must be > 0".to_string(),
            ));
        }
        if !(self.eigen_tolerance > 0.0 && self.eigen_tolerance.is_finite()) {
            return Err(FoundryError::Config(format!(
                "eigen_tolerance must be finite and > 0, got {}",
                self.eigen_tolerance
            )));
        }
        if self.kmeans_max_iterations == 0 {
            return Err(FoundryError::Config(
                "kmeans_max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> FoundryResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FoundryError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise to a JSON string.
    pub fn to_json(&self) -> FoundryResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FoundryError::Config(format!("JSON encode error: {e}")))
    }
}
