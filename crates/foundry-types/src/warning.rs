// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Numerical Warnings
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numerical instability that was recovered locally.
///
/// Results carry these so callers can lower their trust in the value
/// without the engine refusing to answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericalWarning {
    /// A Cholesky pivot was non-positive and replaced by the floor.
    ClampedPivot { index: usize, value: f64, floor: f64 },
    /// Gaussian elimination met a near-zero pivot; the unknown was left at 0.
    SingularPivot { index: usize },
    /// The empirical variogram had too few populated bins to fit.
    VariogramFallback { populated_bins: usize },
    /// An eigenpair did not converge within the iteration cap.
    EigenNotConverged { index: usize, iterations: usize },
    /// A k-means cluster ended up with no members.
    EmptyCluster { cluster: usize },
    /// A negative variance was clamped to zero.
    NegativeVariance { value: f64 },
}

impl NumericalWarning {
    /// Log this warning under `target` and hand it back for collection.
    pub fn emit(self, target: &str) -> Self {
        log::warn!(target: target, "{self}");
        self
    }
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClampedPivot {
                index,
                value,
                floor,
            } => write!(f, "cholesky pivot {index} = {value:.3e} clamped to {floor:.1e}"),
            Self::SingularPivot { index } => {
                write!(f, "near-singular pivot at unknown {index}; left at 0")
            }
            Self::VariogramFallback { populated_bins } => write!(
                f,
                "variogram fit fell back to defaults ({populated_bins} populated bins)"
            ),
            Self::EigenNotConverged { index, iterations } => write!(
                f,
                "eigenpair {index} not converged after {iterations} iterations"
            ),
            Self::EmptyCluster { cluster } => write!(f, "cluster {cluster} is empty"),
            Self::NegativeVariance { value } => {
                write!(f, "variance {value:.3e} clamped to 0")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let w = NumericalWarning::SingularPivot { index: 3 };
        assert!(w.to_string().contains("unknown 3"));
    }

    #[test]
    fn test_serde_tagged() {
        let w = NumericalWarning::EmptyCluster { cluster: 1 };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"kind":"empty_cluster","cluster":1}"#);
        let back: NumericalWarning = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
