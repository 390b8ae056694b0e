// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for caller misuse of the numerical engines.
///
/// Numerically degenerate input is never an error; see
/// [`crate::NumericalWarning`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FoundryError {
    /// Two inputs that must agree in length or dimension do not.
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// A dataset, point list or graph that must be non-empty is empty.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Requested cluster count is zero or not below the node count.
    #[error("invalid cluster count: k = {k} for a graph with {nodes} nodes")]
    InvalidClusterCount { k: usize, nodes: usize },

    /// Invalid parameter or value (hyperparameter, weight, index, grid).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

pub type FoundryResult<T> = Result<T, FoundryError>;

impl FoundryError {
    /// Shorthand for a [`FoundryError::DimensionMismatch`].
    pub fn mismatch(context: &'static str, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = FoundryError::mismatch("dot", 3, 2);
        assert_eq!(
            err.to_string(),
            "dimension mismatch in dot: expected 3, got 2"
        );
    }

    #[test]
    fn test_cluster_count_message() {
        let err = FoundryError::InvalidClusterCount { k: 6, nodes: 6 };
        assert!(err.to_string().contains("k = 6"));
    }
}
