// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — GP Kernel Catalogue
// ─────────────────────────────────────────────────────────────────────
//! Covariance functions `k(a, b)`.
//!
//! All stationary kernels depend on `r = ‖a − b‖` only; `Linear` is the
//! one dot-product kernel.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    /// `σ²·exp(−r²/2ℓ²)`
    Rbf { variance: f64, length_scale: f64 },
    /// `σ²(1 + √3r/ℓ)·exp(−√3r/ℓ)`
    Matern32 { variance: f64, length_scale: f64 },
    /// `σ²(1 + √5r/ℓ + 5r²/3ℓ²)·exp(−√5r/ℓ)`
    Matern52 { variance: f64, length_scale: f64 },
    /// `σ²(1 + r²/2αℓ²)^(−α)`
    RationalQuadratic {
        variance: f64,
        length_scale: f64,
        alpha: f64,
    },
    /// `σ²·exp(−2 sin²(πr/p)/ℓ²)`
    Periodic {
        variance: f64,
        length_scale: f64,
        period: f64,
    },
    /// `c + σ²·(a·b)`
    Linear { variance: f64, bias: f64 },
}

fn positive(name: &str, v: f64) -> FoundryResult<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(FoundryError::Validation(format!(
            "kernel {name} must be finite and > 0, got {v}"
        )))
    }
}

impl Kernel {
    pub fn rbf(variance: f64, length_scale: f64) -> Self {
        Self::Rbf {
            variance,
            length_scale,
        }
    }

    pub fn matern52(variance: f64, length_scale: f64) -> Self {
        Self::Matern52 {
            variance,
            length_scale,
        }
    }

    /// Reject non-positive or non-finite hyperparameters.
    pub fn validate(&self) -> FoundryResult<()> {
        match *self {
            Self::Rbf {
                variance,
                length_scale,
            }
            | Self::Matern32 {
                variance,
                length_scale,
            }
            | Self::Matern52 {
                variance,
                length_scale,
            } => {
                positive("variance", variance)?;
                positive("length_scale", length_scale)
            }
            Self::RationalQuadratic {
                variance,
                length_scale,
                alpha,
            } => {
                positive("variance", variance)?;
                positive("length_scale", length_scale)?;
                positive("alpha", alpha)
            }
            Self::Periodic {
                variance,
                length_scale,
                period,
            } => {
                positive("variance", variance)?;
                positive("length_scale", length_scale)?;
                positive("period", period)
            }
            Self::Linear { variance, bias } => {
                positive("variance", variance)?;
                if bias >= 0.0 && bias.is_finite() {
                    Ok(())
                } else {
                    Err(FoundryError::Validation(format!(
                        "kernel bias must be finite and >= 0, got {bias}"
                    )))
                }
            }
        }
    }

    /// Covariance between two inputs of equal dimension.
    pub fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            Self::Linear { variance, bias } => {
                bias + variance * a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>()
            }
            _ => self.eval_distance(euclidean(a, b)),
        }
    }

    /// Stationary kernel value at distance `r`. `Linear` has no such form
    /// and returns its bias.
    pub fn eval_distance(&self, r: f64) -> f64 {
        match *self {
            Self::Rbf {
                variance,
                length_scale,
            } => variance * (-0.5 * (r / length_scale).powi(2)).exp(),
            Self::Matern32 {
                variance,
                length_scale,
            } => {
                let s = 3f64.sqrt() * r / length_scale;
                variance * (1.0 + s) * (-s).exp()
            }
            Self::Matern52 {
                variance,
                length_scale,
            } => {
                let s = 5f64.sqrt() * r / length_scale;
                variance * (1.0 + s + s * s / 3.0) * (-s).exp()
            }
            Self::RationalQuadratic {
                variance,
                length_scale,
                alpha,
            } => {
                variance * (1.0 + r * r / (2.0 * alpha * length_scale * length_scale)).powf(-alpha)
            }
            Self::Periodic {
                variance,
                length_scale,
                period,
            } => {
                let s = (PI * r / period).sin();
                variance * (-2.0 * s * s / (length_scale * length_scale)).exp()
            }
            Self::Linear { bias, .. } => bias,
        }
    }

    /// Dense `n × n` row-major Gram matrix.
    pub fn gram(&self, xs: &[Vec<f64>]) -> Vec<f64> {
        let n = xs.len();
        let mut k = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let v = self.eval(&xs[i], &xs[j]);
                k[i * n + j] = v;
                k[j * n + i] = v;
            }
        }
        k
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Kernel; 6] = [
        Kernel::Rbf {
            variance: 2.0,
            length_scale: 1.0,
        },
        Kernel::Matern32 {
            variance: 2.0,
            length_scale: 1.0,
        },
        Kernel::Matern52 {
            variance: 2.0,
            length_scale: 1.0,
        },
        Kernel::RationalQuadratic {
            variance: 2.0,
            length_scale: 1.0,
            alpha: 1.5,
        },
        Kernel::Periodic {
            variance: 2.0,
            length_scale: 1.0,
            period: 3.0,
        },
        Kernel::Linear {
            variance: 2.0,
            bias: 0.5,
        },
    ];

    #[test]
    fn test_stationary_kernels_peak_at_zero() {
        for k in &ALL[..5] {
            assert!((k.eval(&[1.0, 2.0], &[1.0, 2.0]) - 2.0).abs() < 1e-12, "{k:?}");
            assert!(k.eval(&[0.0], &[0.7]) < 2.0, "{k:?}");
        }
    }

    #[test]
    fn test_symmetric() {
        for k in &ALL {
            let a = [0.3, -1.2];
            let b = [1.1, 0.4];
            assert!((k.eval(&a, &b) - k.eval(&b, &a)).abs() < 1e-15, "{k:?}");
        }
    }

    #[test]
    fn test_rbf_known_value() {
        let k = Kernel::rbf(1.0, 2.0);
        let expected = (-0.5f64 * 0.25).exp();
        assert!((k.eval(&[0.0], &[1.0]) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_periodic_repeats() {
        let k = ALL[4];
        assert!((k.eval(&[0.0], &[3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_dot_product() {
        let k = ALL[5];
        assert!((k.eval(&[1.0, 2.0], &[3.0, 4.0]) - (0.5 + 2.0 * 11.0)).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_hyperparameters() {
        assert!(Kernel::rbf(0.0, 1.0).validate().is_err());
        assert!(Kernel::matern52(1.0, -1.0).validate().is_err());
        assert!(Kernel::Linear {
            variance: 1.0,
            bias: -0.1
        }
        .validate()
        .is_err());
        for k in &ALL {
            assert!(k.validate().is_ok());
        }
    }

    #[test]
    fn test_gram_symmetric() {
        let xs = vec![vec![0.0], vec![0.5], vec![2.0]];
        let g = Kernel::matern52(1.0, 1.0).gram(&xs);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(g[i * 3 + j], g[j * 3 + i]);
            }
        }
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&Kernel::rbf(1.0, 0.5)).unwrap();
        assert_eq!(json, r#"{"type":"rbf","variance":1.0,"length_scale":0.5}"#);
    }
}
