// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — GP Training and Prediction
// ─────────────────────────────────────────────────────────────────────
//! `train` builds an immutable [`GpModel`]; prediction never mutates it.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig};

use crate::cholesky::Cholesky;
use crate::kernel::Kernel;

/// Two-sided 95% standard-normal quantile.
pub const Z_95: f64 = 1.959963984540054;
/// Two-sided 99% standard-normal quantile.
pub const Z_99: f64 = 2.5758293035489;

const LN_2PI: f64 = 1.8378770664093453;

/// Validated borrowed view over caller-owned training data.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSet<'a> {
    inputs: &'a [Vec<f64>],
    outputs: &'a [f64],
    dim: usize,
}

impl<'a> TrainingSet<'a> {
    /// Non-empty, equal lengths, one dimensionality, finite values.
    pub fn new(inputs: &'a [Vec<f64>], outputs: &'a [f64]) -> FoundryResult<Self> {
        if inputs.is_empty() {
            return Err(FoundryError::EmptyInput("training inputs".into()));
        }
        if inputs.len() != outputs.len() {
            return Err(FoundryError::mismatch(
                "training outputs",
                inputs.len(),
                outputs.len(),
            ));
        }
        let dim = inputs[0].len();
        if dim == 0 {
            return Err(FoundryError::EmptyInput("input vectors have no features".into()));
        }
        for x in inputs {
            if x.len() != dim {
                return Err(FoundryError::mismatch("training input dimension", dim, x.len()));
            }
            if x.iter().any(|v| !v.is_finite()) {
                return Err(FoundryError::Validation("non-finite training input".into()));
            }
        }
        if outputs.iter().any(|v| !v.is_finite()) {
            return Err(FoundryError::Validation("non-finite training output".into()));
        }
        Ok(Self {
            inputs,
            outputs,
            dim,
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn inputs(&self) -> &'a [Vec<f64>] {
        self.inputs
    }

    pub fn outputs(&self) -> &'a [f64] {
        self.outputs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Added to the kernel diagonal. Zero gives exact interpolation.
    pub noise_variance: f64,
    pub cholesky_floor: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl TrainOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            noise_variance: config.gp_noise_variance,
            cholesky_floor: config.cholesky_floor,
        }
    }

    pub fn with_noise(noise_variance: f64) -> Self {
        Self {
            noise_variance,
            ..Self::default()
        }
    }

    fn validate(&self) -> FoundryResult<()> {
        if !(self.noise_variance >= 0.0 && self.noise_variance.is_finite()) {
            return Err(FoundryError::Validation(format!(
                "noise_variance must be finite and >= 0, got {}",
                self.noise_variance
            )));
        }
        if !(self.cholesky_floor > 0.0 && self.cholesky_floor.is_finite()) {
            return Err(FoundryError::Validation(format!(
                "cholesky_floor must be finite and > 0, got {}",
                self.cholesky_floor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    fn around(mean: f64, std_dev: f64, z: f64) -> Self {
        Self {
            lower: mean - z * std_dev,
            upper: mean + z * std_dev,
        }
    }

    pub fn contains(&self, y: f64) -> bool {
        self.lower <= y && y <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpPrediction {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub ci95: ConfidenceInterval,
    pub ci99: ConfidenceInterval,
}

impl GpPrediction {
    fn new(mean: f64, variance: f64) -> Self {
        let variance = if variance < 0.0 {
            debug!("predictive variance {variance:.3e} clamped to 0");
            0.0
        } else {
            variance
        };
        let std_dev = variance.sqrt();
        Self {
            mean,
            variance,
            std_dev,
            ci95: ConfidenceInterval::around(mean, std_dev, Z_95),
            ci99: ConfidenceInterval::around(mean, std_dev, Z_99),
        }
    }
}

/// Trained Gaussian Process. Created only by [`train`].
#[derive(Debug, Clone, Serialize)]
pub struct GpModel {
    inputs: Vec<Vec<f64>>,
    kernel: Kernel,
    noise_variance: f64,
    cholesky: Cholesky,
    alpha: Vec<f64>,
    log_marginal_likelihood: f64,
    warnings: Vec<NumericalWarning>,
}

/// Fit a GP to `(inputs, outputs)`.
///
/// `K = k(X, X) + σₙ²I` is Cholesky-factored with a pivot floor,
/// `α = K⁻¹y`, and the log marginal likelihood is
/// `−½yᵀα − ½log|K| − (n/2)·log 2π`.
pub fn train(
    inputs: &[Vec<f64>],
    outputs: &[f64],
    kernel: Kernel,
    options: &TrainOptions,
) -> FoundryResult<GpModel> {
    let set = TrainingSet::new(inputs, outputs)?;
    train_set(&set, kernel, options)
}

/// [`train`] on an already validated set.
pub fn train_set(
    set: &TrainingSet<'_>,
    kernel: Kernel,
    options: &TrainOptions,
) -> FoundryResult<GpModel> {
    kernel.validate()?;
    options.validate()?;

    let n = set.len();
    let mut k = kernel.gram(set.inputs());
    for i in 0..n {
        k[i * n + i] += options.noise_variance;
    }

    let cholesky = Cholesky::factor(&k, n, options.cholesky_floor);
    let y = set.outputs();
    let alpha = cholesky.solve(y);

    let data_fit: f64 = y.iter().zip(&alpha).map(|(a, b)| a * b).sum();
    let log_marginal_likelihood =
        -0.5 * data_fit - 0.5 * cholesky.log_det() - 0.5 * n as f64 * LN_2PI;

    info!(
        "GP trained: n={n}, dim={}, lml={log_marginal_likelihood:.4}, warnings={}",
        set.dim(),
        cholesky.warnings().len()
    );

    Ok(GpModel {
        inputs: set.inputs().to_vec(),
        kernel,
        noise_variance: options.noise_variance,
        warnings: cholesky.warnings().to_vec(),
        cholesky,
        alpha,
        log_marginal_likelihood,
    })
}

/// Train every candidate kernel and keep the one with the highest log
/// marginal likelihood.
pub fn select_kernel(
    inputs: &[Vec<f64>],
    outputs: &[f64],
    candidates: &[Kernel],
    options: &TrainOptions,
) -> FoundryResult<GpModel> {
    let set = TrainingSet::new(inputs, outputs)?;
    let mut best: Option<GpModel> = None;
    for &kernel in candidates {
        let model = train_set(&set, kernel, options)?;
        debug!(
            "kernel {kernel:?}: lml = {:.4}",
            model.log_marginal_likelihood
        );
        let better = match &best {
            None => true,
            Some(b) => model.log_marginal_likelihood > b.log_marginal_likelihood,
        };
        if better {
            best = Some(model);
        }
    }
    best.ok_or_else(|| FoundryError::EmptyInput("kernel candidates".into()))
}

impl GpModel {
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    pub fn log_marginal_likelihood(&self) -> f64 {
        self.log_marginal_likelihood
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn cholesky(&self) -> &Cholesky {
        &self.cholesky
    }

    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    pub fn n_train(&self) -> usize {
        self.inputs.len()
    }

    pub fn input_dim(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    /// Latent-function prediction at one query point.
    pub fn predict_one(&self, x: &[f64]) -> FoundryResult<GpPrediction> {
        if x.len() != self.input_dim() {
            return Err(FoundryError::mismatch(
                "query dimension",
                self.input_dim(),
                x.len(),
            ));
        }
        let k_star: Vec<f64> = self.inputs.iter().map(|xi| self.kernel.eval(xi, x)).collect();
        let mean: f64 = k_star.iter().zip(&self.alpha).map(|(a, b)| a * b).sum();
        let v = self.cholesky.solve_lower(&k_star);
        let explained: f64 = v.iter().map(|x| x * x).sum();
        let variance = self.kernel.eval(x, x) - explained;
        Ok(GpPrediction::new(mean, variance))
    }

    /// Mean, variance and 95%/99% intervals of the latent function.
    pub fn predict(&self, queries: &[Vec<f64>]) -> FoundryResult<Vec<GpPrediction>> {
        queries.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Predictive distribution of a fresh noisy observation at `x`.
    pub fn predict_observed(&self, x: &[f64]) -> FoundryResult<GpPrediction> {
        let latent = self.predict_one(x)?;
        Ok(GpPrediction::new(
            latent.mean,
            latent.variance + self.noise_variance,
        ))
    }
}
