// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Feature-Scaled Predictor
// ─────────────────────────────────────────────────────────────────────
//! GP on z-scored features and centred outputs, with a per-prediction
//! reliability flag.
//!
//! A prediction is *reliable* iff `std_dev < ratio · |mean|` (ratio 0.2
//! by default). It is *numerically stable* iff training raised no
//! warnings. Both flags travel with every prediction.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericsConfig};

use crate::kernel::Kernel;
use crate::model::{
    train_set, ConfidenceInterval, GpModel, GpPrediction, TrainOptions, TrainingSet,
};

/// Per-feature z-score transform. Zero-variance features get std 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl FeatureScaler {
    pub fn fit(inputs: &[Vec<f64>]) -> FoundryResult<Self> {
        let first = inputs
            .first()
            .ok_or_else(|| FoundryError::EmptyInput("feature rows".into()))?;
        let dim = first.len();
        let n = inputs.len() as f64;
        let mut means = vec![0.0; dim];
        for x in inputs {
            if x.len() != dim {
                return Err(FoundryError::mismatch("feature dimension", dim, x.len()));
            }
            for (m, v) in means.iter_mut().zip(x) {
                *m += v / n;
            }
        }
        let mut stds = vec![0.0; dim];
        for x in inputs {
            for ((s, v), m) in stds.iter_mut().zip(x).zip(&means) {
                *s += (v - m) * (v - m) / n;
            }
        }
        for s in &mut stds {
            *s = s.sqrt();
            if !(*s > 0.0) {
                *s = 1.0;
            }
        }
        Ok(Self { means, stds })
    }

    pub fn dim(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn transform(&self, x: &[f64]) -> FoundryResult<Vec<f64>> {
        if x.len() != self.dim() {
            return Err(FoundryError::mismatch("feature dimension", self.dim(), x.len()));
        }
        Ok(x.iter()
            .zip(&self.means)
            .zip(&self.stds)
            .map(|((v, m), s)| (v - m) / s)
            .collect())
    }

    pub fn transform_all(&self, xs: &[Vec<f64>]) -> FoundryResult<Vec<Vec<f64>>> {
        xs.iter().map(|x| self.transform(x)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFamily {
    Matern52,
    Rbf,
}

impl KernelFamily {
    pub fn kernel(self, variance: f64, length_scale: f64) -> Kernel {
        match self {
            Self::Matern52 => Kernel::matern52(variance, length_scale),
            Self::Rbf => Kernel::rbf(variance, length_scale),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorOptions {
    pub family: KernelFamily,
    /// Length scale in z-score units.
    pub length_scale: f64,
    /// Signal variance; `None` uses the output variance.
    pub signal_variance: Option<f64>,
    pub train: TrainOptions,
    pub reliability_ratio: f64,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl PredictorOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            family: KernelFamily::Matern52,
            length_scale: 1.0,
            signal_variance: None,
            train: TrainOptions::from_config(config),
            reliability_ratio: config.reliability_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliablePrediction {
    /// In the caller's output units.
    pub prediction: GpPrediction,
    pub reliable: bool,
    pub numerically_stable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturePredictor {
    scaler: FeatureScaler,
    y_mean: f64,
    model: GpModel,
    reliability_ratio: f64,
}

impl FeaturePredictor {
    /// Fit on historical `(feature vector, outcome)` pairs.
    pub fn fit(
        inputs: &[Vec<f64>],
        outputs: &[f64],
        options: &PredictorOptions,
    ) -> FoundryResult<Self> {
        let raw = TrainingSet::new(inputs, outputs)?;
        if !(options.reliability_ratio > 0.0) {
            return Err(FoundryError::Validation(format!(
                "reliability_ratio must be > 0, got {}",
                options.reliability_ratio
            )));
        }
        let scaler = FeatureScaler::fit(raw.inputs())?;
        let scaled = scaler.transform_all(raw.inputs())?;

        let n = outputs.len() as f64;
        let y_mean = outputs.iter().sum::<f64>() / n;
        let centred: Vec<f64> = outputs.iter().map(|y| y - y_mean).collect();
        let y_var = centred.iter().map(|y| y * y).sum::<f64>() / n;
        let variance = options
            .signal_variance
            .unwrap_or(if y_var > 0.0 { y_var } else { 1.0 });

        let kernel = options.family.kernel(variance, options.length_scale);
        let set = TrainingSet::new(&scaled, &centred)?;
        let model = train_set(&set, kernel, &options.train)?;
        debug!(
            "feature predictor: family={:?}, y_mean={y_mean:.4}, signal_variance={variance:.4}",
            options.family
        );

        Ok(Self {
            scaler,
            y_mean,
            model,
            reliability_ratio: options.reliability_ratio,
        })
    }

    pub fn model(&self) -> &GpModel {
        &self.model
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn predict(&self, x: &[f64]) -> FoundryResult<ReliablePrediction> {
        let z = self.scaler.transform(x)?;
        let p = self.model.predict_one(&z)?;
        let shift = |ci: ConfidenceInterval| ConfidenceInterval {
            lower: ci.lower + self.y_mean,
            upper: ci.upper + self.y_mean,
        };
        let prediction = GpPrediction {
            mean: p.mean + self.y_mean,
            ci95: shift(p.ci95),
            ci99: shift(p.ci99),
            ..p
        };
        Ok(ReliablePrediction {
            reliable: prediction.std_dev < self.reliability_ratio * prediction.mean.abs(),
            numerically_stable: self.model.warnings().is_empty(),
            prediction,
        })
    }

    pub fn predict_many(&self, xs: &[Vec<f64>]) -> FoundryResult<Vec<ReliablePrediction>> {
        xs.iter().map(|x| self.predict(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_zscores() {
        let xs = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let s = FeatureScaler::fit(&xs).unwrap();
        assert_eq!(s.means(), &[2.0, 5.0]);
        assert_eq!(s.stds(), &[1.0, 1.0]);
        assert_eq!(s.transform(&[3.0, 7.0]).unwrap(), vec![1.0, 2.0]);
        assert!(s.transform(&[1.0]).is_err());
    }

    fn tool_wear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // (cutting speed m/min, feed mm/rev) → tool life in minutes
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..6 {
            for j in 0..4 {
                let v = 100.0 + 40.0 * i as f64;
                let f = 0.1 + 0.05 * j as f64;
                xs.push(vec![v, f]);
                ys.push(60.0 * (200.0 / v).powf(2.5) * (0.2 / f).powf(0.5));
            }
        }
        (xs, ys)
    }

    #[test]
    fn test_reliable_inside_data() {
        let (xs, ys) = tool_wear_data();
        let opts = PredictorOptions {
            length_scale: 2.0,
            ..Default::default()
        };
        let p = FeaturePredictor::fit(&xs, &ys, &opts).unwrap();
        let r = p.predict(&[180.0, 0.175]).unwrap();
        let truth = 60.0 * (200.0f64 / 180.0).powf(2.5) * (0.2f64 / 0.175).powf(0.5);
        assert!(
            (r.prediction.mean - truth).abs() < 0.1 * truth,
            "{} vs {truth}",
            r.prediction.mean
        );
        assert!(r.reliable);
        assert!(r.numerically_stable);
    }

    #[test]
    fn test_unreliable_far_from_data() {
        let (xs, ys) = tool_wear_data();
        let opts = PredictorOptions {
            family: KernelFamily::Rbf,
            ..Default::default()
        };
        let p = FeaturePredictor::fit(&xs, &ys, &opts).unwrap();
        let r = p.predict(&[2000.0, 3.0]).unwrap();
        assert!(!r.reliable);
        assert!(r.prediction.ci95.contains(r.prediction.mean));
    }

    #[test]
    fn test_constant_outputs() {
        let xs = vec![vec![0.0], vec![1.0], vec![2.0]];
        let p = FeaturePredictor::fit(&xs, &[4.0, 4.0, 4.0], &PredictorOptions::default()).unwrap();
        let r = p.predict(&[1.5]).unwrap();
        assert!((r.prediction.mean - 4.0).abs() < 1e-6);
    }
}
