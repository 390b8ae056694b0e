// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Ordinary and Simple Kriging
// ─────────────────────────────────────────────────────────────────────
//! Best linear unbiased estimation from a variogram.
//!
//! Covariance is `C(h) = ceiling − γ(h)` with `ceiling` the total sill,
//! or `γ(max training lag)` for the unbounded power model.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig};

use crate::solver::solve_linear_system;
use crate::variogram::{distance, validate_points, VariogramFamily, VariogramModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrigingOptions {
    /// Family fitted by the grid entry points.
    pub family: VariogramFamily,
    pub variogram_bins: usize,
    pub pivot_tolerance: f64,
}

impl Default for KrigingOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl KrigingOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            family: VariogramFamily::Spherical,
            variogram_bins: config.variogram_bins,
            pivot_tolerance: config.pivot_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrigingEstimate {
    pub value: f64,
    /// Kriging variance, clamped at 0.
    pub variance: f64,
    pub weights: Vec<f64>,
    /// Lagrange multiplier of the unbiasedness constraint (Ordinary only).
    pub lagrange: Option<f64>,
    pub warnings: Vec<NumericalWarning>,
}

fn clamp_variance(raw: f64, scale: f64, warnings: &mut Vec<NumericalWarning>) -> f64 {
    if raw >= 0.0 {
        return raw;
    }
    if raw < -1e-9 * scale.max(1.0) {
        warnings.push(NumericalWarning::NegativeVariance { value: raw }.emit("foundry_kriging"));
    }
    0.0
}

/// Prepared Ordinary Kriging system over fixed training data.
///
/// The `(n+1)×(n+1)` matrix `[[C, 1], [1ᵀ, 0]]` is built once; each
/// [`OrdinaryKriging::estimate`] solves it for one query.
#[derive(Debug, Clone)]
pub struct OrdinaryKriging<'a> {
    locations: &'a [Vec<f64>],
    values: &'a [f64],
    model: VariogramModel,
    ceiling: f64,
    matrix: Vec<f64>,
    pivot_tolerance: f64,
}

/// `total sill`, or `γ(max pairwise lag)` for the power model.
fn covariance_ceiling(model: &VariogramModel, locations: &[Vec<f64>]) -> f64 {
    match model.total_sill() {
        Some(c) => c,
        None => {
            let mut max_lag: f64 = 0.0;
            for i in 0..locations.len() {
                for j in (i + 1)..locations.len() {
                    max_lag = max_lag.max(distance(&locations[i], &locations[j]));
                }
            }
            model.gamma(max_lag)
        }
    }
}

impl<'a> OrdinaryKriging<'a> {
    pub fn new(
        locations: &'a [Vec<f64>],
        values: &'a [f64],
        model: VariogramModel,
        options: &KrigingOptions,
    ) -> FoundryResult<Self> {
        validate_points(locations, values)?;
        model.validate()?;
        let ceiling = covariance_ceiling(&model, locations);
        let n = locations.len();
        let m = n + 1;
        let mut matrix = vec![0.0; m * m];
        for i in 0..n {
            for j in 0..n {
                matrix[i * m + j] = ceiling - model.gamma(distance(&locations[i], &locations[j]));
            }
            matrix[i * m + n] = 1.0;
            matrix[n * m + i] = 1.0;
        }
        Ok(Self {
            locations,
            values,
            model,
            ceiling,
            matrix,
            pivot_tolerance: options.pivot_tolerance,
        })
    }

    pub fn model(&self) -> &VariogramModel {
        &self.model
    }

    pub fn estimate(&self, query: &[f64]) -> FoundryResult<KrigingEstimate> {
        let dim = self.locations[0].len();
        if query.len() != dim {
            return Err(FoundryError::mismatch("query dimension", dim, query.len()));
        }
        let n = self.locations.len();
        let mut rhs: Vec<f64> = self
            .locations
            .iter()
            .map(|loc| self.ceiling - self.model.gamma(distance(loc, query)))
            .collect();
        rhs.push(1.0);

        let solution = solve_linear_system(&self.matrix, &rhs, self.pivot_tolerance)?;
        let mut warnings = solution.warnings;
        let weights = solution.x[..n].to_vec();
        let mu = solution.x[n];

        let value = weights.iter().zip(self.values).map(|(w, z)| w * z).sum();
        let explained: f64 = weights.iter().zip(&rhs).map(|(w, c)| w * c).sum();
        let variance = clamp_variance(self.ceiling - explained - mu, self.ceiling, &mut warnings);

        Ok(KrigingEstimate {
            value,
            variance,
            weights,
            lagrange: Some(mu),
            warnings,
        })
    }
}

/// Ordinary Kriging at one query point (unknown constant mean).
pub fn ordinary_kriging(
    locations: &[Vec<f64>],
    values: &[f64],
    model: &VariogramModel,
    query: &[f64],
    options: &KrigingOptions,
) -> FoundryResult<KrigingEstimate> {
    OrdinaryKriging::new(locations, values, *model, options)?.estimate(query)
}

/// Simple Kriging with a caller-supplied mean.
///
/// `value = m + Σ wᵢ(zᵢ − m)`, `variance = C(0) − Σ wᵢcᵢ`.
pub fn simple_kriging(
    locations: &[Vec<f64>],
    values: &[f64],
    model: &VariogramModel,
    mean: f64,
    query: &[f64],
    options: &KrigingOptions,
) -> FoundryResult<KrigingEstimate> {
    validate_points(locations, values)?;
    model.validate()?;
    let dim = locations[0].len();
    if query.len() != dim {
        return Err(FoundryError::mismatch("query dimension", dim, query.len()));
    }
    let ceiling = covariance_ceiling(model, locations);
    let n = locations.len();
    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            matrix[i * n + j] = ceiling - model.gamma(distance(&locations[i], &locations[j]));
        }
    }
    let rhs: Vec<f64> = locations
        .iter()
        .map(|loc| ceiling - model.gamma(distance(loc, query)))
        .collect();

    let solution = solve_linear_system(&matrix, &rhs, options.pivot_tolerance)?;
    let mut warnings = solution.warnings;
    let weights = solution.x;
    let value = mean
        + weights
            .iter()
            .zip(values)
            .map(|(w, z)| w * (z - mean))
            .sum::<f64>();
    let explained: f64 = weights.iter().zip(&rhs).map(|(w, c)| w * c).sum();
    let variance = clamp_variance(ceiling - explained, ceiling, &mut warnings);

    Ok(KrigingEstimate {
        value,
        variance,
        weights,
        lagrange: None,
        warnings,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    /// `estimate − observed` at each held-out sample.
    pub errors: Vec<f64>,
    pub variances: Vec<f64>,
    pub rmse: f64,
    pub warnings: Vec<NumericalWarning>,
}

/// Leave-one-out Ordinary Kriging residuals.
pub fn cross_validate(
    locations: &[Vec<f64>],
    values: &[f64],
    model: &VariogramModel,
    options: &KrigingOptions,
) -> FoundryResult<CrossValidation> {
    validate_points(locations, values)?;
    let n = locations.len();
    if n < 2 {
        return Err(FoundryError::Validation(
            "cross-validation needs at least two samples".into(),
        ));
    }
    let mut errors = Vec::with_capacity(n);
    let mut variances = Vec::with_capacity(n);
    let mut warnings = Vec::new();
    for i in 0..n {
        let locs: Vec<Vec<f64>> = locations
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, l)| l.clone())
            .collect();
        let vals: Vec<f64> = values
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &v)| v)
            .collect();
        let est = ordinary_kriging(&locs, &vals, model, &locations[i], options)?;
        errors.push(est.value - values[i]);
        variances.push(est.variance);
        warnings.extend(est.warnings);
    }
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();
    debug!("LOO cross-validation: n={n}, rmse={rmse:.6}");
    Ok(CrossValidation {
        errors,
        variances,
        rmse,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variogram::fit_variogram;

    fn line(xs: &[f64]) -> Vec<Vec<f64>> {
        xs.iter().map(|&x| vec![x]).collect()
    }

    fn three_point_model() -> VariogramModel {
        VariogramModel::Spherical {
            range: 2.0,
            sill: 2.0,
            nugget: 0.0,
        }
    }

    /// z = x sampled at 0, 1, 2 fits a spherical model (range 2, sill 2,
    /// nugget 0). At 1.5 the kriged estimate is 1.546875, between the
    /// neighbouring samples rather than on the line, with variance ≈ 0.78:
    /// a midpoint one lag away from both samples keeps a sizeable share of
    /// the total sill of 2.
    #[test]
    fn test_three_point_scenario() {
        let locs = line(&[0.0, 1.0, 2.0]);
        let z = [0.0, 1.0, 2.0];
        let opts = KrigingOptions::default();
        let model = fit_variogram(&locs, &z, opts.family, opts.variogram_bins)
            .unwrap()
            .model;
        assert_eq!(model, three_point_model());

        let est = ordinary_kriging(&locs, &z, &model, &[1.5], &opts).unwrap();
        assert!(est.value > 1.0 && est.value < 2.0, "estimate = {}", est.value);
        assert!((est.value - 1.546875).abs() < 1e-9, "estimate = {}", est.value);
        assert!(est.variance > 0.0 && est.variance < 1.0, "variance = {}", est.variance);
        let wsum: f64 = est.weights.iter().sum();
        assert!((wsum - 1.0).abs() < 1e-12);

        let at_sample = ordinary_kriging(&locs, &z, &model, &[1.0], &opts).unwrap();
        assert!((at_sample.value - 1.0).abs() < 1e-12);
        assert!(at_sample.variance < 1e-12);
    }

    #[test]
    fn test_exact_at_training_points_2d() {
        let locs = vec![
            vec![0.0, 0.0],
            vec![3.0, 0.5],
            vec![1.0, 2.5],
            vec![4.0, 4.0],
            vec![2.2, 1.1],
        ];
        let z = [1.0, 2.5, 0.7, 3.3, 1.9];
        let model = VariogramModel::Exponential {
            range: 4.0,
            sill: 1.2,
            nugget: 0.0,
        };
        let ok = OrdinaryKriging::new(&locs, &z, model, &KrigingOptions::default()).unwrap();
        for (loc, &v) in locs.iter().zip(&z) {
            let est = ok.estimate(loc).unwrap();
            assert!((est.value - v).abs() < 1e-9, "at {loc:?}: {} vs {v}", est.value);
            assert!(est.variance < 1e-9);
        }
        for q in [[0.5, 0.5], [10.0, -3.0], [2.0, 2.0]] {
            let est = ok.estimate(&q).unwrap();
            let wsum: f64 = est.weights.iter().sum();
            assert!((wsum - 1.0).abs() < 1e-10, "weights sum {wsum} at {q:?}");
        }
    }

    #[test]
    fn test_nugget_still_exact_at_sample() {
        let locs = line(&[0.0, 1.0, 3.0]);
        let z = [2.0, 4.0, 1.0];
        let model = VariogramModel::Gaussian {
            range: 2.0,
            sill: 1.0,
            nugget: 0.3,
        };
        let est = ordinary_kriging(&locs, &z, &model, &[1.0], &KrigingOptions::default()).unwrap();
        assert!((est.value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_simple_kriging_far_query_returns_mean() {
        let locs = line(&[0.0, 1.0]);
        let est = simple_kriging(
            &locs,
            &[5.0, 7.0],
            &three_point_model(),
            3.0,
            &[50.0],
            &KrigingOptions::default(),
        )
        .unwrap();
        assert!((est.value - 3.0).abs() < 1e-12);
        assert!((est.variance - 2.0).abs() < 1e-12);
        assert!(est.lagrange.is_none());
    }

    #[test]
    fn test_power_model_kriging() {
        let locs = line(&[0.0, 1.0, 2.0, 4.0]);
        let z = [0.0, 1.0, 1.5, 3.0];
        let model = VariogramModel::Power {
            slope: 1.0,
            exponent: 1.0,
            nugget: 0.0,
        };
        let est = ordinary_kriging(&locs, &z, &model, &[3.0], &KrigingOptions::default()).unwrap();
        assert!(est.value > 1.5 && est.value < 3.0, "estimate = {}", est.value);
        let wsum: f64 = est.weights.iter().sum();
        assert!((wsum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_duplicate_locations_warn_but_answer() {
        let locs = line(&[0.0, 0.0, 2.0]);
        let z = [1.0, 1.0, 3.0];
        let est =
            ordinary_kriging(&locs, &z, &three_point_model(), &[1.0], &KrigingOptions::default())
                .unwrap();
        assert!(est
            .warnings
            .iter()
            .any(|w| matches!(w, NumericalWarning::SingularPivot { .. })));
        let wsum: f64 = est.weights.iter().sum();
        assert!((wsum - 1.0).abs() < 1e-12, "weights sum {wsum}");

        // The duplicate row drops out: same answer as the deduplicated data
        for (locs, z, query) in [
            (line(&[0.0, 0.0, 2.0]), vec![1.0, 1.0, 3.0], 1.0),
            (line(&[0.0, 2.0, 2.0]), vec![1.0, 3.0, 3.0], 0.5),
            (line(&[2.0, 0.0, 0.0]), vec![3.0, 1.0, 1.0], 1.7),
        ] {
            let opts = KrigingOptions::default();
            let dup = ordinary_kriging(&locs, &z, &three_point_model(), &[query], &opts).unwrap();
            let dedup = ordinary_kriging(
                &line(&[0.0, 2.0]),
                &[1.0, 3.0],
                &three_point_model(),
                &[query],
                &opts,
            )
            .unwrap();
            assert!((dup.value - dedup.value).abs() < 1e-12, "{locs:?} at {query}");
            assert!((dup.variance - dedup.variance).abs() < 1e-12);
            assert!((dup.lagrange.unwrap() - dedup.lagrange.unwrap()).abs() < 1e-12);
            assert!((dup.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cross_validate_linear_trend() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let z: Vec<f64> = xs.iter().map(|x| 0.5 * x).collect();
        let model = VariogramModel::Linear {
            range: 10.0,
            sill: 1.0,
            nugget: 0.0,
        };
        let cv = cross_validate(&line(&xs), &z, &model, &KrigingOptions::default()).unwrap();
        assert_eq!(cv.errors.len(), 8);
        // interior points sit exactly on the line between neighbours
        for e in &cv.errors[1..7] {
            assert!(e.abs() < 1e-9, "interior LOO error {e}");
        }
        assert!(cv.rmse > 0.0);
    }

    #[test]
    fn test_input_errors() {
        let m = three_point_model();
        let o = KrigingOptions::default();
        assert!(ordinary_kriging(&[], &[], &m, &[0.0], &o).is_err());
        assert!(ordinary_kriging(&line(&[0.0]), &[1.0], &m, &[0.0, 1.0], &o).is_err());
        let bad = VariogramModel::Spherical {
            range: 0.0,
            sill: 1.0,
            nugget: 0.0,
        };
        assert!(ordinary_kriging(&line(&[0.0]), &[1.0], &bad, &[0.0], &o).is_err());
        assert!(cross_validate(&line(&[0.0]), &[1.0], &m, &o).is_err());
    }
}
