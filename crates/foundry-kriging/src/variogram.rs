// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Variogram Models and Fitting
// ─────────────────────────────────────────────────────────────────────
//! Semivariance models `γ(h)` and their fit to an empirical variogram.
//!
//! `sill` is the partial sill `c`; the total sill is `c + nugget`.
//! Every model has `γ(0) = 0`; the nugget applies for `h > 0`.
//! Exponential and Gaussian use the practical range (95% of sill at `a`).

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum VariogramModel {
    Spherical { range: f64, sill: f64, nugget: f64 },
    Exponential { range: f64, sill: f64, nugget: f64 },
    Gaussian { range: f64, sill: f64, nugget: f64 },
    /// Bounded linear: `c0 + c·min(h/a, 1)`.
    Linear { range: f64, sill: f64, nugget: f64 },
    /// Unbounded: `c0 + b·h^p`, `0 < p < 2`.
    Power {
        slope: f64,
        exponent: f64,
        nugget: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariogramFamily {
    Spherical,
    Exponential,
    Gaussian,
    Linear,
    Power,
}

impl VariogramFamily {
    /// Bounded model from `(range, partial sill, nugget)`. For `Power` the
    /// range is read as the slope, with exponent 1.
    pub fn model(self, range: f64, sill: f64, nugget: f64) -> VariogramModel {
        match self {
            Self::Spherical => VariogramModel::Spherical {
                range,
                sill,
                nugget,
            },
            Self::Exponential => VariogramModel::Exponential {
                range,
                sill,
                nugget,
            },
            Self::Gaussian => VariogramModel::Gaussian {
                range,
                sill,
                nugget,
            },
            Self::Linear => VariogramModel::Linear {
                range,
                sill,
                nugget,
            },
            Self::Power => VariogramModel::Power {
                slope: range,
                exponent: 1.0,
                nugget,
            },
        }
    }
}

impl VariogramModel {
    pub fn family(&self) -> VariogramFamily {
        match self {
            Self::Spherical { .. } => VariogramFamily::Spherical,
            Self::Exponential { .. } => VariogramFamily::Exponential,
            Self::Gaussian { .. } => VariogramFamily::Gaussian,
            Self::Linear { .. } => VariogramFamily::Linear,
            Self::Power { .. } => VariogramFamily::Power,
        }
    }

    pub fn nugget(&self) -> f64 {
        match *self {
            Self::Spherical { nugget, .. }
            | Self::Exponential { nugget, .. }
            | Self::Gaussian { nugget, .. }
            | Self::Linear { nugget, .. }
            | Self::Power { nugget, .. } => nugget,
        }
    }

    /// `sill + nugget`; `None` for the unbounded power model.
    pub fn total_sill(&self) -> Option<f64> {
        match *self {
            Self::Spherical { sill, nugget, .. }
            | Self::Exponential { sill, nugget, .. }
            | Self::Gaussian { sill, nugget, .. }
            | Self::Linear { sill, nugget, .. } => Some(sill + nugget),
            Self::Power { .. } => None,
        }
    }

    pub fn validate(&self) -> FoundryResult<()> {
        let bad = |what: &str, v: f64| {
            Err(FoundryError::Validation(format!(
                "variogram {what} out of range: {v}"
            )))
        };
        if !(self.nugget() >= 0.0 && self.nugget().is_finite()) {
            return bad("nugget", self.nugget());
        }
        match *self {
            Self::Spherical { range, sill, .. }
            | Self::Exponential { range, sill, .. }
            | Self::Gaussian { range, sill, .. }
            | Self::Linear { range, sill, .. } => {
                if !(range > 0.0 && range.is_finite()) {
                    return bad("range", range);
                }
                if !(sill >= 0.0 && sill.is_finite()) {
                    return bad("sill", sill);
                }
            }
            Self::Power {
                slope, exponent, ..
            } => {
                if !(slope >= 0.0 && slope.is_finite()) {
                    return bad("slope", slope);
                }
                if !(exponent > 0.0 && exponent < 2.0) {
                    return bad("exponent", exponent);
                }
            }
        }
        Ok(())
    }

    /// Semivariance at lag `h ≥ 0`.
    pub fn gamma(&self, h: f64) -> f64 {
        if h <= 0.0 {
            return 0.0;
        }
        match *self {
            Self::Spherical {
                range,
                sill,
                nugget,
            } => {
                if h >= range {
                    nugget + sill
                } else {
                    let r = h / range;
                    nugget + sill * (1.5 * r - 0.5 * r * r * r)
                }
            }
            Self::Exponential {
                range,
                sill,
                nugget,
            } => nugget + sill * (1.0 - (-3.0 * h / range).exp()),
            Self::Gaussian {
                range,
                sill,
                nugget,
            } => nugget + sill * (1.0 - (-3.0 * h * h / (range * range)).exp()),
            Self::Linear {
                range,
                sill,
                nugget,
            } => nugget + sill * (h / range).min(1.0),
            Self::Power {
                slope,
                exponent,
                nugget,
            } => nugget + slope * h.powf(exponent),
        }
    }
}

/// One lag class of the empirical variogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalBin {
    /// Mean pair distance in the bin.
    pub lag: f64,
    /// Mean of `½(zᵢ − zⱼ)²`.
    pub semivariance: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalVariogram {
    /// Populated bins only, by increasing lag.
    pub bins: Vec<EmpiricalBin>,
    pub max_distance: f64,
    pub bin_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariogramFit {
    pub model: VariogramModel,
    pub empirical: EmpiricalVariogram,
    pub warnings: Vec<NumericalWarning>,
}

pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Shared input checks for point data.
pub(crate) fn validate_points(locations: &[Vec<f64>], values: &[f64]) -> FoundryResult<()> {
    if locations.is_empty() {
        return Err(FoundryError::EmptyInput("sample locations".into()));
    }
    if locations.len() != values.len() {
        return Err(FoundryError::mismatch(
            "sample values",
            locations.len(),
            values.len(),
        ));
    }
    let dim = locations[0].len();
    if dim == 0 {
        return Err(FoundryError::EmptyInput("locations have no coordinates".into()));
    }
    for loc in locations {
        if loc.len() != dim {
            return Err(FoundryError::mismatch("location dimension", dim, loc.len()));
        }
        if loc.iter().any(|v| !v.is_finite()) {
            return Err(FoundryError::Validation("non-finite location".into()));
        }
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FoundryError::Validation("non-finite sample value".into()));
    }
    Ok(())
}

/// Pairwise semivariances in `n_bins` equal-width lag classes over
/// `[0, max distance]`.
pub fn empirical_variogram(
    locations: &[Vec<f64>],
    values: &[f64],
    n_bins: usize,
) -> FoundryResult<EmpiricalVariogram> {
    validate_points(locations, values)?;
    if n_bins == 0 {
        return Err(FoundryError::Validation("variogram needs at least one bin".into()));
    }
    let n = locations.len();
    let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let h = distance(&locations[i], &locations[j]);
            let g = 0.5 * (values[i] - values[j]).powi(2);
            pairs.push((h, g));
        }
    }
    let max_distance = pairs.iter().map(|p| p.0).fold(0.0, f64::max);
    let bin_width = max_distance / n_bins as f64;

    let mut sums = vec![(0.0, 0.0, 0usize); n_bins];
    if bin_width > 0.0 {
        for &(h, g) in &pairs {
            let k = ((h / bin_width) as usize).min(n_bins - 1);
            sums[k].0 += h;
            sums[k].1 += g;
            sums[k].2 += 1;
        }
    }
    let bins = sums
        .into_iter()
        .filter(|s| s.2 > 0)
        .map(|(h, g, c)| EmpiricalBin {
            lag: h / c as f64,
            semivariance: g / c as f64,
            count: c,
        })
        .collect();

    Ok(EmpiricalVariogram {
        bins,
        max_distance,
        bin_width,
    })
}

/// Smallest sill a fit may report, relative to the mean square of the
/// data (absolute when the data are all zero).
const SILL_FLOOR: f64 = 1e-12;

/// `variance` when positive, else [`SILL_FLOOR`] scaled to the data, so
/// constant samples still yield a valid model.
fn positive_sill(variance: f64, values: &[f64]) -> f64 {
    if variance > 0.0 {
        return variance;
    }
    let mean_sq = values.iter().map(|v| v * v).sum::<f64>() / values.len().max(1) as f64;
    SILL_FLOOR * mean_sq.max(1.0)
}

fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Fit `family` to the empirical variogram.
///
/// - sill: semivariance of the last populated bin
/// - range: mean lag of the first bin reaching 95% of the sill
/// - nugget: first two bins extrapolated linearly to `h = 0`, clamped to
///   `[0, sill]`
/// - power family: log-log least squares for slope and exponent
///
/// Fewer than two populated bins falls back to
/// `(max distance / 2, sample variance, 0)` with a warning. A zero sample
/// variance (constant data) is replaced by a sill of `1e-12` times the
/// mean square of the data; a zero distance range by 1.
pub fn fit_variogram(
    locations: &[Vec<f64>],
    values: &[f64],
    family: VariogramFamily,
    n_bins: usize,
) -> FoundryResult<VariogramFit> {
    let empirical = empirical_variogram(locations, values, n_bins)?;
    let mut warnings = Vec::new();
    let variance = sample_variance(values);
    let positive_or_one = |v: f64| if v > 0.0 { v } else { 1.0 };

    let bins = &empirical.bins;
    if bins.len() < 2 {
        warnings.push(
            NumericalWarning::VariogramFallback {
                populated_bins: bins.len(),
            }
            .emit("foundry_kriging::variogram"),
        );
        let range = positive_or_one(empirical.max_distance / 2.0);
        let sill = positive_sill(variance, values);
        let model = match family {
            VariogramFamily::Power => VariogramModel::Power {
                slope: sill / (2.0 * range),
                exponent: 1.0,
                nugget: 0.0,
            },
            _ => family.model(range, sill, 0.0),
        };
        return Ok(VariogramFit {
            model,
            empirical,
            warnings,
        });
    }

    let model = if family == VariogramFamily::Power {
        fit_power(bins, positive_sill(variance, values), empirical.max_distance)
    } else {
        let mut sill = bins[bins.len() - 1].semivariance;
        if !(sill > 0.0) {
            sill = positive_sill(variance, values);
        }
        let range = bins
            .iter()
            .find(|b| b.semivariance >= 0.95 * sill)
            .map(|b| b.lag)
            .filter(|&a| a > 0.0)
            .unwrap_or_else(|| positive_or_one(empirical.max_distance / 2.0));

        let (b1, b2) = (bins[0], bins[1]);
        let slope = (b2.semivariance - b1.semivariance) / (b2.lag - b1.lag);
        let mut nugget = b1.semivariance - slope * b1.lag;
        if !nugget.is_finite() {
            nugget = 0.0;
        }
        let nugget = nugget.clamp(0.0, sill);
        family.model(range, sill - nugget, nugget)
    };

    debug!(
        "variogram fit: {model:?} from {} bins (max lag {:.4})",
        bins.len(),
        empirical.max_distance
    );
    Ok(VariogramFit {
        model,
        empirical,
        warnings,
    })
}

fn fit_power(bins: &[EmpiricalBin], sill: f64, max_distance: f64) -> VariogramModel {
    let pts: Vec<(f64, f64)> = bins
        .iter()
        .filter(|b| b.lag > 0.0 && b.semivariance > 0.0)
        .map(|b| (b.lag.ln(), b.semivariance.ln()))
        .collect();
    if pts.len() >= 2 {
        let m = pts.len() as f64;
        let mx = pts.iter().map(|p| p.0).sum::<f64>() / m;
        let my = pts.iter().map(|p| p.1).sum::<f64>() / m;
        let sxx: f64 = pts.iter().map(|p| (p.0 - mx).powi(2)).sum();
        let sxy: f64 = pts.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
        if sxx > 0.0 {
            let exponent = (sxy / sxx).clamp(0.01, 1.99);
            let slope = (my - exponent * mx).exp();
            return VariogramModel::Power {
                slope,
                exponent,
                nugget: 0.0,
            };
        }
    }
    let reach = if max_distance > 0.0 { max_distance } else { 1.0 };
    VariogramModel::Power {
        slope: sill / reach,
        exponent: 1.0,
        nugget: 0.0,
    }
}
