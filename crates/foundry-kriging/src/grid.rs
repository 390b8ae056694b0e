// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Grid Interpolation
// ─────────────────────────────────────────────────────────────────────
//! Kriged value/variance grids from sparse 2-D samples.
//!
//! One global variogram is fitted, then one Ordinary Kriging system is
//! solved per node.

use log::info;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning};

use crate::kriging::{KrigingOptions, OrdinaryKriging};
use crate::variogram::{fit_variogram, VariogramModel};

/// Regular grid: node `(ix, iy)` sits at `origin + (ix·dx, iy·dy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub origin: [f64; 2],
    pub spacing: [f64; 2],
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    /// `nx × ny` nodes spanning `[x0, x1] × [y0, y1]` inclusive.
    pub fn spanning(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> FoundryResult<Self> {
        if nx < 2 || ny < 2 {
            return Err(FoundryError::Validation(format!(
                "spanning grid needs at least 2x2 nodes, got {nx}x{ny}"
            )));
        }
        let spec = Self {
            origin: [x0, y0],
            spacing: [(x1 - x0) / (nx - 1) as f64, (y1 - y0) / (ny - 1) as f64],
            nx,
            ny,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> FoundryResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(FoundryError::EmptyInput(format!(
                "grid of {}x{} nodes",
                self.nx, self.ny
            )));
        }
        if self.spacing.iter().any(|s| !(*s > 0.0 && s.is_finite()))
            || self.origin.iter().any(|o| !o.is_finite())
        {
            return Err(FoundryError::Validation(format!(
                "grid origin must be finite and spacing > 0, got {:?} / {:?}",
                self.origin, self.spacing
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, ix: usize, iy: usize) -> [f64; 2] {
        [
            self.origin[0] + ix as f64 * self.spacing[0],
            self.origin[1] + iy as f64 * self.spacing[1],
        ]
    }
}

/// One probe measurement: height `z` at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Row-major (`iy·nx + ix`) value and variance grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub spec: GridSpec,
    pub values: Vec<f64>,
    pub variances: Vec<f64>,
    pub model: VariogramModel,
    pub warnings: Vec<NumericalWarning>,
}

impl SurfaceGrid {
    pub fn value(&self, ix: usize, iy: usize) -> Option<f64> {
        (ix < self.spec.nx && iy < self.spec.ny).then(|| self.values[iy * self.spec.nx + ix])
    }

    pub fn variance(&self, ix: usize, iy: usize) -> Option<f64> {
        (ix < self.spec.nx && iy < self.spec.ny).then(|| self.variances[iy * self.spec.nx + ix])
    }

    pub fn max_variance(&self) -> f64 {
        self.variances.iter().copied().fold(0.0, f64::max)
    }
}

/// Krige `values` observed at 2-D `locations` onto `grid`.
pub fn interpolate_grid(
    locations: &[[f64; 2]],
    values: &[f64],
    grid: &GridSpec,
    options: &KrigingOptions,
) -> FoundryResult<SurfaceGrid> {
    grid.validate()?;
    let locs: Vec<Vec<f64>> = locations.iter().map(|p| p.to_vec()).collect();
    let fit = fit_variogram(&locs, values, options.family, options.variogram_bins)?;
    let mut warnings = fit.warnings;
    let system = OrdinaryKriging::new(&locs, values, fit.model, options)?;

    let mut out_values = Vec::with_capacity(grid.len());
    let mut variances = Vec::with_capacity(grid.len());
    for iy in 0..grid.ny {
        for ix in 0..grid.nx {
            let est = system.estimate(&grid.node(ix, iy))?;
            out_values.push(est.value);
            variances.push(est.variance);
            for w in est.warnings {
                if !warnings.contains(&w) {
                    warnings.push(w);
                }
            }
        }
    }

    info!(
        "kriged {}x{} grid from {} samples ({:?}), {} warnings",
        grid.nx,
        grid.ny,
        values.len(),
        fit.model.family(),
        warnings.len()
    );
    Ok(SurfaceGrid {
        spec: *grid,
        values: out_values,
        variances,
        model: fit.model,
        warnings,
    })
}

/// Reconstruct a surface height map from sparse probe hits.
pub fn reconstruct_surface(
    probes: &[ProbeSample],
    grid: &GridSpec,
    options: &KrigingOptions,
) -> FoundryResult<SurfaceGrid> {
    let locations: Vec<[f64; 2]> = probes.iter().map(|p| [p.x, p.y]).collect();
    let heights: Vec<f64> = probes.iter().map(|p| p.z).collect();
    interpolate_grid(&locations, &heights, grid, options)
}
