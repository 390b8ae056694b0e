// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Guaranteed Collision Predicates
// ─────────────────────────────────────────────────────────────────────
//! Separation-margin intervals and their three-way verdict.
//!
//! A margin is positive when the bodies are apart. The verdict is
//! [`CollisionStatus::Uncertain`] whenever the margin interval admits both
//! signs; it is never collapsed to a boolean.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult};

use crate::interval::Interval;
use crate::vector::IntervalVector;

/// Attached to every uncertain verdict.
pub const REFINE_RECOMMENDATION: &str =
    "margin straddles zero: refine geometry or tighten tolerances before proceeding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollisionStatus {
    /// Margin lower bound > 0.
    Safe,
    /// Margin upper bound < 0.
    Collision,
    /// Margin straddles zero or is undefined.
    Uncertain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionReport {
    pub status: CollisionStatus,
    pub margin: Interval,
    /// Present iff the status is uncertain.
    pub recommendation: Option<String>,
    /// Index of the point with the smallest margin (point-cloud checks).
    pub critical_index: Option<usize>,
}

/// Classify a separation margin.
pub fn classify_margin(margin: Interval) -> CollisionReport {
    let status = if margin.is_undefined() {
        CollisionStatus::Uncertain
    } else if margin.lo() > 0.0 {
        CollisionStatus::Safe
    } else if margin.hi() < 0.0 {
        CollisionStatus::Collision
    } else {
        CollisionStatus::Uncertain
    };
    debug!("collision margin {margin} → {status:?}");
    CollisionReport {
        status,
        margin,
        recommendation: (status == CollisionStatus::Uncertain)
            .then(|| REFINE_RECOMMENDATION.to_string()),
        critical_index: None,
    }
}

/// Two spheres: `distance(c1, c2) - (r1 + r2)`.
pub fn sphere_sphere(
    c1: &IntervalVector,
    r1: Interval,
    c2: &IntervalVector,
    r2: Interval,
) -> FoundryResult<CollisionReport> {
    let margin = c1.distance(c2)?.sub(&r1.add(&r2));
    Ok(classify_margin(margin))
}

/// Axis-aligned box with interval-valued corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: IntervalVector,
    pub max: IntervalVector,
}

impl Aabb {
    pub fn new(min: IntervalVector, max: IntervalVector) -> FoundryResult<Self> {
        if min.len() != max.len() {
            return Err(FoundryError::mismatch("aabb corners", min.len(), max.len()));
        }
        if min.is_empty() {
            return Err(FoundryError::EmptyInput("aabb with zero dimensions".into()));
        }
        Ok(Self { min, max })
    }

    /// Box around exact corner coordinates widened by `±tol`.
    pub fn with_tolerance(min: &[f64], max: &[f64], tol: f64) -> FoundryResult<Self> {
        Self::new(
            IntervalVector::with_tolerance(min, tol),
            IntervalVector::with_tolerance(max, tol),
        )
    }

    pub fn dim(&self) -> usize {
        self.min.len()
    }
}

/// Margin = max over axes of `max(b.min - a.max, a.min - b.max)`.
///
/// Positive on some axis means a separating gap exists.
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> FoundryResult<CollisionReport> {
    if a.dim() != b.dim() {
        return Err(FoundryError::mismatch("aabb_aabb", a.dim(), b.dim()));
    }
    let gaps = b.min.sub(&a.max)?;
    let back = a.min.sub(&b.max)?;
    let margin = gaps
        .components()
        .iter()
        .zip(back.components())
        .map(|(g, h)| g.max(h))
        .reduce(|acc, m| acc.max(&m))
        .ok_or_else(|| FoundryError::EmptyInput("aabb with zero dimensions".into()))?;
    Ok(classify_margin(margin))
}

/// Tool sphere against sampled surface points.
///
/// Margin is the interval minimum over points of `distance - radius`;
/// the report names the point with the lowest margin bound.
pub fn point_cloud(
    tool_center: &IntervalVector,
    tool_radius: Interval,
    points: &[IntervalVector],
) -> FoundryResult<CollisionReport> {
    if points.is_empty() {
        return Err(FoundryError::EmptyInput("point cloud".into()));
    }
    let mut margin: Option<Interval> = None;
    let mut critical = 0;
    for (i, p) in points.iter().enumerate() {
        let m = tool_center.distance(p)?.sub(&tool_radius);
        margin = Some(match margin {
            None => m,
            Some(acc) => {
                let lower = m.is_undefined() || (!acc.is_undefined() && m.lo() < acc.lo());
                if lower {
                    critical = i;
                }
                acc.min(&m)
            }
        });
    }
    let mut report = classify_margin(margin.unwrap_or_else(Interval::undefined));
    report.critical_index = Some(critical);
    Ok(report)
}
