// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Interval Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Guaranteed-bounds interval arithmetic.
//!
//! Every operator returns an interval that contains the exact result for
//! any choice of reals inside its operands (up to the rounding of the
//! endpoint computations; no directed rounding is performed).
//!
//! Architecture:
//!   - Interval: closed interval scalar, arithmetic + pow/sqrt/abs
//!   - trig: sin/cos/tan, inverse functions, atan2
//!   - IntervalVector / IntervalMatrix: elementwise lifting
//!   - collision: sphere/AABB/point-cloud separation margins → verdict

pub mod collision;
pub mod interval;
pub mod trig;
pub mod vector;

pub use collision::{
    aabb_aabb, classify_margin, point_cloud, sphere_sphere, Aabb, CollisionReport,
    CollisionStatus,
};
pub use interval::Interval;
pub use vector::{IntervalMatrix, IntervalVector};
