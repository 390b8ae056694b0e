// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Interval Scalar
// ─────────────────────────────────────────────────────────────────────
//! Closed interval `[lo, hi]` with the NaN pair as the "undefined"
//! sentinel.
//!
//! Domain errors (sqrt of a negative-only interval, division by `[0, 0]`)
//! produce [`Interval::undefined`] and never panic or return `Err`.
//! Undefined operands propagate.
//!
//! `add`, `sub`, `mul`, `div`, `pow` and `sqrt` round outward: each
//! endpoint is computed in round-to-nearest together with its exact
//! rounding error (TwoSum, or an FMA residual) and moved one ulp outward
//! only when the error points outside. Exact results stay exact.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Guaranteed bound on an unknown real value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Endpoint; 2]", into = "[Endpoint; 2]")]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    /// Interval spanning `a` and `b` in either order. Any NaN → undefined.
    pub fn new(a: f64, b: f64) -> Self {
        if a.is_nan() || b.is_nan() {
            return Self::undefined();
        }
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn point(x: f64) -> Self {
        Self::new(x, x)
    }

    pub fn undefined() -> Self {
        Self {
            lo: f64::NAN,
            hi: f64::NAN,
        }
    }

    pub fn entire() -> Self {
        Self {
            lo: f64::NEG_INFINITY,
            hi: f64::INFINITY,
        }
    }

    /// `[center - |tol|, center + |tol|]`.
    pub fn with_tolerance(center: f64, tol: f64) -> Self {
        let t = tol.abs();
        Self::new(center - t, center + t)
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn is_undefined(&self) -> bool {
        self.lo.is_nan() || self.hi.is_nan()
    }

    pub fn is_entire(&self) -> bool {
        self.lo == f64::NEG_INFINITY && self.hi == f64::INFINITY
    }

    /// `hi - lo`; NaN when undefined.
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn radius(&self) -> f64 {
        0.5 * self.width()
    }

    pub fn midpoint(&self) -> f64 {
        if self.is_entire() {
            0.0
        } else {
            0.5 * self.lo + 0.5 * self.hi
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lo <= x && x <= self.hi
    }

    pub fn contains_zero(&self) -> bool {
        self.contains(0.0)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &Interval) -> bool {
        !self.is_undefined() && !other.is_undefined() && self.lo <= other.lo && other.hi <= self.hi
    }

    /// Common part of two intervals, `None` when disjoint or undefined.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        if self.is_undefined() || other.is_undefined() {
            return None;
        }
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        (lo <= hi).then_some(Interval { lo, hi })
    }

    /// Smallest interval containing both.
    pub fn hull(&self, other: &Interval) -> Interval {
        if self.is_undefined() || other.is_undefined() {
            return Self::undefined();
        }
        Interval {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────

    pub fn add(&self, other: &Interval) -> Interval {
        Self::new(
            round_down(two_sum(self.lo, other.lo)),
            round_up(two_sum(self.hi, other.hi)),
        )
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        Self::new(
            round_down(two_sum(self.lo, -other.hi)),
            round_up(two_sum(self.hi, -other.lo)),
        )
    }

    /// Min/max of the four corner products.
    pub fn mul(&self, other: &Interval) -> Interval {
        if self.is_undefined() || other.is_undefined() {
            return Self::undefined();
        }
        let p = [
            two_prod(self.lo, other.lo),
            two_prod(self.lo, other.hi),
            two_prod(self.hi, other.lo),
            two_prod(self.hi, other.hi),
        ];
        corner_hull(&p)
    }

    /// Interval division.
    ///
    /// - divisor `[0, 0]` → undefined
    /// - divisor straddling zero → entire line
    /// - divisor touching zero at one end → one-sided infinite interval,
    ///   sign taken from the numerator (`[0, 0]` numerator → `[0, 0]`,
    ///   numerator containing zero → entire line)
    /// - otherwise the hull of the four corner quotients
    pub fn div(&self, other: &Interval) -> Interval {
        if self.is_undefined() || other.is_undefined() {
            return Self::undefined();
        }
        if other.lo == 0.0 && other.hi == 0.0 {
            return Self::undefined();
        }
        if other.lo < 0.0 && other.hi > 0.0 {
            return Self::entire();
        }
        if other.lo == 0.0 || other.hi == 0.0 {
            return self.div_one_sided(other);
        }
        let q = [
            two_div(self.lo, other.lo),
            two_div(self.lo, other.hi),
            two_div(self.hi, other.lo),
            two_div(self.hi, other.hi),
        ];
        corner_hull(&q)
    }

    fn div_one_sided(&self, other: &Interval) -> Interval {
        if self.lo == 0.0 && self.hi == 0.0 {
            return Self::point(0.0);
        }
        if self.contains_zero() {
            return Self::entire();
        }
        let positive_divisor = other.lo == 0.0;
        match (self.lo > 0.0, positive_divisor) {
            // [+]/[0, d] → [lo/d, +∞)
            (true, true) => Self::new(round_down(two_div(self.lo, other.hi)), f64::INFINITY),
            // [-]/[0, d] → (-∞, hi/d]
            (false, true) => Self::new(f64::NEG_INFINITY, round_up(two_div(self.hi, other.hi))),
            // [+]/[-d, 0] → (-∞, lo/-d]
            (true, false) => Self::new(f64::NEG_INFINITY, round_up(two_div(self.lo, other.lo))),
            // [-]/[-d, 0] → [hi/-d, +∞)
            (false, false) => Self::new(round_down(two_div(self.hi, other.lo)), f64::INFINITY),
        }
    }

    pub fn neg(&self) -> Interval {
        Self::new(-self.hi, -self.lo)
    }

    pub fn scale(&self, factor: f64) -> Interval {
        self.mul(&Self::point(factor))
    }

    pub fn abs(&self) -> Interval {
        if self.is_undefined() {
            return Self::undefined();
        }
        if self.lo >= 0.0 {
            *self
        } else if self.hi <= 0.0 {
            self.neg()
        } else {
            Self::new(0.0, (-self.lo).max(self.hi))
        }
    }

    /// Pointwise minimum: `{min(x, y)}`.
    pub fn min(&self, other: &Interval) -> Interval {
        if self.is_undefined() || other.is_undefined() {
            return Self::undefined();
        }
        Self::new(self.lo.min(other.lo), self.hi.min(other.hi))
    }

    /// Pointwise maximum: `{max(x, y)}`.
    pub fn max(&self, other: &Interval) -> Interval {
        if self.is_undefined() || other.is_undefined() {
            return Self::undefined();
        }
        Self::new(self.lo.max(other.lo), self.hi.max(other.hi))
    }

    /// Integer power. Even powers of a sign-straddling interval start at 0;
    /// negative powers go through [`Interval::div`].
    pub fn pow(&self, n: i32) -> Interval {
        if self.is_undefined() {
            return Self::undefined();
        }
        if n == 0 {
            return Self::point(1.0);
        }
        let e = n.unsigned_abs();
        let positive = if e % 2 == 1 || self.lo >= 0.0 {
            Self::new(pow_down(self.lo, e), pow_up(self.hi, e))
        } else if self.hi <= 0.0 {
            Self::new(pow_down(self.hi, e), pow_up(self.lo, e))
        } else {
            Self::new(0.0, pow_up(self.lo, e).max(pow_up(self.hi, e)))
        };
        if n > 0 {
            positive
        } else {
            Interval::div(&Self::point(1.0), &positive)
        }
    }

    /// Undefined if `hi < 0`; the negative part is cut off otherwise.
    pub fn sqrt(&self) -> Interval {
        if self.is_undefined() || self.hi < 0.0 {
            return Self::undefined();
        }
        Self::new(
            round_down(two_sqrt(self.lo.max(0.0))),
            round_up(two_sqrt(self.hi)),
        )
    }
}

// ── Outward rounding ──────────────────────────────────────────────────
//
// Each helper returns `(rounded, err)` with `err = exact − rounded`. A NaN
// error means the sign is unknown (overflow, underflow) and both
// directions widen.

fn round_down((x, err): (f64, f64)) -> f64 {
    if err < 0.0 || err.is_nan() {
        x.next_down()
    } else {
        x
    }
}

fn round_up((x, err): (f64, f64)) -> f64 {
    if err > 0.0 || err.is_nan() {
        x.next_up()
    } else {
        x
    }
}

/// Knuth's TwoSum.
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    if !s.is_finite() {
        let overflow = a.is_finite() && b.is_finite();
        return (s, if overflow { f64::NAN } else { 0.0 });
    }
    let bb = s - a;
    (s, (a - (s - bb)) + (b - bb))
}

/// Product with its FMA residual. `0 · ∞` is 0 for interval bounds.
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    if a == 0.0 || b == 0.0 {
        return (0.0, 0.0);
    }
    let p = a * b;
    if !p.is_finite() {
        let overflow = a.is_finite() && b.is_finite();
        return (p, if overflow { f64::NAN } else { 0.0 });
    }
    if p.abs() < f64::MIN_POSITIVE {
        return (p, f64::NAN);
    }
    (p, a.mul_add(b, -p))
}

/// Quotient; the sign of the error follows from the exact remainder
/// `a − q·b`.
fn two_div(a: f64, b: f64) -> (f64, f64) {
    if a == 0.0 {
        return (0.0, 0.0);
    }
    let q = a / b;
    if !a.is_finite() || !b.is_finite() {
        return (q, 0.0);
    }
    if !q.is_finite() || q.abs() < f64::MIN_POSITIVE {
        return (q, f64::NAN);
    }
    let r = (-q).mul_add(b, a);
    let err = if r == 0.0 {
        0.0
    } else if (r > 0.0) == (b > 0.0) {
        1.0
    } else {
        -1.0
    };
    (q, err)
}

/// Square root of `x ≥ 0`; the residual `x − s²` carries the error sign.
fn two_sqrt(x: f64) -> (f64, f64) {
    let s = x.sqrt();
    if s == 0.0 || !s.is_finite() {
        return (s, 0.0);
    }
    (s, (-s).mul_add(s, x))
}

fn mul_down(a: f64, b: f64) -> f64 {
    round_down(two_prod(a, b))
}

fn mul_up(a: f64, b: f64) -> f64 {
    round_up(two_prod(a, b))
}

/// Bounds on `m^e` for `m ≥ 0`, by square-and-multiply with each product
/// rounded the matching way.
fn magnitude_pow(m: f64, e: u32) -> (f64, f64) {
    let (mut lo, mut hi) = (1.0, 1.0);
    let (mut base_lo, mut base_hi) = (m, m);
    let mut k = e;
    while k > 0 {
        if k & 1 == 1 {
            lo = mul_down(lo, base_lo).max(0.0);
            hi = mul_up(hi, base_hi);
        }
        k >>= 1;
        if k > 0 {
            base_lo = mul_down(base_lo, base_lo).max(0.0);
            base_hi = mul_up(base_hi, base_hi);
        }
    }
    (lo, hi)
}

/// Lower bound on `x^e`.
fn pow_down(x: f64, e: u32) -> f64 {
    if x >= 0.0 || e % 2 == 0 {
        magnitude_pow(x.abs(), e).0
    } else {
        -magnitude_pow(-x, e).1
    }
}

/// Upper bound on `x^e`.
fn pow_up(x: f64, e: u32) -> f64 {
    if x >= 0.0 || e % 2 == 0 {
        magnitude_pow(x.abs(), e).1
    } else {
        -magnitude_pow(-x, e).0
    }
}

/// Outward hull of corner values, skipping the NaN of ∞/∞ corners.
fn corner_hull(c: &[(f64, f64); 4]) -> Interval {
    let lo = c.iter().map(|&v| round_down(v)).fold(f64::INFINITY, f64::min);
    let hi = c.iter().map(|&v| round_up(v)).fold(f64::NEG_INFINITY, f64::max);
    if lo > hi {
        return Interval::undefined();
    }
    Interval::new(lo, hi)
}

// ── Operator impls ────────────────────────────────────────────────────

impl Add for Interval {
    type Output = Interval;
    fn add(self, rhs: Interval) -> Interval {
        Interval::add(&self, &rhs)
    }
}

impl Sub for Interval {
    type Output = Interval;
    fn sub(self, rhs: Interval) -> Interval {
        Interval::sub(&self, &rhs)
    }
}

impl Mul for Interval {
    type Output = Interval;
    fn mul(self, rhs: Interval) -> Interval {
        Interval::mul(&self, &rhs)
    }
}

impl Div for Interval {
    type Output = Interval;
    fn div(self, rhs: Interval) -> Interval {
        Interval::div(&self, &rhs)
    }
}

impl Neg for Interval {
    type Output = Interval;
    fn neg(self) -> Interval {
        Interval::neg(&self)
    }
}

impl From<f64> for Interval {
    fn from(x: f64) -> Self {
        Interval::point(x)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "[undefined]")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

// ── Serde representation ──────────────────────────────────────────────

/// JSON has no infinities or NaN, so those endpoints travel as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Endpoint {
    Number(f64),
    Symbol(String),
}

impl From<f64> for Endpoint {
    fn from(x: f64) -> Self {
        if x.is_finite() {
            Endpoint::Number(x)
        } else if x.is_nan() {
            Endpoint::Symbol("nan".to_string())
        } else if x > 0.0 {
            Endpoint::Symbol("inf".to_string())
        } else {
            Endpoint::Symbol("-inf".to_string())
        }
    }
}

impl TryFrom<Endpoint> for f64 {
    type Error = String;

    fn try_from(e: Endpoint) -> Result<Self, Self::Error> {
        match e {
            Endpoint::Number(x) => Ok(x),
            Endpoint::Symbol(s) => match s.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(format!("invalid interval endpoint {other:?}")),
            },
        }
    }
}

impl TryFrom<[Endpoint; 2]> for Interval {
    type Error = String;

    fn try_from([a, b]: [Endpoint; 2]) -> Result<Self, Self::Error> {
        Ok(Interval::new(f64::try_from(a)?, f64::try_from(b)?))
    }
}

impl From<Interval> for [Endpoint; 2] {
    fn from(iv: Interval) -> Self {
        [iv.lo.into(), iv.hi.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(a: f64, b: f64) -> Interval {
        Interval::new(a, b)
    }

    #[test]
    fn test_new_orders_endpoints() {
        let x = iv(3.0, -1.0);
        assert_eq!(x.lo(), -1.0);
        assert_eq!(x.hi(), 3.0);
    }

    #[test]
    fn test_nan_is_undefined() {
        assert!(iv(f64::NAN, 1.0).is_undefined());
        assert!(Interval::point(f64::NAN).is_undefined());
    }

    #[test]
    fn test_add_sub() {
        let a = iv(1.0, 2.0);
        let b = iv(-1.0, 3.0);
        assert_eq!(a + b, iv(0.0, 5.0));
        assert_eq!(a - b, iv(-2.0, 3.0));
    }

    #[test]
    fn test_mul_corners() {
        assert_eq!(iv(-2.0, 3.0) * iv(-1.0, 4.0), iv(-8.0, 12.0));
        assert_eq!(iv(-2.0, -1.0) * iv(3.0, 4.0), iv(-8.0, -3.0));
    }

    #[test]
    fn test_mul_zero_times_entire() {
        assert_eq!(Interval::point(0.0) * Interval::entire(), Interval::point(0.0));
    }

    #[test]
    fn test_div_straddling_is_entire() {
        let r = iv(1.0, 2.0) / iv(-1.0, 1.0);
        assert!(r.is_entire(), "got {r}");
    }

    #[test]
    fn test_div_by_zero_point_is_undefined() {
        assert!((iv(1.0, 2.0) / Interval::point(0.0)).is_undefined());
    }

    #[test]
    fn test_div_one_sided() {
        assert_eq!(iv(1.0, 2.0) / iv(0.0, 4.0), iv(0.25, f64::INFINITY));
        assert_eq!(iv(-2.0, -1.0) / iv(0.0, 4.0), iv(f64::NEG_INFINITY, -0.25));
        assert_eq!(iv(1.0, 2.0) / iv(-4.0, 0.0), iv(f64::NEG_INFINITY, -0.25));
        assert_eq!(iv(-2.0, -1.0) / iv(-4.0, 0.0), iv(0.25, f64::INFINITY));
        assert!((iv(-1.0, 1.0) / iv(0.0, 1.0)).is_entire());
        assert_eq!(Interval::point(0.0) / iv(0.0, 1.0), Interval::point(0.0));
    }

    #[test]
    fn test_div_regular() {
        let r = iv(1.0, 2.0) / iv(4.0, 8.0);
        assert!((r.lo() - 0.125).abs() < 1e-15);
        assert!((r.hi() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_pow_even_straddling() {
        assert_eq!(iv(-3.0, 2.0).pow(2), iv(0.0, 9.0));
        assert_eq!(iv(-3.0, -2.0).pow(2), iv(4.0, 9.0));
    }

    #[test]
    fn test_pow_odd_and_zero() {
        assert_eq!(iv(-2.0, 3.0).pow(3), iv(-8.0, 27.0));
        assert_eq!(iv(-2.0, 3.0).pow(0), Interval::point(1.0));
    }

    #[test]
    fn test_pow_negative() {
        let r = iv(2.0, 4.0).pow(-1);
        assert_eq!(r, iv(0.25, 0.5));
        assert!(iv(-1.0, 1.0).pow(-2).hi().is_infinite());
    }

    #[test]
    fn test_sqrt() {
        assert!(iv(-4.0, -1.0).sqrt().is_undefined());
        assert_eq!(iv(-4.0, 9.0).sqrt(), iv(0.0, 3.0));
    }

    #[test]
    fn test_abs_min_max() {
        assert_eq!(iv(-3.0, 2.0).abs(), iv(0.0, 3.0));
        assert_eq!(iv(-3.0, -2.0).abs(), iv(2.0, 3.0));
        assert_eq!(iv(0.0, 5.0).min(&iv(1.0, 2.0)), iv(0.0, 2.0));
        assert_eq!(iv(0.0, 5.0).max(&iv(1.0, 2.0)), iv(1.0, 5.0));
    }

    #[test]
    fn test_undefined_propagates() {
        let u = Interval::undefined();
        let a = iv(1.0, 2.0);
        assert!((u + a).is_undefined());
        assert!((a * u).is_undefined());
        assert!((a / u).is_undefined());
        assert!(u.pow(2).is_undefined());
        assert!(u.abs().is_undefined());
    }

    #[test]
    fn test_intersect_hull() {
        let a = iv(0.0, 2.0);
        let b = iv(1.0, 3.0);
        assert_eq!(a.intersect(&b), Some(iv(1.0, 2.0)));
        assert_eq!(a.intersect(&iv(5.0, 6.0)), None);
        assert_eq!(a.hull(&b), iv(0.0, 3.0));
    }

    #[test]
    fn test_queries() {
        let a = Interval::with_tolerance(10.0, -0.5);
        assert_eq!(a, iv(9.5, 10.5));
        assert!((a.width() - 1.0).abs() < 1e-15);
        assert!((a.midpoint() - 10.0).abs() < 1e-15);
        assert!(a.contains(10.2));
        assert!(!a.contains_zero());
        assert_eq!(Interval::entire().midpoint(), 0.0);
    }

    #[test]
    fn test_serde_finite() {
        let json = serde_json::to_string(&iv(1.5, 2.0)).unwrap();
        assert_eq!(json, "[1.5,2.0]");
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iv(1.5, 2.0));
    }

    #[test]
    fn test_serde_non_finite() {
        let json = serde_json::to_string(&Interval::entire()).unwrap();
        assert_eq!(json, r#"["-inf","inf"]"#);
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert!(back.is_entire());

        let json = serde_json::to_string(&Interval::undefined()).unwrap();
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert!(back.is_undefined());
    }

    #[test]
    fn test_serde_rejects_unknown_symbol() {
        assert!(serde_json::from_str::<Interval>(r#"["big", 1.0]"#).is_err());
    }
}
