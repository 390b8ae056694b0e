// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Interval Trigonometry
// ─────────────────────────────────────────────────────────────────────

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::interval::Interval;

/// Slack for deciding whether a critical point lies inside an interval.
/// Erring towards "inside" only widens the result.
const CRITICAL_SLACK: f64 = 1e-12;

/// True if `offset + period·k` lies in `[lo, hi]` for some integer `k`.
fn hits_lattice(lo: f64, hi: f64, offset: f64, period: f64) -> bool {
    let k = ((lo - offset) / period).ceil();
    let x = offset + period * k;
    let slack = CRITICAL_SLACK * (1.0 + hi.abs());
    x <= hi + slack || offset + period * (k - 1.0) >= lo - slack
}

impl Interval {
    /// Endpoint values widened to ±1 where a peak or trough lies inside.
    pub fn sin(&self) -> Interval {
        if self.is_undefined() {
            return Interval::undefined();
        }
        let (lo, hi) = (self.lo(), self.hi());
        if !lo.is_finite() || !hi.is_finite() || self.width() >= TAU {
            return Interval::new(-1.0, 1.0);
        }
        let (s_lo, s_hi) = (lo.sin(), hi.sin());
        let mut min = s_lo.min(s_hi);
        let mut max = s_lo.max(s_hi);
        if hits_lattice(lo, hi, FRAC_PI_2, TAU) {
            max = 1.0;
        }
        if hits_lattice(lo, hi, 3.0 * FRAC_PI_2, TAU) {
            min = -1.0;
        }
        Interval::new(min, max)
    }

    /// `cos(x) = sin(x + π/2)`.
    pub fn cos(&self) -> Interval {
        self.add(&Interval::point(FRAC_PI_2)).sin()
    }

    /// Entire line when the interval reaches a pole.
    pub fn tan(&self) -> Interval {
        if self.is_undefined() {
            return Interval::undefined();
        }
        let (lo, hi) = (self.lo(), self.hi());
        if !lo.is_finite() || !hi.is_finite() || self.width() >= PI {
            return Interval::entire();
        }
        if hits_lattice(lo, hi, FRAC_PI_2, PI) {
            return Interval::entire();
        }
        Interval::new(lo.tan(), hi.tan())
    }

    /// Clamped to `[-1, 1]`; undefined if nothing is left.
    pub fn asin(&self) -> Interval {
        match self.clamp_unit() {
            Some((lo, hi)) => Interval::new(lo.asin(), hi.asin()),
            None => Interval::undefined(),
        }
    }

    /// Clamped to `[-1, 1]`; decreasing.
    pub fn acos(&self) -> Interval {
        match self.clamp_unit() {
            Some((lo, hi)) => Interval::new(hi.acos(), lo.acos()),
            None => Interval::undefined(),
        }
    }

    pub fn atan(&self) -> Interval {
        if self.is_undefined() {
            return Interval::undefined();
        }
        Interval::new(self.lo().atan(), self.hi().atan())
    }

    /// Angle of the point `(x, y)` with `self` as `y`.
    ///
    /// Full circle when the box contains the origin or crosses the branch
    /// cut on the negative x-axis; corner angles otherwise.
    pub fn atan2(&self, x: &Interval) -> Interval {
        let y = self;
        if y.is_undefined() || x.is_undefined() {
            return Interval::undefined();
        }
        if y.contains_zero() && (x.contains_zero() || x.hi() < 0.0) {
            return Interval::new(-PI, PI);
        }
        let corners = [
            y.lo().atan2(x.lo()),
            y.lo().atan2(x.hi()),
            y.hi().atan2(x.lo()),
            y.hi().atan2(x.hi()),
        ];
        let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Interval::new(lo, hi)
    }

    fn clamp_unit(&self) -> Option<(f64, f64)> {
        if self.is_undefined() {
            return None;
        }
        let lo = self.lo().max(-1.0);
        let hi = self.hi().min(1.0);
        (lo <= hi).then_some((lo, hi))
    }
}
