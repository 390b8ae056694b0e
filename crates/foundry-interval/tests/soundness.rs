//! Sampled soundness: for any reals drawn inside the operands, the exact
//! operator result lies inside the interval result.

use foundry_interval::{sphere_sphere, CollisionStatus, Interval, IntervalVector};
use proptest::prelude::*;

/// Strict containment. Valid against correctly rounded references
/// (`+ − × ÷ sqrt`): outward-rounded bounds bracket the exact value, so
/// they also bracket its nearest float.
fn encloses(r: &Interval, v: f64) -> bool {
    v.is_nan() || (r.lo() <= v && v <= r.hi())
}

/// Relative slack for references that are not correctly rounded
/// (`powi` and the libm trigonometric functions).
fn encloses_approx(r: &Interval, v: f64) -> bool {
    if v.is_nan() {
        return true;
    }
    let slack = 1e-12 * (1.0 + v.abs());
    r.lo() - slack <= v && v <= r.hi() + slack
}

fn sample(iv: &Interval, t: f64) -> f64 {
    (iv.lo() + t * (iv.hi() - iv.lo())).clamp(iv.lo(), iv.hi())
}

fn interval() -> impl Strategy<Value = Interval> {
    (-100.0f64..100.0, 0.0f64..50.0).prop_map(|(a, w)| Interval::new(a, a + w))
}

#[test]
fn inexact_endpoints_round_outward() {
    let tenth = Interval::point(0.1);
    let sum = tenth + Interval::point(0.2);
    // 0.1 + 0.2 rounds up to 0.30000000000000004
    assert!(sum.lo() < 0.1 + 0.2 && sum.hi() == 0.1 + 0.2, "{sum}");
    assert!(sum.width() > 0.0);

    let third = Interval::point(1.0) / Interval::point(3.0);
    assert!(third.lo() < third.hi());
    assert!(third.lo() * 3.0 <= 1.0 && third.hi() * 3.0 >= 1.0);

    let root = Interval::point(2.0).sqrt();
    assert!(root.lo() * root.lo() <= 2.0 && root.hi() * root.hi() >= 2.0);
    assert_eq!(root.hi(), root.lo().next_up());

    // Exact results keep zero width
    assert_eq!(Interval::point(0.5) + Interval::point(0.25), Interval::point(0.75));
    assert_eq!(Interval::point(3.0) * Interval::point(-4.0), Interval::point(-12.0));
    assert_eq!(Interval::new(-2.0, 3.0).pow(3), Interval::new(-8.0, 27.0));
}

#[test]
fn scenario_division_by_straddling_interval() {
    let r = Interval::new(1.0, 2.0) / Interval::new(-1.0, 1.0);
    assert_eq!(r.lo(), f64::NEG_INFINITY);
    assert_eq!(r.hi(), f64::INFINITY);
}

proptest! {
    #[test]
    fn prop_arithmetic_sound(
        a in interval(),
        b in interval(),
        s in 0.0f64..=1.0,
        t in 0.0f64..=1.0,
    ) {
        let x = sample(&a, s);
        let y = sample(&b, t);
        prop_assert!(encloses(&(a + b), x + y));
        prop_assert!(encloses(&(a - b), x - y));
        prop_assert!(encloses(&(a * b), x * y));
        prop_assert!(encloses(&a.neg(), -x));
        prop_assert!(encloses(&a.abs(), x.abs()));
        prop_assert!(encloses(&a.min(&b), x.min(y)));
        prop_assert!(encloses(&a.max(&b), x.max(y)));
        if y != 0.0 {
            prop_assert!(encloses(&(a / b), x / y), "{a} / {b} ∌ {x}/{y}");
        }
    }

    #[test]
    fn prop_pow_sqrt_sound(a in interval(), s in 0.0f64..=1.0, n in -4i32..=5) {
        let x = sample(&a, s);
        if x != 0.0 || n >= 0 {
            prop_assert!(encloses_approx(&a.pow(n), x.powi(n)), "{a}^{n} ∌ {x}^{n}");
        }
        if x >= 0.0 {
            prop_assert!(encloses(&a.sqrt(), x.sqrt()));
        }
    }

    #[test]
    fn prop_trig_sound(
        lo in -20.0f64..20.0,
        w in 0.0f64..8.0,
        s in 0.0f64..=1.0,
    ) {
        let a = Interval::new(lo, lo + w);
        let x = sample(&a, s);
        prop_assert!(encloses_approx(&a.sin(), x.sin()), "sin {a} ∌ sin {x}");
        prop_assert!(encloses_approx(&a.cos(), x.cos()), "cos {a} ∌ cos {x}");
        prop_assert!(encloses_approx(&a.atan(), x.atan()));
        let t = a.tan();
        if !t.is_entire() {
            prop_assert!(encloses_approx(&t, x.tan()), "tan {a} ∌ tan {x}");
        }
    }

    #[test]
    fn prop_inverse_trig_sound(lo in -1.0f64..1.0, w in 0.0f64..1.0, s in 0.0f64..=1.0) {
        let a = Interval::new(lo, (lo + w).min(1.0));
        let x = sample(&a, s);
        prop_assert!(encloses_approx(&a.asin(), x.asin()));
        prop_assert!(encloses_approx(&a.acos(), x.acos()));
    }

    #[test]
    fn prop_atan2_sound(y in interval(), x in interval(), s in 0.0f64..=1.0, t in 0.0f64..=1.0) {
        let py = sample(&y, s);
        let px = sample(&x, t);
        prop_assert!(encloses_approx(&y.atan2(&x), py.atan2(px)));
    }

    #[test]
    fn prop_widening_radius_never_jumps_safe_to_collision(
        gap in 0.0f64..10.0,
        r0 in 0.1f64..5.0,
        w1 in 0.0f64..1.0,
        extra in 0.0f64..2.0,
        tol in 0.0f64..0.5,
    ) {
        let tool = IntervalVector::with_tolerance(&[0.0, 0.0, 0.0], tol);
        let part = IntervalVector::with_tolerance(&[gap, 0.0, 0.0], tol);
        let fixed = Interval::point(0.5);
        let narrow = Interval::new(r0 - w1, r0 + w1);
        let wide = Interval::new(r0 - w1 - extra, r0 + w1 + extra);
        let s1 = sphere_sphere(&tool, narrow, &part, fixed).unwrap().status;
        let s2 = sphere_sphere(&tool, wide, &part, fixed).unwrap().status;
        if s2 == CollisionStatus::Safe {
            prop_assert_eq!(s1, CollisionStatus::Safe);
        }
        if s2 == CollisionStatus::Collision {
            prop_assert_eq!(s1, CollisionStatus::Collision);
        }
        prop_assert!(!(s1 == CollisionStatus::Safe && s2 == CollisionStatus::Collision));
    }
}
