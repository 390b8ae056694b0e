// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Interval Vectors and Matrices
// ─────────────────────────────────────────────────────────────────────
//! Elementwise lifting of [`Interval`] to fixed-length vectors and
//! row-major matrices. Shape mismatches are caller errors.

use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult};

use crate::interval::Interval;

/// Fixed-length sequence of intervals (a point or direction with
/// per-component uncertainty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalVector(Vec<Interval>);

impl IntervalVector {
    pub fn new(components: Vec<Interval>) -> Self {
        Self(components)
    }

    /// Degenerate (point) intervals from exact coordinates.
    pub fn from_points(values: &[f64]) -> Self {
        Self(values.iter().map(|&v| Interval::point(v)).collect())
    }

    /// Each coordinate widened by `±tol`.
    pub fn with_tolerance(values: &[f64], tol: f64) -> Self {
        Self(
            values
                .iter()
                .map(|&v| Interval::with_tolerance(v, tol))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Interval> {
        self.0.get(i).copied()
    }

    pub fn components(&self) -> &[Interval] {
        &self.0
    }

    fn check_len(&self, other: &Self, context: &'static str) -> FoundryResult<()> {
        if self.len() != other.len() {
            return Err(FoundryError::mismatch(context, self.len(), other.len()));
        }
        Ok(())
    }

    fn zip_with(
        &self,
        other: &Self,
        context: &'static str,
        op: impl Fn(&Interval, &Interval) -> Interval,
    ) -> FoundryResult<Self> {
        self.check_len(other, context)?;
        Ok(Self(
            self.0.iter().zip(&other.0).map(|(a, b)| op(a, b)).collect(),
        ))
    }

    pub fn add(&self, other: &Self) -> FoundryResult<Self> {
        self.zip_with(other, "vector add", Interval::add)
    }

    pub fn sub(&self, other: &Self) -> FoundryResult<Self> {
        self.zip_with(other, "vector sub", Interval::sub)
    }

    pub fn scale(&self, factor: &Interval) -> Self {
        Self(self.0.iter().map(|c| c.mul(factor)).collect())
    }

    pub fn dot(&self, other: &Self) -> FoundryResult<Interval> {
        self.check_len(other, "dot")?;
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .fold(Interval::point(0.0), |acc, (a, b)| acc.add(&a.mul(b))))
    }

    /// 3-D cross product.
    pub fn cross(&self, other: &Self) -> FoundryResult<Self> {
        if self.len() != 3 {
            return Err(FoundryError::mismatch("cross", 3, self.len()));
        }
        self.check_len(other, "cross")?;
        let (a, b) = (&self.0, &other.0);
        Ok(Self(vec![
            a[1].mul(&b[2]).sub(&a[2].mul(&b[1])),
            a[2].mul(&b[0]).sub(&a[0].mul(&b[2])),
            a[0].mul(&b[1]).sub(&a[1].mul(&b[0])),
        ]))
    }

    /// Euclidean length; squares via `pow(2)` so straddling components
    /// start at zero.
    pub fn length(&self) -> Interval {
        self.0
            .iter()
            .fold(Interval::point(0.0), |acc, c| acc.add(&c.pow(2)))
            .sqrt()
    }

    /// Unit direction; all-entire when the length may be zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len.is_undefined() || len.contains_zero() {
            return Self(vec![Interval::entire(); self.len()]);
        }
        Self(self.0.iter().map(|c| c.div(&len)).collect())
    }

    pub fn distance(&self, other: &Self) -> FoundryResult<Interval> {
        Ok(self.sub(other)?.length())
    }
}

/// Row-major `rows × cols` grid of intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Interval>,
}

impl IntervalMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<Interval>) -> FoundryResult<Self> {
        if data.len() != rows * cols {
            return Err(FoundryError::mismatch("matrix data", rows * cols, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    /// Point matrix from row-major values.
    pub fn from_values(rows: usize, cols: usize, values: &[f64]) -> FoundryResult<Self> {
        Self::new(
            rows,
            cols,
            values.iter().map(|&v| Interval::point(v)).collect(),
        )
    }

    pub fn identity(n: usize) -> Self {
        let mut data = vec![Interval::point(0.0); n * n];
        for i in 0..n {
            data[i * n + i] = Interval::point(1.0);
        }
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> Option<Interval> {
        if r < self.rows && c < self.cols {
            Some(self.data[r * self.cols + c])
        } else {
            None
        }
    }

    pub fn add(&self, other: &Self) -> FoundryResult<Self> {
        if self.rows != other.rows {
            return Err(FoundryError::mismatch("matrix add rows", self.rows, other.rows));
        }
        if self.cols != other.cols {
            return Err(FoundryError::mismatch("matrix add cols", self.cols, other.cols));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a.add(b))
                .collect(),
        })
    }

    pub fn mul(&self, other: &Self) -> FoundryResult<Self> {
        if self.cols != other.rows {
            return Err(FoundryError::mismatch("matrix mul", self.cols, other.rows));
        }
        let (n, m, p) = (self.rows, self.cols, other.cols);
        let mut data = Vec::with_capacity(n * p);
        for i in 0..n {
            for j in 0..p {
                let mut acc = Interval::point(0.0);
                for k in 0..m {
                    acc = acc.add(&self.data[i * m + k].mul(&other.data[k * p + j]));
                }
                data.push(acc);
            }
        }
        Ok(Self {
            rows: n,
            cols: p,
            data,
        })
    }

    pub fn mul_vector(&self, v: &IntervalVector) -> FoundryResult<IntervalVector> {
        if self.cols != v.len() {
            return Err(FoundryError::mismatch("matrix-vector", self.cols, v.len()));
        }
        let out = (0..self.rows)
            .map(|i| {
                self.data[i * self.cols..(i + 1) * self.cols]
                    .iter()
                    .zip(v.components())
                    .fold(Interval::point(0.0), |acc, (a, b)| acc.add(&a.mul(b)))
            })
            .collect();
        Ok(IntervalVector::new(out))
    }

    /// Apply a 4×4 homogeneous transform to a 3-D point.
    ///
    /// The result is divided by `w` unless `w` is exactly `[1, 1]`.
    pub fn transform_point(&self, p: &IntervalVector) -> FoundryResult<IntervalVector> {
        if self.rows != 4 || self.cols != 4 {
            return Err(FoundryError::Validation(format!(
                "transform_point needs a 4x4 matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        if p.len() != 3 {
            return Err(FoundryError::mismatch("transform_point", 3, p.len()));
        }
        let mut h = p.components().to_vec();
        h.push(Interval::point(1.0));
        let r = self.mul_vector(&IntervalVector::new(h))?;
        let c = r.components();
        let w = c[3];
        if w.lo() == 1.0 && w.hi() == 1.0 {
            return Ok(IntervalVector::new(c[..3].to_vec()));
        }
        Ok(IntervalVector::new(c[..3].iter().map(|x| x.div(&w)).collect()))
    }
}
