// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — Symmetric Eigensolvers
// ─────────────────────────────────────────────────────────────────────
//! Smallest eigenpairs of a symmetric matrix, optionally restricted to the
//! orthogonal complement of caller-supplied deflation vectors.
//!
//! Two solvers share one contract (ascending eigenvalues, orthonormal
//! eigenvectors):
//!
//! - `PowerIteration` (default): power iteration on `shift·I − M` with
//!   `shift = max(max diagonal + 1, Gershgorin bound)`, two Gram-Schmidt
//!   passes per step against the deflation set and the pairs found so far.
//!   O(k·iterations·n²). Slow for clustered eigenvalues; a pair that misses
//!   the tolerance is still returned and an `EigenNotConverged` warning is
//!   attached.
//! - `Jacobi`: cyclic plane rotations on the projected matrix, every pair
//!   at once. O(n³·sweeps); hitting the sweep cap is reported the same way.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig, SimpleRng};

const LOG_TARGET: &str = "foundry_spectral::eigen";

/// Below this norm an iterate is treated as annihilated.
const VANISHING_NORM: f64 = 1e-300;

/// Restarts allowed when a random start vector lies in the found span.
const START_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EigenSolver {
    #[default]
    PowerIteration,
    Jacobi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenOptions {
    pub solver: EigenSolver,
    /// Power-iteration cap per eigenpair.
    pub max_iterations: usize,
    /// Stop when ‖v_new − v‖ falls below this.
    pub tolerance: f64,
    /// Seeds the start vectors.
    pub seed: u64,
}

impl Default for EigenOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl EigenOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            solver: EigenSolver::PowerIteration,
            max_iterations: config.eigen_max_iterations,
            tolerance: config.eigen_tolerance,
            seed: config.seed,
        }
    }

    pub fn jacobi(mut self) -> Self {
        self.solver = EigenSolver::Jacobi;
        self
    }
}

/// Eigenpairs in ascending eigenvalue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenDecomposition {
    pub values: Vec<f64>,
    /// `vectors[i]` belongs to `values[i]`; unit norm, mutually orthogonal.
    pub vectors: Vec<Vec<f64>>,
    pub warnings: Vec<NumericalWarning>,
}

impl EigenDecomposition {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn converged(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, NumericalWarning::EigenNotConverged { .. }))
    }
}

/// The `k` smallest eigenpairs of the symmetric n×n row-major `matrix`.
pub fn smallest_eigenpairs(
    matrix: &[f64],
    n: usize,
    k: usize,
    options: &EigenOptions,
) -> FoundryResult<EigenDecomposition> {
    smallest_eigenpairs_deflated(matrix, n, k, &[], options)
}

/// The `k` smallest eigenpairs on the orthogonal complement of `deflate`.
///
/// `deflate` need not be orthonormal; it is orthonormalised first and
/// vectors already in its span are dropped.
pub fn smallest_eigenpairs_deflated(
    matrix: &[f64],
    n: usize,
    k: usize,
    deflate: &[Vec<f64>],
    options: &EigenOptions,
) -> FoundryResult<EigenDecomposition> {
    if matrix.len() != n * n {
        return Err(FoundryError::mismatch("eigen matrix", n * n, matrix.len()));
    }
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(deflate.len() + k);
    for v in deflate {
        if v.len() != n {
            return Err(FoundryError::mismatch("deflation vector", n, v.len()));
        }
        let mut u = v.clone();
        orthogonalize(&mut u, &basis);
        orthogonalize(&mut u, &basis);
        if normalize(&mut u) > 1e-12 {
            basis.push(u);
        }
    }
    if basis.len() + k > n {
        return Err(FoundryError::Validation(format!(
            "requested {k} eigenpairs beyond {} deflated directions of a {n}x{n} matrix",
            basis.len()
        )));
    }
    if k == 0 {
        return Ok(EigenDecomposition {
            values: Vec::new(),
            vectors: Vec::new(),
            warnings: Vec::new(),
        });
    }
    match options.solver {
        EigenSolver::PowerIteration => power_iteration(matrix, n, k, basis, options),
        EigenSolver::Jacobi => Ok(jacobi_projected(matrix, n, k, &basis)),
    }
}

/// Algebraic connectivity (second-smallest eigenvalue).
pub fn fiedler_value(eigenvalues: &[f64]) -> f64 {
    eigenvalues.get(1).copied().unwrap_or(0.0)
}

/// Ratio λ₁/λ₂ of the two smallest non-trivial eigenvalues; 0 when
/// undefined.
pub fn spectral_gap(eigenvalues: &[f64]) -> f64 {
    if eigenvalues.len() < 3 || eigenvalues[2] < 1e-12 {
        return 0.0;
    }
    eigenvalues[1] / eigenvalues[2]
}

// ── Power iteration ─────────────────────────────────────────────────

fn power_iteration(
    matrix: &[f64],
    n: usize,
    k: usize,
    mut basis: Vec<Vec<f64>>,
    options: &EigenOptions,
) -> FoundryResult<EigenDecomposition> {
    let shift = shift_bound(matrix, n);
    let mut rng = SimpleRng::new(options.seed);
    let mut pairs: Vec<(f64, Vec<f64>)> = Vec::with_capacity(k);
    let mut warnings = Vec::new();

    for index in 0..k {
        let mut v = random_start(n, &basis, &mut rng).ok_or_else(|| {
            FoundryError::Validation(format!(
                "no start vector orthogonal to {} found directions",
                basis.len()
            ))
        })?;
        let mut converged = false;
        let mut iterations = 0;
        let mut w = vec![0.0; n];
        while iterations < options.max_iterations {
            iterations += 1;
            // w = (shift·I − M) v
            for i in 0..n {
                let row = &matrix[i * n..(i + 1) * n];
                w[i] = shift * v[i] - dot(row, &v);
            }
            orthogonalize(&mut w, &basis);
            orthogonalize(&mut w, &basis);
            if normalize(&mut w) < VANISHING_NORM {
                // v sits in the null space of the shifted operator
                converged = true;
                break;
            }
            let diff = w
                .iter()
                .zip(&v)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            std::mem::swap(&mut v, &mut w);
            if diff < options.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            warnings.push(
                NumericalWarning::EigenNotConverged { index, iterations }.emit(LOG_TARGET),
            );
        }
        debug!("eigenpair {index}: {iterations} iterations, converged={converged}");
        let value = rayleigh_quotient(matrix, n, &v);
        basis.push(v.clone());
        pairs.push((value, v));
    }

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (values, vectors) = pairs.into_iter().unzip();
    Ok(EigenDecomposition {
        values,
        vectors,
        warnings,
    })
}

/// `max(max diagonal + 1, max absolute row sum)`, which bounds every
/// eigenvalue so `shift·I − M` is positive semidefinite.
fn shift_bound(matrix: &[f64], n: usize) -> f64 {
    let max_diag = (0..n)
        .map(|i| matrix[i * n + i])
        .fold(f64::NEG_INFINITY, f64::max);
    let gershgorin = matrix
        .chunks_exact(n)
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    (max_diag + 1.0).max(gershgorin)
}

fn random_start(n: usize, basis: &[Vec<f64>], rng: &mut SimpleRng) -> Option<Vec<f64>> {
    for _ in 0..START_ATTEMPTS {
        let mut v: Vec<f64> = (0..n).map(|_| rng.uniform(-1.0, 1.0)).collect();
        orthogonalize(&mut v, basis);
        orthogonalize(&mut v, basis);
        if normalize(&mut v) > 1e-8 {
            return Some(v);
        }
    }
    None
}

fn rayleigh_quotient(matrix: &[f64], n: usize, v: &[f64]) -> f64 {
    let mv: Vec<f64> = matrix.chunks_exact(n).map(|row| dot(row, v)).collect();
    dot(v, &mv) / dot(v, v)
}

// ── Jacobi ──────────────────────────────────────────────────────────

/// Sweep cap for the Jacobi solver.
const MAX_SWEEPS: usize = 64;

/// Off-diagonal Frobenius norm, relative to the whole matrix, at which
/// the Jacobi sweeps stop.
const JACOBI_TOLERANCE: f64 = 1e-14;

/// Eigenpairs of `P·M·P + c·(I − P)` with `P` the projector onto the
/// complement of `basis` and `c` above the spectrum of `M`, so the
/// deflated directions sort last.
///
/// Every sweep rotates each off-diagonal pair to zero and applies the
/// same rotation to the eigenvector columns. Hitting the sweep cap marks
/// every returned pair as not converged.
fn jacobi_projected(matrix: &[f64], n: usize, k: usize, basis: &[Vec<f64>]) -> EigenDecomposition {
    let mut a = projected_matrix(matrix, n, basis);
    let mut columns: Vec<Vec<f64>> = (0..n)
        .map(|j| {
            let mut e = vec![0.0; n];
            e[j] = 1.0;
            e
        })
        .collect();

    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);
    let mut sweeps = 0;
    let converged = loop {
        if off_diagonal_norm(&a, n) <= JACOBI_TOLERANCE * scale {
            break true;
        }
        if sweeps == MAX_SWEEPS {
            break false;
        }
        sweeps += 1;
        for p in 0..n {
            for q in (p + 1)..n {
                rotate_pair(&mut a, &mut columns, n, p, q);
            }
        }
    };
    debug!("jacobi: {sweeps} sweeps, converged={converged} (n={n})");

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[i * n + i].total_cmp(&a[j * n + j]));
    order.truncate(k);

    let warnings = if converged {
        Vec::new()
    } else {
        (0..k)
            .map(|index| {
                NumericalWarning::EigenNotConverged {
                    index,
                    iterations: sweeps,
                }
                .emit(LOG_TARGET)
            })
            .collect()
    };
    EigenDecomposition {
        values: order.iter().map(|&i| a[i * n + i]).collect(),
        vectors: order
            .iter()
            .map(|&i| std::mem::take(&mut columns[i]))
            .collect(),
        warnings,
    }
}

fn projected_matrix(matrix: &[f64], n: usize, basis: &[Vec<f64>]) -> Vec<f64> {
    if basis.is_empty() {
        return matrix.to_vec();
    }
    let c = shift_bound(matrix, n) + 1.0;
    let mut p = vec![0.0; n * n];
    for i in 0..n {
        p[i * n + i] = 1.0;
    }
    for u in basis {
        for i in 0..n {
            for j in 0..n {
                p[i * n + j] -= u[i] * u[j];
            }
        }
    }
    let mut a = mat_mul(&p, &mat_mul(matrix, &p, n), n);
    for i in 0..n {
        for j in 0..n {
            let ident = if i == j { 1.0 } else { 0.0 };
            a[i * n + j] += c * (ident - p[i * n + j]);
        }
    }
    a
}

fn off_diagonal_norm(a: &[f64], n: usize) -> f64 {
    let mut sum = 0.0;
    for p in 0..n {
        for q in (p + 1)..n {
            sum += a[p * n + q] * a[p * n + q];
        }
    }
    (2.0 * sum).sqrt()
}

/// One plane rotation zeroing `a[p][q]` (`p < q`), applied to `a` on both
/// sides and to the columns `p`, `q` of the accumulated eigenvectors.
fn rotate_pair(a: &mut [f64], columns: &mut [Vec<f64>], n: usize, p: usize, q: usize) {
    let apq = a[p * n + q];
    if apq == 0.0 {
        return;
    }
    let theta = (a[q * n + q] - a[p * n + p]) / (2.0 * apq);
    // t = tan of the rotation angle, the smaller root
    let t = if theta.abs() > 1e150 {
        0.5 / theta
    } else {
        theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
    };
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    for r in 0..n {
        if r == p || r == q {
            continue;
        }
        let arp = a[r * n + p];
        let arq = a[r * n + q];
        let rp = c * arp - s * arq;
        let rq = s * arp + c * arq;
        a[r * n + p] = rp;
        a[p * n + r] = rp;
        a[r * n + q] = rq;
        a[q * n + r] = rq;
    }
    a[p * n + p] -= t * apq;
    a[q * n + q] += t * apq;
    a[p * n + q] = 0.0;
    a[q * n + p] = 0.0;

    let (head, tail) = columns.split_at_mut(q);
    for (x, y) in head[p].iter_mut().zip(tail[0].iter_mut()) {
        let (xp, xq) = (*x, *y);
        *x = c * xp - s * xq;
        *y = s * xp + c * xq;
    }
}

fn mat_mul(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for l in 0..n {
            let ail = a[i * n + l];
            if ail == 0.0 {
                continue;
            }
            for j in 0..n {
                out[i * n + j] += ail * b[l * n + j];
            }
        }
    }
    out
}

// ── Vector helpers ──────────────────────────────────────────────────

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// One classical Gram-Schmidt pass against an orthonormal `basis`.
fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for u in basis {
        let proj = dot(v, u);
        for (x, ui) in v.iter_mut().zip(u) {
            *x -= proj * ui;
        }
    }
}

/// Scale to unit norm in place and return the original norm. Leaves
/// `v` untouched when the norm is zero.
fn normalize(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut m = vec![0.0; n * n];
        for (i, v) in values.iter().enumerate() {
            m[i * n + i] = *v;
        }
        m
    }

    fn test_matrix() -> Vec<f64> {
        vec![
            4.0, 1.0, 0.5, 0.2, //
            1.0, 3.0, 0.8, 0.3, //
            0.5, 0.8, 2.0, 0.1, //
            0.2, 0.3, 0.1, 1.0,
        ]
    }

    fn residual(m: &[f64], n: usize, value: f64, v: &[f64]) -> f64 {
        (0..n)
            .map(|i| {
                let r = dot(&m[i * n..(i + 1) * n], v) - value * v[i];
                r * r
            })
            .sum::<f64>()
            .sqrt()
    }

    fn both_solvers() -> [EigenOptions; 2] {
        [EigenOptions::default(), EigenOptions::default().jacobi()]
    }

    #[test]
    fn test_diagonal_eigenvalues_ascending() {
        let m = diag(&[3.0, 1.0, 4.0, 2.0]);
        for opts in both_solvers() {
            let eig = smallest_eigenpairs(&m, 4, 4, &opts).unwrap();
            for (i, v) in eig.values.iter().enumerate() {
                assert!(
                    (v - (i + 1) as f64).abs() < 1e-8,
                    "{:?}: eigval[{i}] = {v}",
                    opts.solver
                );
            }
            assert!(eig.converged());
        }
    }

    #[test]
    fn test_eigenvectors_orthonormal() {
        let m = test_matrix();
        for opts in both_solvers() {
            let eig = smallest_eigenpairs(&m, 4, 4, &opts).unwrap();
            for i in 0..4 {
                for j in 0..4 {
                    let d = dot(&eig.vectors[i], &eig.vectors[j]);
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!(
                        (d - expected).abs() < 1e-8,
                        "{:?}: V^T V[{i},{j}] = {d}",
                        opts.solver
                    );
                }
            }
        }
    }

    #[test]
    fn test_solvers_agree_and_pairs_satisfy_equation() {
        let m = test_matrix();
        let power = smallest_eigenpairs(&m, 4, 2, &EigenOptions::default()).unwrap();
        let jacobi = smallest_eigenpairs(&m, 4, 2, &EigenOptions::default().jacobi()).unwrap();
        for i in 0..2 {
            assert!((power.values[i] - jacobi.values[i]).abs() < 1e-8);
            assert!(residual(&m, 4, power.values[i], &power.vectors[i]) < 1e-6);
            assert!(residual(&m, 4, jacobi.values[i], &jacobi.vectors[i]) < 1e-10);
        }
        assert!(power.values[0] <= power.values[1]);
    }

    #[test]
    fn test_deflation_excludes_direction() {
        let m = diag(&[1.0, 2.0, 3.0]);
        let e0 = vec![1.0, 0.0, 0.0];
        for opts in both_solvers() {
            let eig = smallest_eigenpairs_deflated(&m, 3, 2, &[e0.clone()], &opts).unwrap();
            assert!((eig.values[0] - 2.0).abs() < 1e-8, "{:?}", opts.solver);
            assert!((eig.values[1] - 3.0).abs() < 1e-8);
            assert!(dot(&eig.vectors[0], &e0).abs() < 1e-8);
        }
    }

    #[test]
    fn test_too_many_pairs_rejected() {
        let m = diag(&[1.0, 2.0]);
        let r = smallest_eigenpairs_deflated(&m, 2, 2, &[vec![1.0, 1.0]], &EigenOptions::default());
        assert!(matches!(r, Err(FoundryError::Validation(_))));
        assert!(smallest_eigenpairs(&m, 3, 1, &EigenOptions::default()).is_err());
        assert!(smallest_eigenpairs(&m, 2, 0, &EigenOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_iteration_cap_records_warning() {
        // Nearly equal eigenvalues stall power iteration
        let m = diag(&[1.0, 1.0 + 1e-9, 5.0]);
        let opts = EigenOptions {
            max_iterations: 3,
            ..EigenOptions::default()
        };
        let eig = smallest_eigenpairs(&m, 3, 3, &opts).unwrap();
        assert!(!eig.converged());
        assert_eq!(eig.len(), 3);
        // Rayleigh quotients stay inside the spectrum
        assert!(eig.values.iter().all(|v| (1.0 - 1e-9..=5.0 + 1e-9).contains(v)));
    }

    #[test]
    fn test_fiedler_and_gap() {
        assert_eq!(fiedler_value(&[0.0, 0.5, 1.0]), 0.5);
        assert_eq!(fiedler_value(&[0.0]), 0.0);
        assert!((spectral_gap(&[0.0, 0.5, 1.0]) - 0.5).abs() < 1e-12);
        assert_eq!(spectral_gap(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_jacobi_preserves_trace_and_converges() {
        let n = 6;
        let mut rng = SimpleRng::new(7);
        let mut m = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let x = rng.uniform(-2.0, 2.0);
                m[i * n + j] = x;
                m[j * n + i] = x;
            }
        }
        let trace: f64 = (0..n).map(|i| m[i * n + i]).sum();
        let eig = smallest_eigenpairs(&m, n, n, &EigenOptions::default().jacobi()).unwrap();
        assert!(eig.converged());
        assert!(eig.warnings.is_empty());
        assert!((eig.values.iter().sum::<f64>() - trace).abs() < 1e-10);
        for (value, v) in eig.values.iter().zip(&eig.vectors) {
            assert!(residual(&m, n, *value, v) < 1e-10);
        }
        assert!(eig.values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_shift_bound_covers_spectrum() {
        let m = test_matrix();
        let shift = shift_bound(&m, 4);
        let eig = smallest_eigenpairs(&m, 4, 4, &EigenOptions::default().jacobi()).unwrap();
        assert!(eig.values.iter().all(|&v| v <= shift));
    }
}
