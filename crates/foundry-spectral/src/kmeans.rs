// ─────────────────────────────────────────────────────────────────────
// Foundry Numerics — k-means
// ─────────────────────────────────────────────────────────────────────
//! k-means++ seeding followed by Lloyd iteration.

use log::debug;
use serde::{Deserialize, Serialize};

use foundry_types::{FoundryError, FoundryResult, NumericalWarning, NumericsConfig, SimpleRng};

const LOG_TARGET: &str = "foundry_spectral::kmeans";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansOptions {
    /// Lloyd iteration cap.
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self::from_config(&NumericsConfig::default())
    }
}

impl KMeansOptions {
    pub fn from_config(config: &NumericsConfig) -> Self {
        Self {
            max_iterations: config.kmeans_max_iterations,
            seed: config.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansResult {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
    pub iterations: usize,
    /// Assignments stopped changing before the cap.
    pub converged: bool,
    pub warnings: Vec<NumericalWarning>,
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and squared distance of the nearest centroid; ties go to the
/// lower index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let d = sq_dist(point, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

/// Seeding: first centre uniform, each further centre drawn with
/// probability ∝ squared distance to the nearest chosen centre.
fn plus_plus_seeds(points: &[Vec<f64>], k: usize, rng: &mut SimpleRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = vec![points[rng.next_index(n)].clone()];
    let mut d2: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();
    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.next_f64() * total;
            let mut acc = 0.0;
            let mut pick = n - 1;
            for (i, &d) in d2.iter().enumerate() {
                acc += d;
                if acc > target {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // every point coincides with a centre already
            rng.next_index(n)
        };
        let centre = points[pick].clone();
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, &centre));
        }
        centroids.push(centre);
    }
    centroids
}

/// Partition `points` into `k` clusters.
pub fn kmeans(points: &[Vec<f64>], k: usize, options: &KMeansOptions) -> FoundryResult<KMeansResult> {
    let n = points.len();
    if n == 0 {
        return Err(FoundryError::EmptyInput("k-means points".into()));
    }
    if k == 0 || k > n {
        return Err(FoundryError::InvalidClusterCount { k, nodes: n });
    }
    let dim = points[0].len();
    if let Some(bad) = points.iter().find(|p| p.len() != dim) {
        return Err(FoundryError::mismatch("k-means point dimension", dim, bad.len()));
    }

    let mut rng = SimpleRng::new(options.seed);
    let mut centroids = plus_plus_seeds(points, k, &mut rng);
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids).0).collect();
    let mut warnings: Vec<NumericalWarning> = Vec::new();
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        // Update: mean of members; an empty cluster keeps its centre
        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (p, &c) in points.iter().zip(&labels) {
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(p) {
                *s += x;
            }
        }
        for c in 0..k {
            if counts[c] == 0 {
                let w = NumericalWarning::EmptyCluster { cluster: c };
                if !warnings.contains(&w) {
                    warnings.push(w.emit(LOG_TARGET));
                }
                continue;
            }
            let inv = 1.0 / counts[c] as f64;
            for (m, s) in centroids[c].iter_mut().zip(&sums[c]) {
                *m = s * inv;
            }
        }

        // Assign
        let mut changed = false;
        for (label, p) in labels.iter_mut().zip(points) {
            let (c, _) = nearest(p, &centroids);
            if c != *label {
                *label = c;
                changed = true;
            }
        }
        if !changed {
            converged = true;
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &c)| sq_dist(p, &centroids[c]))
        .sum();
    debug!("k-means k={k} n={n}: {iterations} iterations, inertia {inertia:.4e}");
    Ok(KMeansResult {
        labels,
        centroids,
        inertia,
        iterations,
        converged,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        let mut pts = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)] {
            for i in 0..5 {
                let t = i as f64 * 0.1;
                pts.push(vec![cx + t, cy - t]);
            }
        }
        pts
    }

    #[test]
    fn test_separates_blobs() {
        let pts = blobs();
        let r = kmeans(&pts, 3, &KMeansOptions::default()).unwrap();
        assert!(r.converged);
        for blob in 0..3 {
            let first = r.labels[blob * 5];
            assert!(r.labels[blob * 5..blob * 5 + 5].iter().all(|&l| l == first));
        }
        assert_ne!(r.labels[0], r.labels[5]);
        assert_ne!(r.labels[5], r.labels[10]);
        assert!(r.inertia < 1.0, "inertia {}", r.inertia);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let pts = blobs();
        let a = kmeans(&pts, 3, &KMeansOptions::default()).unwrap();
        let b = kmeans(&pts, 3, &KMeansOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_points_leave_empty_cluster() {
        let pts = vec![vec![1.0, 1.0]; 4];
        let r = kmeans(&pts, 2, &KMeansOptions::default()).unwrap();
        assert!(r.labels.iter().all(|&l| l == 0));
        assert_eq!(r.inertia, 0.0);
        assert!(r
            .warnings
            .contains(&NumericalWarning::EmptyCluster { cluster: 1 }));
    }

    #[test]
    fn test_invalid_k() {
        let pts = blobs();
        assert!(matches!(
            kmeans(&pts, 0, &KMeansOptions::default()),
            Err(FoundryError::InvalidClusterCount { k: 0, .. })
        ));
        assert!(kmeans(&pts, 16, &KMeansOptions::default()).is_err());
        assert!(kmeans(&[], 1, &KMeansOptions::default()).is_err());
        assert!(kmeans(&[vec![1.0], vec![1.0, 2.0]], 1, &KMeansOptions::default()).is_err());
    }
}
