//! Calibration of the 95% predictive interval on data drawn from the
//! model's own prior.

use foundry_gp::{train, Cholesky, Kernel, TrainOptions};
use foundry_types::SimpleRng;

const N_TRAIN: usize = 30;
const N_TEST: usize = 20;
const TRIALS: usize = 40;

/// Draw `y ~ N(0, K(X, X) + σₙ²I)` through a Cholesky factor.
fn sample_joint(xs: &[Vec<f64>], kernel: &Kernel, noise: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let n = xs.len();
    let mut k = kernel.gram(xs);
    for i in 0..n {
        k[i * n + i] += noise;
    }
    let chol = Cholesky::factor(&k, n, 1e-10);
    assert!(chol.warnings().is_empty());
    let l = chol.factor_matrix();
    let z: Vec<f64> = (0..n).map(|_| rng.next_normal()).collect();
    (0..n)
        .map(|i| (0..=i).map(|j| l[i * n + j] * z[j]).sum())
        .collect()
}

#[test]
fn gp_95_interval_covers_about_95_percent() {
    let kernel = Kernel::rbf(1.0, 1.5);
    let noise = 0.01;
    let options = TrainOptions::with_noise(noise);
    let mut rng = SimpleRng::new(2024);

    let mut hits = 0usize;
    let mut total = 0usize;
    for _ in 0..TRIALS {
        let xs: Vec<Vec<f64>> = (0..N_TRAIN + N_TEST)
            .map(|_| vec![rng.uniform(0.0, 10.0)])
            .collect();
        let ys = sample_joint(&xs, &kernel, noise, &mut rng);

        let model = train(&xs[..N_TRAIN], &ys[..N_TRAIN], kernel, &options).unwrap();
        for (x, y) in xs[N_TRAIN..].iter().zip(&ys[N_TRAIN..]) {
            let p = model.predict_observed(x).unwrap();
            if p.ci95.contains(*y) {
                hits += 1;
            }
            total += 1;
        }
    }

    let coverage = hits as f64 / total as f64;
    assert!(
        (0.88..=0.995).contains(&coverage),
        "95% interval coverage = {coverage:.3} over {total} points"
    );
}

#[test]
fn latent_interval_narrower_than_observed() {
    let xs: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
    let ys: Vec<f64> = xs.iter().map(|x| x[0].cos()).collect();
    let model = train(&xs, &ys, Kernel::rbf(1.0, 1.5), &TrainOptions::with_noise(0.05)).unwrap();
    let latent = model.predict(&[vec![4.5]]).unwrap()[0];
    let observed = model.predict_observed(&[4.5]).unwrap();
    assert!(latent.ci95.upper - latent.ci95.lower < observed.ci95.upper - observed.ci95.lower);
}
