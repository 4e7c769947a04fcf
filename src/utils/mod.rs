//! Matrix helpers: logistic activation, Bernoulli sampling, bias columns,
//! and random-matrix constructors.
//!
//! Everything stochastic takes an explicit `Rng` handle. The Bernoulli
//! sampler consumes exactly one uniform draw per matrix element, so a
//! seeded generator reproduces the same samples bit for bit.

use ndarray::{Array2, Zip};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;

/// Elementwise logistic sigmoid: `1 / (1 + e^-x)`.
///
/// Output is always in (0, 1), which bounds the activations fed back into
/// the weight products during training.
#[inline]
pub fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Apply the logistic sigmoid to every element of a matrix.
pub fn logistic_matrix(x: &Array2<f32>) -> Array2<f32> {
    x.mapv(logistic)
}

/// Sample binary unit states from a matrix of activation probabilities.
///
/// Each unit is compared against an independent uniform draw in [0, 1):
/// the state is 1 where the probability exceeds the draw, else 0. This is
/// true Bernoulli sampling, not rounding — a unit with probability 0.7 is
/// on in roughly 70% of samples.
pub fn bernoulli_sample<R: Rng + ?Sized>(probs: &Array2<f32>, rng: &mut R) -> Array2<f32> {
    let noise = Array2::random_using(probs.raw_dim(), Uniform::new(0.0f32, 1.0), rng);
    let mut states = Array2::zeros(probs.raw_dim());
    Zip::from(&mut states)
        .and(probs)
        .and(&noise)
        .for_each(|s, &p, &u| *s = if p > u { 1.0 } else { 0.0 });
    states
}

/// Prepend a constant column of 1s (the bias input) to a matrix.
pub fn insert_bias_column(data: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = data.dim();
    let mut out = Array2::ones((rows, cols + 1));
    out.slice_mut(ndarray::s![.., 1..]).assign(data);
    out
}

/// Drop the first (bias) column of a matrix.
pub fn strip_bias_column(data: &Array2<f32>) -> Array2<f32> {
    data.slice(ndarray::s![.., 1..]).to_owned()
}

/// A matrix of independent draws from N(0, 1).
pub fn gaussian_random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Array2<f32> {
    let normal = Normal::new(0.0f32, 1.0).expect("standard normal parameters are valid");
    Array2::random_using((rows, cols), normal, rng)
}

/// A matrix of independent uniform draws in [0, 1).
pub fn uniform_random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Array2<f32> {
    Array2::random_using((rows, cols), Uniform::new(0.0f32, 1.0), rng)
}

/// A random binary matrix with p = 0.5 per element.
pub fn uniform_random_bool<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Array2<f32> {
    uniform_random(rows, cols, rng).mapv(|u| if u < 0.5 { 0.0 } else { 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_logistic_values() {
        assert_abs_diff_eq!(logistic(0.0), 0.5, epsilon = 1e-6);
        assert!(logistic(10.0) > 0.999);
        assert!(logistic(-10.0) < 0.001);
        // Bounded even for extreme inputs.
        assert_eq!(logistic(1000.0), 1.0);
        assert_eq!(logistic(-1000.0), 0.0);
    }

    #[test]
    fn test_logistic_matrix_shape_and_range() {
        let x = ndarray::arr2(&[[-3.0, 0.0, 3.0], [100.0, -100.0, 1.0]]);
        let y = logistic_matrix(&x);
        assert_eq!(y.dim(), (2, 3));
        for &v in y.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_abs_diff_eq!(y[[0, 1]], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        // Probability 1 always beats a draw from [0, 1); probability 0 never does.
        let ones = Array2::from_elem((5, 5), 1.0f32);
        let zeros = Array2::zeros((5, 5));
        assert!(bernoulli_sample(&ones, &mut rng).iter().all(|&v| v == 1.0));
        assert!(bernoulli_sample(&zeros, &mut rng).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bernoulli_is_binary_and_seeded() {
        let probs = {
            let mut rng = StdRng::seed_from_u64(11);
            uniform_random(8, 6, &mut rng)
        };

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = bernoulli_sample(&probs, &mut rng_a);
        let b = bernoulli_sample(&probs, &mut rng_b);

        assert_eq!(a, b);
        assert!(a.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_bias_column_round_trip() {
        let data = ndarray::arr2(&[[0.2, 0.4], [0.6, 0.8]]);
        let with_bias = insert_bias_column(&data);

        assert_eq!(with_bias.dim(), (2, 3));
        assert!(with_bias.column(0).iter().all(|&v| v == 1.0));
        assert_eq!(strip_bias_column(&with_bias), data);
    }

    #[test]
    fn test_random_constructors() {
        let mut rng = StdRng::seed_from_u64(3);

        let u = uniform_random(4, 4, &mut rng);
        assert!(u.iter().all(|&v| (0.0..1.0).contains(&v)));

        let b = uniform_random_bool(4, 4, &mut rng);
        assert!(b.iter().all(|&v| v == 0.0 || v == 1.0));

        let g = gaussian_random(10, 10, &mut rng);
        assert_eq!(g.dim(), (10, 10));
        // Standard normal draws essentially never all land in one tail.
        assert!(g.iter().any(|&v| v < 0.0) && g.iter().any(|&v| v > 0.0));
    }
}
