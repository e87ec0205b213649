//! Stochastic draws used by the acquisition paths.
//!
//! All sampling goes through the engine's single ChaCha RNG so that a
//! seeded engine is fully reproducible. The helpers here guard the
//! degenerate parameter ranges (zero means, empty weight vectors) that
//! the physics regularly produces, e.g. with the laser off.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Exp, Normal, Poisson};

/// Draws from Poisson(mean); 0 for non-positive means.
pub fn poisson(rng: &mut impl Rng, mean: f64) -> u64 {
    if mean <= 0.0 {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(dist) => dist.sample(rng) as u64,
        Err(_) => 0,
    }
}

/// Draws one Gaussian with the given standard deviation, centered at 0.
pub fn gaussian_jitter(rng: &mut impl Rng, sigma: f64) -> f64 {
    match Normal::new(0.0, sigma) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}

/// Draws `count` exponential inter-arrival gaps at the given rate (Hz)
/// and cumulative-sums them into arrival times in seconds.
pub fn arrival_times_s(rng: &mut impl Rng, rate_hz: f64, count: usize) -> Vec<f64> {
    let dist = match Exp::new(rate_hz) {
        Ok(d) => d,
        Err(_) => return Vec::new(),
    };
    let mut t = 0.0;
    (0..count)
        .map(|_| {
            t += dist.sample(rng);
            t
        })
        .collect()
}

/// Samples a multinomial distribution over `weights` with `trials` draws.
///
/// Weights need not sum to 1; trials are apportioned by relative weight
/// via conditional binomials. Returns one count per weight, summing to
/// `trials` whenever the total weight is positive.
pub fn multinomial(rng: &mut impl Rng, trials: u64, weights: &[f64]) -> Vec<u64> {
    let mut counts = vec![0u64; weights.len()];
    let mut remaining = trials;
    let mut weight_left: f64 = weights.iter().sum();

    for (slot, &w) in counts.iter_mut().zip(weights.iter()) {
        if remaining == 0 || weight_left <= 0.0 {
            break;
        }
        let p = (w / weight_left).clamp(0.0, 1.0);
        let draw = if p >= 1.0 {
            remaining
        } else {
            match Binomial::new(remaining, p) {
                Ok(dist) => dist.sample(rng),
                Err(_) => 0,
            }
        };
        *slot = draw;
        remaining -= draw;
        weight_left -= w;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn test_poisson_zero_mean() {
        assert_eq!(poisson(&mut rng(), 0.0), 0);
        assert_eq!(poisson(&mut rng(), -3.0), 0);
    }

    #[test]
    fn test_poisson_mean_tracks_parameter() {
        let mut r = rng();
        let n = 2000;
        let total: u64 = (0..n).map(|_| poisson(&mut r, 50.0)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 50.0).abs() < 1.0, "sample mean {mean}");
    }

    #[test]
    fn test_multinomial_conserves_trials() {
        let mut r = rng();
        let counts = multinomial(&mut r, 10_000, &[0.2, 0.3, 0.5]);
        assert_eq!(counts.iter().sum::<u64>(), 10_000);
    }

    #[test]
    fn test_multinomial_respects_weights() {
        let mut r = rng();
        let counts = multinomial(&mut r, 100_000, &[0.1, 0.9]);
        let frac = counts[0] as f64 / 100_000.0;
        assert!((frac - 0.1).abs() < 0.01, "fraction {frac}");
    }

    #[test]
    fn test_multinomial_zero_weight_slot_gets_nothing() {
        let mut r = rng();
        let counts = multinomial(&mut r, 1000, &[0.5, 0.0, 0.5]);
        assert_eq!(counts[1], 0);
        assert_eq!(counts.iter().sum::<u64>(), 1000);
    }

    #[test]
    fn test_arrival_times_are_increasing() {
        let mut r = rng();
        let times = arrival_times_s(&mut r, 1e5, 500);
        assert_eq!(times.len(), 500);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(times[0] > 0.0);
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let a = multinomial(&mut rng(), 1000, &[0.3, 0.7]);
        let b = multinomial(&mut rng(), 1000, &[0.3, 0.7]);
        assert_eq!(a, b);
    }
}
