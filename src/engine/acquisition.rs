//! The aggregate-count acquisition path.
//!
//! One `read` draws the total number of generated pairs, distributes them
//! over the observable detection patterns (quantum probabilities degraded
//! by per-channel Bernoulli loss), then layers on dark counts and
//! pairwise accidental coincidences. The result replaces the engine's
//! pattern memory wholesale.

use super::memory::{Pattern, SimulationMemory};
use super::sampling;
use super::TaggerEngine;
use crate::source::Mat4;
use std::collections::BTreeMap;

/// Ideal outcomes below this probability are discarded.
const IDEAL_PROB_CUTOFF: f64 = 1e-9;

/// One joint measurement outcome before detector loss.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IdealOutcome {
    /// The channel each party's click would land on.
    pub channels: [u8; 2],
    /// `Re[Tr(ρ · E_a ⊗ E_b)]`.
    pub probability: f64,
}

impl TaggerEngine {
    /// Joint outcome probabilities for the current state and waveplates.
    ///
    /// The quantum term is defined for exactly two parties (the state is
    /// a two-photon density matrix); any other party count yields an
    /// empty table and only noise terms survive.
    pub(crate) fn ideal_outcomes(&self) -> Vec<IdealOutcome> {
        if self.parties.len() != 2 {
            tracing::warn!(
                parties = self.parties.len(),
                "quantum term requires exactly two parties, skipping"
            );
            return Vec::new();
        }
        let rho = self.source.density_matrix();
        let (alice, bob) = (&self.parties[0], &self.parties[1]);

        let mut outcomes = Vec::with_capacity(4);
        for outcome_a in 0..2 {
            for outcome_b in 0..2 {
                let joint = Mat4::kron(alice.operator(outcome_a), bob.operator(outcome_b));
                outcomes.push(IdealOutcome {
                    channels: [
                        alice.channels()[outcome_a],
                        bob.channels()[outcome_b],
                    ],
                    probability: rho.expectation(&joint),
                });
            }
        }
        outcomes
    }

    /// Per-pattern detection probabilities after Bernoulli loss masking.
    ///
    /// Every ideal outcome is split over the 2^2 detected/undetected masks
    /// of its two channels; masks with no surviving channel are invisible
    /// and contribute only to the no-click residual.
    fn observable_distribution(&self) -> Vec<(Pattern, f64)> {
        let mut acc: BTreeMap<Pattern, f64> = BTreeMap::new();

        for outcome in self.ideal_outcomes() {
            if outcome.probability <= IDEAL_PROB_CUTOFF {
                continue;
            }
            let effs = outcome.channels.map(|ch| self.channels.efficiency(ch));

            for mask in 0u8..4 {
                let mut p_loss = 1.0;
                let mut detected = Vec::new();
                for (k, (&ch, &eff)) in outcome.channels.iter().zip(effs.iter()).enumerate() {
                    if mask & (1 << k) != 0 {
                        p_loss *= eff;
                        detected.push(ch);
                    } else {
                        p_loss *= 1.0 - eff;
                    }
                }
                if !detected.is_empty() {
                    *acc.entry(Pattern::new(detected)).or_insert(0.0) +=
                        outcome.probability * p_loss;
                }
            }
        }
        acc.into_iter().collect()
    }

    /// All channels used by any party, ascending, deduplicated.
    pub(crate) fn active_channels(&self) -> Vec<u8> {
        let mut channels: Vec<u8> = self
            .parties
            .iter()
            .flat_map(|p| p.channels())
            .collect();
        channels.sort_unstable();
        channels.dedup();
        channels
    }

    /// Runs one acquisition of `duration_s` seconds.
    ///
    /// Replaces the pattern memory atomically; queries between two `read`
    /// calls always see one self-consistent acquisition.
    pub fn read(&mut self, duration_s: f64) {
        let mut memory = SimulationMemory::new(duration_s);

        let base_rate = self.base_pair_rate_hz();
        if base_rate > 0.0 {
            let total_pairs = sampling::poisson(&mut self.rng, base_rate * duration_s);
            if total_pairs > 0 {
                let observable = self.observable_distribution();
                if !observable.is_empty() {
                    let mut weights: Vec<f64> =
                        observable.iter().map(|(_, p)| *p).collect();
                    let mut total: f64 = weights.iter().sum();
                    if total > 1.0 {
                        for w in weights.iter_mut() {
                            *w /= total;
                        }
                        total = 1.0;
                    }
                    // No-click residual absorbs the remaining probability.
                    weights.push(1.0 - total);

                    let counts =
                        sampling::multinomial(&mut self.rng, total_pairs, &weights);
                    for ((pattern, _), &count) in observable.iter().zip(counts.iter()) {
                        memory.record(pattern.clone(), count);
                    }
                }
            }
        }

        // Dark counts, independent per active channel.
        let active = self.active_channels();
        let mean_dark = self.dark_rate_hz * duration_s;
        for &ch in &active {
            let n_dark = sampling::poisson(&mut self.rng, mean_dark);
            memory.record(Pattern::single(ch), n_dark);
        }

        // Accidental coincidences from the realized singles rates.
        // Totals are snapshotted before any accidental is added so that
        // accidentals never feed further accidentals.
        if duration_s > 0.0 {
            let totals: Vec<u64> =
                active.iter().map(|&ch| memory.channel_total(ch)).collect();
            let window_s = self.channels.window_ns * 1e-9;

            for i in 0..active.len() {
                for j in (i + 1)..active.len() {
                    if totals[i] == 0 || totals[j] == 0 {
                        continue;
                    }
                    let rate_a = totals[i] as f64 / duration_s;
                    let rate_b = totals[j] as f64 / duration_s;
                    let mean_acc = rate_a * rate_b * window_s * duration_s;
                    let n_acc = sampling::poisson(&mut self.rng, mean_acc);
                    memory.record(Pattern::pair(active[i], active[j]), n_acc);
                }
            }
        }

        tracing::debug!(
            duration_s,
            patterns = memory.len(),
            "acquisition complete"
        );
        self.memory = memory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FileConfig, PumpLaser, SimLaser, TaggerEngine};

    fn engine_with_laser(seed: u64, power_mw: f64) -> TaggerEngine {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), seed);
        let mut laser = SimLaser::new();
        laser.set_power_mw(power_mw);
        laser.set_emission(true);
        engine.attach_laser(Box::new(laser));
        engine
    }

    #[test]
    fn test_ideal_outcomes_sum_to_one() {
        let engine = engine_with_laser(3, 1.0);
        let total: f64 = engine.ideal_outcomes().iter().map(|o| o.probability).sum();
        assert!((total - 1.0).abs() < 1e-9, "outcome probabilities sum to {total}");
    }

    #[test]
    fn test_laser_off_leaves_only_noise_patterns() {
        // With no pair generation, every stored pattern must be a dark
        // single or a pairwise accidental.
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 5);
        engine.read(1.0);

        assert!(!engine.memory().is_empty());
        for (pattern, _) in engine.memory().iter() {
            assert!(
                pattern.channels().len() <= 2,
                "unexpected pattern {:?} without a laser",
                pattern
            );
        }
    }

    #[test]
    fn test_dark_counts_near_expected_rate() {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 8);
        engine.read(10.0);
        // 1500 Hz for 10 s, Poisson; allow generous statistical slack.
        let singles = engine.memory().superset_sum(&[1]);
        assert!((10_000..20_000).contains(&singles), "singles {singles}");
    }

    #[test]
    fn test_quantum_coincidences_follow_the_state() {
        // At pump angle 0 the state is essentially |HV⟩: Alice clicks H
        // (channel 1), Bob clicks V (channel 4). The opposite pairing only
        // arises from the noise terms.
        let mut engine = engine_with_laser(11, 1.0);
        engine.read(1.0);

        let bright = engine.memory().superset_sum(&[1, 4]);
        let dim = engine.memory().superset_sum(&[2, 3]);
        assert!(bright > 1000, "expected strong HV coincidences, got {bright}");
        assert!(bright > 5 * dim.max(1), "bright {bright}, dim {dim}");
    }

    #[test]
    fn test_memory_replaced_not_merged() {
        let mut engine = engine_with_laser(13, 1.0);
        engine.read(1.0);
        let first = engine.memory().superset_sum(&[]);

        engine.laser_mut().expect("laser").set_emission(false);
        engine.read(1.0);
        let second = engine.memory().superset_sum(&[]);
        // A merged memory would keep the large quantum-term total; a
        // laser-off read holds only dark counts and accidentals.
        assert!(second < first / 5, "first {first}, second {second}");
    }

    #[test]
    fn test_zero_duration_read_is_empty_but_valid() {
        let mut engine = engine_with_laser(17, 1.0);
        engine.read(0.0);
        assert!(engine.memory().is_empty());
        assert_eq!(engine.memory().duration_s(), 0.0);
    }

    #[test]
    fn test_accidental_rate_converges() {
        // With the laser off and lights on, singles are pure dark counts
        // at λ = 21 700 Hz. The expected accidentals per channel pair and
        // 1 s read are λ²·w = 21 700² · 3 ns ≈ 1.413.
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 19);
        engine.set_ambient_light(true);

        let reads = 2_000;
        let mut accidentals = 0u64;
        for _ in 0..reads {
            engine.read(1.0);
            for (pattern, count) in engine.memory().iter() {
                if pattern.channels().len() == 2 {
                    accidentals += count;
                }
            }
        }

        // 6 channel pairs over {1, 2, 3, 4}.
        let expected = 6.0 * 21_700.0_f64.powi(2) * 3.0e-9 * reads as f64;
        let observed = accidentals as f64;
        let relative = (observed - expected).abs() / expected;
        assert!(
            relative < 0.1,
            "observed {observed}, expected {expected}, relative error {relative}"
        );
    }
}
