//! Count queries against the last acquisition.
//!
//! A query sums every stored pattern containing the requested channels,
//! so singles queries include coincidence events and a pair query counts
//! higher-order patterns too. Two-channel queries additionally pay a
//! Gaussian overlap penalty for mismatched channel delays, modeling
//! coincidences that drift out of the window.

use super::TaggerEngine;
use crate::JITTER_SIGMA_NS;

/// Overlap factors below this are treated as exactly zero.
const OVERLAP_CUTOFF: f64 = 1e-5;

/// Result of one count query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountData {
    /// Duration of the acquisition the counts came from (seconds).
    pub duration_s: f64,
    /// Observed counts after the delay-overlap penalty.
    pub count: u64,
    /// `count / duration`, 0 when the duration is 0.
    pub rate_hz: f64,
}

impl TaggerEngine {
    /// Counts (and rate) over all patterns containing `channels`.
    pub fn get_count_data(&self, channels: &[u8]) -> CountData {
        let mut overlap = 1.0;
        if let [ch_a, ch_b] = channels {
            let delta = self.channels.delay_ns(*ch_a) - self.channels.delay_ns(*ch_b);
            overlap = (-(delta * delta) / (2.0 * JITTER_SIGMA_NS * JITTER_SIGMA_NS)).exp();
            if overlap < OVERLAP_CUTOFF {
                overlap = 0.0;
            }
        }

        let total = self.memory.superset_sum(channels);
        let count = (total as f64 * overlap) as u64;
        let duration_s = self.memory.duration_s();
        let rate_hz = if duration_s > 0.0 {
            count as f64 / duration_s
        } else {
            0.0
        };
        CountData {
            duration_s,
            count,
            rate_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{FileConfig, Pattern, SimulationMemory, TaggerEngine, NUM_CHANNELS};

    fn engine_with_counts() -> TaggerEngine {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 2);
        let mut memory = SimulationMemory::new(2.0);
        memory.record(Pattern::single(1), 1000);
        memory.record(Pattern::pair(1, 2), 80);
        memory.record(Pattern::pair(1, 4), 120);
        engine.inject_memory(memory);
        engine
    }

    #[test]
    fn test_singles_include_coincidence_patterns() {
        let engine = engine_with_counts();
        let data = engine.get_count_data(&[1]);
        assert_eq!(data.count, 1200);
        assert_eq!(data.duration_s, 2.0);
        assert!((data.rate_hz - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_query_is_stable_between_acquisitions() {
        let engine = engine_with_counts();
        let first = engine.get_count_data(&[1, 4]);
        let second = engine.get_count_data(&[1, 4]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matched_delays_pay_no_penalty() {
        let engine = engine_with_counts();
        assert_eq!(engine.get_count_data(&[1, 2]).count, 80);
    }

    #[test]
    fn test_small_delay_mismatch_attenuates() {
        let mut engine = engine_with_counts();
        let mut delays = [0.0; NUM_CHANNELS];
        delays[1] = 1.0; // channel 2 delayed by 1 ns = one jitter sigma
        engine.set_channel_delays(delays);

        let count = engine.get_count_data(&[1, 2]).count;
        // exp(-1/2) ≈ 0.6065
        assert_eq!(count, (80.0 * (-0.5_f64).exp()) as u64);
    }

    #[test]
    fn test_large_delay_mismatch_zeroes_the_count() {
        let mut engine = engine_with_counts();
        let mut delays = [0.0; NUM_CHANNELS];
        delays[1] = 50.0; // 50 sigma out: overlap underflows the cutoff
        engine.set_channel_delays(delays);

        let data = engine.get_count_data(&[1, 2]);
        assert_eq!(data.count, 0);
        assert_eq!(data.rate_hz, 0.0);
        // Other pairs are unaffected.
        assert_eq!(engine.get_count_data(&[1, 4]).count, 120);
    }

    #[test]
    fn test_zero_duration_yields_zero_rate() {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 2);
        let mut memory = SimulationMemory::new(0.0);
        memory.record(Pattern::single(3), 7);
        engine.inject_memory(memory);

        let data = engine.get_count_data(&[3]);
        assert_eq!(data.count, 7);
        assert_eq!(data.rate_hz, 0.0);
    }

    #[test]
    fn test_out_of_range_channels_query_as_zero_delay() {
        // Channels outside 1–16 read delay 0, so the penalty is 1 and the
        // superset sum (necessarily 0 for unphysical channels) decides.
        let engine = engine_with_counts();
        let data = engine.get_count_data(&[17, 1]);
        assert_eq!(data.count, 0);
    }
}
