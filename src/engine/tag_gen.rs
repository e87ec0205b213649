//! The raw time-tag acquisition path.
//!
//! Unlike the aggregate path, loss is folded directly into each pair
//! outcome as a combined per-detected-channel efficiency: an event either
//! produces clicks on both of its channels or none. The two sampling
//! procedures are statistically close but deliberately kept distinct;
//! they model loss at different points.

use super::sampling;
use super::TaggerEngine;
use crate::tags::{write_tag_file, TagFileError, TagRecord};
use crate::{BIN_RESOLUTION_NS, JITTER_SIGMA_NS};
use std::path::Path;

impl TaggerEngine {
    /// Generates `duration_s` seconds of raw tags for the current state.
    ///
    /// Emissions arrive as a Poisson process (exponential gaps at the base
    /// pair rate); each emission is assigned to one pair outcome by a
    /// single multinomial draw, with undetected events going to the
    /// no-click residual. Every surviving click gets its channel delay
    /// plus Gaussian timing jitter before discretization. The returned
    /// stream is sorted ascending by time bin.
    pub fn generate_tags(&mut self, duration_s: f64) -> Vec<TagRecord> {
        let base_rate = self.base_pair_rate_hz();
        if base_rate <= 0.0 || duration_s <= 0.0 {
            return Vec::new();
        }
        let num_events = (base_rate * duration_s) as usize;
        if num_events == 0 {
            return Vec::new();
        }

        // Pair-level probability table with combined efficiencies.
        let table: Vec<([u8; 2], f64)> = self
            .ideal_outcomes()
            .iter()
            .map(|outcome| {
                let eff: f64 = outcome
                    .channels
                    .iter()
                    .map(|&ch| self.channels.efficiency(ch))
                    .product();
                (outcome.channels, outcome.probability * eff)
            })
            .collect();
        if table.is_empty() {
            return Vec::new();
        }

        let emission_times = sampling::arrival_times_s(&mut self.rng, base_rate, num_events);

        let mut weights: Vec<f64> = table.iter().map(|(_, p)| *p).collect();
        let detected: f64 = weights.iter().sum();
        weights.push((1.0 - detected).max(0.0));

        let assignment = sampling::multinomial(&mut self.rng, num_events as u64, &weights);

        let mut tags = Vec::new();
        let mut cursor = 0usize;
        for ((channels, _), &count) in table.iter().zip(assignment.iter()) {
            let count = count as usize;
            if count == 0 {
                continue;
            }
            if cursor + count > emission_times.len() {
                break;
            }
            let events = &emission_times[cursor..cursor + count];
            cursor += count;

            for &ch in channels {
                let delay_ns = self.channels.delay_ns(ch);
                for &t_s in events {
                    let jitter = sampling::gaussian_jitter(&mut self.rng, JITTER_SIGMA_NS);
                    let t_ns = t_s * 1e9 + delay_ns + jitter;
                    tags.push(TagRecord {
                        channel: ch,
                        time_bin: (t_ns / BIN_RESOLUTION_NS) as i64,
                    });
                }
            }
        }

        tags.sort_by_key(|tag| tag.time_bin);
        tracing::info!(
            duration_s,
            events = num_events,
            tags = tags.len(),
            "raw tag stream generated"
        );
        tags
    }

    /// Generates tags and writes them in the two-column text format.
    ///
    /// With the laser off the file still gets its header line.
    pub fn save_tags(
        &mut self,
        path: impl AsRef<Path>,
        duration_s: f64,
    ) -> Result<usize, TagFileError> {
        let tags = self.generate_tags(duration_s);
        write_tag_file(path, &tags)?;
        Ok(tags.len())
    }
}
