//! Two-pointer cross-correlation sweep.
//!
//! For every event on channel A, the events on channel B inside
//! `[-hist_width, +hist_width]` are binned by time difference. Because
//! both streams are time-sorted, the inner pointer only ever advances:
//! events that fall below the window for the current A event can never
//! re-enter it for a later one, so the sweep is O(n + m). The sortedness
//! requirement is checked up front rather than assumed.

use crate::tags::TagRecord;
use crate::BIN_RESOLUTION_NS;
use thiserror::Error;

/// Errors raised by the analyzer on unusable input.
#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("bin width must be positive, got {0} ns")]
    NonPositiveBinWidth(f64),
    #[error("histogram half-width must be positive, got {0} ns")]
    NonPositiveHistWidth(f64),
    #[error("channel {0} event stream is not sorted ascending by time")]
    UnsortedStream(u8),
}

/// Parameters for a cross-correlation histogram.
#[derive(Debug, Clone)]
pub struct HistogramParams {
    /// Channel A (reference).
    pub ch_a: u8,
    /// Channel B (delayed relative to A at positive `dt`).
    pub ch_b: u8,
    /// Width of each histogram bin in nanoseconds.
    pub bin_width_ns: f64,
    /// The histogram spans `[-hist_width, +hist_width]` nanoseconds.
    pub hist_width_ns: f64,
}

/// A delay histogram between two channels.
#[derive(Debug, Clone)]
pub struct CrossCorrelation {
    /// Raw counts per bin.
    pub counts: Vec<f64>,
    /// The central delay value of each bin in nanoseconds.
    pub bin_centers_ns: Vec<f64>,
    /// Counts normalized by the flat accidental-coincidence level
    /// `(bin_width / T) · N_a · N_b`.
    pub normalized: Vec<f64>,
}

/// Computes the cross-correlation histogram of two channels in a tag stream.
///
/// The total measurement time is estimated from the largest time bin in
/// the stream. Useful for g2 measurements and for reading off the timing
/// offset between two photon paths.
pub fn cross_correlation_histogram(
    tags: &[TagRecord],
    params: &HistogramParams,
) -> Result<CrossCorrelation, HistogramError> {
    if params.bin_width_ns <= 0.0 {
        return Err(HistogramError::NonPositiveBinWidth(params.bin_width_ns));
    }
    if params.hist_width_ns <= 0.0 {
        return Err(HistogramError::NonPositiveHistWidth(params.hist_width_ns));
    }

    let a = channel_times(tags, params.ch_a);
    let b = channel_times(tags, params.ch_b);
    if !is_sorted(&a) {
        return Err(HistogramError::UnsortedStream(params.ch_a));
    }
    if !is_sorted(&b) {
        return Err(HistogramError::UnsortedStream(params.ch_b));
    }

    let hist_width = params.hist_width_ns;
    let bin_width = params.bin_width_ns;
    let n_bins = (2.0 * hist_width / bin_width).ceil() as usize;
    let mut counts = vec![0.0; n_bins];

    let mut start_ind = 0usize;
    let mut j = 0usize;
    for &a_t in &a {
        while j < b.len() {
            let dt = (b[j] - a_t) as f64 * BIN_RESOLUTION_NS;
            if dt < -hist_width {
                // Too early for this A event, and for every later one.
                start_ind = j + 1;
            } else if dt > hist_width {
                break;
            } else {
                let bin = ((dt + hist_width) / bin_width).floor() as usize;
                if bin < n_bins {
                    counts[bin] += 1.0;
                }
            }
            j += 1;
        }
        j = start_ind;
    }

    // Estimated total measurement time in ns, from the latest event.
    let t_total = tags
        .iter()
        .map(|tag| tag.time_bin)
        .max()
        .unwrap_or(0) as f64
        * BIN_RESOLUTION_NS;

    let accidental_level = if t_total > 0.0 {
        (bin_width / t_total) * a.len() as f64 * b.len() as f64
    } else {
        0.0
    };
    let normalized = if accidental_level > 0.0 {
        counts.iter().map(|&c| c / accidental_level).collect()
    } else {
        vec![0.0; n_bins]
    };

    Ok(CrossCorrelation {
        counts,
        bin_centers_ns: linspace(-hist_width, hist_width, n_bins),
        normalized,
    })
}

fn channel_times(tags: &[TagRecord], channel: u8) -> Vec<i64> {
    tags.iter()
        .filter(|tag| tag.channel == channel)
        .map(|tag| tag.time_bin)
        .collect()
}

fn is_sorted(times: &[i64]) -> bool {
    times.windows(2).all(|w| w[0] <= w[1])
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
