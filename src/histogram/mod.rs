//! Timing analysis of raw tag streams.
//!
//! Reconstructs delay statistics between two detector channels from a
//! time-sorted tag stream. Used for g2 measurements and for simple lab
//! checks such as the timing offset between two photon paths.

mod cross_correlation;

pub use cross_correlation::{
    cross_correlation_histogram, CrossCorrelation, HistogramError, HistogramParams,
};
