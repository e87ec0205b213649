//! Virtual Time-Correlated Photon Counting
//!
//! A physics-based stand-in for real time-tagger hardware in a
//! quantum-optics experiment (entangled-pair source, two measurement
//! parties, single-photon detectors). Given a quantum state, waveplate
//! settings, and detector imperfections, the engine reproduces what a
//! real instrument reports: singles counts, coincidence counts, and raw
//! timestamped event streams, which the histogram analyzer turns back
//! into timing statistics.
//!
//! # Architecture
//!
//! ```text
//! optics (waveplates → operators)
//!        ↓
//! source (pump angle → density matrix)
//!        ↓
//! engine ──→ pattern counts ──→ count queries
//!        └──→ raw tags ───────→ histogram analyzer
//! ```
//!
//! # Design Principles
//!
//! - **Statistically faithful, not cycle-accurate**: Poissonian counting
//!   statistics, Bernoulli detector loss, Gaussian timing jitter
//! - **One explicit engine instance**: no module-level state; construction
//!   order is channel config → parties → source angle
//! - **Reproducible randomness**: every draw comes from one seedable
//!   ChaCha20 RNG owned by the engine
//!
//! # Example
//!
//! ```no_run
//! use photon_tagger::engine::{FileConfig, SimLaser, PumpLaser, TaggerEngine};
//! use photon_tagger::histogram::{cross_correlation_histogram, HistogramParams};
//!
//! let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 42);
//!
//! let mut laser = SimLaser::new();
//! laser.set_power_mw(1.0);
//! laser.set_emission(true);
//! engine.attach_laser(Box::new(laser));
//!
//! // Aggregate counting
//! engine.read(1.0);
//! let coincidences = engine.get_count_data(&[1, 4]);
//! println!("{} counts at {} Hz", coincidences.count, coincidences.rate_hz);
//!
//! // Raw tags and timing analysis
//! let tags = engine.generate_tags(1.0);
//! let hist = cross_correlation_histogram(
//!     &tags,
//!     &HistogramParams { ch_a: 1, ch_b: 4, bin_width_ns: 1.0, hist_width_ns: 50.0 },
//! )
//! .unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod engine;
pub mod histogram;
pub mod optics;
pub mod source;
pub mod tags;

// Re-export commonly used types at crate root
pub use engine::{
    Capabilities, ChannelConfig, CountData, FileConfig, Pattern, PumpLaser, SimLaser,
    SimulationMemory, TaggerEngine,
};
pub use histogram::{cross_correlation_histogram, CrossCorrelation, HistogramParams};
pub use source::{DensityMatrix, SpdcSource};
pub use tags::{read_tag_file, write_tag_file, TagRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tagger timing resolution: nanoseconds per integer time bin.
pub const BIN_RESOLUTION_NS: f64 = 0.15625;

/// Detector timing jitter standard deviation in nanoseconds.
pub const JITTER_SIGMA_NS: f64 = 1.0;
