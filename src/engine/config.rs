//! Tagger and experiment configuration.
//!
//! Mirrors what the lab front-end persists: per-channel detector settings,
//! the coincidence window, party definitions, the pump waveplate, and the
//! simulator rate constants. Angles are stored in degrees (the unit the
//! operator works in) and converted to radians at the engine boundary.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of detector channels on the tagger.
pub const NUM_CHANNELS: usize = 16;

/// Per-channel detector settings plus the coincidence window.
///
/// Channels are numbered 1–16; index 0 of each array is channel 1.
/// Thresholds are informational: the virtual discriminator always fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Detection efficiency per channel, each in [0, 1].
    pub efficiencies: [f64; NUM_CHANNELS],
    /// Electronic delay per channel in nanoseconds.
    pub delays_ns: [f64; NUM_CHANNELS],
    /// Discriminator voltage threshold per channel in volts.
    pub thresholds_v: [f64; NUM_CHANNELS],
    /// Coincidence window in nanoseconds.
    pub window_ns: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            efficiencies: [0.1; NUM_CHANNELS],
            delays_ns: [0.0; NUM_CHANNELS],
            thresholds_v: [0.5; NUM_CHANNELS],
            window_ns: 3.0,
        }
    }
}

impl ChannelConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, &eff) in self.efficiencies.iter().enumerate() {
            if !(0.0..=1.0).contains(&eff) {
                return Err(ConfigError::InvalidEfficiency {
                    channel: i + 1,
                    value: eff,
                });
            }
        }
        if self.window_ns <= 0.0 {
            return Err(ConfigError::InvalidWindow(self.window_ns));
        }
        Ok(())
    }

    /// Efficiency of a channel, or 0 outside the physical range 1–16.
    pub fn efficiency(&self, channel: u8) -> f64 {
        if (1..=NUM_CHANNELS as u8).contains(&channel) {
            self.efficiencies[channel as usize - 1]
        } else {
            0.0
        }
    }

    /// Delay of a channel in nanoseconds, or 0 outside 1–16.
    pub fn delay_ns(&self, channel: u8) -> f64 {
        if (1..=NUM_CHANNELS as u8).contains(&channel) {
            self.delays_ns[channel as usize - 1]
        } else {
            0.0
        }
    }
}

/// One measurement party as configured by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartySpec {
    /// Display name, e.g. "Alice".
    pub name: String,
    /// Detector channels for outcomes 0 and 1.
    pub channels: [u8; 2],
    /// Initial half-wave-plate angle (degrees).
    pub hwp_deg: f64,
    /// Initial quarter-wave-plate angle (degrees).
    pub qwp_deg: f64,
}

/// Pump source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Pump half-wave-plate angle (degrees).
    pub pump_hwp_deg: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { pump_hwp_deg: 0.0 }
    }
}

/// Simulator rate constants, calibrated against the real instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Photon-pair generation rate per milliwatt of pump power (Hz/mW).
    pub pairs_per_mw_hz: f64,
    /// Dark-count rate per channel with the lab lights off (Hz).
    pub dark_rate_lights_off_hz: f64,
    /// Dark-count rate per channel with the lab lights on (Hz).
    pub dark_rate_lights_on_hz: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            pairs_per_mw_hz: 300_000.0,
            dark_rate_lights_off_hz: 1_500.0,
            dark_rate_lights_on_hz: 21_700.0,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Per-channel detector settings and coincidence window.
    #[serde(default)]
    pub channels: ChannelConfig,
    /// Measurement parties; defaults to Alice and Bob.
    #[serde(default = "default_parties")]
    pub parties: Vec<PartySpec>,
    /// Pump source settings.
    #[serde(default)]
    pub source: SourceConfig,
    /// Simulator rate constants.
    #[serde(default)]
    pub rates: RateConfig,
}

/// The standard two-party experiment: Alice on 1/3, Bob on 2/4.
fn default_parties() -> Vec<PartySpec> {
    vec![
        PartySpec {
            name: "Alice".into(),
            channels: [1, 3],
            hwp_deg: 0.0,
            qwp_deg: 0.0,
        },
        PartySpec {
            name: "Bob".into(),
            channels: [2, 4],
            hwp_deg: 0.0,
            qwp_deg: 0.0,
        },
    ]
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            channels: ChannelConfig::default(),
            parties: default_parties(),
            source: SourceConfig::default(),
            rates: RateConfig::default(),
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.channels.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("channel {channel}: efficiency {value} outside [0, 1]")]
    InvalidEfficiency { channel: usize, value: f64 },
    #[error("coincidence window must be positive, got {0} ns")]
    InvalidWindow(f64),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
