//! The virtual time-tagger engine.
//!
//! Owns all simulator state: channel settings, measurement parties, the
//! SPDC source, the attached laser, the RNG, and the counts from the most
//! recent acquisition. Construction order is channel config → parties →
//! source angle; after that the engine is ready for acquisitions.
//!
//! Acquisitions (`read`, `generate_tags`) take `&mut self`, so the borrow
//! checker enforces that at most one is in flight and that no query can
//! observe a half-updated memory.

mod acquisition;
mod config;
mod laser;
mod memory;
mod query;
mod sampling;
mod tag_gen;

pub use config::{
    ChannelConfig, ConfigError, FileConfig, PartySpec, RateConfig, SourceConfig, NUM_CHANNELS,
};
pub use laser::{PumpLaser, SimLaser};
pub use memory::{Pattern, SimulationMemory};
pub use query::CountData;

use crate::optics::Party;
use crate::source::SpdcSource;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

/// What this tagger supports beyond the plain counting surface.
///
/// Front-ends query this once at composition time instead of probing for
/// optional methods per call. A real-hardware driver would report `false`
/// for the simulator-only controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Number of detector channels.
    pub num_channels: usize,
    /// Whether this is a simulator (not real hardware).
    pub is_simulator: bool,
    /// Supports toggling the ambient-light (dark-count) level.
    pub ambient_light_control: bool,
    /// Supports per-party waveplate control.
    pub polarization_control: bool,
    /// Supports pump-rotation control of the source state.
    pub source_control: bool,
    /// Supports raw time-tag streaming to file.
    pub raw_tag_streaming: bool,
}

/// Virtual time-correlated photon-counting engine.
pub struct TaggerEngine {
    channels: ChannelConfig,
    parties: Vec<Party>,
    source: SpdcSource,
    laser: Option<Box<dyn PumpLaser>>,
    rates: RateConfig,
    /// Current per-channel dark-count rate (Hz), selected by ambient light.
    dark_rate_hz: f64,
    memory: SimulationMemory,
    rng: ChaCha20Rng,
}

impl TaggerEngine {
    /// Builds an engine from configuration, seeded from OS entropy.
    pub fn new(config: &FileConfig) -> Self {
        Self::build(config, ChaCha20Rng::from_entropy())
    }

    /// Builds an engine with a fixed seed for reproducible runs.
    pub fn with_seed(config: &FileConfig, seed: u64) -> Self {
        Self::build(config, ChaCha20Rng::seed_from_u64(seed))
    }

    fn build(config: &FileConfig, rng: ChaCha20Rng) -> Self {
        let mut engine = Self {
            channels: config.channels.clone(),
            parties: Vec::new(),
            source: SpdcSource::default(),
            laser: None,
            rates: config.rates.clone(),
            dark_rate_hz: config.rates.dark_rate_lights_off_hz,
            memory: SimulationMemory::default(),
            rng,
        };
        for spec in &config.parties {
            engine.add_party(&spec.name, spec.channels[0], spec.channels[1]);
            engine.set_waveplates(&spec.name, spec.hwp_deg.to_radians(), spec.qwp_deg.to_radians());
        }
        engine.set_source_hwp(config.source.pump_hwp_deg.to_radians());
        tracing::info!(
            parties = engine.parties.len(),
            "virtual time tagger ready (Poissonian statistics)"
        );
        engine
    }

    /// Attaches the pump laser. Done once at composition time.
    pub fn attach_laser(&mut self, laser: Box<dyn PumpLaser>) {
        tracing::info!("laser attached to time tagger");
        self.laser = Some(laser);
    }

    /// The attached laser, if any, for power/emission control.
    pub fn laser_mut(&mut self) -> Option<&mut (dyn PumpLaser + 'static)> {
        self.laser.as_deref_mut()
    }

    /// Adds a measurement party with both waveplates at zero.
    pub fn add_party(&mut self, name: &str, ch_0: u8, ch_1: u8) {
        tracing::info!(party = name, ch_0, ch_1, "party added");
        self.parties.push(Party::new(name, ch_0, ch_1));
    }

    /// Sets a party's waveplate angles (radians).
    ///
    /// Unknown party names are a diagnostic, not an error.
    pub fn set_waveplates(&mut self, party_name: &str, hwp_rad: f64, qwp_rad: f64) {
        match self
            .parties
            .iter_mut()
            .find(|p| p.name().eq_ignore_ascii_case(party_name))
        {
            Some(party) => {
                party.set_waveplates(hwp_rad, qwp_rad);
                tracing::info!(party = party_name, hwp_rad, qwp_rad, "waveplates set");
            }
            None => tracing::warn!(party = party_name, "party not found, waveplates unchanged"),
        }
    }

    /// Removes or reinserts a party's quarter-wave plate.
    pub fn toggle_qwp(&mut self, party_name: &str) {
        match self
            .parties
            .iter_mut()
            .find(|p| p.name().eq_ignore_ascii_case(party_name))
        {
            Some(party) => party.toggle_qwp(),
            None => tracing::warn!(party = party_name, "party not found, QWP unchanged"),
        }
    }

    /// Rotates the source pump HWP (radians) and rebuilds the state.
    pub fn set_source_hwp(&mut self, angle_rad: f64) {
        self.source.set_hwp(angle_rad);
    }

    /// Switches the per-channel dark-count rate between the lights-on and
    /// lights-off calibration points.
    pub fn set_ambient_light(&mut self, lights_on: bool) {
        self.dark_rate_hz = if lights_on {
            self.rates.dark_rate_lights_on_hz
        } else {
            self.rates.dark_rate_lights_off_hz
        };
        tracing::info!(lights_on, dark_rate_hz = self.dark_rate_hz, "ambient light set");
    }

    /// Sets the coincidence window (nanoseconds).
    pub fn set_window_width(&mut self, window_ns: f64) {
        self.channels.window_ns = window_ns;
        tracing::info!(window_ns, "coincidence window set");
    }

    /// Replaces all per-channel delays (nanoseconds).
    pub fn set_channel_delays(&mut self, delays_ns: [f64; NUM_CHANNELS]) {
        self.channels.delays_ns = delays_ns;
        tracing::info!("channel delays updated");
    }

    /// Replaces all per-channel voltage thresholds (informational).
    pub fn set_channel_thresholds(&mut self, thresholds_v: [f64; NUM_CHANNELS]) {
        self.channels.thresholds_v = thresholds_v;
        tracing::info!("channel thresholds updated");
    }

    /// Replaces all per-channel efficiencies.
    pub fn set_channel_efficiencies(&mut self, efficiencies: [f64; NUM_CHANNELS]) {
        self.channels.efficiencies = efficiencies;
        tracing::info!("channel efficiencies updated");
    }

    /// Reports what this tagger supports. The simulator supports everything.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            num_channels: NUM_CHANNELS,
            is_simulator: true,
            ambient_light_control: true,
            polarization_control: true,
            source_control: true,
            raw_tag_streaming: true,
        }
    }

    /// Counts from the most recent acquisition.
    pub fn memory(&self) -> &SimulationMemory {
        &self.memory
    }

    /// The configured parties.
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// Current channel settings.
    pub fn channel_config(&self) -> &ChannelConfig {
        &self.channels
    }

    /// The emitted two-photon state of the attached source.
    pub fn density_matrix(&self) -> &crate::source::DensityMatrix {
        self.source.density_matrix()
    }

    /// Pair generation rate in Hz: emitted laser power times the
    /// calibration constant, 0 with no laser or emission off.
    pub fn base_pair_rate_hz(&self) -> f64 {
        let power_mw = self
            .laser
            .as_ref()
            .map(|l| l.emission_power_mw())
            .unwrap_or(0.0);
        power_mw * self.rates.pairs_per_mw_hz
    }

    #[cfg(test)]
    pub(crate) fn inject_memory(&mut self, memory: SimulationMemory) {
        self.memory = memory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_from_default_config() {
        let engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        assert_eq!(engine.parties().len(), 2);
        assert_eq!(engine.parties()[0].name(), "Alice");
        assert_eq!(engine.base_pair_rate_hz(), 0.0);
        assert!(engine.memory().is_empty());
    }

    #[test]
    fn test_capabilities_report() {
        let engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        let caps = engine.capabilities();
        assert!(caps.is_simulator);
        assert!(caps.ambient_light_control);
        assert!(caps.polarization_control);
        assert_eq!(caps.num_channels, 16);
    }

    #[test]
    fn test_laser_attachment_drives_pair_rate() {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        let mut laser = SimLaser::new();
        laser.set_power_mw(2.0);
        laser.set_emission(true);
        engine.attach_laser(Box::new(laser));
        assert!((engine.base_pair_rate_hz() - 600_000.0).abs() < 1e-9);

        engine
            .laser_mut()
            .expect("laser attached")
            .set_emission(false);
        assert_eq!(engine.base_pair_rate_hz(), 0.0);
    }

    #[test]
    fn test_laser_handle_controls_attached_laser() {
        // Drive the laser entirely through the trait-object handle.
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        engine.attach_laser(Box::new(SimLaser::new()));

        let laser: &mut (dyn PumpLaser + 'static) =
            engine.laser_mut().expect("laser attached");
        laser.set_power_mw(0.5);
        laser.set_emission(true);
        assert!((engine.base_pair_rate_hz() - 150_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_party_is_a_no_op() {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        let before = *engine.parties()[0].operator(0);
        engine.set_waveplates("Charlie", 0.5, 0.5);
        assert_eq!(before, *engine.parties()[0].operator(0));
    }

    #[test]
    fn test_ambient_light_switches_dark_rate() {
        let mut engine = TaggerEngine::with_seed(&FileConfig::default(), 1);
        assert_eq!(engine.dark_rate_hz, 1_500.0);
        engine.set_ambient_light(true);
        assert_eq!(engine.dark_rate_hz, 21_700.0);
        engine.set_ambient_light(false);
        assert_eq!(engine.dark_rate_hz, 1_500.0);
    }
}
