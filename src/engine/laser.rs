//! The pump laser collaborator.
//!
//! The engine only ever reads the emitted power, so the driver surface is
//! one trait. Real hardware drivers live outside this crate and implement
//! the same trait; [`SimLaser`] is the virtual stand-in.

/// A pump laser as seen by the tagger engine.
pub trait PumpLaser {
    /// Sets the requested output power in milliwatts.
    fn set_power_mw(&mut self, power_mw: f64);

    /// Turns emission on or off.
    fn set_emission(&mut self, on: bool);

    /// Currently emitted power in milliwatts; 0 while emission is off.
    fn emission_power_mw(&self) -> f64;
}

/// Virtual pump laser.
#[derive(Debug, Clone)]
pub struct SimLaser {
    power_mw: f64,
    emission_on: bool,
}

impl SimLaser {
    /// Creates the laser powered down with emission off.
    pub fn new() -> Self {
        tracing::info!("virtual laser initialized");
        Self {
            power_mw: 0.0,
            emission_on: false,
        }
    }
}

impl Default for SimLaser {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpLaser for SimLaser {
    fn set_power_mw(&mut self, power_mw: f64) {
        self.power_mw = power_mw.max(0.0);
        tracing::info!(power_mw = self.power_mw, "laser power set");
    }

    fn set_emission(&mut self, on: bool) {
        self.emission_on = on;
        tracing::info!(emission = on, "laser emission switched");
    }

    fn emission_power_mw(&self) -> f64 {
        if self.emission_on {
            self.power_mw
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_emission_while_off() {
        let mut laser = SimLaser::new();
        laser.set_power_mw(2.5);
        assert_eq!(laser.emission_power_mw(), 0.0);

        laser.set_emission(true);
        assert_eq!(laser.emission_power_mw(), 2.5);

        laser.set_emission(false);
        assert_eq!(laser.emission_power_mw(), 0.0);
    }

    #[test]
    fn test_negative_power_clamped() {
        let mut laser = SimLaser::new();
        laser.set_power_mw(-1.0);
        laser.set_emission(true);
        assert_eq!(laser.emission_power_mw(), 0.0);
    }
}
