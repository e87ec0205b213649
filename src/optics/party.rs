//! One measurement party (observer) in the two-photon experiment.
//!
//! Each party owns a half-wave plate, an optional quarter-wave plate, a
//! polarizing beamsplitter, and two detector channels (one per measurement
//! outcome). The waveplates are folded into the detection operators:
//! `E = W†·P·W` where `P` projects onto a beamsplitter output port.

use super::jones::{half_wave_plate, quarter_wave_plate, Ket2, Mat2};

/// An observer with a waveplate stage and a detector channel pair.
#[derive(Debug, Clone)]
pub struct Party {
    name: String,
    /// Detector channel per measurement outcome (outcome 0, outcome 1).
    channels: [u8; 2],
    hwp_angle: f64,
    qwp_angle: f64,
    /// Whether the quarter-wave plate is in the beam path.
    has_qwp: bool,
    /// Effective detection operators, one per outcome.
    operators: [Mat2; 2],
}

impl Party {
    /// Creates a party with both waveplates at zero.
    pub fn new(name: impl Into<String>, ch_0: u8, ch_1: u8) -> Self {
        let mut party = Self {
            name: name.into(),
            channels: [ch_0, ch_1],
            hwp_angle: 0.0,
            qwp_angle: 0.0,
            has_qwp: true,
            operators: [Mat2::zero(), Mat2::zero()],
        };
        party.update_operators();
        party
    }

    /// Sets both waveplate angles (radians) and recomputes the operators.
    pub fn set_waveplates(&mut self, hwp_angle: f64, qwp_angle: f64) {
        self.hwp_angle = hwp_angle;
        self.qwp_angle = qwp_angle;
        self.update_operators();
    }

    /// Removes or reinserts the quarter-wave plate.
    pub fn toggle_qwp(&mut self) {
        self.has_qwp = !self.has_qwp;
        tracing::debug!(party = %self.name, has_qwp = self.has_qwp, "QWP toggled");
        self.update_operators();
    }

    fn update_operators(&mut self) {
        let w = if self.has_qwp {
            half_wave_plate(self.hwp_angle).mul(&quarter_wave_plate(self.qwp_angle))
        } else {
            half_wave_plate(self.hwp_angle)
        };
        let w_dag = w.adjoint();
        let ports = [Ket2::horizontal().projector(), Ket2::vertical().projector()];
        for (op, port) in self.operators.iter_mut().zip(ports.iter()) {
            *op = w_dag.mul(port).mul(&w);
        }
    }

    /// The party's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detector channels, indexed by measurement outcome.
    pub fn channels(&self) -> [u8; 2] {
        self.channels
    }

    /// Effective detection operator for the given outcome (0 or 1).
    pub fn operator(&self, outcome: usize) -> &Mat2 {
        &self.operators[outcome]
    }

    /// Current waveplate angles (radians).
    pub fn waveplate_angles(&self) -> (f64, f64) {
        (self.hwp_angle, self.qwp_angle)
    }
}
