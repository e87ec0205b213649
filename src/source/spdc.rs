//! Type-II SPDC source model.
//!
//! A pump half-wave plate sets the superposition of the two down-conversion
//! paths: a horizontal pump component produces |HV⟩, a vertical component
//! produces |VH⟩. An anti-diagonal pump (HWP at −22.5°) yields the singlet
//! state. The emitted state is the entangled pure state mixed with a small
//! isotropic term and a symmetric-projector term, weights fixed from
//! calibration of the real source.

use super::density::{DensityMatrix, Ket4, Mat4};
use crate::optics::{half_wave_plate, Ket2};

/// Weight of the isotropic (white) noise term `I/4`.
pub const ISOTROPIC_NOISE_WEIGHT: f64 = 0.03915;

/// Weight of the symmetric-state noise term.
pub const SYMMETRIC_NOISE_WEIGHT: f64 = 0.06;

/// Entangled photon-pair source driven by a pump half-wave plate.
#[derive(Debug, Clone)]
pub struct SpdcSource {
    hwp_angle: f64,
    rho: DensityMatrix,
}

impl SpdcSource {
    /// Creates the source with the pump HWP at `angle` radians.
    pub fn new(angle: f64) -> Self {
        Self {
            hwp_angle: angle,
            rho: density_matrix_for_angle(angle),
        }
    }

    /// Rotates the pump HWP and rebuilds the emitted state.
    pub fn set_hwp(&mut self, angle: f64) {
        self.hwp_angle = angle;
        self.rho = density_matrix_for_angle(angle);
        tracing::debug!(angle_rad = angle, "source HWP rotated");
    }

    /// Current pump HWP angle (radians).
    pub fn hwp_angle(&self) -> f64 {
        self.hwp_angle
    }

    /// The emitted two-photon density matrix.
    pub fn density_matrix(&self) -> &DensityMatrix {
        &self.rho
    }
}

impl Default for SpdcSource {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// The emitted state as a pure function of the pump HWP angle.
///
/// `ρ = (1−ε−γ)·|ψ⟩⟨ψ| + ε·I/4 + γ·P_sym` where
/// `|ψ⟩ ∝ α|HV⟩ − β|VH⟩` with (α, β) the rotated pump amplitudes and
/// `P_sym` the projector onto `(|HV⟩ + |VH⟩)/√2`.
pub fn density_matrix_for_angle(angle: f64) -> DensityMatrix {
    let pump = half_wave_plate(angle).apply(&Ket2::horizontal());
    let alpha = pump.0[0];
    let beta = pump.0[1];

    let hv = Ket4::kron(&Ket2::horizontal(), &Ket2::vertical());
    let vh = Ket4::kron(&Ket2::vertical(), &Ket2::horizontal());

    let mut psi = Ket4([num_complex::Complex64::new(0.0, 0.0); 4]);
    for i in 0..4 {
        psi.0[i] = alpha * hv.0[i] - beta * vh.0[i];
    }
    let psi = psi.normalized();

    let mut sym = Ket4([num_complex::Complex64::new(0.0, 0.0); 4]);
    for i in 0..4 {
        sym.0[i] = (hv.0[i] + vh.0[i]) / 2.0_f64.sqrt();
    }

    let signal_weight = 1.0 - ISOTROPIC_NOISE_WEIGHT - SYMMETRIC_NOISE_WEIGHT;
    let rho = psi
        .projector()
        .scaled(signal_weight)
        .add(&Mat4::identity().scaled(ISOTROPIC_NOISE_WEIGHT / 4.0))
        .add(&sym.projector().scaled(SYMMETRIC_NOISE_WEIGHT));

    DensityMatrix(rho)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_state_at_zero_angle_matches_closed_form() {
        // At angle 0 the pump stays horizontal, so |ψ⟩ = |HV⟩ and the only
        // off-diagonal coupling between |HV⟩ and |VH⟩ comes from the
        // symmetric noise term: ρ[1][2] = γ/2.
        let rho = density_matrix_for_angle(0.0);
        let gamma = SYMMETRIC_NOISE_WEIGHT;
        let eps = ISOTROPIC_NOISE_WEIGHT;

        assert!((rho.0 .0[1][2].re - gamma / 2.0).abs() < 1e-12);
        assert!(rho.0 .0[1][2].im.abs() < 1e-12);
        assert!((rho.0 .0[2][1].re - gamma / 2.0).abs() < 1e-12);

        // Diagonal: |HV⟩ population carries the signal plus its share of
        // both noise terms; |HH⟩ sees only the isotropic term.
        let expect_hv = (1.0 - eps - gamma) + eps / 4.0 + gamma / 2.0;
        assert!((rho.0 .0[1][1].re - expect_hv).abs() < 1e-12);
        assert!((rho.0 .0[0][0].re - eps / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_singlet_at_22_5_degrees() {
        // HWP at 22.5° gives α = β, so the amplitude α|HV⟩ − β|VH⟩
        // becomes the singlet.
        let angle = 22.5_f64.to_radians();
        let rho = density_matrix_for_angle(angle);
        // Singlet has equal |HV⟩ and |VH⟩ populations and negative coherence.
        assert!((rho.0 .0[1][1].re - rho.0 .0[2][2].re).abs() < 1e-9);
        let signal = 1.0 - ISOTROPIC_NOISE_WEIGHT - SYMMETRIC_NOISE_WEIGHT;
        let expect_coherence = -signal / 2.0 + SYMMETRIC_NOISE_WEIGHT / 2.0;
        assert!((rho.0 .0[1][2].re - expect_coherence).abs() < 1e-9);
    }

    #[test]
    fn test_set_hwp_rebuilds_state() {
        let mut source = SpdcSource::default();
        let before = *source.density_matrix();
        source.set_hwp(0.5);
        assert_ne!(before, *source.density_matrix());
    }

    proptest! {
        #[test]
        fn prop_density_matrix_is_physical(angle in -10.0f64..10.0) {
            let rho = density_matrix_for_angle(angle);
            prop_assert!((rho.trace().re - 1.0).abs() < 1e-9);
            prop_assert!(rho.trace().im.abs() < 1e-9);
            prop_assert!(rho.hermiticity_defect() < 1e-9);
        }

        #[test]
        fn prop_diagonal_is_nonnegative(angle in -10.0f64..10.0) {
            let rho = density_matrix_for_angle(angle);
            for i in 0..4 {
                prop_assert!(rho.0.0[i][i].re > -1e-12);
            }
        }
    }
}
