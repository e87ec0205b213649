//! The entangled photon-pair source.
//!
//! Models a type-II SPDC crystal pumped through a rotatable half-wave
//! plate. The emitted two-photon state is a noisy entangled state whose
//! signal/noise balance is fixed; only the pump rotation is a control.

mod density;
mod spdc;

pub use density::{DensityMatrix, Ket4, Mat4};
pub use spdc::{
    density_matrix_for_angle, SpdcSource, ISOTROPIC_NOISE_WEIGHT, SYMMETRIC_NOISE_WEIGHT,
};
