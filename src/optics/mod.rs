//! Polarization optics for the measurement stations.
//!
//! This module models each observer's waveplate stage with Jones calculus
//! and folds the waveplates into a pair of effective detection operators,
//! one per polarizing-beamsplitter output port.

mod jones;
mod party;

pub use jones::{half_wave_plate, quarter_wave_plate, rotation, Ket2, Mat2};
pub use party::Party;
