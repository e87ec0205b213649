//! Jones calculus primitives.
//!
//! Polarization states live in a two-dimensional complex vector space;
//! optical elements act on them as 2×2 complex matrices. Waveplates are
//! modeled as a fixed diagonal retarder conjugated by a real rotation.

use num_complex::Complex64;

/// A 2×2 complex matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2(pub [[Complex64; 2]; 2]);

/// A polarization ket (column vector).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ket2(pub [Complex64; 2]);

impl Mat2 {
    /// The zero matrix.
    pub fn zero() -> Self {
        Self([[Complex64::new(0.0, 0.0); 2]; 2])
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::zero();
        m.0[0][0] = Complex64::new(1.0, 0.0);
        m.0[1][1] = Complex64::new(1.0, 0.0);
        m
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zero();
        for r in 0..2 {
            for c in 0..2 {
                out.0[r][c] = self.0[c][r].conj();
            }
        }
        out
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &Mat2) -> Self {
        let mut out = Self::zero();
        for r in 0..2 {
            for c in 0..2 {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..2 {
                    acc += self.0[r][k] * rhs.0[k][c];
                }
                out.0[r][c] = acc;
            }
        }
        out
    }

    /// Applies the matrix to a ket.
    pub fn apply(&self, v: &Ket2) -> Ket2 {
        let mut out = Ket2([Complex64::new(0.0, 0.0); 2]);
        for r in 0..2 {
            for k in 0..2 {
                out.0[r] += self.0[r][k] * v.0[k];
            }
        }
        out
    }
}

impl Ket2 {
    /// Horizontal basis state |H⟩ = |0⟩.
    pub fn horizontal() -> Self {
        Self([Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)])
    }

    /// Vertical basis state |V⟩ = |1⟩.
    pub fn vertical() -> Self {
        Self([Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)])
    }

    /// Outer product |v⟩⟨v| as a projection matrix.
    pub fn projector(&self) -> Mat2 {
        let mut m = Mat2::zero();
        for r in 0..2 {
            for c in 0..2 {
                m.0[r][c] = self.0[r] * self.0[c].conj();
            }
        }
        m
    }
}

/// Real 2D rotation matrix `R(θ)`.
pub fn rotation(angle: f64) -> Mat2 {
    let (s, c) = angle.sin_cos();
    Mat2([
        [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
        [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
    ])
}

/// Half-wave plate at `angle`: `R(θ)·diag(1, −1)·R(−θ)`.
pub fn half_wave_plate(angle: f64) -> Mat2 {
    let mut retarder = Mat2::identity();
    retarder.0[1][1] = Complex64::new(-1.0, 0.0);
    rotation(angle).mul(&retarder).mul(&rotation(-angle))
}

/// Quarter-wave plate at `angle`: `R(θ)·diag(1, −i)·R(−θ)`.
pub fn quarter_wave_plate(angle: f64) -> Mat2 {
    let mut retarder = Mat2::identity();
    retarder.0[1][1] = Complex64::new(0.0, -1.0);
    rotation(angle).mul(&retarder).mul(&rotation(-angle))
}
