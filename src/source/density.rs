//! Two-photon state algebra.
//!
//! The joint polarization state of a photon pair lives in a 4-dimensional
//! Hilbert space. Mixed states are represented as 4×4 density matrices;
//! measurement operators arrive as tensor products of the per-party 2×2
//! detection operators.

use crate::optics::{Ket2, Mat2};
use num_complex::Complex64;

/// A two-photon ket (4-component column vector).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ket4(pub [Complex64; 4]);

/// A 4×4 complex matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [[Complex64; 4]; 4]);

impl Ket4 {
    /// Tensor product of two single-photon kets.
    pub fn kron(a: &Ket2, b: &Ket2) -> Self {
        let mut out = [Complex64::new(0.0, 0.0); 4];
        for i in 0..2 {
            for j in 0..2 {
                out[2 * i + j] = a.0[i] * b.0[j];
            }
        }
        Self(out)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Returns the normalized ket, or the ket unchanged if its norm is zero.
    pub fn normalized(&self) -> Self {
        let n = self.norm();
        if n > 0.0 {
            let mut out = *self;
            for c in out.0.iter_mut() {
                *c /= n;
            }
            out
        } else {
            *self
        }
    }

    /// Outer product |v⟩⟨v|.
    pub fn projector(&self) -> Mat4 {
        let mut m = Mat4::zero();
        for r in 0..4 {
            for c in 0..4 {
                m.0[r][c] = self.0[r] * self.0[c].conj();
            }
        }
        m
    }
}

impl Mat4 {
    /// The zero matrix.
    pub fn zero() -> Self {
        Self([[Complex64::new(0.0, 0.0); 4]; 4])
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::zero();
        for i in 0..4 {
            m.0[i][i] = Complex64::new(1.0, 0.0);
        }
        m
    }

    /// Tensor product of two 2×2 matrices.
    pub fn kron(a: &Mat2, b: &Mat2) -> Self {
        let mut out = Self::zero();
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    for l in 0..2 {
                        out.0[2 * i + k][2 * j + l] = a.0[i][j] * b.0[k][l];
                    }
                }
            }
        }
        out
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &Mat4) -> Self {
        let mut out = Self::zero();
        for r in 0..4 {
            for c in 0..4 {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..4 {
                    acc += self.0[r][k] * rhs.0[k][c];
                }
                out.0[r][c] = acc;
            }
        }
        out
    }

    /// Matrix trace.
    pub fn trace(&self) -> Complex64 {
        (0..4).map(|i| self.0[i][i]).sum()
    }

    /// Scales every element by a real factor.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for row in out.0.iter_mut() {
            for c in row.iter_mut() {
                *c *= factor;
            }
        }
        out
    }

    /// Element-wise sum.
    pub fn add(&self, rhs: &Mat4) -> Self {
        let mut out = *self;
        for r in 0..4 {
            for c in 0..4 {
                out.0[r][c] += rhs.0[r][c];
            }
        }
        out
    }
}

/// A two-photon density matrix.
///
/// Invariants (maintained by [`SpdcSource`](super::SpdcSource), checked in
/// tests): unit trace, Hermitian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityMatrix(pub Mat4);

impl DensityMatrix {
    /// The fully mixed state `I/4`.
    pub fn fully_mixed() -> Self {
        Self(Mat4::identity().scaled(0.25))
    }

    /// Expectation value `Re[Tr(ρ·M)]` of a measurement operator.
    pub fn expectation(&self, operator: &Mat4) -> f64 {
        self.0.mul(operator).trace().re
    }

    /// Matrix trace.
    pub fn trace(&self) -> Complex64 {
        self.0.trace()
    }

    /// Largest deviation from Hermiticity, `max |ρ[r][c] − ρ[c][r]*|`.
    pub fn hermiticity_defect(&self) -> f64 {
        let mut worst: f64 = 0.0;
        for r in 0..4 {
            for c in 0..4 {
                worst = worst.max((self.0 .0[r][c] - self.0 .0[c][r].conj()).norm());
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kron_of_basis_kets() {
        let hv = Ket4::kron(&Ket2::horizontal(), &Ket2::vertical());
        assert_eq!(hv.0[1], Complex64::new(1.0, 0.0));
        assert_eq!(hv.0[0], Complex64::new(0.0, 0.0));
        assert_eq!(hv.0[2], Complex64::new(0.0, 0.0));
        assert_eq!(hv.0[3], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_kron_trace_is_product_of_traces() {
        let a = crate::optics::half_wave_plate(0.3);
        let p = Ket2::vertical().projector();
        let m = Mat4::kron(&a, &p);
        let ta = a.0[0][0] + a.0[1][1];
        let tp = p.0[0][0] + p.0[1][1];
        assert!((m.trace() - ta * tp).norm() < 1e-12);
    }

    #[test]
    fn test_fully_mixed_has_unit_trace() {
        let rho = DensityMatrix::fully_mixed();
        assert!((rho.trace().re - 1.0).abs() < 1e-12);
        assert!(rho.hermiticity_defect() < 1e-12);
    }

    #[test]
    fn test_projector_expectation_of_own_state() {
        let psi = Ket4::kron(&Ket2::horizontal(), &Ket2::vertical());
        let rho = DensityMatrix(psi.projector());
        assert!((rho.expectation(&psi.projector()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_ket_normalizes_to_itself() {
        let zero = Ket4([Complex64::new(0.0, 0.0); 4]);
        assert_eq!(zero.normalized(), zero);
    }
}
