//! Relativistic kinematics primitives.
//!
//! [`FourMomentum`] is a plain `Copy` value in natural units (GeV, c = 1).
//! Detector objects arrive as (pt, η, φ, m); internally the Cartesian
//! components are stored so sums are exact additions.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, Sub};

// ═══════════════════════════════════════════════════════════════════════════════
// THREE-VECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Spatial part of a four-momentum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreeVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ThreeVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    /// Magnitude of the component perpendicular to `axis`.
    ///
    /// A zero `axis` leaves the full magnitude.
    pub fn perp(&self, axis: &Self) -> f64 {
        let axis_mag2 = axis.mag2();
        let mut perp2 = self.mag2();
        if axis_mag2 > 0.0 {
            let along = self.dot(axis);
            perp2 -= along * along / axis_mag2;
        }
        perp2.max(0.0).sqrt()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FOUR-MOMENTUM
// ═══════════════════════════════════════════════════════════════════════════════

/// Four-momentum p^μ = (E, p_x, p_y, p_z).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    /// Create from Cartesian components.
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Create from momentum components and a mass.
    ///
    /// A negative `mass` is treated as m² < 0, with the energy clamped at zero.
    pub fn from_px_py_pz_m(px: f64, py: f64, pz: f64, mass: f64) -> Self {
        let p2 = px * px + py * py + pz * pz;
        let e = if mass >= 0.0 {
            (p2 + mass * mass).sqrt()
        } else {
            (p2 - mass * mass).max(0.0).sqrt()
        };
        Self::new(e, px, py, pz)
    }

    /// Create from collider coordinates: transverse momentum, pseudorapidity,
    /// azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let pt = pt.abs();
        Self::from_px_py_pz_m(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh(), mass)
    }

    /// Transverse-only vector, as used for missing transverse momentum.
    pub fn transverse(px: f64, py: f64) -> Self {
        Self::from_px_py_pz_m(px, py, 0.0, 0.0)
    }

    pub fn energy(&self) -> f64 {
        self.e
    }

    pub fn vect(&self) -> ThreeVector {
        ThreeVector::new(self.px, self.py, self.pz)
    }

    /// m² = E² − |p|²
    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.vect().mag2()
    }

    /// Invariant mass, signed: a space-like vector returns −√(−m²).
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// |p|
    pub fn p(&self) -> f64 {
        self.vect().mag2().sqrt()
    }

    /// p_T = √(p_x² + p_y²)
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Pseudorapidity η = asinh(p_z / p_T).
    ///
    /// Objects along the beam axis saturate at ±1e10.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt > 0.0 {
            (self.pz / pt).asinh()
        } else if self.pz > 0.0 {
            1e10
        } else if self.pz < 0.0 {
            -1e10
        } else {
            0.0
        }
    }

    /// Azimuth φ = atan2(p_y, p_x), in (−π, π].
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Azimuthal separation wrapped into [−π, π].
    pub fn delta_phi(&self, other: &Self) -> f64 {
        let mut dphi = self.phi() - other.phi();
        while dphi > PI {
            dphi -= 2.0 * PI;
        }
        while dphi < -PI {
            dphi += 2.0 * PI;
        }
        dphi
    }

    /// ΔR = √(Δη² + Δφ²)
    pub fn delta_r(&self, other: &Self) -> f64 {
        let deta = self.eta() - other.eta();
        deta.hypot(self.delta_phi(other))
    }

    /// Copy with the longitudinal momentum replaced, keeping the mass hypothesis.
    pub fn with_pz(&self, pz: f64, mass: f64) -> Self {
        Self::from_px_py_pz_m(self.px, self.py, pz, mass)
    }
}

impl Add for FourMomentum {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            e: self.e + other.e,
            px: self.px + other.px,
            py: self.py + other.py,
            pz: self.pz + other.pz,
        }
    }
}

impl Sub for FourMomentum {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            e: self.e - other.e,
            px: self.px - other.px,
            py: self.py - other.py,
            pz: self.pz - other.pz,
        }
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}
