//! Neutrino longitudinal momentum from the W-mass constraint.
//!
//! With a massless neutrino whose transverse momentum is the MET, requiring
//! (lepton + ν)² = m_W² gives a quadratic in p_z(ν):
//!
//! ```text
//! a = m_W² − m_ℓ² + 2(p_x,ℓ·p_x,miss + p_y,ℓ·p_y,miss)
//! A = 4(E_ℓ² − p_z,ℓ²)
//! B = −4·a·p_z,ℓ
//! C = 4·E_ℓ²·(p_x,miss² + p_y,miss²) − a²
//! ```
//!
//! The three outcomes (linear fallback, complex pair, two real roots) are
//! reported as distinct [`NeutrinoSolution`] variants.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::kinematics::{FourMomentum, ThreeVector};
use crate::tolerances::{DEGENERATE_QUADRATIC, LARGE_NEUTRINO_PZ};

/// Rule for choosing the primary root when both are real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PzSelection {
    /// Closest to the lepton p_z, unless that root exceeds 300 GeV in
    /// magnitude, in which case the most central one.
    #[default]
    Default,
    /// Root numerically closest to the lepton p_z.
    ClosestToLepton,
    /// Root with the smaller |p_z|.
    MostCentral,
    /// Root giving the larger decay-angle cosine in the W rest frame.
    MaxDecayCosine,
}

impl std::str::FromStr for PzSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "closest_to_lepton" | "closest" => Ok(Self::ClosestToLepton),
            "most_central" | "central" => Ok(Self::MostCentral),
            "max_decay_cosine" | "max_cosine" => Ok(Self::MaxDecayCosine),
            other => Err(format!("unknown neutrino pz selection: {other}")),
        }
    }
}

/// Outcome of the neutrino p_z quadratic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeutrinoSolution {
    /// Leading coefficient vanished; linear approximation used.
    Degenerate { pz: f64 },
    /// Negative discriminant; real part of the complex pair.
    Complex { real_part: f64 },
    /// Two real roots, ordered by the selection policy.
    TwoReal { primary: f64, alternate: f64 },
}

impl NeutrinoSolution {
    pub fn primary_pz(&self) -> f64 {
        match *self {
            Self::Degenerate { pz } => pz,
            Self::Complex { real_part } => real_part,
            Self::TwoReal { primary, .. } => primary,
        }
    }

    /// The non-selected root. Equal to the primary unless two real roots exist.
    pub fn alternate_pz(&self) -> f64 {
        match *self {
            Self::Degenerate { pz } => pz,
            Self::Complex { real_part } => real_part,
            Self::TwoReal { alternate, .. } => alternate,
        }
    }

    pub fn is_complex_root(&self) -> bool {
        matches!(self, Self::Complex { .. })
    }

    /// Distinct p_z values worth trying: the primary, then the alternate when
    /// it differs.
    pub fn candidates(&self) -> Vec<f64> {
        let primary = self.primary_pz();
        let alternate = self.alternate_pz();
        if alternate != primary {
            vec![primary, alternate]
        } else {
            vec![primary]
        }
    }
}

/// Coefficients of the neutrino p_z quadratic for one lepton/MET pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutrinoQuadratic {
    lepton: FourMomentum,
    met: FourMomentum,
    w_mass: f64,
    /// `a` in the module docs.
    pub mass_term: f64,
    /// `A`
    pub leading: f64,
    /// `B`
    pub linear: f64,
    /// `C`
    pub constant: f64,
}

impl NeutrinoQuadratic {
    /// Set up the quadratic. Only `met.px` and `met.py` are used.
    pub fn new(lepton: &FourMomentum, met: &FourMomentum, lepton_mass: f64, w_mass: f64) -> Self {
        let e_lep = lepton.e;
        let pz_lep = lepton.pz;
        let met_pt2 = met.px * met.px + met.py * met.py;

        let mass_term = w_mass * w_mass - lepton_mass * lepton_mass
            + 2.0 * (lepton.px * met.px + lepton.py * met.py);
        let leading = 4.0 * (e_lep * e_lep - pz_lep * pz_lep);
        let linear = -4.0 * mass_term * pz_lep;
        let constant = 4.0 * e_lep * e_lep * met_pt2 - mass_term * mass_term;

        Self {
            lepton: *lepton,
            met: *met,
            w_mass,
            mass_term,
            leading,
            linear,
            constant,
        }
    }

    /// B² − 4AC
    pub fn discriminant(&self) -> f64 {
        self.linear * self.linear - 4.0 * self.leading * self.constant
    }

    /// A·pz² + B·pz + C
    pub fn residual(&self, pz: f64) -> f64 {
        (self.leading * pz + self.linear) * pz + self.constant
    }

    /// Whether the leading coefficient is too small to divide by.
    pub fn is_degenerate(&self) -> bool {
        self.leading.abs() < DEGENERATE_QUADRATIC
    }

    pub fn solve(&self, selection: PzSelection) -> NeutrinoSolution {
        let pz_lep = self.lepton.pz;

        if self.is_degenerate() {
            let transverse_dot = self.met.px * self.lepton.px + self.met.py * self.lepton.py;
            // A massless lepton on the beam axis with zero pz carries nothing to divide by.
            let pz = if pz_lep != 0.0 {
                -transverse_dot / pz_lep
            } else {
                0.0
            };
            trace!(leading = self.leading, pz, "neutrino quadratic degenerate");
            return NeutrinoSolution::Degenerate { pz };
        }

        let discriminant = self.discriminant();
        if discriminant < 0.0 {
            let real_part = -self.linear / (2.0 * self.leading);
            trace!(discriminant, real_part, "neutrino quadratic has complex roots");
            return NeutrinoSolution::Complex { real_part };
        }

        let sqrt_disc = discriminant.sqrt();
        let sol1 = (-self.linear + sqrt_disc) / (2.0 * self.leading);
        let sol2 = (-self.linear - sqrt_disc) / (2.0 * self.leading);

        let (primary, alternate) = match selection {
            PzSelection::ClosestToLepton => closest_to(pz_lep, sol1, sol2),
            PzSelection::MostCentral => most_central(sol1, sol2),
            PzSelection::MaxDecayCosine => self.max_decay_cosine(sol1, sol2),
            PzSelection::Default => {
                let (primary, alternate) = closest_to(pz_lep, sol1, sol2);
                if primary.abs() > LARGE_NEUTRINO_PZ {
                    most_central(sol1, sol2)
                } else {
                    (primary, alternate)
                }
            }
        };
        trace!(sol1, sol2, primary, ?selection, "neutrino quadratic solved");
        NeutrinoSolution::TwoReal { primary, alternate }
    }

    /// Cosine of the lepton decay angle in the W rest frame, approximated
    /// from the lepton momentum transverse to the W flight direction.
    pub fn decay_cosine(&self, pz: f64) -> f64 {
        let lepton = self.lepton.vect();
        let w = ThreeVector::new(
            self.lepton.px + self.met.px,
            self.lepton.py + self.met.py,
            self.lepton.pz + pz,
        );
        let sin_theta = 2.0 * lepton.perp(&w) / self.w_mass;
        (1.0 - sin_theta * sin_theta).max(0.0).sqrt()
    }

    fn max_decay_cosine(&self, sol1: f64, sol2: f64) -> (f64, f64) {
        if self.decay_cosine(sol1) > self.decay_cosine(sol2) {
            (sol1, sol2)
        } else {
            (sol2, sol1)
        }
    }
}

fn closest_to(target: f64, sol1: f64, sol2: f64) -> (f64, f64) {
    if (sol2 - target).abs() < (sol1 - target).abs() {
        (sol2, sol1)
    } else {
        (sol1, sol2)
    }
}

fn most_central(sol1: f64, sol2: f64) -> (f64, f64) {
    if sol1.abs() < sol2.abs() {
        (sol1, sol2)
    } else {
        (sol2, sol1)
    }
}

/// Solve for the neutrino p_z given a lepton and transverse MET.
pub fn solve_neutrino_pz(
    lepton: &FourMomentum,
    met: &FourMomentum,
    lepton_mass: f64,
    w_mass: f64,
    selection: PzSelection,
) -> NeutrinoSolution {
    NeutrinoQuadratic::new(lepton, met, lepton_mass, w_mass).solve(selection)
}

/// Massless neutrino four-momentum with the MET's transverse components.
pub fn neutrino_p4(met: &FourMomentum, pz: f64) -> FourMomentum {
    met.with_pz(pz, 0.0)
}
