//! Read-only access to an event's jets.
//!
//! The reconstructors never own jets. They see the caller's collection
//! through [`JetSource`] and address jets by [`JetIndex`], the position in
//! that collection. [`JetCandidates`] pairs a source with the handles the
//! caller wants considered and validates them once, so the combinatorial
//! code can index without further checks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::kinematics::FourMomentum;

/// Position of a jet in the caller's collection.
pub type JetIndex = usize;

/// Flatten an optional jet index to the `-1` sentinel used by ntuple writers.
pub fn index_or_sentinel(index: Option<JetIndex>) -> i64 {
    index.map_or(-1, |i| i as i64)
}

/// A corrected jet: kinematics plus b-tag discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    /// b-tag discriminant (higher is more b-like).
    #[serde(default)]
    pub btag: f64,
}

impl Jet {
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64, btag: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            mass,
            btag,
        }
    }

    pub fn p4(&self) -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(self.pt, self.eta, self.phi, self.mass)
    }
}

/// Read-only accessor over an event's jets.
///
/// Callers guarantee `index < jet_count()`; [`JetCandidates::new`] enforces it.
pub trait JetSource {
    fn jet_count(&self) -> usize;

    /// Corrected (pt, η, φ, m) of the jet at `index`.
    fn kinematics(&self, index: JetIndex) -> (f64, f64, f64, f64);

    fn btag(&self, index: JetIndex) -> f64;

    fn pt(&self, index: JetIndex) -> f64 {
        self.kinematics(index).0
    }

    fn p4(&self, index: JetIndex) -> FourMomentum {
        let (pt, eta, phi, mass) = self.kinematics(index);
        FourMomentum::from_pt_eta_phi_m(pt, eta, phi, mass)
    }
}

impl JetSource for [Jet] {
    fn jet_count(&self) -> usize {
        self.len()
    }

    fn kinematics(&self, index: JetIndex) -> (f64, f64, f64, f64) {
        let jet = &self[index];
        (jet.pt, jet.eta, jet.phi, jet.mass)
    }

    fn btag(&self, index: JetIndex) -> f64 {
        self[index].btag
    }
}

impl JetSource for Vec<Jet> {
    fn jet_count(&self) -> usize {
        self.as_slice().jet_count()
    }

    fn kinematics(&self, index: JetIndex) -> (f64, f64, f64, f64) {
        self.as_slice().kinematics(index)
    }

    fn btag(&self, index: JetIndex) -> f64 {
        self.as_slice().btag(index)
    }
}

/// Jets stored as parallel columns, the layout of flat event ntuples.
///
/// The columns always have equal length. Deserialization goes through
/// [`ColumnarJets::new`], so ragged input is an error rather than a
/// short column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColumns")]
pub struct ColumnarJets {
    pt: Vec<f64>,
    eta: Vec<f64>,
    phi: Vec<f64>,
    mass: Vec<f64>,
    btag: Vec<f64>,
}

/// Unchecked wire form of [`ColumnarJets`].
#[derive(Deserialize)]
struct RawColumns {
    pt: Vec<f64>,
    eta: Vec<f64>,
    phi: Vec<f64>,
    mass: Vec<f64>,
    btag: Vec<f64>,
}

impl TryFrom<RawColumns> for ColumnarJets {
    type Error = InputError;

    fn try_from(raw: RawColumns) -> Result<Self, Self::Error> {
        Self::new(raw.pt, raw.eta, raw.phi, raw.mass, raw.btag)
    }
}

impl ColumnarJets {
    /// Build from columns, which must all have the same length.
    pub fn new(
        pt: Vec<f64>,
        eta: Vec<f64>,
        phi: Vec<f64>,
        mass: Vec<f64>,
        btag: Vec<f64>,
    ) -> Result<Self, InputError> {
        let expected = pt.len();
        for (column, found) in [
            ("eta", eta.len()),
            ("phi", phi.len()),
            ("mass", mass.len()),
            ("btag", btag.len()),
        ] {
            if found != expected {
                return Err(InputError::ColumnLengthMismatch {
                    column,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            pt,
            eta,
            phi,
            mass,
            btag,
        })
    }
}

impl JetSource for ColumnarJets {
    fn jet_count(&self) -> usize {
        self.pt.len()
    }

    fn kinematics(&self, index: JetIndex) -> (f64, f64, f64, f64) {
        (
            self.pt[index],
            self.eta[index],
            self.phi[index],
            self.mass[index],
        )
    }

    fn btag(&self, index: JetIndex) -> f64 {
        self.btag[index]
    }
}

/// Validated set of candidate jets for one reconstruction call.
///
/// # Invariants
///
/// Every handle is in range for `source`, appears once, and refers to a jet
/// with finite kinematics, finite discriminant and non-negative pt.
#[derive(Debug)]
pub struct JetCandidates<'a, S: JetSource + ?Sized> {
    source: &'a S,
    handles: Vec<JetIndex>,
}

impl<'a, S: JetSource + ?Sized> JetCandidates<'a, S> {
    /// Validate `handles` against `source`, preserving their order.
    pub fn new(source: &'a S, handles: &[JetIndex]) -> Result<Self, InputError> {
        let len = source.jet_count();
        let mut seen = HashSet::with_capacity(handles.len());
        for &handle in handles {
            if handle >= len {
                return Err(InputError::HandleOutOfRange { handle, len });
            }
            if !seen.insert(handle) {
                return Err(InputError::DuplicateHandle(handle));
            }
            let (pt, eta, phi, mass) = source.kinematics(handle);
            for (field, value) in [
                ("pt", pt),
                ("eta", eta),
                ("phi", phi),
                ("mass", mass),
                ("btag", source.btag(handle)),
            ] {
                if !value.is_finite() {
                    return Err(InputError::NonFinite { handle, field });
                }
            }
            if pt < 0.0 {
                return Err(InputError::NegativePt { handle, pt });
            }
        }
        Ok(Self {
            source,
            handles: handles.to_vec(),
        })
    }

    /// Every jet in `source`, in collection order.
    pub fn all(source: &'a S) -> Result<Self, InputError> {
        let handles: Vec<JetIndex> = (0..source.jet_count()).collect();
        Self::new(source, &handles)
    }

    pub fn handles(&self) -> &[JetIndex] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn p4(&self, index: JetIndex) -> FourMomentum {
        self.source.p4(index)
    }

    pub fn pt(&self, index: JetIndex) -> f64 {
        self.source.pt(index)
    }

    pub fn eta(&self, index: JetIndex) -> f64 {
        self.source.kinematics(index).1
    }

    pub fn btag(&self, index: JetIndex) -> f64 {
        self.source.btag(index)
    }
}
