//! Serialized per-event inputs.

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::jets::{Jet, JetCandidates, JetIndex};
use crate::kinematics::FourMomentum;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeptonInput {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    #[serde(default)]
    pub mass: f64,
}

/// Missing transverse momentum in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetInput {
    pub pt: f64,
    pub phi: f64,
}

/// One event: the selected lepton, the corrected MET and the jet collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub event_id: u64,
    pub lepton: LeptonInput,
    pub met: MetInput,
    pub jets: Vec<Jet>,
    /// Jets to consider; every jet when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<JetIndex>>,
}

fn check_finite(object: &'static str, fields: &[(&'static str, f64)]) -> Result<(), InputError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, _)) => Err(InputError::NonFiniteObject { object, field }),
        None => Ok(()),
    }
}

impl EventInput {
    pub fn lepton_p4(&self) -> Result<FourMomentum, InputError> {
        let l = &self.lepton;
        check_finite(
            "lepton",
            &[("pt", l.pt), ("eta", l.eta), ("phi", l.phi), ("mass", l.mass)],
        )?;
        Ok(FourMomentum::from_pt_eta_phi_m(l.pt, l.eta, l.phi, l.mass))
    }

    /// MET as a purely transverse four-vector.
    pub fn met_p4(&self) -> Result<FourMomentum, InputError> {
        check_finite("met", &[("pt", self.met.pt), ("phi", self.met.phi)])?;
        Ok(FourMomentum::transverse(
            self.met.pt * self.met.phi.cos(),
            self.met.pt * self.met.phi.sin(),
        ))
    }

    pub fn candidates(&self) -> Result<JetCandidates<'_, [Jet]>, InputError> {
        match &self.candidates {
            Some(handles) => JetCandidates::new(self.jets.as_slice(), handles),
            None => JetCandidates::all(self.jets.as_slice()),
        }
    }
}
