//! Downstream acceptance cuts on reconstructed hypotheses.
//!
//! The reconstructors always return their best hypothesis. Whether that
//! hypothesis is good enough to report is decided here, by the caller.

use serde::{Deserialize, Serialize};

use crate::hadronic_w::HadronicWHypothesis;
use crate::jets::{JetCandidates, JetIndex, JetSource};
use crate::ttbar::TTbarHypothesis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCuts {
    /// Both W jets must satisfy |η| < this.
    pub max_abs_eta_light: f64,
    /// Hypotheses must satisfy χ² < this.
    pub max_chi_square: f64,
}

impl Default for QualityCuts {
    fn default() -> Self {
        Self {
            max_abs_eta_light: 1.3,
            max_chi_square: 10.0,
        }
    }
}

impl QualityCuts {
    fn accepts<S: JetSource + ?Sized>(
        &self,
        candidates: &JetCandidates<'_, S>,
        light_jets: [JetIndex; 2],
        chi_square: f64,
    ) -> bool {
        light_jets
            .iter()
            .all(|&j| candidates.eta(j).abs() < self.max_abs_eta_light)
            && chi_square < self.max_chi_square
    }

    pub fn accepts_hadronic_w<S: JetSource + ?Sized>(
        &self,
        candidates: &JetCandidates<'_, S>,
        hyp: &HadronicWHypothesis,
    ) -> bool {
        self.accepts(candidates, hyp.light_jets, hyp.chi_square)
    }

    pub fn accepts_ttbar<S: JetSource + ?Sized>(
        &self,
        candidates: &JetCandidates<'_, S>,
        hyp: &TTbarHypothesis,
    ) -> bool {
        self.accepts(candidates, hyp.light_jets, hyp.chi_square)
    }
}

/// Mean pt of the two W jets.
pub fn average_light_pt<S: JetSource + ?Sized>(
    candidates: &JetCandidates<'_, S>,
    light_jets: [JetIndex; 2],
) -> f64 {
    0.5 * (candidates.pt(light_jets[0]) + candidates.pt(light_jets[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jets::Jet;
    use crate::kinematics::FourMomentum;

    fn hyp(light_jets: [JetIndex; 2], chi_square: f64) -> HadronicWHypothesis {
        HadronicWHypothesis {
            light_jets,
            chi_square,
            dijet: FourMomentum::default(),
        }
    }

    #[test]
    fn test_cuts() {
        let jets = vec![
            Jet::new(50.0, 0.2, 0.0, 5.0, 0.1),
            Jet::new(30.0, -1.29, 1.0, 5.0, 0.1),
            Jet::new(40.0, 1.3, 2.0, 5.0, 0.1),
        ];
        let cands = JetCandidates::all(&jets).unwrap();
        let cuts = QualityCuts::default();

        assert!(cuts.accepts_hadronic_w(&cands, &hyp([0, 1], 2.0)));
        // Window edge is exclusive.
        assert!(!cuts.accepts_hadronic_w(&cands, &hyp([0, 2], 2.0)));
        assert!(!cuts.accepts_hadronic_w(&cands, &hyp([0, 1], 10.0)));
        assert!(!cuts.accepts_hadronic_w(&cands, &hyp([0, 1], f64::NAN)));
    }

    #[test]
    fn test_average_light_pt() {
        let jets = vec![
            Jet::new(50.0, 0.0, 0.0, 5.0, 0.1),
            Jet::new(30.0, 0.0, 1.0, 5.0, 0.1),
        ];
        let cands = JetCandidates::all(&jets).unwrap();
        assert_eq!(average_light_pt(&cands, [0, 1]), 40.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cuts: QualityCuts = serde_json::from_str(r#"{"max_chi_square": 5.0}"#).unwrap();
        assert_eq!(cuts.max_chi_square, 5.0);
        assert_eq!(cuts.max_abs_eta_light, 1.3);
    }
}
