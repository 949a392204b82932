//! Standalone hadronic W → qq' reconstruction.
//!
//! From the eight leading jets, the two most b-like are set aside and the
//! remaining pair whose invariant mass is closest to m_W (in units of the
//! W resolution) is returned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combinatorics::{
    leading_by_pt, minimize, partition_jets, unordered_pairs, ExcessBPlacement, MassConstraint,
    Scored, MAX_LEADING_JETS, MIN_JETS,
};
use crate::config::{finite, positive};
use crate::error::{ConfigError, ReconstructionFailure};
use crate::jets::{JetCandidates, JetIndex, JetSource};
use crate::kinematics::FourMomentum;
use crate::obs;

/// Best dijet found by [`HadronicWReconstructor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HadronicWHypothesis {
    pub light_jets: [JetIndex; 2],
    pub chi_square: f64,
    pub dijet: FourMomentum,
}

/// Stateless W-only reconstructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HadronicWReconstructor {
    pub btag_threshold: f64,
    pub w: MassConstraint,
}

impl HadronicWReconstructor {
    /// `w_mass` and `w_sigma` must be finite and positive.
    pub fn new(btag_threshold: f64, w_mass: f64, w_sigma: f64) -> Result<Self, ConfigError> {
        finite("btag_threshold", btag_threshold)?;
        positive("masses.w", w_mass)?;
        positive("resolutions.hadronic_w", w_sigma)?;
        Ok(Self {
            btag_threshold,
            w: MassConstraint::new(w_mass, w_sigma),
        })
    }

    /// Search the candidates for the dijet closest to the W mass.
    pub fn reconstruct<S: JetSource + ?Sized>(
        &self,
        candidates: &JetCandidates<'_, S>,
    ) -> Result<HadronicWHypothesis, ReconstructionFailure> {
        let outcome = self.search(candidates);
        match &outcome {
            Ok(hyp) => obs::emit_hadronic_w_reconstructed(hyp),
            Err(failure) => obs::emit_reconstruction_failed("hadronic_w", failure),
        }
        outcome
    }

    fn search<S: JetSource + ?Sized>(
        &self,
        candidates: &JetCandidates<'_, S>,
    ) -> Result<HadronicWHypothesis, ReconstructionFailure> {
        let leading = leading_by_pt(candidates, MAX_LEADING_JETS);
        if leading.len() < MIN_JETS {
            return Err(ReconstructionFailure::InsufficientJets {
                found: leading.len(),
                required: MIN_JETS,
            });
        }

        let partition = partition_jets(
            candidates,
            &leading,
            self.btag_threshold,
            ExcessBPlacement::KeepOrder,
        )?;
        debug!(
            b_jets = ?partition.b_jets,
            light = ?partition.light,
            "hadronic W jet partition"
        );

        let best = minimize(unordered_pairs(&partition.light), |(j1, j2)| {
            let dijet = candidates.p4(j1) + candidates.p4(j2);
            Scored {
                chi_square: self.w.chi_square(dijet.mass()),
                value: HadronicWHypothesis {
                    light_jets: [j1, j2],
                    chi_square: 0.0,
                    dijet,
                },
            }
        })
        .ok_or(ReconstructionFailure::NoValidHypothesis)?;

        Ok(HadronicWHypothesis {
            chi_square: best.chi_square,
            ..best.value
        })
    }
}

/// Flat record of a W-only reconstruction, for reporting.
///
/// `light_jets` is `None` and `chi_square` is `+inf` when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HadronicWResult {
    pub success: bool,
    pub chi_square: f64,
    pub light_jets: Option<[JetIndex; 2]>,
    pub dijet: Option<FourMomentum>,
    pub failure: Option<ReconstructionFailure>,
}

impl From<Result<HadronicWHypothesis, ReconstructionFailure>> for HadronicWResult {
    fn from(outcome: Result<HadronicWHypothesis, ReconstructionFailure>) -> Self {
        match outcome {
            Ok(hyp) => Self {
                success: true,
                chi_square: hyp.chi_square,
                light_jets: Some(hyp.light_jets),
                dijet: Some(hyp.dijet),
                failure: None,
            },
            Err(failure) => Self {
                success: false,
                chi_square: f64::INFINITY,
                light_jets: None,
                dijet: None,
                failure: Some(failure),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jets::Jet;

    fn reco() -> HadronicWReconstructor {
        HadronicWReconstructor::new(0.5, 80.4, 24.0).unwrap()
    }

    #[test]
    fn test_three_jets_insufficient() {
        let jets = vec![
            Jet::new(60.0, 0.0, 0.0, 5.0, 0.9),
            Jet::new(50.0, 0.0, 2.0, 5.0, 0.9),
            Jet::new(40.0, 0.0, -2.0, 5.0, 0.1),
        ];
        let cands = JetCandidates::all(&jets).unwrap();
        assert_eq!(
            reco().reconstruct(&cands),
            Err(ReconstructionFailure::InsufficientJets {
                found: 3,
                required: 4
            })
        );
    }

    #[test]
    fn test_only_leading_eight_considered() {
        // Two soft light jets beyond the cap would make a perfect W, but are cut.
        let mut jets = vec![
            Jet::new(100.0, 0.0, 0.0, 5.0, 0.9),
            Jet::new(95.0, 0.0, 1.0, 5.0, 0.9),
        ];
        for i in 0..6 {
            jets.push(Jet::new(90.0 - i as f64, 0.2 * i as f64, 0.1 * i as f64, 5.0, 0.1));
        }
        jets.push(Jet::new(40.2, 0.0, 0.0, 0.0, 0.1));
        jets.push(Jet::new(40.2, 0.0, std::f64::consts::PI, 0.0, 0.1));

        let cands = JetCandidates::all(&jets).unwrap();
        let hyp = reco().reconstruct(&cands).unwrap();
        assert!(hyp.light_jets.iter().all(|&j| j < 8));
    }

    #[test]
    fn test_zero_or_nan_width_rejected() {
        assert_eq!(
            HadronicWReconstructor::new(0.5, 80.4, 0.0).unwrap_err(),
            ConfigError::NonPositive {
                field: "resolutions.hadronic_w",
                value: 0.0
            }
        );
        assert_eq!(
            HadronicWReconstructor::new(0.5, 80.4, f64::NAN).unwrap_err(),
            ConfigError::NonFinite("resolutions.hadronic_w")
        );
        assert!(matches!(
            HadronicWReconstructor::new(0.5, -80.4, 24.0),
            Err(ConfigError::NonPositive {
                field: "masses.w",
                ..
            })
        ));
    }

    #[test]
    fn test_result_sentinels_on_failure() {
        let result: HadronicWResult =
            Err(ReconstructionFailure::InsufficientBJets { found: 0 }).into();
        assert!(!result.success);
        assert_eq!(result.chi_square, f64::INFINITY);
        assert!(result.light_jets.is_none());
        assert!(result.dijet.is_none());
    }
}
