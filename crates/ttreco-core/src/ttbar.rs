//! Semileptonic ttbar hypothesis search.
//!
//! Jets are assigned to t → b W(→ qq') and t → b W(→ ℓν). The two leading
//! b-tagged jets are tried in both hadronic/leptonic orders, every light-jet
//! pair is tried as the hadronic W, and every neutrino p_z root closes the
//! leptonic W. The assignment minimizing
//!
//! ```text
//! χ² = ((m_bjj − m_t)/σ_t,had)² + ((m_jj − m_W)/σ_W,had)² + ((m_bℓν − m_t)/σ_t,lep)²
//! ```
//!
//! over that whole space is returned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combinatorics::{
    minimize, partition_jets, total_chi_square, unordered_pairs, ExcessBPlacement,
    MassConstraint, Scored, MIN_JETS,
};
use crate::config::{finite, MassHypotheses, Resolutions};
use crate::error::{ConfigError, ReconstructionFailure};
use crate::jets::{JetCandidates, JetIndex, JetSource};
use crate::kinematics::FourMomentum;
use crate::neutrino::{neutrino_p4, solve_neutrino_pz, NeutrinoSolution, PzSelection};
use crate::obs;

/// Winning ttbar assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTbarHypothesis {
    pub chi_square: f64,
    pub hadronic_b: JetIndex,
    pub leptonic_b: JetIndex,
    pub light_jets: [JetIndex; 2],
    pub neutrino_pz: f64,
    /// How the neutrino quadratic resolved for this event.
    pub neutrino_solution: NeutrinoSolution,
    pub hadronic_top: FourMomentum,
    pub hadronic_w: FourMomentum,
    pub leptonic_top: FourMomentum,
    pub neutrino: FourMomentum,
}

impl TTbarHypothesis {
    /// The four assigned jets: hadronic b, leptonic b, then the W pair.
    pub fn jet_indices(&self) -> [JetIndex; 4] {
        [
            self.hadronic_b,
            self.leptonic_b,
            self.light_jets[0],
            self.light_jets[1],
        ]
    }
}

/// One point of the search space.
#[derive(Debug, Clone, Copy)]
struct Assignment {
    hadronic_b: JetIndex,
    leptonic_b: JetIndex,
    light_jets: [JetIndex; 2],
    neutrino_pz: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    assignment: Assignment,
    hadronic_top: FourMomentum,
    hadronic_w: FourMomentum,
    leptonic_top: FourMomentum,
    neutrino: FourMomentum,
}

/// Stateless ttbar reconstructor.
///
/// The neutrino quadratic is always solved with [`PzSelection::Default`].
/// Both roots enter the search, so the policy only fixes which one is
/// reported as primary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTbarReconstructor {
    pub btag_threshold: f64,
    pub masses: MassHypotheses,
    pub resolutions: Resolutions,
}

impl TTbarReconstructor {
    /// Masses and the three subsystem widths must be finite and positive.
    pub fn new(
        btag_threshold: f64,
        masses: MassHypotheses,
        resolutions: Resolutions,
    ) -> Result<Self, ConfigError> {
        finite("btag_threshold", btag_threshold)?;
        masses.validate()?;
        resolutions.validate()?;
        Ok(Self {
            btag_threshold,
            masses,
            resolutions,
        })
    }

    fn hadronic_w_constraint(&self) -> MassConstraint {
        MassConstraint::new(self.masses.w, self.resolutions.hadronic_w)
    }

    fn hadronic_top_constraint(&self) -> MassConstraint {
        MassConstraint::new(self.masses.top, self.resolutions.hadronic_top)
    }

    fn leptonic_top_constraint(&self) -> MassConstraint {
        MassConstraint::new(self.masses.top, self.resolutions.leptonic_top)
    }

    /// Find the minimum-chi-square assignment for one event.
    ///
    /// `met` is read for its transverse components only.
    pub fn reconstruct<S: JetSource + ?Sized>(
        &self,
        lepton: &FourMomentum,
        met: &FourMomentum,
        candidates: &JetCandidates<'_, S>,
    ) -> Result<TTbarHypothesis, ReconstructionFailure> {
        let outcome = self.search(lepton, met, candidates);
        match &outcome {
            Ok(hyp) => obs::emit_ttbar_reconstructed(hyp),
            Err(failure) => obs::emit_reconstruction_failed("ttbar", failure),
        }
        outcome
    }

    fn search<S: JetSource + ?Sized>(
        &self,
        lepton: &FourMomentum,
        met: &FourMomentum,
        candidates: &JetCandidates<'_, S>,
    ) -> Result<TTbarHypothesis, ReconstructionFailure> {
        if candidates.len() < MIN_JETS {
            return Err(ReconstructionFailure::InsufficientJets {
                found: candidates.len(),
                required: MIN_JETS,
            });
        }

        let partition = partition_jets(
            candidates,
            candidates.handles(),
            self.btag_threshold,
            ExcessBPlacement::Append,
        )?;

        if self.resolutions.use_resolutions {
            debug!(
                jet_resolutions = self.resolutions.jets.len(),
                "per-object resolutions requested; chi-square still uses the fixed subsystem widths"
            );
        }

        let solution = solve_neutrino_pz(
            lepton,
            met,
            self.masses.lepton,
            self.masses.w,
            PzSelection::Default,
        );
        let pz_candidates = solution.candidates();
        debug!(
            b_jets = ?partition.b_jets,
            light = ?partition.light,
            ?solution,
            "ttbar search space"
        );

        let [b0, b1] = partition.b_jets;
        let assignments = [(b0, b1), (b1, b0)].into_iter().flat_map(|(had_b, lep_b)| {
            let pz_candidates = &pz_candidates;
            unordered_pairs(&partition.light).flat_map(move |(j1, j2)| {
                pz_candidates.iter().map(move |&pz| Assignment {
                    hadronic_b: had_b,
                    leptonic_b: lep_b,
                    light_jets: [j1, j2],
                    neutrino_pz: pz,
                })
            })
        });

        let hadronic_w_constraint = self.hadronic_w_constraint();
        let hadronic_top_constraint = self.hadronic_top_constraint();
        let leptonic_top_constraint = self.leptonic_top_constraint();

        let best = minimize(assignments, |assignment| {
            let [j1, j2] = assignment.light_jets;
            let hadronic_w = candidates.p4(j1) + candidates.p4(j2);
            let hadronic_top = candidates.p4(assignment.hadronic_b) + hadronic_w;
            let neutrino = neutrino_p4(met, assignment.neutrino_pz);
            let leptonic_top = candidates.p4(assignment.leptonic_b) + *lepton + neutrino;

            let chi_square = total_chi_square(&[
                (hadronic_top_constraint, hadronic_top.mass()),
                (hadronic_w_constraint, hadronic_w.mass()),
                (leptonic_top_constraint, leptonic_top.mass()),
            ]);
            Scored {
                value: Candidate {
                    assignment,
                    hadronic_top,
                    hadronic_w,
                    leptonic_top,
                    neutrino,
                },
                chi_square,
            }
        })
        .ok_or(ReconstructionFailure::NoValidHypothesis)?;

        let Candidate {
            assignment,
            hadronic_top,
            hadronic_w,
            leptonic_top,
            neutrino,
        } = best.value;
        Ok(TTbarHypothesis {
            chi_square: best.chi_square,
            hadronic_b: assignment.hadronic_b,
            leptonic_b: assignment.leptonic_b,
            light_jets: assignment.light_jets,
            neutrino_pz: assignment.neutrino_pz,
            neutrino_solution: solution,
            hadronic_top,
            hadronic_w,
            leptonic_top,
            neutrino,
        })
    }
}

/// Flat record of a ttbar reconstruction, for reporting.
///
/// Every optional field is `None` (serialized `null`) and `chi_square` is
/// `+inf` when `success` is false. Use [`crate::jets::index_or_sentinel`] for
/// consumers that expect `-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionResult {
    pub success: bool,
    pub chi_square: f64,
    pub hadronic_b: Option<JetIndex>,
    pub leptonic_b: Option<JetIndex>,
    pub light_jet_1: Option<JetIndex>,
    pub light_jet_2: Option<JetIndex>,
    pub neutrino_pz: Option<f64>,
    pub neutrino_complex: Option<bool>,
    pub hadronic_top: Option<FourMomentum>,
    pub hadronic_w: Option<FourMomentum>,
    pub leptonic_top: Option<FourMomentum>,
    pub failure: Option<ReconstructionFailure>,
}

impl From<Result<TTbarHypothesis, ReconstructionFailure>> for ReconstructionResult {
    fn from(outcome: Result<TTbarHypothesis, ReconstructionFailure>) -> Self {
        match outcome {
            Ok(hyp) => Self {
                success: true,
                chi_square: hyp.chi_square,
                hadronic_b: Some(hyp.hadronic_b),
                leptonic_b: Some(hyp.leptonic_b),
                light_jet_1: Some(hyp.light_jets[0]),
                light_jet_2: Some(hyp.light_jets[1]),
                neutrino_pz: Some(hyp.neutrino_pz),
                neutrino_complex: Some(hyp.neutrino_solution.is_complex_root()),
                hadronic_top: Some(hyp.hadronic_top),
                hadronic_w: Some(hyp.hadronic_w),
                leptonic_top: Some(hyp.leptonic_top),
                failure: None,
            },
            Err(failure) => Self {
                success: false,
                chi_square: f64::INFINITY,
                hadronic_b: None,
                leptonic_b: None,
                light_jet_1: None,
                light_jet_2: None,
                neutrino_pz: None,
                neutrino_complex: None,
                hadronic_top: None,
                hadronic_w: None,
                leptonic_top: None,
                failure: Some(failure),
            },
        }
    }
}
