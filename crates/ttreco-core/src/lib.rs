//! ttreco Core Library
//!
//! Chi-square kinematic reconstruction of semileptonic ttbar events and of
//! standalone hadronic W → qq' decays, plus the neutrino p_z solver they share.

pub mod batch;
pub mod combinatorics;
pub mod config;
pub mod error;
pub mod event;
pub mod hadronic_w;
pub mod jets;
pub mod kinematics;
pub mod neutrino;
pub mod obs;
pub mod quality;
pub mod telemetry;
pub mod tolerances;
pub mod ttbar;

pub use batch::{reconstruct_event, reconstruct_events, Acceptance, BatchSummary, EventOutcome};

pub use combinatorics::{MassConstraint, MAX_LEADING_JETS, MIN_JETS};

pub use config::{MassHypotheses, ReconstructionConfig, Resolutions, DEFAULT_BTAG_THRESHOLD};

pub use error::{ConfigError, InputError, RecoError, ReconstructionFailure, Result};

pub use event::{EventInput, LeptonInput, MetInput};

pub use hadronic_w::{HadronicWHypothesis, HadronicWReconstructor, HadronicWResult};

pub use jets::{index_or_sentinel, ColumnarJets, Jet, JetCandidates, JetIndex, JetSource};

pub use kinematics::{FourMomentum, ThreeVector};

pub use neutrino::{
    neutrino_p4, solve_neutrino_pz, NeutrinoQuadratic, NeutrinoSolution, PzSelection,
};

pub use obs::EventSpan;

pub use quality::{average_light_pt, QualityCuts};

pub use telemetry::init_tracing;

pub use ttbar::{ReconstructionResult, TTbarHypothesis, TTbarReconstructor};
