//! Parallel driver running both reconstructors over many events.
//!
//! Events are independent, so the batch is a `rayon` parallel map. Output
//! order always matches input order. An event with malformed inputs yields an
//! outcome carrying the error instead of stopping the batch; an invalid
//! configuration stops it before any event runs.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ReconstructionConfig;
use crate::error::{ConfigError, InputError};
use crate::event::EventInput;
use crate::hadronic_w::{HadronicWReconstructor, HadronicWResult};
use crate::obs::{self, EventSpan};
use crate::quality::average_light_pt;
use crate::ttbar::{ReconstructionResult, TTbarReconstructor};

/// Downstream cut decisions for one event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Acceptance {
    pub ttbar: bool,
    pub hadronic_w: bool,
    pub ttbar_average_light_pt: Option<f64>,
    pub hadronic_w_average_light_pt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_id: u64,
    pub ttbar: Option<ReconstructionResult>,
    pub hadronic_w: Option<HadronicWResult>,
    pub acceptance: Acceptance,
    /// Input validation error; both results are absent when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventOutcome {
    fn rejected(event_id: u64, error: &InputError) -> Self {
        obs::emit_event_rejected(event_id, error);
        Self {
            event_id,
            ttbar: None,
            hadronic_w: None,
            acceptance: Acceptance::default(),
            error: Some(error.to_string()),
        }
    }

    pub fn accepted_any(&self) -> bool {
        self.acceptance.ttbar || self.acceptance.hadronic_w
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub events: usize,
    pub rejected: usize,
    pub ttbar_ok: usize,
    pub hadronic_w_ok: usize,
    pub ttbar_accepted: usize,
    pub hadronic_w_accepted: usize,
    /// Failure kind → count, over both reconstructors.
    pub failures: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[EventOutcome]) -> Self {
        let mut summary = Self {
            events: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            if outcome.error.is_some() {
                summary.rejected += 1;
                continue;
            }
            if let Some(tt) = &outcome.ttbar {
                if tt.success {
                    summary.ttbar_ok += 1;
                }
                if let Some(failure) = &tt.failure {
                    *summary.failures.entry(failure.kind().to_string()).or_default() += 1;
                }
            }
            if let Some(w) = &outcome.hadronic_w {
                if w.success {
                    summary.hadronic_w_ok += 1;
                }
                if let Some(failure) = &w.failure {
                    *summary.failures.entry(failure.kind().to_string()).or_default() += 1;
                }
            }
            summary.ttbar_accepted += usize::from(outcome.acceptance.ttbar);
            summary.hadronic_w_accepted += usize::from(outcome.acceptance.hadronic_w);
        }
        summary
    }
}

struct Reconstructors {
    hadronic_w: HadronicWReconstructor,
    ttbar: TTbarReconstructor,
}

impl Reconstructors {
    fn from_config(config: &ReconstructionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hadronic_w: config.hadronic_w_reconstructor()?,
            ttbar: config.ttbar_reconstructor()?,
        })
    }
}

fn run_event(
    event: &EventInput,
    config: &ReconstructionConfig,
    reco: &Reconstructors,
) -> Result<EventOutcome, InputError> {
    let _span = EventSpan::enter(event.event_id);
    let lepton = event.lepton_p4()?;
    let met = event.met_p4()?;
    let candidates = event.candidates()?;

    let hadronic_w = reco.hadronic_w.reconstruct(&candidates);
    let ttbar = reco.ttbar.reconstruct(&lepton, &met, &candidates);

    let cuts = &config.quality;
    let acceptance = Acceptance {
        hadronic_w: hadronic_w
            .as_ref()
            .is_ok_and(|hyp| cuts.accepts_hadronic_w(&candidates, hyp)),
        ttbar: ttbar
            .as_ref()
            .is_ok_and(|hyp| cuts.accepts_ttbar(&candidates, hyp)),
        hadronic_w_average_light_pt: hadronic_w
            .as_ref()
            .ok()
            .map(|hyp| average_light_pt(&candidates, hyp.light_jets)),
        ttbar_average_light_pt: ttbar
            .as_ref()
            .ok()
            .map(|hyp| average_light_pt(&candidates, hyp.light_jets)),
    };

    Ok(EventOutcome {
        event_id: event.event_id,
        ttbar: Some(ttbar.into()),
        hadronic_w: Some(hadronic_w.into()),
        acceptance,
        error: None,
    })
}

/// Reconstruct a single event with both reconstructors.
pub fn reconstruct_event(
    event: &EventInput,
    config: &ReconstructionConfig,
) -> Result<EventOutcome, ConfigError> {
    let reco = Reconstructors::from_config(config)?;
    Ok(run_event(event, config, &reco)
        .unwrap_or_else(|err| EventOutcome::rejected(event.event_id, &err)))
}

/// Reconstruct every event in parallel; outcomes are in input order.
pub fn reconstruct_events(
    events: &[EventInput],
    config: &ReconstructionConfig,
) -> Result<Vec<EventOutcome>, ConfigError> {
    let start = Instant::now();
    let reco = Reconstructors::from_config(config)?;

    let outcomes: Vec<EventOutcome> = events
        .par_iter()
        .map(|event| {
            run_event(event, config, &reco)
                .unwrap_or_else(|err| EventOutcome::rejected(event.event_id, &err))
        })
        .collect();

    let summary = BatchSummary::from_outcomes(&outcomes);
    obs::emit_batch_finished(
        summary.events,
        summary.ttbar_ok,
        summary.hadronic_w_ok,
        start.elapsed().as_millis() as u64,
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{LeptonInput, MetInput};
    use crate::jets::Jet;

    fn event(event_id: u64, jets: Vec<Jet>) -> EventInput {
        EventInput {
            event_id,
            lepton: LeptonInput {
                pt: 40.0,
                eta: 0.5,
                phi: 0.0,
                mass: 0.000511,
            },
            met: MetInput {
                pt: 31.6,
                phi: 0.32,
            },
            jets,
            candidates: None,
        }
    }

    #[test]
    fn test_rejected_event_does_not_stop_batch() {
        let good = event(
            1,
            vec![
                Jet::new(70.0, 0.2, 0.0, 5.0, 0.9),
                Jet::new(65.0, -0.5, 2.5, 5.0, 0.8),
                Jet::new(45.0, 0.8, 1.2, 5.0, 0.1),
                Jet::new(35.0, -1.1, -2.0, 5.0, 0.2),
            ],
        );
        let mut bad = good.clone();
        bad.event_id = 2;
        bad.jets[1].pt = f64::NAN;

        let outcomes = reconstruct_events(&[good, bad], &ReconstructionConfig::default()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].error.is_none());
        assert!(outcomes[0].ttbar.as_ref().unwrap().success);
        assert_eq!(outcomes[1].event_id, 2);
        assert!(outcomes[1].error.as_deref().unwrap().contains("non-finite pt"));
        assert!(outcomes[1].ttbar.is_none());

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.events, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.ttbar_ok, 1);
    }

    #[test]
    fn test_failures_are_counted_by_kind() {
        let few = event(3, vec![Jet::new(70.0, 0.2, 0.0, 5.0, 0.9); 3]);
        let outcomes = reconstruct_events(&[few], &ReconstructionConfig::default()).unwrap();
        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.failures.get("insufficient_jets"), Some(&2));
        assert_eq!(summary.ttbar_ok, 0);
        assert!(!outcomes[0].accepted_any());
    }

    #[test]
    fn test_invalid_config_stops_batch() {
        let ok = event(4, vec![Jet::new(70.0, 0.2, 0.0, 5.0, 0.9); 4]);
        let mut config = ReconstructionConfig::default();
        config.resolutions.hadronic_top = 0.0;
        let expected = ConfigError::NonPositive {
            field: "resolutions.hadronic_top",
            value: 0.0,
        };
        assert_eq!(
            reconstruct_events(std::slice::from_ref(&ok), &config).unwrap_err(),
            expected
        );
        assert_eq!(reconstruct_event(&ok, &config).unwrap_err(), expected);
    }
}
