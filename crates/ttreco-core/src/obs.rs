//! Structured observability hooks for reconstruction events.
//!
//! This module provides:
//! - Event-scoped tracing spans via the `EventSpan` RAII guard
//! - Emission functions for reconstruction outcomes and batch progress
//!
//! Outcomes are emitted at `debug!` level so per-event output stays quiet under
//! the default `info` filter. Batch summaries are emitted at `info!`.

use tracing::{debug, info, warn};

use crate::error::ReconstructionFailure;
use crate::hadronic_w::HadronicWHypothesis;
use crate::ttbar::TTbarHypothesis;

/// RAII guard that enters an event-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = EventSpan::enter(42);
/// // Every tracing call below carries event_id = 42
/// ```
pub struct EventSpan {
    _span: tracing::span::EnteredSpan,
}

impl EventSpan {
    pub fn enter(event_id: u64) -> Self {
        let span = tracing::debug_span!("ttreco.event", event_id = event_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: hadronic W found.
pub fn emit_hadronic_w_reconstructed(hyp: &HadronicWHypothesis) {
    debug!(
        event = "hadronic_w.reconstructed",
        jet1 = hyp.light_jets[0],
        jet2 = hyp.light_jets[1],
        chi_square = hyp.chi_square,
        mass = hyp.dijet.mass(),
    );
}

/// Emit event: ttbar hypothesis found.
pub fn emit_ttbar_reconstructed(hyp: &TTbarHypothesis) {
    debug!(
        event = "ttbar.reconstructed",
        hadronic_b = hyp.hadronic_b,
        leptonic_b = hyp.leptonic_b,
        jet1 = hyp.light_jets[0],
        jet2 = hyp.light_jets[1],
        neutrino_pz = hyp.neutrino_pz,
        complex_root = hyp.neutrino_solution.is_complex_root(),
        chi_square = hyp.chi_square,
    );
}

/// Emit event: a reconstructor returned no hypothesis.
pub fn emit_reconstruction_failed(reconstructor: &str, failure: &ReconstructionFailure) {
    debug!(
        event = "reconstruction.failed",
        reconstructor = %reconstructor,
        reason = %failure,
    );
}

/// Emit event: an event was rejected before reconstruction (warning level).
pub fn emit_event_rejected(event_id: u64, error: &dyn std::fmt::Display) {
    warn!(event = "event.rejected", event_id = event_id, error = %error);
}

/// Emit event: batch finished with counts and wall time.
pub fn emit_batch_finished(events: usize, ttbar_ok: usize, hadronic_w_ok: usize, duration_ms: u64) {
    info!(
        event = "batch.finished",
        events = events,
        ttbar_ok = ttbar_ok,
        hadronic_w_ok = hadronic_w_ok,
        duration_ms = duration_ms,
    );
}
