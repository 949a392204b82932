//! Shared jet-assignment combinatorics.
//!
//! Both reconstructors follow the same recipe: reserve the two most b-like
//! jets, enumerate unordered pairs from what is left, score every hypothesis
//! with a sum of Gaussian mass terms, keep the smallest. The pieces live here
//! so the W-only and ttbar searches cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::ReconstructionFailure;
use crate::jets::{JetCandidates, JetIndex, JetSource};

/// Candidate count below which neither reconstruction is attempted.
pub const MIN_JETS: usize = 4;

/// Leading-pt jets kept by the hadronic-W search.
pub const MAX_LEADING_JETS: usize = 8;

// ---------------------------------------------------------------------------
// Mass constraints
// ---------------------------------------------------------------------------

/// A nominal mass and the resolution it is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassConstraint {
    pub nominal: f64,
    pub sigma: f64,
}

impl MassConstraint {
    pub fn new(nominal: f64, sigma: f64) -> Self {
        Self { nominal, sigma }
    }

    /// (m − nominal) / σ
    pub fn pull(&self, mass: f64) -> f64 {
        (mass - self.nominal) / self.sigma
    }

    /// ((m − nominal) / σ)²
    pub fn chi_square(&self, mass: f64) -> f64 {
        let pull = self.pull(mass);
        pull * pull
    }
}

/// Sum of chi-square terms for (constraint, reconstructed mass) pairs.
pub fn total_chi_square(terms: &[(MassConstraint, f64)]) -> f64 {
    terms.iter().map(|(c, m)| c.chi_square(*m)).sum()
}

// ---------------------------------------------------------------------------
// b / light partition
// ---------------------------------------------------------------------------

/// Where b-tagged jets beyond the leading two go in the light pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcessBPlacement {
    /// Stay at their position in the input order.
    KeepOrder,
    /// Follow all untagged jets, in descending discriminant order.
    Append,
}

/// The two reserved b-jets and the pool the dijet is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JetPartition {
    /// Highest discriminant first.
    pub b_jets: [JetIndex; 2],
    pub light: Vec<JetIndex>,
}

/// Split `ordered` into the two leading b-tagged jets and the light pool.
///
/// A jet is b-tagged when its discriminant is strictly above `threshold`.
/// Sorting is stable, so equal discriminants keep their input order.
pub fn partition_jets<S: JetSource + ?Sized>(
    candidates: &JetCandidates<'_, S>,
    ordered: &[JetIndex],
    btag_threshold: f64,
    placement: ExcessBPlacement,
) -> Result<JetPartition, ReconstructionFailure> {
    let mut tagged: Vec<JetIndex> = ordered
        .iter()
        .copied()
        .filter(|&j| candidates.btag(j) > btag_threshold)
        .collect();
    tagged.sort_by(|&a, &b| candidates.btag(b).total_cmp(&candidates.btag(a)));

    if tagged.len() < 2 {
        return Err(ReconstructionFailure::InsufficientBJets {
            found: tagged.len(),
        });
    }
    let b_jets = [tagged[0], tagged[1]];

    let light: Vec<JetIndex> = match placement {
        ExcessBPlacement::KeepOrder => ordered
            .iter()
            .copied()
            .filter(|j| !b_jets.contains(j))
            .collect(),
        ExcessBPlacement::Append => ordered
            .iter()
            .copied()
            .filter(|&j| candidates.btag(j) <= btag_threshold)
            .chain(tagged[2..].iter().copied())
            .collect(),
    };

    if light.len() < 2 {
        return Err(ReconstructionFailure::InsufficientLightJets { found: light.len() });
    }

    Ok(JetPartition { b_jets, light })
}

/// Candidate handles sorted by descending pt (stable), capped at `cap` entries.
pub fn leading_by_pt<S: JetSource + ?Sized>(
    candidates: &JetCandidates<'_, S>,
    cap: usize,
) -> Vec<JetIndex> {
    let mut sorted = candidates.handles().to_vec();
    sorted.sort_by(|&a, &b| candidates.pt(b).total_cmp(&candidates.pt(a)));
    sorted.truncate(cap);
    sorted
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Every unordered pair `(pool[i], pool[j])`, `i < j`, in nested-loop order.
pub fn unordered_pairs(pool: &[JetIndex]) -> impl Iterator<Item = (JetIndex, JetIndex)> + '_ {
    pool.iter()
        .enumerate()
        .flat_map(move |(i, &a)| pool[i + 1..].iter().map(move |&b| (a, b)))
}

/// A hypothesis together with its chi-square.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub value: T,
    pub chi_square: f64,
}

/// Evaluate every hypothesis and keep the first one with the strictly
/// smallest chi-square. NaN scores never win; `None` if nothing scored.
pub fn minimize<H, T, F>(hypotheses: impl IntoIterator<Item = H>, mut evaluate: F) -> Option<Scored<T>>
where
    F: FnMut(H) -> Scored<T>,
{
    let mut best: Option<Scored<T>> = None;
    for hypothesis in hypotheses {
        let scored = evaluate(hypothesis);
        let better = match &best {
            Some(current) => scored.chi_square < current.chi_square,
            None => !scored.chi_square.is_nan(),
        };
        if better {
            best = Some(scored);
        }
    }
    best
}
