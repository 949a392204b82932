//! Reconstruction configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration. [`ReconstructionConfig::validate`] runs once when a
//! configuration is loaded, and the reconstructor constructors repeat the
//! checks for the fields they use.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::hadronic_w::HadronicWReconstructor;
use crate::quality::QualityCuts;
use crate::ttbar::TTbarReconstructor;

/// Medium working point of the DeepJet b-tag discriminant.
pub const DEFAULT_BTAG_THRESHOLD: f64 = 0.7100;

/// Nominal masses (GeV).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassHypotheses {
    pub lepton: f64,
    pub w: f64,
    pub top: f64,
}

impl Default for MassHypotheses {
    fn default() -> Self {
        Self {
            lepton: 0.000_510_998_91,
            w: 80.4,
            top: 172.0,
        }
    }
}

/// Mass resolutions (GeV) used as chi-square widths.
///
/// `lepton`, `met`, `jets` and `use_resolutions` are carried for callers
/// that record them; the chi-square uses only the three subsystem widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolutions {
    pub hadronic_w: f64,
    pub hadronic_top: f64,
    pub leptonic_top: f64,
    pub lepton: f64,
    pub met: f64,
    pub jets: Vec<f64>,
    pub use_resolutions: bool,
}

impl MassHypotheses {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        // The lepton mass may be zero; only its finiteness matters.
        finite("masses.lepton", self.lepton)?;
        positive("masses.w", self.w)?;
        positive("masses.top", self.top)
    }
}

impl Default for Resolutions {
    fn default() -> Self {
        Self {
            hadronic_w: 24.0,
            hadronic_top: 34.0,
            leptonic_top: 30.0,
            lepton: 0.0,
            met: 0.0,
            jets: Vec::new(),
            use_resolutions: false,
        }
    }
}

impl Resolutions {
    /// The three subsystem widths divide chi-square terms and must be
    /// positive; the per-object resolutions only need to be finite.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        positive("resolutions.hadronic_w", self.hadronic_w)?;
        positive("resolutions.hadronic_top", self.hadronic_top)?;
        positive("resolutions.leptonic_top", self.leptonic_top)?;
        finite("resolutions.lepton", self.lepton)?;
        finite("resolutions.met", self.met)?;
        if self.jets.iter().any(|r| !r.is_finite()) {
            return Err(ConfigError::NonFinite("resolutions.jets"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Jets with discriminant strictly above this are b-tagged.
    pub btag_threshold: f64,
    pub masses: MassHypotheses,
    pub resolutions: Resolutions,
    pub quality: QualityCuts,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            btag_threshold: DEFAULT_BTAG_THRESHOLD,
            masses: MassHypotheses::default(),
            resolutions: Resolutions::default(),
            quality: QualityCuts::default(),
        }
    }
}

pub(crate) fn finite(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(field))
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl ReconstructionConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        finite("btag_threshold", self.btag_threshold)?;
        self.masses.validate()?;
        self.resolutions.validate()?;
        positive("quality.max_abs_eta_light", self.quality.max_abs_eta_light)?;
        finite("quality.max_chi_square", self.quality.max_chi_square)?;
        Ok(())
    }

    pub fn hadronic_w_reconstructor(
        &self,
    ) -> std::result::Result<HadronicWReconstructor, ConfigError> {
        HadronicWReconstructor::new(
            self.btag_threshold,
            self.masses.w,
            self.resolutions.hadronic_w,
        )
    }

    pub fn ttbar_reconstructor(&self) -> std::result::Result<TTbarReconstructor, ConfigError> {
        TTbarReconstructor::new(self.btag_threshold, self.masses, self.resolutions.clone())
    }
}
