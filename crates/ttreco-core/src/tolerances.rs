//! Numerical thresholds shared by the solvers and their tests.

// ═══════════════════════════════════════════════════════════════════
// Solver thresholds
// ═══════════════════════════════════════════════════════════════════

/// Leading coefficient below which the neutrino quadratic is treated as linear.
///
/// A = 4(E² − p_z²) = 4(p_T² + m²) for the lepton, so this only triggers for
/// a massless lepton travelling (numerically) along the beam.
pub const DEGENERATE_QUADRATIC: f64 = 1e-12;

/// |p_z| above which the default neutrino selection prefers the more central root (GeV).
pub const LARGE_NEUTRINO_PZ: f64 = 300.0;

// ═══════════════════════════════════════════════════════════════════
// Validation tolerances
// ═══════════════════════════════════════════════════════════════════

/// Absolute tolerance for kinematic quantities built from O(100 GeV) inputs.
///
/// f64 carries ~16 digits; 1e-9 GeV leaves room for a handful of sums and
/// trigonometric conversions.
pub const KINEMATICS_ABS: f64 = 1e-9;

/// Mass of a vector built massless, after squaring and subtracting O(10⁴) GeV² terms.
pub const MASSLESS_ABS: f64 = 1e-4;

/// Relative tolerance for the neutrino quadratic residual A·pz² + B·pz + C.
///
/// Coefficients reach O(10¹⁰) GeV⁴, so the residual is compared against the
/// largest term rather than zero.
pub const QUADRATIC_RESIDUAL_REL: f64 = 1e-9;

/// Chi-square treated as "on the nominal masses" for hand-built events.
pub const CHI_SQUARE_ZERO: f64 = 1e-8;

/// Mass tuning accuracy for hand-built events (GeV).
pub const MASS_TUNING_ABS: f64 = 1e-6;
