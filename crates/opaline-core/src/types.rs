//! Common types used throughout the Opaline runtime.

/// Parameter identifier.
///
/// Stable across sessions: hosts persist automation against it and state
/// blobs key values by it, so an id must never be reused for a different
/// parameter once shipped.
pub type ParamId = u32;

/// Parameter value in plain (natural) units.
///
/// Values are always kept within the parameter's declared `[min, max]`
/// range; hosts deliver automation points pre-clamped to that range.
pub type ParamValue = f64;

/// Default number of samples between successive smoother recomputations.
///
/// 8 samples is ~0.2 ms at 44.1 kHz, well below audible granularity, while
/// cutting the per-sample coefficient work by the same factor.
pub const DEFAULT_SMOOTHING_BLOCK: u32 = 8;

/// Default smoother time constant in milliseconds.
pub const DEFAULT_SMOOTHING_MS: f64 = 5.0;
