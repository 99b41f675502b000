//! Parameter metadata, formatting, and the smoothed parameter cell.
//!
//! Parameters live in plain (natural) units: the host contract delivers
//! automation values already clamped to the declared `[min, max]` range, and
//! engines consume the same units. Normalized 0..1 mapping is provided for
//! UI widgets, which work in knob fractions.
//!
//! A [`Param`] couples its metadata with the current value (the unsmoothed
//! "true" target) and a [`Smoother`]; the processor owns every `Param`
//! exclusively; the UI only ever sees copies, synchronized through the
//! message queues.

use crate::smoothing::Smoother;
use crate::types::{ParamId, ParamValue};

// =============================================================================
// Formatting
// =============================================================================

/// Parameter value formatter.
///
/// Defines how plain parameter values are converted to display strings and
/// parsed back from user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamFormat {
    /// Plain float with a unit suffix (e.g. "440.0 Hz", "3.2").
    Linear {
        /// Unit label appended after the value; empty for none.
        unit: &'static str,
        /// Number of decimal places.
        precision: usize,
    },

    /// Percentage formatter. Plain value is 0.0-1.0, display is 0%-100%.
    Percent {
        /// Number of decimal places.
        precision: usize,
    },

    /// Discrete formatter mapping rounded values to labels.
    ///
    /// The plain value is rounded to an index into `labels`.
    Stepped {
        /// One label per discrete step, in value order starting at 0.
        labels: &'static [&'static str],
    },
}

impl ParamFormat {
    /// Format a plain value to a display string.
    pub fn format(&self, value: ParamValue) -> String {
        match self {
            ParamFormat::Linear { unit, precision } => {
                if unit.is_empty() {
                    format!("{:.prec$}", value, prec = *precision)
                } else {
                    format!("{:.prec$} {}", value, unit, prec = *precision)
                }
            }
            ParamFormat::Percent { precision } => {
                format!("{:.prec$}%", value * 100.0, prec = *precision)
            }
            ParamFormat::Stepped { labels } => {
                let index = value.round().max(0.0) as usize;
                labels
                    .get(index)
                    .copied()
                    .unwrap_or("?")
                    .to_string()
            }
        }
    }

    /// Parse a display string back to a plain value.
    ///
    /// Returns `None` if the string cannot be interpreted.
    pub fn parse(&self, s: &str) -> Option<ParamValue> {
        let s = s.trim();
        match self {
            ParamFormat::Linear { unit, .. } => {
                let stripped = s.strip_suffix(unit).unwrap_or(s).trim();
                stripped.parse::<f64>().ok()
            }
            ParamFormat::Percent { .. } => {
                let stripped = s.strip_suffix('%').unwrap_or(s).trim();
                stripped.parse::<f64>().ok().map(|v| v / 100.0)
            }
            ParamFormat::Stepped { labels } => labels
                .iter()
                .position(|label| label.eq_ignore_ascii_case(s))
                .map(|index| index as f64),
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Flags controlling parameter behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags {
    /// Parameter can be automated by the host.
    pub can_automate: bool,
    /// Parameter takes discrete steps; its value is read unsmoothed.
    pub is_stepped: bool,
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self {
            can_automate: true,
            is_stepped: false,
        }
    }
}

/// Metadata describing a single parameter.
///
/// Construct with the builder methods; everything is `const`-friendly so
/// descriptor tables can live in statics when a plugin prefers that.
///
/// # Example
///
/// ```ignore
/// const FREQUENCY: ParamInfo = ParamInfo::new(100, "Frequency")
///     .with_range(20.0, 20_000.0)
///     .with_default(1_000.0)
///     .with_unit("Hz");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParamInfo {
    /// Unique, stable parameter identifier.
    pub id: ParamId,
    /// Full parameter name (e.g. "Frequency").
    pub name: &'static str,
    /// Lower bound in plain units.
    pub min: ParamValue,
    /// Upper bound in plain units.
    pub max: ParamValue,
    /// Default value in plain units.
    pub default: ParamValue,
    /// Display formatting rule.
    pub format: ParamFormat,
    /// Behavioral flags.
    pub flags: ParamFlags,
}

impl ParamInfo {
    /// Create a continuous parameter spanning 0..1 with default 0.5.
    pub const fn new(id: ParamId, name: &'static str) -> Self {
        Self {
            id,
            name,
            min: 0.0,
            max: 1.0,
            default: 0.5,
            format: ParamFormat::Linear {
                unit: "",
                precision: 2,
            },
            flags: ParamFlags {
                can_automate: true,
                is_stepped: false,
            },
        }
    }

    /// Set the plain-value range.
    pub const fn with_range(mut self, min: ParamValue, max: ParamValue) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the default value.
    pub const fn with_default(mut self, default: ParamValue) -> Self {
        self.default = default;
        self
    }

    /// Use linear formatting with a unit suffix.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.format = ParamFormat::Linear { unit, precision: 2 };
        self
    }

    /// Set the formatting rule directly.
    pub const fn with_format(mut self, format: ParamFormat) -> Self {
        self.format = format;
        self
    }

    /// Percentage parameter: range 0..1, displayed 0%-100%.
    pub const fn as_percent(mut self) -> Self {
        self.min = 0.0;
        self.max = 1.0;
        self.format = ParamFormat::Percent { precision: 0 };
        self
    }

    /// Discrete parameter with one step per label.
    ///
    /// The range becomes `0..labels.len()-1` and the value is read
    /// unsmoothed by the engine (ramping between discrete modes is
    /// meaningless).
    pub const fn stepped(mut self, labels: &'static [&'static str]) -> Self {
        self.min = 0.0;
        self.max = (labels.len() - 1) as f64;
        self.format = ParamFormat::Stepped { labels };
        self.flags = ParamFlags {
            can_automate: self.flags.can_automate,
            is_stepped: true,
        };
        self
    }

    /// Set parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamp a plain value into this parameter's range.
    #[inline]
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        value.clamp(self.min, self.max)
    }

    /// Map a plain value to the normalized 0..1 range UI widgets use.
    #[inline]
    pub fn to_normalized(&self, plain: ParamValue) -> ParamValue {
        if self.max <= self.min {
            return 0.0;
        }
        ((plain - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Map a normalized 0..1 widget value back to plain units.
    #[inline]
    pub fn from_normalized(&self, normalized: ParamValue) -> ParamValue {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

// =============================================================================
// Param
// =============================================================================

/// A parameter cell: metadata, the current (target) value, and its smoother.
///
/// The value invariant (always within `[min, max]`) is maintained by
/// every mutation path going through [`set_value`](Self::set_value).
#[derive(Debug, Clone)]
pub struct Param {
    info: ParamInfo,
    value: ParamValue,
    /// Smoothing state. Public so the processor can step it at the cadence.
    pub lag: Smoother,
}

impl Param {
    /// Create a parameter at its default value, smoother pre-snapped.
    pub fn new(info: ParamInfo) -> Self {
        let mut lag = Smoother::new();
        lag.snap_to(info.default);
        Self {
            info,
            value: info.default,
            lag,
        }
    }

    /// Parameter metadata.
    #[inline]
    pub fn info(&self) -> &ParamInfo {
        &self.info
    }

    /// Stable id shorthand.
    #[inline]
    pub fn id(&self) -> ParamId {
        self.info.id
    }

    /// The current unsmoothed value (the "true" target).
    #[inline]
    pub fn value(&self) -> ParamValue {
        self.value
    }

    /// Set the value and retarget the smoother. Clamps into range.
    ///
    /// The ramp becomes visible at the next smoothing-cadence boundary.
    pub fn set_value(&mut self, value: ParamValue) {
        let clamped = self.info.clamp(value);
        if clamped != value {
            log::debug!(
                "parameter {} ({}): value {} clamped to {}",
                self.info.id,
                self.info.name,
                value,
                clamped
            );
        }
        self.value = clamped;
        self.lag.set_target(clamped);
    }

    /// Restore the default value and snap, no ramp.
    pub fn reset_to_default(&mut self) {
        self.value = self.info.default;
        self.lag.snap_to(self.value);
    }

    /// Force the smoother onto the current value instantly.
    #[inline]
    pub fn snap(&mut self) {
        self.lag.snap_to(self.value);
    }

    /// The value the engine should see right now.
    ///
    /// Smoothed for continuous parameters; stepped parameters are read
    /// unsmoothed, since interpolating between discrete modes is undefined.
    #[inline]
    pub fn engine_value(&self) -> ParamValue {
        if self.info.flags.is_stepped {
            self.value
        } else {
            self.lag.current()
        }
    }

    /// Format the current value for display.
    pub fn display(&self) -> String {
        self.info.format.format(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq_info() -> ParamInfo {
        ParamInfo::new(100, "Frequency")
            .with_range(20.0, 20_000.0)
            .with_default(1_000.0)
            .with_unit("Hz")
    }

    #[test]
    fn test_set_value_clamps() {
        let mut p = Param::new(freq_info());
        p.set_value(100_000.0);
        assert_eq!(p.value(), 20_000.0);
        p.set_value(-5.0);
        assert_eq!(p.value(), 20.0);
    }

    #[test]
    fn test_new_param_is_snapped_to_default() {
        let p = Param::new(freq_info());
        assert_eq!(p.value(), 1_000.0);
        assert_eq!(p.lag.current(), 1_000.0);
        assert!(!p.lag.is_smoothing());
    }

    #[test]
    fn test_stepped_engine_value_skips_smoothing() {
        let info = ParamInfo::new(140, "Mode").stepped(&["LowPass", "HighPass"]);
        let mut p = Param::new(info);
        p.lag.set_rate(5.0, 48_000.0, 8);
        p.set_value(1.0);
        // Smoother has not converged, but the engine sees the step at once.
        assert_eq!(p.engine_value(), 1.0);
    }

    #[test]
    fn test_normalized_round_trip() {
        let info = freq_info();
        let norm = info.to_normalized(10_010.0);
        let plain = info.from_normalized(norm);
        assert!((plain - 10_010.0).abs() < 1e-6);
        assert_eq!(info.to_normalized(20.0), 0.0);
        assert_eq!(info.to_normalized(20_000.0), 1.0);
    }

    #[test]
    fn test_format_linear_and_percent() {
        let f = ParamFormat::Linear {
            unit: "Hz",
            precision: 1,
        };
        assert_eq!(f.format(440.0), "440.0 Hz");
        assert_eq!(f.parse("440 Hz"), Some(440.0));
        assert_eq!(f.parse("garbage"), None);

        let pct = ParamFormat::Percent { precision: 0 };
        assert_eq!(pct.format(0.75), "75%");
        assert_eq!(pct.parse("75%"), Some(0.75));
    }

    #[test]
    fn test_format_stepped() {
        let f = ParamFormat::Stepped {
            labels: &["LowPass", "BandPass", "HighPass"],
        };
        assert_eq!(f.format(1.2), "BandPass");
        assert_eq!(f.parse("highpass"), Some(2.0));
        assert_eq!(f.parse("Notch"), None);
    }
}
