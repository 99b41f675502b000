//! The DSP engine seam.
//!
//! Engines are external collaborators: physical-modelling reverbs, filters,
//! whatever. The runtime treats them as black boxes behind this trait. The
//! processor pushes every parameter's smoothed value through
//! [`set_param`](Engine::set_param) once per smoothing block and renders one
//! stereo frame at a time through [`process`](Engine::process).

use crate::events::EngineEvent;
use crate::types::{ParamId, ParamValue};

/// An opaque per-sample DSP engine.
///
/// Implementations must be real-time safe in `set_param`, `handle_event`,
/// and `process`: no allocation, no locks, no syscalls.
pub trait Engine: Send {
    /// Called on activation with the session sample rate.
    ///
    /// Recompute any rate-dependent internals here. Default: no-op.
    fn activate(&mut self, sample_rate: f64) {
        let _ = sample_rate;
    }

    /// Receive one smoothed scalar per logical parameter.
    ///
    /// Invoked at the smoothing cadence (not per sample, not per event), so
    /// coefficient recomputation triggered here is bounded per block.
    fn set_param(&mut self, id: ParamId, value: ParamValue);

    /// Handle an opaque non-parameter host event.
    ///
    /// Return `true` if the event was consumed. Default: ignore everything.
    fn handle_event(&mut self, event: &EngineEvent) -> bool {
        let _ = event;
        false
    }

    /// Render one stereo frame.
    fn process(&mut self, input: [f32; 2]) -> [f32; 2];

    /// Silence internal state (delay lines, springs, envelopes).
    fn reset(&mut self);
}
