//! # Opaline
//!
//! Audio effect runtime for Rust.
//!
//! Opaline packages a DSP engine as a host-ready processor: it applies the
//! host's sample-accurate parameter events at the right sample, smooths
//! every parameter with a block-cadence lag, and gives an editor a
//! lock-free message bridge to the audio thread.
//!
//! ## Architecture
//!
//! ```text
//! Host adapter (VST3/AU/CLAP wrapper, external)
//!        ↓ events / audio blocks
//! EffectProcessor<E> (event-synchronized block processor)
//!        ↓ smoothed setters + per-sample frames
//! Your Engine (implements Engine trait)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opaline::prelude::*;
//!
//! struct MyEngine { gain: f64 }
//!
//! impl Engine for MyEngine {
//!     fn set_param(&mut self, id: ParamId, value: ParamValue) {
//!         if id == 100 { self.gain = value; }
//!     }
//!     fn process(&mut self, input: [f32; 2]) -> [f32; 2] {
//!         [input[0] * self.gain as f32, input[1] * self.gain as f32]
//!     }
//!     fn reset(&mut self) {}
//! }
//!
//! let mut patch = Patch::new("org.example.mygain", 1);
//! patch.push(Param::new(ParamInfo::new(100, "Gain").as_percent().with_default(0.5)));
//! let processor = EffectProcessor::new(patch, MyEngine { gain: 0.5 });
//! ```

// Re-export the core crate
pub use opaline_core as core;

/// Prelude module for convenient imports.
///
/// Import everything you need to wire an engine:
/// ```rust,ignore
/// use opaline::prelude::*;
/// ```
pub mod prelude {
    pub use opaline_core::{
        // Processor surface
        Activation, AudioBlock, EffectProcessor, Processor, SmoothingConfig,
        // Engine seam
        Engine, EngineEvent,
        // Events
        InEvent, InEventKind, OutEvent, OutputSink,
        // Parameters
        Param, ParamFlags, ParamFormat, ParamId, ParamInfo, ParamValue, Patch,
        // Smoothing
        Smoother,
        // UI bridge
        AudioToUiMsg, AudioToUiQueue, PatchMirror, UiBridge, UiToAudioMsg, UiToAudioQueue,
        // Configuration and errors
        PluginConfig, PluginError, PluginResult,
    };
}
