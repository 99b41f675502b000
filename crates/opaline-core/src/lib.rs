//! # opaline-core
//!
//! Core abstractions for the Opaline audio effect runtime.
//!
//! Opaline sits between a plugin host and an opaque DSP engine: it merges
//! the host's sample-accurately-timestamped parameter events into the
//! block-based audio callback, keeps every engine parameter on a smoothed
//! (lagged) trajectory, and bridges the UI thread to the audio thread with
//! lock-free queues. Host-format wrappers (VST3, AU, CLAP), GUI toolkits,
//! and the engines themselves are external collaborators behind traits.
//!
//! ## Main Traits
//!
//! - [`Processor`] - Host-facing capability: activate, process, state I/O
//! - [`Engine`] - The opaque per-sample DSP engine seam
//! - [`OutputSink`] - The host's output-event sink
//!
//! ## Types
//!
//! - [`EffectProcessor`] - The event-synchronized block processor
//! - [`Patch`] / [`Param`] - The parameter registry and its cells
//! - [`Smoother`] - Block-cadence one-pole parameter lag
//! - [`RingBuffer`] - Lock-free SPSC message queue
//! - [`PatchMirror`] / [`UiBridge`] - The UI thread's side of the bridge
//! - [`PluginConfig`] - Plugin descriptor metadata
//! - [`PluginError`] - Error types

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod messages;
pub mod params;
pub mod patch;
pub mod processor;
pub mod ring_buffer;
pub mod smoothing;
pub mod types;

// Re-exports for convenience
pub use config::PluginConfig;
pub use engine::Engine;
pub use error::{PluginError, PluginResult};
pub use events::{EngineEvent, EventCursor, InEvent, InEventKind, OutEvent, OutputSink};
pub use messages::{
    AudioToUiMsg, AudioToUiQueue, MirrorParam, PatchMirror, UiBridge, UiToAudioMsg, UiToAudioQueue,
};
pub use params::{Param, ParamFlags, ParamFormat, ParamInfo};
pub use patch::{MigrateValueFn, Patch};
pub use processor::{Activation, AudioBlock, EffectProcessor, Processor, SmoothingConfig};
pub use ring_buffer::RingBuffer;
pub use smoothing::Smoother;
pub use types::{ParamId, ParamValue, DEFAULT_SMOOTHING_BLOCK, DEFAULT_SMOOTHING_MS};
