//! The event-synchronized block processor.
//!
//! [`EffectProcessor`] sits between a host's sample-accurate event stream
//! and an [`Engine`]'s per-sample process call. Each audio callback:
//!
//! 1. drains the UI→audio queue (applying control gestures and mirroring
//!    them to the host's output-event sink),
//! 2. walks the host's sorted event list with a cursor, applying every
//!    event at its exact sample offset,
//! 3. steps every parameter's smoother, and pushes the interpolated
//!    values into the engine's setters, once per smoothing block,
//! 4. renders one frame at a time through the engine.
//!
//! The smoothing-cadence counter carries across callbacks, so alignment is
//! independent of host block sizes. Nothing in this path allocates, locks,
//! or blocks.
//!
//! Host-format adapters talk to the processor through the [`Processor`]
//! capability trait; they are external and swappable, never part of the
//! runtime.

use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{PluginError, PluginResult};
use crate::events::{EventCursor, InEvent, InEventKind, OutEvent, OutputSink};
use crate::messages::{
    AudioToUiMsg, AudioToUiQueue, UiBridge, UiToAudioMsg, UiToAudioQueue,
};
use crate::patch::Patch;
use crate::types::{DEFAULT_SMOOTHING_BLOCK, DEFAULT_SMOOTHING_MS};

// =============================================================================
// Activation & Smoothing Configuration
// =============================================================================

/// Audio configuration delivered by the host on activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Sample rate in Hz (e.g. 44100.0, 48000.0, 96000.0).
    pub sample_rate: f64,
    /// Minimum number of samples per process() call.
    pub min_frames: u32,
    /// Maximum number of samples per process() call.
    pub max_frames: u32,
}

/// Smoothing cadence configuration.
///
/// The block size is a tunable constant, not a hard-coded invariant: hosts
/// deliver arbitrary block lengths, and the cadence counter carries across
/// callbacks, so any power of two works.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Samples between smoother steps. Must be a power of two.
    pub block_size: u32,
    /// Smoother time constant in milliseconds.
    pub time_ms: f64,
}

impl SmoothingConfig {
    /// Create a validated configuration.
    pub fn new(block_size: u32, time_ms: f64) -> PluginResult<Self> {
        if block_size == 0 || !block_size.is_power_of_two() {
            return Err(PluginError::ConfigError(format!(
                "smoothing block size must be a power of two, got {}",
                block_size
            )));
        }
        Ok(Self { block_size, time_ms })
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_SMOOTHING_BLOCK,
            time_ms: DEFAULT_SMOOTHING_MS,
        }
    }
}

// =============================================================================
// Audio Block
// =============================================================================

/// One callback's worth of stereo audio I/O.
pub struct AudioBlock<'a> {
    /// Input channel slices (left, right).
    pub input: [&'a [f32]; 2],
    /// Output channel slices (left, right).
    pub output: [&'a mut [f32]; 2],
}

impl<'a> AudioBlock<'a> {
    /// Bundle input and output slices. All four must share one length.
    pub fn new(input: [&'a [f32]; 2], output: [&'a mut [f32]; 2]) -> Self {
        debug_assert!(
            input[0].len() == input[1].len()
                && input[0].len() == output[0].len()
                && input[0].len() == output[1].len(),
            "channel slices must have equal length"
        );
        Self { input, output }
    }

    /// Number of frames in this block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.output[0].len()
    }
}

// =============================================================================
// Processor Trait
// =============================================================================

/// The host-facing processor capability.
///
/// One polymorphic surface for every host-format adapter: activate with
/// audio configuration, process blocks, flush events while audio is
/// suspended, and move state blobs in and out.
pub trait Processor: Send {
    /// (Re)configure for a sample rate. Smoother and engine coefficients
    /// are recomputed here; a nonsensical rate is an activation error.
    fn activate(&mut self, activation: &Activation) -> PluginResult<()>;

    /// Host deactivated the processor. Default: no-op.
    fn deactivate(&mut self) {}

    /// Render one block. `events` is sorted by sample offset.
    fn process(&mut self, block: &mut AudioBlock, events: &[InEvent], sink: &mut dyn OutputSink);

    /// Apply events and drain the UI queue without rendering audio.
    ///
    /// Hosts call this instead of [`process`](Self::process) while the
    /// audio stream is suspended.
    fn flush_events(&mut self, events: &[InEvent], sink: &mut dyn OutputSink);

    /// Serialize the current patch.
    fn save_state(&self) -> PluginResult<Vec<u8>>;

    /// Restore a patch blob. On failure the previous values stay intact.
    ///
    /// Runs on a host-controlled non-real-time thread; the host silences
    /// audio around state transitions.
    fn load_state(&mut self, data: &[u8]) -> PluginResult<()>;

    /// The parameter registry, for host enumeration and display.
    fn patch(&self) -> &Patch;

    /// Silence the engine's internal state.
    fn reset(&mut self);
}

// =============================================================================
// EffectProcessor
// =============================================================================

/// The one [`Processor`] implementation: a patch, an engine, and the two
/// message queues, synchronized per the block state machine above.
pub struct EffectProcessor<E: Engine> {
    patch: Patch,
    engine: E,
    smoothing: SmoothingConfig,

    audio_to_ui: Arc<AudioToUiQueue>,
    ui_to_audio: Arc<UiToAudioQueue>,

    editor_attached: bool,
    sample_rate: f64,
    /// Position within the current smoothing block; carries across callbacks.
    block_pos: u32,
    /// Set by a state load; serviced by the next audio-thread entry point.
    pending_refresh: bool,
}

impl<E: Engine> EffectProcessor<E> {
    /// Create a processor with the default smoothing cadence.
    pub fn new(patch: Patch, engine: E) -> Self {
        Self {
            patch,
            engine,
            smoothing: SmoothingConfig::default(),
            audio_to_ui: Arc::new(AudioToUiQueue::new()),
            ui_to_audio: Arc::new(UiToAudioQueue::new()),
            editor_attached: false,
            sample_rate: 0.0,
            block_pos: 0,
            pending_refresh: false,
        }
    }

    /// Override the smoothing cadence.
    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Queue handles for an editor. Clone freely into widget callbacks.
    pub fn ui_bridge(&self) -> UiBridge {
        UiBridge {
            audio_to_ui: Arc::clone(&self.audio_to_ui),
            ui_to_audio: Arc::clone(&self.ui_to_audio),
        }
    }

    /// The engine, for host adapters that need direct access.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Sample rate from the last activation; 0.0 before the first one.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Mutable patch access for non-real-time host paths (e.g. a host
    /// setting the patch display name).
    pub fn patch_mut(&mut self) -> &mut Patch {
        &mut self.patch
    }

    /// Re-send every parameter value to the UI.
    fn push_full_refresh(&mut self) {
        let mut dropped = 0usize;
        for param in self.patch.iter() {
            let msg = AudioToUiMsg::UpdateParam {
                id: param.id(),
                value: param.value(),
            };
            if !self.audio_to_ui.push(msg) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!("UI refresh overflowed the audio->UI queue; {} updates dropped", dropped);
        }
    }

    /// Apply one timestamped event to the registry or the engine.
    fn apply_event(&mut self, event: &InEvent) {
        match event.kind {
            InEventKind::ParamValue { id, value } => {
                if let Some(param) = self.patch.param_mut(id) {
                    param.set_value(value);
                    let value = param.value();
                    if self.editor_attached {
                        self.audio_to_ui.push(AudioToUiMsg::UpdateParam { id, value });
                    }
                } else {
                    log::debug!("automation event for unknown parameter id {}; ignored", id);
                }
            }
            InEventKind::Engine(engine_event) => {
                self.engine.handle_event(&engine_event);
            }
        }
    }

    /// Drain the UI→audio queue, mirroring into the host's output sink.
    fn drain_ui_queue(&mut self, sink: &mut dyn OutputSink) {
        while let Some(msg) = self.ui_to_audio.pop() {
            match msg {
                UiToAudioMsg::RequestRefresh => self.push_full_refresh(),
                UiToAudioMsg::SetParam { id, value } => {
                    if let Some(param) = self.patch.param_mut(id) {
                        param.set_value(value);
                        let value = param.value();
                        if !sink.try_push(OutEvent::ParamValue { id, value }) {
                            log::debug!("output sink full; dropped mirror for parameter {}", id);
                        }
                        // Echo back so the editor's mirror converges on the
                        // clamped authoritative value.
                        if self.editor_attached {
                            self.audio_to_ui.push(AudioToUiMsg::UpdateParam { id, value });
                        }
                    } else {
                        log::warn!("UI set for unknown parameter id {}; ignored", id);
                    }
                }
                UiToAudioMsg::BeginEdit { id } => {
                    let _ = sink.try_push(OutEvent::BeginGesture { id });
                }
                UiToAudioMsg::EndEdit { id } => {
                    let _ = sink.try_push(OutEvent::EndGesture { id });
                }
                UiToAudioMsg::EditorAttach(attached) => {
                    let was_attached = self.editor_attached;
                    self.editor_attached = attached;
                    if attached && !was_attached {
                        self.push_full_refresh();
                    }
                }
            }
        }
    }

    /// Step every smoother one block and push the results into the engine.
    fn step_smoothers(&mut self) {
        for i in 0..self.patch.len() {
            if let Some(param) = self.patch.by_index_mut(i) {
                param.lag.step();
                let id = param.id();
                let value = param.engine_value();
                self.engine.set_param(id, value);
            }
        }
    }

    /// Service a refresh requested off the audio thread (state load).
    fn service_pending_refresh(&mut self) {
        if self.pending_refresh {
            self.pending_refresh = false;
            self.push_full_refresh();
        }
    }
}

impl<E: Engine> Processor for EffectProcessor<E> {
    fn activate(&mut self, activation: &Activation) -> PluginResult<()> {
        if activation.sample_rate <= 0.0 {
            return Err(PluginError::ActivationError(format!(
                "invalid sample rate {}",
                activation.sample_rate
            )));
        }

        self.sample_rate = activation.sample_rate;
        let SmoothingConfig { block_size, time_ms } = self.smoothing;
        for param in self.patch.iter_mut() {
            param.lag.set_rate(time_ms, activation.sample_rate, block_size);
        }
        self.engine.activate(activation.sample_rate);
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock, events: &[InEvent], sink: &mut dyn OutputSink) {
        self.service_pending_refresh();
        self.drain_ui_queue(sink);

        let num_samples = block.num_samples();
        let cadence_mask = self.smoothing.block_size - 1;
        let mut cursor = EventCursor::new(events);
        let mut peak = [0.0f32; 2];

        for s in 0..num_samples {
            let offset = s as u32;
            while let Some(event) = cursor.due(offset) {
                self.apply_event(event);
            }

            if self.block_pos == 0 {
                self.step_smoothers();
            }

            let frame = [block.input[0][s], block.input[1][s]];
            let out = self.engine.process(frame);
            block.output[0][s] = out[0];
            block.output[1][s] = out[1];

            peak[0] = peak[0].max(out[0].abs());
            peak[1] = peak[1].max(out[1].abs());

            self.block_pos = (self.block_pos + 1) & cadence_mask;
        }

        // Anything timestamped at or past the block length violates the
        // host contract; apply it now rather than lose it.
        while let Some(event) = cursor.due(u32::MAX) {
            self.apply_event(event);
        }

        if self.editor_attached {
            self.audio_to_ui.push(AudioToUiMsg::UpdateVu {
                left: peak[0],
                right: peak[1],
            });
        }
    }

    fn flush_events(&mut self, events: &[InEvent], sink: &mut dyn OutputSink) {
        self.service_pending_refresh();
        for event in events {
            self.apply_event(event);
        }
        self.drain_ui_queue(sink);
    }

    fn save_state(&self) -> PluginResult<Vec<u8>> {
        self.patch.to_state()
    }

    fn load_state(&mut self, data: &[u8]) -> PluginResult<()> {
        self.patch.from_state(data)?;
        // The next audio-thread entry point re-announces every value; the
        // queue's producer side belongs to the audio thread, so the push
        // cannot happen from here.
        self.pending_refresh = true;
        Ok(())
    }

    fn patch(&self) -> &Patch {
        &self.patch
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}
