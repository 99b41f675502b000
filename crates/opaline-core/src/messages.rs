//! Cross-thread messages and the UI-side parameter mirror.
//!
//! Two single-producer/single-consumer queues connect the UI thread and the
//! audio thread; no parameter state is ever shared directly. The audio
//! thread drains [`UiToAudioMsg`] once per block (and in the flush path);
//! the UI thread drains [`AudioToUiMsg`] from its poll timer, typically at
//! 60 Hz; the bounded queues absorb the cadence mismatch.
//!
//! The UI renders from a [`PatchMirror`]: a non-authoritative copy of every
//! parameter that may transiently diverge from the audio-thread value and
//! catches up as update messages arrive.

use std::collections::HashMap;
use std::sync::Arc;

use crate::params::ParamInfo;
use crate::patch::Patch;
use crate::ring_buffer::RingBuffer;
use crate::types::{ParamId, ParamValue};

// =============================================================================
// Messages
// =============================================================================

/// Messages the UI thread sends toward the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiToAudioMsg {
    /// Ask the audio thread to re-send every parameter value.
    RequestRefresh,
    /// A control moved; becomes the new target (and is mirrored to the host).
    SetParam { id: ParamId, value: ParamValue },
    /// User grabbed a control; mirrored to the host for automation recording.
    BeginEdit { id: ParamId },
    /// User released a control.
    EndEdit { id: ParamId },
    /// Editor attached (`true`) or detached (`false`). While detached the
    /// audio thread skips producing UI traffic nobody will drain.
    EditorAttach(bool),
}

/// Messages the audio thread sends toward the UI thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioToUiMsg {
    /// A parameter's authoritative value changed (automation, UI echo, or a
    /// full refresh).
    UpdateParam { id: ParamId, value: ParamValue },
    /// Per-block output peak levels for metering.
    UpdateVu { left: f32, right: f32 },
}

/// Audio→UI queue: one message per parameter per full-refresh tick, so
/// 16384 slots make drops a practical non-issue.
pub type AudioToUiQueue = RingBuffer<AudioToUiMsg, 16384>;

/// UI→audio queue: one message per user gesture tick.
pub type UiToAudioQueue = RingBuffer<UiToAudioMsg, 65536>;

// =============================================================================
// Patch Mirror (UI side)
// =============================================================================

/// One mirrored parameter: metadata plus the last value seen from audio.
#[derive(Debug, Clone, Copy)]
pub struct MirrorParam {
    /// Parameter metadata for rendering (name, range, formatting).
    pub info: ParamInfo,
    /// Last known value. Non-authoritative.
    pub value: ParamValue,
}

/// The UI thread's eventually-consistent copy of the patch.
///
/// Never treated as authoritative: it is synchronized through the
/// audio→UI queue and only reflects what the audio thread has published.
pub struct PatchMirror {
    params: Vec<MirrorParam>,
    index_by_id: HashMap<ParamId, usize>,
    vu: (f32, f32),
}

impl PatchMirror {
    /// Snapshot metadata and current values from a patch.
    ///
    /// Called once at editor construction, before the audio thread starts
    /// publishing updates.
    pub fn from_patch(patch: &Patch) -> Self {
        let params: Vec<MirrorParam> = patch
            .iter()
            .map(|p| MirrorParam {
                info: *p.info(),
                value: p.value(),
            })
            .collect();
        let index_by_id = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.info.id, i))
            .collect();
        Self {
            params,
            index_by_id,
            vu: (0.0, 0.0),
        }
    }

    /// Apply every queued message, returning the ids whose value changed.
    ///
    /// Runs on the UI thread (its poll timer); allocation is fine here.
    pub fn drain(&mut self, queue: &AudioToUiQueue) -> Vec<ParamId> {
        let mut changed = Vec::new();
        while let Some(msg) = queue.pop() {
            match msg {
                AudioToUiMsg::UpdateParam { id, value } => {
                    if let Some(&i) = self.index_by_id.get(&id) {
                        if self.params[i].value != value {
                            self.params[i].value = value;
                            changed.push(id);
                        }
                    }
                }
                AudioToUiMsg::UpdateVu { left, right } => {
                    self.vu = (left, right);
                }
            }
        }
        changed
    }

    /// Mirrored parameter by id.
    pub fn param(&self, id: ParamId) -> Option<&MirrorParam> {
        self.index_by_id.get(&id).map(|&i| &self.params[i])
    }

    /// Iterate mirrored parameters in host enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &MirrorParam> {
        self.params.iter()
    }

    /// Latest VU frame (left, right peak).
    pub fn vu(&self) -> (f32, f32) {
        self.vu
    }
}

// =============================================================================
// UI Bridge
// =============================================================================

/// The editor's handle on both queues.
///
/// Cheap to clone into widget callbacks. All sends are fire-and-forget: a
/// full queue drops the message, which at worst costs one gesture tick.
#[derive(Clone)]
pub struct UiBridge {
    /// Drained by the UI poll; fed by the audio thread.
    pub audio_to_ui: Arc<AudioToUiQueue>,
    /// Fed by widget callbacks; drained by the audio thread each block.
    pub ui_to_audio: Arc<UiToAudioQueue>,
}

impl UiBridge {
    /// Push a value change from a widget.
    pub fn set_param(&self, id: ParamId, value: ParamValue) {
        self.ui_to_audio.push(UiToAudioMsg::SetParam { id, value });
    }

    /// Signal the start of a drag gesture.
    pub fn begin_edit(&self, id: ParamId) {
        self.ui_to_audio.push(UiToAudioMsg::BeginEdit { id });
    }

    /// Signal the end of a drag gesture.
    pub fn end_edit(&self, id: ParamId) {
        self.ui_to_audio.push(UiToAudioMsg::EndEdit { id });
    }

    /// Ask for a full re-send of every parameter value.
    pub fn request_refresh(&self) {
        self.ui_to_audio.push(UiToAudioMsg::RequestRefresh);
    }

    /// Announce editor attach/detach. Attach triggers a full refresh on the
    /// audio side; detach stops audio→UI production.
    pub fn set_attached(&self, attached: bool) {
        self.ui_to_audio.push(UiToAudioMsg::EditorAttach(attached));
    }

    /// Drain pending updates into a mirror. See [`PatchMirror::drain`].
    pub fn drain_into(&self, mirror: &mut PatchMirror) -> Vec<ParamId> {
        mirror.drain(&self.audio_to_ui)
    }
}
