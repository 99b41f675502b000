//! Timestamped host events and the in-block event cursor.
//!
//! Hosts deliver one sorted-by-offset event list per process block. The
//! processor walks it with an [`EventCursor`] so that every event with
//! `sample_offset <= s` is applied strictly before sample `s` renders,
//! which is the ordering guarantee the whole smoothing protocol hangs on.

use crate::types::{ParamId, ParamValue};

/// An opaque non-parameter event forwarded to the engine untouched.
///
/// The runtime does not interpret these; `kind` and `value` mean whatever
/// the engine and its host adapter agree they mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineEvent {
    /// Engine-defined event tag.
    pub kind: u32,
    /// Engine-defined payload.
    pub value: f64,
}

/// Payload of a timestamped input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InEventKind {
    /// Host automation point. The value arrives pre-clamped to the
    /// parameter's `[min, max]` range per the host contract.
    ParamValue { id: ParamId, value: ParamValue },
    /// Opaque event for the engine.
    Engine(EngineEvent),
}

/// A discrete instruction applying at a sample offset within the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InEvent {
    /// Offset in samples from the start of the current block.
    pub sample_offset: u32,
    /// What to apply.
    pub kind: InEventKind,
}

impl InEvent {
    /// Parameter-change event.
    pub fn param(sample_offset: u32, id: ParamId, value: ParamValue) -> Self {
        Self {
            sample_offset,
            kind: InEventKind::ParamValue { id, value },
        }
    }

    /// Opaque engine event.
    pub fn engine(sample_offset: u32, kind: u32, value: f64) -> Self {
        Self {
            sample_offset,
            kind: InEventKind::Engine(EngineEvent { kind, value }),
        }
    }
}

/// Events the processor pushes back to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutEvent {
    /// Mirror of a UI-originated parameter change, so the host can record
    /// automation.
    ParamValue { id: ParamId, value: ParamValue },
    /// User started dragging a control.
    BeginGesture { id: ParamId },
    /// User released a control.
    EndGesture { id: ParamId },
}

/// The host's output-event sink.
///
/// `try_push` may fail when the sink is full; that is non-fatal and the
/// processor drops the event silently (a missed automation mirror, never a
/// correctness violation of audio output).
pub trait OutputSink {
    /// Push an event toward the host. Returns `false` if the sink is full.
    fn try_push(&mut self, event: OutEvent) -> bool;
}

/// Growable sink for tests and non-real-time host shims.
impl OutputSink for Vec<OutEvent> {
    fn try_push(&mut self, event: OutEvent) -> bool {
        self.push(event);
        true
    }
}

/// Cursor over one block's sorted event list.
///
/// Consumes each event exactly once. The list must be sorted by
/// `sample_offset`; events are applied in list order, so ties keep their
/// host-delivered order.
pub struct EventCursor<'a> {
    events: &'a [InEvent],
    next: usize,
}

impl<'a> EventCursor<'a> {
    /// Start traversal at the first event.
    pub fn new(events: &'a [InEvent]) -> Self {
        Self { events, next: 0 }
    }

    /// Take the next event due at or before `sample`, if any.
    ///
    /// Call in a loop before rendering sample `sample`; returns `None` once
    /// every due event has been taken.
    #[inline]
    pub fn due(&mut self, sample: u32) -> Option<&'a InEvent> {
        let event = self.events.get(self.next)?;
        if event.sample_offset <= sample {
            self.next += 1;
            Some(event)
        } else {
            None
        }
    }

    /// Number of events not yet taken.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_respects_offsets() {
        let events = [
            InEvent::param(0, 1, 0.1),
            InEvent::param(3, 2, 0.2),
            InEvent::param(3, 3, 0.3),
            InEvent::param(7, 4, 0.4),
        ];
        let mut cursor = EventCursor::new(&events);

        // Sample 0: only the offset-0 event is due.
        assert_eq!(cursor.due(0), Some(&events[0]));
        assert_eq!(cursor.due(0), None);

        // Samples 1-2: nothing due.
        assert_eq!(cursor.due(1), None);
        assert_eq!(cursor.due(2), None);

        // Sample 3: both offset-3 events, in list order.
        assert_eq!(cursor.due(3), Some(&events[1]));
        assert_eq!(cursor.due(3), Some(&events[2]));
        assert_eq!(cursor.due(3), None);
        assert_eq!(cursor.remaining(), 1);

        assert_eq!(cursor.due(7), Some(&events[3]));
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.due(u32::MAX), None);
    }

    #[test]
    fn test_empty_list() {
        let mut cursor = EventCursor::new(&[]);
        assert_eq!(cursor.due(0), None);
        assert_eq!(cursor.remaining(), 0);
    }
}
