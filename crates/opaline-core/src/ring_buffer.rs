//! Fixed-capacity lock-free single-producer/single-consumer ring buffer.
//!
//! This is the bridge between the UI thread and the audio thread: two
//! instances carry the message enums from [`crate::messages`] in opposite
//! directions. Both ends are wait-free: `push` fails rather than blocks
//! when the buffer is full, and neither side ever allocates after
//! construction.
//!
//! # Caller Contract
//!
//! Exactly one thread may call [`push`](RingBuffer::push) and exactly one
//! (different) thread may call [`pop`](RingBuffer::pop). This discipline is
//! not enforced internally; violating it loses messages but is still
//! memory-safe for `Copy` payloads. The buffer stays correct (no crash, no
//! deadlock) under sustained overflow; excess messages are simply rejected.
//!
//! # Capacity
//!
//! `N` must be a power of two (checked at construction) so index masking
//! stays branch-free. Choose it generously relative to worst-case per-block
//! message volume; see the queue aliases in [`crate::messages`].

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free SPSC ring buffer of `Copy` messages.
///
/// Head and tail are free-running counters masked on access, so all `N`
/// slots are usable and full/empty are distinguished by `tail - head`.
pub struct RingBuffer<T: Copy, const N: usize> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Read counter. Written only by the consumer.
    head: AtomicUsize,
    /// Write counter. Written only by the producer.
    tail: AtomicUsize,
}

// SAFETY: the producer writes a slot strictly before publishing it via the
// tail counter (Release), and the consumer reads it strictly after observing
// that publication (Acquire); the matching head publication keeps the
// producer from overwriting a slot the consumer has not yet drained. Under
// the one-producer/one-consumer caller contract no slot is ever accessed
// from two threads at once. T: Copy payloads carry no drop or aliasing
// obligations.
unsafe impl<T: Copy + Send, const N: usize> Sync for RingBuffer<T, N> {}
// SAFETY: moving the buffer between threads moves only owned slot storage
// and plain atomics.
unsafe impl<T: Copy + Send, const N: usize> Send for RingBuffer<T, N> {}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer. Allocates once; never again.
    ///
    /// # Panics
    ///
    /// Panics if `N` is zero or not a power of two.
    pub fn new() -> Self {
        assert!(N.is_power_of_two(), "ring buffer capacity must be a power of two");

        let slots = (0..N)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Total capacity in messages.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a message. Returns `false` when the buffer is full.
    ///
    /// Producer side only. Never blocks, never allocates; the caller decides
    /// what a rejected message means (both queues here treat it as a benign
    /// drop).
    #[inline]
    pub fn push(&self, value: T) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail.wrapping_sub(head) == N {
            return false;
        }

        // SAFETY: `tail - head < N`, so this slot is not visible to the
        // consumer; only this (single-producer) thread touches it until the
        // Release store below publishes it.
        unsafe {
            (*self.slots[tail & (N - 1)].get()).write(value);
        }
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Remove and return the oldest message, if any.
    ///
    /// Consumer side only. Never blocks.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        // SAFETY: `head < tail`, so the producer published this slot with a
        // Release store that our Acquire load above synchronizes with; the
        // producer will not reuse it until the Release store below moves the
        // head past it.
        let value = unsafe { (*self.slots[head & (N - 1)].get()).assume_init_read() };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Approximate number of queued messages.
    ///
    /// Exact when called from the consumer thread between pops; from
    /// elsewhere it is a racy snapshot, good enough for diagnostics.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head).min(N)
    }

    /// Returns true if no messages are queued (same caveats as [`len`](Self::len)).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
