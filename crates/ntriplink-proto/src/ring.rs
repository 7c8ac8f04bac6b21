//! Correction-byte ring buffer.
//!
//! A fixed-capacity byte queue sitting between the network receive path and
//! the push-to-receiver path. `head` (next write) is advanced only by the
//! producer and `tail` (next read) only by the consumer, so the two paths can
//! later run on different cores without a lock. At most `capacity - 1` bytes
//! are in use at any time (classic full/empty disambiguation).
//!
//! Overflow policy: `write` silently truncates input that exceeds the free
//! space. Stale corrections are of little use downstream, so the buffer
//! favors keeping the link alive over completeness.
//!
//! Drain policy: the downstream transport dislikes tiny transactions, so
//! [`RingBuffer::peek_chunk`] returns nothing until at least
//! `2 * MIN_DRAIN_CHUNK` bytes are queued, and it never sizes a chunk so
//! that a contiguous run shorter than `MIN_DRAIN_CHUNK` is stranded before
//! the physical wrap point.

use crate::constants::MIN_DRAIN_CHUNK;

/// Single-producer/single-consumer byte queue.
#[derive(Debug)]
pub struct RingBuffer {
    buf: Box<[u8]>,
    /// Next write position. Mutated only by the receive path.
    head: usize,
    /// Next read position. Mutated only by the drain path.
    tail: usize,
}

impl RingBuffer {
    /// Allocate a buffer holding up to `capacity - 1` bytes.
    ///
    /// `capacity` must be at least 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring buffer needs room for at least one byte");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
        }
    }

    /// Total capacity of the underlying array.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of queued bytes.
    pub fn available(&self) -> usize {
        let cap = self.buf.len();
        (self.head + cap - self.tail) % cap
    }

    /// Number of bytes `write` can accept right now.
    pub fn free(&self) -> usize {
        let cap = self.buf.len();
        (self.tail + 2 * cap - 1 - self.head) % cap
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Append as much of `bytes` as free space allows, returning the number
    /// of bytes accepted. Excess input is dropped, not an error.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(self.free());
        if accepted == 0 {
            if !bytes.is_empty() {
                tracing::trace!(dropped = bytes.len(), "ring buffer full, dropping input");
            }
            return 0;
        }
        if accepted < bytes.len() {
            tracing::trace!(
                accepted,
                dropped = bytes.len() - accepted,
                "ring buffer overflow, truncating input"
            );
        }

        let cap = self.buf.len();
        let first = accepted.min(cap - self.head);
        self.buf[self.head..self.head + first].copy_from_slice(&bytes[..first]);
        let second = accepted - first;
        if second > 0 {
            self.buf[..second].copy_from_slice(&bytes[first..accepted]);
        }
        self.head = (self.head + accepted) % cap;
        accepted
    }

    /// Borrow the next contiguous run to hand to the push collaborator, at
    /// most `max_transaction` bytes.
    ///
    /// Returns `None` until `2 * MIN_DRAIN_CHUNK` bytes are queued. The
    /// chunk is shrunk when needed so the contiguous run left before the
    /// wrap point is either empty or at least `MIN_DRAIN_CHUNK` bytes.
    /// `max_transaction` is clamped up to `MIN_DRAIN_CHUNK` so the shrink
    /// can never produce an empty chunk.
    ///
    /// The tail does not move; call [`RingBuffer::consume`] with the number
    /// of bytes the collaborator actually accepted.
    pub fn peek_chunk(&self, max_transaction: usize) -> Option<&[u8]> {
        let avail = self.available();
        if avail < 2 * MIN_DRAIN_CHUNK {
            return None;
        }

        let run = self.buf.len() - self.tail;
        let mut chunk = avail.min(run).min(max_transaction.max(MIN_DRAIN_CHUNK));

        // Never strand a short run against the physical end of the buffer.
        let leftover = run - chunk;
        if leftover > 0 && leftover < MIN_DRAIN_CHUNK {
            chunk -= MIN_DRAIN_CHUNK - leftover;
        }

        Some(&self.buf[self.tail..self.tail + chunk])
    }

    /// Release `accepted` bytes after the push collaborator has taken them.
    /// Counts beyond what is queued are capped.
    pub fn consume(&mut self, accepted: usize) {
        let accepted = accepted.min(self.available());
        self.tail = (self.tail + accepted) % self.buf.len();
    }

    /// Reset both cursors, discarding any queued bytes. Called when a
    /// session is fully torn down.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}
