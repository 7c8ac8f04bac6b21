//! Boundary collaborator traits.
//!
//! The state machine produces and consumes bytes through these seams rather
//! than performing I/O directly — concrete implementations bridge them to
//! the actual network stack and receiver transport of the hardware target.

/// A non-blocking TCP-style socket to the caster.
///
/// Every method must return immediately; the client checks `available` /
/// `connected` before acting and never suspends inside a tick.
pub trait CasterSocket {
    /// Open a connection to `host:port`. Returns false on failure.
    fn connect(&mut self, host: &str, port: u16) -> bool;

    /// Queue `bytes` for transmission, returning the number accepted.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Number of received bytes ready to read right now.
    fn available(&mut self) -> usize;

    /// The next received byte without consuming it, if any.
    fn peek(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` received bytes, returning the count.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Whether the connection is currently established.
    fn connected(&self) -> bool;

    /// Close the connection. Must be idempotent.
    fn close(&mut self);
}

/// The downstream transport that carries correction bytes to the GNSS
/// receiver (I2C, serial, ...).
pub trait CorrectionSink {
    /// Hand `bytes` to the receiver, returning how many it accepted.
    /// Accepting fewer than offered is not an error; the remainder is
    /// offered again on a later tick.
    fn push(&mut self, bytes: &[u8]) -> usize;

    /// Largest transfer the transport can take in one transaction.
    ///
    /// Values below
    /// [`MIN_DRAIN_CHUNK`](ntriplink_proto::constants::MIN_DRAIN_CHUNK)
    /// are floored to it: smaller transfers are not worth making, so the
    /// drain path never sizes a chunk below that minimum.
    fn transaction_size(&self) -> usize;
}
