//! NTRIP client protocol constants.
//!
//! Tunables not exposed through the client configuration live here.

/// Default NTRIP caster TCP port.
pub const DEFAULT_CASTER_PORT: u16 = 2101;

/// First byte of every RTCM3 frame. Seeing it during the handshake means the
/// caster has finished its text response and the binary feed has begun.
pub const RTCM_PREAMBLE: u8 = 0xD3;

/// Capacity of the correction-byte ring buffer between the network reader and
/// the receiver push path. One byte is reserved for full/empty disambiguation.
pub const RING_BUFFER_BYTES: usize = 8192;

/// Smallest transfer worth handing to the downstream transport. The GNSS
/// receiver is documented to dislike tiny transactions, so drains wait for
/// twice this much and never leave a trailing run shorter than this.
pub const MIN_DRAIN_CHUNK: usize = 32;

/// Capacity of the scratch buffer that captures the caster's text response
/// for classification (terminator byte included).
pub const RESPONSE_BUFFER_BYTES: usize = 512;

/// A connection that survives this long is considered stable: the attempt
/// counter resets so one bad stretch cannot permanently inflate the backoff.
pub const STABLE_CONNECTION_MS: u64 = 5 * 60 * 1000;

/// Default time to wait for the first response byte after sending the
/// handshake request before giving up on the attempt.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10 * 1000;

/// Default quiet time after the last response byte before the text response
/// is assumed complete and handed to the classifier.
pub const DEFAULT_RESPONSE_DONE_MS: u64 = 1000;

/// Default steady-state timeout: no correction bytes for this long while
/// connected tears the session down for a retry.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 60 * 1000;

/// Default reconnect backoff table in milliseconds, indexed by attempt
/// count and clamped to the last entry. Its length doubles as the attempt
/// cap per activation cycle.
pub const DEFAULT_BACKOFF_MS: [u64; 7] = [
    0,
    15 * 1000,
    30 * 1000,
    60 * 1000,
    2 * 60 * 1000,
    5 * 60 * 1000,
    10 * 60 * 1000,
];
