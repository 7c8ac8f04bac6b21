//! Pure protocol components for the NTRIP correction-data client.
//!
//! This crate holds the I/O-free pieces of the client: the reconnect backoff
//! schedule, the correction-byte ring buffer, the caster response classifier,
//! and the handshake request builder. Nothing here touches a socket or a
//! clock; the stateful client in `ntriplink-client` drives these from its
//! per-tick update.

pub mod backoff;
pub mod constants;
pub mod request;
pub mod response;
pub mod ring;

pub use backoff::BackoffSchedule;
pub use request::{build_request, RequestParams};
pub use response::{classify, ResponseClass, ResponseOutcome};
pub use ring::RingBuffer;
