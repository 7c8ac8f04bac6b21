//! NTRIP client for embedded robotics platforms.
//!
//! Relays RTCM correction data from an NTRIP caster to a GNSS receiver.
//! The client is sans-IO: [`NtripClient::update`] is ticked by an external
//! scheduler with a monotonic clock and the link status, and all I/O flows
//! through the [`CasterSocket`] and [`CorrectionSink`] traits.
//!
//! ```no_run
//! use ntriplink_client::{ClientConfig, NtripClient};
//! use ntriplink_client::testing::{MockSink, MockSocket};
//!
//! let config = ClientConfig::parse(r#"
//!     host = "rtk2go.com"
//!     mount_point = "bldr_SparkFun1"
//!     user = "someone@example.com"
//! "#).unwrap();
//!
//! let mut client = NtripClient::new(config, MockSocket::new(), MockSink::new(32));
//! client.enable().unwrap();
//! // Scheduler loop: client.update(now_ms, link_up); client.push_corrections();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod status;
pub mod testing;
pub mod traits;

pub use client::{ConnectionState, NtripClient, RuntimeCounters};
pub use config::ClientConfig;
pub use error::ClientError;
pub use traits::{CasterSocket, CorrectionSink};
