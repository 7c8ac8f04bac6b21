//! NTRIP caster connection state machine.
//!
//! The client is driven entirely by [`NtripClient::update`], called from an
//! external scheduler with a monotonic millisecond timestamp and the current
//! network link status. No call blocks; every deadline is a comparison
//! against the caller-supplied clock.
//!
//! ```text
//!                 Off <--------------.
//!                  |                 |
//!           enable |                 |
//!                  v                 |
//!             WaitForLink            |
//!                  |                 |
//!                  v           fail  |
//!              Connecting ---------->+
//!                  |                 ^
//!                  v           fail  |
//!             WaitResponse --------->+
//!                  |                 ^
//!                  v           fail  |
//!            HandleResponse -------->+
//!                  |                 ^
//!                  v           fail  |
//!              Connected ------------'
//! ```
//!
//! Failures re-enter `WaitForLink` through the backoff schedule; permanent
//! caster responses latch a forced shutdown instead.

use tracing::{debug, error, info, trace, warn};

use ntriplink_proto::constants::{
    RESPONSE_BUFFER_BYTES, RING_BUFFER_BYTES, RTCM_PREAMBLE, STABLE_CONNECTION_MS,
};
use ntriplink_proto::{
    build_request, classify, BackoffSchedule, RequestParams, ResponseClass, ResponseOutcome,
    RingBuffer,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::status::{format_delay, format_uptime};
use crate::traits::{CasterSocket, CorrectionSink};

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Lifecycle state of the caster connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    /// Disabled, or stopped after an error.
    Off,
    /// Enabled, waiting for the network link and the backoff delay.
    WaitForLink,
    /// Link is up, opening the socket to the caster.
    Connecting,
    /// Handshake sent, collecting the caster's text response.
    WaitResponse,
    /// Response complete, classifying it.
    HandleResponse,
    /// Handshake accepted, relaying correction data.
    Connected,
}

impl ConnectionState {
    /// Short name for logs and status output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::WaitForLink => "wait for link",
            Self::Connecting => "connecting",
            Self::WaitResponse => "wait response",
            Self::HandleResponse => "handle response",
            Self::Connected => "connected",
        }
    }
}

/// Attempt and timing bookkeeping, exposed for status output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeCounters {
    /// Connection attempts in the current activation cycle. Indexes the
    /// backoff table and resets after a stable connection or a full stop.
    pub connection_attempts: u32,
    /// Connection attempts since construction. Never resets.
    pub connection_attempts_total: u32,
    /// Backoff delay armed for the current attempt.
    pub connection_delay_ms: u64,
    /// Reference timestamp for the state's active deadline. While connected
    /// it holds the time correction bytes last arrived.
    pub timer_ms: u64,
    /// Timestamp the current session started. After a restart out of
    /// `Connected` it instead holds the previous session's uptime.
    pub start_time_ms: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// NTRIP client relaying correction data from a caster to a GNSS receiver.
///
/// Generic over the socket and the downstream transport so the state machine
/// can run unchanged against real hardware or scripted test doubles.
pub struct NtripClient<S: CasterSocket, P: CorrectionSink> {
    config: ClientConfig,
    backoff: BackoffSchedule,
    socket: S,
    sink: P,
    ring: RingBuffer,
    state: ConnectionState,
    enabled: bool,
    forced_shutdown: bool,
    counters: RuntimeCounters,
    /// First chunk of the caster's text response; later chunks before the
    /// RTCM preamble are drained and discarded.
    response: Vec<u8>,
}

impl<S: CasterSocket, P: CorrectionSink> NtripClient<S, P> {
    pub fn new(config: ClientConfig, socket: S, sink: P) -> Self {
        let backoff = config.backoff();
        Self {
            config,
            backoff,
            socket,
            sink,
            ring: RingBuffer::new(RING_BUFFER_BYTES),
            state: ConnectionState::Off,
            enabled: false,
            forced_shutdown: false,
            counters: RuntimeCounters::default(),
            response: Vec::with_capacity(RESPONSE_BUFFER_BYTES),
        }
    }

    // -- public control surface ---------------------------------------------

    /// Enable the client. The connection cycle starts on the next tick.
    ///
    /// Fails if the configuration is incomplete or a forced shutdown is
    /// still latched.
    pub fn enable(&mut self) -> Result<(), ClientError> {
        if self.forced_shutdown {
            return Err(ClientError::ForcedShutdown);
        }
        self.config.validate()?;
        self.enabled = true;
        Ok(())
    }

    /// Disable the client. The connection tears down on the next tick.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Clear the forced-shutdown latch so the client may be enabled again.
    pub fn clear_forced_shutdown(&mut self) {
        if self.forced_shutdown {
            info!("forced shutdown cleared");
            self.forced_shutdown = false;
        }
    }

    /// Advance the state machine one tick.
    ///
    /// `now_ms` is a monotonic millisecond clock supplied by the caller;
    /// `link_up` reports whether the network link is currently usable.
    pub fn update(&mut self, now_ms: u64, link_up: bool) {
        // External disable tears down whatever is in flight.
        if !self.enabled && self.state != ConnectionState::Off {
            debug!("client disabled, shutting down");
            self.stop(true, now_ms);
        }

        // Link loss while past the link wait restarts the cycle.
        if !link_up && self.state > ConnectionState::WaitForLink {
            warn!("network link lost");
            self.restart(now_ms);
        }
        // The caster closing the socket mid-session restarts the cycle.
        // Earlier states handle their own socket failures so a close that
        // arrives with the response still buffered gets classified first.
        else if self.state == ConnectionState::Connected && !self.socket.connected() {
            warn!("connection to caster was broken");
            self.restart(now_ms);
        }

        match self.state {
            ConnectionState::Off => {
                if self.enabled && !self.forced_shutdown {
                    self.begin_cycle(now_ms);
                }
            }

            ConnectionState::WaitForLink => {
                if link_up {
                    self.counters.connection_attempts += 1;
                    self.counters.connection_attempts_total += 1;
                    self.set_state(ConnectionState::Connecting);
                }
            }

            ConnectionState::Connecting => {
                // Backoff delay overlaps the link wait; whatever remains is
                // served here.
                if now_ms.saturating_sub(self.counters.timer_ms)
                    >= self.counters.connection_delay_ms
                {
                    self.open_connection(now_ms);
                }
            }

            ConnectionState::WaitResponse => {
                let available = self.socket.available();
                if available > 0 {
                    // The RTCM preamble marks the end of the text response.
                    if self.socket.peek() == Some(RTCM_PREAMBLE) {
                        self.set_state(ConnectionState::HandleResponse);
                    } else {
                        self.capture_response(available, now_ms);
                    }
                } else if !self.response.is_empty()
                    && now_ms.saturating_sub(self.counters.timer_ms)
                        >= self.config.response_done_ms
                {
                    // Quiet since the last response byte: response complete.
                    self.set_state(ConnectionState::HandleResponse);
                } else if self.response.is_empty()
                    && now_ms.saturating_sub(self.counters.timer_ms)
                        >= self.config.response_timeout_ms
                {
                    error!(
                        host = %self.config.host,
                        "caster failed to respond, check the caster address and port"
                    );
                    self.connect_limit_reached(now_ms);
                }
            }

            ConnectionState::HandleResponse => {
                self.handle_response(now_ms);
            }

            ConnectionState::Connected => {
                // A long-lived connection proves the caster is healthy again;
                // forget the failures that led here.
                if self.counters.connection_attempts > 0
                    && now_ms.saturating_sub(self.counters.start_time_ms) > STABLE_CONNECTION_MS
                {
                    debug!("stable connection, resetting attempt counter");
                    self.counters.connection_attempts = 0;
                }

                if self.socket.available() == 0 {
                    if now_ms.saturating_sub(self.counters.timer_ms)
                        >= self.config.receive_timeout_ms
                    {
                        error!("timeout receiving correction data");
                        self.restart(now_ms);
                    }
                } else {
                    self.receive_corrections(now_ms);
                }
            }
        }
    }

    /// Drain buffered correction bytes into the downstream transport.
    ///
    /// Separate from [`update`](Self::update) so the scheduler can run the
    /// push path at its own cadence. Returns the number of bytes pushed.
    pub fn push_corrections(&mut self) -> usize {
        if self.state != ConnectionState::Connected {
            return 0;
        }

        let transaction_size = self.sink.transaction_size();
        let mut pushed_total = 0;
        while let Some(chunk) = self.ring.peek_chunk(transaction_size) {
            let pushed = self.sink.push(chunk);
            if pushed == 0 {
                warn!(pushed_total, "correction push to receiver failed");
                break;
            }
            self.ring.consume(pushed);
            pushed_total += pushed;
        }

        if pushed_total > 0 {
            trace!(bytes = pushed_total, "buffer -> receiver");
        }
        pushed_total
    }

    // -- state introspection ------------------------------------------------

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn forced_shutdown(&self) -> bool {
        self.forced_shutdown
    }

    pub fn counters(&self) -> &RuntimeCounters {
        &self.counters
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Correction bytes currently buffered between socket and receiver.
    pub fn buffered_bytes(&self) -> usize {
        self.ring.available()
    }

    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    /// One-word connection summary.
    pub fn state_summary(&self) -> &'static str {
        match self.state {
            ConnectionState::Off => {
                if !self.enabled {
                    "disabled"
                } else if self.forced_shutdown {
                    "disabled, error detected, forced shutdown"
                } else {
                    "disconnected"
                }
            }
            ConnectionState::WaitForLink
            | ConnectionState::Connecting
            | ConnectionState::WaitResponse
            | ConnectionState::HandleResponse => "connecting",
            ConnectionState::Connected => "connected",
        }
    }

    /// Full status line with endpoint, uptime, and reconnect count.
    pub fn status_line(&self) -> String {
        if !self.enabled {
            return "NTRIP client disabled".to_string();
        }

        // While connected the timer holds the last data arrival, giving a
        // live uptime; otherwise start_time holds the previous session's
        // uptime saved at restart.
        let (uptime_ms, last) = if self.state == ConnectionState::Connected {
            (
                self.counters
                    .timer_ms
                    .saturating_sub(self.counters.start_time_ms),
                "",
            )
        } else {
            (self.counters.start_time_ms, " last")
        };

        format!(
            "NTRIP client {} - {}:{}/{}{} uptime: {} (reconnects: {})",
            self.state_summary(),
            self.config.host,
            self.config.port,
            self.config.mount_point,
            last,
            format_uptime(uptime_ms),
            self.counters.connection_attempts_total,
        )
    }

    // -- internals ----------------------------------------------------------

    fn set_state(&mut self, new_state: ConnectionState) {
        if self.state != new_state {
            debug!(from = self.state.name(), to = new_state.name(), "state");
            self.state = new_state;
        }
    }

    /// Arm the backoff timer and enter the link wait. Shared by the initial
    /// start and every retry.
    fn begin_cycle(&mut self, now_ms: u64) {
        self.counters.connection_delay_ms = self
            .backoff
            .delay_for(self.counters.connection_attempts);
        self.counters.timer_ms = now_ms;
        if self.counters.connection_delay_ms > 0 {
            debug!(
                delay = %format_delay(self.counters.connection_delay_ms),
                "trying again after backoff delay"
            );
        }
        self.set_state(ConnectionState::WaitForLink);
    }

    /// Tear the connection down. A full stop (`shutdown`) returns to `Off`
    /// and requires a fresh [`enable`](Self::enable); otherwise the cycle
    /// re-enters the link wait with the current backoff delay.
    fn stop(&mut self, shutdown: bool, now_ms: u64) {
        self.socket.close();

        if shutdown || !self.enabled {
            if self.state != ConnectionState::Off {
                info!("client stopped");
                self.set_state(ConnectionState::Off);
                self.counters.connection_attempts = 0;
                self.ring.clear();
                self.enabled = false;
            }
        } else {
            self.begin_cycle(now_ms);
        }
    }

    /// Restart after a failure, saving the previous session's uptime.
    fn restart(&mut self, now_ms: u64) {
        if self.state == ConnectionState::Connected {
            let uptime = self
                .counters
                .timer_ms
                .saturating_sub(self.counters.start_time_ms);
            info!(uptime = %format_uptime(uptime), "session ended");
            self.counters.start_time_ms = uptime;
        }
        self.connect_limit_reached(now_ms);
    }

    /// Account for a failed attempt. Stops entirely once the backoff table
    /// is exhausted, otherwise schedules the next retry.
    fn connect_limit_reached(&mut self, now_ms: u64) -> bool {
        let limit_reached = self.counters.connection_attempts >= self.backoff.attempt_limit();
        if limit_reached {
            error!(
                attempts = self.counters.connection_attempts,
                "connection attempts exceeded"
            );
        }
        self.stop(limit_reached, now_ms);
        limit_reached
    }

    /// Permanent failure: stop and refuse to restart until the latch is
    /// cleared.
    fn force_shutdown(&mut self, now_ms: u64) {
        self.forced_shutdown = true;
        self.stop(true, now_ms);
    }

    /// Open the socket and send the handshake request.
    fn open_connection(&mut self, now_ms: u64) {
        info!(
            host = %self.config.host,
            port = self.config.port,
            "connecting to caster"
        );
        if !self.socket.connect(&self.config.host, self.config.port) {
            error!(
                host = %self.config.host,
                port = self.config.port,
                "caster failed to connect, check the caster address and port"
            );
            self.connect_limit_reached(now_ms);
            return;
        }

        let user = self.config.user.as_deref().unwrap_or("");
        let request = build_request(&RequestParams {
            mount_point: &self.config.mount_point,
            product: &self.config.product,
            product_version: &self.config.product_version,
            user,
            password: &self.config.password,
        });
        trace!(request = %request, "sending handshake");
        self.socket.write(request.as_bytes());

        self.counters.timer_ms = now_ms;
        self.response.clear();
        self.set_state(ConnectionState::WaitResponse);
    }

    /// Read pending response bytes. Only the first chunk is kept for
    /// classification; the rest extends the quiet timer and is discarded.
    fn capture_response(&mut self, available: usize, now_ms: u64) {
        let mut scratch = [0u8; RESPONSE_BUFFER_BYTES];
        let mut remaining = available;
        while remaining > 0 {
            let want = remaining.min(scratch.len());
            let bytes_read = self.socket.read(&mut scratch[..want]);
            if bytes_read == 0 {
                break;
            }
            if self.response.is_empty() {
                let keep = bytes_read.min(RESPONSE_BUFFER_BYTES - 1);
                self.response.extend_from_slice(&scratch[..keep]);
            }
            self.counters.timer_ms = now_ms;
            remaining -= bytes_read;
        }
    }

    /// Classify the captured response and act on its retry class.
    fn handle_response(&mut self, now_ms: u64) {
        let text = String::from_utf8_lossy(&self.response).into_owned();
        let outcome = classify(&text, self.response.len());

        match outcome.class() {
            ResponseClass::Success => {
                info!(
                    host = %self.config.host,
                    port = self.config.port,
                    mount_point = %self.config.mount_point,
                    "connected to caster"
                );
                self.counters.start_time_ms = now_ms;
                self.counters.timer_ms = now_ms;
                self.set_state(ConnectionState::Connected);
            }
            ResponseClass::Transient => {
                warn!(
                    host = %self.config.host,
                    outcome = outcome.name(),
                    "caster rejected connection, retrying"
                );
                self.connect_limit_reached(now_ms);
            }
            ResponseClass::Permanent => {
                match outcome {
                    ResponseOutcome::Unauthorized => error!(
                        user = self.config.user.as_deref().unwrap_or(""),
                        host = %self.config.host,
                        "not authorized on caster, check the credentials"
                    ),
                    ResponseOutcome::MountNotFound => error!(
                        mount_point = %self.config.mount_point,
                        host = %self.config.host,
                        "mount point not found on caster"
                    ),
                    _ => error!(
                        host = %self.config.host,
                        outcome = outcome.name(),
                        "caster rejected connection"
                    ),
                }
                self.force_shutdown(now_ms);
            }
        }
    }

    /// Move pending socket bytes into the ring buffer. Overflow truncates:
    /// buffered bytes are kept, excess incoming bytes are dropped.
    fn receive_corrections(&mut self, now_ms: u64) {
        let mut scratch = [0u8; 512];
        let mut received = 0;
        loop {
            let available = self.socket.available();
            if available == 0 {
                break;
            }
            let want = available.min(scratch.len());
            let bytes_read = self.socket.read(&mut scratch[..want]);
            if bytes_read == 0 {
                break;
            }
            self.ring.write(&scratch[..bytes_read]);
            received += bytes_read;
        }

        if received > 0 {
            trace!(bytes = received, "caster -> buffer");
            self.counters.timer_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_distinct() {
        let states = [
            ConnectionState::Off,
            ConnectionState::WaitForLink,
            ConnectionState::Connecting,
            ConnectionState::WaitResponse,
            ConnectionState::HandleResponse,
            ConnectionState::Connected,
        ];
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn state_ordering_tracks_lifecycle() {
        assert!(ConnectionState::Off < ConnectionState::WaitForLink);
        assert!(ConnectionState::WaitForLink < ConnectionState::Connecting);
        assert!(ConnectionState::WaitResponse < ConnectionState::Connected);
    }
}
