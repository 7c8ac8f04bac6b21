//! Scripted test doubles for the boundary traits.
//!
//! These drive the state machine deterministically from tests: the socket
//! replays scripted connect results and inbound bytes, the sink records what
//! it is handed. No real I/O is involved.

use std::collections::VecDeque;

use crate::traits::{CasterSocket, CorrectionSink};

/// A [`CasterSocket`] replaying a scripted session.
#[derive(Debug, Default)]
pub struct MockSocket {
    /// Results for upcoming `connect` calls, oldest first. When empty,
    /// `connect` succeeds.
    pub connect_results: VecDeque<bool>,
    /// Bytes the caster "sent", not yet read by the client.
    inbound: VecDeque<u8>,
    /// Everything the client wrote.
    pub written: Vec<u8>,
    connected: bool,
}

impl MockSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `connect` call to fail.
    pub fn fail_next_connect(&mut self) {
        self.connect_results.push_back(false);
    }

    /// Queue bytes for the client to read.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Simulate the caster dropping the connection. Already-queued bytes
    /// stay readable.
    pub fn drop_connection(&mut self) {
        self.connected = false;
    }
}

impl CasterSocket for MockSocket {
    fn connect(&mut self, _host: &str, _port: u16) -> bool {
        let ok = self.connect_results.pop_front().unwrap_or(true);
        self.connected = ok;
        ok
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.written.extend_from_slice(bytes);
        bytes.len()
    }

    fn available(&mut self) -> usize {
        self.inbound.len()
    }

    fn peek(&mut self) -> Option<u8> {
        self.inbound.front().copied()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.inbound.len());
        for slot in &mut buf[..count] {
            *slot = self.inbound.pop_front().unwrap_or_default();
        }
        count
    }

    fn connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
        self.inbound.clear();
    }
}

/// A [`CorrectionSink`] recording every byte it accepts.
#[derive(Debug)]
pub struct MockSink {
    /// Bytes accepted, in push order.
    pub accepted: Vec<u8>,
    transaction_size: usize,
    /// Cap on bytes accepted per `push` call. Zero makes pushes fail.
    pub per_push_limit: usize,
}

impl MockSink {
    pub fn new(transaction_size: usize) -> Self {
        Self {
            accepted: Vec::new(),
            transaction_size,
            per_push_limit: usize::MAX,
        }
    }
}

impl CorrectionSink for MockSink {
    fn push(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(self.per_push_limit);
        self.accepted.extend_from_slice(&bytes[..take]);
        take
    }

    fn transaction_size(&self) -> usize {
        self.transaction_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_replays_feed_in_order() {
        let mut socket = MockSocket::new();
        socket.feed(b"abc");
        assert_eq!(socket.available(), 3);
        assert_eq!(socket.peek(), Some(b'a'));

        let mut buf = [0u8; 2];
        assert_eq!(socket.read(&mut buf), 2);
        assert_eq!(&buf, b"ab");
        assert_eq!(socket.available(), 1);
    }

    #[test]
    fn socket_scripted_connect_results() {
        let mut socket = MockSocket::new();
        socket.fail_next_connect();
        assert!(!socket.connect("caster.example", 2101));
        assert!(!socket.connected());
        assert!(socket.connect("caster.example", 2101));
        assert!(socket.connected());
    }

    #[test]
    fn sink_honors_per_push_limit() {
        let mut sink = MockSink::new(32);
        sink.per_push_limit = 4;
        assert_eq!(sink.push(b"abcdef"), 4);
        assert_eq!(sink.accepted, b"abcd");
    }
}
