//! Stream counters.
//!
//! Receive and decode failures never stop the stream, so they are made
//! observable here instead: the receive loop, the decode workers and the
//! caller all share one `StreamStats`.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct StreamStats {
    datagrams_received: AtomicU64,
    receive_errors: AtomicU64,
    frames_decoded: AtomicU64,
    decode_failures: AtomicU64,
    frames_dropped: AtomicU64,
}

impl StreamStats {
    pub(crate) fn record_datagram(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the stream counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams pulled off the socket.
    pub datagrams_received: u64,
    /// Socket receive errors (the loop continues past these).
    pub receive_errors: u64,
    /// Frames decoded and delivered to the sink.
    pub frames_decoded: u64,
    /// Datagrams whose payload failed to decode as JPEG.
    pub decode_failures: u64,
    /// Datagrams dropped because the decode queue was full.
    pub frames_dropped: u64,
}
