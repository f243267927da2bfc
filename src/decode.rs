//! Off-path frame decoding.
//!
//! The receive loop hands each datagram snapshot to a fixed pool of decode
//! workers over a bounded queue, so receive throughput is independent of
//! decode latency. The queue bound is what keeps a sustained datagram burst
//! from growing decode concurrency without limit; the drop policy when it
//! fills is explicit: the incoming snapshot is dropped and counted, and
//! already-queued frames are left alone (drop newest).
//!
//! Completion order across submissions is unspecified. A later, faster-to-
//! decode frame may reach the sink before an earlier one; acceptable for a
//! live preview.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::extract;
use crate::sink::{DecodedImage, ImageSink};
use crate::stats::StreamStats;

pub(crate) struct DecodeDispatcher {
    tx: Option<Sender<Vec<u8>>>,
    stats: Arc<StreamStats>,
}

impl DecodeDispatcher {
    /// Start `workers` decode threads pulling from a queue of `queue_capacity`
    /// datagram snapshots. Workers exit once the dispatcher shuts down and the
    /// queue drains.
    pub(crate) fn spawn(
        workers: usize,
        queue_capacity: usize,
        sink: Arc<dyn ImageSink>,
        stats: Arc<StreamStats>,
    ) -> Self {
        let (tx, rx) = bounded::<Vec<u8>>(queue_capacity.max(1));
        for _ in 0..workers.max(1) {
            let rx = rx.clone();
            let sink = Arc::clone(&sink);
            let stats = Arc::clone(&stats);
            thread::spawn(move || decode_worker(rx, sink, stats));
        }
        Self {
            tx: Some(tx),
            stats,
        }
    }

    /// Queue one datagram snapshot for decoding. Never blocks the caller.
    pub(crate) fn submit(&self, snapshot: Vec<u8>) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        match tx.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.stats.record_dropped();
                log::debug!("decode queue full, dropping incoming frame");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Stop accepting new work. Does not wait for in-flight decodes; the
    /// bounded queue keeps the remaining work (and therefore quiescence)
    /// bounded.
    pub(crate) fn shutdown(&mut self) {
        self.tx = None;
    }
}

fn decode_worker(rx: Receiver<Vec<u8>>, sink: Arc<dyn ImageSink>, stats: Arc<StreamStats>) {
    while let Ok(datagram) = rx.recv() {
        let payload = extract::jpeg_payload(&datagram);
        match DecodedImage::from_jpeg(payload) {
            Ok(image) => {
                stats.record_decoded();
                sink.accept(image);
            }
            Err(e) => {
                stats.record_decode_failure();
                log::debug!(
                    "dropping frame that failed to decode ({} payload bytes): {}",
                    payload.len(),
                    e
                );
            }
        }
    }
}
