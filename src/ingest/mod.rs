//! Frame sources.
//!
//! This module provides the sources that deliver frames to an `ImageSink`:
//! - Push stream (the camera's UDP push-video protocol)
//! - Mock source (fixed synthetic frames, for UI work without a camera)
//!
//! Sources are a closed set selected by configuration. Each one spawns onto a
//! dedicated worker thread and hands back a `StreamWorker` handle for
//! cooperative stop and join; raw thread interruption is never used.

pub mod mock;
pub mod push;

pub use mock::{MockConfig, MockSource};
pub use push::{PushConfig, PushStreamSource, MAX_DATAGRAM_BYTES};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{SourceKind, StreamConfig};
use crate::error::Result;
use crate::sink::ImageSink;
use crate::stats::{StatsSnapshot, StreamStats};

/// The configured frame source, ready to spawn.
pub enum FrameSource {
    Push(PushStreamSource),
    Mock(MockSource),
}

impl FrameSource {
    /// Construct the source selected by `config`. For the push stream this
    /// resolves the local interface and binds the socket, so an unreachable
    /// camera subnet or a taken port fails here, not at spawn time.
    pub fn from_config(config: &StreamConfig, sink: Arc<dyn ImageSink>) -> Result<Self> {
        match config.source {
            SourceKind::Push => Ok(Self::Push(PushStreamSource::bind(
                &config.push_config(),
                sink,
            )?)),
            SourceKind::Mock => Ok(Self::Mock(MockSource::new(config.mock.clone(), sink))),
        }
    }

    /// Move the source onto its worker thread.
    pub fn spawn(self) -> StreamWorker {
        match self {
            Self::Push(source) => source.spawn(),
            Self::Mock(source) => source.spawn(),
        }
    }
}

/// Handle to a running frame-source worker.
///
/// `stop` is cooperative: the worker observes the flag at the top of its next
/// iteration and winds down. Dropping the handle signals stop but does not
/// block; use `join` (or `stop_and_join`) to wait for the thread to finish.
pub struct StreamWorker {
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
    handle: Option<JoinHandle<()>>,
}

impl StreamWorker {
    pub(crate) fn new(
        running: Arc<AtomicBool>,
        stats: Arc<StreamStats>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            running,
            stats,
            handle: Some(handle),
        }
    }

    /// Signal the worker to stop after its current iteration.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait for the worker thread to exit.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("stream worker thread panicked");
            }
        }
    }

    pub fn stop_and_join(self) {
        self.stop();
        self.join();
    }
}

impl Drop for StreamWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
