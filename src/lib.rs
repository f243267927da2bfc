//! Camera push-video ingestion kernel.
//!
//! This crate implements the video-stream pipeline behind a photobooth's live
//! preview: the camera pushes one JPEG frame per UDP datagram, wrapped in a
//! variable-length vendor header, and only delivers the stream to an address
//! on its own subnet.
//!
//! # Architecture
//!
//! - `netif`: subnet-aware selection of the local address to bind, done once
//!   at construction
//! - `extract`: locating the JPEG payload behind the vendor header
//! - `ingest`: frame sources (push stream, mock) and the cancellable worker
//!   handle they run on
//! - `decode`: bounded off-path decode pool feeding the sink
//! - `sink`: the `ImageSink` boundary the display side implements
//! - `config` / `stats` / `error`: layered configuration, shared counters,
//!   typed construction errors
//!
//! # Guarantees
//!
//! The receive loop never waits on a decode: each datagram is snapshotted and
//! queued, and the loop immediately blocks on the next receive. A malformed
//! frame is dropped without disturbing the stream. Frames may reach the sink
//! out of arrival order; the sink must tolerate concurrent delivery.

pub mod config;
mod decode;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod netif;
pub mod sink;
pub mod stats;

pub use config::{CameraSettings, DecodeSettings, SourceKind, StreamConfig};
pub use error::{Result, StreamError};
pub use extract::{jpeg_offset, jpeg_payload};
pub use ingest::{
    FrameSource, MockConfig, MockSource, PushConfig, PushStreamSource, StreamWorker,
    MAX_DATAGRAM_BYTES,
};
pub use netif::{
    find_local_ip_in_subnet, select_in_subnet, subnet_mask, InterfaceBinding, DEFAULT_STREAM_PORT,
};
pub use sink::{DecodedImage, ImageSink};
pub use stats::StatsSnapshot;
