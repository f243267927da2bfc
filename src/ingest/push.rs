//! Camera push-video stream source.
//!
//! The camera sends a continuous stream of UDP datagrams to whoever started
//! its stream, one JPEG frame per datagram behind a vendor header. This
//! source owns the receive socket: it binds to the local address that shares
//! the camera's subnet, then loops on a blocking receive, snapshotting each
//! datagram and handing it to the decode pool so the next receive starts
//! immediately. Receive errors are counted and the loop keeps going; only
//! construction can fail.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::decode::DecodeDispatcher;
use crate::error::{Result, StreamError};
use crate::netif::{InterfaceBinding, DEFAULT_STREAM_PORT};
use crate::sink::ImageSink;
use crate::stats::StreamStats;

use super::StreamWorker;

/// Largest datagram the camera is known to emit.
pub const MAX_DATAGRAM_BYTES: usize = 35_000;

/// Receive timeout; bounds how long a stop signal waits on an idle socket.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

const RATE_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for the push stream source.
#[derive(Clone, Debug)]
pub struct PushConfig {
    /// IPv4 address of the camera.
    pub camera_ip: Ipv4Addr,
    /// Prefix length of the camera network's subnet.
    pub prefix_len: u8,
    /// UDP port the camera streams to.
    pub port: u16,
    /// Decode worker threads.
    pub decode_workers: usize,
    /// Pending-decode queue depth; a full queue drops the incoming frame.
    pub queue_capacity: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            camera_ip: Ipv4Addr::new(192, 168, 54, 1),
            prefix_len: 24,
            port: DEFAULT_STREAM_PORT,
            decode_workers: 2,
            queue_capacity: 8,
        }
    }
}

/// Push stream source, bound and ready to spawn.
pub struct PushStreamSource {
    socket: UdpSocket,
    binding: InterfaceBinding,
    dispatcher: DecodeDispatcher,
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
}

impl PushStreamSource {
    /// Resolve the local interface sharing the camera's subnet and bind the
    /// receive socket there. Both failures are fatal: no matching interface
    /// means the camera cannot deliver to us at all.
    pub fn bind(config: &PushConfig, sink: Arc<dyn ImageSink>) -> Result<Self> {
        let binding = InterfaceBinding::resolve(config.camera_ip, config.prefix_len, config.port)?;
        Self::bind_to(binding, config, sink)
    }

    /// Bind to an explicit local address, skipping interface resolution.
    pub fn bind_to(
        binding: InterfaceBinding,
        config: &PushConfig,
        sink: Arc<dyn ImageSink>,
    ) -> Result<Self> {
        let addr = binding.socket_addr();
        let socket = UdpSocket::bind(addr).map_err(|source| StreamError::Bind { addr, source })?;
        socket.set_read_timeout(Some(STOP_POLL_INTERVAL))?;

        let stats = Arc::new(StreamStats::default());
        let dispatcher = DecodeDispatcher::spawn(
            config.decode_workers,
            config.queue_capacity,
            sink,
            Arc::clone(&stats),
        );

        log::info!("udp socket bound on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            binding,
            dispatcher,
            running: Arc::new(AtomicBool::new(true)),
            stats,
        })
    }

    pub fn binding(&self) -> InterfaceBinding {
        self.binding
    }

    /// Actual bound address (resolves the ephemeral port when binding to 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Move the receive loop onto its worker thread.
    pub fn spawn(self) -> StreamWorker {
        let running = Arc::clone(&self.running);
        let stats = Arc::clone(&self.stats);
        let handle = thread::spawn(move || self.run());
        StreamWorker::new(running, stats, handle)
    }

    fn run(mut self) {
        log::info!("stream ingestion started on {}", self.binding.socket_addr());

        // One receive buffer for the lifetime of the loop, sized for the
        // largest datagram the camera emits.
        let mut buffer = vec![0u8; MAX_DATAGRAM_BYTES];
        let mut window_count = 0u64;
        let mut window_start = Instant::now();

        while self.running.load(Ordering::Relaxed) {
            let (len, _src) = match self.socket.recv_from(&mut buffer) {
                Ok(received) => received,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    self.stats.record_receive_error();
                    log::warn!("udp receive error: {}", e);
                    continue;
                }
            };

            self.stats.record_datagram();
            window_count += 1;
            if window_start.elapsed() >= RATE_LOG_INTERVAL {
                log::info!(
                    "received {} datagrams in the last {}s",
                    window_count,
                    window_start.elapsed().as_secs()
                );
                window_count = 0;
                window_start = Instant::now();
            }

            // The buffer is overwritten by the next receive, so the decode
            // task gets its own copy of the filled portion.
            self.dispatcher.submit(buffer[..len].to_vec());
        }

        // Stop accepting decode work without awaiting in-flight decodes; the
        // socket closes when the source drops.
        self.dispatcher.shutdown();
        log::info!("stream ingestion stopped");
    }
}
