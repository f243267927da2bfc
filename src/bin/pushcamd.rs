//! pushcamd - headless camera stream ingestion daemon
//!
//! Runs the configured frame source against a counting sink that stands in
//! for the display panel, logging stream health every few seconds. Useful for
//! validating camera connectivity and stream quality without the UI.

use anyhow::Result;
use clap::Parser;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pushcam::{DecodedImage, FrameSource, ImageSink, StreamConfig};

#[derive(Debug, Parser)]
#[command(name = "pushcamd", about = "Camera push-video ingestion daemon")]
struct Args {
    /// Camera IPv4 address.
    #[arg(long)]
    camera_ip: Option<Ipv4Addr>,

    /// Subnet prefix length shared with the camera (CIDR, 0-32).
    #[arg(long)]
    prefix_len: Option<u8>,

    /// UDP port the camera streams to.
    #[arg(long)]
    port: Option<u16>,

    /// Frame source to run ("push" or "mock").
    #[arg(long)]
    source: Option<String>,
}

/// Stands in for the video panel: counts frames and logs the stream geometry
/// once. Delivery may come from any decode worker, hence the atomics.
#[derive(Default)]
struct DisplayStandin {
    frames: AtomicU64,
}

impl ImageSink for DisplayStandin {
    fn accept(&self, image: DecodedImage) {
        let n = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if n == 1 {
            log::info!("first frame: {}x{}", image.width, image.height);
        }
        log::trace!("frame #{} ({}x{})", n, image.width, image.height);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = StreamConfig::load()?;
    if let Some(ip) = args.camera_ip {
        cfg.camera.ip = ip;
    }
    if let Some(prefix_len) = args.prefix_len {
        cfg.camera.prefix_len = prefix_len;
    }
    if let Some(port) = args.port {
        cfg.camera.port = port;
    }
    if let Some(source) = args.source.as_deref() {
        cfg.source = source.parse()?;
    }
    cfg.validate()?;

    log::info!(
        "pushcamd starting (source={:?}, camera={}/{}, port={})",
        cfg.source,
        cfg.camera.ip,
        cfg.camera.prefix_len,
        cfg.camera.port
    );

    let sink: Arc<dyn ImageSink> = Arc::new(DisplayStandin::default());
    let worker = FrameSource::from_config(&cfg, sink)?.spawn();

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut last_health_log = Instant::now();
    while !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = worker.stats();
            log::info!(
                "stream: received={} decoded={} decode_failures={} dropped={} receive_errors={}",
                stats.datagrams_received,
                stats.frames_decoded,
                stats.decode_failures,
                stats.frames_dropped,
                stats.receive_errors
            );
            last_health_log = Instant::now();
        }
    }

    log::info!("shutting down");
    worker.stop_and_join();
    Ok(())
}
