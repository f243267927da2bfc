//! Mock frame source: repeats a fixed synthetic frame at a steady rate, so
//! the rest of the application can run without a camera on the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::sink::{DecodedImage, ImageSink};
use crate::stats::StreamStats;

use super::StreamWorker;

/// Configuration for the mock source.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub width: u32,
    pub height: u32,
    /// Delivery rate (frames per second).
    pub target_fps: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            target_fps: 30,
        }
    }
}

/// Mock frame source.
pub struct MockSource {
    config: MockConfig,
    sink: Arc<dyn ImageSink>,
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
}

impl MockSource {
    pub fn new(config: MockConfig, sink: Arc<dyn ImageSink>) -> Self {
        Self {
            config,
            sink,
            running: Arc::new(AtomicBool::new(true)),
            stats: Arc::new(StreamStats::default()),
        }
    }

    /// Move the delivery loop onto its worker thread.
    pub fn spawn(self) -> StreamWorker {
        let running = Arc::clone(&self.running);
        let stats = Arc::clone(&self.stats);
        let handle = thread::spawn(move || self.run());
        StreamWorker::new(running, stats, handle)
    }

    fn run(self) {
        log::info!(
            "mock source started ({}x{} at {} fps)",
            self.config.width,
            self.config.height,
            self.config.target_fps
        );

        let frame = self.synthetic_frame();
        let interval = frame_interval(self.config.target_fps);

        while self.running.load(Ordering::Relaxed) {
            self.stats.record_decoded();
            self.sink.accept(frame.clone());
            thread::sleep(interval);
        }

        log::info!("mock source stopped");
    }

    /// Fixed test-card gradient; stands in for the packaged mock image.
    fn synthetic_frame(&self) -> DecodedImage {
        let (width, height) = (self.config.width, self.config.height);
        let mut pixels = vec![0u8; (width * height * 3) as usize];
        for y in 0..height {
            for x in 0..width {
                let i = ((y * width + x) * 3) as usize;
                pixels[i] = (x * 255 / width.max(1)) as u8;
                pixels[i + 1] = (y * 255 / height.max(1)) as u8;
                pixels[i + 2] = 96;
            }
        }
        DecodedImage::from_raw(pixels, width, height)
    }
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}
