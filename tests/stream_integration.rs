//! End-to-end stream tests over the loopback interface: a sender socket plays
//! the camera, pushing vendor-header-wrapped JPEG datagrams at the bound
//! receive socket.

use std::io::Cursor;
use std::net::{Ipv4Addr, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pushcam::{
    DecodedImage, ImageSink, InterfaceBinding, MockConfig, MockSource, PushConfig,
    PushStreamSource, StreamError,
};

const VENDOR_HEADER_LEN: usize = 130;

fn loopback_binding() -> InterfaceBinding {
    InterfaceBinding {
        local_ip: Ipv4Addr::LOCALHOST,
        port: 0,
    }
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    bytes
}

fn datagram_with_jpeg(jpeg: &[u8]) -> Vec<u8> {
    let mut datagram = vec![0u8; VENDOR_HEADER_LEN];
    datagram.extend_from_slice(jpeg);
    datagram
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[derive(Default)]
struct CollectSink {
    frames: Mutex<Vec<(u32, u32)>>,
}

impl CollectSink {
    fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl ImageSink for CollectSink {
    fn accept(&self, image: DecodedImage) {
        self.frames.lock().unwrap().push((image.width, image.height));
    }
}

#[test]
fn delivers_streamed_frames_to_the_sink() {
    let sink = Arc::new(CollectSink::default());
    let config = PushConfig::default();
    let source = PushStreamSource::bind_to(loopback_binding(), &config, sink.clone())
        .expect("bind loopback");
    let addr = source.local_addr().expect("local addr");
    let worker = source.spawn();

    let datagram = datagram_with_jpeg(&jpeg_bytes(16, 12));
    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind sender");
    for _ in 0..3 {
        sender.send_to(&datagram, addr).expect("send datagram");
    }

    assert!(wait_until(Duration::from_secs(5), || sink.len() == 3));
    let frames = sink.frames.lock().unwrap().clone();
    assert!(frames.iter().all(|&dims| dims == (16, 12)));
    assert_eq!(worker.stats().datagrams_received, 3);

    worker.stop_and_join();
}

#[test]
fn malformed_datagram_does_not_break_the_stream() {
    let sink = Arc::new(CollectSink::default());
    let config = PushConfig::default();
    let source = PushStreamSource::bind_to(loopback_binding(), &config, sink.clone())
        .expect("bind loopback");
    let addr = source.local_addr().expect("local addr");
    let worker = source.spawn();

    let good = datagram_with_jpeg(&jpeg_bytes(16, 12));
    let mut bad = vec![0u8; VENDOR_HEADER_LEN];
    bad.extend_from_slice(&[0xAB; 300]);

    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind sender");
    sender.send_to(&good, addr).expect("send good");
    sender.send_to(&bad, addr).expect("send bad");
    sender.send_to(&good, addr).expect("send good");

    // Exactly the two valid frames arrive; the bad one is counted, not fatal.
    assert!(wait_until(Duration::from_secs(5), || {
        sink.len() == 2 && worker.stats().decode_failures == 1
    }));
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(sink.len(), 2);

    worker.stop_and_join();
}

#[test]
fn receive_throughput_is_independent_of_decode_latency() {
    struct SlowSink {
        delivered: AtomicU64,
    }

    impl ImageSink for SlowSink {
        fn accept(&self, _image: DecodedImage) {
            std::thread::sleep(Duration::from_millis(300));
            self.delivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    let sink = Arc::new(SlowSink {
        delivered: AtomicU64::new(0),
    });
    let config = PushConfig {
        decode_workers: 1,
        queue_capacity: 4,
        ..PushConfig::default()
    };
    let source =
        PushStreamSource::bind_to(loopback_binding(), &config, sink).expect("bind loopback");
    let addr = source.local_addr().expect("local addr");
    let worker = source.spawn();

    let datagram = datagram_with_jpeg(&jpeg_bytes(16, 12));
    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind sender");
    for _ in 0..12 {
        sender.send_to(&datagram, addr).expect("send datagram");
    }

    // All datagrams come off the socket long before the single 300ms-per-frame
    // decode worker could have drained them.
    assert!(wait_until(Duration::from_secs(2), || {
        worker.stats().datagrams_received == 12
    }));
    let stats = worker.stats();
    assert!(stats.frames_decoded < 12);
    assert!(stats.frames_dropped >= 1);

    worker.stop_and_join();
}

#[test]
fn no_sink_deliveries_after_stop() {
    let sink = Arc::new(CollectSink::default());
    let config = PushConfig::default();
    let source = PushStreamSource::bind_to(loopback_binding(), &config, sink.clone())
        .expect("bind loopback");
    let addr = source.local_addr().expect("local addr");
    let worker = source.spawn();

    let datagram = datagram_with_jpeg(&jpeg_bytes(16, 12));
    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind sender");
    sender.send_to(&datagram, addr).expect("send datagram");
    assert!(wait_until(Duration::from_secs(5), || sink.len() == 1));

    worker.stop_and_join();

    // Socket is closed and the decode queue disconnected; nothing sent now
    // can reach the sink.
    let delivered_at_stop = sink.len();
    for _ in 0..3 {
        let _ = sender.send_to(&datagram, addr);
    }
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(sink.len(), delivered_at_stop);
}

#[test]
fn mock_source_delivers_until_stopped() {
    let sink = Arc::new(CollectSink::default());
    let config = MockConfig {
        width: 32,
        height: 24,
        target_fps: 100,
    };
    let worker = MockSource::new(config, sink.clone()).spawn();

    assert!(wait_until(Duration::from_secs(2), || sink.len() >= 3));
    let frames = sink.frames.lock().unwrap().clone();
    assert!(frames.iter().all(|&dims| dims == (32, 24)));

    worker.stop_and_join();
    let delivered_at_stop = sink.len();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(sink.len(), delivered_at_stop);
}

#[test]
fn resolver_accepts_loopback_camera_when_loopback_exists() {
    match pushcam::find_local_ip_in_subnet(Ipv4Addr::LOCALHOST, 8) {
        Ok(addr) => assert_eq!(addr.octets()[0], 127),
        // Hosts without a configured loopback interface have nothing to select.
        Err(StreamError::NoMatchingInterface { .. }) => {}
        Err(e) => panic!("unexpected resolver error: {e}"),
    }
}
