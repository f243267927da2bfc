use std::sync::Mutex;

use tempfile::NamedTempFile;

use pushcam::{SourceKind, StreamConfig};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PUSHCAM_CONFIG",
        "PUSHCAM_SOURCE",
        "PUSHCAM_CAMERA_IP",
        "PUSHCAM_PREFIX_LEN",
        "PUSHCAM_PORT",
        "PUSHCAM_DECODE_WORKERS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
source = "push"

[camera]
ip = "10.0.7.9"
prefix_len = 16
port = 50000

[decode]
workers = 4
queue_capacity = 16

[mock]
width = 320
height = 240
target_fps = 15
"#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("PUSHCAM_CONFIG", file.path());
    std::env::set_var("PUSHCAM_CAMERA_IP", "10.0.9.1");
    std::env::set_var("PUSHCAM_DECODE_WORKERS", "3");

    let cfg = StreamConfig::load().expect("load config");

    assert_eq!(cfg.source, SourceKind::Push);
    assert_eq!(cfg.camera.ip, "10.0.9.1".parse::<std::net::Ipv4Addr>().unwrap());
    assert_eq!(cfg.camera.prefix_len, 16);
    assert_eq!(cfg.camera.port, 50000);
    assert_eq!(cfg.decode.workers, 3);
    assert_eq!(cfg.decode.queue_capacity, 16);
    assert_eq!(cfg.mock.width, 320);
    assert_eq!(cfg.mock.height, 240);
    assert_eq!(cfg.mock.target_fps, 15);

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = StreamConfig::load().expect("load config");

    assert_eq!(cfg.source, SourceKind::Push);
    assert_eq!(
        cfg.camera.ip,
        "192.168.54.1".parse::<std::net::Ipv4Addr>().unwrap()
    );
    assert_eq!(cfg.camera.prefix_len, 24);
    assert_eq!(cfg.camera.port, 49199);
    assert_eq!(cfg.decode.workers, 2);
    assert_eq!(cfg.decode.queue_capacity, 8);

    clear_env();
}

#[test]
fn rejects_out_of_range_prefix_len() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PUSHCAM_PREFIX_LEN", "40");
    let err = StreamConfig::load().unwrap_err();
    assert!(matches!(err, pushcam::StreamError::InvalidPrefixLen(40)));

    clear_env();
}

#[test]
fn rejects_unknown_source_kind() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PUSHCAM_SOURCE", "webcam");
    assert!(StreamConfig::load().is_err());

    clear_env();
}
