use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, StreamError};
use crate::ingest::{MockConfig, PushConfig};
use crate::netif::DEFAULT_STREAM_PORT;

const DEFAULT_CAMERA_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 54, 1);
const DEFAULT_PREFIX_LEN: u8 = 24;
const DEFAULT_DECODE_WORKERS: usize = 2;
const DEFAULT_QUEUE_CAPACITY: usize = 8;

#[derive(Debug, Deserialize, Default)]
struct StreamConfigFile {
    source: Option<String>,
    camera: Option<CameraConfigFile>,
    decode: Option<DecodeConfigFile>,
    mock: Option<MockConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    ip: Option<Ipv4Addr>,
    prefix_len: Option<u8>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct DecodeConfigFile {
    workers: Option<usize>,
    queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct MockConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

/// Which frame source to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// The camera's UDP push-video stream.
    Push,
    /// Fixed synthetic frames.
    Mock,
}

impl FromStr for SourceKind {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "push" => Ok(Self::Push),
            "mock" => Ok(Self::Mock),
            other => Err(StreamError::Config(format!(
                "unknown source kind '{}'; expected 'push' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub source: SourceKind,
    pub camera: CameraSettings,
    pub decode: DecodeSettings,
    pub mock: MockConfig,
}

#[derive(Clone, Debug)]
pub struct CameraSettings {
    pub ip: Ipv4Addr,
    pub prefix_len: u8,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DecodeSettings {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl StreamConfig {
    /// Load configuration: defaults, then the TOML file named by
    /// `PUSHCAM_CONFIG` (if set), then environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PUSHCAM_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: StreamConfigFile) -> Result<Self> {
        let source = match file.source.as_deref() {
            Some(raw) => raw.parse()?,
            None => SourceKind::Push,
        };
        let camera = CameraSettings {
            ip: file
                .camera
                .as_ref()
                .and_then(|camera| camera.ip)
                .unwrap_or(DEFAULT_CAMERA_IP),
            prefix_len: file
                .camera
                .as_ref()
                .and_then(|camera| camera.prefix_len)
                .unwrap_or(DEFAULT_PREFIX_LEN),
            port: file
                .camera
                .as_ref()
                .and_then(|camera| camera.port)
                .unwrap_or(DEFAULT_STREAM_PORT),
        };
        let decode = DecodeSettings {
            workers: file
                .decode
                .as_ref()
                .and_then(|decode| decode.workers)
                .unwrap_or(DEFAULT_DECODE_WORKERS),
            queue_capacity: file
                .decode
                .as_ref()
                .and_then(|decode| decode.queue_capacity)
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
        };
        let mock_defaults = MockConfig::default();
        let mock = MockConfig {
            width: file
                .mock
                .as_ref()
                .and_then(|mock| mock.width)
                .unwrap_or(mock_defaults.width),
            height: file
                .mock
                .as_ref()
                .and_then(|mock| mock.height)
                .unwrap_or(mock_defaults.height),
            target_fps: file
                .mock
                .and_then(|mock| mock.target_fps)
                .unwrap_or(mock_defaults.target_fps),
        };
        Ok(Self {
            source,
            camera,
            decode,
            mock,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(source) = std::env::var("PUSHCAM_SOURCE") {
            if !source.trim().is_empty() {
                self.source = source.parse()?;
            }
        }
        if let Ok(ip) = std::env::var("PUSHCAM_CAMERA_IP") {
            if !ip.trim().is_empty() {
                self.camera.ip = ip
                    .parse()
                    .map_err(|_| StreamError::Config(format!("invalid PUSHCAM_CAMERA_IP '{}'", ip)))?;
            }
        }
        if let Ok(prefix_len) = std::env::var("PUSHCAM_PREFIX_LEN") {
            self.camera.prefix_len = prefix_len.parse().map_err(|_| {
                StreamError::Config("PUSHCAM_PREFIX_LEN must be an integer 0..=32".to_string())
            })?;
        }
        if let Ok(port) = std::env::var("PUSHCAM_PORT") {
            self.camera.port = port.parse().map_err(|_| {
                StreamError::Config("PUSHCAM_PORT must be a UDP port number".to_string())
            })?;
        }
        if let Ok(workers) = std::env::var("PUSHCAM_DECODE_WORKERS") {
            self.decode.workers = workers.parse().map_err(|_| {
                StreamError::Config("PUSHCAM_DECODE_WORKERS must be a positive integer".to_string())
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.prefix_len > 32 {
            return Err(StreamError::InvalidPrefixLen(self.camera.prefix_len));
        }
        if self.camera.port == 0 {
            return Err(StreamError::Config(
                "camera port must be nonzero".to_string(),
            ));
        }
        if self.decode.workers == 0 {
            return Err(StreamError::Config(
                "decode workers must be at least 1".to_string(),
            ));
        }
        if self.decode.queue_capacity == 0 {
            return Err(StreamError::Config(
                "decode queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn push_config(&self) -> PushConfig {
        PushConfig {
            camera_ip: self.camera.ip,
            prefix_len: self.camera.prefix_len,
            port: self.camera.port,
            decode_workers: self.decode.workers,
            queue_capacity: self.decode.queue_capacity,
        }
    }
}

fn read_config_file(path: &Path) -> Result<StreamConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        StreamError::Config(format!(
            "failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    let cfg = toml::from_str(&raw).map_err(|e| {
        StreamError::Config(format!("invalid config file {}: {}", path.display(), e))
    })?;
    Ok(cfg)
}
