//! Error types for the ingestion kernel.

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Errors surfaced to the caller. All of these are construction-time: once a
/// stream worker is running, receive and decode failures are counted and
/// logged instead of propagated.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("no local interface address in subnet {camera_ip}/{prefix_len}")]
    NoMatchingInterface { camera_ip: Ipv4Addr, prefix_len: u8 },

    #[error("invalid subnet prefix length {0} (expected 0..=32)")]
    InvalidPrefixLen(u8),

    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to enumerate network interfaces: {0}")]
    InterfaceEnumeration(std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
