//! Subnet-aware local interface selection.
//!
//! The camera only delivers its stream to an address it can reach on its own
//! network segment, so the receive socket must be bound to the local interface
//! address that shares the camera's subnet. Selection runs once, before the
//! socket is bound; failure to find a matching interface is fatal to stream
//! startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Result, StreamError};

/// UDP port the camera pushes its video stream to.
pub const DEFAULT_STREAM_PORT: u16 = 49199;

/// IPv4 netmask with `prefix_len` leading one-bits.
pub fn subnet_mask(prefix_len: u8) -> Result<u32> {
    match prefix_len {
        0 => Ok(0),
        1..=32 => Ok(u32::MAX << (32 - prefix_len as u32)),
        _ => Err(StreamError::InvalidPrefixLen(prefix_len)),
    }
}

/// First candidate address that shares the camera's subnet.
pub fn select_in_subnet<I>(
    candidates: I,
    camera_ip: Ipv4Addr,
    prefix_len: u8,
) -> Result<Option<Ipv4Addr>>
where
    I: IntoIterator<Item = Ipv4Addr>,
{
    let mask = subnet_mask(prefix_len)?;
    let network = u32::from(camera_ip) & mask;
    Ok(candidates
        .into_iter()
        .find(|addr| u32::from(*addr) & mask == network))
}

/// Enumerate the local interface addresses and pick the one reachable on the
/// camera's subnet.
pub fn find_local_ip_in_subnet(camera_ip: Ipv4Addr, prefix_len: u8) -> Result<Ipv4Addr> {
    let interfaces = if_addrs::get_if_addrs().map_err(StreamError::InterfaceEnumeration)?;
    let candidates = interfaces.iter().filter_map(|iface| match iface.ip() {
        IpAddr::V4(addr) => Some(addr),
        IpAddr::V6(_) => None,
    });
    select_in_subnet(candidates, camera_ip, prefix_len)?.ok_or(StreamError::NoMatchingInterface {
        camera_ip,
        prefix_len,
    })
}

/// The local address and port the receive socket binds to. Computed once at
/// construction and immutable thereafter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceBinding {
    pub local_ip: Ipv4Addr,
    pub port: u16,
}

impl InterfaceBinding {
    pub fn resolve(camera_ip: Ipv4Addr, prefix_len: u8, port: u16) -> Result<Self> {
        let local_ip = find_local_ip_in_subnet(camera_ip, prefix_len)?;
        log::info!(
            "selected local address {} for camera {}/{}",
            local_ip,
            camera_ip,
            prefix_len
        );
        Ok(Self { local_ip, port })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.local_ip, self.port))
    }
}
