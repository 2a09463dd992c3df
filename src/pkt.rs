// SPDX-FileCopyrightText: 2025-2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use etherparse::{IpSlice, TcpSlice};
use std::net::IpAddr;

pub mod locate;

pub use locate::locate_tcp_payload;

/// IP family of a connection, as tracked by the caller through the
/// width of its address bytes. Never inferred from the packet itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    #[inline]
    pub fn from_addr_len(len: usize) -> Option<Self> {
        match len {
            4 => Some(Self::V4),
            16 => Some(Self::V6),
            _ => None,
        }
    }

    #[inline]
    pub fn addr_len(self) -> usize {
        match self {
            Self::V4 => 4,
            Self::V6 => 16,
        }
    }

    /// Value of the version nibble a packet of this family carries.
    #[inline]
    pub fn ip_version(self) -> u8 {
        match self {
            Self::V4 => 4,
            Self::V6 => 6,
        }
    }
}

/// Address bytes (4 or 16) to [`IpAddr`] for display.
pub fn addr_from_bytes(addr: &[u8]) -> Option<IpAddr> {
    if let Ok(b) = <[u8; 4]>::try_from(addr) {
        return Some(IpAddr::from(b));
    }
    if let Ok(b) = <[u8; 16]>::try_from(addr) {
        return Some(IpAddr::from(b));
    }
    None
}

/// Full IP/TCP decode of a packet, for callers that track the
/// connection tuple. The locator does not depend on it.
pub struct PktView<'a> {
    pub ip: IpSlice<'a>,
    pub tcp: TcpSlice<'a>
}

impl<'a> PktView<'a> {
    #[inline]
    pub fn from_raw(raw: &'a [u8]) -> Result<Self> {
        let ip = IpSlice::from_slice(raw)?;
        let tcp = TcpSlice::from_slice(ip.payload().payload)?;

        Ok(Self { ip, tcp })
    }

    #[inline]
    pub fn daddr(&self) -> IpAddr {
        self.ip.destination_addr()
    }

    #[inline]
    pub fn family(&self) -> AddressFamily {
        match self.daddr() {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Destination address in network byte order.
    pub fn daddr_bytes(&self) -> Vec<u8> {
        match self.daddr() {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }
}
