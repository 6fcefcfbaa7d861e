//! # Address and Port Ranges
//!
//! [`NetworkRange`] wraps a CIDR block and enumerates its usable host
//! addresses lazily. Enumeration is restartable: every call to
//! [`NetworkRange::hosts`] starts from the first usable address again.
//!
//! Host addressing follows the usual convention:
//! * IPv4 `/0`-`/30`: network and broadcast addresses are excluded.
//! * IPv4 `/31`: both addresses are usable (point-to-point link).
//! * IPv4 `/32`: the single address is usable.
//! * IPv6 `/0`-`/126`: the subnet-router anycast (network) address is excluded.
//! * IPv6 `/127` and `/128`: every address is usable.
//!
//! Ranges holding more than [`MAX_HOSTS`] usable addresses are rejected; a
//! sweep over them would not finish in any useful time.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;

use crate::error::ConfigError;

/// Largest sweepable range: an IPv4 `/16`, or an IPv6 `/112`.
pub const MAX_HOSTS: u128 = 1 << 16;

/// A CIDR block, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    network: IpAddr,
    prefix: u8,
}

impl NetworkRange {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, ConfigError> {
        let net = IpNetwork::new(addr, prefix).map_err(|e| ConfigError::InvalidCidr {
            input: format!("{addr}/{prefix}"),
            reason: e.to_string(),
        })?;

        let range = Self {
            network: net.network(),
            prefix,
        };
        let hosts = range.host_count();
        if hosts > MAX_HOSTS {
            return Err(ConfigError::RangeTooLarge {
                input: range.to_string(),
                hosts,
                max: MAX_HOSTS,
            });
        }
        Ok(range)
    }

    /// A range holding exactly one host.
    pub fn single(addr: IpAddr) -> Self {
        let prefix = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self {
            network: addr,
            prefix,
        }
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of usable host addresses (saturates at `u128::MAX` for `::/0`).
    pub fn host_count(&self) -> u128 {
        let (first, last) = self.usable_bounds();
        (last - first).saturating_add(1)
    }

    /// Lazily enumerates all usable host addresses in ascending order.
    pub fn hosts(&self) -> HostIter {
        let (first, last) = self.usable_bounds();
        HostIter {
            next: Some(first),
            last,
            v4: self.network.is_ipv4(),
        }
    }

    /// Inclusive bounds of the usable host addresses, as integers.
    fn usable_bounds(&self) -> (u128, u128) {
        let bits: u8 = self.bits();
        let host_bits: u32 = u32::from(bits - self.prefix);
        let base: u128 = to_u128(self.network);
        let span: u128 = if host_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        let top: u128 = base + span;

        match (self.network, host_bits) {
            (_, 0) | (_, 1) => (base, top),
            (IpAddr::V4(_), _) => (base + 1, top - 1),
            (IpAddr::V6(_), _) => (base + 1, top),
        }
    }

    fn bits(&self) -> u8 {
        match self.network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

impl FromStr for NetworkRange {
    type Err = ConfigError;

    /// Parses `"192.168.1.0/24"`, `"fd00::/120"` or a bare address.
    ///
    /// Host bits set in the address are masked off, so `10.0.0.7/30` is the
    /// same range as `10.0.0.4/30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| ConfigError::InvalidCidr {
            input: s.to_string(),
            reason,
        };

        let Some((ip_str, prefix_str)) = s.split_once('/') else {
            let addr = s
                .parse::<IpAddr>()
                .map_err(|e| invalid(e.to_string()))?;
            return Ok(Self::single(addr));
        };

        let addr = ip_str
            .parse::<IpAddr>()
            .map_err(|e| invalid(format!("bad address '{ip_str}': {e}")))?;
        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| invalid(format!("bad prefix '{prefix_str}': {e}")))?;

        Self::new(addr, prefix).map_err(|e| match e {
            ConfigError::InvalidCidr { .. } => invalid(format!("prefix /{prefix} is too long")),
            other => other,
        })
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Lazy, finite iterator over a [`NetworkRange`]'s usable hosts.
#[derive(Debug, Clone)]
pub struct HostIter {
    next: Option<u128>,
    last: u128,
    v4: bool,
}

impl Iterator for HostIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            Some(current + 1)
        } else {
            None
        };
        Some(from_u128(current, self.v4))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(current) => {
                let remaining = self.last - current + 1;
                match usize::try_from(remaining) {
                    Ok(n) => (n, Some(n)),
                    Err(_) => (usize::MAX, None),
                }
            }
        }
    }
}

fn to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(value: u128, v4: bool) -> IpAddr {
    if v4 {
        IpAddr::V4(Ipv4Addr::from(value as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(value))
    }
}

/// An inclusive, non-empty TCP port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    /// Validates `start..=end`. Ports are taken as `u32` so out-of-range
    /// values coming from user input are reported rather than truncated.
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        let start_port = checked_port(start)?;
        let end_port = checked_port(end)?;
        if start_port > end_port {
            return Err(ConfigError::InvalidPortRange { start, end });
        }
        Ok(Self {
            start: start_port,
            end: end_port,
        })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl FromStr for PortRange {
    type Err = ConfigError;

    /// Parses `"22"` or `"1-1024"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedPortRange(s.to_string());
        let parse = |part: &str| part.trim().parse::<u32>().map_err(|_| malformed());

        match s.split_once('-') {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => {
                let port = parse(s)?;
                Self::new(port, port)
            }
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn checked_port(port: u32) -> Result<u16, ConfigError> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ConfigError::InvalidPort(port)),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn slash_24_excludes_network_and_broadcast() {
        let range: NetworkRange = "192.168.1.0/24".parse().unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();

        assert_eq!(hosts.len(), 254);
        assert_eq!(range.host_count(), 254);
        assert_eq!(hosts.first(), Some(&v4(192, 168, 1, 1)));
        assert_eq!(hosts.last(), Some(&v4(192, 168, 1, 254)));
    }

    #[test]
    fn slash_30_has_two_usable_hosts() {
        let range: NetworkRange = "10.0.0.0/30".parse().unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(hosts, vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);
    }

    #[test]
    fn slash_31_and_32_keep_every_address() {
        let p2p: NetworkRange = "10.0.0.0/31".parse().unwrap();
        assert_eq!(p2p.hosts().collect::<Vec<_>>(), vec![v4(10, 0, 0, 0), v4(10, 0, 0, 1)]);

        let single: NetworkRange = "10.0.0.9/32".parse().unwrap();
        assert_eq!(single.hosts().collect::<Vec<_>>(), vec![v4(10, 0, 0, 9)]);
        assert_eq!(single.host_count(), 1);
    }

    #[test]
    fn bare_address_is_a_single_host_range() {
        let range: NetworkRange = "172.16.0.5".parse().unwrap();
        assert_eq!(range.prefix(), 32);
        assert_eq!(range.hosts().collect::<Vec<_>>(), vec![v4(172, 16, 0, 5)]);
    }

    #[test]
    fn host_bits_are_masked() {
        let range: NetworkRange = "10.0.0.7/30".parse().unwrap();
        assert_eq!(range.network(), v4(10, 0, 0, 4));
        assert_eq!(range.to_string(), "10.0.0.4/30");
    }

    #[test]
    fn enumeration_is_restartable() {
        let range: NetworkRange = "10.1.0.0/29".parse().unwrap();
        let first: Vec<IpAddr> = range.hosts().collect();
        let second: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn ipv6_ranges() {
        let range: NetworkRange = "fd00::/126".parse().unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(hosts.len(), 3);
        assert_eq!(hosts[0], "fd00::1".parse::<IpAddr>().unwrap());

        let single: NetworkRange = "fd00::5/128".parse().unwrap();
        assert_eq!(single.host_count(), 1);

        let widest: NetworkRange = "fd00::/112".parse().unwrap();
        assert_eq!(widest.host_count(), MAX_HOSTS - 1);
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let slash_16: NetworkRange = "10.0.0.0/16".parse().unwrap();
        assert_eq!(slash_16.host_count(), 65_534);

        assert!(matches!(
            "10.0.0.0/15".parse::<NetworkRange>(),
            Err(ConfigError::RangeTooLarge { hosts: 131_070, .. })
        ));
        assert!(matches!(
            "fd00::/64".parse::<NetworkRange>(),
            Err(ConfigError::RangeTooLarge { max: MAX_HOSTS, .. })
        ));
        assert!(matches!(
            "::/0".parse::<NetworkRange>(),
            Err(ConfigError::RangeTooLarge { hosts: u128::MAX, .. })
        ));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        assert!("not-a-network".parse::<NetworkRange>().is_err());
        assert!("10.0.0.0/33".parse::<NetworkRange>().is_err());
        assert!("10.0.0.256/24".parse::<NetworkRange>().is_err());
        assert!("10.0.0.0/abc".parse::<NetworkRange>().is_err());
        assert!("fd00::/129".parse::<NetworkRange>().is_err());
    }

    #[test]
    fn port_range_parsing_and_bounds() {
        let range: PortRange = "20-23".parse().unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(range.iter().collect::<Vec<u16>>(), vec![20, 21, 22, 23]);

        let single: PortRange = "443".parse().unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.iter().collect::<Vec<u16>>(), vec![443]);

        assert_eq!(PortRange::new(0, 10), Err(ConfigError::InvalidPort(0)));
        assert_eq!(PortRange::new(1, 70_000), Err(ConfigError::InvalidPort(70_000)));
        assert_eq!(
            PortRange::new(100, 10),
            Err(ConfigError::InvalidPortRange { start: 100, end: 10 })
        );
        assert!("ten-twenty".parse::<PortRange>().is_err());
        assert_eq!(PortRange::new(1, 65_535).unwrap().len(), 65_535);
    }
}
