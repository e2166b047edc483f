// # Address Parsing
//
// Converts `ADDR` or `ADDR/LEN` text into a `NetAddr`.
//
// ## Interface addresses
//
// The host bits of the parsed address are kept: `192.168.1.5/24` yields
// ip `192.168.1.5` with a /24 mask, not the `192.168.1.0` network.
// Reconciliation compares interface addresses, never subnets.
//
// ## Family detection
//
// The family is taken from the text, not from the parsed bytes:
// - contains `:` → IPv6 (default prefix /128)
// - contains `.` and no `:` → IPv4 (default prefix /32)
// - anything else is rejected

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Classify textual address input
    ///
    /// Returns `None` when the text holds neither `:` nor `.`.
    pub fn of_text(addr: &str) -> Option<Self> {
        if addr.contains(':') {
            Some(IpVersion::V6)
        } else if addr.contains('.') {
            Some(IpVersion::V4)
        } else {
            None
        }
    }

    /// Full-length prefix for this family
    pub fn max_prefix_len(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }
}

/// An interface address: IP plus network mask
///
/// Ordering is lexicographic on the address octets, then on the mask
/// octets. IPv4 addresses are 4 bytes and IPv6 addresses 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetAddr {
    ip: IpAddr,
    prefix_len: u8,
}

impl NetAddr {
    /// Create an address, validating the prefix length against the family
    pub fn new(ip: IpAddr, prefix_len: u8) -> Result<Self> {
        let max = match ip {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max {
            return Err(Error::malformed(format!(
                "prefix length {prefix_len} exceeds {max} for {ip}"
            )));
        }
        Ok(Self { ip, prefix_len })
    }

    /// The interface address (host bits preserved)
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The network mask as an address of the same family
    pub fn mask(&self) -> IpAddr {
        match self.ip {
            IpAddr::V4(_) => {
                let bits = u32::MAX.checked_shl(32 - u32::from(self.prefix_len)).unwrap_or(0);
                IpAddr::V4(Ipv4Addr::from(bits))
            }
            IpAddr::V6(_) => {
                let bits = u128::MAX.checked_shl(128 - u32::from(self.prefix_len)).unwrap_or(0);
                IpAddr::V6(Ipv6Addr::from(bits))
            }
        }
    }

    /// Address bytes in network order
    pub fn ip_octets(&self) -> Vec<u8> {
        octets(self.ip)
    }

    /// Mask bytes in network order
    pub fn mask_octets(&self) -> Vec<u8> {
        octets(self.mask())
    }

    /// Family of the stored address
    pub fn version(&self) -> IpVersion {
        match self.ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

fn octets(ip: IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

impl Ord for NetAddr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ip_octets()
            .cmp(&other.ip_octets())
            .then_with(|| self.mask_octets().cmp(&other.mask_octets()))
    }
}

impl PartialOrd for NetAddr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

impl FromStr for NetAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_ip_with_prefix(s).map(|(addr, _)| addr)
    }
}

/// Parse `ADDR` or `ADDR/LEN` into an interface address
///
/// A bare address gets a full-length prefix. The returned version is
/// derived from the text, so an IPv4-mapped IPv6 literal reports `V6`.
///
/// # Errors
///
/// `MalformedInput` when the text does not split into exactly two
/// non-empty halves, the family is unknown, the address does not parse,
/// or the prefix length is invalid. The message names the input.
pub fn parse_ip_with_prefix(input: &str) -> Result<(NetAddr, IpVersion)> {
    let (addr_text, prefix_text) = if input.contains('/') {
        let parts: Vec<&str> = input.split('/').collect();
        match parts.as_slice() {
            [addr, prefix] if !addr.is_empty() && !prefix.is_empty() => (*addr, Some(*prefix)),
            _ => {
                return Err(Error::malformed(format!(
                    "incorrect ip address and prefix: {input}"
                )));
            }
        }
    } else {
        (input, None)
    };

    let version = IpVersion::of_text(addr_text)
        .ok_or_else(|| Error::malformed(format!("unknown IP version: {input}")))?;

    let prefix_len = match prefix_text {
        Some(text) => parse_prefix_len(text, version)
            .ok_or_else(|| Error::malformed(format!("invalid prefix length in {input}")))?,
        None => version.max_prefix_len(),
    };

    let ip: IpAddr = match version {
        IpVersion::V4 => addr_text.parse::<Ipv4Addr>().map(IpAddr::V4),
        IpVersion::V6 => addr_text.parse::<Ipv6Addr>().map(IpAddr::V6),
    }
    .map_err(|e| Error::malformed(format!("invalid CIDR address {input}: {e}")))?;

    Ok((NetAddr::new(ip, prefix_len)?, version))
}

fn parse_prefix_len(text: &str, version: IpVersion) -> Option<u8> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let len: u8 = text.parse().ok()?;
    (len <= version.max_prefix_len()).then_some(len)
}

/// Parse a list of textual addresses, failing on the first bad entry
pub fn parse_addresses<'a, I>(inputs: I) -> Result<Vec<NetAddr>>
where
    I: IntoIterator<Item = &'a str>,
{
    inputs
        .into_iter()
        .map(|s| parse_ip_with_prefix(s).map(|(addr, _)| addr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_v4_with_prefix_keeps_host_bits() {
        let (addr, version) = parse_ip_with_prefix("192.168.1.5/24").unwrap();
        assert_eq!(version, IpVersion::V4);
        assert_eq!(addr.ip(), "192.168.1.5".parse::<IpAddr>().unwrap());
        assert_eq!(addr.prefix_len(), 24);
        assert_eq!(addr.mask(), "255.255.255.0".parse::<IpAddr>().unwrap());
        assert_eq!(addr.ip_octets(), vec![192, 168, 1, 5]);
        assert_eq!(addr.mask_octets(), vec![255, 255, 255, 0]);
    }

    #[test]
    fn test_bare_address_gets_full_prefix() {
        let (bare, _) = parse_ip_with_prefix("10.0.0.1").unwrap();
        let (explicit, _) = parse_ip_with_prefix("10.0.0.1/32").unwrap();
        assert_eq!(bare, explicit);

        let (bare6, v) = parse_ip_with_prefix("::1").unwrap();
        let (explicit6, _) = parse_ip_with_prefix("::1/128").unwrap();
        assert_eq!(v, IpVersion::V6);
        assert_eq!(bare6, explicit6);
    }

    #[test]
    fn test_octet_lengths_match_family() {
        for input in ["1.2.3.4", "10.1.0.0/16", "fe80::1/64", "2001:db8::", "::ffff:1.2.3.4"] {
            let (addr, version) = parse_ip_with_prefix(input).unwrap();
            let expected = match version {
                IpVersion::V4 => 4,
                IpVersion::V6 => 16,
            };
            assert_eq!(addr.ip_octets().len(), expected, "{input}");
            assert_eq!(addr.mask_octets().len(), expected, "{input}");
        }
    }

    #[test]
    fn test_mapped_v4_is_v6() {
        let (addr, version) = parse_ip_with_prefix("::ffff:10.0.0.1").unwrap();
        assert_eq!(version, IpVersion::V6);
        assert_eq!(addr.prefix_len(), 128);
    }

    #[test]
    fn test_v6_mask() {
        let (addr, _) = parse_ip_with_prefix("2001:db8::5/64").unwrap();
        assert_eq!(addr.mask(), "ffff:ffff:ffff:ffff::".parse::<IpAddr>().unwrap());
        let (zero, _) = parse_ip_with_prefix("::/0").unwrap();
        assert_eq!(zero.mask(), "::".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "", "/", "10.0.0.1/", "/24", "10.0.0.1/24/1", "localhost", "10.0.0.1/33",
            "::1/129", "10.0.0.1/+8", "10.0.0.1/abc", "10.0.0.300", "1.2.3.4:80", "fe80::1%eth0",
        ] {
            let err = parse_ip_with_prefix(input).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "{input}: {err}");
        }
    }

    #[test]
    fn test_error_names_input() {
        let err = parse_ip_with_prefix("eth0").unwrap_err();
        assert!(err.to_string().contains("eth0"));
        assert!(err.to_string().contains("unknown IP version"));
    }

    #[test]
    fn test_ordering_ip_then_mask() {
        let a: NetAddr = "10.0.0.1/24".parse().unwrap();
        let b: NetAddr = "10.0.0.1/32".parse().unwrap();
        let c: NetAddr = "10.0.0.2/8".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_display() {
        let addr: NetAddr = "fe80::1".parse().unwrap();
        assert_eq!(addr.to_string(), "fe80::1/128");
    }

    #[test]
    fn test_parse_addresses() {
        let addrs = parse_addresses(["10.0.0.1", "fe80::1/64"]).unwrap();
        assert_eq!(addrs.len(), 2);
        assert!(parse_addresses(["10.0.0.1", "bogus"]).is_err());
    }
}
