//! IPv4 prefix matching.
//!
//! A range is `base/prefix` with the prefix defaulting to 32. Membership is
//! `(ip & mask) == (base & mask)` where the mask carries the top `prefix` bits.
//! IPv6 input is reported as [`EdgepassError::UnsupportedAddressFamily`]
//! rather than matched.

use crate::EdgepassError;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Longest IPv4 prefix.
pub const MAX_PREFIX_LEN: u8 = 32;

/// An IPv4 network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Cidr {
    base: u32,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Create a range from a base address and prefix length.
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Result<Self, EdgepassError> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(EdgepassError::InvalidCidr {
                cidr: format!("{}/{}", base, prefix_len),
                reason: format!("prefix length must be at most {}", MAX_PREFIX_LEN),
            });
        }
        Ok(Self {
            base: u32::from(base),
            prefix_len,
        })
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Base address as configured (host bits are kept, not zeroed).
    pub fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    /// Network mask with the top `prefix_len` bits set.
    pub fn mask(&self) -> u32 {
        prefix_mask(self.prefix_len)
    }

    /// Whether `ip` falls inside this range.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = self.mask();
        (u32::from(ip) & mask) == (self.base & mask)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = EdgepassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EdgepassError::InvalidCidr {
            cidr: s.to_string(),
            reason: reason.to_string(),
        };

        let (base, prefix) = match s.trim().split_once('/') {
            Some((base, prefix)) => (base, Some(prefix)),
            None => (s.trim(), None),
        };

        if base.contains(':') {
            return Err(invalid("IPv6 ranges are not supported"));
        }

        let base: Ipv4Addr = base
            .parse()
            .map_err(|_| invalid("base is not a dotted-quad IPv4 address"))?;

        let prefix_len = match prefix {
            None => MAX_PREFIX_LEN,
            Some(p) => p
                .parse::<u8>()
                .map_err(|_| invalid("prefix length is not an integer"))?,
        };

        if prefix_len > MAX_PREFIX_LEN {
            return Err(invalid("prefix length must be at most 32"));
        }

        Ok(Self {
            base: u32::from(base),
            prefix_len,
        })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.prefix_len)
    }
}

/// Mask with the top `prefix_len` bits set; zero for a /0.
pub fn prefix_mask(prefix_len: u8) -> u32 {
    u32::MAX
        .checked_shl(u32::from(MAX_PREFIX_LEN.saturating_sub(prefix_len)))
        .unwrap_or(0)
}

/// Parse a client address for matching.
///
/// Colon-form input is IPv6 and yields `UnsupportedAddressFamily`; anything
/// else that is not four octets in `0..=255` yields `AddressParse`.
pub fn parse_client_address(ip: &str) -> Result<Ipv4Addr, EdgepassError> {
    let ip = ip.trim();
    if ip.contains(':') {
        return Err(EdgepassError::UnsupportedAddressFamily(ip.to_string()));
    }
    ip.parse::<Ipv4Addr>()
        .map_err(|_| EdgepassError::AddressParse(ip.to_string()))
}

/// Check a client address against ranges, surfacing parse failures.
///
/// `Ok(true)` iff the address lies inside at least one range.
pub fn check(ip: &str, ranges: &[Ipv4Cidr]) -> Result<bool, EdgepassError> {
    let addr = parse_client_address(ip)?;
    Ok(ranges.iter().any(|range| range.contains(addr)))
}

/// Allow-list membership: true iff `ip` is inside any range.
///
/// Malformed and IPv6 addresses never match.
pub fn matches(ip: &str, ranges: &[Ipv4Cidr]) -> bool {
    match check(ip, ranges) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::debug!(error = %e, "client address treated as non-match");
            false
        }
    }
}

/// Match a single address against a single unparsed range string.
///
/// A malformed range is a non-match.
pub fn ip_in_cidr(ip: &str, cidr: &str) -> bool {
    match cidr.parse::<Ipv4Cidr>() {
        Ok(range) => matches(ip, std::slice::from_ref(&range)),
        Err(e) => {
            tracing::debug!(error = %e, "range treated as non-match");
            false
        }
    }
}
