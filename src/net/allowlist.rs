//! The configured set of edge address ranges.

use crate::net::cidr::{self, Ipv4Cidr};
use crate::EdgepassError;

/// Immutable set of ranges a client address must fall inside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    ranges: Vec<Ipv4Cidr>,
}

impl Allowlist {
    /// Build an allowlist from already-parsed ranges.
    pub fn new(ranges: Vec<Ipv4Cidr>) -> Self {
        Self { ranges }
    }

    /// Parse every entry, failing on the first malformed one.
    pub fn parse<I, S>(entries: I) -> Result<Self, EdgepassError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = entries
            .into_iter()
            .map(|entry| entry.as_ref().parse::<Ipv4Cidr>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Parse a JSON array of CIDR strings, e.g. `["1.2.3.0/24"]`.
    pub fn from_json(json: &str) -> Result<Self, EdgepassError> {
        let entries: Vec<String> = serde_json::from_str(json).map_err(|e| {
            EdgepassError::ConfigError(format!("CIDR list is not a JSON array of strings: {}", e))
        })?;
        Self::parse(entries)
    }

    /// Configured ranges.
    pub fn ranges(&self) -> &[Ipv4Cidr] {
        &self.ranges
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no ranges are configured.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Membership with the failure reason kept for callers that log it.
    pub fn check(&self, ip: &str) -> Result<bool, EdgepassError> {
        cidr::check(ip, &self.ranges)
    }

    /// Membership; malformed and IPv6 addresses never match.
    pub fn permits(&self, ip: &str) -> bool {
        cidr::matches(ip, &self.ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_valid() {
        let list = Allowlist::from_json(r#"["203.0.113.0/24", "10.0.0.1"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.ranges()[1].prefix_len(), 32);
    }

    #[test]
    fn test_from_json_empty_array() {
        let list = Allowlist::from_json("[]").unwrap();
        assert!(list.is_empty());
        assert!(!list.permits("203.0.113.7"));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = Allowlist::from_json("203.0.113.0/24");
        assert!(matches!(result, Err(EdgepassError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_wrong_element_type() {
        let result = Allowlist::from_json("[1, 2]");
        assert!(matches!(result, Err(EdgepassError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_fails_closed_on_bad_entry() {
        let result = Allowlist::from_json(r#"["203.0.113.0/24", "10.0.0.0/64"]"#);
        assert!(
            matches!(result, Err(EdgepassError::InvalidCidr { cidr, .. }) if cidr == "10.0.0.0/64")
        );
    }

    #[test]
    fn test_permits_any_range() {
        let list = Allowlist::parse(["10.0.0.0/8", "203.0.113.0/24"]).unwrap();
        assert!(list.permits("203.0.113.7"));
        assert!(list.permits("10.9.8.7"));
        assert!(!list.permits("198.51.100.7"));
    }

    #[test]
    fn test_check_surfaces_ipv6() {
        let list = Allowlist::parse(["0.0.0.0/0"]).unwrap();
        assert!(matches!(
            list.check("::1"),
            Err(EdgepassError::UnsupportedAddressFamily(_))
        ));
        assert!(!list.permits("::1"));
    }
}
