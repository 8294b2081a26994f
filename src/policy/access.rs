//! Edge gate: the client address must sit inside the allowlist.
//!
//! This is the only deny outcome in the crate. A rejection is a normal
//! result (a 403 response), not an error.

use crate::net::allowlist::Allowlist;
use crate::protocol::models::CfResponse;

/// Status for a rejected edge request.
pub const REJECT_STATUS: &str = "403";

/// Reason phrase for a rejected edge request.
pub const REJECT_DESCRIPTION: &str = "Forbidden - Not CloudFront";

/// Body for a rejected edge request.
pub const REJECT_BODY: &str = "Forbidden";

/// Outcome of the edge gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Address is inside at least one range.
    Allowed,

    /// Address is outside every range, malformed, or of an unsupported family.
    Denied {
        /// Why the address was refused.
        reason: String,
    },
}

impl GateDecision {
    /// Whether signing may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Run the gate for `client_ip`.
pub fn check_client(client_ip: &str, allowlist: &Allowlist) -> GateDecision {
    match allowlist.check(client_ip) {
        Ok(true) => GateDecision::Allowed,
        Ok(false) => GateDecision::Denied {
            reason: "address outside every allowed range".to_string(),
        },
        Err(e) => GateDecision::Denied {
            reason: e.to_string(),
        },
    }
}

/// Turn `response` (or a fresh one) into the fixed 403 rejection.
///
/// Existing headers are kept; no pass header is added.
pub fn reject(response: Option<CfResponse>) -> CfResponse {
    let mut response = response.unwrap_or_default();
    response.status = REJECT_STATUS.to_string();
    response.status_description = Some(REJECT_DESCRIPTION.to_string());
    response.body = Some(REJECT_BODY.to_string());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> Allowlist {
        Allowlist::parse(["203.0.113.0/24"]).unwrap()
    }

    #[test]
    fn test_check_client_allowed() {
        assert_eq!(check_client("203.0.113.7", &allowlist()), GateDecision::Allowed);
    }

    #[test]
    fn test_check_client_outside() {
        let decision = check_client("198.51.100.7", &allowlist());
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_check_client_malformed_is_denied() {
        let decision = check_client("203.0.113", &allowlist());
        assert!(matches!(decision, GateDecision::Denied { reason } if reason.contains("Malformed")));
    }

    #[test]
    fn test_check_client_ipv6_is_denied() {
        let decision = check_client("2001:db8::7", &allowlist());
        assert!(
            matches!(decision, GateDecision::Denied { reason } if reason.contains("Unsupported"))
        );
    }

    #[test]
    fn test_check_client_empty_allowlist_denies() {
        let decision = check_client("203.0.113.7", &Allowlist::default());
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_reject_creates_response() {
        let response = reject(None);
        assert_eq!(response.status, "403");
        assert_eq!(
            response.status_description.as_deref(),
            Some("Forbidden - Not CloudFront")
        );
        assert_eq!(response.body.as_deref(), Some("Forbidden"));
    }

    #[test]
    fn test_reject_keeps_existing_headers() {
        let mut existing = CfResponse {
            status: "200".to_string(),
            ..Default::default()
        };
        existing.set_header("cache-control", "no-store".to_string());

        let response = reject(Some(existing));
        assert_eq!(response.status, "403");
        assert_eq!(response.header("cache-control"), Some("no-store"));
    }
}
