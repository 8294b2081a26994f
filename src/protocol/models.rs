//! Invocation payloads and the dispatch decision between them.
//!
//! Two shapes arrive at the handler:
//! - the CDN's own event envelope, `{"Records": [{"cf": {config, request, response}}]}`
//! - a plain request object with a `headers` map and arbitrary other fields
//!
//! Fields the handler does not read are kept in `extra` maps so that the
//! returned object differs from the input only by the pass header.

use crate::EdgepassError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single header entry in the edge event format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfHeader {
    /// Header name as sent on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Header value.
    pub value: String,
}

/// Edge headers keyed by lowercase name.
pub type CfHeaders = BTreeMap<String, Vec<CfHeader>>;

/// Delivery metadata attached by the CDN itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfConfig {
    /// Per-request identifier generated by the CDN.
    pub request_id: String,

    /// Everything else (distribution id, event type, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The viewer request inside an edge event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRequest {
    /// Address of the connecting client.
    pub client_ip: String,

    /// Request headers.
    #[serde(default)]
    pub headers: CfHeaders,

    /// Method, uri, querystring, origin, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfRequest {
    /// First value of the `user-agent` header, or empty.
    pub fn user_agent(&self) -> &str {
        self.headers
            .get("user-agent")
            .and_then(|values| values.first())
            .map(|h| h.value.as_str())
            .unwrap_or("")
    }
}

/// The response inside an edge event (or one produced by the handler).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfResponse {
    /// HTTP status as a string, e.g. `"200"`.
    pub status: String,

    /// Reason phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,

    /// Response headers.
    #[serde(default)]
    pub headers: CfHeaders,

    /// Response body, when the handler generates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Unread fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfResponse {
    /// Set `name` to a single entry, replacing any previous values.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.insert(
            name.to_ascii_lowercase(),
            vec![CfHeader {
                key: Some(name.to_string()),
                value,
            }],
        );
    }

    /// First value of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(|h| h.value.as_str())
    }
}

/// The `cf` payload of an edge event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInvocation {
    /// Delivery metadata.
    pub config: CfConfig,

    /// Viewer request.
    pub request: CfRequest,

    /// Response, present for response-phase triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CfResponse>,
}

/// A plain request object seen on the regional path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalRequest {
    /// Request headers, name to value.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: Map<String, Value>,

    /// Every other field, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegionalRequest {
    /// User agent under `user-agent`, then `User-Agent`, else empty.
    pub fn user_agent(&self) -> &str {
        ["user-agent", "User-Agent"]
            .iter()
            .filter_map(|name| self.headers.get(*name))
            .filter_map(Value::as_str)
            .find(|ua| !ua.is_empty())
            .unwrap_or("")
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers
            .insert(name.to_string(), Value::String(value));
    }

    /// String value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(Value::as_str)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which path an invocation takes, decided once from its shape.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Delivered by the CDN's own event mechanism.
    Edge(Box<EdgeInvocation>),

    /// Plain request without delivery metadata.
    Regional(RegionalRequest),
}

impl Invocation {
    /// Classify and decode a raw event.
    ///
    /// The marker is `Records[0].cf`; when present the event must decode as an
    /// edge invocation, otherwise the object is treated as a regional request.
    pub fn from_value(event: Value) -> Result<Self, EdgepassError> {
        if let Some(cf) = event
            .get("Records")
            .and_then(|records| records.get(0))
            .and_then(|record| record.get("cf"))
        {
            let edge: EdgeInvocation = serde_json::from_value(cf.clone()).map_err(|e| {
                EdgepassError::ProtocolError(format!("Malformed edge event: {}", e))
            })?;
            return Ok(Self::Edge(Box::new(edge)));
        }

        if !event.is_object() {
            return Err(EdgepassError::ProtocolError(
                "event is not a JSON object".to_string(),
            ));
        }

        let request: RegionalRequest = serde_json::from_value(event).map_err(|e| {
            EdgepassError::ProtocolError(format!("Malformed request event: {}", e))
        })?;
        Ok(Self::Regional(request))
    }

    /// Whether this came through the edge delivery path.
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::Edge(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge_event() -> Value {
        json!({
            "Records": [{
                "cf": {
                    "config": {
                        "distributionId": "EDFDVBD6EXAMPLE",
                        "eventType": "origin-response",
                        "requestId": "req-123"
                    },
                    "request": {
                        "clientIp": "203.0.113.7",
                        "method": "GET",
                        "uri": "/index.html",
                        "headers": {
                            "user-agent": [{"key": "User-Agent", "value": "test-agent"}]
                        }
                    },
                    "response": {
                        "status": "200",
                        "statusDescription": "OK",
                        "headers": {}
                    }
                }
            }]
        })
    }

    #[test]
    fn test_edge_marker_selects_edge() {
        let invocation = Invocation::from_value(edge_event()).unwrap();
        let Invocation::Edge(edge) = invocation else {
            panic!("expected edge invocation");
        };
        assert_eq!(edge.config.request_id, "req-123");
        assert_eq!(edge.request.client_ip, "203.0.113.7");
        assert_eq!(edge.request.user_agent(), "test-agent");
        assert_eq!(edge.response.unwrap().status, "200");
    }

    #[test]
    fn test_edge_extra_fields_preserved() {
        let Invocation::Edge(edge) = Invocation::from_value(edge_event()).unwrap() else {
            panic!("expected edge invocation");
        };
        assert_eq!(edge.config.extra["eventType"], "origin-response");
        assert_eq!(edge.request.extra["uri"], "/index.html");
    }

    #[test]
    fn test_plain_object_selects_regional() {
        let invocation = Invocation::from_value(json!({
            "headers": {"User-Agent": "curl/8.0"},
            "path": "/"
        }))
        .unwrap();
        assert!(!invocation.is_edge());
        let Invocation::Regional(request) = invocation else {
            panic!("expected regional request");
        };
        assert_eq!(request.user_agent(), "curl/8.0");
        assert_eq!(request.extra["path"], "/");
    }

    #[test]
    fn test_empty_records_is_regional() {
        let invocation = Invocation::from_value(json!({"Records": []})).unwrap();
        assert!(!invocation.is_edge());
    }

    #[test]
    fn test_malformed_edge_event_is_protocol_error() {
        let result = Invocation::from_value(json!({
            "Records": [{"cf": {"config": {}, "request": {}}}]
        }));
        assert!(matches!(result, Err(EdgepassError::ProtocolError(_))));
    }

    #[test]
    fn test_non_object_is_protocol_error() {
        let result = Invocation::from_value(json!("hello"));
        assert!(matches!(result, Err(EdgepassError::ProtocolError(_))));
    }

    #[test]
    fn test_edge_user_agent_missing_is_empty() {
        let request: CfRequest =
            serde_json::from_value(json!({"clientIp": "203.0.113.7"})).unwrap();
        assert_eq!(request.user_agent(), "");
    }

    #[test]
    fn test_regional_user_agent_lookup_order() {
        let lower: RegionalRequest = serde_json::from_value(json!({
            "headers": {"user-agent": "lower", "User-Agent": "canonical"}
        }))
        .unwrap();
        assert_eq!(lower.user_agent(), "lower");

        let empty_lower: RegionalRequest = serde_json::from_value(json!({
            "headers": {"user-agent": "", "User-Agent": "canonical"}
        }))
        .unwrap();
        assert_eq!(empty_lower.user_agent(), "canonical");

        let none = RegionalRequest::default();
        assert_eq!(none.user_agent(), "");
    }

    #[test]
    fn test_regional_null_headers_is_empty() {
        let request: RegionalRequest =
            serde_json::from_value(json!({"headers": null, "body": "x"})).unwrap();
        assert!(request.headers.is_empty());
        assert_eq!(request.extra["body"], "x");
    }

    #[test]
    fn test_response_set_header_replaces() {
        let mut response = CfResponse::default();
        response.set_header("x-aws-pass", "one".to_string());
        response.set_header("x-aws-pass", "two".to_string());
        assert_eq!(response.headers["x-aws-pass"].len(), 1);
        assert_eq!(response.header("x-aws-pass"), Some("two"));
    }
}
