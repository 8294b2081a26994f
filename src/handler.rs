//! Edgepass handler - the single entry point for invocations.
//!
//! Flow per invocation:
//! - Edge-integrated: gate the client address against the allowlist, then sign
//!   with the CDN request id as nonce and attach the token to the response.
//! - Regional: no gate, sign with a random nonce and attach the token to the
//!   outgoing request.
//!
//! The regional path has no trusted transport to gate on. It signs
//! unconditionally and leaves the decision to the origin-side verifier.

use crate::clock::{Clock, SystemClock};
use crate::config::EdgepassConfig;
use crate::crypto::nonce::{NonceSource, OsNonceSource};
use crate::crypto::token::{SignedToken, TokenSigner, PASS_HEADER};
use crate::policy::access::{check_client, reject, GateDecision, REJECT_STATUS};
use crate::protocol::models::{CfResponse, EdgeInvocation, Invocation, RegionalRequest};
use crate::EdgepassError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// What the handler hands back to the execution environment.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HandlerOutput {
    /// Edge mode: the response, signed or rejected.
    Response(CfResponse),

    /// Regional mode: the request with the pass header added.
    Request(RegionalRequest),
}

impl HandlerOutput {
    /// Whether this is the edge gate's 403.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Response(response) => {
                response.status == REJECT_STATUS && response.header(PASS_HEADER).is_none()
            }
            Self::Request(_) => false,
        }
    }

    /// The attached pass header value, if any.
    pub fn pass_header(&self) -> Option<&str> {
        match self {
            Self::Response(response) => response.header(PASS_HEADER),
            Self::Request(request) => request.header(PASS_HEADER),
        }
    }

    /// The attached token, parsed.
    pub fn token(&self) -> Option<SignedToken> {
        self.pass_header().and_then(|value| value.parse().ok())
    }
}

/// Issues origin pass tokens.
///
/// Create one per process and share it; it holds only immutable state.
pub struct Edgepass {
    config: EdgepassConfig,
    signer: TokenSigner,
    nonces: Arc<dyn NonceSource>,
}

impl Edgepass {
    /// Create a handler using the system clock and the OS random source.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails.
    pub fn new(config: EdgepassConfig) -> Result<Self, EdgepassError> {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(OsNonceSource))
    }

    /// Create a handler with explicit time and nonce sources.
    pub fn with_sources(
        config: EdgepassConfig,
        clock: Arc<dyn Clock>,
        nonces: Arc<dyn NonceSource>,
    ) -> Result<Self, EdgepassError> {
        config.validate()?;
        let signer = TokenSigner::new(config.secret.clone(), clock);

        Ok(Self {
            config,
            signer,
            nonces,
        })
    }

    /// Decode a raw event, handle it, and encode the result.
    pub fn handle_value(&self, event: Value) -> Result<Value, EdgepassError> {
        let output = self.handle(Invocation::from_value(event)?)?;
        serde_json::to_value(&output)
            .map_err(|e| EdgepassError::ProtocolError(format!("Encode error: {}", e)))
    }

    /// Handle one invocation.
    ///
    /// # Errors
    /// - `ProtocolError` - Edge event passed the gate but carries no response
    /// - `NonceUnavailable` - Random source failed on the regional path
    /// - `MissingSecret` - Secret is empty (never signs with an empty key)
    pub fn handle(&self, invocation: Invocation) -> Result<HandlerOutput, EdgepassError> {
        match invocation {
            Invocation::Edge(edge) => {
                tracing::debug!(request_id = %edge.config.request_id, "edge-integrated invocation");
                self.handle_edge(*edge).map(HandlerOutput::Response)
            }
            Invocation::Regional(request) => {
                tracing::debug!("regional invocation");
                self.handle_regional(request).map(HandlerOutput::Request)
            }
        }
    }

    fn handle_edge(&self, edge: EdgeInvocation) -> Result<CfResponse, EdgepassError> {
        let EdgeInvocation {
            config,
            request,
            response,
        } = edge;

        if let GateDecision::Denied { reason } =
            check_client(&request.client_ip, &self.config.allowlist)
        {
            tracing::warn!(
                client_ip = %request.client_ip,
                request_id = %config.request_id,
                reason = %reason,
                "edge request rejected"
            );
            return Ok(reject(response));
        }

        let mut response = response.ok_or_else(|| {
            EdgepassError::ProtocolError(
                "edge event has no response to attach the pass token to".to_string(),
            )
        })?;

        let token = self.signer.sign(request.user_agent(), &config.request_id)?;
        response.set_header(PASS_HEADER, token.header_value());
        Ok(response)
    }

    fn handle_regional(
        &self,
        mut request: RegionalRequest,
    ) -> Result<RegionalRequest, EdgepassError> {
        let nonce = self.nonces.nonce()?;
        let token = self.signer.sign(request.user_agent(), &nonce)?;
        request.set_header(PASS_HEADER, token.header_value());
        Ok(request)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &EdgepassConfig {
        &self.config
    }
}
