//! Credential attachment for registry requests.
//!
//! Token issuance and refresh are owned elsewhere; a signer only decides
//! which credential goes on which request.

use reqwest::RequestBuilder;

use crate::config::Endpoint;

/// Attaches credentials to outgoing requests.
pub trait RequestSigner: Send + Sync {
    /// Returns `request` with whatever credentials `endpoint` needs.
    fn sign(&self, endpoint: Endpoint, request: RequestBuilder) -> RequestBuilder;
}

/// Bearer token signer.
///
/// Logout carries the refresh token, everything else carries the access
/// token.
#[derive(Debug, Clone, Default)]
pub struct BearerTokens {
    access: Option<String>,
    refresh: Option<String>,
}

impl BearerTokens {
    #[must_use]
    pub const fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self { access, refresh }
    }

    fn token_for(&self, endpoint: Endpoint) -> Option<&str> {
        match endpoint {
            Endpoint::Logout => self.refresh.as_deref(),
            _ => self.access.as_deref(),
        }
    }
}

impl RequestSigner for BearerTokens {
    fn sign(&self, endpoint: Endpoint, request: RequestBuilder) -> RequestBuilder {
        match self.token_for(endpoint) {
            Some(token) => request.bearer_auth(token),
            None => {
                log::debug!("No token for {endpoint:?}, sending unsigned");
                request
            }
        }
    }
}
