//! `reqwest` implementation of [`RegistryBackend`].
//!
//! Lookups are `GET` requests with query parameters; registration and
//! overlap are `POST` requests with JSON bodies. Non-2xx answers become
//! [`ClientError::Status`] carrying the registry's own message when it
//! sends one.

use std::sync::Arc;

use asset_registry_client_models::{
    FieldQueryResponse, OverlapLookup, PercentageOverlap, PointLookup, RectangleLookup,
    RegisterField,
};
use reqwest::RequestBuilder;
use serde_json::Value;

use crate::config::{ClientConfig, Endpoint};
use crate::signing::RequestSigner;
use crate::{ClientError, RegistryBackend};

/// Keys checked, in order, for a human-readable error in a failure body.
const ERROR_MESSAGE_KEYS: &[&str] = &["message", "msg", "error", "detail"];

/// Registry backend over HTTP.
pub struct HttpRegistryBackend {
    client: reqwest::Client,
    config: ClientConfig,
    signer: Arc<dyn RequestSigner>,
}

impl HttpRegistryBackend {
    #[must_use]
    pub fn new(client: reqwest::Client, config: ClientConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            client,
            config,
            signer,
        }
    }

    /// A signed request builder for `endpoint`, before any payload.
    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let builder = self
            .client
            .request(endpoint.method(), self.config.url(endpoint));
        self.signer.sign(endpoint, builder)
    }

    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<Value, ClientError> {
        log::debug!("Sending {endpoint:?} request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));
            log::warn!("{endpoint:?} failed with {status}: {message}");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn lookup(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> Result<FieldQueryResponse, ClientError> {
        let body = self.send(endpoint, builder).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait::async_trait]
impl RegistryBackend for HttpRegistryBackend {
    async fn point_lookup(&self, request: &PointLookup) -> Result<FieldQueryResponse, ClientError> {
        let endpoint = Endpoint::PointLookup;
        self.lookup(endpoint, self.request(endpoint).query(request))
            .await
    }

    async fn rectangle_lookup(
        &self,
        request: &RectangleLookup,
    ) -> Result<FieldQueryResponse, ClientError> {
        let endpoint = Endpoint::RectangleLookup;
        self.lookup(endpoint, self.request(endpoint).query(request))
            .await
    }

    async fn overlap_lookup(
        &self,
        request: &OverlapLookup,
    ) -> Result<FieldQueryResponse, ClientError> {
        let endpoint = Endpoint::OverlapLookup;
        self.lookup(endpoint, self.request(endpoint).json(request))
            .await
    }

    async fn register_field(&self, request: &RegisterField) -> Result<Value, ClientError> {
        let endpoint = Endpoint::RegisterField;
        self.send(endpoint, self.request(endpoint).json(request))
            .await
    }

    async fn percentage_overlap(
        &self,
        request: &PercentageOverlap,
    ) -> Result<Value, ClientError> {
        let endpoint = Endpoint::PercentageOverlap;
        self.send(endpoint, self.request(endpoint).json(request))
            .await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let endpoint = Endpoint::Logout;
        self.send(endpoint, self.request(endpoint)).await?;
        Ok(())
    }
}

/// Extracts the registry's error message from a failure body, if any.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ERROR_MESSAGE_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use asset_registry_client_models::QueryParameters;
    use reqwest::header::AUTHORIZATION;

    use super::*;
    use crate::signing::BearerTokens;

    fn backend() -> HttpRegistryBackend {
        HttpRegistryBackend::new(
            reqwest::Client::new(),
            ClientConfig::new("http://registry.test").unwrap(),
            Arc::new(BearerTokens::new(
                Some("access".to_string()),
                Some("refresh".to_string()),
            )),
        )
    }

    #[test]
    fn point_lookup_sends_query_parameters() {
        let backend = backend();
        let request = PointLookup::new(41.5, -87.25, &QueryParameters::default());
        let built = backend
            .request(Endpoint::PointLookup)
            .query(&request)
            .build()
            .unwrap();

        assert_eq!(built.method(), reqwest::Method::GET);
        assert_eq!(built.url().path(), "/fetch-fields-for-a-point");
        assert_eq!(
            built.url().query(),
            Some("lat=41.5&long=-87.25&s2_index=8%2C13&domain=")
        );
        assert_eq!(
            built.headers().get(AUTHORIZATION).unwrap(),
            "Bearer access"
        );
    }

    #[test]
    fn registration_posts_json_body() {
        let backend = backend();
        let request = RegisterField::new(
            "POLYGON((0 0, 1 0, 1 1, 0 0))".to_string(),
            &QueryParameters::default(),
        );
        let built = backend
            .request(Endpoint::RegisterField)
            .json(&request)
            .build()
            .unwrap();

        assert_eq!(built.method(), reqwest::Method::POST);
        let body: Value =
            serde_json::from_slice(built.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["wkt"], "POLYGON((0 0, 1 0, 1 1, 0 0))");
        assert_eq!(body["s2_index"], "8,13");
    }

    #[test]
    fn logout_request_uses_refresh_token() {
        let built = backend().request(Endpoint::Logout).build().unwrap();
        assert_eq!(
            built.headers().get(AUTHORIZATION).unwrap(),
            "Bearer refresh"
        );
    }

    #[test]
    fn extracts_registry_error_message() {
        assert_eq!(
            error_message(r#"{"message": "Invalid WKT"}"#).as_deref(),
            Some("Invalid WKT")
        );
        assert_eq!(
            error_message(r#"{"msg": "Token has expired"}"#).as_deref(),
            Some("Token has expired")
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"code": 3}"#), None);
    }
}
