#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the asset registry field API.
//!
//! The map workflow talks to the registry through the [`RegistryBackend`]
//! trait. [`http::HttpRegistryBackend`] is the production implementation,
//! built on `reqwest`, with endpoint paths loaded from the embedded
//! `endpoints.toml` ([`config`]) and credentials attached by a
//! [`signing::RequestSigner`].

pub mod config;
pub mod http;
pub mod signing;

use asset_registry_client_models::{
    FieldQueryResponse, OverlapLookup, PercentageOverlap, PointLookup, RectangleLookup,
    RegisterField,
};
use serde_json::Value;
use thiserror::Error;

/// Errors from talking to the registry.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the registry, or `HTTP <status>`.
        message: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client misconfiguration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// The registry operations the field map needs.
///
/// One method per backend endpoint. Implementations must not retry; the
/// user re-triggers failed actions.
#[async_trait::async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Fields containing a point.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn point_lookup(&self, request: &PointLookup) -> Result<FieldQueryResponse, ClientError>;

    /// Fields inside a rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn rectangle_lookup(
        &self,
        request: &RectangleLookup,
    ) -> Result<FieldQueryResponse, ClientError>;

    /// Fields overlapping a geometry above a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn overlap_lookup(
        &self,
        request: &OverlapLookup,
    ) -> Result<FieldQueryResponse, ClientError>;

    /// Registers a field boundary. Returns the raw response body, which the
    /// caller classifies.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn register_field(&self, request: &RegisterField) -> Result<Value, ClientError>;

    /// Percentage overlap between two geometries. The body is opaque.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn percentage_overlap(&self, request: &PercentageOverlap)
    -> Result<Value, ClientError>;

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn logout(&self) -> Result<(), ClientError>;
}
