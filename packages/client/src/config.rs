//! Registry endpoint configuration.
//!
//! Endpoint paths are embedded from `endpoints.toml` at compile time. The
//! base URL and tokens are supplied by the caller; the CLI reads them from
//! the environment variables named here.

use serde::Deserialize;

use crate::ClientError;

/// Environment variable holding the registry base URL.
pub const BASE_URL_ENV: &str = "ASSET_REGISTRY_BASE_URL";
/// Environment variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "ASSET_REGISTRY_ACCESS_TOKEN";
/// Environment variable holding the refresh token.
pub const REFRESH_TOKEN_ENV: &str = "ASSET_REGISTRY_REFRESH_TOKEN";

const ENDPOINTS_TOML: &str = include_str!("../endpoints.toml");

/// A registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Fields containing a point.
    PointLookup,
    /// Fields inside a rectangle.
    RectangleLookup,
    /// Fields overlapping a geometry.
    OverlapLookup,
    /// Field registration.
    RegisterField,
    /// Percentage overlap of two geometries.
    PercentageOverlap,
    /// Session logout.
    Logout,
}

impl Endpoint {
    /// HTTP method used for this endpoint.
    #[must_use]
    pub fn method(self) -> reqwest::Method {
        match self {
            Self::PointLookup | Self::RectangleLookup | Self::Logout => reqwest::Method::GET,
            Self::OverlapLookup | Self::RegisterField | Self::PercentageOverlap => {
                reqwest::Method::POST
            }
        }
    }
}

/// Paths of the registry operations, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Point lookup path.
    pub point_lookup: String,
    /// Rectangle lookup path.
    pub rectangle_lookup: String,
    /// Overlap lookup path.
    pub overlap_lookup: String,
    /// Field registration path.
    pub register_field: String,
    /// Percentage overlap path.
    pub percentage_overlap: String,
    /// Logout path.
    pub logout: String,
}

impl EndpointConfig {
    /// Parses the embedded `endpoints.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ClientError> {
        toml::de::from_str(ENDPOINTS_TOML).map_err(|e| ClientError::Config {
            message: format!("Failed to parse endpoints.toml: {e}"),
        })
    }

    /// Path for an endpoint.
    #[must_use]
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::PointLookup => &self.point_lookup,
            Endpoint::RectangleLookup => &self.rectangle_lookup,
            Endpoint::OverlapLookup => &self.overlap_lookup,
            Endpoint::RegisterField => &self.register_field,
            Endpoint::PercentageOverlap => &self.percentage_overlap,
            Endpoint::Logout => &self.logout,
        }
    }
}

/// Everything needed to reach a registry instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Endpoint paths.
    pub endpoints: EndpointConfig,
}

impl ClientConfig {
    /// Builds a config for `base_url` with the embedded endpoint paths.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `base_url` is empty or the
    /// embedded endpoints are malformed.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::Config {
                message: format!("Registry base URL is empty (set {BASE_URL_ENV})"),
            });
        }

        Ok(Self {
            base_url: base_url.to_string(),
            endpoints: EndpointConfig::embedded()?,
        })
    }

    /// Full URL of an endpoint.
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, self.endpoints.path(endpoint))
    }
}
