#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the asset registry field API.
//!
//! These types are the wire contract between the map workflow and the
//! registry backend. They are kept separate from the HTTP client so the
//! workflow can be driven by any transport.

use std::fmt;
use std::str::FromStr;

use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Key holding the geometry of an already registered field.
pub const GEO_JSON_KEY: &str = "Geo JSON";
/// Key holding the registered half of a partial-overlap registration.
pub const GEO_JSON_REGISTERED_KEY: &str = "Geo JSON registered";
/// Key holding the requested half of a partial-overlap registration.
pub const GEO_JSON_REQUESTED_KEY: &str = "Geo JSON requested";

/// Errors from parsing user-entered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// Not a whole number.
    #[error("Invalid {name}: '{value}' is not a whole number")]
    NotANumber {
        /// Parameter name.
        name: &'static str,
        /// Raw input.
        value: String,
    },

    /// Threshold outside 0-100.
    #[error("Invalid threshold {value}: expected 0-100")]
    ThresholdRange {
        /// Parsed value.
        value: u32,
    },

    /// Spatial index levels not in `min,max` form.
    #[error("Invalid spatial index levels '{value}': expected 'min,max'")]
    SpatialIndexLevels {
        /// Raw input.
        value: String,
    },
}

/// Min/max levels for the registry's hierarchical (S2) spatial index.
///
/// Travels on the wire as `"min,max"`, with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpatialIndexLevels {
    /// Coarsest index level.
    pub min: u8,
    /// Finest index level.
    pub max: u8,
}

impl Default for SpatialIndexLevels {
    fn default() -> Self {
        Self { min: 8, max: 13 }
    }
}

impl fmt::Display for SpatialIndexLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

impl FromStr for SpatialIndexLevels {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParameterError::SpatialIndexLevels {
            value: s.to_string(),
        };
        let (min, max) = s.split_once(',').ok_or_else(err)?;
        let min = min.trim().parse::<u8>().map_err(|_| err())?;
        let max = max.trim().parse::<u8>().map_err(|_| err())?;
        if min > max {
            return Err(err());
        }
        Ok(Self { min, max })
    }
}

impl TryFrom<String> for SpatialIndexLevels {
    type Error = ParameterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpatialIndexLevels> for String {
    fn from(value: SpatialIndexLevels) -> Self {
        value.to_string()
    }
}

/// Parameters the user can tweak in the field action popup.
///
/// A fresh [`QueryParameters::default()`] is used every time a popup opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    /// Resolution level for the registry's field matching.
    pub resolution_level: u32,
    /// Minimum percentage overlap (0-100) for a candidate to match.
    pub threshold: u8,
    /// Optional domain filter; empty means unfiltered.
    pub domain: String,
    /// Spatial index level bounds.
    pub spatial_index_levels: SpatialIndexLevels,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            resolution_level: 13,
            threshold: 90,
            domain: String::new(),
            spatial_index_levels: SpatialIndexLevels::default(),
        }
    }
}

impl QueryParameters {
    /// Parses a resolution level typed by the user.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::NotANumber`] if the input is not a
    /// non-negative integer.
    pub fn parse_resolution_level(input: &str) -> Result<u32, ParameterError> {
        input
            .trim()
            .parse()
            .map_err(|_| ParameterError::NotANumber {
                name: "resolution level",
                value: input.to_string(),
            })
    }

    /// Parses a threshold typed by the user.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] if the input is not an integer in 0-100.
    pub fn parse_threshold(input: &str) -> Result<u8, ParameterError> {
        let value: u32 = input
            .trim()
            .parse()
            .map_err(|_| ParameterError::NotANumber {
                name: "threshold",
                value: input.to_string(),
            })?;
        if value > 100 {
            return Err(ParameterError::ThresholdRange { value });
        }
        u8::try_from(value).map_err(|_| ParameterError::ThresholdRange { value })
    }
}

/// Point lookup: fields containing a single coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointLookup {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    #[serde(rename = "long")]
    pub lng: f64,
    /// Spatial index levels as `"min,max"`.
    pub s2_index: SpatialIndexLevels,
    /// Domain filter.
    pub domain: String,
}

impl PointLookup {
    #[must_use]
    pub fn new(lat: f64, lng: f64, params: &QueryParameters) -> Self {
        Self {
            lat,
            lng,
            s2_index: params.spatial_index_levels,
            domain: params.domain.clone(),
        }
    }
}

/// Rectangle lookup: fields inside a box given as raw coordinate lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RectangleLookup {
    /// Space-separated corner latitudes.
    pub latitudes: String,
    /// Space-separated corner longitudes.
    pub longitudes: String,
}

/// Overlap lookup: fields overlapping a WKT geometry above a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapLookup {
    /// Query geometry.
    pub wkt: String,
    /// Resolution level.
    pub resolution_level: u32,
    /// Minimum overlap percentage.
    pub threshold: u8,
    /// Domain filter.
    pub domain: String,
    /// Spatial index levels as `"min,max"`.
    pub s2_index: SpatialIndexLevels,
}

impl OverlapLookup {
    #[must_use]
    pub fn new(wkt: String, params: &QueryParameters) -> Self {
        Self {
            wkt,
            resolution_level: params.resolution_level,
            threshold: params.threshold,
            domain: params.domain.clone(),
            s2_index: params.spatial_index_levels,
        }
    }
}

/// Field registration request. Registration is never domain-filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterField {
    /// Field boundary.
    pub wkt: String,
    /// Resolution level.
    pub resolution_level: u32,
    /// Overlap threshold used to detect existing fields.
    pub threshold: u8,
    /// Spatial index levels as `"min,max"`.
    pub s2_index: SpatialIndexLevels,
}

impl RegisterField {
    #[must_use]
    pub fn new(wkt: String, params: &QueryParameters) -> Self {
        Self {
            wkt,
            resolution_level: params.resolution_level,
            threshold: params.threshold,
            s2_index: params.spatial_index_levels,
        }
    }
}

/// Percentage overlap between two geometries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PercentageOverlap {
    /// First geometry (WKT).
    pub wkt_1: String,
    /// Second geometry (WKT).
    pub wkt_2: String,
}

/// Response of the point, rectangle and overlap lookups.
///
/// `json` is the raw blob shown in the inspector; `data` is what gets drawn.
/// A lookup that matches no field answers with a null or missing `data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldQueryResponse {
    /// Raw payload for inspection.
    pub json: Value,
    /// Geometry to render, if any field matched.
    #[serde(default)]
    pub data: Option<GeoJson>,
}

/// Errors from interpreting a registry response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Registration response matched neither expected key set.
    #[error("Unexpected registration response (keys: {})", keys.join(", "))]
    MalformedRegistration {
        /// Top-level keys that were present.
        keys: Vec<String>,
    },

    /// A geometry value under a known key was not valid `GeoJSON`.
    #[error("Invalid GeoJSON under '{key}': {message}")]
    InvalidGeoJson {
        /// Response key holding the geometry.
        key: &'static str,
        /// Parser message.
        message: String,
    },
}

/// A classified registration response.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationResponse {
    /// The boundary is already registered in full.
    FullyRegistered(GeoJson),
    /// The boundary overlaps a registered field only partially.
    PartialOverlap {
        /// Geometry already in the registry.
        registered: GeoJson,
        /// Geometry that was requested.
        requested: GeoJson,
    },
}

impl RegistrationResponse {
    /// Classifies a raw registration response body.
    ///
    /// The checks run in order: a single [`GEO_JSON_KEY`] wins even if the
    /// registered/requested pair is also present. Null values count as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] if neither key set is present or a
    /// geometry fails to decode.
    pub fn classify(body: &Value) -> Result<Self, ResponseError> {
        if let Some(geometry) = present(body, GEO_JSON_KEY) {
            return Ok(Self::FullyRegistered(decode(GEO_JSON_KEY, geometry)?));
        }

        match (
            present(body, GEO_JSON_REGISTERED_KEY),
            present(body, GEO_JSON_REQUESTED_KEY),
        ) {
            (Some(registered), Some(requested)) => Ok(Self::PartialOverlap {
                registered: decode(GEO_JSON_REGISTERED_KEY, registered)?,
                requested: decode(GEO_JSON_REQUESTED_KEY, requested)?,
            }),
            _ => Err(ResponseError::MalformedRegistration {
                keys: body
                    .as_object()
                    .map(|object| object.keys().cloned().collect())
                    .unwrap_or_default(),
            }),
        }
    }
}

fn present<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|value| !value.is_null())
}

/// Decodes the `GeoJSON` stored under `key` of a registry payload.
///
/// # Errors
///
/// Returns [`ResponseError::InvalidGeoJson`] if the value is not `GeoJSON`.
pub fn decode(key: &'static str, value: &Value) -> Result<GeoJson, ResponseError> {
    GeoJson::from_json_value(value.clone()).map_err(|e| ResponseError::InvalidGeoJson {
        key,
        message: e.to_string(),
    })
}
