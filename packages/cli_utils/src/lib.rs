#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the asset registry tools.
//!
//! [`init_logger`] sets up `pretty_env_logger` from `RUST_LOG`, and
//! [`parse_shape`] turns a layer type plus a `lat,lng;lat,lng` vertex list
//! typed on the command line into a [`DrawnShape`].

use asset_registry_geometry::{DrawnShape, LatLng, ShapeError};
use thiserror::Error;

/// Errors from parsing shape arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeArgError {
    /// A vertex was not `lat,lng`.
    #[error("Invalid vertex '{vertex}': expected 'lat,lng'")]
    Vertex {
        /// The offending vertex text.
        vertex: String,
    },

    /// A radius that is negative or not a number.
    #[error("Invalid radius {radius}: expected meters >= 0")]
    Radius {
        /// The rejected radius as typed.
        radius: String,
    },

    /// A radius was given for a shape that is not a circle.
    #[error("Only circles take a radius, got a '{layer_type}' layer")]
    RadiusWithoutCircle {
        /// Layer type the radius was given for.
        layer_type: String,
    },

    /// The vertices do not fit the layer type.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Initializes the global `pretty_env_logger` logger from `RUST_LOG`.
pub fn init_logger() {
    pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)
}

/// Parses `lat,lng;lat,lng;...` into vertices. Whitespace around numbers
/// and a trailing `;` are ignored.
///
/// # Errors
///
/// Returns [`ShapeArgError::Vertex`] for any vertex that is not two numbers.
pub fn parse_vertices(input: &str) -> Result<Vec<LatLng>, ShapeArgError> {
    input
        .split(';')
        .map(str::trim)
        .filter(|vertex| !vertex.is_empty())
        .map(|vertex| {
            let err = || ShapeArgError::Vertex {
                vertex: vertex.to_string(),
            };
            let (lat, lng) = vertex.split_once(',').ok_or_else(err)?;
            let lat = lat.trim().parse::<f64>().map_err(|_| err())?;
            let lng = lng.trim().parse::<f64>().map_err(|_| err())?;
            Ok(LatLng::new(lat, lng))
        })
        .collect()
}

/// Builds a shape from a layer type name (`polygon`, `rectangle`,
/// `polyline`, `marker`, `circle`, `circlemarker`), a vertex list and, for
/// circles, a radius in meters. Circles without a radius get zero.
///
/// # Errors
///
/// Returns [`ShapeArgError`] if the vertices don't parse or don't fit the
/// layer type, or if the radius is invalid or given for another shape.
pub fn parse_shape(
    layer_type: &str,
    vertices: &str,
    radius_m: Option<f64>,
) -> Result<DrawnShape, ShapeArgError> {
    let vertices = parse_vertices(vertices)?;
    let shape = DrawnShape::from_layer(layer_type.trim(), vertices)?;

    let Some(radius_m) = radius_m else {
        return Ok(shape);
    };
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(ShapeArgError::Radius {
            radius: radius_m.to_string(),
        });
    }
    if !matches!(shape, DrawnShape::Circle { .. }) {
        return Err(ShapeArgError::RadiusWithoutCircle {
            layer_type: shape.layer_name().to_string(),
        });
    }
    Ok(shape.with_radius(radius_m))
}
