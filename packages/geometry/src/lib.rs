#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shapes drawn on the field map and their spatial encodings.
//!
//! A [`DrawnShape`] is what the drawing toolbar hands over when the user
//! finishes a shape. The [`encode`] module turns it into the WKT the asset
//! registry expects, plus the raw coordinate lists used by the bounding box
//! lookup. [`measure`] reports a shape's size on the ground.

pub mod encode;
pub mod measure;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

pub use encode::{encode, rectangle_coordinate_lists};
pub use measure::ShapeMeasure;

/// A WGS84 vertex as reported by the map (latitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for geo::Coord<f64> {
    fn from(value: LatLng) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

/// The layer types the drawing toolbar can produce.
///
/// Parses the toolbar's layer type names (`"marker"`, `"circlemarker"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    /// A single marker.
    #[serde(rename = "marker")]
    #[strum(to_string = "marker", serialize = "point")]
    Point,
    /// An axis-aligned box with four corners.
    Rectangle,
    /// A closed polygon ring.
    Polygon,
    /// An open line.
    Polyline,
    /// A circle, identified by its center.
    Circle,
    /// A fixed-size circle marker.
    CircleMarker,
}

/// A shape the user finished drawing.
///
/// Immutable once created. Rectangles always carry exactly four corners in
/// drawn order; the closing vertex is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum DrawnShape {
    /// A single marker.
    Point(LatLng),
    /// Four corners, in the order the toolbar reported them.
    Rectangle([LatLng; 4]),
    /// Polygon ring vertices, in drawn order.
    Polygon(Vec<LatLng>),
    /// Polyline vertices, in drawn order.
    Polyline(Vec<LatLng>),
    /// A circle around `center`.
    Circle {
        /// Circle center.
        center: LatLng,
        /// Radius in meters.
        radius_m: f64,
    },
    /// A circle marker (fixed pixel radius).
    CircleMarker(LatLng),
    /// A layer type no query path knows how to handle.
    Unsupported {
        /// The layer type name reported by the toolbar.
        layer_type: String,
    },
}

/// Errors from building a [`DrawnShape`] out of raw toolbar output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Rectangles need exactly four corners.
    #[error("Rectangle needs exactly 4 corners, got {count}")]
    RectangleCorners {
        /// Number of corners provided.
        count: usize,
    },

    /// Point-like shapes need exactly one vertex.
    #[error("{kind} needs exactly 1 vertex, got {count}")]
    SingleVertex {
        /// Shape kind being built.
        kind: ShapeKind,
        /// Number of vertices provided.
        count: usize,
    },
}

impl DrawnShape {
    /// Builds a shape from the toolbar's layer type name and vertex list.
    ///
    /// Unknown layer type names produce [`DrawnShape::Unsupported`] rather
    /// than an error, so the caller can still surface a dispatch failure.
    /// Circles built this way get a zero radius.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the vertex count does not fit the kind.
    pub fn from_layer(layer_type: &str, vertices: Vec<LatLng>) -> Result<Self, ShapeError> {
        let Ok(kind) = layer_type.parse::<ShapeKind>() else {
            return Ok(Self::Unsupported {
                layer_type: layer_type.to_string(),
            });
        };

        match kind {
            ShapeKind::Rectangle => {
                let count = vertices.len();
                let corners: [LatLng; 4] = vertices
                    .try_into()
                    .map_err(|_| ShapeError::RectangleCorners { count })?;
                Ok(Self::Rectangle(corners))
            }
            ShapeKind::Polygon => Ok(Self::Polygon(vertices)),
            ShapeKind::Polyline => Ok(Self::Polyline(vertices)),
            ShapeKind::Point | ShapeKind::Circle | ShapeKind::CircleMarker => {
                let [vertex] = vertices.as_slice() else {
                    return Err(ShapeError::SingleVertex {
                        kind,
                        count: vertices.len(),
                    });
                };
                let vertex = *vertex;
                Ok(match kind {
                    ShapeKind::Point => Self::Point(vertex),
                    ShapeKind::Circle => Self::Circle {
                        center: vertex,
                        radius_m: 0.0,
                    },
                    _ => Self::CircleMarker(vertex),
                })
            }
        }
    }

    /// Sets the radius of a circle. Other shapes are returned unchanged.
    #[must_use]
    pub fn with_radius(self, radius_m: f64) -> Self {
        match self {
            Self::Circle { center, .. } => Self::Circle { center, radius_m },
            other => other,
        }
    }

    /// Returns the kind of this shape, or `None` for unsupported layers.
    #[must_use]
    pub const fn kind(&self) -> Option<ShapeKind> {
        match self {
            Self::Point(_) => Some(ShapeKind::Point),
            Self::Rectangle(_) => Some(ShapeKind::Rectangle),
            Self::Polygon(_) => Some(ShapeKind::Polygon),
            Self::Polyline(_) => Some(ShapeKind::Polyline),
            Self::Circle { .. } => Some(ShapeKind::Circle),
            Self::CircleMarker(_) => Some(ShapeKind::CircleMarker),
            Self::Unsupported { .. } => None,
        }
    }

    /// Returns a human-readable layer name, used in error messages.
    #[must_use]
    pub fn layer_name(&self) -> &str {
        match self {
            Self::Unsupported { layer_type } => layer_type,
            _ => self.kind().map_or("unknown", <&'static str>::from),
        }
    }

    /// The single anchor vertex of point-like shapes (circles use their center).
    #[must_use]
    pub const fn anchor(&self) -> Option<LatLng> {
        match self {
            Self::Point(v) | Self::CircleMarker(v) | Self::Circle { center: v, .. } => Some(*v),
            _ => None,
        }
    }

    /// All vertices in drawn order.
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        match self {
            Self::Point(v) | Self::CircleMarker(v) | Self::Circle { center: v, .. } => {
                std::slice::from_ref(v)
            }
            Self::Rectangle(corners) => corners,
            Self::Polygon(vertices) | Self::Polyline(vertices) => vertices,
            Self::Unsupported { .. } => &[],
        }
    }

    /// Converts the shape into a [`geo::Geometry`] (x = longitude, y = latitude).
    ///
    /// Circles become their center point. Returns `None` for unsupported
    /// layers and for polygons/polylines without vertices.
    #[must_use]
    pub fn to_geometry(&self) -> Option<geo::Geometry<f64>> {
        match self {
            Self::Point(v) | Self::CircleMarker(v) | Self::Circle { center: v, .. } => {
                Some(geo::Geometry::Point(geo::Point::from(geo::Coord::from(*v))))
            }
            Self::Rectangle(corners) => Some(geo::Geometry::Polygon(ring_polygon(corners))),
            Self::Polygon(vertices) if !vertices.is_empty() => {
                Some(geo::Geometry::Polygon(ring_polygon(vertices)))
            }
            Self::Polyline(vertices) if !vertices.is_empty() => Some(geo::Geometry::LineString(
                vertices.iter().copied().map(geo::Coord::from).collect(),
            )),
            _ => None,
        }
    }
}

fn ring_polygon(vertices: &[LatLng]) -> geo::Polygon<f64> {
    // geo closes the exterior ring itself.
    let exterior: geo::LineString<f64> = vertices.iter().copied().map(geo::Coord::from).collect();
    geo::Polygon::new(exterior, vec![])
}
