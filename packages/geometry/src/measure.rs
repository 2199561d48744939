//! Ground measurements of drawn shapes.

use geo::{Centroid, ChamberlainDuquetteArea, Distance, Haversine};
use serde::Serialize;

use crate::{DrawnShape, LatLng};

/// Size of a shape on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeMeasure {
    /// Centroid (circles use their center).
    pub centroid: LatLng,
    /// Geodesic area in square meters; 0 for points and lines.
    pub area_m2: f64,
    /// Outline length in meters: the closed ring for areas, the path for
    /// polylines.
    pub perimeter_m: f64,
}

impl DrawnShape {
    /// Measures the shape on the WGS84 sphere.
    ///
    /// Returns `None` when the shape has no geometry (unsupported layers,
    /// empty polygons and polylines).
    #[must_use]
    pub fn measure(&self) -> Option<ShapeMeasure> {
        if let Self::Circle { center, radius_m } = self {
            return Some(ShapeMeasure {
                centroid: *center,
                area_m2: std::f64::consts::PI * radius_m * radius_m,
                perimeter_m: std::f64::consts::TAU * radius_m,
            });
        }

        let geometry = self.to_geometry()?;
        let centroid = geometry.centroid()?;

        let (area_m2, perimeter_m) = match &geometry {
            geo::Geometry::Polygon(polygon) => (
                polygon.chamberlain_duquette_unsigned_area(),
                path_length(polygon.exterior()),
            ),
            geo::Geometry::LineString(line) => (0.0, path_length(line)),
            _ => (0.0, 0.0),
        };

        Some(ShapeMeasure {
            centroid: LatLng::new(centroid.y(), centroid.x()),
            area_m2,
            perimeter_m,
        })
    }
}

fn path_length(line: &geo::LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| Haversine.distance(segment.start_point(), segment.end_point()))
        .sum()
}
