//! Well-known text encoding for drawn shapes.
//!
//! Coordinates are written `lng lat` and use Rust's shortest round-trip
//! float formatting, so parsing the output reproduces the drawn vertices
//! exactly. Vertex order is never changed.

use std::fmt::Write as _;

use crate::{DrawnShape, LatLng};

/// Encodes a shape as WKT.
///
/// Returns an empty string when the shape cannot be encoded (unsupported
/// layer, no vertices, or a non-finite coordinate). Callers must treat the
/// empty string as a failed encoding and not send it to the registry.
#[must_use]
pub fn encode(shape: &DrawnShape) -> String {
    if shape.vertices().iter().any(|v| !v.is_finite()) {
        return String::new();
    }

    match shape {
        DrawnShape::Point(v) | DrawnShape::CircleMarker(v) | DrawnShape::Circle { center: v, .. } => {
            format!("POINT({})", coord(*v))
        }
        DrawnShape::Rectangle(corners) => polygon(corners),
        DrawnShape::Polygon(vertices) => polygon(vertices),
        DrawnShape::Polyline(vertices) => {
            if vertices.is_empty() {
                return String::new();
            }
            format!("LINESTRING({})", join(vertices))
        }
        DrawnShape::Unsupported { .. } => String::new(),
    }
}

/// Space-joined latitudes and longitudes of a rectangle, in corner order.
///
/// Used by the bounding box lookup, which takes raw coordinate lists rather
/// than WKT. Returns `None` for anything other than a rectangle.
#[must_use]
pub fn rectangle_coordinate_lists(shape: &DrawnShape) -> Option<(String, String)> {
    let DrawnShape::Rectangle(corners) = shape else {
        return None;
    };

    let lats = corners
        .iter()
        .map(|v| v.lat.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let lngs = corners
        .iter()
        .map(|v| v.lng.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    Some((lats, lngs))
}

fn polygon(vertices: &[LatLng]) -> String {
    let Some(first) = vertices.first() else {
        return String::new();
    };

    let mut ring = join(vertices);
    // Close the ring unless the drawn vertices already do.
    if vertices.len() == 1 || vertices.last() != Some(first) {
        write!(ring, ", {}", coord(*first)).ok();
    }

    format!("POLYGON(({ring}))")
}

fn join(vertices: &[LatLng]) -> String {
    vertices
        .iter()
        .map(|v| coord(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn coord(v: LatLng) -> String {
    format!("{} {}", v.lng, v.lat)
}

#[cfg(test)]
mod tests {
    use wkt::TryFromWkt;

    use super::*;

    fn drawn(points: &[(f64, f64)]) -> Vec<LatLng> {
        points.iter().copied().map(LatLng::from).collect()
    }

    #[test]
    fn encodes_polygon_in_drawn_order_and_closes_ring() {
        let shape = DrawnShape::Polygon(drawn(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]));
        assert_eq!(encode(&shape), "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))");
    }

    #[test]
    fn does_not_double_close_an_already_closed_ring() {
        let shape = DrawnShape::Polygon(drawn(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]));
        assert_eq!(encode(&shape), "POLYGON((0 0, 1 0, 1 1, 0 0))");
    }

    #[test]
    fn encodes_rectangle_as_closed_polygon() {
        let shape = DrawnShape::Rectangle([
            LatLng::new(41.5, -87.9),
            LatLng::new(42.1, -87.9),
            LatLng::new(42.1, -87.5),
            LatLng::new(41.5, -87.5),
        ]);
        assert_eq!(
            encode(&shape),
            "POLYGON((-87.9 41.5, -87.9 42.1, -87.5 42.1, -87.5 41.5, -87.9 41.5))"
        );
    }

    #[test]
    fn encodes_polyline_without_closing() {
        let shape = DrawnShape::Polyline(drawn(&[(10.0, 20.0), (10.5, 20.25)]));
        assert_eq!(encode(&shape), "LINESTRING(20 10, 20.25 10.5)");
    }

    #[test]
    fn encodes_point_like_shapes_as_points() {
        let v = LatLng::new(38.846_016, -76.927_487);
        let expected = "POINT(-76.927487 38.846016)";
        assert_eq!(encode(&DrawnShape::Point(v)), expected);
        assert_eq!(encode(&DrawnShape::CircleMarker(v)), expected);
        assert_eq!(
            encode(&DrawnShape::Circle {
                center: v,
                radius_m: 120.0
            }),
            expected
        );
    }

    #[test]
    fn degenerate_shapes_encode_to_empty_string() {
        assert_eq!(encode(&DrawnShape::Polygon(vec![])), "");
        assert_eq!(encode(&DrawnShape::Polyline(vec![])), "");
        assert_eq!(
            encode(&DrawnShape::Unsupported {
                layer_type: "text".to_string()
            }),
            ""
        );
        assert_eq!(
            encode(&DrawnShape::Point(LatLng::new(f64::NAN, 1.0))),
            ""
        );
    }

    #[test]
    fn polygon_round_trips_through_wkt_parser() {
        let vertices = drawn(&[
            (48.137_154, 11.576_124),
            (48.140_01, 11.580_3),
            (48.135_5, 11.585_999_9),
            (48.131_234_567_8, 11.577_7),
            (48.133, 11.571),
        ]);
        let text = encode(&DrawnShape::Polygon(vertices.clone()));

        let parsed = geo::Polygon::<f64>::try_from_wkt_str(&text).unwrap();
        let coords: Vec<LatLng> = parsed
            .exterior()
            .coords()
            .map(|c| LatLng::new(c.y, c.x))
            .collect();

        assert_eq!(&coords[..vertices.len()], vertices.as_slice());
        assert_eq!(coords.last(), vertices.first());
    }

    #[test]
    fn polyline_round_trips_through_wkt_parser() {
        let vertices = drawn(&[(-33.868_82, 151.209_29), (-33.856_78, 151.215_3), (-33.8, 151.3)]);
        let text = encode(&DrawnShape::Polyline(vertices.clone()));

        let parsed = geo::LineString::<f64>::try_from_wkt_str(&text).unwrap();
        let coords: Vec<LatLng> = parsed.coords().map(|c| LatLng::new(c.y, c.x)).collect();

        assert_eq!(coords, vertices);
    }

    #[test]
    fn rectangle_lists_have_four_numbers_without_trailing_separator() {
        let shape = DrawnShape::Rectangle([
            LatLng::new(41.5, -87.9),
            LatLng::new(42.1, -87.9),
            LatLng::new(42.1, -87.5),
            LatLng::new(41.5, -87.5),
        ]);
        let (lats, lngs) = rectangle_coordinate_lists(&shape).unwrap();

        assert_eq!(lats, "41.5 42.1 42.1 41.5");
        assert_eq!(lngs, "-87.9 -87.9 -87.5 -87.5");
        for list in [&lats, &lngs] {
            assert_eq!(list.split(' ').count(), 4);
            assert!(!list.ends_with(' '));
            assert!(list.split(' ').all(|n| n.parse::<f64>().is_ok()));
        }
    }

    #[test]
    fn rectangle_lists_only_for_rectangles() {
        assert!(rectangle_coordinate_lists(&DrawnShape::Point(LatLng::new(1.0, 2.0))).is_none());
    }
}
