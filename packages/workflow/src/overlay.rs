//! Styled layers for the map.

use geojson::GeoJson;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::state::DisplayState;

/// Which result a layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverlayRole {
    /// Geometry already in the registry.
    Registered,
    /// Geometry requested in a partial-overlap registration.
    Requested,
    /// Lookup or search result.
    Field,
}

/// Leaflet path options for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    pub weight: f64,
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub opacity: f64,
}

impl OverlayStyle {
    /// Yellow outline, no fill.
    pub const REGISTERED: Self = Self {
        weight: 1.5,
        color: "#ffff00",
        fill_color: "#ffff00",
        fill_opacity: 0.0,
        opacity: 0.9,
    };

    /// Red, half filled.
    pub const REQUESTED: Self = Self {
        weight: 1.5,
        color: "#ff5e6e",
        fill_color: "#ff5e6e",
        fill_opacity: 0.5,
        opacity: 0.9,
    };

    pub const FIELD: Self = Self::REGISTERED;

    #[must_use]
    pub const fn for_role(role: OverlayRole) -> Self {
        match role {
            OverlayRole::Registered => Self::REGISTERED,
            OverlayRole::Requested => Self::REQUESTED,
            OverlayRole::Field => Self::FIELD,
        }
    }
}

/// A geometry layer ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overlay<'a> {
    pub role: OverlayRole,
    pub style: OverlayStyle,
    pub geometry: &'a GeoJson,
}

impl DisplayState {
    /// The layers to draw, bottom to top: registered, requested, then the
    /// lookup result.
    #[must_use]
    pub fn overlays(&self) -> Vec<Overlay<'_>> {
        [
            (OverlayRole::Registered, self.registered.as_ref()),
            (OverlayRole::Requested, self.requested.as_ref()),
            (OverlayRole::Field, self.generic_field.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, geometry)| {
            geometry.map(|geometry| Overlay {
                role,
                style: OverlayStyle::for_role(role),
                geometry,
            })
        })
        .collect()
    }
}
