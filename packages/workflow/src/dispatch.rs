//! Spatial query dispatch for drawn shapes.
//!
//! | Shape | Registry operation |
//! |---|---|
//! | rectangle | bounding box lookup (raw lat/lng lists) |
//! | polygon, polyline | overlap lookup (WKT + threshold) |
//! | marker, circle, circle marker | point lookup |

use asset_registry_client_models::{
    FieldQueryResponse, OverlapLookup, PointLookup, QueryParameters, RectangleLookup,
};
use asset_registry_geometry::{DrawnShape, ShapeKind, encode, rectangle_coordinate_lists};

use crate::FieldWorkflow;
use crate::FieldQueryError;
use crate::state::Completion;

/// The registry request a shape translates to.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Point lookup.
    Point(PointLookup),
    /// Bounding box lookup.
    Rectangle(RectangleLookup),
    /// Overlap/threshold lookup.
    Overlap(OverlapLookup),
}

/// Translates a shape into its registry request without sending anything.
///
/// # Errors
///
/// Returns [`FieldQueryError::UnsupportedGeometry`] for layers no lookup
/// handles and [`FieldQueryError::EncodingFailed`] when the shape encodes to
/// nothing.
pub fn plan(shape: &DrawnShape, params: &QueryParameters) -> Result<QueryPlan, FieldQueryError> {
    let unsupported = || FieldQueryError::UnsupportedGeometry {
        layer_type: shape.layer_name().to_string(),
    };
    let kind = shape.kind().ok_or_else(unsupported)?;

    let wkt = encode(shape);
    if wkt.is_empty() {
        return Err(FieldQueryError::EncodingFailed);
    }

    match kind {
        ShapeKind::Rectangle => {
            let (latitudes, longitudes) =
                rectangle_coordinate_lists(shape).ok_or(FieldQueryError::EncodingFailed)?;
            Ok(QueryPlan::Rectangle(RectangleLookup {
                latitudes,
                longitudes,
            }))
        }
        ShapeKind::Polygon | ShapeKind::Polyline => {
            Ok(QueryPlan::Overlap(OverlapLookup::new(wkt, params)))
        }
        ShapeKind::Point | ShapeKind::Circle | ShapeKind::CircleMarker => {
            let anchor = shape.anchor().ok_or(FieldQueryError::EncodingFailed)?;
            Ok(QueryPlan::Point(PointLookup::new(
                anchor.lat, anchor.lng, params,
            )))
        }
    }
}

impl FieldWorkflow {
    /// Looks up the registered fields matching a drawn shape.
    ///
    /// On success the lookup layer and the inspector are replaced together;
    /// a lookup that matches nothing empties the lookup layer.
    /// On failure only the error message changes, so earlier results stay
    /// on the map; an unsupported shape additionally drops the lookup layer.
    ///
    /// # Errors
    ///
    /// Returns [`FieldQueryError`] if the shape cannot be dispatched or the
    /// registry call fails.
    pub async fn query(
        &self,
        shape: &DrawnShape,
        params: &QueryParameters,
    ) -> Result<FieldQueryResponse, FieldQueryError> {
        let operation = self.state.begin(|_| {});

        let result = match plan(shape, params) {
            Ok(plan) => self.execute(plan).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(response) => {
                if response.data.is_some() {
                    log::debug!("{} lookup returned a field", shape.layer_name());
                } else {
                    log::debug!("{} lookup matched no field", shape.layer_name());
                }
                operation.complete(Completion::Field {
                    inspection: response.json.clone(),
                    field: response.data.clone(),
                });
            }
            Err(e @ FieldQueryError::UnsupportedGeometry { layer_type }) => {
                log::warn!("No lookup for '{layer_type}' layers");
                operation.complete(Completion::Rejected {
                    message: e.to_string(),
                });
            }
            Err(e) => {
                log::warn!("{} lookup failed: {e}", shape.layer_name());
                operation.complete(Completion::Failed {
                    message: e.to_string(),
                    inspection: None,
                });
            }
        }

        result
    }

    async fn execute(&self, plan: QueryPlan) -> Result<FieldQueryResponse, FieldQueryError> {
        log::debug!("Dispatching {plan:?}");
        let response = match &plan {
            QueryPlan::Point(request) => self.backend.point_lookup(request).await?,
            QueryPlan::Rectangle(request) => self.backend.rectangle_lookup(request).await?,
            QueryPlan::Overlap(request) => self.backend.overlap_lookup(request).await?,
        };
        Ok(response)
    }
}
