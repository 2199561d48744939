//! Field registration.
//!
//! The registry answers a registration with either the field's geometry
//! (the boundary is registered) or a registered/requested pair (the
//! boundary overlaps an existing field only in part). Both are drawn; the
//! raw answer always goes to the inspector.

use asset_registry_client_models::{QueryParameters, RegisterField, RegistrationResponse};
use asset_registry_geometry::{DrawnShape, ShapeKind, encode};

use crate::state::Completion;
use crate::{FieldQueryError, FieldWorkflow};

/// How a registration was classified.
pub type RegistrationOutcome = RegistrationResponse;

impl FieldWorkflow {
    /// Registers a drawn polygon as a field boundary.
    ///
    /// The registered and requested layers are cleared as soon as the
    /// request starts. The domain filter is never sent.
    ///
    /// # Errors
    ///
    /// * [`FieldQueryError::UnsupportedGeometry`] for anything but a polygon
    /// * [`FieldQueryError::EncodingFailed`] if the polygon encodes to nothing
    /// * [`FieldQueryError::BackendFailure`] if the request fails
    /// * [`FieldQueryError::MalformedResponse`] if the answer cannot be
    ///   classified; the raw answer is still shown in the inspector
    pub async fn register(
        &self,
        shape: &DrawnShape,
        params: &QueryParameters,
    ) -> Result<RegistrationOutcome, FieldQueryError> {
        let operation = self.state.begin(|display| {
            display.registered = None;
            display.requested = None;
        });

        if shape.kind() != Some(ShapeKind::Polygon) {
            let e = FieldQueryError::UnsupportedGeometry {
                layer_type: shape.layer_name().to_string(),
            };
            log::warn!("Cannot register a '{}' layer", shape.layer_name());
            operation.complete(Completion::Failed {
                message: e.to_string(),
                inspection: None,
            });
            return Err(e);
        }

        let wkt = encode(shape);
        if wkt.is_empty() {
            let e = FieldQueryError::EncodingFailed;
            operation.complete(Completion::Failed {
                message: e.to_string(),
                inspection: None,
            });
            return Err(e);
        }

        let request = RegisterField::new(wkt, params);
        let body = match self.backend.register_field(&request).await {
            Ok(body) => body,
            Err(e) => {
                let e = FieldQueryError::from(e);
                log::warn!("Registration failed: {e}");
                operation.complete(Completion::Failed {
                    message: e.to_string(),
                    inspection: None,
                });
                return Err(e);
            }
        };

        match RegistrationResponse::classify(&body) {
            Ok(outcome) => {
                let (registered, requested) = match &outcome {
                    RegistrationResponse::FullyRegistered(field) => (field.clone(), None),
                    RegistrationResponse::PartialOverlap {
                        registered,
                        requested,
                    } => (registered.clone(), Some(requested.clone())),
                };
                log::info!(
                    "Registration answered with {}",
                    if requested.is_some() {
                        "a partial overlap"
                    } else {
                        "a registered field"
                    }
                );
                operation.complete(Completion::Registration {
                    inspection: body,
                    registered,
                    requested,
                });
                Ok(outcome)
            }
            Err(e) => {
                let e = FieldQueryError::from(e);
                log::warn!("{e}");
                operation.complete(Completion::Failed {
                    message: e.to_string(),
                    inspection: Some(body),
                });
                Err(e)
            }
        }
    }
}
