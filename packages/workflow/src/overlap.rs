//! Percentage overlap between two geometries.

use asset_registry_client_models::PercentageOverlap;
use serde_json::Value;

use crate::state::Completion;
use crate::{FieldQueryError, FieldWorkflow};

impl FieldWorkflow {
    /// Asks the registry how much two WKT geometries overlap.
    ///
    /// The answer is opaque and only replaces the inspector; no layer
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`FieldQueryError::EncodingFailed`] without calling the
    /// registry if either geometry is empty, or
    /// [`FieldQueryError::BackendFailure`] if the request fails.
    pub async fn percentage_overlap(
        &self,
        wkt_a: &str,
        wkt_b: &str,
    ) -> Result<Value, FieldQueryError> {
        let operation = self.state.begin(|_| {});

        if wkt_a.trim().is_empty() || wkt_b.trim().is_empty() {
            let e = FieldQueryError::EncodingFailed;
            operation.complete(Completion::Failed {
                message: e.to_string(),
                inspection: None,
            });
            return Err(e);
        }

        let request = PercentageOverlap {
            wkt_1: wkt_a.to_string(),
            wkt_2: wkt_b.to_string(),
        };

        match self.backend.percentage_overlap(&request).await {
            Ok(body) => {
                operation.complete(Completion::Inspection(body.clone()));
                Ok(body)
            }
            Err(e) => {
                let e = FieldQueryError::from(e);
                log::warn!("Percentage overlap failed: {e}");
                operation.complete(Completion::Failed {
                    message: e.to_string(),
                    inspection: None,
                });
                Err(e)
            }
        }
    }
}
