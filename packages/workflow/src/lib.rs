#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Draw, query and register workflow for the asset registry field map.
//!
//! [`FieldWorkflow`] owns the [`state::DisplayState`] the map renders and
//! is the only thing that mutates it:
//!
//! - [`FieldWorkflow::query`] dispatches a drawn shape to the point,
//!   rectangle or overlap lookup ([`dispatch`]).
//! - [`FieldWorkflow::register`] registers a polygon and classifies the
//!   answer ([`register`]).
//! - [`FieldWorkflow::percentage_overlap`] compares two arbitrary
//!   geometries ([`overlap`]).
//!
//! [`session::ActionSession`] holds the popup parameters for one drawn
//! shape, and [`state::DisplayState::overlays`] yields the styled layers to
//! draw.
//!
//! Every failure is recovered into the display's error message; none of
//! them leave the workflow unusable or `loading` stuck.

pub mod dispatch;
pub mod overlap;
pub mod overlay;
pub mod register;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use asset_registry_client::{ClientError, RegistryBackend};
use asset_registry_client_models::{GEO_JSON_KEY, ResponseError};
use serde_json::{Value, json};
use thiserror::Error;

use crate::state::{Completion, DisplayState, StateCell};

/// Errors surfaced by map actions.
///
/// `Display` is the text shown in the error toast.
#[derive(Debug, Error)]
pub enum FieldQueryError {
    /// The shape produced no geometry; nothing was sent.
    #[error("Unable to send Request, please try later!")]
    EncodingFailed,

    /// No query path handles this kind of shape.
    #[error("Something Wrong, please try later!")]
    UnsupportedGeometry {
        /// Layer type of the rejected shape.
        layer_type: String,
    },

    /// The registry answered with a body of the wrong shape.
    #[error("{0}")]
    MalformedResponse(#[from] ResponseError),

    /// The request itself failed; the transport's message is kept verbatim.
    #[error("{message}")]
    BackendFailure {
        /// Transport message.
        message: String,
    },
}

impl From<ClientError> for FieldQueryError {
    fn from(value: ClientError) -> Self {
        Self::BackendFailure {
            message: value.to_string(),
        }
    }
}

/// The map's action orchestrator.
pub struct FieldWorkflow {
    backend: Arc<dyn RegistryBackend>,
    state: StateCell,
}

impl FieldWorkflow {
    #[must_use]
    pub fn new(backend: Arc<dyn RegistryBackend>) -> Self {
        Self {
            backend,
            state: StateCell::new(),
        }
    }

    /// A copy of what the map currently shows.
    #[must_use]
    pub fn snapshot(&self) -> DisplayState {
        self.state.snapshot()
    }

    /// Trash button: drops every layer, the inspector and the error.
    pub fn clear(&self) {
        log::debug!("Clearing map layers");
        self.state.reset();
    }

    /// Error toast closed.
    pub fn dismiss_error(&self) {
        self.state.update(|display| display.error_message = None);
    }

    /// Empties the JSON inspector before a new popup action runs.
    pub fn clear_inspection(&self) {
        self.state.update(|display| display.inspection = None);
    }

    /// Shows a field record picked from search.
    ///
    /// The inspector gets `{ "data": record }`; the lookup layer gets the
    /// record's `"Geo JSON"` geometry, or nothing if it has none.
    pub fn show_search_result(&self, record: Value) {
        let field = record.get(GEO_JSON_KEY).and_then(|geometry| {
            asset_registry_client_models::decode(GEO_JSON_KEY, geometry)
                .inspect_err(|e| log::warn!("Search result has no usable geometry: {e}"))
                .ok()
        });

        self.state.begin(|_| {}).complete(Completion::SearchResult {
            inspection: json!({ "data": record }),
            field,
        });
    }

    /// Resets the map and ends the session.
    ///
    /// The display is reset before the logout request goes out, so the map
    /// is empty even if logout fails.
    ///
    /// # Errors
    ///
    /// Returns [`FieldQueryError::BackendFailure`] if the logout request
    /// fails; the message is also shown in the error toast.
    pub async fn logout(&self) -> Result<(), FieldQueryError> {
        self.state.reset();

        if let Err(e) = self.backend.logout().await {
            let e = FieldQueryError::from(e);
            log::warn!("Logout failed: {e}");
            let message = e.to_string();
            self.state
                .update(|display| display.error_message = Some(message));
            return Err(e);
        }

        log::info!("Logged out");
        Ok(())
    }
}
