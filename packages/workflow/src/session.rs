//! The action popup opened on a drawn shape.

use asset_registry_client_models::{
    FieldQueryResponse, ParameterError, QueryParameters, SpatialIndexLevels,
};
use asset_registry_geometry::{DrawnShape, ShapeKind};
use strum_macros::Display;

use crate::register::RegistrationOutcome;
use crate::{FieldQueryError, FieldWorkflow};

/// An action offered by the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FieldAction {
    #[strum(to_string = "Fetch Field")]
    FetchField,
    #[strum(to_string = "Register Field")]
    RegisterField,
}

/// What a popup action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Fields(FieldQueryResponse),
    Registration(RegistrationOutcome),
}

/// One popup: a shape plus the parameters typed so far.
///
/// Every popup starts from [`QueryParameters::default()`]; nothing typed
/// in an earlier popup carries over.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSession {
    shape: DrawnShape,
    params: QueryParameters,
}

impl ActionSession {
    #[must_use]
    pub fn open(shape: DrawnShape) -> Self {
        Self {
            shape,
            params: QueryParameters::default(),
        }
    }

    #[must_use]
    pub const fn shape(&self) -> &DrawnShape {
        &self.shape
    }

    #[must_use]
    pub const fn params(&self) -> &QueryParameters {
        &self.params
    }

    /// Registration is only offered for polygons.
    #[must_use]
    pub fn available_actions(&self) -> Vec<FieldAction> {
        if self.shape.kind() == Some(ShapeKind::Polygon) {
            vec![FieldAction::FetchField, FieldAction::RegisterField]
        } else {
            vec![FieldAction::FetchField]
        }
    }

    /// # Errors
    ///
    /// Returns [`ParameterError`] if `input` is not a whole number.
    pub fn set_resolution_level(&mut self, input: &str) -> Result<(), ParameterError> {
        self.params.resolution_level = QueryParameters::parse_resolution_level(input)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ParameterError`] if `input` is not a percentage.
    pub fn set_threshold(&mut self, input: &str) -> Result<(), ParameterError> {
        self.params.threshold = QueryParameters::parse_threshold(input)?;
        Ok(())
    }

    pub fn set_domain(&mut self, input: &str) {
        input.trim().clone_into(&mut self.params.domain);
    }

    /// # Errors
    ///
    /// Returns [`ParameterError`] if `input` is not `min,max`.
    pub fn set_spatial_index_levels(&mut self, input: &str) -> Result<(), ParameterError> {
        self.params.spatial_index_levels = input.parse::<SpatialIndexLevels>()?;
        Ok(())
    }

    /// Runs `action` against the workflow. The inspector is emptied first.
    ///
    /// # Errors
    ///
    /// Returns [`FieldQueryError`] if the action fails; the display already
    /// carries its message.
    pub async fn run(
        &self,
        workflow: &FieldWorkflow,
        action: FieldAction,
    ) -> Result<ActionResult, FieldQueryError> {
        workflow.clear_inspection();
        log::debug!("Running '{action}' on a {} layer", self.shape.layer_name());

        match action {
            FieldAction::FetchField => workflow
                .query(&self.shape, &self.params)
                .await
                .map(ActionResult::Fields),
            FieldAction::RegisterField => workflow
                .register(&self.shape, &self.params)
                .await
                .map(ActionResult::Registration),
        }
    }
}
