//! Error types for controller operations.

use thiserror::Error;

use crate::detection::DetectionError;
use crate::store::StoreError;

use super::tool::Tool;

/// Errors returned to the host by [`super::InteractionController`].
///
/// None of these leave the controller in a changed state.
#[derive(Error, Debug)]
pub enum InteractionError {
    /// Tool switch attempted while a gesture is still active
    #[error("Cannot switch tools during a {gesture} gesture")]
    GestureInProgress {
        /// Name of the active gesture
        gesture: &'static str,
    },

    /// Annotation-editing tool selected while an analysis is pending
    #[error("The {0} tool is unavailable while an analysis is running")]
    ToolDisabled(Tool),

    /// Draw tool pressed before a fault category was selected
    #[error("Select a fault category before drawing")]
    NoCategory,

    /// Annotation mutation requested while an analysis is pending
    #[error("Annotations are locked while an analysis is running")]
    AnalysisPending,

    /// Store rejected the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The detection run failed; the annotation list was left untouched
    #[error("Analysis failed: {0}")]
    Detection(#[from] DetectionError),
}
