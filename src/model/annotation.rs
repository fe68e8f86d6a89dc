//! Annotation records: detected or hand-drawn anomaly regions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Size};
use super::label::FaultLabel;
use super::severity::{Classification, classify};

/// Position of an annotation in the store. Stable for the lifetime of a store
/// generation (until the next bulk replace).
pub type AnnotationIndex = usize;

/// Where an annotation came from. Only manual annotations carry an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    /// Produced by the detection service.
    Detected,
    /// Drawn by an operator.
    Manual { created_by: String },
}

impl Origin {
    pub fn is_manual(&self) -> bool {
        matches!(self, Origin::Manual { .. })
    }

    pub fn created_by(&self) -> Option<&str> {
        match self {
            Origin::Detected => None,
            Origin::Manual { created_by } => Some(created_by),
        }
    }
}

/// Audit trail left by a soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub deleted_by: String,
    pub deleted_at: DateTime<Utc>,
}

/// Fraction of the image covered by `rect`. Zero for a degenerate image.
pub fn area_fraction(rect: &Rect, image: Size) -> f32 {
    let image_area = image.area();
    if image_area > 0.0 && image_area.is_finite() {
        rect.area() / image_area
    } else {
        0.0
    }
}

/// A single anomaly region in model (image-pixel) space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    rect: Rect,
    label: FaultLabel,
    origin: Origin,
    #[serde(default)]
    deletion: Option<Deletion>,
    area_fraction: f32,
}

impl Annotation {
    /// Create a detected annotation sized against `image`.
    pub fn detected(rect: Rect, label: FaultLabel, image: Size) -> Self {
        Self::new(rect, label, Origin::Detected, image)
    }

    /// Create a manual annotation authored by `created_by`.
    pub fn manual(rect: Rect, label: FaultLabel, created_by: impl Into<String>, image: Size) -> Self {
        Self::new(
            rect,
            label,
            Origin::Manual {
                created_by: created_by.into(),
            },
            image,
        )
    }

    fn new(rect: Rect, label: FaultLabel, origin: Origin, image: Size) -> Self {
        Self {
            rect,
            label,
            origin,
            deletion: None,
            area_fraction: area_fraction(&rect, image),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn label(&self) -> &FaultLabel {
        &self.label
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn area_fraction(&self) -> f32 {
        self.area_fraction
    }

    pub fn is_deleted(&self) -> bool {
        self.deletion.is_some()
    }

    pub fn deletion(&self) -> Option<&Deletion> {
        self.deletion.as_ref()
    }

    /// Severity and confidence heuristic. Manual regions are not rated.
    pub fn classification(&self) -> Option<Classification> {
        match self.origin {
            Origin::Detected => Some(classify(self.area_fraction)),
            Origin::Manual { .. } => None,
        }
    }

    /// Replace the rectangle and recompute the area fraction.
    pub(crate) fn set_rect(&mut self, rect: Rect, image: Size) {
        self.rect = rect;
        self.area_fraction = area_fraction(&rect, image);
    }

    pub(crate) fn recompute_area(&mut self, image: Size) {
        self.area_fraction = area_fraction(&self.rect, image);
    }

    pub(crate) fn mark_deleted(&mut self, deletion: Deletion) {
        self.deletion = Some(deletion);
    }
}
