//! Conversion of detection responses into store entries.

use crate::model::{Annotation, FaultCategory, FaultLabel, Point, Rect, Size};

use super::error::DetectionError;
use super::response::DetectionResponse;

/// Scalar results of a run that are not tied to a single region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub fault_type: Option<String>,
    pub probability: Option<f32>,
    pub hist_distance: Option<f32>,
    pub dv95: Option<f32>,
    pub warm_fraction: Option<f32>,
}

/// Detected regions ready for [`crate::store::AnnotationStore::bulk_replace`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBatch {
    /// Image size area fractions are computed against.
    pub image_size: Size,
    /// True when the response had no usable dimensions and the default was used.
    pub used_fallback_size: bool,
    pub entries: Vec<(Rect, FaultLabel)>,
    pub summary: AnalysisSummary,
}

impl DetectedBatch {
    /// The batch as detected annotations, in response order.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.entries
            .iter()
            .map(|(rect, label)| Annotation::detected(*rect, label.clone(), self.image_size))
            .collect()
    }
}

/// Convert a service response.
///
/// A failed response becomes [`DetectionError::Service`] so the caller can
/// surface the message without touching the store. Missing dimensions fall
/// back to `fallback`; this keeps overlays usable but area fractions are
/// only approximate in that case.
pub fn adapt(response: &DetectionResponse, fallback: Size) -> Result<DetectedBatch, DetectionError> {
    if let Some(message) = response.failure() {
        return Err(DetectionError::Service(message));
    }

    let (image_size, used_fallback_size) = match (response.image_width, response.image_height) {
        (Some(w), Some(h)) if Size::new(w, h).is_valid() => (Size::new(w, h), false),
        _ => {
            log::warn!(
                "Detection response has no usable image size, assuming {}x{}",
                fallback.width,
                fallback.height
            );
            (fallback, true)
        }
    };

    let mut entries = Vec::with_capacity(response.boxes.len());
    for (i, coords) in response.boxes.iter().enumerate() {
        if coords.iter().any(|v| !v.is_finite()) {
            log::warn!("Skipping detected box {} with non-finite coordinates", i);
            continue;
        }
        let [x, y, w, h] = *coords;
        // Normalize negative extents the same way a drawn rectangle is.
        let rect = Rect::from_corners(Point::new(x, y), Point::new(x + w, y + h));
        let label = response
            .box_info
            .get(i)
            .and_then(|info| info.display_label())
            .map(FaultLabel::parse)
            .unwrap_or(FaultLabel::Category(FaultCategory::OtherHotspot));
        entries.push((rect, label));
    }

    log::debug!("Adapted {} detected regions", entries.len());

    Ok(DetectedBatch {
        image_size,
        used_fallback_size,
        entries,
        summary: AnalysisSummary {
            fault_type: response.fault_type.clone(),
            probability: response.prob,
            hist_distance: response.hist_distance,
            dv95: response.dv95,
            warm_fraction: response.warm_fraction,
        },
    })
}
