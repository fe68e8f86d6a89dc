//! Wire types returned by the detection service.

use serde::{Deserialize, Serialize};

/// Per-box metadata reported alongside `boxes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxInfo {
    /// Human-readable label, e.g. `"Point overload"`
    #[serde(default)]
    pub label: Option<String>,
    /// Coarse fault type, e.g. `"point overload"`
    #[serde(default)]
    pub box_fault: Option<String>,
    #[serde(default)]
    pub area_frac: Option<f32>,
    #[serde(default)]
    pub aspect: Option<f32>,
    #[serde(default)]
    pub overlap_center_frac: Option<f32>,
}

impl BoxInfo {
    /// The label to show, falling back to the fault type.
    pub fn display_label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .or(self.box_fault.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Full response of one analysis run.
///
/// The analysis script reports failures as `{"error": "..."}`; other
/// transports may send `success: false` with `errorMessage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "errorMessage")]
    pub error: Option<String>,
    #[serde(default)]
    pub image_width: Option<f32>,
    #[serde(default)]
    pub image_height: Option<f32>,
    /// Regions as `[x, y, w, h]` in image pixels.
    #[serde(default)]
    pub boxes: Vec<[f32; 4]>,
    #[serde(default)]
    pub box_info: Vec<BoxInfo>,
    #[serde(default)]
    pub fault_type: Option<String>,
    #[serde(default)]
    pub prob: Option<f32>,
    #[serde(default)]
    pub hist_distance: Option<f32>,
    #[serde(default)]
    pub dv95: Option<f32>,
    #[serde(default)]
    pub warm_fraction: Option<f32>,
}

impl DetectionResponse {
    /// Parse the JSON document printed by the service.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The failure message, if the service reported one.
    pub fn failure(&self) -> Option<String> {
        match (&self.error, self.success) {
            (Some(message), _) => Some(message.clone()),
            (None, Some(false)) => Some("Detection service reported failure".to_string()),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// Whether both image dimensions are present and usable.
    pub fn has_dimensions(&self) -> bool {
        matches!(
            (self.image_width, self.image_height),
            (Some(w), Some(h)) if w > 0.0 && h > 0.0
        )
    }
}
