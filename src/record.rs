//! Flat records the host persists for each annotation.
//!
//! One record per store entry, deleted ones included, in store order. The
//! field names match the anomaly rows the inspection backend stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Annotation, AnnotationIndex, FaultLabel, Severity};
use crate::store::AnnotationStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub idx: AnnotationIndex,
    pub label: FaultLabel,
    /// `[x, y, w, h]` in image pixels
    pub coords: [f32; 4],
    /// Size-based display heuristic; absent for manual regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub area_frac: f32,
    pub is_manual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl AnomalyRecord {
    pub fn from_annotation(idx: AnnotationIndex, ann: &Annotation) -> Self {
        let classification = ann.classification();
        let deletion = ann.deletion();
        Self {
            idx,
            label: ann.label().clone(),
            coords: ann.rect().to_array(),
            confidence: classification.map(|c| c.confidence_heuristic),
            severity: classification.map(|c| c.tier),
            area_frac: ann.area_fraction(),
            is_manual: ann.origin().is_manual(),
            created_by: ann.origin().created_by().map(str::to_string),
            deleted: ann.is_deleted(),
            deleted_at: deletion.map(|d| d.deleted_at),
            deleted_by: deletion.map(|d| d.deleted_by.clone()),
        }
    }
}

impl AnnotationStore {
    pub fn to_records(&self) -> Vec<AnomalyRecord> {
        self.list()
            .iter()
            .enumerate()
            .map(|(idx, ann)| AnomalyRecord::from_annotation(idx, ann))
            .collect()
    }

    /// Records as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_records())
    }
}
