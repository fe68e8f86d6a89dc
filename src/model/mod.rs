//! Data models for the annotation engine.

mod annotation;
mod geometry;
mod label;
mod severity;

pub use annotation::{Annotation, AnnotationIndex, Deletion, Origin, area_fraction};
pub use geometry::{Point, Rect, Size};
pub use label::{FaultCategory, FaultLabel, Rgb};
pub use severity::{
    Classification, HIGH_AREA_FRACTION, MEDIUM_AREA_FRACTION, Severity, classify,
};
