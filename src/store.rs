//! Ordered storage for the annotations of one candidate image.
//!
//! Entries are only ever appended; deletion is a soft delete that keeps the
//! rectangle and records who removed it and when. Indices therefore stay
//! stable until the next [`AnnotationStore::bulk_replace`].

use chrono::{DateTime, Utc};

use crate::constants::MIN_REGION_SIZE;
use crate::model::{Annotation, AnnotationIndex, Deletion, FaultLabel, Origin, Rect, Size};

/// Errors raised by store operations addressing an entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Annotation index {index} out of range (store holds {len})")]
    IndexOutOfRange { index: AnnotationIndex, len: usize },
}

/// Which existing entries survive a [`AnnotationStore::bulk_replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceScope {
    /// Drop everything, including hand-drawn regions.
    All,
    /// Drop detected regions; manual ones are kept after the new detections.
    #[default]
    DetectedOnly,
}

/// Storage for annotations on a single image.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Intrinsic image size used for area fractions.
    image_size: Size,
    min_region_size: f32,
    /// Dirty flag - set when the list changes, cleared by the host after redrawing.
    dirty: bool,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        let (w, h) = crate::constants::FALLBACK_IMAGE_SIZE;
        Self::new(Size::new(w, h))
    }
}

impl AnnotationStore {
    pub fn new(image_size: Size) -> Self {
        Self {
            annotations: Vec::new(),
            image_size,
            min_region_size: MIN_REGION_SIZE,
            dirty: true,
        }
    }

    /// Override the minimum region size enforced on every coordinate change.
    pub fn with_min_region_size(mut self, min: f32) -> Self {
        self.min_region_size = min;
        self
    }

    pub fn min_region_size(&self) -> f32 {
        self.min_region_size
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    /// Change the reference image size and recompute every area fraction.
    pub fn set_image_size(&mut self, image_size: Size) {
        self.image_size = image_size;
        for ann in &mut self.annotations {
            ann.recompute_area(image_size);
        }
        self.mark_dirty();
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Append an annotation and return its index.
    pub fn add(&mut self, mut annotation: Annotation) -> AnnotationIndex {
        let rect = annotation.rect().with_min_size(self.min_region_size);
        annotation.set_rect(rect, self.image_size);
        self.annotations.push(annotation);
        self.mark_dirty();
        self.annotations.len() - 1
    }

    /// Mark an entry deleted, keeping its coordinates.
    ///
    /// Deleting an already deleted entry keeps the original audit trail.
    pub fn soft_delete(
        &mut self,
        index: AnnotationIndex,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let ann = self.entry_mut(index)?;
        if let Some(existing) = ann.deletion() {
            log::debug!(
                "Annotation {} already deleted by {}, ignoring",
                index,
                existing.deleted_by
            );
            return Ok(());
        }
        ann.mark_deleted(Deletion {
            deleted_by: actor.to_string(),
            deleted_at: now,
        });
        self.mark_dirty();
        log::info!("Annotation {} deleted by {}", index, actor);
        Ok(())
    }

    /// Replace an entry's rectangle; the area fraction follows.
    pub fn update_coordinates(
        &mut self,
        index: AnnotationIndex,
        rect: Rect,
    ) -> Result<(), StoreError> {
        let min = self.min_region_size;
        let image = self.image_size;
        let ann = self.entry_mut(index)?;
        ann.set_rect(rect.with_min_size(min), image);
        self.mark_dirty();
        Ok(())
    }

    /// Clear the store and repopulate it from a detection run.
    ///
    /// With [`ReplaceScope::DetectedOnly`], previous manual entries (deleted or
    /// not) are re-appended after the new detections in their previous order.
    pub fn bulk_replace<I>(&mut self, image_size: Size, detected: I, scope: ReplaceScope)
    where
        I: IntoIterator<Item = (Rect, FaultLabel)>,
    {
        let previous = std::mem::take(&mut self.annotations);
        self.image_size = image_size;

        for (rect, label) in detected {
            let rect = rect.with_min_size(self.min_region_size);
            self.annotations
                .push(Annotation::detected(rect, label, image_size));
        }
        let detected_count = self.annotations.len();

        if scope == ReplaceScope::DetectedOnly {
            for mut ann in previous
                .into_iter()
                .filter(|ann| matches!(ann.origin(), Origin::Manual { .. }))
            {
                ann.recompute_area(image_size);
                self.annotations.push(ann);
            }
        }

        log::info!(
            "Store repopulated: {} detected, {} manual kept",
            detected_count,
            self.annotations.len() - detected_count
        );
        self.mark_dirty();
    }

    /// The full ordered list, deleted entries included.
    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, index: AnnotationIndex) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    /// Entries that should be rendered and hit-tested, with their indices.
    pub fn visible(&self) -> impl DoubleEndedIterator<Item = (AnnotationIndex, &Annotation)> {
        self.annotations
            .iter()
            .enumerate()
            .filter(|(_, ann)| !ann.is_deleted())
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn entry_mut(&mut self, index: AnnotationIndex) -> Result<&mut Annotation, StoreError> {
        let len = self.annotations.len();
        self.annotations
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FaultCategory;
    use chrono::TimeZone;

    fn image() -> Size {
        Size::new(1000.0, 800.0)
    }

    fn manual(x: f32, y: f32, w: f32, h: f32) -> Annotation {
        Annotation::manual(
            Rect::new(x, y, w, h),
            FaultCategory::OilLeakage.into(),
            "bob",
            image(),
        )
    }

    #[test]
    fn test_add_returns_sequential_indices() {
        let mut store = AnnotationStore::new(image());
        assert_eq!(store.add(manual(0.0, 0.0, 10.0, 10.0)), 0);
        assert_eq!(store.add(manual(20.0, 0.0, 10.0, 10.0)), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_enforces_min_size() {
        let mut store = AnnotationStore::new(image());
        let idx = store.add(manual(0.0, 0.0, 2.0, 1.0));
        let rect = store.get(idx).map(|a| a.rect()).unwrap_or_default();
        assert_eq!(rect.width, 5.0);
        assert_eq!(rect.height, 5.0);
    }

    #[test]
    fn test_soft_delete_keeps_coordinates() {
        let mut store = AnnotationStore::new(image());
        let idx = store.add(manual(10.0, 20.0, 30.0, 40.0));
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        store.soft_delete(idx, "alice", when).unwrap();

        let ann = &store.list()[idx];
        assert!(ann.is_deleted());
        let deletion = ann.deletion().unwrap();
        assert_eq!(deletion.deleted_by, "alice");
        assert_eq!(deletion.deleted_at, when);
        assert_eq!(ann.rect(), Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(store.visible().count(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_soft_delete_twice_keeps_first_audit() {
        let mut store = AnnotationStore::new(image());
        let idx = store.add(manual(10.0, 20.0, 30.0, 40.0));
        let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();

        store.soft_delete(idx, "alice", first).unwrap();
        store.soft_delete(idx, "carol", second).unwrap();

        let deletion = store.list()[idx].deletion().unwrap();
        assert_eq!(deletion.deleted_by, "alice");
        assert_eq!(deletion.deleted_at, first);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = AnnotationStore::new(image());
        let err = store
            .update_coordinates(3, Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap_err();
        assert_eq!(err, StoreError::IndexOutOfRange { index: 3, len: 0 });
        assert!(store.soft_delete(0, "alice", Utc::now()).is_err());
    }

    #[test]
    fn test_update_coordinates_recomputes_area() {
        let mut store = AnnotationStore::new(Size::new(100.0, 100.0));
        let idx = store.add(Annotation::manual(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            FaultCategory::LooseJoint.into(),
            "bob",
            Size::new(100.0, 100.0),
        ));
        store
            .update_coordinates(idx, Rect::new(5.0, 5.0, 20.0, 50.0))
            .unwrap();
        let ann = store.get(idx).unwrap();
        assert_eq!(ann.rect(), Rect::new(5.0, 5.0, 20.0, 50.0));
        assert!((ann.area_fraction() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_bulk_replace_keeps_manual_after_detected() {
        let mut store = AnnotationStore::new(image());
        store.bulk_replace(
            image(),
            vec![(Rect::new(0.0, 0.0, 50.0, 50.0), FaultLabel::parse("point overload"))],
            ReplaceScope::DetectedOnly,
        );
        store.add(manual(100.0, 100.0, 20.0, 20.0));

        store.bulk_replace(
            Size::new(500.0, 500.0),
            vec![
                (Rect::new(1.0, 1.0, 10.0, 10.0), FaultLabel::parse("wire overload")),
                (Rect::new(50.0, 50.0, 10.0, 10.0), FaultLabel::parse("loose joint")),
            ],
            ReplaceScope::DetectedOnly,
        );

        assert_eq!(store.len(), 3);
        assert!(!store.list()[0].origin().is_manual());
        assert!(!store.list()[1].origin().is_manual());
        let kept = &store.list()[2];
        assert!(kept.origin().is_manual());
        assert!((kept.area_fraction() - 400.0 / 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_bulk_replace_all_drops_manual() {
        let mut store = AnnotationStore::new(image());
        store.add(manual(100.0, 100.0, 20.0, 20.0));
        store.bulk_replace(image(), Vec::new(), ReplaceScope::All);
        assert!(store.is_empty());
    }

    #[test]
    fn test_dirty_flag_tracks_mutations() {
        let mut store = AnnotationStore::new(image());
        store.clear_dirty();
        assert!(!store.is_dirty());
        store.add(manual(0.0, 0.0, 10.0, 10.0));
        assert!(store.is_dirty());
    }
}
