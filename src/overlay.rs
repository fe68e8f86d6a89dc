//! Screen-space overlay shapes for the host to draw over the image.
//!
//! Building an overlay is a pure function of the view, the annotation list and
//! the active gesture. The host only has to paint rectangles.

use crate::interaction::{InteractionSession, ResizeHandle};
use crate::model::{AnnotationIndex, Point, Rect, Rgb, Severity};
use crate::store::AnnotationStore;
use crate::view_transform::ViewTransform;

/// One rectangle to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    /// Store index, or `None` for a region still being drawn
    pub index: Option<AnnotationIndex>,
    /// Rectangle in screen space
    pub rect: Rect,
    /// Stroke color
    pub color: Rgb,
    /// Text for the caption
    pub label: String,
    /// Severity tier, detected regions only
    pub severity: Option<Severity>,
    pub manual: bool,
    /// Whether this item is being adjusted
    pub selected: bool,
}

/// A resize handle marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMarker {
    pub index: AnnotationIndex,
    pub handle: ResizeHandle,
    /// Center in screen space
    pub position: Point,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Regions in store order (later ones on top)
    pub items: Vec<OverlayItem>,
    /// Region being drawn
    pub preview: Option<OverlayItem>,
    pub handles: Vec<HandleMarker>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.preview.is_none()
    }
}

/// Project the non-deleted annotations to screen space.
///
/// Detected regions are colored by severity tier, manual ones by fault
/// category. The region under an adjust gesture is drawn at its preview
/// position.
pub fn build_overlay(
    view: &ViewTransform,
    store: &AnnotationStore,
    session: &InteractionSession,
    show_handles: bool,
) -> Overlay {
    let mut overlay = Overlay::default();
    let adjusting = session.target();

    for (index, ann) in store.visible() {
        let selected = adjusting == Some(index);
        let model = match (selected, session.preview()) {
            (true, Some(preview)) => preview,
            _ => ann.rect(),
        };
        let rect = view.to_screen_rect(&model);
        let severity = ann.classification().map(|c| c.tier);
        let color = severity.map_or_else(|| ann.label().color(), |tier| tier.color());

        if show_handles {
            overlay
                .handles
                .extend(ResizeHandle::all().iter().map(|handle| HandleMarker {
                    index,
                    handle: *handle,
                    position: handle.position(&rect),
                }));
        }

        overlay.items.push(OverlayItem {
            index: Some(index),
            rect,
            color,
            label: ann.label().to_string(),
            severity,
            manual: ann.origin().is_manual(),
            selected,
        });
    }

    if let InteractionSession::Drawing {
        category,
        start,
        current,
    } = session
    {
        overlay.preview = Some(OverlayItem {
            index: None,
            rect: view.to_screen_rect(&Rect::from_corners(*start, *current)),
            color: category.color(),
            label: category.to_string(),
            severity: None,
            manual: true,
            selected: true,
        });
    }

    overlay
}
