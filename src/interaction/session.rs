//! Transient gesture state.

use crate::model::{AnnotationIndex, FaultLabel, Point, Rect};

/// One of the eight resize handles around a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

/// Which edge of an axis a handle grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEdge {
    /// Left or top edge
    Start,
    /// Right or bottom edge
    End,
}

impl ResizeHandle {
    /// All handles, corners first so they win over edges when they overlap.
    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::NW,
            ResizeHandle::NE,
            ResizeHandle::SW,
            ResizeHandle::SE,
            ResizeHandle::N,
            ResizeHandle::S,
            ResizeHandle::W,
            ResizeHandle::E,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::E => "e",
            ResizeHandle::W => "w",
            ResizeHandle::NE => "ne",
            ResizeHandle::NW => "nw",
            ResizeHandle::SE => "se",
            ResizeHandle::SW => "sw",
        }
    }

    /// Edge moved on the X axis, if any.
    pub fn horizontal(&self) -> Option<AxisEdge> {
        match self {
            ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW => Some(AxisEdge::Start),
            ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE => Some(AxisEdge::End),
            ResizeHandle::N | ResizeHandle::S => None,
        }
    }

    /// Edge moved on the Y axis, if any.
    pub fn vertical(&self) -> Option<AxisEdge> {
        match self {
            ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW => Some(AxisEdge::Start),
            ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW => Some(AxisEdge::End),
            ResizeHandle::E | ResizeHandle::W => None,
        }
    }

    /// Where this handle sits on `rect` (in whatever space `rect` is in).
    pub fn position(&self, rect: &Rect) -> Point {
        let along = |edge: Option<AxisEdge>, start: f32, end: f32| match edge {
            Some(AxisEdge::Start) => start,
            Some(AxisEdge::End) => end,
            None => (start + end) / 2.0,
        };
        Point::new(
            along(self.horizontal(), rect.left(), rect.right()),
            along(self.vertical(), rect.top(), rect.bottom()),
        )
    }
}

/// The gesture currently in progress. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionSession {
    #[default]
    Idle,
    /// Dragging the view. `anchor` is the press position minus the pan at press time.
    Panning { anchor: Point },
    /// Drawing a new region; both corners in model space.
    Drawing {
        category: FaultLabel,
        start: Point,
        current: Point,
    },
    /// Moving a region. `start` is the press position in screen space.
    AdjustingMove {
        target: AnnotationIndex,
        original: Rect,
        start: Point,
        preview: Rect,
    },
    /// Resizing a region by one of its handles.
    AdjustingResize {
        target: AnnotationIndex,
        handle: ResizeHandle,
        original: Rect,
        start: Point,
        preview: Rect,
    },
}

impl InteractionSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionSession::Idle)
    }

    /// Whether this gesture would mutate the annotation list on release.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            InteractionSession::Drawing { .. }
                | InteractionSession::AdjustingMove { .. }
                | InteractionSession::AdjustingResize { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionSession::Idle => "idle",
            InteractionSession::Panning { .. } => "panning",
            InteractionSession::Drawing { .. } => "drawing",
            InteractionSession::AdjustingMove { .. } => "move",
            InteractionSession::AdjustingResize { .. } => "resize",
        }
    }

    /// The annotation being adjusted, if any.
    pub fn target(&self) -> Option<AnnotationIndex> {
        match self {
            InteractionSession::AdjustingMove { target, .. }
            | InteractionSession::AdjustingResize { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Provisional model-space rectangle of the gesture.
    pub fn preview(&self) -> Option<Rect> {
        match self {
            InteractionSession::Drawing { start, current, .. } => {
                Some(Rect::from_corners(*start, *current))
            }
            InteractionSession::AdjustingMove { preview, .. }
            | InteractionSession::AdjustingResize { preview, .. } => Some(*preview),
            _ => None,
        }
    }
}
