//! Handle-based resize with deterministic edge-flip normalization.
//!
//! A resize is always recomputed from the rectangle captured when the gesture
//! started plus the total model-space delta, so intermediate pointer positions
//! never accumulate rounding. Per axis, the edge opposite the grabbed one is
//! the anchor and never moves:
//!
//! - the moving edge is offset by the delta;
//! - if it lands on the far side of the anchor, the span is `[moving, anchor]`
//!   normalized (the region flips across the anchor);
//! - the span is then widened to at least the minimum size, away from the anchor.

use crate::model::Rect;

use super::session::{AxisEdge, ResizeHandle};

/// Resize `original` by dragging `handle` by `(dx, dy)` model units.
pub fn resize_rect(original: &Rect, handle: ResizeHandle, dx: f32, dy: f32, min_size: f32) -> Rect {
    let (x, width) = resize_axis(
        original.left(),
        original.right(),
        handle.horizontal(),
        dx,
        min_size,
    );
    let (y, height) = resize_axis(
        original.top(),
        original.bottom(),
        handle.vertical(),
        dy,
        min_size,
    );
    Rect::new(x, y, width, height)
}

/// Move `original` by `(dx, dy)` model units.
pub fn move_rect(original: &Rect, dx: f32, dy: f32) -> Rect {
    original.translated(dx, dy)
}

/// Returns `(origin, length)` for one axis.
fn resize_axis(start: f32, end: f32, grabbed: Option<AxisEdge>, delta: f32, min: f32) -> (f32, f32) {
    match grabbed {
        None => (start, (end - start).max(min)),
        Some(AxisEdge::End) => span(start, end + delta, min, AxisEdge::End),
        Some(AxisEdge::Start) => span(end, start + delta, min, AxisEdge::Start),
    }
}

/// Normalized span between a fixed `anchor` and a `moving` edge.
///
/// `natural` is the side the moving edge sits on before any flip; it breaks
/// the tie when the moving edge lands exactly on the anchor.
fn span(anchor: f32, moving: f32, min: f32, natural: AxisEdge) -> (f32, f32) {
    let after_anchor = if moving > anchor {
        true
    } else if moving < anchor {
        false
    } else {
        natural == AxisEdge::End
    };
    let length = (moving - anchor).abs().max(min);
    if after_anchor {
        (anchor, length)
    } else {
        (anchor - length, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f32 = 5.0;

    fn base() -> Rect {
        Rect::new(100.0, 100.0, 50.0, 50.0)
    }

    #[test]
    fn test_se_grows_both_dimensions() {
        let r = resize_rect(&base(), ResizeHandle::SE, 20.0, 20.0, MIN);
        assert_eq!(r, Rect::new(100.0, 100.0, 70.0, 70.0));
    }

    #[test]
    fn test_nw_moves_origin() {
        let r = resize_rect(&base(), ResizeHandle::NW, -10.0, 15.0, MIN);
        assert_eq!(r, Rect::new(90.0, 115.0, 60.0, 35.0));
    }

    #[test]
    fn test_edge_handles_touch_one_axis() {
        let n = resize_rect(&base(), ResizeHandle::N, 30.0, 10.0, MIN);
        assert_eq!(n, Rect::new(100.0, 110.0, 50.0, 40.0));

        let e = resize_rect(&base(), ResizeHandle::E, 10.0, 30.0, MIN);
        assert_eq!(e, Rect::new(100.0, 100.0, 60.0, 50.0));

        let w = resize_rect(&base(), ResizeHandle::W, 10.0, 0.0, MIN);
        assert_eq!(w, Rect::new(110.0, 100.0, 40.0, 50.0));

        let s = resize_rect(&base(), ResizeHandle::S, 0.0, -10.0, MIN);
        assert_eq!(s, Rect::new(100.0, 100.0, 50.0, 40.0));
    }

    #[test]
    fn test_collapse_is_clamped_at_anchor() {
        // East edge dragged almost onto the west edge.
        let r = resize_rect(&base(), ResizeHandle::E, -48.0, 0.0, MIN);
        assert_eq!(r, Rect::new(100.0, 100.0, 5.0, 50.0));

        // North edge dragged almost onto the south edge.
        let r = resize_rect(&base(), ResizeHandle::N, 0.0, 48.0, MIN);
        assert_eq!(r, Rect::new(100.0, 145.0, 50.0, 5.0));
    }

    #[test]
    fn test_crossing_flips_across_anchor() {
        // East edge dragged 80 left: moving edge at 70, anchor stays at 100.
        let r = resize_rect(&base(), ResizeHandle::E, -80.0, 0.0, MIN);
        assert_eq!(r, Rect::new(70.0, 100.0, 30.0, 50.0));

        // South-west corner dragged past the north-east corner.
        let r = resize_rect(&base(), ResizeHandle::SW, 70.0, -70.0, MIN);
        assert_eq!(r, Rect::new(150.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_exact_overlap_keeps_natural_side() {
        let r = resize_rect(&base(), ResizeHandle::W, 50.0, 0.0, MIN);
        assert_eq!(r, Rect::new(145.0, 100.0, 5.0, 50.0));

        let r = resize_rect(&base(), ResizeHandle::E, -50.0, 0.0, MIN);
        assert_eq!(r, Rect::new(100.0, 100.0, 5.0, 50.0));
    }

    #[test]
    fn test_min_size_holds_for_any_delta() {
        let deltas = [-500.0, -52.5, -50.0, -47.0, -1.0, 0.0, 1.0, 47.0, 50.0, 52.5, 500.0];
        for handle in ResizeHandle::all() {
            for dx in deltas {
                for dy in deltas {
                    let r = resize_rect(&base(), *handle, dx, dy, MIN);
                    assert!(
                        r.width >= MIN && r.height >= MIN,
                        "{:?} by ({}, {}) gave {:?}",
                        handle,
                        dx,
                        dy,
                        r
                    );
                }
            }
        }
    }

    #[test]
    fn test_min_size_holds_across_gesture_sequence() {
        // A gesture replays from the original rectangle each move.
        let original = base();
        let path = [(10.0, 10.0), (-60.0, -20.0), (-49.0, -49.0), (-51.0, -52.0), (200.0, -300.0)];
        for (dx, dy) in path {
            let r = resize_rect(&original, ResizeHandle::SE, dx, dy, MIN);
            assert!(r.width >= MIN && r.height >= MIN);
        }
    }

    #[test]
    fn test_move_rect() {
        assert_eq!(move_rect(&base(), -5.0, 7.5), Rect::new(95.0, 107.5, 50.0, 50.0));
    }
}
