//! Scenario tests for the interaction controller.
//!
//! Each module drives [`InteractionController`] through pointer events the
//! way a host would and checks the resulting store and view.

mod analysis_tests;

use super::{GestureOutcome, InteractionController};
use crate::model::{Point, Size};

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn image() -> Size {
    Size::new(1000.0, 1000.0)
}

/// Controller whose display matches the image, so screen and model agree at zoom 1.
fn controller() -> InteractionController {
    InteractionController::new(image(), image()).with_operator("alice")
}

/// Press, move and release.
fn drag(
    controller: &mut InteractionController,
    from: (f32, f32),
    to: (f32, f32),
) -> Option<GestureOutcome> {
    controller
        .handle_pointer_down(Point::new(from.0, from.1))
        .expect("pointer down");
    controller.handle_pointer_move(Point::new(to.0, to.1));
    controller
        .handle_pointer_up(Point::new(to.0, to.1))
        .expect("pointer up")
}
