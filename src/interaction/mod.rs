//! Pointer interaction: tools, gesture sessions, hit-testing, resize rules and
//! the controller that ties them to the view and the store.

pub mod controller;
pub mod error;
pub mod resize;
pub mod session;
pub mod tool;

#[cfg(test)]
mod tests;

pub use controller::{AnalysisReport, GestureOutcome, InteractionController};
pub use error::InteractionError;
pub use hit_test::{HitTarget, hit_test};
pub use resize::{move_rect, resize_rect};
pub use session::{AxisEdge, InteractionSession, ResizeHandle};
pub use tool::Tool;
