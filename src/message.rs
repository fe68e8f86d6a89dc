//! Message types for driving the engine.
//!
//! Hosts that follow the Elm architecture can translate their UI events into
//! [`Message`]s and feed them to [`InteractionController::update`] instead of
//! calling the controller methods one by one.

use crate::detection::AnalysisOutcome;
use crate::interaction::{AnalysisReport, GestureOutcome, InteractionController, InteractionError, Tool};
use crate::model::{AnnotationIndex, FaultLabel, Point, Size};
use crate::view_transform::{ViewState, ZoomDirection};

/// Inputs the engine reacts to. Points are in screen space.
#[derive(Debug)]
pub enum Message {
    // Pointer
    /// Button pressed over the image
    PointerDown(Point),
    /// Pointer moved over the image
    PointerMove(Point),
    /// Button released
    PointerUp(Point),
    /// Pointer left the image area
    PointerLeave(Point),
    /// Press and release without a drag
    Click(Point),

    // Toolbar
    /// Tool selected
    SetTool(Tool),
    /// Fault category selected for drawing
    SelectCategory(FaultLabel),
    /// Zoom in button
    ZoomIn,
    /// Zoom out button
    ZoomOut,
    /// Reset view button
    ResetView,
    /// Escape key
    CancelGesture,

    // Annotations
    /// Soft-delete an annotation on behalf of `actor`
    DeleteAnnotation {
        index: AnnotationIndex,
        actor: String,
    },

    // Layout
    /// The image was re-laid out at a new size
    DisplayResized(Size),

    // Analysis
    /// A detection run was started
    AnalysisStarted,
    /// A detection run ended
    AnalysisFinished(AnalysisOutcome),
}

/// What the host should react to after a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Nothing visible changed
    None,
    /// Only the overlay preview or selection changed; redraw
    Redraw,
    /// A gesture finished
    Gesture(GestureOutcome),
    /// The view moved or zoomed
    View(ViewState),
    /// The annotation list changed outside a gesture
    AnnotationsChanged,
    /// An analysis finished or was cancelled
    Analysis(AnalysisReport),
}

impl InteractionController {
    /// Apply one message.
    ///
    /// Errors leave the controller unchanged, except that a finished analysis
    /// always clears the busy state.
    pub fn update(&mut self, message: Message) -> Result<Update, InteractionError> {
        let update = match message {
            Message::PointerDown(point) => {
                self.handle_pointer_down(point)?;
                Update::Redraw
            }
            Message::PointerMove(point) => {
                if self.session().is_idle() {
                    Update::None
                } else {
                    self.handle_pointer_move(point);
                    Update::Redraw
                }
            }
            Message::PointerUp(point) => gesture_update(self.handle_pointer_up(point)?),
            Message::PointerLeave(point) => gesture_update(self.handle_pointer_leave(point)?),
            Message::Click(point) => self.handle_click(point).map_or(Update::None, Update::View),
            Message::SetTool(tool) => {
                self.set_tool(tool)?;
                Update::Redraw
            }
            Message::SelectCategory(label) => {
                self.select_category(label);
                Update::None
            }
            Message::ZoomIn => Update::View(self.zoom_step(ZoomDirection::In)),
            Message::ZoomOut => Update::View(self.zoom_step(ZoomDirection::Out)),
            Message::ResetView => {
                self.reset_view();
                Update::View(self.current_view_state())
            }
            Message::CancelGesture => {
                if self.cancel_gesture() {
                    Update::Redraw
                } else {
                    Update::None
                }
            }
            Message::DeleteAnnotation { index, actor } => {
                self.delete_annotation(index, &actor)?;
                Update::AnnotationsChanged
            }
            Message::DisplayResized(size) => {
                self.set_display_size(size);
                Update::Redraw
            }
            Message::AnalysisStarted => {
                self.begin_analysis();
                Update::Redraw
            }
            Message::AnalysisFinished(outcome) => Update::Analysis(self.finish_analysis(outcome)?),
        };
        Ok(update)
    }
}

fn gesture_update(outcome: Option<GestureOutcome>) -> Update {
    outcome.map_or(Update::None, Update::Gesture)
}
