//! The gesture state machine.
//!
//! [`InteractionController`] owns the [`ViewTransform`], the
//! [`AnnotationStore`] and the current [`InteractionSession`]. The host
//! forwards pointer events in screen space together with a tool selection,
//! and renders from [`InteractionController::overlay`] or from
//! [`InteractionController::current_view_state`] and
//! [`InteractionController::snapshot_annotations`].
//!
//! Adjust gestures only touch the session while the pointer moves; the store
//! is written once on release.

use std::mem;
use std::time::Duration;

use chrono::Utc;

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_OPERATOR, FALLBACK_IMAGE_SIZE, HANDLE_HIT_RADIUS};
use crate::detection::{AnalysisOutcome, AnalysisSummary, adapt};
use crate::model::{Annotation, AnnotationIndex, FaultLabel, Point, Rect, Size};
use crate::overlay::{Overlay, build_overlay};
use crate::store::{AnnotationStore, ReplaceScope};
use crate::view_transform::{ViewState, ViewTransform, ZoomDirection};

use super::error::InteractionError;
use super::hit_test::{HitTarget, hit_test};
use super::resize::{move_rect, resize_rect};
use super::session::InteractionSession;
use super::tool::Tool;

/// What a finished gesture did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// The view was dragged to a new pan offset.
    Panned(ViewState),
    /// A manual region was added at this index.
    Added(AnnotationIndex),
    /// A drawn region was below the minimum size and dropped.
    Discarded,
    /// An existing region was moved or resized.
    Updated(AnnotationIndex),
}

/// Result of applying a finished analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisReport {
    Applied {
        /// Number of detected regions now in the store
        detected: usize,
        elapsed: Duration,
        summary: AnalysisSummary,
        /// The response had no image size and the fallback was used
        used_fallback_size: bool,
    },
    Cancelled,
}

/// Pointer-driven editing of one candidate image.
#[derive(Debug, Clone)]
pub struct InteractionController {
    view: ViewTransform,
    store: AnnotationStore,
    tool: Tool,
    category: Option<FaultLabel>,
    session: InteractionSession,
    /// Actor recorded as `created_by` for drawn regions.
    operator: String,
    handle_hit_radius: f32,
    replace_scope: ReplaceScope,
    fallback_size: Size,
    analysis_pending: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        let size = Size::new(FALLBACK_IMAGE_SIZE.0, FALLBACK_IMAGE_SIZE.1);
        Self::new(size, size)
    }
}

impl InteractionController {
    /// Controller with default settings for an image of `image_size` rendered
    /// at `display_size`.
    pub fn new(display_size: Size, image_size: Size) -> Self {
        let view = ViewTransform::new(display_size, image_size);
        let store = AnnotationStore::new(view.intrinsic_size());
        Self {
            view,
            store,
            tool: Tool::default(),
            category: None,
            session: InteractionSession::Idle,
            operator: DEFAULT_OPERATOR.to_string(),
            handle_hit_radius: HANDLE_HIT_RADIUS,
            replace_scope: ReplaceScope::default(),
            fallback_size: Size::new(FALLBACK_IMAGE_SIZE.0, FALLBACK_IMAGE_SIZE.1),
            analysis_pending: false,
        }
    }

    /// Controller using the interaction and analysis settings of `config`.
    pub fn from_config(config: &EngineConfig, display_size: Size, image_size: Size) -> Self {
        let interaction = &config.interaction;
        let analysis = &config.analysis;
        let [fw, fh] = analysis.fallback_image_size;

        let view = ViewTransform::new(display_size, image_size).with_limits(interaction.zoom);
        let store = AnnotationStore::new(view.intrinsic_size())
            .with_min_region_size(interaction.min_region_size);

        Self {
            view,
            store,
            tool: Tool::default(),
            category: None,
            session: InteractionSession::Idle,
            operator: config.preferences.operator.clone(),
            handle_hit_radius: interaction.handle_hit_radius,
            replace_scope: if analysis.preserve_manual_on_reanalysis {
                ReplaceScope::DetectedOnly
            } else {
                ReplaceScope::All
            },
            fallback_size: Size::new(fw, fh),
            analysis_pending: false,
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn category(&self) -> Option<&FaultLabel> {
        self.category.as_ref()
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// True while an analysis is pending.
    pub fn is_busy(&self) -> bool {
        self.analysis_pending
    }

    pub fn current_view_state(&self) -> ViewState {
        self.view.state()
    }

    /// Ordered copy of every annotation, deleted ones included.
    pub fn snapshot_annotations(&self) -> Vec<Annotation> {
        self.store.list().to_vec()
    }

    /// Screen-space overlay for the current frame.
    ///
    /// Resize handles are included while the adjust tool is selected.
    pub fn overlay(&self) -> Overlay {
        build_overlay(&self.view, &self.store, &self.session, self.tool == Tool::Adjust)
    }

    /// What lies under a screen point, using the same geometry as a press.
    pub fn annotation_at(&self, screen: Point) -> Option<HitTarget> {
        hit_test(&self.store, &self.view, screen, self.handle_hit_radius)
    }

    /// Whether the store changed since the last [`Self::clear_dirty`].
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.store.clear_dirty();
    }

    // ========================================================================
    // Selection and view
    // ========================================================================

    /// Select the active tool.
    ///
    /// Fails while a gesture is active, and for annotation-editing tools while
    /// an analysis is pending. State is unchanged on failure.
    pub fn set_tool(&mut self, tool: Tool) -> Result<(), InteractionError> {
        if !self.session.is_idle() {
            log::warn!(
                "Rejected tool switch to {} during {} gesture",
                tool,
                self.session.name()
            );
            return Err(InteractionError::GestureInProgress {
                gesture: self.session.name(),
            });
        }
        if self.analysis_pending && tool.mutates_annotations() {
            log::warn!("Rejected {} tool while analysis is pending", tool);
            return Err(InteractionError::ToolDisabled(tool));
        }
        log::debug!("🖌️ Tool: {}", tool);
        self.tool = tool;
        Ok(())
    }

    /// Category used for the next drawn region.
    pub fn select_category(&mut self, label: FaultLabel) {
        log::debug!("🏷️ Category: {}", label);
        self.category = Some(label);
    }

    /// The host re-laid out the image.
    pub fn set_display_size(&mut self, display_size: Size) {
        self.view.set_display_size(display_size);
    }

    /// Switch to a different backend image size; area fractions follow.
    pub fn set_image_size(&mut self, image_size: Size) {
        self.view.set_intrinsic_size(image_size);
        self.store.set_image_size(self.view.intrinsic_size());
    }

    /// Identity zoom and pan. Any gesture in progress is discarded.
    pub fn reset_view(&mut self) {
        if !self.session.is_idle() {
            log::debug!("Discarding {} gesture on view reset", self.session.name());
        }
        self.session = InteractionSession::Idle;
        self.view.reset();
        log::debug!("🔄 View reset");
    }

    /// Zoom button: step in or out, keeping the pan offset.
    pub fn zoom_step(&mut self, direction: ZoomDirection) -> ViewState {
        self.view.zoom_step(direction);
        log::debug!("🔍 Zoom: {:.2}x", self.view.zoom());
        self.view.state()
    }

    /// A click without drag. With the zoom tool this zooms around `screen`.
    pub fn handle_click(&mut self, screen: Point) -> Option<ViewState> {
        if self.tool != Tool::Zoom || !self.session.is_idle() {
            return None;
        }
        self.view.focal_zoom(screen);
        log::debug!(
            "🔍 Focal zoom at ({:.1}, {:.1}): {:.2}x",
            screen.x,
            screen.y,
            self.view.zoom()
        );
        Some(self.view.state())
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    /// Start a gesture according to the selected tool.
    ///
    /// A press while a gesture is already active is ignored.
    pub fn handle_pointer_down(&mut self, screen: Point) -> Result<(), InteractionError> {
        if !self.session.is_idle() {
            log::warn!(
                "Pointer down during {} gesture ignored",
                self.session.name()
            );
            return Ok(());
        }
        if self.analysis_pending && self.tool.mutates_annotations() {
            return Err(InteractionError::ToolDisabled(self.tool));
        }

        match self.tool {
            Tool::Pan => {
                let pan = self.view.pan();
                let anchor = Point::new(screen.x - pan.x, screen.y - pan.y);
                log::debug!("Pan drag started at ({:.1}, {:.1})", screen.x, screen.y);
                self.session = InteractionSession::Panning { anchor };
            }
            Tool::Zoom => {}
            Tool::Draw => {
                let category = self.category.clone().ok_or(InteractionError::NoCategory)?;
                let start = self.view.to_model(screen);
                log::debug!("✏️ Started region at ({:.1}, {:.1})", start.x, start.y);
                self.session = InteractionSession::Drawing {
                    category,
                    start,
                    current: start,
                };
            }
            Tool::Adjust => match self.annotation_at(screen) {
                Some(HitTarget::Handle { index, handle }) => {
                    let original = self.rect_of(index);
                    log::debug!("Resize of {} started at handle {}", index, handle.name());
                    self.session = InteractionSession::AdjustingResize {
                        target: index,
                        handle,
                        original,
                        start: screen,
                        preview: original,
                    };
                }
                Some(HitTarget::Body { index }) => {
                    let original = self.rect_of(index);
                    log::debug!("Move of {} started", index);
                    self.session = InteractionSession::AdjustingMove {
                        target: index,
                        original,
                        start: screen,
                        preview: original,
                    };
                }
                None => {}
            },
        }
        Ok(())
    }

    /// Update the active gesture.
    pub fn handle_pointer_move(&mut self, screen: Point) {
        let min_size = self.store.min_region_size();
        match &mut self.session {
            InteractionSession::Idle => {}
            InteractionSession::Panning { anchor } => {
                self.view
                    .set_pan(Point::new(screen.x - anchor.x, screen.y - anchor.y));
            }
            InteractionSession::Drawing { current, .. } => {
                *current = self.view.to_model(screen);
            }
            InteractionSession::AdjustingMove {
                original,
                start,
                preview,
                ..
            } => {
                let (sdx, sdy) = screen.delta_from(start);
                let (dx, dy) = self.view.model_delta(sdx, sdy);
                *preview = move_rect(original, dx, dy);
            }
            InteractionSession::AdjustingResize {
                handle,
                original,
                start,
                preview,
                ..
            } => {
                let (sdx, sdy) = screen.delta_from(start);
                let (dx, dy) = self.view.model_delta(sdx, sdy);
                *preview = resize_rect(original, *handle, dx, dy, min_size);
            }
        }
    }

    /// Finish the active gesture at `screen` and commit it.
    ///
    /// Returns `None` if no gesture was active.
    pub fn handle_pointer_up(
        &mut self,
        screen: Point,
    ) -> Result<Option<GestureOutcome>, InteractionError> {
        self.handle_pointer_move(screen);

        let outcome = match mem::take(&mut self.session) {
            InteractionSession::Idle => return Ok(None),
            InteractionSession::Panning { .. } => {
                let state = self.view.state();
                log::debug!("Pan drag ended at ({:.0}, {:.0})", state.pan.x, state.pan.y);
                GestureOutcome::Panned(state)
            }
            InteractionSession::Drawing {
                category,
                start,
                current,
            } => self.commit_drawing(category, Rect::from_corners(start, current)),
            InteractionSession::AdjustingMove {
                target, preview, ..
            }
            | InteractionSession::AdjustingResize {
                target, preview, ..
            } => {
                self.store.update_coordinates(target, preview)?;
                log::info!(
                    "Annotation {} now at [{:.1}, {:.1}, {:.1}, {:.1}]",
                    target,
                    preview.x,
                    preview.y,
                    preview.width,
                    preview.height
                );
                GestureOutcome::Updated(target)
            }
        };
        Ok(Some(outcome))
    }

    /// The pointer left the viewport. The gesture is committed as on release.
    pub fn handle_pointer_leave(
        &mut self,
        screen: Point,
    ) -> Result<Option<GestureOutcome>, InteractionError> {
        if !self.session.is_idle() {
            log::debug!("Pointer left during {} gesture, committing", self.session.name());
        }
        self.handle_pointer_up(screen)
    }

    /// Escape: drop the active gesture without touching the store.
    ///
    /// A cancelled pan keeps the offset reached so far.
    pub fn cancel_gesture(&mut self) -> bool {
        if self.session.is_idle() {
            return false;
        }
        log::debug!("Cancelled {} gesture", self.session.name());
        self.session = InteractionSession::Idle;
        true
    }

    // ========================================================================
    // Annotation edits
    // ========================================================================

    /// Soft-delete the entry at `index`, recording `actor` and the current time.
    pub fn delete_annotation(
        &mut self,
        index: AnnotationIndex,
        actor: &str,
    ) -> Result<(), InteractionError> {
        if self.analysis_pending {
            log::warn!("Rejected delete of {} while analysis is pending", index);
            return Err(InteractionError::AnalysisPending);
        }
        if !self.session.is_idle() {
            return Err(InteractionError::GestureInProgress {
                gesture: self.session.name(),
            });
        }
        self.store.soft_delete(index, actor, Utc::now())?;
        Ok(())
    }

    fn commit_drawing(&mut self, category: FaultLabel, rect: Rect) -> GestureOutcome {
        let min = self.store.min_region_size();
        if rect.width > min && rect.height > min {
            let annotation = Annotation::manual(
                rect,
                category,
                self.operator.clone(),
                self.store.image_size(),
            );
            let index = self.store.add(annotation);
            log::info!(
                "Added manual region {} [{:.1}, {:.1}, {:.1}, {:.1}]",
                index,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
            GestureOutcome::Added(index)
        } else {
            log::debug!(
                "Discarded {:.1}x{:.1} region below minimum size {}",
                rect.width,
                rect.height,
                min
            );
            GestureOutcome::Discarded
        }
    }

    fn rect_of(&self, index: AnnotationIndex) -> Rect {
        self.store.get(index).map(|ann| ann.rect()).unwrap_or_default()
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Mark an analysis as pending.
    ///
    /// Draw and adjust gestures in progress are discarded; panning continues.
    pub fn begin_analysis(&mut self) {
        self.discard_editing("analysis started");
        self.analysis_pending = true;
        log::info!("⏳ Analysis pending");
    }

    /// Apply the outcome of the pending analysis.
    ///
    /// On success the store is repopulated in one step. A failed or cancelled
    /// run leaves the store as it was before [`Self::begin_analysis`].
    pub fn finish_analysis(
        &mut self,
        outcome: AnalysisOutcome,
    ) -> Result<AnalysisReport, InteractionError> {
        self.analysis_pending = false;

        let (result, elapsed) = match outcome {
            AnalysisOutcome::Cancelled => {
                log::info!("Analysis cancelled, annotations unchanged");
                return Ok(AnalysisReport::Cancelled);
            }
            AnalysisOutcome::Completed { result, elapsed } => (result, elapsed),
        };

        let batch = result
            .and_then(|response| adapt(&response, self.fallback_size))
            .inspect_err(|e| log::error!("Analysis failed: {}", e))?;

        // Indices held by an adjust session do not survive the replace.
        self.discard_editing("analysis applied");

        let detected = batch.entries.len();
        self.view.set_intrinsic_size(batch.image_size);
        self.store
            .bulk_replace(batch.image_size, batch.entries, self.replace_scope);

        log::info!(
            "Analysis applied: {} detected regions in {:.2}s",
            detected,
            elapsed.as_secs_f32()
        );
        Ok(AnalysisReport::Applied {
            detected,
            elapsed,
            summary: batch.summary,
            used_fallback_size: batch.used_fallback_size,
        })
    }

    fn discard_editing(&mut self, reason: &str) {
        if self.session.is_editing() {
            log::warn!("Discarding {} gesture, {}", self.session.name(), reason);
            self.session = InteractionSession::Idle;
        }
    }
}
