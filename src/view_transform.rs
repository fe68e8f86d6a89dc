//! Mapping between model space and screen space.
//!
//! Model space is the pixel grid of the image as reported by the detection
//! service. Screen space is the viewport, with its origin at the top-left of
//! the rendered image before any zoom or pan. The composition is
//!
//! ```text
//! screen = model * scale * zoom + pan        scale = display / intrinsic (per axis)
//! model  = ((screen - pan) / zoom) / scale
//! ```
//!
//! Every other component converts coordinates through this type, so overlays
//! and hit-testing always agree.

use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_IMAGE_SIZE, zoom};
use crate::model::{Point, Rect, Size};

/// Direction for a stepped zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Zoom bounds and increment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: zoom::MIN,
            max: zoom::MAX,
            step: zoom::STEP,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Pan/zoom state handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f32,
    pub pan: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: zoom::MIN,
            pan: Point::default(),
        }
    }
}

/// Invertible model <-> screen transform for one rendered image.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Point,
    display_size: Size,
    intrinsic_size: Size,
    limits: ZoomLimits,
}

impl ViewTransform {
    /// Create an identity view for an image rendered at `display_size`.
    pub fn new(display_size: Size, intrinsic_size: Size) -> Self {
        let mut transform = Self {
            zoom: zoom::MIN,
            pan: Point::default(),
            display_size,
            intrinsic_size: fallback_size(),
            limits: ZoomLimits::default(),
        };
        transform.set_intrinsic_size(intrinsic_size);
        transform
    }

    pub fn with_limits(mut self, limits: ZoomLimits) -> Self {
        self.limits = limits;
        self.zoom = limits.clamp(self.zoom);
        self
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn display_size(&self) -> Size {
        self.display_size
    }

    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic_size
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            zoom: self.zoom,
            pan: self.pan,
        }
    }

    /// Update the rendered size, e.g. after the host re-laid out the image.
    pub fn set_display_size(&mut self, display_size: Size) {
        self.display_size = display_size;
    }

    /// Update the backend image size. Invalid sizes fall back to the default.
    pub fn set_intrinsic_size(&mut self, intrinsic_size: Size) {
        if intrinsic_size.is_valid() {
            self.intrinsic_size = intrinsic_size;
        } else {
            log::warn!(
                "Invalid intrinsic image size {:?}, assuming {:?}",
                intrinsic_size,
                FALLBACK_IMAGE_SIZE
            );
            self.intrinsic_size = fallback_size();
        }
    }

    /// Display pixels per model unit on each axis.
    ///
    /// An axis without a usable display size maps 1:1.
    pub fn scale(&self) -> (f32, f32) {
        let axis = |display: f32, intrinsic: f32| {
            if display > 0.0 && display.is_finite() {
                display / intrinsic
            } else {
                1.0
            }
        };
        (
            axis(self.display_size.width, self.intrinsic_size.width),
            axis(self.display_size.height, self.intrinsic_size.height),
        )
    }

    /// Screen to model, without clamping to the image.
    pub fn to_model_unclamped(&self, screen: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            (screen.x - self.pan.x) / self.zoom / sx,
            (screen.y - self.pan.y) / self.zoom / sy,
        )
    }

    /// Screen to model, clamped to `[0, intrinsic]` on each axis.
    pub fn to_model(&self, screen: Point) -> Point {
        let p = self.to_model_unclamped(screen);
        Point::new(
            p.x.clamp(0.0, self.intrinsic_size.width),
            p.y.clamp(0.0, self.intrinsic_size.height),
        )
    }

    pub fn to_screen(&self, model: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            model.x * sx * self.zoom + self.pan.x,
            model.y * sy * self.zoom + self.pan.y,
        )
    }

    pub fn to_screen_rect(&self, model: &Rect) -> Rect {
        let top_left = self.to_screen(Point::new(model.x, model.y));
        let bottom_right = self.to_screen(Point::new(model.right(), model.bottom()));
        Rect::from_corners(top_left, bottom_right)
    }

    /// Convert a screen-space distance to model units on each axis.
    pub fn model_delta(&self, screen_dx: f32, screen_dy: f32) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (screen_dx / self.zoom / sx, screen_dy / self.zoom / sy)
    }

    /// Zoom in or out by one step, keeping the pan offset.
    pub fn zoom_step(&mut self, direction: ZoomDirection) {
        let delta = match direction {
            ZoomDirection::In => self.limits.step,
            ZoomDirection::Out => -self.limits.step,
        };
        self.zoom = self.limits.clamp(self.zoom + delta);
    }

    /// Zoom-tool click: step in, or wrap back to the minimum at the maximum,
    /// keeping the model point under `anchor` fixed on screen.
    pub fn focal_zoom(&mut self, anchor: Point) {
        let new_zoom = if self.zoom >= self.limits.max {
            self.limits.min
        } else {
            self.limits.clamp(self.zoom + self.limits.step)
        };
        self.zoom_about(new_zoom, anchor);
    }

    /// Set the zoom level while keeping the model point under `anchor` fixed.
    ///
    /// The anchor offset is measured from the transform origin (`pan`), so
    /// `pan' = pan - offset * (ratio - 1)` leaves `to_model(anchor)` unchanged.
    pub fn zoom_about(&mut self, new_zoom: f32, anchor: Point) {
        let new_zoom = self.limits.clamp(new_zoom);
        let ratio = new_zoom / self.zoom;
        let offset_x = anchor.x - self.pan.x;
        let offset_y = anchor.y - self.pan.y;

        self.pan = Point::new(
            self.pan.x - offset_x * (ratio - 1.0),
            self.pan.y - offset_y * (ratio - 1.0),
        );
        self.zoom = new_zoom;
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    /// Apply a pan delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan = Point::new(self.pan.x + dx, self.pan.y + dy);
    }

    /// Back to identity zoom and no pan.
    pub fn reset(&mut self) {
        self.zoom = self.limits.min;
        self.pan = Point::default();
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        let size = fallback_size();
        Self::new(size, size)
    }
}

fn fallback_size() -> Size {
    Size::new(FALLBACK_IMAGE_SIZE.0, FALLBACK_IMAGE_SIZE.1)
}
