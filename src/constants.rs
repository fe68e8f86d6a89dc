//! Global constants for the annotation engine.
//!
//! Most of these are the defaults for [`crate::config::InteractionConfig`] and
//! [`crate::config::AnalysisConfig`]; the engine reads the configured values at runtime.

/// Zoom-related limits and increments.
pub mod zoom {
    /// Lowest zoom level (fit to viewport)
    pub const MIN: f32 = 1.0;
    /// Highest zoom level
    pub const MAX: f32 = 3.0;
    /// Increment applied by zoom buttons and zoom-tool clicks
    pub const STEP: f32 = 0.5;
}

/// Minimum width and height of any annotation, in model units.
pub const MIN_REGION_SIZE: f32 = 5.0;

/// Radius around a resize handle that counts as a hit, in screen pixels.
pub const HANDLE_HIT_RADIUS: f32 = 6.0;

/// Image dimensions assumed when the detection service does not report any.
pub const FALLBACK_IMAGE_SIZE: (f32, f32) = (1000.0, 1000.0);

/// Actor recorded for manual annotations when no operator is configured.
pub const DEFAULT_OPERATOR: &str = "Manual User";
