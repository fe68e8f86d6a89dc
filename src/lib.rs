//! thermview - Thermal anomaly annotation engine
//!
//! Maps between the pixel grid of a thermal image and the zoomed, panned
//! viewport it is shown in, keeps the list of anomaly regions for that image,
//! and turns pointer gestures into edits of that list. Detection runs are
//! delegated to an external service whose results replace the detected
//! regions in one step.
//!
//! The usual entry point is [`interaction::InteractionController`], driven
//! either method by method or through [`message::Message`].

pub mod config;
pub mod constants;
pub mod detection;
pub mod interaction;
pub mod message;
pub mod model;
pub mod overlay;
pub mod record;
pub mod store;
pub mod view_transform;

pub use config::EngineConfig;
pub use interaction::{InteractionController, InteractionError, Tool};
pub use message::{Message, Update};
pub use model::{Annotation, FaultCategory, FaultLabel, Point, Rect, Severity, Size};
pub use store::{AnnotationStore, ReplaceScope, StoreError};
pub use view_transform::{ViewState, ViewTransform};
