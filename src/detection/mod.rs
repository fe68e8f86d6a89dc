//! Detection service boundary.
//!
//! - [`response`]: the JSON document a run produces
//! - [`adapter`]: conversion into store entries
//! - [`service`]: the service trait and the script-backed detector
//! - [`task`]: cancellable runs with timing

pub mod adapter;
pub mod error;
pub mod response;
pub mod service;
pub mod task;

pub use adapter::{AnalysisSummary, DetectedBatch, adapt};
pub use error::DetectionError;
pub use response::{BoxInfo, DetectionResponse};
pub use service::{AnalysisRequest, DetectionService, ScriptDetector};
pub use task::{AnalysisOutcome, AnalysisTask, CancelHandle, start};
