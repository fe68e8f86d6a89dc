//! Cancellable analysis runs.
//!
//! A run is a future the host drives on whatever executor it has; the
//! [`CancelHandle`] lets another part of the host abandon it. A cancelled run
//! resolves to [`AnalysisOutcome::Cancelled`] and its result, if one still
//! arrives, is dropped.

use std::future::Future;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, Aborted};
use web_time::Instant;

use super::error::DetectionError;
use super::response::DetectionResponse;
use super::service::{AnalysisRequest, DetectionService};

/// How a run ended.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed {
        result: Result<DetectionResponse, DetectionError>,
        /// Wall time from the first poll until the service answered.
        elapsed: Duration,
    },
    Cancelled,
}

/// Cancels the [`AnalysisTask`] it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    pub fn cancel(&self) {
        log::info!("Analysis cancelled");
        self.0.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_aborted()
    }
}

/// A pending analysis run.
pub struct AnalysisTask<F> {
    request: AnalysisRequest,
    future: Abortable<F>,
}

impl<F> AnalysisTask<F>
where
    F: Future<Output = Result<DetectionResponse, DetectionError>>,
{
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Drive the run to completion or cancellation.
    pub async fn run(self) -> AnalysisOutcome {
        let started = Instant::now();
        match self.future.await {
            Ok(result) => {
                let elapsed = started.elapsed();
                log::info!(
                    "Analysis of {:?} finished in {:.2}s",
                    self.request.candidate,
                    elapsed.as_secs_f32()
                );
                AnalysisOutcome::Completed { result, elapsed }
            }
            Err(Aborted) => AnalysisOutcome::Cancelled,
        }
    }
}

/// Start an analysis on `service`.
pub fn start<S: DetectionService>(
    service: &S,
    request: &AnalysisRequest,
) -> (
    AnalysisTask<impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static>,
    CancelHandle,
) {
    let (handle, registration) = AbortHandle::new_pair();
    let future = Abortable::new(service.analyze(request), registration);
    let task = AnalysisTask {
        request: request.clone(),
        future,
    };
    (task, CancelHandle(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    struct FixedService(DetectionResponse);

    impl DetectionService for FixedService {
        fn analyze(
            &self,
            _request: &AnalysisRequest,
        ) -> impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static {
            future::ready(Ok(self.0.clone()))
        }
    }

    /// Never answers.
    struct StalledService;

    impl DetectionService for StalledService {
        fn analyze(
            &self,
            _request: &AnalysisRequest,
        ) -> impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static {
            future::pending()
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("baseline.png", "candidate.png")
    }

    #[test]
    fn test_completed_run_returns_response() {
        let response = DetectionResponse {
            boxes: vec![[1.0, 2.0, 3.0, 4.0]],
            ..Default::default()
        };
        let (task, handle) = start(&FixedService(response.clone()), &request());
        assert_eq!(task.request().candidate, std::path::PathBuf::from("candidate.png"));

        match pollster::block_on(task.run()) {
            AnalysisOutcome::Completed { result, .. } => {
                assert_eq!(result.expect("response"), response)
            }
            AnalysisOutcome::Cancelled => panic!("run was not cancelled"),
        }
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancel_before_completion() {
        let (task, handle) = start(&StalledService, &request());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(
            pollster::block_on(task.run()),
            AnalysisOutcome::Cancelled
        ));
    }

    #[test]
    fn test_cancel_from_cloned_handle() {
        let (task, handle) = start(&StalledService, &request());
        let other = handle.clone();
        other.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(
            pollster::block_on(task.run()),
            AnalysisOutcome::Cancelled
        ));
    }
}
