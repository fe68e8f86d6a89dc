//! Applying analysis results and the busy state around them.

use std::future::Future;
use std::time::Duration;

use futures::future;

use super::{approx_eq, controller, drag};
use crate::config::EngineConfig;
use crate::detection::{
    AnalysisOutcome, AnalysisRequest, BoxInfo, DetectionError, DetectionResponse,
    DetectionService,
};
use crate::interaction::{AnalysisReport, InteractionController, InteractionError, Tool};
use crate::model::{FaultCategory, Origin, Point, Rect, Severity, Size};

fn response() -> DetectionResponse {
    DetectionResponse {
        image_width: Some(1000.0),
        image_height: Some(800.0),
        boxes: vec![[100.0, 100.0, 50.0, 50.0]],
        box_info: vec![BoxInfo {
            label: Some("Point overload".to_string()),
            ..Default::default()
        }],
        fault_type: Some("point overload".to_string()),
        prob: Some(0.81),
        ..Default::default()
    }
}

fn completed(result: Result<DetectionResponse, DetectionError>) -> AnalysisOutcome {
    AnalysisOutcome::Completed {
        result,
        elapsed: Duration::from_millis(250),
    }
}

/// Controller with one manual region drawn at (10, 10, 30, 30).
fn with_manual_region() -> InteractionController {
    let mut c = controller();
    c.select_category(FaultCategory::OilLeakage.into());
    c.set_tool(Tool::Draw).unwrap();
    drag(&mut c, (10.0, 10.0), (40.0, 40.0));
    c.set_tool(Tool::Pan).unwrap();
    c
}

#[test]
fn test_apply_detection_result() {
    let mut c = controller();
    c.begin_analysis();

    let report = c.finish_analysis(completed(Ok(response()))).expect("apply");

    match report {
        AnalysisReport::Applied {
            detected,
            elapsed,
            summary,
            used_fallback_size,
        } => {
            assert_eq!(detected, 1);
            assert_eq!(elapsed, Duration::from_millis(250));
            assert_eq!(summary.fault_type.as_deref(), Some("point overload"));
            assert_eq!(summary.probability, Some(0.81));
            assert!(!used_fallback_size);
        }
        AnalysisReport::Cancelled => panic!("expected applied report"),
    }

    let ann = &c.store().list()[0];
    assert_eq!(ann.origin(), &Origin::Detected);
    assert!(approx_eq(ann.area_fraction(), 0.003125));
    assert_eq!(ann.classification().map(|c| c.tier), Some(Severity::Low));
    assert_eq!(c.view().intrinsic_size(), Size::new(1000.0, 800.0));
    assert!(!c.is_busy());
}

#[test]
fn test_failure_leaves_store_untouched() {
    let mut c = with_manual_region();
    let before = c.snapshot_annotations();
    c.begin_analysis();

    let failed = DetectionResponse {
        error: Some("cannot open image".to_string()),
        ..Default::default()
    };
    let result = c.finish_analysis(completed(Ok(failed)));

    match result {
        Err(InteractionError::Detection(DetectionError::Service(message))) => {
            assert_eq!(message, "cannot open image")
        }
        other => panic!("expected service failure, got {:?}", other),
    }
    assert_eq!(c.snapshot_annotations(), before);
    assert!(!c.is_busy());
}

#[test]
fn test_transport_error_leaves_store_untouched() {
    let mut c = with_manual_region();
    c.begin_analysis();
    let result = c.finish_analysis(completed(Err(DetectionError::EmptyOutput)));
    assert!(matches!(
        result,
        Err(InteractionError::Detection(DetectionError::EmptyOutput))
    ));
    assert_eq!(c.store().len(), 1);
}

#[test]
fn test_cancelled_analysis_leaves_store_untouched() {
    let mut c = with_manual_region();
    c.begin_analysis();
    assert!(c.is_busy());

    let report = c.finish_analysis(AnalysisOutcome::Cancelled).unwrap();

    assert_eq!(report, AnalysisReport::Cancelled);
    assert_eq!(c.store().len(), 1);
    assert!(!c.is_busy());
}

#[test]
fn test_editing_is_locked_while_busy() {
    let mut c = with_manual_region();
    c.begin_analysis();

    assert!(matches!(
        c.set_tool(Tool::Draw),
        Err(InteractionError::ToolDisabled(Tool::Draw))
    ));
    assert!(matches!(
        c.set_tool(Tool::Adjust),
        Err(InteractionError::ToolDisabled(Tool::Adjust))
    ));
    assert!(matches!(
        c.delete_annotation(0, "alice"),
        Err(InteractionError::AnalysisPending)
    ));
    assert!(!c.store().list()[0].is_deleted());

    // Viewing stays available.
    assert!(c.set_tool(Tool::Zoom).is_ok());
    assert!(c.handle_click(Point::new(100.0, 100.0)).is_some());
}

#[test]
fn test_begin_analysis_discards_editing_gesture() {
    let mut c = with_manual_region();
    c.set_tool(Tool::Adjust).unwrap();
    c.handle_pointer_down(Point::new(20.0, 20.0)).unwrap();
    c.handle_pointer_move(Point::new(200.0, 200.0));

    c.begin_analysis();

    assert!(c.session().is_idle());
    assert_eq!(c.store().list()[0].rect(), Rect::new(10.0, 10.0, 30.0, 30.0));
    // The selected tool stays, but presses are refused until the run ends.
    assert!(matches!(
        c.handle_pointer_down(Point::new(20.0, 20.0)),
        Err(InteractionError::ToolDisabled(Tool::Adjust))
    ));
}

#[test]
fn test_applied_analysis_discards_adjust_gesture() {
    let mut c = controller();
    c.finish_analysis(completed(Ok(response()))).unwrap();
    c.set_tool(Tool::Adjust).unwrap();
    // The 1000x800 image fills a 1000x1000 display: region centre is at (125, 156.25).
    c.handle_pointer_down(Point::new(125.0, 156.0)).unwrap();
    c.handle_pointer_move(Point::new(135.0, 166.0));
    assert_eq!(c.session().name(), "move");

    // Applied without a preceding begin_analysis.
    let mut next = response();
    next.boxes = vec![[800.0, 600.0, 40.0, 40.0]];
    c.finish_analysis(completed(Ok(next))).unwrap();

    assert!(c.session().is_idle());
    assert_eq!(c.handle_pointer_up(Point::new(135.0, 166.0)).unwrap(), None);
    assert_eq!(c.store().list()[0].rect(), Rect::new(800.0, 600.0, 40.0, 40.0));
}

#[test]
fn test_begin_analysis_keeps_pan_gesture() {
    let mut c = controller();
    c.handle_pointer_down(Point::new(0.0, 0.0)).unwrap();
    c.begin_analysis();
    assert_eq!(c.session().name(), "panning");
}

#[test]
fn test_reanalysis_keeps_manual_regions() {
    let mut c = with_manual_region();
    c.delete_annotation(0, "alice").unwrap();
    c.begin_analysis();
    c.finish_analysis(completed(Ok(response()))).unwrap();

    let list = c.store().list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].origin(), &Origin::Detected);
    assert!(list[1].origin().is_manual());
    assert!(list[1].is_deleted());
    // Area is recomputed against the new 1000x800 image.
    assert!(approx_eq(list[1].area_fraction(), 900.0 / 800_000.0));
}

#[test]
fn test_reanalysis_replaces_everything_when_configured() {
    let mut config = EngineConfig::default();
    config.analysis.preserve_manual_on_reanalysis = false;
    let image = Size::new(1000.0, 1000.0);
    let mut c = InteractionController::from_config(&config, image, image);
    c.select_category(FaultCategory::OilLeakage.into());
    c.set_tool(Tool::Draw).unwrap();
    drag(&mut c, (10.0, 10.0), (40.0, 40.0));

    c.finish_analysis(completed(Ok(response()))).unwrap();

    assert_eq!(c.store().len(), 1);
    assert_eq!(c.store().list()[0].origin(), &Origin::Detected);
}

#[test]
fn test_missing_dimensions_report_fallback() {
    let mut c = controller();
    let response = DetectionResponse {
        boxes: vec![[0.0, 0.0, 100.0, 100.0]],
        ..Default::default()
    };
    match c.finish_analysis(completed(Ok(response))).unwrap() {
        AnalysisReport::Applied {
            used_fallback_size, ..
        } => assert!(used_fallback_size),
        AnalysisReport::Cancelled => panic!("expected applied report"),
    }
    assert!(approx_eq(c.store().list()[0].area_fraction(), 0.01));
}

#[test]
fn test_tiny_detection_is_widened() {
    let mut c = controller();
    let response = DetectionResponse {
        image_width: Some(1000.0),
        image_height: Some(1000.0),
        boxes: vec![[10.0, 10.0, 2.0, 3.0]],
        ..Default::default()
    };
    c.finish_analysis(completed(Ok(response))).unwrap();
    assert_eq!(c.store().list()[0].rect(), Rect::new(10.0, 10.0, 5.0, 5.0));
}

struct FixedService(DetectionResponse);

impl DetectionService for FixedService {
    fn analyze(
        &self,
        _request: &AnalysisRequest,
    ) -> impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static {
        future::ready(Ok(self.0.clone()))
    }
}

#[test]
fn test_end_to_end_with_service() {
    let mut c = controller();
    let request = AnalysisRequest::new("baseline.png", "candidate.png");
    let (task, _cancel) = crate::detection::start(&FixedService(response()), &request);

    c.begin_analysis();
    let outcome = pollster::block_on(task.run());
    c.finish_analysis(outcome).unwrap();

    assert_eq!(c.store().len(), 1);
    assert_eq!(
        c.store().list()[0].label().category(),
        Some(FaultCategory::PointOverload)
    );
}

#[test]
fn test_cancel_handle_before_run() {
    let mut c = with_manual_region();
    let request = AnalysisRequest::new("baseline.png", "candidate.png");
    let (task, cancel) = crate::detection::start(&FixedService(response()), &request);

    c.begin_analysis();
    cancel.cancel();
    let report = c.finish_analysis(pollster::block_on(task.run())).unwrap();

    assert_eq!(report, AnalysisReport::Cancelled);
    assert_eq!(c.store().len(), 1);
}
