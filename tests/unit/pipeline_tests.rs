/*!
 * Unit tests for the parallel translation pipeline.
 */

use std::sync::Arc;

use parking_lot::Mutex;

use yattai::pipeline::translate_segments_parallel;
use yattai::providers::mock::MockTranslator;

use crate::common::make_segments;

#[test]
fn test_pipeline_unevenLatency_shouldKeepPositionalOrder() {
    let segments = make_segments(12);
    let translator = MockTranslator::reverse_latency(3);

    let (results, stats) =
        translate_segments_parallel(&segments, &translator, 4, None).unwrap();

    assert_eq!(results.len(), segments.len());
    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(results[i], MockTranslator::expected_translation(segment));
    }
    assert_eq!(stats.segments_total, 12);
    assert_eq!(stats.workers_used, 4);
}

#[test]
fn test_pipeline_moreWorkersThanSegments_shouldClampWorkerCount() {
    let segments = make_segments(3);
    let translator = MockTranslator::working();

    let (_, stats) = translate_segments_parallel(&segments, &translator, 100, None).unwrap();

    assert_eq!(stats.workers_used, 3);
    assert_eq!(translator.clones(), 3);
}

#[test]
fn test_pipeline_zeroRequestedWorkers_shouldUseOne() {
    let segments = make_segments(5);
    let translator = MockTranslator::working();

    let (_, stats) = translate_segments_parallel(&segments, &translator, 0, None).unwrap();

    assert_eq!(stats.workers_used, 1);
}

#[test]
fn test_pipeline_everySegmentTranslatedExactlyOnce() {
    let segments = make_segments(40);
    let translator = MockTranslator::working();

    let (results, _) = translate_segments_parallel(&segments, &translator, 8, None).unwrap();

    assert_eq!(results.len(), 40);
    assert_eq!(translator.calls(), 40);
}

#[test]
fn test_pipeline_midRunFailure_shouldFailFastWithFirstError() {
    let segments = make_segments(5);
    let translator = MockTranslator::failing_at(2);

    let err = translate_segments_parallel(&segments, &translator, 2, None).unwrap_err();

    assert!(err.to_string().contains("mock failure at segment 2"), "got: {}", err);
}

#[test]
fn test_pipeline_allFailing_shouldRetainOnlyOneError() {
    let segments = make_segments(6);
    let translator = MockTranslator::failing();

    let err = translate_segments_parallel(&segments, &translator, 3, None).unwrap_err();

    assert!(err.to_string().contains("mock engine always fails"));
}

#[test]
fn test_pipeline_emptyInput_shouldSucceedWithoutWorkers() {
    let translator = MockTranslator::working();

    let (results, stats) = translate_segments_parallel(&[], &translator, 4, None).unwrap();

    assert!(results.is_empty());
    assert_eq!(stats.segments_total, 0);
    assert_eq!(stats.workers_used, 0);
    assert_eq!(stats.wall_time.as_millis(), 0);
    assert_eq!(stats.segments_per_second, 0.0);
    assert_eq!(translator.clones(), 0);
}

#[test]
fn test_pipeline_uncloneableEngine_shouldFail() {
    let segments = make_segments(3);
    let translator = MockTranslator::unclonable();

    let err = translate_segments_parallel(&segments, &translator, 2, None).unwrap_err();

    assert!(err.to_string().contains("cannot be duplicated"));
}

#[test]
fn test_pipeline_progressCallback_shouldReportTerminalCount() {
    let segments = make_segments(6);
    let translator = MockTranslator::new(yattai::providers::mock::MockBehavior::Slow { delay_ms: 30 });

    let reported: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let callback = move |done: usize, total: usize| {
        assert_eq!(total, 6);
        sink.lock().push(done);
    };

    let (results, _) =
        translate_segments_parallel(&segments, &translator, 2, Some(&callback)).unwrap();
    assert_eq!(results.len(), 6);

    let reported = reported.lock();
    assert!(!reported.is_empty());
    assert_eq!(*reported.last().unwrap(), 6, "terminal count must be reported");
    for window in reported.windows(2) {
        assert!(window[0] <= window[1], "progress must be monotonic: {:?}", *reported);
    }
}

#[test]
fn test_pipeline_successStats_shouldDeriveThroughput() {
    let segments = make_segments(4);
    let translator = MockTranslator::new(yattai::providers::mock::MockBehavior::Slow { delay_ms: 10 });

    let (_, stats) = translate_segments_parallel(&segments, &translator, 2, None).unwrap();

    assert!(stats.wall_time.as_millis() >= 20);
    assert!(stats.segments_per_second > 0.0);
    assert!(stats.ms_per_segment > 0.0);
}
