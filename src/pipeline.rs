/*!
 * Parallel translation pipeline.
 *
 * Distributes a document's segments across a pool of worker threads. Work is
 * claimed from a single shared cursor, so load balances itself under uneven
 * per-segment latency, and every result lands in the slot matching its
 * segment index regardless of completion order. The first engine error stops
 * the run; partial results are never returned.
 */

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

use crate::errors::PipelineError;
use crate::providers::Translator;
use crate::tei_processor::Segment;

/// Poll period of the progress reporter thread
const REPORT_INTERVAL: Duration = Duration::from_millis(100);

/// Timing and throughput for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct TranslationStats {
    /// Number of segments submitted
    pub segments_total: usize,
    /// Worker threads actually spawned
    pub workers_used: usize,
    /// Wall time of the run
    pub wall_time: Duration,
    /// Throughput in segments per second (0 when elapsed is 0)
    pub segments_per_second: f64,
    /// Average milliseconds spent per segment
    pub ms_per_segment: f64,
}

/// Progress observer: called with (completed, total)
pub type ProgressCallback<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// Translate all segments using up to `requested_workers` worker threads.
///
/// Each worker holds its own clone of `prototype`. Worker count is clamped
/// to the segment count; zero requested means one. The optional callback is
/// driven from a dedicated reporter thread that polls the completed count
/// every 100ms, fires only on change, and always reports the terminal count
/// once after the workers join.
///
/// On failure the first error is returned and all partial translations are
/// discarded.
pub fn translate_segments_parallel(
    segments: &[Segment],
    prototype: &dyn Translator,
    requested_workers: usize,
    progress: Option<ProgressCallback<'_>>,
) -> Result<(Vec<String>, TranslationStats), PipelineError> {
    let mut stats = TranslationStats {
        segments_total: segments.len(),
        ..Default::default()
    };

    if segments.is_empty() {
        return Ok((Vec::new(), stats));
    }

    let workers_used = requested_workers.max(1).min(segments.len());
    stats.workers_used = workers_used;
    debug!("Translating {} segments with {} workers", segments.len(), workers_used);

    // One slot per segment; the claim cursor guarantees a single writer each.
    let slots: Vec<OnceLock<String>> = (0..segments.len()).map(|_| OnceLock::new()).collect();
    let next_index = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let workers_done = AtomicBool::new(false);
    let first_error: Mutex<Option<String>> = Mutex::new(None);

    let started = Instant::now();

    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(workers_used);
        for _ in 0..workers_used {
            workers.push(scope.spawn(|| {
                let mut local_translator = match prototype.clone_box() {
                    Ok(translator) => translator,
                    Err(e) => {
                        record_failure(&failed, &first_error, e.to_string());
                        return;
                    }
                };

                while !failed.load(Ordering::Relaxed) {
                    let index = next_index.fetch_add(1, Ordering::Relaxed);
                    if index >= segments.len() {
                        return;
                    }

                    match local_translator.translate(&segments[index]) {
                        Ok(text) => {
                            let _ = slots[index].set(text);
                            completed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            record_failure(&failed, &first_error, e.to_string());
                            return;
                        }
                    }
                }
            }));
        }

        let reporter = progress.map(|callback| {
            let workers_done = &workers_done;
            let completed = &completed;
            let total = segments.len();
            scope.spawn(move || {
                let mut last_reported = usize::MAX;
                while !workers_done.load(Ordering::Relaxed) {
                    let done = completed.load(Ordering::Relaxed);
                    if done != last_reported {
                        callback(done, total);
                        last_reported = done;
                    }
                    thread::sleep(REPORT_INTERVAL);
                }
                // Terminal count is reported exactly once even if it tied
                // with the last polled value.
                let final_done = completed.load(Ordering::Relaxed);
                if final_done != last_reported {
                    callback(final_done, total);
                }
            })
        });

        for worker in workers {
            let _ = worker.join();
        }
        workers_done.store(true, Ordering::Relaxed);
        if let Some(reporter) = reporter {
            let _ = reporter.join();
        }
    });

    if failed.load(Ordering::Relaxed) {
        let message = first_error
            .lock()
            .take()
            .unwrap_or_else(|| "Unknown translation error".to_string());
        return Err(PipelineError::TranslationFailed(message));
    }

    stats.wall_time = started.elapsed();
    let wall_seconds = stats.wall_time.as_secs_f64();
    if wall_seconds > 0.0 {
        stats.segments_per_second = segments.len() as f64 / wall_seconds;
    }
    stats.ms_per_segment = wall_seconds * 1000.0 / segments.len() as f64;

    let results = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.into_inner().ok_or_else(|| {
                PipelineError::TranslationFailed(format!("Missing translation for segment {}", index))
            })
        })
        .collect::<Result<Vec<String>, PipelineError>>()?;

    Ok((results, stats))
}

/// First failure wins; later reporters only confirm the stop flag.
fn record_failure(failed: &AtomicBool, first_error: &Mutex<Option<String>>, message: String) {
    if !failed.swap(true, Ordering::Relaxed) {
        *first_error.lock() = Some(message);
    }
}
