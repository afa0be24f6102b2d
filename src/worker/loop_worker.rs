use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::metrics::{FrameMetrics, FrameOutcome, MetricsCollector};
use crate::models::{AnalysisResult, PoseFrame};
use crate::registry::Workout;

use super::queue::{FrameQueue, QueueItem};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Feeds queued frames through the workout one at a time until cancelled or
/// until the queue is closed and empty. Queued exercise switches take effect
/// between the frames they were enqueued between.
pub async fn analysis_loop(
    workout: Arc<Mutex<Workout>>,
    queue: Arc<FrameQueue>,
    results: mpsc::Sender<AnalysisResult>,
    metrics: MetricsCollector,
    cancel_token: CancellationToken,
) {
    log_info!("analysis loop started (queue capacity {})", queue.capacity());
    let mut receiver_gone = false;

    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("analysis loop shutting down");
                break;
            }
            next = queue.pop() => match next {
                Some(QueueItem::Frame(frame)) => frame,
                Some(QueueItem::Select(kind)) => {
                    if let Err(err) = workout.lock().await.select_exercise(kind) {
                        log_warn!("queued switch to {kind} failed: {err}");
                    }
                    continue;
                }
                None => {
                    log_info!("frame queue drained, analysis loop exiting");
                    break;
                }
            },
        };

        let Some(result) = analyze_frame(&workout, &queue, &metrics, frame).await else {
            continue;
        };

        if receiver_gone {
            continue;
        }
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("analysis loop shutting down");
                break;
            }
            sent = results.send(result) => {
                if sent.is_err() {
                    log_warn!("result receiver dropped; analysis continues without publishing");
                    receiver_gone = true;
                }
            }
        }
    }
}

async fn analyze_frame(
    workout: &Mutex<Workout>,
    queue: &FrameQueue,
    metrics: &MetricsCollector,
    frame: PoseFrame,
) -> Option<AnalysisResult> {
    let started = Instant::now();
    let (exercise, outcome) = {
        let mut guard = workout.lock().await;
        (guard.active(), guard.process(&frame))
    };
    let process_us = started.elapsed().as_micros() as u64;

    let (recorded, result) = match outcome {
        Ok(result) => {
            let recorded = if result.low_confidence {
                FrameOutcome::LowConfidence
            } else {
                FrameOutcome::Analyzed {
                    rep_completed: result.rep_completed,
                }
            };
            (recorded, Some(result))
        }
        Err(err) => {
            log_warn!("frame at {}ms rejected: {err}", frame.timestamp_ms);
            (
                FrameOutcome::Rejected {
                    reason: err.to_string(),
                },
                None,
            )
        }
    };

    log_debug!(
        "frame {}ms processed in {}us ({} queued)",
        frame.timestamp_ms,
        process_us,
        queue.len()
    );

    metrics
        .record_frame(FrameMetrics {
            timestamp: Utc::now(),
            frame_timestamp_ms: frame.timestamp_ms,
            exercise,
            process_us,
            queue_depth: queue.len(),
            outcome: recorded,
        })
        .await;

    result
}
