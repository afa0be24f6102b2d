mod types;

pub use types::{FrameMetrics, FrameOutcome, MetricsSnapshot};

use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_RECENT_FRAMES: usize = 20;

pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

#[derive(Default)]
struct MetricsState {
    recent_frames: Vec<FrameMetrics>,
    processed_count: u64,
    dropped_count: u64,
    rejected_count: u64,
    low_confidence_count: u64,
    total_process_us: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState {
                recent_frames: Vec::with_capacity(MAX_RECENT_FRAMES),
                ..MetricsState::default()
            })),
        }
    }

    pub async fn record_frame(&self, metrics: FrameMetrics) {
        let mut state = self.inner.lock().await;

        match metrics.outcome {
            FrameOutcome::Rejected { .. } => state.rejected_count += 1,
            FrameOutcome::LowConfidence => {
                state.processed_count += 1;
                state.low_confidence_count += 1;
            }
            FrameOutcome::Analyzed { .. } => state.processed_count += 1,
        }
        state.total_process_us += metrics.process_us;

        state.recent_frames.push(metrics);

        if state.recent_frames.len() > MAX_RECENT_FRAMES {
            state.recent_frames.remove(0);
        }
    }

    /// A frame evicted from the queue before it was analyzed.
    pub async fn record_dropped(&self) {
        self.inner.lock().await.dropped_count += 1;
    }

    pub async fn get_snapshot(&self) -> MetricsSnapshot {
        let state = self.inner.lock().await;
        let handled = state.processed_count + state.rejected_count;

        MetricsSnapshot {
            recent_frames: state.recent_frames.clone(),
            processed_count: state.processed_count,
            dropped_count: state.dropped_count,
            rejected_count: state.rejected_count,
            low_confidence_count: state.low_confidence_count,
            average_process_us: if handled == 0 {
                0.0
            } else {
                state.total_process_us as f64 / handled as f64
            },
        }
    }

    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        *state = MetricsState::default();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MetricsCollector {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
