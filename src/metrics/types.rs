use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ExerciseKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FrameOutcome {
    #[serde(rename_all = "camelCase")]
    Analyzed { rep_completed: bool },
    LowConfidence,
    Rejected { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetrics {
    pub timestamp: DateTime<Utc>,
    pub frame_timestamp_ms: u64,
    pub exercise: Option<ExerciseKind>,
    pub process_us: u64,
    /// Frames still waiting when this one finished.
    pub queue_depth: usize,
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub recent_frames: Vec<FrameMetrics>,
    pub processed_count: u64,
    pub dropped_count: u64,
    pub rejected_count: u64,
    pub low_confidence_count: u64,
    pub average_process_us: f64,
}
