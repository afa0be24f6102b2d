//! Session-level views handed to the presentation layer.
//!
//! - `SessionAggregate`: running totals folded from every `AnalysisResult`
//! - `ExerciseSet`: a run of consecutive results for one exercise
//! - `WorkoutSummary`: the final record produced when a workout ends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AnalysisResult, ExerciseKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionAggregate {
    pub total_reps: u32,
    pub sum_form_score: f64,
    pub frame_count: u64,
    pub started_at: DateTime<Utc>,
    pub low_confidence_frames: u64,
    pub reps_by_exercise: BTreeMap<ExerciseKind, u32>,
    pub last_timestamp_ms: Option<u64>,
}

impl SessionAggregate {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            total_reps: 0,
            sum_form_score: 0.0,
            frame_count: 0,
            started_at,
            low_confidence_frames: 0,
            reps_by_exercise: BTreeMap::new(),
            last_timestamp_ms: None,
        }
    }

    /// Folds one more result in. Reps are taken from `rep_completed` so that
    /// switching between analyzers never double counts their cumulative totals.
    pub fn accumulate(mut self, result: &AnalysisResult) -> Self {
        self.frame_count += 1;
        self.sum_form_score += result.form_score;
        if result.low_confidence {
            self.low_confidence_frames += 1;
        }
        if result.rep_completed {
            self.total_reps += 1;
            *self.reps_by_exercise.entry(result.exercise).or_insert(0) += 1;
        }
        self.last_timestamp_ms = Some(result.timestamp_ms);
        self
    }

    pub fn average_form(&self) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.sum_form_score / self.frame_count as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub exercise: ExerciseKind,
    pub first_timestamp_ms: u64,
    pub last_timestamp_ms: u64,
    pub reps: u32,
    pub frame_count: u64,
    pub sum_form_score: f64,
    /// Hold time gained during this set only.
    pub hold_ms: u64,
    /// Analyzer's running hold total at the latest frame of the set.
    #[serde(skip)]
    analyzer_hold_ms: u64,
}

impl ExerciseSet {
    pub fn start(result: &AnalysisResult) -> Self {
        Self {
            exercise: result.exercise,
            first_timestamp_ms: result.timestamp_ms,
            last_timestamp_ms: result.timestamp_ms,
            reps: u32::from(result.rep_completed),
            frame_count: 1,
            sum_form_score: result.form_score,
            hold_ms: 0,
            analyzer_hold_ms: result.hold_ms,
        }
    }

    pub fn extend(&mut self, result: &AnalysisResult) {
        self.last_timestamp_ms = result.timestamp_ms;
        self.frame_count += 1;
        self.sum_form_score += result.form_score;
        if result.rep_completed {
            self.reps += 1;
        }
        // A running total below the last one means the analyzer was reset.
        let gained = if result.hold_ms >= self.analyzer_hold_ms {
            result.hold_ms - self.analyzer_hold_ms
        } else {
            result.hold_ms
        };
        self.hold_ms += gained;
        self.analyzer_hold_ms = result.hold_ms;
    }

    pub fn duration_ms(&self) -> u64 {
        self.last_timestamp_ms.saturating_sub(self.first_timestamp_ms)
    }

    pub fn average_form(&self) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.sum_form_score / self.frame_count as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub total_reps: u32,
    pub average_form: f64,
    pub low_confidence_frames: u64,
    pub sets: Vec<ExerciseSet>,
    pub estimated_calories: f64,
}
