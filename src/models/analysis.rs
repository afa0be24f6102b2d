use serde::{Deserialize, Serialize};

use super::ExerciseKind;

/// Where the tracked body segment is within a repetition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PhaseState {
    Up,
    Down,
    Hold,
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState::Hold
    }
}

/// Coarse label for a form score, as shown on the live overlay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FormGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl FormGrade {
    pub fn from_score(score: f64) -> Self {
        if score > 90.0 {
            FormGrade::Excellent
        } else if score > 80.0 {
            FormGrade::Good
        } else if score > 70.0 {
            FormGrade::Fair
        } else {
            FormGrade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormGrade::Excellent => "Perfect Form!",
            FormGrade::Good => "Good Form",
            FormGrade::Fair => "Adjust Posture",
            FormGrade::Poor => "Check Form",
        }
    }
}

/// Outcome of processing one frame. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub exercise: ExerciseKind,
    pub timestamp_ms: u64,
    /// Cumulative since the analyzer was created or last reset.
    pub rep_count: u32,
    /// True only on the frame that completed a down→up cycle.
    pub rep_completed: bool,
    pub form_score: f64,
    pub grade: FormGrade,
    pub feedback: Vec<String>,
    pub phase: PhaseState,
    /// Tracked landmarks were below the confidence floor; no transition was
    /// attempted and the score is degraded.
    pub low_confidence: bool,
    /// Time under tension for isometric exercises.
    pub hold_ms: u64,
}
