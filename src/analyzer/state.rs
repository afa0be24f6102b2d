use serde::{Deserialize, Serialize};

use super::config::ExerciseConfig;
use crate::error::{EngineResult, FrameDefect};
use crate::feedback::{synthesize, visibility_cue};
use crate::models::{AnalysisResult, FormGrade, MotionPattern, PhaseState, PoseFrame};
use crate::scoring::{FormScorer, NEUTRAL_FORM_SCORE};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Everything an analyzer remembers between frames.
///
/// `step` never mutates `self`; callers swap in the returned state, so a
/// rejected frame leaves the previous state untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerState {
    pub phase: PhaseState,
    pub rep_count: u32,
    /// Last frame whose tracked landmarks passed the confidence gate.
    pub last_frame: Option<PoseFrame>,
    /// Timestamp of the last accepted frame, gated or not.
    pub last_timestamp_ms: Option<u64>,
    pub hold_ms: u64,
}

impl AnalyzerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(
        &self,
        config: &ExerciseConfig,
        landmark_count: usize,
        scorer: &dyn FormScorer,
        frame: &PoseFrame,
    ) -> EngineResult<(AnalyzerState, AnalysisResult)> {
        frame.validate(landmark_count)?;
        if let Some(previous_ms) = self.last_timestamp_ms {
            if frame.timestamp_ms < previous_ms {
                return Err(FrameDefect::OutOfOrder {
                    previous_ms,
                    current_ms: frame.timestamp_ms,
                }
                .into());
            }
        }

        let mut next = AnalyzerState {
            phase: self.phase,
            rep_count: self.rep_count,
            last_frame: None,
            last_timestamp_ms: Some(frame.timestamp_ms),
            hold_ms: self.hold_ms,
        };

        let reliable = frame.all_reliable(&config.tracked_landmarks, config.min_confidence);
        let raw_score = bounded_score(
            config,
            frame,
            scorer.score(frame, self.last_frame.as_ref()),
        );
        let mut rep_completed = false;

        if reliable {
            match config.motion {
                MotionPattern::Repetition => {
                    if let Some(delta) = self.tracked_delta(config, frame) {
                        rep_completed = next.apply_delta(delta, config.threshold);
                    }
                }
                MotionPattern::Isometric => {
                    next.phase = PhaseState::Hold;
                    next.hold_ms += self.consecutive_hold_ms(frame);
                }
            }
            next.last_frame = Some(frame.clone());
        } else {
            // Keep comparing against the last trustworthy position.
            next.last_frame = self.last_frame.clone();
        }

        let (form_score, feedback) = if reliable {
            (raw_score, synthesize(raw_score, &config.feedback))
        } else {
            let confidence = f64::from(frame.mean_confidence(&config.tracked_landmarks));
            (raw_score * confidence, vec![visibility_cue()])
        };

        if rep_completed {
            log_debug!(
                "{} rep {} completed at {}ms (score {:.1})",
                config.kind,
                next.rep_count,
                frame.timestamp_ms,
                form_score
            );
        }

        let result = AnalysisResult {
            exercise: config.kind,
            timestamp_ms: frame.timestamp_ms,
            rep_count: next.rep_count,
            rep_completed,
            form_score,
            grade: FormGrade::from_score(form_score),
            feedback,
            phase: next.phase,
            low_confidence: !reliable,
            hold_ms: next.hold_ms,
        };

        Ok((next, result))
    }

    /// Vertical displacement of the tracked segment since the reference frame.
    fn tracked_delta(&self, config: &ExerciseConfig, frame: &PoseFrame) -> Option<f32> {
        let previous = self.last_frame.as_ref()?;
        let current_y = frame.tracked_y(&config.tracked_landmarks)?;
        let previous_y = previous.tracked_y(&config.tracked_landmarks)?;
        Some(current_y - previous_y)
    }

    /// Hysteresis transition. Returns true when a down→up cycle completes.
    fn apply_delta(&mut self, delta: f32, threshold: f32) -> bool {
        if delta > threshold && self.phase != PhaseState::Down {
            self.phase = PhaseState::Down;
            false
        } else if delta < -threshold && self.phase == PhaseState::Down {
            self.phase = PhaseState::Up;
            self.rep_count += 1;
            true
        } else {
            false
        }
    }

    /// Time since the previous frame, counted only if that frame was reliable too.
    fn consecutive_hold_ms(&self, frame: &PoseFrame) -> u64 {
        match (&self.last_frame, self.last_timestamp_ms) {
            (Some(reference), Some(last_ms)) if reference.timestamp_ms == last_ms => {
                frame.timestamp_ms.saturating_sub(last_ms)
            }
            _ => 0,
        }
    }
}

/// Clamps a scorer's output to [0, 100]; NaN and infinities become neutral.
fn bounded_score(config: &ExerciseConfig, frame: &PoseFrame, score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        log_warn!(
            "{} scorer returned {} at {}ms, using neutral score",
            config.kind,
            score,
            frame.timestamp_ms
        );
        NEUTRAL_FORM_SCORE
    }
}
