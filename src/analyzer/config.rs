use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::feedback::{default_bands, FeedbackBand};
use crate::models::{
    BodyLandmark, Difficulty, ExerciseCategory, ExerciseKind, ExerciseTarget, MotionPattern,
};
use crate::scoring::ScoringProfile;

/// Confidence floor used by the built-in table.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Everything that makes one exercise kind behave differently from another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub kind: ExerciseKind,
    pub display_name: String,
    pub category: ExerciseCategory,
    pub difficulty: Difficulty,
    pub motion: MotionPattern,
    /// Landmarks whose mean vertical position drives phase detection.
    pub tracked_landmarks: Vec<usize>,
    /// Minimum frame-to-frame displacement that counts as movement.
    pub threshold: f32,
    pub min_confidence: f32,
    pub scoring: ScoringProfile,
    pub feedback: Vec<FeedbackBand>,
    pub target: ExerciseTarget,
    pub calories_per_minute: f64,
}

impl ExerciseConfig {
    pub fn validate(&self, landmark_count: usize) -> EngineResult<()> {
        let invalid = |reason: String| EngineError::InvalidConfig {
            kind: self.kind.to_string(),
            reason,
        };

        if let Some(&index) = self
            .tracked_landmarks
            .iter()
            .find(|&&index| index >= landmark_count)
        {
            return Err(invalid(format!(
                "tracked landmark {index} outside a {landmark_count}-point model"
            )));
        }
        if self.motion == MotionPattern::Repetition {
            if self.tracked_landmarks.is_empty() {
                return Err(invalid("no tracked landmarks".into()));
            }
            if !(self.threshold > 0.0 && self.threshold.is_finite()) {
                return Err(invalid(format!("threshold {} must be positive", self.threshold)));
            }
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(format!(
                "min confidence {} outside [0, 1]",
                self.min_confidence
            )));
        }
        if let Some(entry) = self
            .scoring
            .components
            .iter()
            .find(|entry| !(entry.weight.is_finite() && entry.weight >= 0.0))
        {
            return Err(invalid(format!(
                "{:?} weight {} must be finite and non-negative",
                entry.component, entry.weight
            )));
        }
        if self.scoring.total_weight() <= 0.0 {
            return Err(invalid("scoring profile has no positive weights".into()));
        }
        Ok(())
    }

    /// Fraction of the session target reached so far, capped at 1.
    pub fn progress(&self, rep_count: u32, hold_ms: u64) -> f64 {
        let fraction = match self.target {
            ExerciseTarget::Reps(0) | ExerciseTarget::HoldSecs(0) => 1.0,
            ExerciseTarget::Reps(reps) => f64::from(rep_count) / f64::from(reps),
            ExerciseTarget::HoldSecs(secs) => hold_ms as f64 / (f64::from(secs) * 1_000.0),
        };
        fraction.min(1.0)
    }

    pub fn builtin(kind: ExerciseKind) -> Self {
        use BodyLandmark::*;

        let hips = vec![LeftHip.index(), RightHip.index()];
        let (display_name, category, difficulty, motion, tracked, threshold, scoring, target, kcal) =
            match kind {
                ExerciseKind::Squats => (
                    "Squats",
                    ExerciseCategory::Lower,
                    Difficulty::Beginner,
                    MotionPattern::Repetition,
                    hips,
                    5.0,
                    ScoringProfile::squat(),
                    ExerciseTarget::Reps(20),
                    8.0,
                ),
                ExerciseKind::Pushups => (
                    "Push-ups",
                    ExerciseCategory::Upper,
                    Difficulty::Intermediate,
                    MotionPattern::Repetition,
                    vec![LeftShoulder.index(), RightShoulder.index()],
                    3.0,
                    ScoringProfile::pushup(),
                    ExerciseTarget::Reps(15),
                    7.0,
                ),
                ExerciseKind::Planks => (
                    "Planks",
                    ExerciseCategory::Core,
                    Difficulty::Beginner,
                    MotionPattern::Isometric,
                    hips,
                    5.0,
                    ScoringProfile::plank(),
                    ExerciseTarget::HoldSecs(30),
                    4.0,
                ),
                ExerciseKind::Lunges => (
                    "Lunges",
                    ExerciseCategory::Lower,
                    Difficulty::Intermediate,
                    MotionPattern::Repetition,
                    hips,
                    5.0,
                    ScoringProfile::lunge(),
                    ExerciseTarget::Reps(16),
                    6.0,
                ),
                ExerciseKind::Burpees => (
                    "Burpees",
                    ExerciseCategory::Cardio,
                    Difficulty::Advanced,
                    MotionPattern::Repetition,
                    hips,
                    12.0,
                    ScoringProfile::full_body(),
                    ExerciseTarget::Reps(10),
                    12.0,
                ),
                ExerciseKind::MountainClimbers => (
                    "Mountain Climbers",
                    ExerciseCategory::Cardio,
                    Difficulty::Intermediate,
                    MotionPattern::Repetition,
                    vec![LeftKnee.index(), RightKnee.index()],
                    6.0,
                    ScoringProfile::climber(),
                    ExerciseTarget::Reps(30),
                    10.0,
                ),
            };

        Self {
            kind,
            display_name: display_name.to_string(),
            category,
            difficulty,
            motion,
            tracked_landmarks: tracked,
            threshold,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            scoring,
            feedback: default_bands(kind),
            target,
            calories_per_minute: kcal,
        }
    }

    pub fn builtin_table() -> Vec<Self> {
        [
            ExerciseKind::Squats,
            ExerciseKind::Pushups,
            ExerciseKind::Planks,
            ExerciseKind::Lunges,
            ExerciseKind::Burpees,
            ExerciseKind::MountainClimbers,
        ]
        .into_iter()
        .map(Self::builtin)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid_for_33_points() {
        for config in ExerciseConfig::builtin_table() {
            assert!(config.validate(BodyLandmark::COUNT).is_ok(), "{}", config.kind);
        }
    }

    #[test]
    fn test_builtin_thresholds() {
        assert_eq!(ExerciseConfig::builtin(ExerciseKind::Squats).threshold, 5.0);
        assert_eq!(ExerciseConfig::builtin(ExerciseKind::Pushups).threshold, 3.0);
        assert!(
            ExerciseConfig::builtin(ExerciseKind::Burpees).threshold
                > ExerciseConfig::builtin(ExerciseKind::Squats).threshold
        );
    }

    #[test]
    fn test_tracked_landmark_outside_model_is_rejected() {
        let config = ExerciseConfig::builtin(ExerciseKind::Squats);
        let err = config.validate(17).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }

    #[test]
    fn test_non_positive_threshold_is_rejected() {
        let mut config = ExerciseConfig::builtin(ExerciseKind::Squats);
        config.threshold = 0.0;
        assert!(config.validate(33).is_err());

        // Holds never look at the threshold.
        let mut plank = ExerciseConfig::builtin(ExerciseKind::Planks);
        plank.threshold = 0.0;
        assert!(plank.validate(33).is_ok());
    }

    #[test]
    fn test_non_finite_weights_are_rejected() {
        for weight in [f64::INFINITY, f64::NAN, -1.0] {
            let mut config = ExerciseConfig::builtin(ExerciseKind::Squats);
            config.scoring.components[0].weight = weight;
            assert!(matches!(
                config.validate(33),
                Err(EngineError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_progress_toward_target() {
        let squats = ExerciseConfig::builtin(ExerciseKind::Squats);
        assert!((squats.progress(5, 0) - 0.25).abs() < 1e-9);
        assert_eq!(squats.progress(40, 0), 1.0);

        let plank = ExerciseConfig::builtin(ExerciseKind::Planks);
        assert!((plank.progress(0, 15_000) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ExerciseConfig::builtin(ExerciseKind::Lunges);
        let json = serde_json::to_string(&config).unwrap();
        let back: ExerciseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
