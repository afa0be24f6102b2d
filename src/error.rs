use thiserror::Error;

/// Failures surfaced to the caller of the analysis engine.
///
/// Low-confidence frames are deliberately absent: they produce a degraded
/// [`AnalysisResult`](crate::models::AnalysisResult) rather than an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameDefect),

    #[error("unknown exercise kind '{0}'")]
    UnknownExerciseKind(String),

    #[error("no exercise selected")]
    NoActiveExercise,

    #[error("invalid config for {kind}: {reason}")]
    InvalidConfig { kind: String, reason: String },
}

/// What exactly was wrong with a rejected frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameDefect {
    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("landmark at position {position} carries index {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("timestamp {current_ms}ms precedes previous frame at {previous_ms}ms")]
    OutOfOrder { previous_ms: u64, current_ms: u64 },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("landmark {index} confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange { index: usize, confidence: f32 },
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_defect_converts_into_invalid_frame() {
        let err: EngineError = FrameDefect::LandmarkCount {
            expected: 33,
            actual: 17,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid frame: expected 33 landmarks, got 17"
        );
    }

    #[test]
    fn test_unknown_kind_message() {
        let err = EngineError::UnknownExerciseKind("jumping_jacks".into());
        assert_eq!(err.to_string(), "unknown exercise kind 'jumping_jacks'");
    }
}
