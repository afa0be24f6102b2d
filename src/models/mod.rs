pub mod analysis;
pub mod exercise;
pub mod frame;
pub mod session;

pub use analysis::{AnalysisResult, FormGrade, PhaseState};
pub use exercise::{Difficulty, ExerciseCategory, ExerciseKind, ExerciseTarget, MotionPattern};
pub use frame::{BodyLandmark, Landmark, PoseFrame};
pub use session::{ExerciseSet, SessionAggregate, WorkoutSummary};
