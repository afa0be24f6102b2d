use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squats,
    Pushups,
    Planks,
    Lunges,
    Burpees,
    MountainClimbers,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Squats => "squats",
            ExerciseKind::Pushups => "pushups",
            ExerciseKind::Planks => "planks",
            ExerciseKind::Lunges => "lunges",
            ExerciseKind::Burpees => "burpees",
            ExerciseKind::MountainClimbers => "mountain_climbers",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "squats" => Ok(ExerciseKind::Squats),
            "pushups" => Ok(ExerciseKind::Pushups),
            "planks" => Ok(ExerciseKind::Planks),
            "lunges" => Ok(ExerciseKind::Lunges),
            "burpees" => Ok(ExerciseKind::Burpees),
            "mountain_climbers" => Ok(ExerciseKind::MountainClimbers),
            _ => Err(EngineError::UnknownExerciseKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseCategory {
    Upper,
    Lower,
    Core,
    Cardio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// How progress through an exercise is measured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MotionPattern {
    /// Down/up cycles of the tracked segment are counted as reps.
    Repetition,
    /// A static hold; time under tension is accumulated instead of reps.
    Isometric,
}

/// Session goal shown next to the live counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseTarget {
    Reps(u32),
    HoldSecs(u32),
}
