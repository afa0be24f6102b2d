//! Coaching messages derived from a form score.
//!
//! Ranking of the returned messages is fixed:
//! 1. corrective messages before celebratory ones;
//! 2. corrective messages by ascending threshold (the band that fires only
//!    for worse scores is the more urgent one);
//! 3. celebratory messages by descending threshold;
//! 4. ties keep the order in which the bands were declared.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::ExerciseKind;

const VISIBILITY_CUE: &str = "Step back so your whole body is visible";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "when", content = "score")]
pub enum BandCondition {
    Below(f64),
    Above(f64),
    AtLeast(f64),
}

impl BandCondition {
    pub fn matches(&self, score: f64) -> bool {
        match *self {
            BandCondition::Below(t) => score < t,
            BandCondition::Above(t) => score > t,
            BandCondition::AtLeast(t) => score >= t,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            BandCondition::Below(t) | BandCondition::Above(t) | BandCondition::AtLeast(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackTone {
    Corrective,
    Celebratory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBand {
    pub condition: BandCondition,
    pub tone: FeedbackTone,
    pub message: String,
}

impl FeedbackBand {
    pub fn corrective(condition: BandCondition, message: &str) -> Self {
        Self {
            condition,
            tone: FeedbackTone::Corrective,
            message: message.to_string(),
        }
    }

    pub fn celebratory(condition: BandCondition, message: &str) -> Self {
        Self {
            condition,
            tone: FeedbackTone::Celebratory,
            message: message.to_string(),
        }
    }
}

/// Every message whose band matches `score`, in ranking order.
pub fn synthesize(score: f64, bands: &[FeedbackBand]) -> Vec<String> {
    let mut matching: Vec<&FeedbackBand> = bands
        .iter()
        .filter(|band| band.condition.matches(score))
        .collect();

    // sort_by is stable, so equal keys keep declaration order.
    matching.sort_by(|a, b| rank(a, b));
    matching.into_iter().map(|band| band.message.clone()).collect()
}

fn rank(a: &FeedbackBand, b: &FeedbackBand) -> Ordering {
    a.tone.cmp(&b.tone).then_with(|| {
        let (ta, tb) = (a.condition.threshold(), b.condition.threshold());
        match a.tone {
            FeedbackTone::Corrective => ta.total_cmp(&tb),
            FeedbackTone::Celebratory => tb.total_cmp(&ta),
        }
    })
}

/// Replaces band messages when the tracked body segment is not reliably seen.
pub fn visibility_cue() -> String {
    VISIBILITY_CUE.to_string()
}

pub fn default_bands(kind: ExerciseKind) -> Vec<FeedbackBand> {
    use BandCondition::*;

    match kind {
        ExerciseKind::Squats => vec![
            FeedbackBand::corrective(Below(85.0), "Keep your chest up"),
            FeedbackBand::corrective(Below(90.0), "Go deeper"),
            FeedbackBand::celebratory(Above(95.0), "Perfect form!"),
        ],
        ExerciseKind::Pushups => vec![
            FeedbackBand::corrective(Below(90.0), "Keep your body straight"),
            FeedbackBand::celebratory(Above(95.0), "Excellent form!"),
        ],
        ExerciseKind::Planks => vec![
            FeedbackBand::corrective(Below(95.0), "Keep your hips level"),
            FeedbackBand::celebratory(AtLeast(95.0), "Great stability!"),
        ],
        ExerciseKind::Lunges => vec![
            FeedbackBand::corrective(Below(85.0), "Keep your front knee over your ankle"),
            FeedbackBand::corrective(Below(90.0), "Keep your torso upright"),
            FeedbackBand::celebratory(Above(95.0), "Great balance!"),
        ],
        ExerciseKind::Burpees => vec![
            FeedbackBand::corrective(Below(80.0), "Land softly and keep your core tight"),
            FeedbackBand::celebratory(Above(92.0), "Explosive and controlled!"),
        ],
        ExerciseKind::MountainClimbers => vec![
            FeedbackBand::corrective(Below(85.0), "Keep your hips down"),
            FeedbackBand::celebratory(Above(93.0), "Strong core!"),
        ],
    }
}
