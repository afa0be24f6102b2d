pub mod config;
pub mod geometry;

pub use config::{ScoreComponent, ScoringProfile, WeightedComponent};

use crate::models::{BodyLandmark, PoseFrame};
use geometry::{falloff, joint_angle_deg, lean_from_vertical_deg, midpoint, Point};

/// Sub-score used when no component could be evaluated.
const NEUTRAL_SCORE: f64 = 0.5;

/// Score reported when nothing meaningful can be measured.
pub const NEUTRAL_FORM_SCORE: f64 = NEUTRAL_SCORE * 100.0;

const TORSO_LEAN_TOLERANCE_DEG: f32 = 15.0;
const TORSO_LEAN_LIMIT_DEG: f32 = 60.0;
const SYMMETRY_TOLERANCE_DEG: f32 = 5.0;
const SYMMETRY_LIMIT_DEG: f32 = 35.0;
const BODY_LINE_TOLERANCE_DEG: f32 = 8.0;
const BODY_LINE_LIMIT_DEG: f32 = 45.0;
/// Ratios below are relative to torso (or shin) length so that the score does
/// not depend on how far the user stands from the camera.
const HIP_LEVEL_TOLERANCE: f32 = 0.05;
const HIP_LEVEL_LIMIT: f32 = 0.30;
const KNEE_OVER_ANKLE_TOLERANCE: f32 = 0.15;
const KNEE_OVER_ANKLE_LIMIT: f32 = 0.60;
const DRIFT_TOLERANCE: f32 = 0.02;
const DRIFT_LIMIT: f32 = 0.20;

/// Turns landmark geometry into a form score in [0, 100].
///
/// This is the seam where a learned form model can replace the built-in
/// geometric rules.
pub trait FormScorer: Send + Sync {
    fn score(&self, current: &PoseFrame, previous: Option<&PoseFrame>) -> f64;
}

impl<F> FormScorer for F
where
    F: Fn(&PoseFrame, Option<&PoseFrame>) -> f64 + Send + Sync,
{
    fn score(&self, current: &PoseFrame, previous: Option<&PoseFrame>) -> f64 {
        self(current, previous)
    }
}

/// Rule-based scorer: weighted average of the profile's components.
#[derive(Debug, Clone)]
pub struct GeometricScorer {
    profile: ScoringProfile,
    min_confidence: f32,
}

impl GeometricScorer {
    pub fn new(profile: ScoringProfile, min_confidence: f32) -> Self {
        Self {
            profile,
            min_confidence,
        }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Sub-score of a single component, `None` when its landmarks are missing
    /// or unreliable.
    pub fn component_score(
        &self,
        component: ScoreComponent,
        current: &PoseFrame,
        previous: Option<&PoseFrame>,
    ) -> Option<f64> {
        let body = Body::new(current, self.min_confidence);
        match component {
            ScoreComponent::TorsoUpright => score_torso_upright(&body),
            ScoreComponent::KneeSymmetry => score_symmetry(
                &body,
                [BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle],
                [BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle],
            ),
            ScoreComponent::ElbowSymmetry => score_symmetry(
                &body,
                [BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow, BodyLandmark::LeftWrist],
                [BodyLandmark::RightShoulder, BodyLandmark::RightElbow, BodyLandmark::RightWrist],
            ),
            ScoreComponent::BodyLine => score_body_line(&body),
            ScoreComponent::HipLevel => score_hip_level(&body),
            ScoreComponent::FrontKneeOverAnkle => score_front_knee(&body),
            ScoreComponent::Stability => {
                let previous = Body::new(previous?, self.min_confidence);
                score_stability(&body, &previous)
            }
        }
    }
}

impl FormScorer for GeometricScorer {
    fn score(&self, current: &PoseFrame, previous: Option<&PoseFrame>) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for entry in &self.profile.components {
            if !(entry.weight > 0.0 && entry.weight.is_finite()) {
                continue;
            }
            if let Some(sub_score) = self.component_score(entry.component, current, previous) {
                weighted += entry.weight * sub_score;
                total_weight += entry.weight;
            }
        }

        let normalized = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            NEUTRAL_SCORE
        };

        (normalized * 100.0).clamp(0.0, 100.0)
    }
}

/// Reliable landmark lookup for one frame.
struct Body<'a> {
    frame: &'a PoseFrame,
    min_confidence: f32,
}

impl<'a> Body<'a> {
    fn new(frame: &'a PoseFrame, min_confidence: f32) -> Self {
        Self {
            frame,
            min_confidence,
        }
    }

    fn point(&self, landmark: BodyLandmark) -> Option<Point> {
        self.frame
            .get(landmark)
            .filter(|lm| lm.is_reliable(self.min_confidence))
            .map(Point::from)
    }

    fn mid(&self, left: BodyLandmark, right: BodyLandmark) -> Option<Point> {
        Some(midpoint(self.point(left)?, self.point(right)?))
    }

    fn mid_shoulder(&self) -> Option<Point> {
        self.mid(BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder)
    }

    fn mid_hip(&self) -> Option<Point> {
        self.mid(BodyLandmark::LeftHip, BodyLandmark::RightHip)
    }

    fn mid_ankle(&self) -> Option<Point> {
        self.mid(BodyLandmark::LeftAnkle, BodyLandmark::RightAnkle)
    }

    fn torso_length(&self) -> Option<f32> {
        let length = self.mid_shoulder()?.distance(self.mid_hip()?);
        (length > f32::EPSILON).then_some(length)
    }

    fn angle(&self, joints: [BodyLandmark; 3]) -> Option<f32> {
        joint_angle_deg(
            self.point(joints[0])?,
            self.point(joints[1])?,
            self.point(joints[2])?,
        )
    }
}

fn score_torso_upright(body: &Body) -> Option<f64> {
    let lean = lean_from_vertical_deg(body.mid_shoulder()?, body.mid_hip()?)?;
    Some(falloff(lean, TORSO_LEAN_TOLERANCE_DEG, TORSO_LEAN_LIMIT_DEG))
}

fn score_symmetry(body: &Body, left: [BodyLandmark; 3], right: [BodyLandmark; 3]) -> Option<f64> {
    let diff = (body.angle(left)? - body.angle(right)?).abs();
    Some(falloff(diff, SYMMETRY_TOLERANCE_DEG, SYMMETRY_LIMIT_DEG))
}

fn score_body_line(body: &Body) -> Option<f64> {
    let angle = joint_angle_deg(body.mid_shoulder()?, body.mid_hip()?, body.mid_ankle()?)?;
    Some(falloff(180.0 - angle, BODY_LINE_TOLERANCE_DEG, BODY_LINE_LIMIT_DEG))
}

fn score_hip_level(body: &Body) -> Option<f64> {
    let left = body.point(BodyLandmark::LeftHip)?;
    let right = body.point(BodyLandmark::RightHip)?;
    let ratio = (left.y - right.y).abs() / body.torso_length()?;
    Some(falloff(ratio, HIP_LEVEL_TOLERANCE, HIP_LEVEL_LIMIT))
}

/// The knee with the deeper bend is treated as the front (working) knee.
fn score_front_knee(body: &Body) -> Option<f64> {
    let left = [BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle];
    let right = [BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle];

    let front = match (body.angle(left), body.angle(right)) {
        (Some(l), Some(r)) => {
            if l <= r {
                left
            } else {
                right
            }
        }
        (Some(_), None) => left,
        (None, Some(_)) => right,
        (None, None) => return None,
    };

    let knee = body.point(front[1])?;
    let ankle = body.point(front[2])?;
    let shin = knee.distance(ankle);
    if shin <= f32::EPSILON {
        return None;
    }
    let ratio = (knee.x - ankle.x).abs() / shin;
    Some(falloff(ratio, KNEE_OVER_ANKLE_TOLERANCE, KNEE_OVER_ANKLE_LIMIT))
}

fn score_stability(current: &Body, previous: &Body) -> Option<f64> {
    let drift = (current.mid_hip()?.x - previous.mid_hip()?.x).abs();
    let ratio = drift / current.torso_length()?;
    Some(falloff(ratio, DRIFT_TOLERANCE, DRIFT_LIMIT))
}
