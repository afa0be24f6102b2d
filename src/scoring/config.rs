use serde::{Deserialize, Serialize};

/// One geometric aspect of form that contributes to the score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScoreComponent {
    /// Shoulders stacked over hips.
    TorsoUpright,
    /// Left and right knee bend match.
    KneeSymmetry,
    /// Left and right elbow bend match.
    ElbowSymmetry,
    /// Shoulder, hip and ankle on one straight line.
    BodyLine,
    /// Neither hip dropped relative to the other.
    HipLevel,
    /// Bent (front) knee stays above its ankle.
    FrontKneeOverAnkle,
    /// Little sideways drift of the hips between frames.
    Stability,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightedComponent {
    pub component: ScoreComponent,
    pub weight: f64,
}

/// Weighted mix of components; weights need not sum to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringProfile {
    pub components: Vec<WeightedComponent>,
}

impl ScoringProfile {
    pub fn new(components: &[(ScoreComponent, f64)]) -> Self {
        Self {
            components: components
                .iter()
                .map(|&(component, weight)| WeightedComponent { component, weight })
                .collect(),
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.components.iter().map(|c| c.weight.max(0.0)).sum()
    }

    pub fn squat() -> Self {
        Self::new(&[
            (ScoreComponent::TorsoUpright, 0.45),
            (ScoreComponent::KneeSymmetry, 0.35),
            (ScoreComponent::Stability, 0.20),
        ])
    }

    pub fn pushup() -> Self {
        Self::new(&[
            (ScoreComponent::BodyLine, 0.55),
            (ScoreComponent::ElbowSymmetry, 0.30),
            (ScoreComponent::Stability, 0.15),
        ])
    }

    pub fn plank() -> Self {
        Self::new(&[
            (ScoreComponent::BodyLine, 0.50),
            (ScoreComponent::HipLevel, 0.30),
            (ScoreComponent::Stability, 0.20),
        ])
    }

    pub fn lunge() -> Self {
        Self::new(&[
            (ScoreComponent::FrontKneeOverAnkle, 0.40),
            (ScoreComponent::TorsoUpright, 0.35),
            (ScoreComponent::HipLevel, 0.25),
        ])
    }

    pub fn full_body() -> Self {
        Self::new(&[
            (ScoreComponent::KneeSymmetry, 0.35),
            (ScoreComponent::ElbowSymmetry, 0.25),
            (ScoreComponent::HipLevel, 0.20),
            (ScoreComponent::Stability, 0.20),
        ])
    }

    pub fn climber() -> Self {
        Self::new(&[
            (ScoreComponent::BodyLine, 0.40),
            (ScoreComponent::HipLevel, 0.35),
            (ScoreComponent::Stability, 0.25),
        ])
    }
}
