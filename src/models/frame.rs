//! Landmark frames delivered by the capture pipeline.
//!
//! Index conventions follow the 33-point body model used by common pose
//! estimators. The engine itself only relies on the model size configured in
//! [`EngineSettings`](crate::settings::EngineSettings); the named indices are
//! used by the built-in exercise table and scorers.

use serde::{Deserialize, Serialize};

use crate::error::FrameDefect;

/// Named indices of the 33-point body model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    const ALL: [BodyLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single detected body point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub index: usize,
    pub x: f32,
    /// Grows downward, as in image coordinates.
    pub y: f32,
    pub confidence: f32,
}

impl Landmark {
    pub fn new(index: usize, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            index,
            x,
            y,
            confidence,
        }
    }

    pub fn is_reliable(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Snapshot of every landmark at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
    /// Capture clock in milliseconds; non-decreasing per analyzer.
    pub timestamp_ms: u64,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmark(landmark.index())
    }

    /// Checks the structural contract with the landmark model.
    pub fn validate(&self, expected_len: usize) -> Result<(), FrameDefect> {
        if self.landmarks.len() != expected_len {
            return Err(FrameDefect::LandmarkCount {
                expected: expected_len,
                actual: self.landmarks.len(),
            });
        }

        for (position, landmark) in self.landmarks.iter().enumerate() {
            if landmark.index != position {
                return Err(FrameDefect::IndexMismatch {
                    position,
                    index: landmark.index,
                });
            }
            if !landmark.x.is_finite() || !landmark.y.is_finite() {
                return Err(FrameDefect::NonFiniteLandmark { index: position });
            }
            if !(0.0..=1.0).contains(&landmark.confidence) {
                return Err(FrameDefect::ConfidenceOutOfRange {
                    index: position,
                    confidence: landmark.confidence,
                });
            }
        }

        Ok(())
    }

    /// Mean vertical position of the given landmarks.
    pub fn tracked_y(&self, indices: &[usize]) -> Option<f32> {
        if indices.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &index in indices {
            sum += self.landmark(index)?.y;
        }
        Some(sum / indices.len() as f32)
    }

    /// Mean confidence of the given landmarks (0 when any is missing).
    pub fn mean_confidence(&self, indices: &[usize]) -> f32 {
        if indices.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0;
        for &index in indices {
            match self.landmark(index) {
                Some(landmark) => sum += landmark.confidence,
                None => return 0.0,
            }
        }
        sum / indices.len() as f32
    }

    pub fn all_reliable(&self, indices: &[usize], min_confidence: f32) -> bool {
        indices.iter().all(|&index| {
            self.landmark(index)
                .map(|landmark| landmark.is_reliable(min_confidence))
                .unwrap_or(false)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_body_landmark_from_index() {
        assert_eq!(BodyLandmark::from_index(0), Some(BodyLandmark::Nose));
        assert_eq!(BodyLandmark::from_index(23), Some(BodyLandmark::LeftHip));
        assert_eq!(BodyLandmark::from_index(32), Some(BodyLandmark::RightFootIndex));
        assert_eq!(BodyLandmark::from_index(33), None);
    }

    #[test]
    fn test_validate_accepts_well_formed_frame() {
        assert!(standing_frame(0).validate(BodyLandmark::COUNT).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        let mut frame = standing_frame(0);
        frame.landmarks.truncate(17);
        assert_eq!(
            frame.validate(33),
            Err(FrameDefect::LandmarkCount {
                expected: 33,
                actual: 17
            })
        );
    }

    #[test]
    fn test_validate_rejects_shuffled_indices() {
        let mut frame = standing_frame(0);
        frame.landmarks.swap(3, 4);
        assert_eq!(
            frame.validate(33),
            Err(FrameDefect::IndexMismatch {
                position: 3,
                index: 4
            })
        );
    }

    #[test]
    fn test_validate_rejects_nan_and_bad_confidence() {
        let mut frame = standing_frame(0);
        frame.landmarks[5].y = f32::NAN;
        assert_eq!(
            frame.validate(33),
            Err(FrameDefect::NonFiniteLandmark { index: 5 })
        );

        let mut frame = standing_frame(0);
        frame.landmarks[7].confidence = 1.5;
        assert!(matches!(
            frame.validate(33),
            Err(FrameDefect::ConfidenceOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn test_tracked_y_averages_landmarks() {
        let mut frame = standing_frame(0);
        frame.landmarks[23].y = 100.0;
        frame.landmarks[24].y = 110.0;
        assert_eq!(frame.tracked_y(&[23, 24]), Some(105.0));
        assert_eq!(frame.tracked_y(&[40]), None);
        assert_eq!(frame.tracked_y(&[]), None);
    }

    #[test]
    fn test_reliability_helpers() {
        let frame = with_confidence(standing_frame(0), &[23], 0.3);
        assert!(!frame.all_reliable(&[23, 24], 0.5));
        assert!(frame.all_reliable(&[24], 0.5));
        assert!((frame.mean_confidence(&[23, 24]) - 0.625).abs() < 1e-6);
        assert_eq!(frame.mean_confidence(&[99]), 0.0);
    }
}
