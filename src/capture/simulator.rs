use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

use crate::models::{BodyLandmark, Landmark, PoseFrame};

/// Stand-in for a camera plus pose estimator.
///
/// Produces a standing figure that sinks and rises on a cosine cycle, with
/// per-landmark positional jitter and confidence noise. An optional
/// occlusion rate hides the lower body on random frames.
pub struct SyntheticCapture {
    rng: StdRng,
    landmark_count: usize,
    frame_interval_ms: u64,
    cycle_ms: u64,
    amplitude: f32,
    jitter: f32,
    occlusion_rate: f64,
    next_timestamp_ms: u64,
}

impl SyntheticCapture {
    pub fn new(landmark_count: usize) -> Self {
        Self::with_rng(landmark_count, StdRng::from_entropy())
    }

    /// Reproducible stream for tests and benchmarks.
    pub fn seeded(landmark_count: usize, seed: u64) -> Self {
        Self::with_rng(landmark_count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(landmark_count: usize, rng: StdRng) -> Self {
        Self {
            rng,
            landmark_count,
            frame_interval_ms: 100,
            cycle_ms: 2_000,
            amplitude: 120.0,
            jitter: 1.0,
            occlusion_rate: 0.0,
            next_timestamp_ms: 0,
        }
    }

    /// Peak vertical travel in pixels and the length of one down-up cycle.
    /// Zero amplitude gives a static hold.
    pub fn with_motion(mut self, amplitude: f32, cycle_ms: u64) -> Self {
        self.amplitude = amplitude.max(0.0);
        self.cycle_ms = cycle_ms.max(1);
        self
    }

    pub fn with_frame_interval(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms.max(1);
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    pub fn with_occlusion_rate(mut self, rate: f64) -> Self {
        self.occlusion_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn starting_at(mut self, timestamp_ms: u64) -> Self {
        self.next_timestamp_ms = timestamp_ms;
        self
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    fn displacement(&self, timestamp_ms: u64) -> f32 {
        let phase = (timestamp_ms % self.cycle_ms) as f32 / self.cycle_ms as f32;
        self.amplitude * (1.0 - (2.0 * PI * phase).cos()) / 2.0
    }
}

impl Iterator for SyntheticCapture {
    type Item = PoseFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp_ms = self.next_timestamp_ms;
        self.next_timestamp_ms += self.frame_interval_ms;

        let offset = self.displacement(timestamp_ms);
        let occluded = self.occlusion_rate > 0.0 && self.rng.gen_bool(self.occlusion_rate);

        let landmarks = (0..self.landmark_count)
            .map(|index| {
                let (x, y) = rest_position(index);
                let (dx, dy) = if self.jitter > 0.0 {
                    (
                        self.rng.gen_range(-self.jitter..=self.jitter),
                        self.rng.gen_range(-self.jitter..=self.jitter),
                    )
                } else {
                    (0.0, 0.0)
                };
                let confidence = if occluded && is_lower_body(index) {
                    self.rng.gen_range(0.1..0.4)
                } else {
                    self.rng.gen_range(0.82..0.98)
                };
                Landmark::new(index, x + dx, y + offset + dy, confidence)
            })
            .collect();

        Some(PoseFrame::new(landmarks, timestamp_ms))
    }
}

/// Upright pose in a 640x480 frame.
fn rest_position(index: usize) -> (f32, f32) {
    use BodyLandmark::*;

    match BodyLandmark::from_index(index) {
        Some(Nose) => (320.0, 80.0),
        Some(LeftEyeInner | LeftEye | LeftEyeOuter) => (312.0, 72.0),
        Some(RightEyeInner | RightEye | RightEyeOuter) => (328.0, 72.0),
        Some(LeftEar) => (304.0, 76.0),
        Some(RightEar) => (336.0, 76.0),
        Some(MouthLeft) => (314.0, 92.0),
        Some(MouthRight) => (326.0, 92.0),
        Some(LeftShoulder) => (300.0, 150.0),
        Some(RightShoulder) => (340.0, 150.0),
        Some(LeftElbow) => (295.0, 210.0),
        Some(RightElbow) => (345.0, 210.0),
        Some(LeftWrist | LeftPinky | LeftIndex | LeftThumb) => (295.0, 260.0),
        Some(RightWrist | RightPinky | RightIndex | RightThumb) => (345.0, 260.0),
        Some(LeftHip) => (305.0, 280.0),
        Some(RightHip) => (335.0, 280.0),
        Some(LeftKnee) => (305.0, 370.0),
        Some(RightKnee) => (335.0, 370.0),
        Some(LeftAnkle | LeftHeel | LeftFootIndex) => (305.0, 460.0),
        Some(RightAnkle | RightHeel | RightFootIndex) => (335.0, 460.0),
        None => (320.0, 100.0 + index as f32 * 4.0),
    }
}

fn is_lower_body(index: usize) -> bool {
    index >= BodyLandmark::LeftHip.index()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ExerciseAnalyzer, ExerciseConfig};
    use crate::models::ExerciseKind;

    #[test]
    fn test_frames_are_well_formed_and_ordered() {
        let frames: Vec<_> = SyntheticCapture::seeded(33, 1).take(10).collect();
        for (i, frame) in frames.iter().enumerate() {
            assert!(frame.validate(33).is_ok());
            assert_eq!(frame.timestamp_ms, i as u64 * 100);
        }
    }

    #[test]
    fn test_seeded_streams_repeat() {
        let a: Vec<_> = SyntheticCapture::seeded(33, 9).take(5).collect();
        let b: Vec<_> = SyntheticCapture::seeded(33, 9).take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_displacement_follows_cycle() {
        let capture = SyntheticCapture::seeded(33, 0).with_motion(100.0, 2_000);
        assert!(capture.displacement(0).abs() < 1e-4);
        assert!((capture.displacement(1_000) - 100.0).abs() < 1e-3);
        assert!(capture.displacement(2_000).abs() < 1e-4);
    }

    #[test]
    fn test_one_rep_per_cycle() {
        let mut analyzer =
            ExerciseAnalyzer::new(ExerciseConfig::builtin(ExerciseKind::Squats), 33).unwrap();
        // five full cycles at 100ms per frame, plus the closing frame
        for frame in SyntheticCapture::seeded(33, 42).take(101) {
            analyzer.process(&frame).unwrap();
        }
        assert_eq!(analyzer.rep_count(), 5);
    }

    #[test]
    fn test_occlusion_hides_lower_body() {
        let frame = SyntheticCapture::seeded(33, 3)
            .with_occlusion_rate(1.0)
            .next()
            .unwrap();
        assert!(frame.mean_confidence(&[23, 24]) < 0.5);
        assert!(frame.mean_confidence(&[11, 12]) > 0.8);
    }

    #[test]
    fn test_other_model_sizes() {
        let frame = SyntheticCapture::seeded(17, 5).next().unwrap();
        assert!(frame.validate(17).is_ok());
    }
}
