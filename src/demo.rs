use anyhow::{Context, Result};
use log::info;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::capture::SyntheticCapture;
use crate::models::{ExerciseKind, WorkoutSummary};
use crate::settings::EngineSettings;
use crate::worker::AnalysisController;

const FRAME_PACE_MS: u64 = 5;
const HEARTBEAT_EVERY_FRAMES: u64 = 25;

struct DemoSegment {
    kind: ExerciseKind,
    frames: usize,
    amplitude: f32,
    cycle_ms: u64,
}

const DEMO_PLAN: [DemoSegment; 3] = [
    DemoSegment {
        kind: ExerciseKind::Squats,
        frames: 81,
        amplitude: 120.0,
        cycle_ms: 2_000,
    },
    DemoSegment {
        kind: ExerciseKind::Pushups,
        frames: 61,
        amplitude: 60.0,
        cycle_ms: 1_500,
    },
    DemoSegment {
        kind: ExerciseKind::Planks,
        frames: 50,
        amplitude: 0.0,
        cycle_ms: 1_000,
    },
];

/// Runs a short scripted workout against synthetic frames and returns its summary.
/// With a seed, every segment's frame stream is reproducible.
pub async fn run_demo(
    settings: &EngineSettings,
    debug: bool,
    seed: Option<u64>,
) -> Result<WorkoutSummary> {
    let mut controller = AnalysisController::from_settings(settings)?;
    let mut results = controller.start()?;

    let consumer = tokio::spawn(async move {
        let mut seen = 0u64;
        while let Some(result) = results.recv().await {
            seen += 1;
            if debug || seen % HEARTBEAT_EVERY_FRAMES == 0 {
                info!(
                    "{} @{}ms: reps={} phase={:?} score={:.1} ({}) {:?}",
                    result.exercise,
                    result.timestamp_ms,
                    result.rep_count,
                    result.phase,
                    result.form_score,
                    result.grade.label(),
                    result.feedback
                );
            } else if result.rep_completed {
                info!("{} rep {}", result.exercise, result.rep_count);
            }
        }
        seen
    });

    let mut ticker = interval(Duration::from_millis(FRAME_PACE_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut next_timestamp_ms = 0;

    for (index, segment) in DEMO_PLAN.iter().enumerate() {
        controller.select_exercise(segment.kind).await?;

        let capture = match seed {
            Some(seed) => SyntheticCapture::seeded(
                settings.landmark_count,
                seed.wrapping_add(index as u64),
            ),
            None => SyntheticCapture::new(settings.landmark_count),
        };
        let capture = capture
            .with_motion(segment.amplitude, segment.cycle_ms)
            .with_jitter(0.5)
            .starting_at(next_timestamp_ms);
        let step_ms = capture.frame_interval_ms();

        for frame in capture.take(segment.frames) {
            ticker.tick().await;
            controller.submit(frame).await?;
        }
        next_timestamp_ms += segment.frames as u64 * step_ms;

        let snapshot = controller.snapshot().await;
        let progress = {
            let workout = controller.workout();
            let workout = workout.lock().await;
            workout
                .analyzer(segment.kind)
                .map(|a| a.config().progress(a.rep_count(), a.state().hold_ms))
                .unwrap_or(0.0)
        };
        info!(
            "segment {} done: {} reps so far, {:.0}% of target, {} frames dropped",
            segment.kind,
            snapshot.rep_counts.get(&segment.kind).copied().unwrap_or(0),
            progress * 100.0,
            snapshot.metrics.dropped_count
        );
    }

    let summary = controller.finish().await?;
    let seen = consumer.await.context("result consumer task failed to join")?;
    info!("demo finished after {} results", seen);
    Ok(summary)
}
