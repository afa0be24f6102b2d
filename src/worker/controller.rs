use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::models::{AnalysisResult, ExerciseKind, PoseFrame, SessionAggregate, WorkoutSummary};
use crate::registry::{ExerciseRegistry, Workout};
use crate::settings::EngineSettings;

use super::loop_worker::analysis_loop;
use super::queue::FrameQueue;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSnapshot {
    pub active: Option<ExerciseKind>,
    pub rep_counts: BTreeMap<ExerciseKind, u32>,
    pub aggregate: SessionAggregate,
    pub queued_frames: usize,
    pub metrics: MetricsSnapshot,
}

/// Owns the analysis task for one workout: frames go in through `submit`,
/// results come out of the receiver returned by `start`.
pub struct AnalysisController {
    workout: Arc<Mutex<Workout>>,
    metrics: MetricsCollector,
    queue_capacity: usize,
    result_buffer: usize,
    queue: Option<Arc<FrameQueue>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AnalysisController {
    pub fn new(workout: Workout, queue_capacity: usize, result_buffer: usize) -> Self {
        Self {
            workout: Arc::new(Mutex::new(workout)),
            metrics: MetricsCollector::new(),
            queue_capacity,
            result_buffer: result_buffer.max(1),
            queue: None,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let registry = ExerciseRegistry::from_settings(settings)
            .context("failed to build exercise registry from settings")?;
        Ok(Self::new(
            Workout::new(registry),
            settings.queue_capacity,
            settings.result_buffer,
        ))
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self) -> Result<mpsc::Receiver<AnalysisResult>> {
        if self.handle.is_some() {
            bail!("analysis already active");
        }

        let cancel_token = CancellationToken::new();
        let queue = Arc::new(FrameQueue::new(self.queue_capacity));
        let (results_tx, results_rx) = mpsc::channel(self.result_buffer);

        let handle = tokio::spawn(analysis_loop(
            Arc::clone(&self.workout),
            Arc::clone(&queue),
            results_tx,
            self.metrics.clone(),
            cancel_token.clone(),
        ));

        self.queue = Some(queue);
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("analysis started");
        Ok(results_rx)
    }

    /// Hands a frame to the analysis task. Never blocks; under backpressure
    /// the oldest queued frame is dropped.
    pub async fn submit(&self, frame: PoseFrame) -> Result<()> {
        let Some(queue) = &self.queue else {
            bail!("analysis not active");
        };
        if let Some(evicted) = queue.push(frame)? {
            log_debug!("dropped stale frame at {}ms", evicted.timestamp_ms);
            self.metrics.record_dropped().await;
        }
        Ok(())
    }

    /// Switches the active exercise. While the worker runs, the switch is
    /// queued behind the frames already submitted so they are still credited
    /// to the exercise they were captured for.
    pub async fn select_exercise(&self, kind: ExerciseKind) -> Result<()> {
        let mut workout = self.workout.lock().await;
        match &self.queue {
            Some(queue) => {
                workout.registry().get(kind)?;
                queue.push_select(kind)?;
            }
            None => workout.select_exercise(kind)?,
        }
        Ok(())
    }

    pub async fn reset_active(&self) -> Result<()> {
        self.workout.lock().await.reset_active()?;
        Ok(())
    }

    /// Stops accepting frames, lets the task finish what is queued, then waits for it.
    pub async fn drain(&mut self) -> Result<()> {
        if let Some(queue) = self.queue.take() {
            queue.close();
            info!("drain requested ({} frames left)", queue.len());
        }
        self.cancel_token = None;
        self.join().await
    }

    /// Cancels the task without processing the remaining queue.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(queue) = self.queue.take() {
            queue.close();
        }
        self.join().await
    }

    async fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("analysis loop task failed to join")
                .map(|_| ())?;
            info!("analysis stopped");
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> WorkoutSnapshot {
        let (active, rep_counts, aggregate) = {
            let workout = self.workout.lock().await;
            let rep_counts: BTreeMap<ExerciseKind, u32> = workout
                .registry()
                .kinds()
                .into_iter()
                .map(|kind| (kind, workout.rep_count(kind)))
                .collect();
            (workout.active(), rep_counts, workout.aggregate().clone())
        };

        WorkoutSnapshot {
            active,
            rep_counts,
            aggregate,
            queued_frames: self.queue.as_ref().map(|q| q.len()).unwrap_or(0),
            metrics: self.metrics.get_snapshot().await,
        }
    }

    /// Drains outstanding frames and closes out the workout.
    pub async fn finish(&mut self) -> Result<WorkoutSummary> {
        self.drain().await?;
        let summary = self.workout.lock().await.finish();
        Ok(summary)
    }

    pub fn workout(&self) -> Arc<Mutex<Workout>> {
        Arc::clone(&self.workout)
    }
}
