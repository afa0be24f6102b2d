//! Exercise table and the per-workout analyzer selector.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analyzer::{AnalyzerState, ExerciseAnalyzer, ExerciseConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AnalysisResult, ExerciseKind, ExerciseSet, PoseFrame, SessionAggregate, WorkoutSummary,
};
use crate::scoring::{FormScorer, GeometricScorer};
use crate::session::SessionAggregator;
use crate::settings::EngineSettings;

const ENABLE_LOGS: bool = true;

use crate::log_info;

struct RegisteredExercise {
    config: ExerciseConfig,
    scorer: Arc<dyn FormScorer>,
}

/// Exercise kind -> configuration and scorer. Injected, never global.
pub struct ExerciseRegistry {
    landmark_count: usize,
    entries: BTreeMap<ExerciseKind, RegisteredExercise>,
}

impl ExerciseRegistry {
    pub fn new(landmark_count: usize) -> Self {
        Self {
            landmark_count,
            entries: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> EngineResult<Self> {
        let mut registry = Self::new(settings.landmark_count);
        for config in &settings.exercises {
            registry.register(config.clone())?;
        }
        Ok(registry)
    }

    /// Registers `config` with the geometric scorer its profile describes.
    /// Registering a kind again replaces the previous entry.
    pub fn register(&mut self, config: ExerciseConfig) -> EngineResult<()> {
        let scorer = Arc::new(GeometricScorer::new(
            config.scoring.clone(),
            config.min_confidence,
        ));
        self.register_with_scorer(config, scorer)
    }

    pub fn register_with_scorer(
        &mut self,
        config: ExerciseConfig,
        scorer: Arc<dyn FormScorer>,
    ) -> EngineResult<()> {
        config.validate(self.landmark_count)?;
        self.entries
            .insert(config.kind, RegisteredExercise { config, scorer });
        Ok(())
    }

    pub fn get(&self, kind: ExerciseKind) -> EngineResult<&ExerciseConfig> {
        self.entries
            .get(&kind)
            .map(|entry| &entry.config)
            .ok_or_else(|| EngineError::UnknownExerciseKind(kind.to_string()))
    }

    /// Looks a kind up by its string id, e.g. `"mountain_climbers"`.
    pub fn resolve(&self, id: &str) -> EngineResult<ExerciseKind> {
        let kind: ExerciseKind = id.parse()?;
        self.get(kind)?;
        Ok(kind)
    }

    pub fn kinds(&self) -> Vec<ExerciseKind> {
        self.entries.keys().copied().collect()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    fn build_analyzer(&self, kind: ExerciseKind) -> EngineResult<ExerciseAnalyzer> {
        let entry = self
            .entries
            .get(&kind)
            .ok_or_else(|| EngineError::UnknownExerciseKind(kind.to_string()))?;
        ExerciseAnalyzer::with_scorer(
            entry.config.clone(),
            self.landmark_count,
            Arc::clone(&entry.scorer),
        )
    }
}

/// One workout: the registry, an analyzer per exercise used so far, the
/// active selection and the running session totals.
pub struct Workout {
    registry: ExerciseRegistry,
    analyzers: BTreeMap<ExerciseKind, ExerciseAnalyzer>,
    active: Option<ExerciseKind>,
    session: SessionAggregator,
}

impl Workout {
    pub fn new(registry: ExerciseRegistry) -> Self {
        Self::starting_at(registry, Utc::now())
    }

    pub fn starting_at(registry: ExerciseRegistry, started_at: DateTime<Utc>) -> Self {
        Self {
            registry,
            analyzers: BTreeMap::new(),
            active: None,
            session: SessionAggregator::new(started_at),
        }
    }

    pub fn registry(&self) -> &ExerciseRegistry {
        &self.registry
    }

    /// Makes `kind` the target of subsequent `process` calls. An analyzer
    /// created earlier in this workout is resumed with its counters intact.
    /// Switching away suspends the previous analyzer, so time spent on other
    /// exercises never counts as hold time or as one long movement.
    pub fn select_exercise(&mut self, kind: ExerciseKind) -> EngineResult<()> {
        self.registry.get(kind)?;

        if !self.analyzers.contains_key(&kind) {
            let analyzer = self.registry.build_analyzer(kind)?;
            self.analyzers.insert(kind, analyzer);
        }

        match self.active.replace(kind) {
            Some(previous) if previous != kind => {
                if let Some(paused) = self.analyzers.get_mut(&previous) {
                    paused.suspend();
                }
                log_info!(
                    "switched exercise {} -> {} (resuming at {} reps)",
                    previous,
                    kind,
                    self.rep_count(kind)
                );
            }
            Some(_) => {}
            None => log_info!("selected exercise {}", kind),
        }
        Ok(())
    }

    pub fn process(&mut self, frame: &PoseFrame) -> EngineResult<AnalysisResult> {
        let analyzer = self.active_analyzer_mut()?;
        let result = analyzer.process(frame)?;
        self.session.accumulate(&result);
        Ok(result)
    }

    /// Resets only the active analyzer. Session totals are not rolled back.
    pub fn reset_active(&mut self) -> EngineResult<()> {
        self.active_analyzer_mut()?.reset();
        Ok(())
    }

    /// Re-registers a configuration mid-workout. An analyzer already running
    /// for that kind is rebuilt: its rep count and hold time carry over, its
    /// phase and reference frame start fresh.
    pub fn register(&mut self, config: ExerciseConfig) -> EngineResult<()> {
        let kind = config.kind;
        self.registry.register(config)?;
        self.rebuild(kind)
    }

    pub fn register_with_scorer(
        &mut self,
        config: ExerciseConfig,
        scorer: Arc<dyn FormScorer>,
    ) -> EngineResult<()> {
        let kind = config.kind;
        self.registry.register_with_scorer(config, scorer)?;
        self.rebuild(kind)
    }

    fn rebuild(&mut self, kind: ExerciseKind) -> EngineResult<()> {
        let Some(existing) = self.analyzers.get(&kind) else {
            return Ok(());
        };
        let carried = AnalyzerState {
            rep_count: existing.rep_count(),
            hold_ms: existing.state().hold_ms,
            ..AnalyzerState::default()
        };

        let mut analyzer = self.registry.build_analyzer(kind)?;
        analyzer.restore(carried);
        self.analyzers.insert(kind, analyzer);
        log_info!("re-registered {} mid-workout", kind);
        Ok(())
    }

    pub fn active(&self) -> Option<ExerciseKind> {
        self.active
    }

    pub fn active_analyzer(&self) -> Option<&ExerciseAnalyzer> {
        self.active.and_then(|kind| self.analyzers.get(&kind))
    }

    /// Analyzer for `kind`, if it has been selected in this workout.
    pub fn analyzer(&self, kind: ExerciseKind) -> Option<&ExerciseAnalyzer> {
        self.analyzers.get(&kind)
    }

    fn active_analyzer_mut(&mut self) -> EngineResult<&mut ExerciseAnalyzer> {
        let kind = self.active.ok_or(EngineError::NoActiveExercise)?;
        self.analyzers
            .get_mut(&kind)
            .ok_or(EngineError::NoActiveExercise)
    }

    /// Reps for `kind` in this workout; 0 if it was never selected.
    pub fn rep_count(&self, kind: ExerciseKind) -> u32 {
        self.analyzer(kind)
            .map(ExerciseAnalyzer::rep_count)
            .unwrap_or(0)
    }

    pub fn aggregate(&self) -> &SessionAggregate {
        self.session.aggregate()
    }

    pub fn sets(&self) -> Vec<ExerciseSet> {
        self.session.sets()
    }

    pub fn finish(&self) -> WorkoutSummary {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(&self, ended_at: DateTime<Utc>) -> WorkoutSummary {
        let summary = self.session.summarize(ended_at, |kind| {
            self.registry
                .get(kind)
                .ok()
                .map(|config| config.calories_per_minute)
        });
        log_info!(
            "workout {} finished: {} reps over {} sets, avg form {:.1}",
            summary.id,
            summary.total_reps,
            summary.sets.len(),
            summary.average_form
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::test_support::*;
    use crate::models::{BodyLandmark, PhaseState};

    fn workout() -> Workout {
        let registry = ExerciseRegistry::from_settings(&EngineSettings::default()).unwrap();
        Workout::new(registry)
    }

    fn feed(workout: &mut Workout, hip_ys: &[f32], start_ms: u64) -> Vec<AnalysisResult> {
        hip_ys
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                workout
                    .process(&frame_with_hip_y(y, start_ms + i as u64 * 33))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_process_without_selection_fails() {
        let mut workout = workout();
        let err = workout.process(&frame_with_hip_y(100.0, 0)).unwrap_err();
        assert_eq!(err, EngineError::NoActiveExercise);
        assert_eq!(workout.reset_active(), Err(EngineError::NoActiveExercise));
    }

    #[test]
    fn test_unregistered_kind_is_unknown() {
        let mut registry = ExerciseRegistry::new(BodyLandmark::COUNT);
        registry
            .register(ExerciseConfig::builtin(ExerciseKind::Squats))
            .unwrap();
        let mut workout = Workout::new(registry);

        assert_eq!(
            workout.select_exercise(ExerciseKind::Burpees),
            Err(EngineError::UnknownExerciseKind("burpees".into()))
        );
        assert_eq!(workout.active(), None);
        assert!(workout.registry().resolve("jumping_jacks").is_err());
        assert_eq!(
            workout.registry().resolve("squats"),
            Ok(ExerciseKind::Squats)
        );
    }

    #[test]
    fn test_exercise_switch_preserves_counters() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0, 108.0, 96.0], 0);
        assert_eq!(workout.rep_count(ExerciseKind::Squats), 1);

        workout.select_exercise(ExerciseKind::Pushups).unwrap();
        // frame_with_hip_y moves the shoulders with the hips
        feed(&mut workout, &[100.0, 110.0, 95.0, 110.0, 95.0], 1_000);
        assert_eq!(workout.rep_count(ExerciseKind::Pushups), 2);
        assert_eq!(workout.rep_count(ExerciseKind::Squats), 1);

        workout.select_exercise(ExerciseKind::Squats).unwrap();
        assert_eq!(workout.active(), Some(ExerciseKind::Squats));
        assert_eq!(workout.rep_count(ExerciseKind::Squats), 1);
        assert_eq!(workout.aggregate().total_reps, 3);
    }

    #[test]
    fn test_hold_resumes_without_counting_time_away() {
        let mut workout = workout();
        let at = |workout: &mut Workout, ts: u64| {
            workout.process(&frame_with_hip_y(280.0, ts)).unwrap()
        };

        workout.select_exercise(ExerciseKind::Planks).unwrap();
        for ts in [0, 1_000, 2_000] {
            at(&mut workout, ts);
        }
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        at(&mut workout, 3_000);
        workout.select_exercise(ExerciseKind::Planks).unwrap();
        let resumed = at(&mut workout, 10_000);
        assert_eq!(resumed.hold_ms, 2_000);
        let held = at(&mut workout, 11_000);
        assert_eq!(held.hold_ms, 3_000);

        let sets = workout.sets();
        let holds: Vec<_> = sets.iter().map(|s| (s.exercise, s.hold_ms)).collect();
        assert_eq!(
            holds,
            vec![
                (ExerciseKind::Planks, 2_000),
                (ExerciseKind::Squats, 0),
                (ExerciseKind::Planks, 1_000),
            ]
        );
    }

    #[test]
    fn test_reset_mid_set_keeps_set_hold() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Planks).unwrap();
        for ts in [0, 1_000, 2_000] {
            workout.process(&frame_with_hip_y(280.0, ts)).unwrap();
        }
        workout.reset_active().unwrap();
        for ts in [3_000, 4_000] {
            workout.process(&frame_with_hip_y(280.0, ts)).unwrap();
        }

        assert_eq!(workout.active_analyzer().unwrap().state().hold_ms, 1_000);
        let sets = workout.sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].hold_ms, 3_000);
    }

    #[test]
    fn test_nan_scorer_keeps_session_average_finite() {
        let mut workout = workout();
        workout
            .register_with_scorer(
                ExerciseConfig::builtin(ExerciseKind::Squats),
                Arc::new(|_: &PoseFrame, _: Option<&PoseFrame>| f64::NAN),
            )
            .unwrap();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        let results = feed(&mut workout, &[100.0, 108.0, 96.0], 0);

        assert!(results.iter().all(|r| (0.0..=100.0).contains(&r.form_score)));
        assert_eq!(workout.aggregate().average_form(), 50.0);
        assert_eq!(workout.sets()[0].average_form(), 50.0);
    }

    #[test]
    fn test_reselecting_active_kind_is_a_noop() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0, 108.0], 0);
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        let result = workout.process(&frame_with_hip_y(96.0, 100)).unwrap();
        assert_eq!(result.rep_count, 1);
    }

    #[test]
    fn test_reset_active_keeps_other_analyzers_and_totals() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0, 108.0, 96.0], 0);
        workout.select_exercise(ExerciseKind::Lunges).unwrap();
        feed(&mut workout, &[100.0, 108.0, 96.0], 1_000);

        workout.reset_active().unwrap();
        assert_eq!(workout.rep_count(ExerciseKind::Lunges), 0);
        assert_eq!(workout.rep_count(ExerciseKind::Squats), 1);
        assert_eq!(workout.aggregate().total_reps, 2);
    }

    #[test]
    fn test_reregistration_keeps_reps_and_clears_phase() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0, 108.0, 96.0, 104.0], 0);
        assert_eq!(workout.active_analyzer().unwrap().phase(), PhaseState::Down);

        let mut stricter = ExerciseConfig::builtin(ExerciseKind::Squats);
        stricter.threshold = 20.0;
        workout.register(stricter).unwrap();

        let analyzer = workout.active_analyzer().unwrap();
        assert_eq!(analyzer.rep_count(), 1);
        assert_eq!(analyzer.phase(), PhaseState::Hold);
        assert!(analyzer.state().last_frame.is_none());
        assert_eq!(analyzer.config().threshold, 20.0);

        // Motion that counted before is now jitter.
        let results = feed(&mut workout, &[100.0, 110.0, 95.0], 500);
        assert!(results.iter().all(|r| r.rep_count == 1));
    }

    #[test]
    fn test_invalid_reregistration_keeps_previous_config() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        let mut broken = ExerciseConfig::builtin(ExerciseKind::Squats);
        broken.tracked_landmarks = vec![99];
        assert!(matches!(
            workout.register(broken),
            Err(EngineError::InvalidConfig { .. })
        ));
        assert_eq!(
            workout.registry().get(ExerciseKind::Squats).unwrap().tracked_landmarks,
            vec![23, 24]
        );
    }

    #[test]
    fn test_rejected_frame_does_not_touch_session() {
        let mut workout = workout();
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0], 100);
        assert!(workout.process(&frame_with_hip_y(100.0, 50)).is_err());
        assert_eq!(workout.aggregate().frame_count, 1);
    }

    #[test]
    fn test_finish_summarizes_sets() {
        let started = Utc::now();
        let registry = ExerciseRegistry::from_settings(&EngineSettings::default()).unwrap();
        let mut workout = Workout::starting_at(registry, started);
        workout.select_exercise(ExerciseKind::Squats).unwrap();
        feed(&mut workout, &[100.0, 108.0, 96.0], 0);
        workout.select_exercise(ExerciseKind::Planks).unwrap();
        feed(&mut workout, &[280.0, 280.0, 280.0], 1_000);

        let summary = workout.finish_at(started + chrono::Duration::seconds(10));
        assert_eq!(summary.total_reps, 1);
        assert_eq!(summary.sets.len(), 2);
        assert_eq!(summary.sets[1].hold_ms, 66);
        assert!(summary.estimated_calories > 0.0);
        assert_eq!(summary.duration_secs, 10);
    }
}
