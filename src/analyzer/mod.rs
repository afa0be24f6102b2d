pub mod config;
pub mod state;

pub use config::ExerciseConfig;
pub use state::AnalyzerState;

use std::sync::Arc;

use crate::error::EngineResult;
use crate::models::{AnalysisResult, ExerciseKind, PhaseState, PoseFrame};
use crate::scoring::{FormScorer, GeometricScorer};

/// Rep counter and form scorer for one exercise kind.
///
/// All per-exercise variation lives in [`ExerciseConfig`] and the scorer; the
/// phase detection itself is shared through [`AnalyzerState::step`].
pub struct ExerciseAnalyzer {
    config: ExerciseConfig,
    landmark_count: usize,
    scorer: Arc<dyn FormScorer>,
    state: AnalyzerState,
}

impl ExerciseAnalyzer {
    pub fn new(config: ExerciseConfig, landmark_count: usize) -> EngineResult<Self> {
        let scorer = Arc::new(GeometricScorer::new(
            config.scoring.clone(),
            config.min_confidence,
        ));
        Self::with_scorer(config, landmark_count, scorer)
    }

    pub fn with_scorer(
        config: ExerciseConfig,
        landmark_count: usize,
        scorer: Arc<dyn FormScorer>,
    ) -> EngineResult<Self> {
        config.validate(landmark_count)?;
        Ok(Self {
            config,
            landmark_count,
            scorer,
            state: AnalyzerState::new(),
        })
    }

    /// Feeds one frame. On error the analyzer state is left as it was.
    pub fn process(&mut self, frame: &PoseFrame) -> EngineResult<AnalysisResult> {
        let (next, result) =
            self.state
                .step(&self.config, self.landmark_count, self.scorer.as_ref(), frame)?;
        self.state = next;
        Ok(result)
    }

    /// Zeroes counters and forgets the previous frame; configuration is kept.
    pub fn reset(&mut self) {
        self.state = AnalyzerState::new();
    }

    /// Ends the current streak of consecutive frames while keeping counters.
    /// The next frame becomes a fresh reference and adds no hold time.
    pub fn suspend(&mut self) {
        self.state.last_frame = None;
    }

    pub fn kind(&self) -> ExerciseKind {
        self.config.kind
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn scorer(&self) -> Arc<dyn FormScorer> {
        Arc::clone(&self.scorer)
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    pub fn phase(&self) -> PhaseState {
        self.state.phase
    }

    pub fn state(&self) -> &AnalyzerState {
        &self.state
    }

    /// Resumes from a previously captured state record.
    pub fn restore(&mut self, state: AnalyzerState) {
        self.state = state;
    }
}
