pub mod analyzer;
pub mod capture;
pub mod demo;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod utils;
pub mod worker;

pub use analyzer::{AnalyzerState, ExerciseAnalyzer, ExerciseConfig};
pub use error::{EngineError, EngineResult, FrameDefect};
pub use feedback::synthesize;
pub use models::{
    AnalysisResult, BodyLandmark, ExerciseKind, Landmark, PhaseState, PoseFrame,
    SessionAggregate, WorkoutSummary,
};
pub use registry::{ExerciseRegistry, Workout};
pub use scoring::{FormScorer, GeometricScorer};
pub use settings::{EngineSettings, SettingsStore};
pub use worker::AnalysisController;

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_SETTINGS_FILE: &str = "formfit.json";

pub fn run() -> Result<()> {
    // Info by default; RUST_LOG, when set, takes precedence.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("FormFit starting up...");

    let debug_mode = std::env::var("FORMFIT_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let seed = std::env::var("FORMFIT_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());

    let settings_path = std::env::var("FORMFIT_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = SettingsStore::new(settings_path)?.settings();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let summary = runtime.block_on(demo::run_demo(&settings, debug_mode, seed))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
