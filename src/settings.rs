use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::analyzer::ExerciseConfig;
use crate::models::{BodyLandmark, ExerciseKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Points per frame produced by the landmark model.
    pub landmark_count: usize,
    /// Frames held between capture and analysis before the oldest is dropped.
    pub queue_capacity: usize,
    pub result_buffer: usize,
    pub exercises: Vec<ExerciseConfig>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            landmark_count: BodyLandmark::COUNT,
            queue_capacity: 8,
            result_buffer: 64,
            exercises: ExerciseConfig::builtin_table(),
        }
    }
}

impl EngineSettings {
    pub fn exercise(&self, kind: ExerciseKind) -> Option<&ExerciseConfig> {
        self.exercises.iter().find(|config| config.kind == kind)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> EngineSettings {
        self.data.read().unwrap().clone()
    }

    /// Replaces (or adds) one exercise entry and writes the file back.
    pub fn update_exercise(&self, config: ExerciseConfig) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            match guard.exercises.iter_mut().find(|c| c.kind == config.kind) {
                Some(existing) => *existing = config,
                None => guard.exercises.push(config),
            }
            self.persist(&guard)?;
        }
        Ok(())
    }

    pub fn update_queue_capacity(&self, capacity: usize) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.queue_capacity = capacity.max(1);
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: EngineSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
