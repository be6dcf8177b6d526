use std::path::PathBuf;
use std::sync::Arc;

use crate::scorer::{self, Scorer};

/// Input schema served by one process. Each running instance handles
/// exactly one variant; the other variant's route is never mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    Churn,
    Lead,
}

impl SchemaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Churn => "churn",
            SchemaVariant::Lead => "lead",
        }
    }

    /// Artifact file name used when no `--model-path` is given, matching
    /// the names the training side exports.
    pub fn default_model_path(&self) -> &'static str {
        match self {
            SchemaVariant::Churn => "model.bin",
            SchemaVariant::Lead => "pipeline_v2.bin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub variant: SchemaVariant,
    pub model_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.variant.default_model_path()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub scorer: Arc<dyn Scorer>,
    pub variant: SchemaVariant,
}

impl AppState {
    /// Loads the model artifact and moves the process to its serving state.
    /// A missing or corrupt artifact fails here, before the server binds.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let path = config.model_path();
        let scorer = scorer::load_scorer(&path)?;
        log::info!(
            "loaded {} artifact from {} for the {} schema",
            scorer.kind(),
            path.display(),
            config.variant.as_str()
        );
        Ok(Self {
            scorer: Arc::from(scorer),
            variant: config.variant,
        })
    }

    /// Builds a state around an already-constructed scorer, bypassing the
    /// artifact file. This is the substitution seam for tests.
    pub fn with_scorer(scorer: Arc<dyn Scorer>, variant: SchemaVariant) -> Self {
        Self { scorer, variant }
    }
}
