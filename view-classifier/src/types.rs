use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

// Use the interfaces crate for core types
pub use interfaces::defs::{describe_label, ContentBlock, ConversationTurn, FewShotEncoding, ImageRef, Label, ReferenceExample, Role};

pub const DEFAULT_API_BASE: &str = "https://api.x.ai/v1";
pub const DEFAULT_MODEL: &str = "grok-4-1-fast-reasoning";

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout_seconds: 120,
            user_agent: "View-Classifier/1.0".to_string(),
        }
    }
}

impl ModelConfig {
    /// Reads `XAI_API_KEY` (required) plus optional `XAI_BASE_URL` and `XAI_MODEL`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("XAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClassifierError::Config("XAI_API_KEY is not set".to_string()))?;

        let mut config = Self::default().with_api_key(api_key);
        if let Ok(base) = env::var("XAI_BASE_URL") {
            if !base.trim().is_empty() {
                config = config.with_api_base(base);
            }
        }
        if let Ok(model) = env::var("XAI_MODEL") {
            if !model.trim().is_empty() {
                config = config.with_model(model);
            }
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// A labeled batch of screenshots and the labels that count as correct for it.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub id: String,
    pub label: String,
    pub source: PathBuf,
    pub expected: BTreeSet<Label>,
}

impl DatasetSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        source: impl Into<PathBuf>,
        expected: impl IntoIterator<Item = Label>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: source.into(),
            expected: expected.into_iter().collect(),
        }
    }

    pub fn accepts(&self, label: Label) -> bool {
        self.expected.contains(&label)
    }

    /// The two datasets the evaluation runs over, with sources resolved
    /// against `data_dir`. Flat screenshots may come back as either classic
    /// 3D or 2D, so that dataset accepts both.
    pub fn defaults(data_dir: impl Into<PathBuf>) -> Vec<DatasetSpec> {
        let data_dir = data_dir.into();
        vec![
            DatasetSpec::new("2d", "2d_images", data_dir.join("2d_images.csv"), [Label::Two, Label::Three]),
            DatasetSpec::new("3d", "3d_images", data_dir.join("3d_images.csv"), [Label::One]),
        ]
    }
}

/// Outcome of classifying one image during an evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub dataset: String,
    pub file_name: String,
    pub prediction: Option<Label>,
    pub is_correct: bool,
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load dataset {path}: {source}")]
    DatasetLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid reference examples: {0}")]
    ReferenceSet(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
