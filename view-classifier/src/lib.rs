pub mod types;
pub mod prompt;
pub mod parser;
pub mod llm_adapter;
pub mod client;
pub mod references;
pub mod dataset;
pub mod classifier;
pub mod evaluation;
pub mod summary;
pub mod utils;

pub use types::*;
pub use prompt::PromptBuilder;
pub use parser::parse_prediction;
pub use llm_adapter::{LlmAdapter, MockLlmAdapter};
pub use client::XaiChatClient;
pub use references::ReferenceSet;
pub use classifier::{Classification, Classifier};
pub use evaluation::{parse_image_limit, resolve_image_limit, EvaluationHarness};
pub use summary::{DatasetStats, EvaluationSummary, MAX_FAILURES_TO_SHOW};
