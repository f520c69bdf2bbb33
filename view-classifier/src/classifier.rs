use crate::llm_adapter::LlmAdapter;
use crate::parser::parse_prediction;
use crate::prompt::PromptBuilder;
use crate::references::ReferenceSet;
use crate::types::{Label, Result};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Classification {
    /// Raw reply text from the model
    pub reply: String,
    pub prediction: Option<Label>,
}

/// Classifies screenshots by sending a few-shot conversation to an [`LlmAdapter`].
pub struct Classifier {
    adapter: Box<dyn LlmAdapter>,
    prompt_builder: PromptBuilder,
    references: ReferenceSet,
}

impl Classifier {
    pub fn new(adapter: Box<dyn LlmAdapter>, references: ReferenceSet) -> Self {
        Self {
            adapter,
            prompt_builder: PromptBuilder::default(),
            references,
        }
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn adapter_name(&self) -> String {
        self.adapter.adapter_name()
    }

    pub async fn classify(&self, image_url: &str, reasoning: bool) -> Result<Classification> {
        let conversation = self
            .prompt_builder
            .build_conversation(image_url, self.references.examples(), reasoning);

        let reply = self.adapter.complete(&conversation).await?;
        let prediction = parse_prediction(&reply);
        debug!("Classified {} as {:?}", image_url, prediction);

        Ok(Classification { reply, prediction })
    }
}
