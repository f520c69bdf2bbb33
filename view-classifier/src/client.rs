use crate::llm_adapter::LlmAdapter;
use crate::types::{ClassifierError, ContentBlock, ConversationTurn, ModelConfig, Result, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Debug, Serialize)]
struct WireImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl From<&ConversationTurn> for WireMessage {
    fn from(turn: &ConversationTurn) -> Self {
        // Only user turns may carry images; text-only turns go out as a plain string.
        let content = if turn.role != Role::User && !turn.has_images() {
            WireContent::Text(turn.text())
        } else {
            WireContent::Parts(
                turn.content
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text(text) => WirePart::Text { text: text.clone() },
                        ContentBlock::Image(image) => WirePart::ImageUrl {
                            image_url: WireImageUrl { url: image.url.clone() },
                        },
                    })
                    .collect(),
            )
        };

        Self {
            role: turn.role,
            content,
        }
    }
}

/// Chat-completions client for xAI's OpenAI-compatible API.
pub struct XaiChatClient {
    client: Client,
    config: ModelConfig,
}

impl XaiChatClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClassifierError::Config("model API key is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmAdapter for XaiChatClient {
    fn adapter_name(&self) -> String {
        format!("xAI ({})", self.config.model)
    }

    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String> {
        let start_time = Instant::now();
        let request = ChatRequest {
            model: &self.config.model,
            messages: conversation.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
        };

        debug!(
            "Sending {} turns to {} ({})",
            request.messages.len(),
            self.endpoint(),
            self.config.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Model API returned HTTP {}: {}", status, body);
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = serde_json::from_str(&response.text().await?)?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ClassifierError::EmptyResponse)?;

        info!(
            "Model replied in {}ms ({} chars)",
            start_time.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }
}
