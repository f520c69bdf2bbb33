use crate::types::{ClassifierError, ContentBlock, ConversationTurn, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Boundary to a hosted multimodal model: one conversation in, one text reply out.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Get the name of this LLM adapter
    fn adapter_name(&self) -> String;

    /// Submit the conversation and return the model's text reply
    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String>;
}

#[async_trait]
impl<T: LlmAdapter + ?Sized> LlmAdapter for Arc<T> {
    fn adapter_name(&self) -> String {
        (**self).adapter_name()
    }

    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String> {
        (**self).complete(conversation).await
    }
}

/// Scripted adapter for development and testing.
///
/// Replies are chosen by the URL of the last image in the conversation when a
/// rule for it exists, otherwise taken from the queue, otherwise the default
/// reply is returned.
pub struct MockLlmAdapter {
    name: String,
    default_reply: Option<String>,
    by_image: HashMap<String, std::result::Result<String, String>>,
    queue: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Vec<ConversationTurn>>>,
}

impl MockLlmAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_reply: None,
            by_image: HashMap::new(),
            queue: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    pub fn with_reply_for(mut self, image_url: impl Into<String>, reply: impl Into<String>) -> Self {
        self.by_image.insert(image_url.into(), Ok(reply.into()));
        self
    }

    pub fn with_failure_for(mut self, image_url: impl Into<String>, message: impl Into<String>) -> Self {
        self.by_image.insert(image_url.into(), Err(message.into()));
        self
    }

    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.queue.lock() {
            queue.extend(replies.into_iter().map(|reply| Ok(reply.into())));
        }
        self
    }

    /// Conversations received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<ConversationTurn>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn target_image(conversation: &[ConversationTurn]) -> Option<&str> {
        conversation.last()?.content.iter().rev().find_map(|block| match block {
            ContentBlock::Image(image) => Some(image.url.as_str()),
            ContentBlock::Text(_) => None,
        })
    }
}

#[async_trait]
impl LlmAdapter for MockLlmAdapter {
    fn adapter_name(&self) -> String {
        format!("Mock LLM Adapter ({})", self.name)
    }

    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(conversation.to_vec());
        }

        let target = Self::target_image(conversation);
        debug!("Mock adapter answering for {:?}", target);

        let scripted = target
            .and_then(|url| self.by_image.get(url).cloned())
            .or_else(|| self.queue.lock().ok().and_then(|mut queue| queue.pop_front()));

        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ClassifierError::General(message)),
            None => self.default_reply.clone().ok_or(ClassifierError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(url: &str) -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::system("rules"),
            ConversationTurn::user(vec![ContentBlock::text("classify"), ContentBlock::image(url)]),
        ]
    }

    #[tokio::test]
    async fn rules_take_priority_over_queue() {
        let adapter = MockLlmAdapter::new("test")
            .with_reply_for("https://example.com/a.jpg", "1")
            .with_replies(["2", "3"])
            .with_default_reply("no idea");

        assert_eq!(adapter.complete(&conversation("https://example.com/a.jpg")).await.unwrap(), "1");
        assert_eq!(adapter.complete(&conversation("https://example.com/b.jpg")).await.unwrap(), "2");
        assert_eq!(adapter.complete(&conversation("https://example.com/c.jpg")).await.unwrap(), "3");
        assert_eq!(adapter.complete(&conversation("https://example.com/d.jpg")).await.unwrap(), "no idea");
        assert_eq!(adapter.call_count(), 4);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_errors() {
        let adapter = MockLlmAdapter::new("test").with_failure_for("https://example.com/bad.jpg", "rate limited");
        let err = adapter.complete(&conversation("https://example.com/bad.jpg")).await.unwrap_err();
        assert_eq!(err.to_string(), "General error: rate limited");
    }

    #[tokio::test]
    async fn no_script_means_empty_response() {
        let adapter = MockLlmAdapter::new("test");
        let err = adapter.complete(&conversation("https://example.com/x.jpg")).await.unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyResponse));
    }
}
