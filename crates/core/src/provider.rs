//! The completion provider trait.
//!
//! The language model is an opaque external service: role-tagged messages
//! in, text out. Implementations live in `rekkari-providers`; tests stub
//! this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// A request to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The completion service's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Text-in/text-out completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Send a completion request and await the full reply.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;
}
