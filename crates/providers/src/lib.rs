//! Completion-service client implementations for Rekkari.
//!
//! The chat reply generation is treated as an opaque external service:
//! role-tagged messages in, text out. The OpenAI-compatible implementation
//! covers OpenAI itself and every endpoint speaking the same
//! `/chat/completions` dialect.

mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;

use rekkari_core::CompletionProvider;

/// Build the configured completion provider.
pub fn build_from_config(config: &rekkari_config::ProviderConfig) -> Arc<dyn CompletionProvider> {
    Arc::new(OpenAiCompatProvider::new(
        "openai",
        &config.base_url,
        config.api_key.clone().unwrap_or_default(),
    ))
}
