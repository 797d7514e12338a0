//! The chat advisor: one prompt assembly plus one completion call.

use std::sync::Arc;

use tracing::debug;

use rekkari_core::error::ProviderError;
use rekkari_core::message::Message;
use rekkari_core::vehicle::VehicleRecord;
use rekkari_core::CompletionProvider;
use rekkari_config::{ProviderConfig, SessionConfig};

use crate::assembler::assemble_request;

/// Produces assistant replies for chat turns.
pub struct ChatAdvisor {
    provider: Arc<dyn CompletionProvider>,
    provider_config: ProviderConfig,
    session_config: SessionConfig,
}

impl ChatAdvisor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        provider_config: ProviderConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            provider,
            provider_config,
            session_config,
        }
    }

    /// Generate a reply for the conversation so far.
    pub async fn reply(
        &self,
        vehicle: Option<&VehicleRecord>,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        let request = assemble_request(
            &self.provider_config,
            &self.session_config,
            vehicle,
            messages,
        );
        debug!(
            provider = self.provider.name(),
            message_count = request.messages.len(),
            with_vehicle = vehicle.is_some_and(|v| v.found),
            "Requesting completion"
        );
        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}
