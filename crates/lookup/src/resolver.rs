//! The browser-driven [`VehicleResolver`].
//!
//! One resolution attempt is: launch a headless browser, subscribe the
//! response interceptor, run the search script, parse whatever the
//! interceptor selected, release the browser. Every failure along the way
//! is absorbed into a `found: false` record; the chat flow never sees a
//! lookup error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use rekkari_core::error::LookupError;
use rekkari_core::vehicle::VehicleRecord;
use rekkari_core::{RegistrationToken, VehicleResolver};
use rekkari_config::LookupConfig;

use crate::driver::{spawn_capture, BrowserHandle, ChromiumDriver};
use crate::interceptor::{host_of, ResponseInterceptor};
use crate::parser::parse_payload;
use crate::script::{build_search_script, run_script};

/// Resolves registrations by driving the lookup site in a headless
/// browser.
pub struct PlateLookup {
    config: LookupConfig,
}

impl PlateLookup {
    pub fn new(config: LookupConfig) -> Self {
        Self { config }
    }

    async fn try_resolve(&self, token: &RegistrationToken) -> Result<VehicleRecord, LookupError> {
        let registration = token.normalized();
        let target_host = host_of(&self.config.base_url)
            .unwrap_or("kolariautot.com")
            .to_string();

        let handle = BrowserHandle::launch(&self.config).await?;

        // Everything after launch runs behind this guard so the browser is
        // released exactly once on every path.
        let result = self.drive(&handle, token, &target_host).await;

        if let Err(e) = handle.close().await {
            warn!(error = %e, "Browser release failed");
        }

        result.map(|payload| match payload {
            Some(payload) => {
                let record = parse_payload(&registration, &payload);
                info!(
                    %registration,
                    found = record.found,
                    make = %record.make,
                    model = %record.model,
                    "Resolution attempt finished"
                );
                record
            }
            None => {
                info!(%registration, "No vehicle payload captured");
                VehicleRecord::not_found(registration)
            }
        })
    }

    async fn drive(
        &self,
        handle: &BrowserHandle,
        token: &RegistrationToken,
        target_host: &str,
    ) -> Result<Option<crate::interceptor::CapturedPayload>, LookupError> {
        let page = handle.new_page().await?;
        let interceptor = Arc::new(ResponseInterceptor::new(target_host));

        // Capture subscribes before any navigation; responses fired during
        // the initial load are the common case.
        let capture = spawn_capture(page.clone(), Arc::clone(&interceptor)).await?;

        let steps = build_search_script(&self.config, token);
        let outcomes = run_script(&ChromiumDriver::new(page), &steps).await;
        debug!(?outcomes, "Search script finished");

        capture.abort();
        Ok(interceptor.take())
    }
}

#[async_trait]
impl VehicleResolver for PlateLookup {
    async fn resolve(&self, token: &RegistrationToken) -> VehicleRecord {
        match self.try_resolve(token).await {
            Ok(record) => record,
            Err(e) => {
                warn!(registration = %token.normalized(), error = %e, "Resolution attempt failed");
                VehicleRecord::not_found(token.normalized())
            }
        }
    }
}
