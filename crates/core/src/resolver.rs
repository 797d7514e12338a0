//! The vehicle resolver trait.
//!
//! The browser-driven lookup pipeline sits behind this seam so the gateway
//! can be tested without a browser. Resolution failure is expected and
//! recoverable: implementations return a `found: false` record instead of
//! an error, and the caller substitutes the demo fallback.

use async_trait::async_trait;

use crate::registration::RegistrationToken;
use crate::vehicle::VehicleRecord;

/// Resolves a registration token to a vehicle identity.
#[async_trait]
pub trait VehicleResolver: Send + Sync {
    /// Run one full resolution attempt. Never fails outward: any error in
    /// the pipeline is absorbed into a record with `found: false`.
    async fn resolve(&self, token: &RegistrationToken) -> VehicleRecord;
}
