//! # Rekkari Core
//!
//! Domain types, traits, and error definitions for the Rekkari vehicle-chat
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two expensive collaborators — the headless-browser lookup and the
//! completion service — are defined as traits here. Implementations live in
//! their respective crates (`rekkari-lookup`, `rekkari-providers`), which
//! keeps the gateway and agent testable with stub implementations.

pub mod error;
pub mod message;
pub mod provider;
pub mod registration;
pub mod resolver;
pub mod vehicle;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse};
pub use registration::{PlateShape, RegistrationToken};
pub use resolver::VehicleResolver;
pub use vehicle::{DataSource, VehicleRecord};
