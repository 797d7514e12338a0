//! Vehicle resolution pipeline for Rekkari.
//!
//! Given a normalized registration token, drives the third-party lookup
//! site in a headless browser, passively captures the site's own JSON API
//! responses, and extracts a [`rekkari_core::VehicleRecord`]. The pipeline
//! is best-effort by contract: every internal failure surfaces as a
//! well-formed `found: false` record, never as an error.

pub mod driver;
pub mod fallback;
pub mod interceptor;
pub mod parser;
pub mod resolver;
pub mod script;

pub use driver::PageDriver;
pub use fallback::demo_record;
pub use resolver::PlateLookup;
