//! Advisor layer for Rekkari: static workshop knowledge, prompt assembly,
//! and the chat reply loop on top of a [`rekkari_core::CompletionProvider`].

pub mod advisor;
pub mod assembler;
pub mod knowledge;

pub use advisor::ChatAdvisor;
pub use knowledge::{recommendations_for, Recommendation};
