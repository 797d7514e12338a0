//! The resolved vehicle identity record.

use serde::{Deserialize, Serialize};

/// Where a [`VehicleRecord`] came from.
///
/// `Demo` marks the synthetic placeholder substituted when real resolution
/// fails; no caller should treat such a record as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Resolved,
    Demo,
}

/// A vehicle identity resolved from a registration number.
///
/// Immutable once produced and attached to exactly one chat session.
/// Invariant: if `found` is true, at least one of make/model is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub generation: String,
    pub vin: String,
    pub found: bool,
    pub data_source: DataSource,
}

impl VehicleRecord {
    /// An empty-but-well-formed record for a failed resolution.
    pub fn not_found(registration: impl Into<String>) -> Self {
        Self {
            registration_number: registration.into(),
            make: String::new(),
            model: String::new(),
            year: String::new(),
            generation: String::new(),
            vin: String::new(),
            found: false,
            data_source: DataSource::Resolved,
        }
    }

    /// True when the record carries enough identity to condition a prompt.
    pub fn has_identity(&self) -> bool {
        !self.make.is_empty() || !self.model.is_empty()
    }
}
