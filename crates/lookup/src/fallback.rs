//! Synthetic placeholder record for failed resolutions.
//!
//! Substituted so the conversation can continue demonstrating the advisor
//! flow instead of dead-ending. Every such record is tagged
//! [`DataSource::Demo`] so downstream consumers never mistake it for
//! ground truth.

use rekkari_core::vehicle::{DataSource, VehicleRecord};

/// A fixed demonstrative vehicle for the given registration.
pub fn demo_record(registration: impl Into<String>) -> VehicleRecord {
    VehicleRecord {
        registration_number: registration.into(),
        make: "BMW".into(),
        model: "318i".into(),
        year: "2008".into(),
        generation: "E90".into(),
        vin: String::new(),
        found: true,
        data_source: DataSource::Demo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_record_is_found_and_tagged() {
        let record = demo_record("ABC123");
        assert!(record.found);
        assert_eq!(record.data_source, DataSource::Demo);
        assert_eq!(record.registration_number, "ABC123");
        assert!(!record.make.is_empty());
        assert!(!record.model.is_empty());
        assert!(!record.year.is_empty());
    }
}
