//! Extraction of structured vehicle fields from a captured payload.
//!
//! The site's composite `name` string comes in two spellings:
//!
//! - `MAKE MODEL (YEAR)`, e.g. `Toyota Corolla (2015)`
//! - `MAKE MODEL_PREFIX (GEN_CODES) MODEL_SUFFIX (YEAR)`, e.g.
//!   `BMW 3 Series (E90) 320i (2010)` where the parenthesized codes name
//!   the platform generation.
//!
//! The complex spelling is tried first. When neither matches, the
//! `chassis` sub-object supplies make and model as a last resort.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use rekkari_core::vehicle::{DataSource, VehicleRecord};

use crate::interceptor::CapturedPayload;

static COMPLEX_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+(.+?)\s+\(([^)]+)\)\s+(.+?)\s+\((\d{4})\)\s*$")
        .expect("valid pattern")
});

static SIMPLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+(.+?)\s+\((\d{4})\)\s*$").expect("valid pattern")
});

/// Build a [`VehicleRecord`] from a captured payload.
///
/// `registration` is the normalized token the lookup ran for; the record
/// always echoes it back. Fields that cannot be extracted stay empty, and
/// the record reports `found` only when it recovered enough identity to
/// condition a prompt on.
pub fn parse_payload(registration: &str, payload: &CapturedPayload) -> VehicleRecord {
    let mut record = VehicleRecord::not_found(registration);

    if let Some(name) = payload.body.get("name").and_then(Value::as_str) {
        parse_name(name, &mut record);
    }

    // Chassis fields fill whatever the name string did not yield.
    if let Some(chassis) = payload.body.get("chassis").and_then(Value::as_object) {
        if record.make.is_empty()
            && let Some(manufacturer) = chassis.get("manufacturer").and_then(Value::as_str)
        {
            record.make = manufacturer.trim().to_string();
        }
        if record.model.is_empty()
            && let Some(model) = chassis.get("model").and_then(Value::as_str)
        {
            record.model = model.trim().to_string();
        }
        if let Some(vin) = chassis.get("vin").and_then(Value::as_str) {
            record.vin = vin.to_string();
        }
    }

    // A top-level VIN wins over the chassis one. Copied verbatim, no
    // checksum validation.
    if let Some(vin) = payload.body.get("vin").and_then(Value::as_str) {
        record.vin = vin.to_string();
    }

    record.found = record.has_identity();
    if record.found {
        record.data_source = DataSource::Resolved;
    } else {
        debug!(%registration, url = %payload.url, "Payload yielded no usable make/model");
    }
    record
}

fn parse_name(name: &str, record: &mut VehicleRecord) {
    if let Some(caps) = COMPLEX_NAME.captures(name) {
        record.make = caps[1].to_string();
        record.model = format!("{} {}", &caps[2], &caps[4]);
        record.generation = first_generation_code(&caps[3]);
        record.year = caps[5].to_string();
    } else if let Some(caps) = SIMPLE_NAME.captures(name) {
        record.make = caps[1].to_string();
        record.model = caps[2].to_string();
        record.year = caps[3].to_string();
    } else {
        debug!(%name, "Composite name matched neither spelling");
    }
}

/// The first code from a `,`/`/`-separated generation list, e.g.
/// `E90, E91, E92` yields `E90`.
fn first_generation_code(codes: &str) -> String {
    codes
        .split([',', '/'])
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: Value) -> CapturedPayload {
        CapturedPayload {
            url: "https://kolariautot.com/api/v".into(),
            body,
        }
    }

    #[test]
    fn parses_complex_name_with_generation() {
        let record = parse_payload(
            "ABC123",
            &payload(json!({"name": "BMW 3 Series (E90) 320i (2010)"})),
        );
        assert!(record.found);
        assert_eq!(record.make, "BMW");
        assert_eq!(record.model, "3 Series 320i");
        assert_eq!(record.generation, "E90");
        assert_eq!(record.year, "2010");
        assert_eq!(record.data_source, DataSource::Resolved);
        assert_eq!(record.registration_number, "ABC123");
    }

    #[test]
    fn generation_list_takes_first_code() {
        let record = parse_payload(
            "ABC123",
            &payload(json!({"name": "BMW 3 Series (E90, E91, E92) 318d (2009)"})),
        );
        assert_eq!(record.generation, "E90");

        let record = parse_payload(
            "ABC123",
            &payload(json!({"name": "BMW 5 Series (E60/E61) 525i (2006)"})),
        );
        assert_eq!(record.generation, "E60");
    }

    #[test]
    fn parses_simple_name() {
        let record = parse_payload("XYZ789", &payload(json!({"name": "Toyota Corolla (2015)"})));
        assert!(record.found);
        assert_eq!(record.make, "Toyota");
        assert_eq!(record.model, "Corolla");
        assert_eq!(record.year, "2015");
        assert_eq!(record.generation, "");
    }

    #[test]
    fn chassis_fallback_when_name_unparseable() {
        let record = parse_payload(
            "ABC123",
            &payload(json!({
                "name": "???",
                "chassis": {"manufacturer": "Volvo", "model": "V70", "vin": "YV1SW61R012345678"}
            })),
        );
        assert!(record.found);
        assert_eq!(record.make, "Volvo");
        assert_eq!(record.model, "V70");
        assert_eq!(record.vin, "YV1SW61R012345678");
        assert_eq!(record.year, "");
    }

    #[test]
    fn top_level_vin_wins() {
        let record = parse_payload(
            "ABC123",
            &payload(json!({
                "name": "BMW 318i (2008)",
                "vin": "WBAAAA",
                "chassis": {"vin": "OTHER"}
            })),
        );
        assert_eq!(record.vin, "WBAAAA");
    }

    #[test]
    fn empty_payload_is_not_found() {
        let record = parse_payload("ABC123", &payload(json!({"status": "ok"})));
        assert!(!record.found);
        assert_eq!(record.data_source, DataSource::Resolved);
        assert_eq!(record.registration_number, "ABC123");
    }
}
