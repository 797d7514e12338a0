//! Passive capture of the lookup site's JSON API responses.
//!
//! The site's frontend fetches vehicle data over XHR; instead of scraping
//! the rendered DOM we listen to network responses and keep the first JSON
//! body that looks like vehicle data. Capture must be wired up before
//! navigation starts or early responses are lost.

use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, warn};

/// A JSON response body captured from the lookup site, with the URL it
/// came from.
#[derive(Debug, Clone)]
pub struct CapturedPayload {
    pub url: String,
    pub body: Value,
}

/// Decides which network responses to keep.
///
/// First match wins: later responses matching the predicate are logged and
/// dropped, so the selected payload never changes once set. A payload
/// qualifies when it carries a top-level composite `name` string or a
/// `chassis` object with manufacturer or model fields.
pub struct ResponseInterceptor {
    target_host: String,
    selected: Mutex<Option<CapturedPayload>>,
}

impl ResponseInterceptor {
    pub fn new(target_host: impl Into<String>) -> Self {
        Self {
            target_host: target_host.into(),
            selected: Mutex::new(None),
        }
    }

    /// Whether a response is worth fetching the body for: JSON content
    /// served from the lookup site's host.
    pub fn matches_target(&self, url: &str, mime_type: &str) -> bool {
        if !mime_type.contains("json") {
            return false;
        }
        host_of(url).is_some_and(|host| host == self.target_host)
    }

    /// Offer a response body for selection. Returns `true` when this body
    /// became the selected payload.
    ///
    /// Undecodable bodies are logged and ignored; a bad response must not
    /// poison the attempt while a good one may still arrive.
    pub fn offer(&self, url: &str, raw_body: &str) -> bool {
        let value: Value = match serde_json::from_str(raw_body) {
            Ok(value) => value,
            Err(e) => {
                debug!(%url, error = %e, "Dropping undecodable response body");
                return false;
            }
        };
        if !payload_has_vehicle_shape(&value) {
            debug!(%url, "Response is not vehicle-shaped, dropping");
            return false;
        }

        let mut selected = match self.selected.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if selected.is_some() {
            debug!(%url, "Vehicle payload already selected, dropping later candidate");
            return false;
        }
        debug!(%url, "Selected vehicle payload");
        *selected = Some(CapturedPayload {
            url: url.to_string(),
            body: value,
        });
        true
    }

    /// The selected payload, if any response qualified.
    pub fn take(&self) -> Option<CapturedPayload> {
        match self.selected.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Structural predicate for vehicle data.
fn payload_has_vehicle_shape(value: &Value) -> bool {
    if value.get("name").is_some_and(Value::is_string) {
        return true;
    }
    value
        .get("chassis")
        .and_then(Value::as_object)
        .is_some_and(|chassis| {
            chassis.contains_key("manufacturer") || chassis.contains_key("model")
        })
}

/// The host portion of a URL, without scheme, port, or path.
pub fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = host.split('@').next_back().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        warn!(%url, "Could not extract host from URL");
        None
    } else {
        Some(host)
    }
}
