//! Request handlers for the chat, vehicle, and health endpoints.
//!
//! The chat handler owns the conversation flow: it decides when a message
//! triggers a vehicle resolution, substitutes the demo record when
//! resolution comes back empty, and only then asks the advisor for a
//! reply. A message with no plate-shaped token short-circuits into a
//! fixed re-prompt without touching the resolver at all.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use rekkari_agent::{recommendations_for, Recommendation};
use rekkari_core::message::Message;
use rekkari_core::vehicle::VehicleRecord;
use rekkari_lookup::demo_record;

use crate::SharedState;

/// Fixed reply when the conversation still needs a registration number.
const REPROMPT: &str = "Anna rekisterinumero (esim. ABC-123)";

/// User-facing text for provider failures. Details carry the real cause.
const PROVIDER_APOLOGY: &str =
    "Pahoittelut, palvelussa tapahtui virhe. Yritä hetken kuluttua uudelleen.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub vehicle_info: Option<VehicleRecord>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: &str, details: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            details: details.into(),
        }),
    )
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(bad_request("Viesti puuttuu", "message must not be empty"));
    }

    // Expiry is opportunistic: every chat request sweeps first.
    state.sessions.sweep_expired().await;

    let session = state
        .sessions
        .get_or_create(payload.session_id.as_deref())
        .await;
    let session_id = session.id.clone();

    state
        .sessions
        .append_message(&session_id, Message::user(&payload.message))
        .await;

    if session.vehicle.is_none() {
        let shape = state.config.lookup.plate_shape;
        match shape.find_in(&payload.message) {
            None => {
                // No plate anywhere in the message: re-prompt without any
                // resolution work.
                state
                    .sessions
                    .append_message(&session_id, Message::assistant(REPROMPT))
                    .await;
                return Ok(Json(ChatResponse {
                    message: REPROMPT.into(),
                    session_id,
                    vehicle_info: None,
                    recommendations: Vec::new(),
                }));
            }
            Some(token) => {
                if state.sessions.begin_resolution(&session_id).await {
                    info!(session_id = %session_id, registration = %token, "Starting vehicle resolution");
                    // Detached from this request: a client disconnect drops
                    // the handler future, but the claimed session must
                    // still reach Resolved.
                    let task_state = state.clone();
                    let task_session = session_id.clone();
                    let resolution = tokio::spawn(async move {
                        let mut record = task_state.resolver.resolve(&token).await;
                        if !record.found {
                            info!(registration = %token, "Resolution empty, substituting demo record");
                            record = demo_record(token.normalized());
                        }
                        task_state
                            .sessions
                            .attach_vehicle(&task_session, record)
                            .await;
                    });
                    if let Err(e) = resolution.await {
                        error!(error = %e, "Resolution task failed");
                    }
                }
            }
        }
    }

    // Re-read so this turn sees the freshly attached vehicle and the
    // appended user message.
    let session = state
        .sessions
        .get(&session_id)
        .await
        .unwrap_or(session);

    let recommendations = session
        .vehicle
        .as_ref()
        .map(recommendations_for)
        .unwrap_or_default();

    let reply = state
        .advisor
        .reply(session.vehicle.as_ref(), &session.messages)
        .await
        .map_err(|e| {
            error!(error = %e, "Completion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: PROVIDER_APOLOGY.into(),
                    details: e.to_string(),
                }),
            )
        })?;

    state
        .sessions
        .append_message(&session_id, Message::assistant(&reply))
        .await;

    Ok(Json(ChatResponse {
        message: reply,
        session_id,
        vehicle_info: session.vehicle,
        recommendations,
    }))
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub vehicle: VehicleRecord,
    pub recommendations: Vec<Recommendation>,
}

/// Direct lookup, bypassing any session.
pub async fn vehicle_handler(
    State(state): State<SharedState>,
    Path(registration): Path<String>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let shape = state.config.lookup.plate_shape;
    let token = shape.find_in(&registration).ok_or_else(|| {
        bad_request(
            "Virheellinen rekisterinumero",
            format!("'{registration}' is not a valid registration"),
        )
    })?;

    let mut vehicle = state.resolver.resolve(&token).await;
    if !vehicle.found {
        vehicle = demo_record(token.normalized());
    }
    let recommendations = recommendations_for(&vehicle);

    Ok(Json(VehicleResponse {
        vehicle,
        recommendations,
    }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, GatewayState};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    use rekkari_agent::ChatAdvisor;
    use rekkari_config::AppConfig;
    use rekkari_core::error::ProviderError;
    use rekkari_core::provider::{CompletionRequest, CompletionResponse};
    use rekkari_core::vehicle::DataSource;
    use rekkari_core::{CompletionProvider, RegistrationToken, VehicleResolver};
    use rekkari_session::SessionStore;

    struct StubResolver {
        record: VehicleRecord,
        calls: AtomicUsize,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl VehicleResolver for StubResolver {
        async fn resolve(&self, token: &RegistrationToken) -> VehicleRecord {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let mut record = self.record.clone();
            record.registration_number = token.normalized();
            record
        }
    }

    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "boom".into(),
                });
            }
            Ok(CompletionResponse {
                content: "Tässä kustannusarvio.".into(),
                model: "stub-1".into(),
            })
        }
    }

    fn resolved_record() -> VehicleRecord {
        VehicleRecord {
            registration_number: "ABC123".into(),
            make: "BMW".into(),
            model: "3 Series 320i".into(),
            year: "2010".into(),
            generation: "E90".into(),
            vin: String::new(),
            found: true,
            data_source: DataSource::Resolved,
        }
    }

    fn test_state(resolver: Arc<StubResolver>, provider_fails: bool) -> crate::SharedState {
        let config = AppConfig::default();
        let provider = Arc::new(StubProvider {
            fail: provider_fails,
        });
        Arc::new(GatewayState {
            sessions: SessionStore::new(config.session.ttl_secs),
            resolver,
            advisor: ChatAdvisor::new(
                provider,
                config.provider.clone(),
                config.session.clone(),
            ),
            config,
        })
    }

    fn resolver(record: VehicleRecord) -> Arc<StubResolver> {
        Arc::new(StubResolver {
            record,
            calls: AtomicUsize::new(0),
            delay: std::time::Duration::ZERO,
        })
    }

    async fn post_chat(
        app: &axum::Router,
        message: &str,
        session_id: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut body = serde_json::json!({ "message": message });
        if let Some(id) = session_id {
            body["sessionId"] = id.into();
        }
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(resolver(resolved_record()), false));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn chat_without_plate_reprompts_without_resolving() {
        let stub = resolver(resolved_record());
        let app = build_router(test_state(stub.clone(), false));

        let (status, body) = post_chat(&app, "Moi, autossa on vikaa", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], REPROMPT);
        assert!(body["vehicleInfo"].is_null());
        assert!(body["sessionId"].as_str().unwrap().starts_with("session-"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_with_plate_resolves_once_per_session() {
        let stub = resolver(resolved_record());
        let app = build_router(test_state(stub.clone(), false));

        let (status, body) = post_chat(&app, "ABC-123 tärisee", Some("session-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vehicleInfo"]["make"], "BMW");
        assert_eq!(body["vehicleInfo"]["dataSource"], "resolved");
        assert_eq!(body["message"], "Tässä kustannusarvio.");
        assert!(!body["recommendations"].as_array().unwrap().is_empty());

        // A second message, even with a different plate, reuses the record.
        let (_, body) = post_chat(&app, "Entä DEF-456?", Some("session-1")).await;
        assert_eq!(body["vehicleInfo"]["registrationNumber"], "ABC123");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_resolution_substitutes_demo_record() {
        let stub = resolver(VehicleRecord::not_found("ABC123"));
        let app = build_router(test_state(stub, false));

        let (status, body) = post_chat(&app, "abc 123 savuttaa", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vehicleInfo"]["found"], true);
        assert_eq!(body["vehicleInfo"]["dataSource"], "demo");
        assert_eq!(body["vehicleInfo"]["registrationNumber"], "ABC123");
    }

    #[tokio::test]
    async fn disconnected_client_does_not_wedge_resolution() {
        let stub = Arc::new(StubResolver {
            record: resolved_record(),
            calls: AtomicUsize::new(0),
            delay: std::time::Duration::from_millis(80),
        });
        let state = test_state(stub, false);
        let app = build_router(state.clone());

        // Drop the request future mid-lookup, as a client disconnect does.
        let request = post_chat(&app, "ABC-123 tärisee", Some("session-1"));
        let aborted = tokio::time::timeout(std::time::Duration::from_millis(10), request).await;
        assert!(aborted.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        let session = state.sessions.get("session-1").await.unwrap();
        assert_eq!(session.resolution, rekkari_session::ResolutionState::Resolved);
        assert!(session.vehicle.is_some());
    }

    #[tokio::test]
    async fn provider_failure_yields_500_with_apology() {
        let app = build_router(test_state(resolver(resolved_record()), true));

        let (status, body) = post_chat(&app, "ABC-123 tärisee", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], PROVIDER_APOLOGY);
        assert!(body["details"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let app = build_router(test_state(resolver(resolved_record()), false));
        let (status, _) = post_chat(&app, "   ", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn vehicle_endpoint_resolves_directly() {
        let app = build_router(test_state(resolver(resolved_record()), false));
        let req = Request::builder()
            .uri("/vehicle/ABC-123")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["vehicle"]["make"], "BMW");
        assert!(!body["recommendations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn vehicle_endpoint_rejects_malformed_registration() {
        let app = build_router(test_state(resolver(resolved_record()), false));
        let req = Request::builder()
            .uri("/vehicle/notaplate")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
