//! HTTP API gateway for Rekkari.
//!
//! Exposes the chat endpoint, the direct vehicle lookup endpoint, and a
//! health check. Built on Axum.
//!
//! Layers applied to the full router:
//! - CORS from the configured allowed origins
//! - Request body size limit (1 MB)
//! - In-memory rate limiting (60 req/min per client, /health exempt)
//! - HTTP trace logging

pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use rekkari_agent::ChatAdvisor;
use rekkari_config::AppConfig;
use rekkari_core::VehicleResolver;
use rekkari_lookup::PlateLookup;
use rekkari_session::SessionStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub resolver: Arc<dyn VehicleResolver>,
    pub advisor: ChatAdvisor,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes and layers.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);
    let rate_limiter = Arc::new(RateLimiter::new(60, std::time::Duration::from_secs(60)));

    Router::new()
        .route("/chat", post(routes::chat_handler))
        .route("/vehicle/{registration}", get(routes::vehicle_handler))
        .route("/health", get(routes::health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS: explicit origins from config; an empty list means same-origin
/// only. Origins that do not parse are logged and skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable allowed origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Build the runtime state and start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = rekkari_providers::build_from_config(&config.provider);
    let resolver: Arc<dyn VehicleResolver> = Arc::new(PlateLookup::new(config.lookup.clone()));
    let state = Arc::new(GatewayState {
        sessions: SessionStore::new(config.session.ttl_secs),
        resolver,
        advisor: ChatAdvisor::new(provider, config.provider.clone(), config.session.clone()),
        config,
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key. Thread-safe via
/// `std::sync::Mutex` (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: std::time::Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<std::time::Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: std::time::Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    fn check(&self, client_key: &str) -> bool {
        let now = std::time::Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Periodic cleanup: if map grows too large, evict stale entries
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Rate limiting middleware keyed on the client IP header, falling back to
/// "anonymous". Returns 429 when exceeded. The /health endpoint is exempt
/// so monitoring can poll it freely.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let client_key = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if !limiter.check(&client_key) {
        warn!(client = %client_key.chars().take(40).collect::<String>(), "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}
