//! Session-scoped context store.
//!
//! A keyed mapping from session id to conversation state, held in process
//! memory. The store is shared process-wide mutable state; it is safe for a
//! single-process deployment but is NOT safe to share across multiple
//! process instances without an external store — a known scaling limit,
//! not a defect.
//!
//! Expiry is opportunistic: [`SessionStore::sweep_expired`] runs on every
//! chat request and evicts sessions whose id-encoded creation timestamp is
//! older than the configured TTL. Caller-supplied ids that do not encode a
//! timestamp are never swept by this mechanism (see [`encoded_timestamp`]).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use rekkari_core::message::Message;
use rekkari_core::vehicle::VehicleRecord;

const SESSION_ID_PREFIX: &str = "session-";

/// Per-session resolution progress.
///
/// `Resolving` is non-interruptible: a second message arriving while a
/// lookup is in flight must not start another one. `Resolved` absorbs all
/// subsequent vehicle-related input — a later message with a different
/// plate does not overwrite the attached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
}

/// One conversation's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<Message>,
    pub vehicle: Option<VehicleRecord>,
    pub resolution: ResolutionState,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    fn new(id: String) -> Self {
        Self {
            id,
            messages: Vec::new(),
            vehicle: None,
            resolution: ResolutionState::Unresolved,
            created_at: Utc::now(),
        }
    }

}

/// Generate a fresh session id encoding its creation time in milliseconds.
pub fn generate_session_id() -> String {
    format!("{SESSION_ID_PREFIX}{}", Utc::now().timestamp_millis())
}

/// Extract the creation timestamp a session id encodes, if any.
///
/// Accepts both the `session-<millis>` spelling produced by
/// [`generate_session_id`] and a bare numeric id. Returns `None` for
/// caller-supplied ids in any other format; such sessions bypass the sweep.
pub fn encoded_timestamp(id: &str) -> Option<i64> {
    let digits = id.strip_prefix(SESSION_ID_PREFIX).unwrap_or(id);
    digits.parse::<i64>().ok()
}

/// Strictly older than the TTL; a session at exactly TTL age still lives.
fn is_expired(created: i64, now: i64, ttl_millis: i64) -> bool {
    now - created > ttl_millis
}

/// Keyed store of chat sessions with time-based eviction.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ChatSession>>,
    ttl_millis: i64,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl_millis: (ttl_secs as i64).saturating_mul(1000),
        }
    }

    /// Fetch a session by id, creating it (empty messages, no vehicle) on
    /// first reference. Returns the effective id and a clone of the session.
    pub async fn get_or_create(&self, id: Option<&str>) -> ChatSession {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_session_id(),
        };
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(session_id = %id, "Created session");
                ChatSession::new(id.clone())
            })
            .clone()
    }

    /// A snapshot of a session, if it exists.
    pub async fn get(&self, id: &str) -> Option<ChatSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Replace a session wholesale.
    pub async fn upsert(&self, session: ChatSession) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    /// Append a message to a session's ordered sequence.
    pub async fn append_message(&self, id: &str, message: Message) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.messages.push(message);
        }
    }

    /// Claim the resolution slot for a session.
    ///
    /// Returns `true` only when the session was `Unresolved`; the caller
    /// then owns the single resolution attempt for this session. Any other
    /// state means a lookup already ran or is in flight.
    pub async fn begin_resolution(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.resolution == ResolutionState::Unresolved => {
                session.resolution = ResolutionState::Resolving;
                true
            }
            _ => false,
        }
    }

    /// Attach a vehicle record to a session. Idempotent: a no-op when the
    /// session already carries a record — first resolution wins.
    pub async fn attach_vehicle(&self, id: &str, record: VehicleRecord) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(id) {
            if session.vehicle.is_some() {
                debug!(session_id = %id, "Vehicle already attached, ignoring");
            } else {
                session.vehicle = Some(record);
            }
            session.resolution = ResolutionState::Resolved;
        }
    }

    /// Remove sessions whose id-encoded creation timestamp is older than
    /// the TTL. Sessions with non-encoding ids are left alone.
    pub async fn sweep_expired(&self) {
        let now = Utc::now().timestamp_millis();
        let ttl = self.ttl_millis;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, _| match encoded_timestamp(id) {
            Some(created) => !is_expired(created, now, ttl),
            None => {
                // Caller-supplied id with no embedded timestamp: the sweep
                // cannot age it, so it lives until process restart.
                debug!(session_id = %id, "Session id encodes no timestamp, skipping sweep");
                true
            }
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Swept expired sessions");
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
