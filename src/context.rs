//! Call context passed to every tool execution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Context for a single tool call issued by the host.
#[derive(Debug, Clone, Serialize)]
pub struct CallContext {
    /// Call identifier assigned by the host (generated if the host has none).
    pub call_id: String,
    /// When the host issued the call.
    pub issued_at: DateTime<Utc>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self {
            call_id: Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
        }
    }
}

impl CallContext {
    /// Create a context for a host-assigned call id.
    pub fn new(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            ..Default::default()
        }
    }

    /// Time between the host issuing the call and now. Zero if the host
    /// clock is ahead of ours.
    pub fn queued_for(&self) -> Duration {
        (Utc::now() - self.issued_at).to_std().unwrap_or(Duration::ZERO)
    }
}
