//! Composio connection records.
//!
//! A connection links the user's account to a third-party app. The server
//! is the source of truth; the client holds them in the optimistic store
//! (`core::store`) keyed by `app_key` — one record per app per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Pending,
    Error,
    Expired,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub qualified_name: String,
    pub app_key: String,
    pub app_name: String,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Placeholder record inserted while a create request is in flight.
    /// Replaced by the server record on success, rolled back on failure.
    pub fn pending(app_key: &str, app_name: &str) -> Self {
        let now = Utc::now();
        Connection {
            id: format!("pending-{app_key}"),
            qualified_name: format!("composio/{app_key}"),
            app_key: app_key.to_string(),
            app_name: app_name.to_string(),
            status: ConnectionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_placeholder_is_keyed_by_app() {
        let conn = Connection::pending("gmail", "Gmail");
        assert_eq!(conn.app_key, "gmail");
        assert_eq!(conn.status, ConnectionStatus::Pending);
        assert_eq!(conn.qualified_name, "composio/gmail");
    }

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in [
            ConnectionStatus::Connected,
            ConnectionStatus::Pending,
            ConnectionStatus::Error,
            ConnectionStatus::Expired,
        ] {
            let json = serde_json::to_string(&status).expect("serializes");
            assert_eq!(json.trim_matches('"'), status.as_str());
            let back: ConnectionStatus = serde_json::from_str(&json).expect("deserializes");
            assert_eq!(back, status);
        }
    }
}
