//! Per-connection gateway session state.

use dilemma_common::id::{prefix, prefixed_ulid};

use super::fanout::BroadcastPayload;

/// State for a single WebSocket connection. Owned mutably by the
/// connection's event loop; the identity is fresh per connect and never
/// survives a reconnect.
pub struct GatewaySession {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub connection_id: String,
    /// Display name, set by the first create/join command.
    pub username: Option<String>,
    /// The room this connection currently inhabits, if any.
    pub room_id: Option<String>,
}

impl GatewaySession {
    pub fn new() -> Self {
        Self {
            connection_id: prefixed_ulid(prefix::CONNECTION),
            username: None,
            room_id: None,
        }
    }

    /// Check whether this session should receive a broadcast payload: it must
    /// be in the payload's room and not be the excluded sender.
    pub fn wants(&self, payload: &BroadcastPayload) -> bool {
        self.room_id.as_deref() == Some(payload.room_id.as_str())
            && payload.exclude.as_deref() != Some(self.connection_id.as_str())
    }
}

impl Default for GatewaySession {
    fn default() -> Self {
        Self::new()
    }
}
