//! Broadcast hub for dispatching room events to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connected session
//! subscribes and filters events locally by its current room, so the hub
//! never tracks membership itself.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::events::Notification;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A payload broadcast to all connected gateway sessions.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// The room this event belongs to.
    pub room_id: String,
    /// Connection to skip, for relays that must not echo to the sender.
    pub exclude: Option<String>,
    pub event: Notification,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway session should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Dispatch an event to every member of a room.
    pub fn to_room(&self, room_id: &str, event: Notification) {
        self.dispatch(BroadcastPayload {
            room_id: room_id.to_string(),
            exclude: None,
            event,
        });
    }

    /// Dispatch an event to every member of a room except one connection.
    pub fn to_room_except(&self, room_id: &str, exclude: &str, event: Notification) {
        self.dispatch(BroadcastPayload {
            room_id: room_id.to_string(),
            exclude: Some(exclude.to_string()),
            event,
        });
    }

    fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}

impl Default for GatewayBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
