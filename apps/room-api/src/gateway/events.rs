//! The wire protocol: commands (client → server) and notifications
//! (server → client).
//!
//! Every frame is a JSON object `{"t": <name>, "d": <payload>}` with
//! kebab-case names and camelCase payload fields. The two enums below are the
//! complete boundary contract; nothing else crosses the socket.

use serde::{Deserialize, Serialize};

use crate::error::RoomError;

use super::room::{Choice, Player, Room, RoomResult, RoomSummary};

/// A command received from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    CreateRoom {
        room_name: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        max_players: Option<u32>,
    },
    JoinRoom {
        room_id: String,
        #[serde(default)]
        username: Option<String>,
    },
    LeaveRoom {},
    StartDilemma {
        room_id: String,
        dilemma_id: String,
    },
    MakeChoice {
        choice: Choice,
    },
    UpdatePosition {
        position: [f32; 3],
        #[serde(default)]
        rotation: Option<[f32; 3]>,
    },
    GetRooms {},
}

/// A notification pushed to a client, either targeted or via room broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Handshake: the connection's fresh identity, sent once on connect.
    Connected {
        connection_id: String,
    },
    /// Targeted at the creator.
    RoomCreated {
        room_id: String,
        room: Room,
    },
    /// Targeted at the joiner.
    RoomJoined {
        room_id: String,
        room: Room,
    },
    /// Room broadcast: full authoritative snapshot after any mutation.
    RoomUpdated(Room),
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: String,
        username: String,
    },
    PlayerChoice {
        player_id: String,
        username: String,
        choice: Choice,
    },
    /// Room broadcast excluding the sender.
    PlayerMoved {
        player_id: String,
        username: String,
        position: [f32; 3],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rotation: Option<[f32; 3]>,
    },
    DilemmaStarted {
        dilemma_id: String,
    },
    RoomCompleted(RoomResult),
    HostChanged {
        new_host_id: String,
        new_host_username: String,
    },
    /// Targeted at the offending connection; never broadcast.
    Error {
        message: String,
    },
    /// Targeted snapshot reply to `get-rooms`.
    RoomsList(Vec<RoomSummary>),
}

impl Notification {
    pub fn error(err: &RoomError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}
