//! Client-side state mirror.
//!
//! A read-only local copy of room state driven entirely by server
//! notifications. A client embeds one of these next to its transport: every
//! frame received is fed to [`ClientMirror::apply`], and the mirror's
//! [`Route`] tells the UI where to navigate (into the shared experience when
//! `dilemma-started` arrives, to the results screen on `room-completed`).
//! The mirror originates commands but never mutates room state locally —
//! the authoritative snapshot always comes back in a `room-updated`.

use crate::gateway::events::{Command, Notification};
use crate::gateway::room::{Choice, Room, RoomResult, RoomSummary};

/// Where the UI should be, derived from server notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Browsing or waiting inside a room that has not started.
    Lobby,
    /// Play has started for the named content.
    Dilemma(String),
    /// The room completed; results are available.
    Results,
}

/// Local read-only copy of the connection's view of the world.
#[derive(Debug)]
pub struct ClientMirror {
    connection_id: Option<String>,
    current_room: Option<Room>,
    room_list: Vec<RoomSummary>,
    last_results: Option<RoomResult>,
    last_error: Option<String>,
    route: Route,
}

impl ClientMirror {
    pub fn new() -> Self {
        Self {
            connection_id: None,
            current_room: None,
            room_list: Vec::new(),
            last_results: None,
            last_error: None,
            route: Route::Lobby,
        }
    }

    /// The identity the server issued on connect, once known.
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.current_room.as_ref()
    }

    pub fn room_list(&self) -> &[RoomSummary] {
        &self.room_list
    }

    pub fn last_results(&self) -> Option<&RoomResult> {
        self.last_results.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Whether this connection currently holds host authority.
    pub fn is_host(&self) -> bool {
        match (&self.connection_id, &self.current_room) {
            (Some(id), Some(room)) => room.host_id == *id,
            _ => false,
        }
    }

    /// Apply one server notification to the local copy.
    pub fn apply(&mut self, event: Notification) {
        match event {
            Notification::Connected { connection_id } => {
                self.connection_id = Some(connection_id);
            }
            Notification::RoomCreated { room, .. } | Notification::RoomJoined { room, .. } => {
                self.current_room = Some(room);
                self.route = Route::Lobby;
                self.last_results = None;
            }
            Notification::RoomUpdated(room) => {
                self.current_room = Some(room);
            }
            Notification::RoomsList(rooms) => {
                self.room_list = rooms;
            }
            Notification::DilemmaStarted { dilemma_id } => {
                self.route = Route::Dilemma(dilemma_id);
            }
            Notification::RoomCompleted(results) => {
                self.last_results = Some(results);
                self.route = Route::Results;
            }
            Notification::HostChanged { new_host_id, .. } => {
                // The following room-updated carries the full snapshot; patch
                // the host eagerly so authority checks don't race it.
                if let Some(room) = &mut self.current_room {
                    room.host_id = new_host_id;
                }
            }
            Notification::PlayerMoved {
                player_id,
                position,
                rotation,
                ..
            } => {
                if let Some(room) = &mut self.current_room {
                    if let Some(player) = room.players.iter_mut().find(|p| p.id == player_id) {
                        player.position = position;
                        if rotation.is_some() {
                            player.rotation = rotation;
                        }
                    }
                }
            }
            // Roster and choice changes arrive with a trailing room-updated;
            // the mirror waits for the authoritative snapshot.
            Notification::PlayerJoined { .. }
            | Notification::PlayerLeft { .. }
            | Notification::PlayerChoice { .. } => {}
            Notification::Error { message } => {
                self.last_error = Some(message);
            }
        }
    }

    /// Reset local state when the transport drops. The server forgets this
    /// connection entirely; so does the mirror.
    pub fn handle_disconnect(&mut self) {
        self.connection_id = None;
        self.current_room = None;
        self.route = Route::Lobby;
    }

    // ------------------------------------------------------------------
    // Command constructors — the only way the mirror originates changes.
    // ------------------------------------------------------------------

    pub fn create_room(room_name: &str, username: &str, max_players: Option<u32>) -> Command {
        Command::CreateRoom {
            room_name: room_name.to_string(),
            username: Some(username.to_string()),
            max_players,
        }
    }

    pub fn join_room(room_id: &str, username: &str) -> Command {
        Command::JoinRoom {
            room_id: room_id.to_string(),
            username: Some(username.to_string()),
        }
    }

    /// Leave the current room. Clears local state immediately; the server
    /// deletes the Player on receipt.
    pub fn leave_room(&mut self) -> Command {
        self.current_room = None;
        self.route = Route::Lobby;
        Command::LeaveRoom {}
    }

    /// Start play for the current room. `None` when not in a room; the host
    /// check itself stays server-side.
    pub fn start_dilemma(&self, dilemma_id: &str) -> Option<Command> {
        let room = self.current_room.as_ref()?;
        Some(Command::StartDilemma {
            room_id: room.id.clone(),
            dilemma_id: dilemma_id.to_string(),
        })
    }

    pub fn make_choice(choice: Choice) -> Command {
        Command::MakeChoice { choice }
    }

    pub fn update_position(position: [f32; 3], rotation: Option<[f32; 3]>) -> Command {
        Command::UpdatePosition { position, rotation }
    }

    pub fn refresh_room_list() -> Command {
        Command::GetRooms {}
    }
}

impl Default for ClientMirror {
    fn default() -> Self {
        Self::new()
    }
}
