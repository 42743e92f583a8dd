//! The single command dispatch point.
//!
//! Every mutating operation funnels through [`handle_command`]: it applies
//! the state change through the registry, returns targeted replies for the
//! issuing connection, and pushes room-scoped notifications through the
//! broadcast hub. A failure only ever produces a targeted `error` reply;
//! nothing here can abort another connection or room.

use crate::error::RoomError;
use crate::AppState;

use super::events::{Command, Notification};
use super::room::{Choice, DEFAULT_MAX_PLAYERS, DEFAULT_USERNAME};
use super::session::GatewaySession;

/// Apply one command. Returns the notifications to send back to the issuing
/// connection; room broadcasts are dispatched as a side effect.
pub fn handle_command(
    state: &AppState,
    session: &mut GatewaySession,
    cmd: Command,
) -> Vec<Notification> {
    match cmd {
        Command::CreateRoom {
            room_name,
            username,
            max_players,
        } => create_room(state, session, room_name, username, max_players),
        Command::JoinRoom { room_id, username } => join_room(state, session, room_id, username),
        Command::LeaveRoom {} => {
            leave_current_room(state, session);
            Vec::new()
        }
        Command::StartDilemma {
            room_id,
            dilemma_id,
        } => start_dilemma(state, session, room_id, dilemma_id),
        Command::MakeChoice { choice } => make_choice(state, session, choice),
        Command::UpdatePosition { position, rotation } => {
            update_position(state, session, position, rotation);
            Vec::new()
        }
        Command::GetRooms {} => vec![Notification::RoomsList(state.rooms.list())],
    }
}

/// Transport close funnels into the same cleanup as an explicit leave.
pub fn handle_disconnect(state: &AppState, session: &mut GatewaySession) {
    leave_current_room(state, session);
}

fn create_room(
    state: &AppState,
    session: &mut GatewaySession,
    room_name: String,
    username: Option<String>,
    max_players: Option<u32>,
) -> Vec<Notification> {
    // A connection inhabits at most one room; creating while in one leaves it.
    leave_current_room(state, session);

    let username = sanitize_username(username);
    let max_players = max_players.unwrap_or(DEFAULT_MAX_PLAYERS).max(1);

    let room = state
        .rooms
        .create(&session.connection_id, room_name, username.clone(), max_players);
    session.room_id = Some(room.id.clone());
    session.username = Some(username.clone());

    tracing::info!(room_id = %room.id, username = %username, "room created");

    let room_id = room.id.clone();
    let reply = Notification::RoomCreated {
        room_id: room_id.clone(),
        room: room.clone(),
    };
    state
        .broadcast
        .to_room(&room_id, Notification::RoomUpdated(room));
    vec![reply]
}

fn join_room(
    state: &AppState,
    session: &mut GatewaySession,
    room_id: String,
    username: Option<String>,
) -> Vec<Notification> {
    leave_current_room(state, session);

    let username = sanitize_username(username);
    match state
        .rooms
        .join(&room_id, &session.connection_id, username.clone())
    {
        Ok((room, player)) => {
            session.room_id = Some(room_id.clone());
            session.username = Some(username.clone());

            tracing::info!(room_id = %room_id, username = %username, "player joined room");

            let reply = Notification::RoomJoined {
                room_id: room_id.clone(),
                room: room.clone(),
            };
            state
                .broadcast
                .to_room(&room_id, Notification::RoomUpdated(room));
            state
                .broadcast
                .to_room(&room_id, Notification::PlayerJoined { player });
            vec![reply]
        }
        Err(err) => vec![Notification::error(&err)],
    }
}

/// Remove the session's player from its current room, broadcasting host
/// failover and roster changes to the remaining members. No-op when the
/// session is in no room.
fn leave_current_room(state: &AppState, session: &mut GatewaySession) {
    let Some(room_id) = session.room_id.take() else {
        return;
    };

    let Some(outcome) = state.rooms.leave(&room_id, &session.connection_id) else {
        // Room already gone (e.g. swept); nothing to announce.
        return;
    };

    tracing::info!(room_id = %room_id, username = %outcome.username, "player left room");

    if outcome.room_deleted {
        tracing::info!(room_id = %room_id, "room deleted");
        return;
    }

    if let Some(host) = outcome.promoted_host {
        tracing::info!(room_id = %room_id, new_host = %host.username, "host changed");
        state.broadcast.to_room(
            &room_id,
            Notification::HostChanged {
                new_host_id: host.id,
                new_host_username: host.username,
            },
        );
    }
    state.broadcast.to_room(
        &room_id,
        Notification::PlayerLeft {
            player_id: outcome.player_id,
            username: outcome.username,
        },
    );
    state
        .broadcast
        .to_room(&room_id, Notification::RoomUpdated(outcome.room));
}

fn start_dilemma(
    state: &AppState,
    session: &GatewaySession,
    room_id: String,
    dilemma_id: String,
) -> Vec<Notification> {
    match state
        .rooms
        .start(&room_id, &session.connection_id, dilemma_id.clone())
    {
        Ok(room) => {
            tracing::info!(room_id = %room_id, dilemma_id = %dilemma_id, "dilemma started");
            state
                .broadcast
                .to_room(&room_id, Notification::DilemmaStarted { dilemma_id });
            state
                .broadcast
                .to_room(&room_id, Notification::RoomUpdated(room));
            Vec::new()
        }
        Err(err) => vec![Notification::error(&err)],
    }
}

fn make_choice(state: &AppState, session: &GatewaySession, choice: Choice) -> Vec<Notification> {
    // Fire-and-forget path: a choice from a connection in no room is dropped,
    // matching the reference behavior.
    let Some(room_id) = session.room_id.as_deref() else {
        return Vec::new();
    };
    let Some(outcome) = state
        .rooms
        .submit_choice(room_id, &session.connection_id, choice)
    else {
        return Vec::new();
    };

    tracing::info!(room_id = %room_id, username = %outcome.username, ?choice, "player chose");

    state.broadcast.to_room(
        room_id,
        Notification::PlayerChoice {
            player_id: session.connection_id.clone(),
            username: outcome.username,
            choice,
        },
    );
    state
        .broadcast
        .to_room(room_id, Notification::RoomUpdated(outcome.room));

    if let Some(results) = outcome.results {
        tracing::info!(room_id = %room_id, total = results.total, "room completed");
        state
            .broadcast
            .to_room(room_id, Notification::RoomCompleted(results));
    }
    Vec::new()
}

fn update_position(
    state: &AppState,
    session: &GatewaySession,
    position: [f32; 3],
    rotation: Option<[f32; 3]>,
) {
    let Some(room_id) = session.room_id.as_deref() else {
        return;
    };
    let Some(username) =
        state
            .rooms
            .update_position(room_id, &session.connection_id, position, rotation)
    else {
        return;
    };

    // Best-effort relay to everyone else in the room; a lost update is
    // corrected by the next one.
    state.broadcast.to_room_except(
        room_id,
        &session.connection_id,
        Notification::PlayerMoved {
            player_id: session.connection_id.clone(),
            username,
            position,
            rotation,
        },
    );
}

fn sanitize_username(username: Option<String>) -> String {
    match username {
        Some(name) if !name.trim().is_empty() => name,
        _ => DEFAULT_USERNAME.to_string(),
    }
}

/// Build the targeted reply for a malformed frame.
pub fn malformed(detail: impl Into<String>) -> Notification {
    Notification::error(&RoomError::Malformed(detail.into()))
}
