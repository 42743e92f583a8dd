//! The authoritative in-memory room store.
//!
//! Uses `DashMap` for shard-level concurrency and `parking_lot::Mutex` per
//! room for non-poisoning, fast locking. Every operation locks exactly one
//! room, which gives the required single-writer-per-room atomicity while
//! letting distinct rooms proceed in parallel. Snapshots for broadcasting are
//! cloned under the lock; no mutable reference ever escapes the registry.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::RoomError;

use super::room::{Choice, Player, Room, RoomResult, RoomStatus, RoomSummary};

/// Outcome of a `leave`, captured under the room lock so the caller can
/// broadcast after releasing it.
#[derive(Debug)]
pub struct LeaveOutcome {
    pub player_id: String,
    pub username: String,
    /// True when the departing player was the last one and the room is gone.
    pub room_deleted: bool,
    /// Set when host authority moved to the earliest remaining joiner.
    pub promoted_host: Option<Player>,
    /// Post-removal snapshot (pre-deletion when `room_deleted`).
    pub room: Room,
}

/// Outcome of a choice submission.
#[derive(Debug)]
pub struct ChoiceOutcome {
    pub username: String,
    pub room: Room,
    /// Present exactly when this submission completed the room.
    pub results: Option<RoomResult>,
}

/// Shared registry of all live rooms.
pub struct RoomRegistry {
    rooms: DashMap<String, Mutex<Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a room with a fresh unique code and the creator as host.
    /// Room codes are short, so collide eventually; the entry API re-checks
    /// under the shard lock and retries.
    pub fn create(
        &self,
        creator_id: &str,
        room_name: String,
        username: String,
        max_players: u32,
    ) -> Room {
        loop {
            let id = dilemma_common::id::room_code();
            match self.rooms.entry(id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(vacant) => {
                    let room = Room::new(
                        id,
                        room_name,
                        creator_id,
                        username,
                        max_players,
                    );
                    let snapshot = room.clone();
                    vacant.insert(Mutex::new(room));
                    return snapshot;
                }
            }
        }
    }

    /// Append a player to a room. Fails when the room is unknown, full, or
    /// already completed.
    pub fn join(
        &self,
        room_id: &str,
        conn_id: &str,
        username: String,
    ) -> Result<(Room, Player), RoomError> {
        let entry = self.rooms.get(room_id).ok_or(RoomError::RoomNotFound)?;
        let mut room = entry.lock();
        let player = room.add_player(conn_id, username)?;
        Ok((room.clone(), player))
    }

    /// Remove a player from a room; delete the room when it empties. Returns
    /// `None` when either the room or the player is unknown (e.g. the room
    /// was already swept), which callers treat as a no-op.
    pub fn leave(&self, room_id: &str, conn_id: &str) -> Option<LeaveOutcome> {
        let outcome = {
            let entry = self.rooms.get(room_id)?;
            let mut room = entry.lock();
            let removed = room.remove_player(conn_id)?;
            LeaveOutcome {
                player_id: removed.player.id,
                username: removed.player.username,
                room_deleted: room.is_empty(),
                promoted_host: removed.promoted_host,
                room: room.clone(),
            }
        };

        if outcome.room_deleted {
            // Re-check emptiness under the shard lock: a join that slipped in
            // between the drop above and this call keeps the room alive.
            self.rooms
                .remove_if(room_id, |_, room| room.lock().is_empty());
        }
        Some(outcome)
    }

    /// Bind a dilemma and start play. Host-only.
    pub fn start(
        &self,
        room_id: &str,
        conn_id: &str,
        dilemma_id: String,
    ) -> Result<Room, RoomError> {
        let entry = self.rooms.get(room_id).ok_or(RoomError::RoomNotFound)?;
        let mut room = entry.lock();
        room.start(conn_id, dilemma_id)?;
        Ok(room.clone())
    }

    /// Record a choice and re-evaluate completion. `None` when the room or
    /// player is unknown.
    pub fn submit_choice(
        &self,
        room_id: &str,
        conn_id: &str,
        choice: Choice,
    ) -> Option<ChoiceOutcome> {
        let entry = self.rooms.get(room_id)?;
        let mut room = entry.lock();
        let (username, completed) = room.record_choice(conn_id, choice)?;
        let results = completed.then(|| room.results());
        Some(ChoiceOutcome {
            username,
            room: room.clone(),
            results,
        })
    }

    /// Cache a player's spatial state; returns the username for the relay.
    pub fn update_position(
        &self,
        room_id: &str,
        conn_id: &str,
        position: [f32; 3],
        rotation: Option<[f32; 3]>,
    ) -> Option<String> {
        let entry = self.rooms.get(room_id)?;
        let mut room = entry.lock();
        room.update_position(conn_id, position, rotation)
    }

    /// Roster-free summaries of every room, recomputed on demand.
    pub fn list(&self) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|entry| entry.lock().summary())
            .collect()
    }

    /// Remove completed rooms that have been idle longer than the TTL.
    /// Waiting/playing rooms always have live members and are never reaped.
    /// Returns the number of rooms removed.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = self.rooms.len();
        self.rooms.retain(|_, room| {
            let room = room.lock();
            room.status != RoomStatus::Completed
                || now.duration_since(room.last_activity) < ttl
        });
        before - self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
