//! Room domain state: players, the waiting → playing → completed lifecycle,
//! host authority, and result tallies.

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::RoomError;

/// Default room capacity when `create-room` omits `maxPlayers`.
pub const DEFAULT_MAX_PLAYERS: u32 = 10;

/// Display name used when a client joins without one.
pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Avatar eye height. Every spawn position uses it for the y coordinate.
const SPAWN_HEIGHT: f32 = 1.6;

/// A player's binary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

/// Per-room lifecycle state. Strictly monotonic: a room never moves backward
/// and `completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Completed,
}

/// A connection's role inside exactly one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Equal to the owning connection's id. Not reused across reconnects.
    pub id: String,
    pub username: String,
    pub choice: Option<Choice>,
    pub position: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
}

/// The authoritative room entity. Owned exclusively by the `RoomRegistry`;
/// everything sent over the wire is a clone taken under the room's lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub dilemma_id: Option<String>,
    /// Insertion order is significant: host promotion picks the earliest
    /// remaining joiner.
    pub players: Vec<Player>,
    pub max_players: u32,
    pub status: RoomStatus,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    #[serde(skip, default = "Instant::now")]
    pub(crate) last_activity: Instant,
}

/// Result of removing a player from a room.
#[derive(Debug)]
pub struct RemovedPlayer {
    pub player: Player,
    /// Set when the departing player was the host; holds the promoted player.
    pub promoted_host: Option<Player>,
}

/// Tallies computed once, at the moment the room completes. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResult {
    pub total: usize,
    pub choice_a: usize,
    pub choice_b: usize,
    pub percentage_a: u32,
    pub percentage_b: u32,
    pub players: Vec<PlayerResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub username: String,
    pub choice: Option<Choice>,
}

/// Roster-free projection served by `get-rooms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: u32,
    pub status: RoomStatus,
    pub created_at: i64,
}

impl Room {
    /// Build a new room with the creator as sole member and host. The creator
    /// spawns at the room origin.
    pub fn new(
        id: String,
        name: String,
        creator_id: &str,
        creator_username: String,
        max_players: u32,
    ) -> Self {
        let creator = Player {
            id: creator_id.to_string(),
            username: creator_username,
            choice: None,
            position: [0.0, SPAWN_HEIGHT, 0.0],
            rotation: None,
        };
        Self {
            id,
            name,
            host_id: creator_id.to_string(),
            dilemma_id: None,
            players: vec![creator],
            max_players,
            status: RoomStatus::Waiting,
            created_at: chrono::Utc::now().timestamp_millis(),
            last_activity: Instant::now(),
        }
    }

    /// Append a new player at a randomized spawn so avatars don't overlap.
    /// Joining mid-`playing` is allowed (live-roster semantics); only a
    /// finished or full room rejects the join.
    pub fn add_player(&mut self, id: &str, username: String) -> Result<Player, RoomError> {
        if self.players.len() as u32 >= self.max_players {
            return Err(RoomError::RoomFull);
        }
        if self.status == RoomStatus::Completed {
            return Err(RoomError::RoomCompleted);
        }

        let mut rng = rand::thread_rng();
        let player = Player {
            id: id.to_string(),
            username,
            choice: None,
            position: [
                rng.gen_range(-2.0..2.0),
                SPAWN_HEIGHT,
                rng.gen_range(-2.0..2.0),
            ],
            rotation: None,
        };
        self.players.push(player.clone());
        self.touch();
        Ok(player)
    }

    /// Remove a player by connection id. When the host departs, the
    /// earliest-joined remaining player is promoted — this insertion-order
    /// tie-break keeps failover deterministic.
    pub fn remove_player(&mut self, id: &str) -> Option<RemovedPlayer> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        self.touch();

        let promoted_host = if player.id == self.host_id {
            self.players.first().cloned().inspect(|next| {
                self.host_id = next.id.clone();
            })
        } else {
            None
        };

        Some(RemovedPlayer {
            player,
            promoted_host,
        })
    }

    /// Bind a dilemma and move `waiting → playing`. Host-only; the status is
    /// monotonic, so a room that is already playing or completed rejects a
    /// second start instead of rebinding.
    pub fn start(&mut self, requester_id: &str, dilemma_id: String) -> Result<(), RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::Forbidden);
        }
        match self.status {
            RoomStatus::Waiting => {
                self.dilemma_id = Some(dilemma_id);
                self.status = RoomStatus::Playing;
                self.touch();
                Ok(())
            }
            RoomStatus::Playing => Err(RoomError::AlreadyStarted),
            RoomStatus::Completed => Err(RoomError::RoomCompleted),
        }
    }

    /// Record a player's choice (last-write-wins) and evaluate the completion
    /// predicate against the live roster. A choice submitted while the room
    /// is still `waiting` is kept, but completion is only evaluated while
    /// `playing` so the lifecycle cannot skip a state.
    ///
    /// Returns the player's username and whether this submission completed
    /// the room, or `None` if the connection is not in the roster.
    pub fn record_choice(&mut self, id: &str, choice: Choice) -> Option<(String, bool)> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        player.choice = Some(choice);
        let username = player.username.clone();
        self.touch();

        let completed = self.status == RoomStatus::Playing
            && self.players.iter().all(|p| p.choice.is_some());
        if completed {
            self.status = RoomStatus::Completed;
        }
        Some((username, completed))
    }

    /// Cache a player's spatial state. Rotation is only overwritten when the
    /// update carries one. Returns the player's username for the relay.
    pub fn update_position(
        &mut self,
        id: &str,
        position: [f32; 3],
        rotation: Option<[f32; 3]>,
    ) -> Option<String> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        player.position = position;
        if rotation.is_some() {
            player.rotation = rotation;
        }
        Some(player.username.clone())
    }

    /// Tally the roster's choices. Percentages are rounded independently, so
    /// they may cross-sum to 99 or 101.
    pub fn results(&self) -> RoomResult {
        let total = self.players.len();
        let choice_a = self
            .players
            .iter()
            .filter(|p| p.choice == Some(Choice::A))
            .count();
        let choice_b = self
            .players
            .iter()
            .filter(|p| p.choice == Some(Choice::B))
            .count();

        let pct = |n: usize| {
            if total == 0 {
                0
            } else {
                ((n as f64 / total as f64) * 100.0).round() as u32
            }
        };

        RoomResult {
            total,
            choice_a,
            choice_b,
            percentage_a: pct(choice_a),
            percentage_b: pct(choice_b),
            players: self
                .players
                .iter()
                .map(|p| PlayerResult {
                    username: p.username.clone(),
                    choice: p.choice,
                })
                .collect(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            max_players: self.max_players,
            status: self.status,
            created_at: self.created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
