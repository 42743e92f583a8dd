use thiserror::Error;

/// Failures a command can produce. Each is reported only to the offending
/// connection as a targeted `error` notification and is never fatal to the
/// process or to other rooms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Room is already completed")]
    RoomCompleted,

    #[error("Only host can start the dilemma")]
    Forbidden,

    #[error("Dilemma already started")]
    AlreadyStarted,

    #[error("Malformed payload: {0}")]
    Malformed(String),
}
