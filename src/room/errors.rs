use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-facing failures of room operations.
///
/// The display strings are part of the wire protocol: older clients match on
/// the message text, newer ones branch on [`RoomErrorKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Invalid room credentials")]
    InvalidCredentials,

    #[error("Room does not exist.")]
    RoomNotFound,

    #[error("Incorrect passcode.")]
    PasscodeMismatch,

    #[error("Room is full.")]
    RoomFull,

    #[error("Unable to allocate a room.")]
    Unavailable,
}

/// Machine-readable discriminant sent alongside the error message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomErrorKind {
    InvalidCredentials,
    RoomNotFound,
    PasscodeMismatch,
    RoomFull,
    RoomUnavailable,
}

impl RoomError {
    pub fn kind(&self) -> RoomErrorKind {
        match self {
            RoomError::InvalidCredentials => RoomErrorKind::InvalidCredentials,
            RoomError::RoomNotFound => RoomErrorKind::RoomNotFound,
            RoomError::PasscodeMismatch => RoomErrorKind::PasscodeMismatch,
            RoomError::RoomFull => RoomErrorKind::RoomFull,
            RoomError::Unavailable => RoomErrorKind::RoomUnavailable,
        }
    }
}
