use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::errors::RoomError;
use super::generators::{CredentialGenerator, RandomTokenGenerator};
use super::models::Room;
use crate::websockets::messages::{RoomCredentials, WebSocketMessage};
use crate::websockets::ConnectionId;

/// Attempts to find an unused room id before giving up
const MAX_ID_ATTEMPTS: usize = 32;

/// Outbound delivery produced by a registry transition.
///
/// Recipients are resolved when the transition is applied, so a dispatch
/// always reflects the membership right after that mutation.
#[derive(Debug, Clone)]
pub enum Dispatch {
    ToConnection(ConnectionId, WebSocketMessage),
    ToConnections(Vec<ConnectionId>, WebSocketMessage),
    ToAll(WebSocketMessage),
}

/// Bounds enforced by the registry
#[derive(Debug, Clone)]
pub struct RegistryLimits {
    pub room_capacity: usize,
    pub max_content_len: usize,
    pub min_credential_len: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            room_capacity: 10,
            max_content_len: 100_000,
            min_credential_len: 4,
        }
    }
}

/// Room map, connection index and live room counter.
///
/// Every public operation runs to completion and returns the deliveries it
/// caused; callers must apply them in order before the next operation.
/// `connection_rooms[c] == r` holds iff `c` is in `rooms[r].members`.
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    connection_rooms: HashMap<ConnectionId, String>,
    room_count: usize,
    limits: RegistryLimits,
    generator: Box<dyn CredentialGenerator>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryLimits::default(), Box::new(RandomTokenGenerator::default()))
    }
}

impl RoomRegistry {
    pub fn new(limits: RegistryLimits, generator: Box<dyn CredentialGenerator>) -> Self {
        Self {
            rooms: HashMap::new(),
            connection_rooms: HashMap::new(),
            room_count: 0,
            limits,
            generator,
        }
    }

    pub fn room_count(&self) -> usize {
        self.room_count
    }

    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// The room a connection currently occupies
    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.connection_rooms.get(connection_id).map(String::as_str)
    }

    /// Creates a room with fresh credentials. The creator is not joined.
    pub fn create_room(&mut self, connection_id: ConnectionId) -> Vec<Dispatch> {
        let room_id = match self.allocate_room_id() {
            Some(id) => id,
            None => {
                warn!(connection_id = %connection_id, "Could not allocate an unused room id");
                return vec![Dispatch::ToConnection(
                    connection_id,
                    WebSocketMessage::error(&RoomError::Unavailable),
                )];
            }
        };
        let passcode = self.generator.generate();

        self.rooms
            .insert(room_id.clone(), Room::new(room_id.clone(), passcode.clone()));
        self.room_count += 1;

        info!(
            room_id = %room_id,
            connection_id = %connection_id,
            room_count = self.room_count,
            "Room created"
        );

        vec![
            Dispatch::ToConnection(
                connection_id,
                WebSocketMessage::room_created(&room_id, &passcode),
            ),
            Dispatch::ToAll(WebSocketMessage::room_count_update(self.room_count)),
        ]
    }

    /// Credential-gated join. Rejections never mutate state.
    pub fn join_room(
        &mut self,
        connection_id: ConnectionId,
        credentials: &RoomCredentials,
    ) -> Vec<Dispatch> {
        match self.try_join_room(connection_id, credentials) {
            Ok(dispatches) => dispatches,
            Err(error) => {
                debug!(
                    room_id = %credentials.room_id,
                    connection_id = %connection_id,
                    error = %error,
                    "Join rejected"
                );
                vec![Dispatch::ToConnection(
                    connection_id,
                    WebSocketMessage::error(&error),
                )]
            }
        }
    }

    fn try_join_room(
        &mut self,
        connection_id: ConnectionId,
        credentials: &RoomCredentials,
    ) -> Result<Vec<Dispatch>, RoomError> {
        if !self.credentials_well_formed(credentials) {
            return Err(RoomError::InvalidCredentials);
        }

        let room_id = credentials.room_id.as_str();
        let room = self.rooms.get(room_id).ok_or(RoomError::RoomNotFound)?;

        if !room.passcode_matches(&credentials.passcode) {
            return Err(RoomError::PasscodeMismatch);
        }

        if room.has_member(&connection_id) {
            debug!(room_id = %room_id, connection_id = %connection_id, "Connection already in room");
            return Ok(vec![
                Dispatch::ToConnections(
                    room.member_ids(),
                    WebSocketMessage::user_count_update(room.member_count()),
                ),
                Dispatch::ToConnection(connection_id, WebSocketMessage::code_update(&room.content)),
            ]);
        }

        if room.is_full(self.limits.room_capacity) {
            return Err(RoomError::RoomFull);
        }

        // At most one room per connection: switching rooms leaves the old one first
        let mut dispatches = self.detach(&connection_id);

        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        room.add_member(connection_id);
        self.connection_rooms
            .insert(connection_id, room_id.to_string());

        info!(
            room_id = %room_id,
            connection_id = %connection_id,
            member_count = room.member_count(),
            "Connection joined room"
        );

        dispatches.push(Dispatch::ToConnections(
            room.member_ids(),
            WebSocketMessage::user_count_update(room.member_count()),
        ));
        dispatches.push(Dispatch::ToConnection(
            connection_id,
            WebSocketMessage::code_update(&room.content),
        ));

        Ok(dispatches)
    }

    /// Leaves the room only when it is the connection's current room and the
    /// passcode matches; anything else is silently ignored.
    pub fn leave_room(
        &mut self,
        connection_id: ConnectionId,
        credentials: &RoomCredentials,
    ) -> Vec<Dispatch> {
        if self.room_of(&connection_id) != Some(credentials.room_id.as_str()) {
            debug!(
                room_id = %credentials.room_id,
                connection_id = %connection_id,
                "Ignoring leave for a room the connection is not in"
            );
            return Vec::new();
        }

        let passcode_ok = self
            .rooms
            .get(&credentials.room_id)
            .is_some_and(|room| room.passcode_matches(&credentials.passcode));
        if !passcode_ok {
            debug!(
                room_id = %credentials.room_id,
                connection_id = %connection_id,
                "Ignoring leave with wrong passcode"
            );
            return Vec::new();
        }

        self.detach(&connection_id)
    }

    /// Replaces the room content and relays it to every other member
    pub fn change_content(&mut self, connection_id: ConnectionId, new_code: String) -> Vec<Dispatch> {
        let Some(room_id) = self.connection_rooms.get(&connection_id) else {
            debug!(connection_id = %connection_id, "Content change from connection outside any room");
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };

        // Limit is in UTF-16 code units; byte length is an upper bound on that count
        let max = self.limits.max_content_len;
        if new_code.len() > max && new_code.encode_utf16().count() > max {
            debug!(
                room_id = %room.id,
                connection_id = %connection_id,
                max_content_len = max,
                "Dropping oversized content change"
            );
            return Vec::new();
        }

        let recipients = room.members_except(&connection_id);
        let message = WebSocketMessage::code_update(&new_code);
        room.content = new_code;

        if recipients.is_empty() {
            return Vec::new();
        }
        vec![Dispatch::ToConnections(recipients, message)]
    }

    /// Transport-originated cleanup; no validation, no error channel
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Dispatch> {
        self.detach(&connection_id)
    }

    /// Deletes rooms nobody ever joined once they are older than `ttl`
    pub fn reap_unclaimed(&mut self, now: DateTime<Utc>, ttl: chrono::Duration) -> Vec<Dispatch> {
        let stale: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.member_count() == 0 && now - room.created_at >= ttl)
            .map(|room| room.id.clone())
            .collect();

        let mut dispatches = Vec::with_capacity(stale.len());
        for room_id in stale {
            dispatches.push(self.delete_room(&room_id));
            info!(room_id = %room_id, "Unclaimed room reaped");
        }
        dispatches
    }

    fn detach(&mut self, connection_id: &ConnectionId) -> Vec<Dispatch> {
        let Some(room_id) = self.connection_rooms.remove(connection_id) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            warn!(room_id = %room_id, connection_id = %connection_id, "Index pointed at a missing room");
            return Vec::new();
        };

        room.remove_member(connection_id);
        info!(
            room_id = %room_id,
            connection_id = %connection_id,
            member_count = room.member_count(),
            "Connection left room"
        );

        if room.member_count() > 0 {
            return vec![Dispatch::ToConnections(
                room.member_ids(),
                WebSocketMessage::user_count_update(room.member_count()),
            )];
        }

        info!(room_id = %room_id, "Room deleted (empty)");
        vec![self.delete_room(&room_id)]
    }

    fn delete_room(&mut self, room_id: &str) -> Dispatch {
        if self.rooms.remove(room_id).is_some() {
            self.room_count = self.room_count.saturating_sub(1);
        }
        Dispatch::ToAll(WebSocketMessage::room_count_update(self.room_count))
    }

    fn allocate_room_id(&self) -> Option<String> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| self.generator.generate())
            .find(|id| !self.rooms.contains_key(id))
    }

    fn credentials_well_formed(&self, credentials: &RoomCredentials) -> bool {
        let min = self.limits.min_credential_len;
        credentials.room_id.encode_utf16().count() >= min
            && credentials.passcode.encode_utf16().count() >= min
    }
}
