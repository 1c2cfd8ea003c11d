use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::websockets::ConnectionId;

/// In-memory state of a collaboration room
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub passcode: String,
    pub content: String,                 // Last full write wins
    pub members: HashSet<ConnectionId>, // Connections currently joined
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Creates an empty room with no members
    pub fn new(id: String, passcode: String) -> Self {
        Self {
            id,
            passcode,
            content: String::new(),
            members: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Get the current number of members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Check if room is at the given capacity
    pub fn is_full(&self, capacity: usize) -> bool {
        self.members.len() >= capacity
    }

    pub fn has_member(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }

    pub fn passcode_matches(&self, passcode: &str) -> bool {
        self.passcode == passcode
    }

    /// Add a connection to the room, returns false if already present
    pub fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        self.members.insert(connection_id)
    }

    /// Remove a connection from the room, returns false if it was not a member
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id)
    }

    /// Members other than the given connection
    pub fn members_except(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|member| *member != connection_id)
            .copied()
            .collect()
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().copied().collect()
    }
}
