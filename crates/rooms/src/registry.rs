use std::collections::HashMap;

use {tokio::sync::mpsc, tracing::debug};

use huddle_protocol::{Location, Participant};

/// Member limit for rooms created without an explicit default.
pub const DEFAULT_MAX_USERS: usize = 4;

/// Handle for delivering serialized frames to one member's write loop.
pub type OutboundSender = mpsc::UnboundedSender<String>;

// ── Members ──────────────────────────────────────────────────────────────────

/// One joined participant: identity, last known location, and the outbound
/// handle of its connection. The registry tracks members but never owns or
/// closes the underlying transport.
#[derive(Debug, Clone)]
pub struct RoomMember {
    pub id: String,
    pub display_name: String,
    pub location: Location,
    sender: OutboundSender,
}

impl RoomMember {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        sender: OutboundSender,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            location: Location::default(),
            sender,
        }
    }

    /// Deliver a serialized frame. Returns false when the connection's write
    /// loop is gone; the frame is dropped, never queued for retry.
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }

    /// Snapshot projection of this member.
    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            location: self.location,
        }
    }
}

// ── Rooms ────────────────────────────────────────────────────────────────────

/// A named room and its members, kept in join order.
#[derive(Debug)]
pub struct Room {
    name: String,
    max_users: usize,
    members: Vec<RoomMember>,
}

impl Room {
    fn new(name: impl Into<String>, max_users: usize) -> Self {
        Self {
            name: name.into(),
            max_users,
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_users(&self) -> usize {
        self.max_users
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_users
    }

    pub fn members(&self) -> impl Iterator<Item = &RoomMember> {
        self.members.iter()
    }

    /// Materialized membership snapshot in join order.
    pub fn participants(&self) -> Vec<Participant> {
        self.members.iter().map(RoomMember::participant).collect()
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// All live rooms, keyed by name. A room exists iff it has at least one
/// member: creation happens on first join, deletion on last leave.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    default_max_users: usize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_max_users(DEFAULT_MAX_USERS)
    }

    /// Registry whose rooms admit at most `default_max_users` members.
    pub fn with_max_users(default_max_users: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            default_max_users,
        }
    }

    /// Existing room by exact name, or a fresh empty one registered under it.
    pub fn get_or_create(&mut self, name: &str) -> &mut Room {
        let max_users = self.default_max_users;
        self.rooms.entry(name.to_string()).or_insert_with(|| {
            debug!(room = name, max_users, "room created");
            Room::new(name, max_users)
        })
    }

    /// Remove a room outright. Absent names are a no-op.
    pub fn delete(&mut self, name: &str) {
        if self.rooms.remove(name).is_some() {
            debug!(room = name, "room deleted");
        }
    }

    /// Admit `member` to the named room, creating the room if needed.
    /// Returns false when the room is full; the member is then registered
    /// nowhere and the caller is expected to disconnect it.
    pub fn join(&mut self, name: &str, member: RoomMember) -> bool {
        let room = self.get_or_create(name);
        if room.is_full() {
            return false;
        }
        debug!(room = name, member = %member.id, name = %member.display_name, "member joined");
        room.members.push(member);
        true
    }

    /// Remove the member with the given id from the named room. A leave that
    /// empties the room deletes the room in the same call, so no caller ever
    /// observes a registered room with zero members. Unknown rooms and
    /// unknown member ids are no-ops.
    pub fn leave(&mut self, name: &str, member_id: &str) {
        let emptied = {
            let Some(room) = self.rooms.get_mut(name) else {
                return;
            };
            if let Some(idx) = room.members.iter().position(|m| m.id == member_id) {
                room.members.remove(idx);
                debug!(room = name, member = member_id, "member left");
            }
            room.members.is_empty()
        };
        if emptied {
            self.delete(name);
        }
    }

    /// Membership snapshot in join order; empty for an unknown room.
    pub fn participants(&self, name: &str) -> Vec<Participant> {
        self.rooms
            .get(name)
            .map(Room::participants)
            .unwrap_or_default()
    }

    /// Record a member's latest position.
    pub fn update_location(&mut self, name: &str, member_id: &str, location: Location) {
        if let Some(room) = self.rooms.get_mut(name)
            && let Some(member) = room.members.iter_mut().find(|m| m.id == member_id)
        {
            member.location = location;
        }
    }

    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self) -> usize {
        self.rooms.values().map(Room::len).sum()
    }
}
