use std::sync::Arc;

use tokio::sync::RwLock;

use huddle_rooms::RoomRegistry;

/// Shared gateway runtime state, wrapped in Arc for use across async tasks.
pub struct GatewayState {
    /// All rooms and their members. Coarse lock: admission checks,
    /// membership snapshots, location writes, and delete-on-empty are
    /// serialized here so concurrent connections observe them atomically.
    pub rooms: RwLock<RoomRegistry>,
    /// Server version string.
    pub version: String,
    /// Hostname reported by /health.
    pub hostname: String,
}

impl GatewayState {
    pub fn new(default_max_users: usize) -> Arc<Self> {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".into());

        Arc::new(Self {
            rooms: RwLock::new(RoomRegistry::with_max_users(default_max_users)),
            version: env!("CARGO_PKG_VERSION").to_string(),
            hostname,
        })
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.room_count()
    }

    /// Number of joined participants across all rooms.
    pub async fn participant_count(&self) -> usize {
        self.rooms.read().await.member_count()
    }
}

#[cfg(test)]
mod tests {
    use {huddle_rooms::RoomMember, tokio::sync::mpsc};

    use super::*;

    #[tokio::test]
    async fn counts_track_the_registry() {
        let state = GatewayState::new(4);
        assert_eq!(state.room_count().await, 0);
        assert_eq!(state.participant_count().await, 0);

        let (tx, _rx) = mpsc::unbounded_channel();
        state
            .rooms
            .write()
            .await
            .join("lobby", RoomMember::new("1", "Al", tx));
        assert_eq!(state.room_count().await, 1);
        assert_eq!(state.participant_count().await, 1);

        state.rooms.write().await.leave("lobby", "1");
        assert_eq!(state.room_count().await, 0);
        assert_eq!(state.participant_count().await, 0);
    }
}
