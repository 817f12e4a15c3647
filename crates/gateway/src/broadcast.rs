//! Broadcast fan-out: deliver one event to a whole room or to a single
//! connection.
//!
//! Callers fan out while still holding the registry lock guard, so room
//! broadcasts are observed in the order the triggering operations were
//! serialized. Sends are non-blocking pushes into each member's write-loop
//! channel; a member whose channel is gone is skipped, not removed —
//! membership only changes through explicit leave/close handling.

use tracing::{trace, warn};

use {
    huddle_protocol::ServerEvent,
    huddle_rooms::{OutboundSender, RoomRegistry},
};

/// Deliver `event` to every member of the named room. Unknown rooms are a
/// zero-recipient no-op; skipped deliveries are lost, never queued for retry.
pub fn to_room(registry: &RoomRegistry, room: &str, event: &ServerEvent) {
    let frame = match serde_json::to_string(event) {
        Ok(frame) => frame,
        Err(error) => {
            warn!(%error, "failed to encode broadcast event");
            return;
        },
    };
    let Some(room) = registry.get(room) else {
        return;
    };
    for member in room.members() {
        if !member.send(&frame) {
            trace!(member = %member.id, "skipped member with closed channel");
        }
    }
}

/// Deliver `event` to a single connection under the same fire-and-forget
/// rule.
pub fn to_sender(sender: &OutboundSender, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(frame) => {
            let _ = sender.send(frame);
        },
        Err(error) => warn!(%error, "failed to encode event"),
    }
}

#[cfg(test)]
mod tests {
    use {huddle_rooms::RoomMember, tokio::sync::mpsc};

    use super::*;

    #[test]
    fn delivers_to_all_members_and_skips_closed_channels() {
        let mut registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        registry.join("lobby", RoomMember::new("1", "Al", tx_a));
        registry.join("lobby", RoomMember::new("2", "Bo", tx_b));
        drop(rx_b); // Bo's write loop is gone.

        to_room(
            &registry,
            "lobby",
            &ServerEvent::DisplayClientAction {
                notice: "Al is typing a message".into(),
            },
        );

        let frame = rx_a.try_recv().unwrap();
        assert!(frame.contains("DISPLAY_CLIENT_ACTION"));
        // Al's membership survives Bo's dead channel.
        assert_eq!(registry.participants("lobby").len(), 2);
    }

    #[test]
    fn unknown_room_is_a_noop() {
        let registry = RoomRegistry::new();
        to_room(
            &registry,
            "nowhere",
            &ServerEvent::DisplayClientAction {
                notice: "hello?".into(),
            },
        );
    }

    #[test]
    fn single_sends_survive_a_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        to_sender(
            &tx,
            &ServerEvent::Goodbye {
                notice: "Left lobby".into(),
            },
        );
    }
}
