//! Room registry: named, bounded-capacity rooms and their live members.
//!
//! The registry itself is a plain single-writer structure. The gateway wraps
//! it in one `RwLock`, so admission checks, membership snapshots, location
//! writes, and delete-on-empty are all observed atomically relative to
//! concurrent connections. Nothing here touches a transport beyond pushing
//! frames into each member's outbound channel.

mod registry;

pub use registry::{DEFAULT_MAX_USERS, OutboundSender, Room, RoomMember, RoomRegistry};
