//! Gateway: HTTP + WebSocket server for the huddle relay.
//!
//! Lifecycle:
//! 1. Load config, resolve bind address
//! 2. Start the HTTP server (landing page, health)
//! 3. Attach the WebSocket upgrade handler
//! 4. Spawn one session task plus one write loop per connection
//!
//! Room semantics live in `huddle-rooms` and the wire format in
//! `huddle-protocol`; this crate wires transports to both.

pub mod broadcast;
pub mod server;
pub mod session;
pub mod state;
