//! WebSocket layer: live swap total feed.
//!
//! The endpoint at `/ws/total` pushes `{"total": n}` on connect and
//! whenever an ingest or prune changes the index size.

pub mod connection;
pub mod handler;
pub mod messages;
