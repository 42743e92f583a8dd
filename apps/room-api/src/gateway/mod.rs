//! The real-time room coordinator: wire protocol, room registry and state
//! machine, choice aggregation, position relay, and the broadcast fanout.

pub mod events;
pub mod fanout;
pub mod handler;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;
