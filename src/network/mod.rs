//! Network Module
//!
//! TCP server, connection handling and client.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls for shutdown)
//! - One thread per connection, bounded by `max_connections`
//! - Requests routed through the shared `Engine`

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::{Server, ServerHandle};
