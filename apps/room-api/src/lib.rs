pub mod config;
pub mod error;
pub mod gateway;
pub mod mirror;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::fanout::GatewayBroadcast;
use gateway::registry::RoomRegistry;

/// Shared application state available to route handlers and gateway sessions.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rooms: Arc<RoomRegistry>,
    pub broadcast: Arc<GatewayBroadcast>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            rooms: Arc::new(RoomRegistry::new()),
            broadcast: Arc::new(GatewayBroadcast::new()),
        }
    }
}
