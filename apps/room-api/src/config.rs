use std::time::Duration;

/// Room API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Idle time after which a completed room is swept from the registry.
    pub room_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables. Every variable has a
    /// default, so a bare `room-api` invocation works out of the box.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4000),
            room_ttl: Duration::from_secs(
                std::env::var("ROOM_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1800),
            ),
        }
    }
}
