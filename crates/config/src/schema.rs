use serde::{Deserialize, Serialize};

/// Root config (huddle.toml / huddle.yaml / huddle.json).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub server: ServerConfig,
    pub rooms: RoomsConfig,
}

/// Listen address for the HTTP/WebSocket server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Admission defaults for rooms created on first join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    /// Member limit for new rooms.
    pub max_users: usize,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self { max_users: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_relay_contract() {
        let config = HuddleConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rooms.max_users, 4);
    }

    #[test]
    fn partial_files_keep_defaults_elsewhere() {
        let config: HuddleConfig = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.rooms.max_users, 4);
    }
}
