use anyhow::Result;
use handoff_core::{AdminAllowlist, Limits};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Path to the RocksDB database; `None` selects the in-memory store
    pub database_path: Option<PathBuf>,

    /// CORS origin allowlist, may include `*`
    pub allowed_origins: Vec<String>,

    /// Admin allowlist; empty or `*` means every authenticated user
    pub admin_users: AdminAllowlist,

    /// Payload and TTL bounds applied to share and inbox writes
    pub limits: Limits,

    /// Base for share URLs; derived from the request host when unset
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_address = std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let database_path = std::env::var("DATABASE_PATH").ok().map(PathBuf::from);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_users =
            AdminAllowlist::from_csv(&std::env::var("ADMIN_USERS").unwrap_or_default());

        let max_payload_bytes = std::env::var("MAX_PAYLOAD_BYTES")
            .unwrap_or_else(|_| "8388608".to_string()) // 8 MiB
            .parse()?;

        let max_ttl_sec = std::env::var("MAX_TTL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?;

        let default_ttl_sec = std::env::var("DEFAULT_TTL")
            .unwrap_or_else(|_| "600".to_string())
            .parse()?;

        let base_url = std::env::var("BASE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string());

        Ok(Config {
            bind_address,
            database_path,
            allowed_origins,
            admin_users,
            limits: Limits {
                max_payload_bytes,
                max_ttl_sec,
                default_ttl_sec,
            },
            base_url,
        })
    }
}
