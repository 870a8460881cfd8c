use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub jwt_secret: Vec<u8>,
    pub api_key: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads configuration from the environment; a `.env` file is honored
    /// when present. `CL_JWT_SECRET` and `CL_API_KEY` are required, the
    /// rest has defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("CL_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8083".to_string())
            .parse()
            .context("Invalid CL_LISTEN_ADDR")?;
        let db_path =
            std::env::var("CL_DB_PATH").unwrap_or_else(|_| "./db/cartlist.db".to_string());
        let jwt_secret = std::env::var("CL_JWT_SECRET")
            .context("CL_JWT_SECRET is not set")?
            .into_bytes();
        let api_key = std::env::var("CL_API_KEY").context("CL_API_KEY is not set")?;
        let cors_allow = std::env::var("CL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("CL_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .unwrap_or(30_000);

        Ok(Self {
            listen_addr,
            db_path,
            jwt_secret,
            api_key,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
