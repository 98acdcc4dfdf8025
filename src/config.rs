use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::tmdb::TMDB_BASE;

const DEFAULT_BIND: &str = "0.0.0.0:3146";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub tmdb_base_url: String,
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = non_empty("STREAMYEEBS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse()
            .with_context(|| format!("STREAMYEEBS_BIND is not a socket address: {}", bind_raw))?;

        Ok(Self {
            api_key: non_empty("TMDB_API_KEY"),
            tmdb_base_url: non_empty("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string()),
            data_dir: non_empty("STREAMYEEBS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            bind_addr,
        })
    }
}
