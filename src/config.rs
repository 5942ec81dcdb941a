// src/config.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5001;
pub const CONFIG_FILE: &str = "config.json";
pub const PRICE_HISTORY_FILE: &str = "price_history.json";

/// Process settings taken from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub debug: bool,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let debug = lookup("DEBUG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let data_dir = lookup("DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(ServerConfig { port, debug, data_dir })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(PRICE_HISTORY_FILE)
    }
}
