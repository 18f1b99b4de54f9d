use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_STORAGE_DIR: &str = ".storage";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub storage_dir: PathBuf,
    pub cors_allowed_origin: Option<String>,
    pub ping_message: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let storage_dir = env::var("STORAGE_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let ping_message = env::var("PING_MESSAGE").unwrap_or_else(|_| "ping".to_string());

        Ok(Self {
            server_host,
            server_port,
            storage_dir,
            cors_allowed_origin,
            ping_message,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Non-blank entries of the comma separated `CORS_ALLOWED_ORIGIN` list.
    pub fn allowed_origins(&self) -> Vec<String> {
        parse_origins(self.cors_allowed_origin.as_deref())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            cors_allowed_origin: None,
            ping_message: "ping".to_string(),
        }
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|origins| {
        origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
