//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::session::DEFAULT_MAX_REDIRECTS;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (default: http://127.0.0.1:8000).
    pub api_url: String,

    /// File holding persisted entries such as the token
    /// (default: ./.admin-client.json).
    pub storage_path: PathBuf,

    /// Per-request HTTP timeout (default: 30s).
    pub http_timeout: Duration,

    /// Redirects one navigation may follow (default: 8).
    pub max_redirects: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("ADMIN_API_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
        url::Url::parse(&api_url).context("ADMIN_API_URL must be an absolute URL")?;

        let storage_path = lookup("ADMIN_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.admin-client.json"));

        let timeout_secs: u64 = lookup("ADMIN_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("ADMIN_HTTP_TIMEOUT_SECS must be a valid u64")?;
        if timeout_secs == 0 {
            bail!("ADMIN_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let max_redirects = lookup("ADMIN_MAX_REDIRECTS")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("ADMIN_MAX_REDIRECTS must be a valid usize")?
            .unwrap_or(DEFAULT_MAX_REDIRECTS);

        Ok(Self {
            api_url,
            storage_path,
            http_timeout: Duration::from_secs(timeout_secs),
            max_redirects,
        })
    }
}
