use std::env;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{ConteoError, Result};
use crate::model::CompanyId;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3411";

const API_URL_VAR: &str = "CONTEO_API_URL";
const TOKEN_VAR: &str = "CONTEO_TOKEN";
const COMPANY_VAR: &str = "CONTEO_EMPRESA_ID";

/// Settings for talking to the remote counting API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing path (e.g. "https://api.example.com").
    pub base_url: String,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    /// Company sent in the `x-empresa-id` header and in bulk saves.
    pub company_id: Option<CompanyId>,
    /// Re-fetch locations and summary after a successful save.
    /// Off by default.
    pub refresh_after_save: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            company_id: None,
            refresh_after_save: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Build from `CONTEO_API_URL`, `CONTEO_TOKEN` and `CONTEO_EMPRESA_ID`.
    /// Missing variables fall back to defaults; a malformed company id is an error.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        match env::var(API_URL_VAR) {
            Ok(url) => cfg.base_url = url,
            Err(_) => tracing::info!(default = DEFAULT_API_URL, "{API_URL_VAR} not set, using default"),
        }

        cfg.token = env::var(TOKEN_VAR).ok().filter(|t| !t.trim().is_empty());

        if let Ok(raw) = env::var(COMPANY_VAR) {
            let id = raw.trim().parse::<u64>().map_err(|e| {
                ConteoError::InvalidConfig(format!("{COMPANY_VAR}={raw}: {e}"))
            })?;
            cfg.company_id = Some(CompanyId(id));
        }

        Ok(cfg)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn with_refresh_after_save(mut self, enabled: bool) -> Self {
        self.refresh_after_save = enabled;
        self
    }

    /// Check the base URL is usable before any request goes out.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConteoError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Read a bearer token from a file, trimming surrounding whitespace.
pub async fn load_token_file(path: &Path) -> Result<String> {
    let raw = tokio::fs::read_to_string(path).await?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(ConteoError::InvalidConfig(format!(
            "token file {} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

/// Settings for the in-memory reference server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Token every request must present. `None` disables the check.
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:3411"
                .parse()
                .expect("default listen address is valid"),
            token: None,
        }
    }
}

impl ServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
