use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProxyError;

pub const DEFAULT_CONFIG_PATH: &str = "api-config.json";
pub const PRIVATE_KEY_ENV: &str = "IMAGEKIT_PRIVATE_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageKitConfig {
    pub private_key: String,
    pub public_key: Option<String>,
    pub url_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub imagekit: ImageKitConfig,
}

impl Config {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProxyError::Config(format!("reading {}: {}", path.display(), e)))?;
        let cfg: Config = serde_json::from_str(&raw)
            .map_err(|e| ProxyError::Config(format!("parsing {}: {}", path.display(), e)))?;
        if cfg.imagekit.private_key.trim().is_empty() {
            return Err(ProxyError::Config(format!(
                "imagekit.private_key is empty in {}",
                path.display()
            )));
        }
        Ok(cfg)
    }
}

/// The ImageKit private key. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Loads the credential from disk on every call so key rotation needs no restart.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    path: PathBuf,
    env_fallback: Option<String>,
}

impl CredentialSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_fallback: None,
        }
    }

    /// Use `var` when the config file does not exist.
    pub fn with_env_fallback(mut self, var: impl Into<String>) -> Self {
        self.env_fallback = Some(var.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Credential, ProxyError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            if let Some(var) = &self.env_fallback {
                if let Ok(secret) = std::env::var(var) {
                    if !secret.trim().is_empty() {
                        return Ok(Credential::new(secret));
                    }
                }
            }
        }
        let cfg = Config::from_file(&self.path).await?;
        Ok(Credential::new(cfg.imagekit.private_key))
    }
}
