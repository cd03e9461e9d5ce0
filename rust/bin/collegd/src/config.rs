//! Server configuration file.
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults below.

use std::path::{Path, PathBuf};

use college_core::{DEFAULT_MAX_CODE_ATTEMPTS, ServiceConfig};
use serde::Deserialize;

/// Directory searched for bare context names passed to `-c`.
const CONFIG_DIR: &str = "/etc/college";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address; `--listen` / `LISTEN` take precedence.
    pub listen: Option<String>,
    pub storage: StorageConfig,
    pub allocator: AllocatorConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Overrides `{data_dir}/college.sqlite`.
    pub sqlite_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sqlite_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Lookup/insert rounds per code before a request fails.
    pub max_attempts: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Resolve a `-c` argument to a file path.
    ///
    /// Anything containing `/` or `.` is taken as a path; a bare name maps to
    /// `/etc/college/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONFIG_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(content)?;
        if config.allocator.max_attempts == 0 {
            anyhow::bail!("allocator.max_attempts must be at least 1");
        }
        Ok(config)
    }

    /// Effective listen address: CLI/env first, then the file, then the default.
    pub fn listen_addr(&self, cli_listen: Option<&str>) -> String {
        cli_listen
            .or(self.listen.as_deref())
            .unwrap_or(DEFAULT_LISTEN)
            .to_string()
    }

    pub fn service_config(&self, listen: String) -> ServiceConfig {
        ServiceConfig {
            data_dir: Some(self.storage.data_dir.clone()),
            sqlite_path: self.storage.sqlite_path.clone(),
            listen,
            max_code_attempts: self.allocator.max_attempts,
        }
    }
}
