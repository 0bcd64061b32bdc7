use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use visedit_workspace::{ServerConfig, SurfaceMode};

pub const DEFAULT_CONFIG_NAME: &str = "visedit.config.json";

/// Visedit configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Designer server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Quiet period before a burst of property edits is applied
    #[serde(default = "default_quiescence_ms")]
    pub quiescence_ms: u64,

    /// Bound on style queries; `null` waits indefinitely
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3030
}

fn default_quiescence_ms() -> u64 {
    300
}

fn default_query_timeout_ms() -> Option<u64> {
    Some(2000)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn server_config(&self, surface: SurfaceMode) -> ServerConfig {
        ServerConfig {
            quiescence: Duration::from_millis(self.quiescence_ms),
            query_timeout: self.query_timeout_ms.map(Duration::from_millis),
            surface,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            quiescence_ms: default_quiescence_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}
