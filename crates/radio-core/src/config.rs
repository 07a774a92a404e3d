use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform::{DirKind, Dirs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stations: StationsConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Where the station list is read from and written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// File name looked up in every candidate directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Delay between the last change and the write to disk.
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
    /// Explicit load candidates, replacing the directory lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_paths: Option<Vec<PathBuf>>,
    /// Explicit save location, replacing `<user config dir>/<file_name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate validation when downloading playlists.
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            save_delay_ms: default_save_delay_ms(),
            load_paths: None,
            save_path: None,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            insecure: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StationsConfig {
    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_file_name() -> String {
    "stations".to_string()
}

fn default_save_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    format!("radio-core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load candidates and save location for the station list, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationPaths {
    /// Tried in order, first one that reads and decodes wins.
    pub load_paths: Vec<PathBuf>,
    pub save_path: PathBuf,
}

impl StationPaths {
    pub const LOAD_DIRS: [DirKind; 3] = [
        DirKind::CurrentConfig,
        DirKind::UserConfig,
        DirKind::SystemConfig,
    ];

    pub fn new(config: &StationsConfig, dirs: &Dirs) -> Self {
        let load_paths = match &config.load_paths {
            Some(paths) => paths.clone(),
            None => dirs.existing_candidate_paths(&Self::LOAD_DIRS, &config.file_name),
        };
        let save_path = config
            .save_path
            .clone()
            .unwrap_or_else(|| dirs.user_config.join(&config.file_name));

        Self {
            load_paths,
            save_path,
        }
    }
}

impl Config {
    /// Read the config file, creating it with defaults when absent.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path(dirs: &Dirs) -> PathBuf {
        dirs.user_config.join("config.toml")
    }
}
