use std::path::{Path, PathBuf};

/// Directory name used below every base directory.
pub const APP_DIR: &str = "radio";

/// Places a file may live in, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    /// `./config` below the working directory
    CurrentConfig,
    /// `./data` below the working directory
    CurrentData,
    UserConfig,
    UserData,
    SystemConfig,
    SystemData,
}

impl DirKind {
    pub const ALL: [DirKind; 6] = [
        DirKind::CurrentConfig,
        DirKind::CurrentData,
        DirKind::UserConfig,
        DirKind::UserData,
        DirKind::SystemConfig,
        DirKind::SystemData,
    ];
}

/// Base directories, resolved once at startup and handed to whoever needs
/// them.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub current_config: PathBuf,
    pub current_data: PathBuf,
    pub user_config: PathBuf,
    pub user_data: PathBuf,
    pub system_config: Vec<PathBuf>,
    pub system_data: Vec<PathBuf>,
}

impl Dirs {
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self {
            current_config: cwd.join("config"),
            current_data: cwd.join("data"),
            user_config: config_dir(),
            user_data: data_dir(),
            system_config: xdg_system_dirs("XDG_CONFIG_DIRS", "/etc/xdg"),
            system_data: xdg_system_dirs("XDG_DATA_DIRS", "/usr/local/share/:/usr/share/"),
        }
    }

    /// Every place `filename` may live in, for the given kinds. The result
    /// follows [`DirKind::ALL`] order whatever the order of `kinds`.
    pub fn candidate_paths(&self, kinds: &[DirKind], filename: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for kind in DirKind::ALL.iter().filter(|k| kinds.contains(k)) {
            match kind {
                DirKind::CurrentConfig => paths.push(self.current_config.join(filename)),
                DirKind::CurrentData => paths.push(self.current_data.join(filename)),
                DirKind::UserConfig => paths.push(self.user_config.join(filename)),
                DirKind::UserData => paths.push(self.user_data.join(filename)),
                DirKind::SystemConfig => {
                    paths.extend(self.system_config.iter().map(|d| d.join(filename)))
                }
                DirKind::SystemData => {
                    paths.extend(self.system_data.iter().map(|d| d.join(filename)))
                }
            }
        }

        paths
    }

    /// Like [`Dirs::candidate_paths`], keeping only files that exist.
    pub fn existing_candidate_paths(&self, kinds: &[DirKind], filename: &str) -> Vec<PathBuf> {
        self.candidate_paths(kinds, filename)
            .into_iter()
            .filter(|p| p.exists())
            .collect()
    }
}

pub fn config_dir() -> PathBuf {
    // On macOS and Linux, always use ~/.config/radio/
    // (avoid macOS Application Support folder for consistency)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn data_dir() -> PathBuf {
    // ~/.local/share/radio/ on macOS too, same reasoning as config_dir()
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

fn xdg_system_dirs(var: &str, default: &str) -> Vec<PathBuf> {
    let value = std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    split_dir_list(&value)
}

fn split_dir_list(value: &str) -> Vec<PathBuf> {
    #[cfg(unix)]
    let sep = ':';
    #[cfg(windows)]
    let sep = ';';

    value
        .split(sep)
        .filter(|s| !s.is_empty())
        .map(|s| Path::new(s).join(APP_DIR))
        .collect()
}
