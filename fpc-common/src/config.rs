//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "FPC_ROOT_FOLDER";

/// Environment variable overriding the config file location
pub const CONFIG_FILE_ENV: &str = "FPC_CONFIG";

/// Name of the fixed media-device attribute
pub const MEDIA_DEVICES: &str = "Media Devices";

/// TOML configuration file contents
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Root folder holding `Pointsystem/`, `results/` and `Fingerprints/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    /// Weight table override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointsystem: Option<PathBuf>,
    /// Analysis results history override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<PathBuf>,
    /// Collected fingerprint tree override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<PathBuf>,
    /// Statistics output folder override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics_output: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub media: MediaConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Record-list attribute handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Attribute holding the device records
    pub attribute: String,
    /// Fields whose changes are reported, in report order
    pub tracked_fields: Vec<String>,
    /// Fields expected to vary between measurements
    pub excluded_fields: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            attribute: MEDIA_DEVICES.to_string(),
            tracked_fields: vec!["label".to_string(), "deviceId".to_string()],
            excluded_fields: vec!["kind".to_string(), "groupId".to_string()],
        }
    }
}

/// Well-known locations below the root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFolder {
    root: PathBuf,
}

impl RootFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// `<root>/Pointsystem/pointsystem.json`
    pub fn pointsystem_path(&self) -> PathBuf {
        self.root.join("Pointsystem").join("pointsystem.json")
    }

    /// `<root>/results`
    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    /// `<root>/results/analysis_results.json`
    pub fn results_path(&self) -> PathBuf {
        self.results_dir().join("analysis_results.json")
    }

    /// `<root>/Fingerprints`
    pub fn fingerprints_dir(&self) -> PathBuf {
        self.root.join("Fingerprints")
    }
}

impl TomlConfig {
    /// Weight table path: TOML override, else the root folder layout
    pub fn pointsystem_path(&self, root: &RootFolder) -> PathBuf {
        self.pointsystem
            .clone()
            .unwrap_or_else(|| root.pointsystem_path())
    }

    pub fn results_path(&self, root: &RootFolder) -> PathBuf {
        self.results.clone().unwrap_or_else(|| root.results_path())
    }

    pub fn fingerprints_dir(&self, root: &RootFolder) -> PathBuf {
        self.fingerprints
            .clone()
            .unwrap_or_else(|| root.fingerprints_dir())
    }

    pub fn statistics_output(&self, root: &RootFolder) -> PathBuf {
        self.statistics_output
            .clone()
            .unwrap_or_else(|| root.results_dir())
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(root_folder) = &config.root_folder {
        return root_folder.clone();
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// A TOML config together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// `None` when no file was found and defaults apply
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Log where the config came from
    ///
    /// Call once the tracing subscriber is installed.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded config from {}", path.display()),
            None => warn!("No config file found, using defaults"),
        }
    }
}

/// Locate and read the TOML config without logging
///
/// An explicitly requested file (argument or `FPC_CONFIG`) must exist. The
/// platform default location may be absent, which yields defaults.
pub fn find_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from));

    let path = match requested {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path
        }
        None => match default_config_file() {
            Some(path) => path,
            None => {
                return Ok(LoadedConfig {
                    config: TomlConfig::default(),
                    source: None,
                })
            }
        },
    };

    Ok(LoadedConfig {
        config: read_toml_config(&path)?,
        source: Some(path),
    })
}

/// Load the TOML config and log its source
///
/// Same lookup as [`find_toml_config`].
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let loaded = find_toml_config(explicit)?;
    loaded.log_source();
    Ok(loaded.config)
}

/// Parse one TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write a TOML config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    write_atomic(path, content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Write `bytes` to `<path>.tmp`, then rename over `path`
///
/// Readers never observe a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// First existing platform config file, if any
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("fpc").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/fpc/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/fpc (or /var/lib/fpc for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("fpc"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fpc"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/fpc
        dirs::data_dir()
            .map(|d| d.join("fpc"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fpc"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\fpc
        dirs::data_local_dir()
            .map(|d| d.join("fpc"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fpc"))
    } else {
        PathBuf::from("./fpc_data")
    }
}
