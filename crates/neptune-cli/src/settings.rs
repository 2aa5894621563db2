//! Console settings persisted as TOML.
//!
//! Settings live in the platform config folder:
//! - macOS: ~/Library/Application Support/org.neptune.Neptune Console/
//! - Windows: %APPDATA%/neptune/Neptune Console/config/
//! - Linux: ~/.config/neptune-console/
//!
//! A missing or unreadable file yields defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use neptune_client::ClientConfig;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "neptune";
const APP_NAME: &str = "Neptune Console";
const CONFIG_FILENAME: &str = "settings.toml";
const SESSION_DIRNAME: &str = "session";

/// Console settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the session credential is kept. Defaults to the platform data
    /// folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Client used by commands when `--client` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_client_id: Option<i64>,

    /// Server connection.
    pub api: ClientConfig,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Path of the settings file, if the platform folder can be determined.
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl Settings {
    /// Load from the default path.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("Could not determine settings path, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    tracing::debug!(path = %path.display(), "Loaded settings");
                    settings
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "Failed to parse settings, using defaults"
                    );
                    Self::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "Failed to read settings, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save to the default path.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = settings_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine settings path"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating the parent folder.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Folder holding the persisted session.
    pub fn session_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }
        project_dirs().map_or_else(
            || PathBuf::from(".neptune").join(SESSION_DIRNAME),
            |dirs| dirs.data_dir().join(SESSION_DIRNAME),
        )
    }
}
