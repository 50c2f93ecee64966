use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Runner settings, read from `settings.json` at the project root. A
/// missing file means the defaults apply; a malformed file is an error.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Number of turns to simulate before saving.
    pub turns: u32,
    /// Faction AI script, relative to the scripts directory.
    pub script: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            turns: 1,
            script: "faction.lua".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl Settings {
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            warn!(path = %path.display(), "settings_file_missing_using_defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|message| SettingsError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        match serde_path_to_error::deserialize::<_, Settings>(&mut deserializer) {
            Ok(settings) => Ok(settings),
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                if path.is_empty() || path == "." {
                    Err(source.to_string())
                } else {
                    Err(format!("at {path}: {source}"))
                }
            }
        }
    }
}
