use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bbmark_core::{Dialect, EmoticonTable, KnownUsers, RenderOptions, UserHandle};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_STATIC_URL: &str = "/static/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid emoticon pattern: {0}")]
    Emoticons(#[from] regex::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialect: Dialect,
    /// Register `[section=name]`.
    pub sections: bool,
    pub render: RenderOptions,
    pub emoticons: Option<EmoticonConfig>,
    pub mentions: MentionConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmoticonConfig {
    pub static_url: Option<String>,
    pub names: Vec<String>,
    /// Directory of `.gif` smileys; every basename becomes an emoticon name.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MentionConfig {
    pub users: Vec<UserHandle>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("no config file given, using defaults");
            return Ok(Self::default());
        };
        log::debug!("reading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn emoticon_table(&self) -> Result<Option<EmoticonTable>, ConfigError> {
        let Some(emoticons) = &self.emoticons else {
            return Ok(None);
        };
        let mut names = emoticons.names.clone();
        if let Some(dir) = &emoticons.directory {
            names.extend(smiley_names(dir)?);
        }
        let static_url = emoticons.static_url.as_deref().unwrap_or(DEFAULT_STATIC_URL);
        let table = EmoticonTable::new(static_url, &names)?;
        log::debug!("{} emoticons loaded", table.len());
        Ok(Some(table))
    }

    pub fn users(&self) -> Option<KnownUsers> {
        if self.mentions.users.is_empty() {
            return None;
        }
        Some(self.mentions.users.iter().cloned().collect())
    }
}

fn smiley_names(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("gif") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
