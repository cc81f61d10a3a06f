// Configuration loading and parsing (league.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Round reported for players with no pick position yet. Must sort
    /// after every real round.
    pub no_overall_sentinel: u32,
    /// Ceiling for expected-round bucketing ("30+" style display).
    pub max_round_filter: u32,
    /// Highest season finish that still counts as a playoff appearance.
    pub playoff_threshold: u32,
    pub db_path: String,
    /// Capacity of each broadcast topic's channel.
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            no_overall_sentinel: 99,
            max_round_filter: 30,
            playoff_threshold: 4,
            db_path: "draftboard.db".to_string(),
            channel_capacity: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole league.toml file. Every section
/// is optional; omitted values fall back to [`Config::default`].
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    draft: DraftSection,
    #[serde(default)]
    history: HistorySection,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    broadcast: BroadcastSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DraftSection {
    no_overall_sentinel: u32,
    max_round_filter: u32,
}

impl Default for DraftSection {
    fn default() -> Self {
        let defaults = Config::default();
        DraftSection {
            no_overall_sentinel: defaults.no_overall_sentinel,
            max_round_filter: defaults.max_round_filter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct HistorySection {
    playoff_threshold: u32,
}

impl Default for HistorySection {
    fn default() -> Self {
        HistorySection {
            playoff_threshold: Config::default().playoff_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: Config::default().db_path,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct BroadcastSection {
    channel_capacity: usize,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        BroadcastSection {
            channel_capacity: Config::default().channel_capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from a league.toml file. A missing file is an error;
/// use [`Config::default`] when no file is expected.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text, path)
}

/// Parse a league.toml document. Split out from [`load_config`] so tests
/// don't need temp files.
fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        no_overall_sentinel: file.draft.no_overall_sentinel,
        max_round_filter: file.draft.max_round_filter,
        playoff_threshold: file.history.playoff_threshold,
        db_path: file.database.path,
        channel_capacity: file.broadcast.channel_capacity,
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.no_overall_sentinel == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.no_overall_sentinel".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if config.max_round_filter == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.max_round_filter".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.no_overall_sentinel <= config.max_round_filter {
        return Err(ConfigError::ValidationError {
            field: "draft.no_overall_sentinel".to_string(),
            message: format!(
                "must sort after the round ceiling ({})",
                config.max_round_filter
            ),
        });
    }
    if config.playoff_threshold == 0 {
        return Err(ConfigError::ValidationError {
            field: "history.playoff_threshold".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.channel_capacity == 0 {
        return Err(ConfigError::ValidationError {
            field: "broadcast.channel_capacity".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
