// Configuration loading and parsing (strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::availability::AvailabilityFilter;
use crate::valuation::scoring::ScoringWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub pool: PoolConfig,
    pub data: DataPaths,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StrategyFile {
    scoring: ScoringConfig,
    pool: PoolConfig,
    data: DataPaths,
}

/// Default scoring knobs. Request values override these per call.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub consistency_k: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Trailing gameweeks used for form, xG, consistency and recent fixtures.
    pub horizon: u32,
    /// Number of add recommendations returned.
    pub limit: usize,
    pub minutes_60_last3_required: u32,
    pub minutes_60_season_required: u32,
}

impl PoolConfig {
    pub fn availability_filter(&self) -> AvailabilityFilter {
        AvailabilityFilter {
            last3_required: self.minutes_60_last3_required,
            season_required: self.minutes_60_season_required,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Root of the cached snapshot tree (game/, bootstrap/, gw/, league/).
    pub snapshot_root: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/strategy.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let strategy_path = base_dir.join("config").join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        scoring: strategy_file.scoring,
        pool: strategy_file.pool,
        data: strategy_file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the crate root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            // Never overwrite a user's edited config.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let w = &config.scoring.weights;
    let weight_fields: &[(&str, f64)] = &[
        ("scoring.weights.fixtures", w.fixtures),
        ("scoring.weights.form", w.form),
        ("scoring.weights.total_points", w.total_points),
        ("scoring.weights.xg", w.xg),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite number >= 0, got {val}"),
            });
        }
    }
    if weight_fields.iter().all(|(_, val)| *val == 0.0) {
        return Err(ConfigError::ValidationError {
            field: "scoring.weights".into(),
            message: "at least one weight must be > 0".into(),
        });
    }

    let k = config.scoring.consistency_k;
    if !k.is_finite() || k < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.consistency_k".into(),
            message: format!("must be a finite number >= 0, got {k}"),
        });
    }

    let pool = &config.pool;
    if pool.horizon == 0 {
        return Err(ConfigError::ValidationError {
            field: "pool.horizon".into(),
            message: "must be > 0".into(),
        });
    }
    if pool.limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "pool.limit".into(),
            message: "must be > 0".into(),
        });
    }

    if config.data.snapshot_root.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.snapshot_root".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
