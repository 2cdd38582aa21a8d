//! Configuration loading
//!
//! Sources are tried in order: the process environment (`CONVENE_*`
//! variables, all required except the sweep flag), then a config file found
//! by [`probe_config_paths`], then compiled-in defaults (only via
//! [`load_or_default`]). Files may be JSON or TOML; the extension picks the
//! parser.
//!
//! Environment variables: `CONVENE_HOST`, `CONVENE_PORT`, `CONVENE_DB_PATH`,
//! `CONVENE_DB_POOL_SIZE`, `CONVENE_SWEEP_INTERVAL`, `CONVENE_SWEEP_ENABLED`.
//!
//! File probing walks the working directory, its two parents, and the
//! executable's directory (plus its two parents), looking for
//! `config.{json,toml}` or `convene.{json,toml}`.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use convene_domain::{ConveneError, Result};
use convene_shared::{Config, DatabaseConfig, ServerConfig, SweepConfig};

const FILE_STEMS: &[&str] = &["config", "convene"];
const FILE_EXTENSIONS: &[&str] = &["json", "toml"];

/// Load configuration, preferring the environment over files.
///
/// # Errors
/// Returns `ConveneError::Config` when neither source yields a complete,
/// parseable configuration.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration read from environment");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but a missing source is not an error: with no complete
/// environment and no config file on disk, the compiled-in defaults apply.
/// A file that exists but fails to parse still surfaces as an error.
pub fn load_or_default() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration read from environment");
            return Ok(config);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
        }
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("no configuration source found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Build a [`Config`] purely from environment variables.
///
/// # Errors
/// Returns `ConveneError::Config` naming the first variable that is missing
/// or unparseable.
pub fn load_from_env() -> Result<Config> {
    Ok(Config {
        server: ServerConfig {
            host: require_env("CONVENE_HOST")?,
            port: parse_env("CONVENE_PORT")?,
        },
        database: DatabaseConfig {
            path: require_env("CONVENE_DB_PATH")?,
            pool_size: parse_env("CONVENE_DB_POOL_SIZE")?,
        },
        sweep: SweepConfig {
            interval_seconds: parse_env("CONVENE_SWEEP_INTERVAL")?,
            enabled: env_flag("CONVENE_SWEEP_ENABLED", true),
        },
    })
}

/// Read and parse one config file. With `path` absent, the standard
/// locations are probed.
///
/// # Errors
/// Returns `ConveneError::Config` when the file is missing, unreadable, or
/// fails to parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(p) if p.exists() => p,
        Some(p) => {
            return Err(ConveneError::Config(format!("config file not found: {}", p.display())));
        }
        None => probe_config_paths().ok_or_else(|| {
            ConveneError::Config("no config file in any probed location".to_string())
        })?,
    };

    tracing::info!(path = %path.display(), "reading configuration file");
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ConveneError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_contents(&contents, &path)
}

/// First existing candidate among the probed locations, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    for base in probe_bases() {
        for stem in FILE_STEMS {
            for ext in FILE_EXTENSIONS {
                let candidate = base.join(format!("{stem}.{ext}"));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

fn probe_bases() -> Vec<PathBuf> {
    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd.clone());
        bases.push(cwd.join(".."));
        bases.push(cwd.join("../.."));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            bases.push(dir.to_path_buf());
            bases.push(dir.join(".."));
            bases.push(dir.join("../.."));
        }
    }
    bases
}

fn parse_contents(contents: &str, path: &Path) -> Result<Config> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(contents)
            .map_err(|e| ConveneError::Config(format!("bad TOML in {}: {e}", path.display()))),
        // Extensionless files get the JSON parser; probing never yields one,
        // but explicit paths may.
        Some("json") | None => serde_json::from_str(contents)
            .map_err(|e| ConveneError::Config(format!("bad JSON in {}: {e}", path.display()))),
        Some(other) => {
            Err(ConveneError::Config(format!("unsupported config extension: {other}")))
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ConveneError::Config(format!("{key} is not set")))
}

fn parse_env<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    require_env(key)?
        .parse()
        .map_err(|e| ConveneError::Config(format!("{key} is invalid: {e}")))
}

/// Truthy values: 1, true, yes, on (any case). Anything else is false;
/// unset falls back to `default`.
fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
