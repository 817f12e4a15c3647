use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::HuddleConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["huddle.toml", "huddle.yaml", "huddle.yml", "huddle.json"];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set a custom config directory. When set, discovery only looks in this
/// directory (project-local and user-global paths are skipped). Each call
/// replaces the previous override, so tests can point at fresh temp dirs.
pub fn set_config_dir(path: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = Some(path);
    }
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = None;
    }
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE.lock().ok().and_then(|guard| guard.clone())
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<HuddleConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./huddle.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/huddle/huddle.{toml,yaml,yml,json}` (user-global)
///
/// Returns `HuddleConfig::default()` when no config file is found or the
/// found file fails to parse.
pub fn discover_and_load() -> HuddleConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(config) => return config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    HuddleConfig::default()
}

/// Find the first config file in standard locations.
///
/// When a config dir override is set, only that directory is searched —
/// project-local and user-global paths are skipped for isolation.
fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
        // Override is set — don't fall through to other locations.
        return None;
    }

    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/huddle/
    if let Some(dir) = home_dir().map(|h| h.join(".config").join("huddle")) {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the config directory: override, or `~/.config/huddle/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    home_dir().map(|h| h.join(".config").join("huddle"))
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<HuddleConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => anyhow::bail!("unsupported config format: {other:?}"),
    }
}
