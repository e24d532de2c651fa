//! Process-wide runtime configuration
//!
//! Read from a TOML file, from the environment, or built in code, then
//! installed once at startup:
//!
//! ```toml
//! # veneer.toml
//! dump_dir = "target/veneer"
//! trace_calls = true
//! ```

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, ProxyResult};

/// Directory to dump synthesized tables into
pub const ENV_DUMP_DIR: &str = "VENEER_DUMP_DIR";

/// Enables per-stage call tracing (`1`, `true`, `yes`, `on`)
pub const ENV_TRACE_CALLS: &str = "VENEER_TRACE_CALLS";

/// Runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Write every freshly synthesized table here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_dir: Option<PathBuf>,

    /// Emit a `trace!` event per pipeline stage
    #[serde(default)]
    pub trace_calls: bool,
}

static CURRENT: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

impl Config {
    /// Parse from TOML source
    pub fn from_toml_str(source: &str) -> ProxyResult<Self> {
        toml::from_str(source).map_err(|e| ProxyError::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> ProxyResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ProxyError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Build from `VENEER_DUMP_DIR` / `VENEER_TRACE_CALLS`
    pub fn from_env() -> ProxyResult<Self> {
        Self::default().with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Override fields from an environment-like lookup.
    ///
    /// Unset or empty variables leave the field untouched.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> ProxyResult<Self> {
        if let Some(dir) = lookup(ENV_DUMP_DIR).filter(|v| !v.is_empty()) {
            self.dump_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = lookup(ENV_TRACE_CALLS).filter(|v| !v.is_empty()) {
            self.trace_calls = parse_flag(&flag)
                .ok_or_else(|| ProxyError::Config(format!("{}: not a boolean: {:?}", ENV_TRACE_CALLS, flag)))?;
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Replace the process-wide configuration.
///
/// Controllers read `trace_calls` when they are built; tables already
/// synthesized are not dumped retroactively.
pub fn install(config: Config) {
    tracing::debug!(?config, "installing configuration");
    *CURRENT.write() = config;
}

/// Snapshot of the process-wide configuration
pub fn current() -> Config {
    CURRENT.read().clone()
}

pub(crate) fn trace_calls() -> bool {
    CURRENT.read().trace_calls
}

pub(crate) fn dump_dir() -> Option<PathBuf> {
    CURRENT.read().dump_dir.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(
            r#"
dump_dir = "target/veneer"
trace_calls = true
"#,
        )
        .unwrap();
        assert_eq!(config.dump_dir, Some(PathBuf::from("target/veneer")));
        assert!(config.trace_calls);
    }

    #[test]
    fn test_defaults_when_empty() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str("dump = 1").unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veneer.toml");
        std::fs::write(&path, "trace_calls = true\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert!(config.trace_calls);
        assert!(config.dump_dir.is_none());

        let missing = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(missing.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_DUMP_DIR, "/tmp/dumps"), (ENV_TRACE_CALLS, "Yes")].into();
        let config = Config::default()
            .with_env_lookup(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.dump_dir, Some(PathBuf::from("/tmp/dumps")));
        assert!(config.trace_calls);
    }

    #[test]
    fn test_env_bad_flag() {
        let result = Config::default().with_env_lookup(|k| (k == ENV_TRACE_CALLS).then(|| "maybe".to_string()));
        assert!(matches!(result, Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_empty_env_leaves_fields() {
        let base = Config {
            dump_dir: Some(PathBuf::from("keep")),
            trace_calls: true,
        };
        let config = base.clone().with_env_lookup(|_| Some(String::new())).unwrap();
        assert_eq!(config, base);
    }
}
