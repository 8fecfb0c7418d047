//! Process configuration.
//!
//! Settings come from environment variables, read once at startup:
//!
//! * `ONROAD_BIND_ADDR` — listen address, default `127.0.0.1:3000`.
//! * `ONROAD_TARIFF_FILE` — optional JSON tariff table replacing the
//!   built-in schedule.
//!
//! Log filtering follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tariff_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            tariff_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.  Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            bind_addr: get("ONROAD_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            tariff_file: get("ONROAD_TARIFF_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn reads_overrides_and_ignores_blanks() {
        let vars: HashMap<&str, &str> = [
            ("ONROAD_BIND_ADDR", "0.0.0.0:8080"),
            ("ONROAD_TARIFF_FILE", "  "),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.tariff_file, None);
    }
}
