// src/config.rs
//
// Backend endpoints and timeouts, loaded from the user config dir with
// sensible defaults when no file is present.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Java analyzer service.
    pub java_url: String,
    /// Interpreter used to run the TypeScript analyzer script.
    pub node_bin: String,
    /// Path to the TypeScript analyzer script.
    pub ts_script: PathBuf,
    /// Per-call budget for external backends, seconds.
    pub timeout_secs: u64,
    /// Budget for liveness probes, seconds.
    pub probe_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            java_url: "http://localhost:8080".into(),
            node_bin: "node".into(),
            ts_script: PathBuf::from("runtimes/ts/analyzer.js"),
            timeout_secs: 10,
            probe_timeout_secs: 2,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_config_file().unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 15))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.clamp(1, 5))
    }
}

fn config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("testsmith");
    dir.push("config.toml");
    dir
}

fn read_config_file() -> Option<Config> {
    let raw = fs::read_to_string(config_path()).ok()?;
    match toml::from_str(&raw) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("ignoring malformed config file: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let cfg = Config::default();
        assert!(cfg.timeout() >= Duration::from_secs(1));
        assert!(cfg.timeout() <= Duration::from_secs(15));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("java_url = \"http://analyzer:9000\"").unwrap();
        assert_eq!(cfg.java_url, "http://analyzer:9000");
        assert_eq!(cfg.node_bin, "node");
        assert_eq!(cfg.timeout_secs, 10);
    }
}
