//! probe.rs
//!
//! Backend liveness checks. Ephemeral by design: every probe recomputes
//! availability from scratch, nothing is persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzer::python;
use crate::backend::http::HttpBackend;
use crate::config::Config;

pub const BACKENDS: &[&str] = &["python", "java", "typescript"];

/// Backend identifier -> reachable right now.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeAvailability {
    pub backends: BTreeMap<String, bool>,
}

impl RuntimeAvailability {
    pub fn is_available(&self, backend: &str) -> bool {
        self.backends.get(backend).copied().unwrap_or(false)
    }

    pub fn available(&self) -> Vec<String> {
        self.backends
            .iter()
            .filter(|(_, up)| **up)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn unavailable(&self) -> Vec<String> {
        self.backends
            .iter()
            .filter(|(_, up)| !**up)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub fn probe_all(config: &Config) -> RuntimeAvailability {
    let mut backends = BTreeMap::new();
    backends.insert("python".to_string(), probe_local());
    backends.insert("java".to_string(), probe_http(config));
    backends.insert("typescript".to_string(), probe_script(config));
    RuntimeAvailability { backends }
}

/// The in-process backend is live when the grammar loads and parses a
/// trivial function.
fn probe_local() -> bool {
    python::analyze("def _probe():\n    pass\n").error.is_none()
}

/// GET /health with a short budget; any 2xx counts as live.
fn probe_http(config: &Config) -> bool {
    let backend = HttpBackend::new(&config.java_url, config.probe_timeout());

    let client = match reqwest::blocking::Client::builder()
        .timeout(config.probe_timeout())
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    match client.get(backend.endpoint("health")).send() {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

fn probe_script(config: &Config) -> bool {
    config.ts_script.exists()
}

/// One actionable hint per unavailable backend.
pub fn remediation_hint(backend: &str, config: &Config) -> String {
    match backend {
        "python" => "Python grammar failed to load; reinstall testsmith".into(),
        "java" => format!(
            "start the Java analyzer service and confirm it answers {}/health",
            config.java_url.trim_end_matches('/')
        ),
        "typescript" => format!(
            "install Node.js and place the analyzer script at {}",
            config.ts_script.display()
        ),
        other => format!("unknown backend {}", other),
    }
}
