//! backend/mod.rs
//!
//! Language routing over heterogeneous analyzer backends.
//!
//! Every backend, local or remote, satisfies the same `AnalyzerBackend`
//! contract and owns its own transport and timeout details. The dispatcher
//! only normalizes language tags, picks a backend, and stamps the
//! normalized tag onto the result.

pub mod http;
pub mod local;
pub mod script;

use thiserror::Error;

use crate::analyzer::AnalysisResult;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unsupported language: {0}. Supported: python, java, typescript/js")]
    UnsupportedLanguage(String),

    #[error("{backend} analyzer unreachable: {detail}")]
    Unreachable { backend: &'static str, detail: String },

    #[error("{backend} analysis timed out after {secs}s")]
    Timeout { backend: &'static str, secs: u64 },

    #[error("{backend} analyzer failed: {detail}")]
    Failed { backend: &'static str, detail: String },

    #[error("{backend} analyzer returned an empty response")]
    EmptyResponse { backend: &'static str },

    #[error("Invalid JSON from {backend} analyzer: {detail}")]
    MalformedResponse { backend: &'static str, detail: String },
}

pub trait AnalyzerBackend {
    /// Stable backend identifier, also the normalized language tag.
    fn id(&self) -> &'static str;

    fn analyze(&self, code: &str) -> Result<AnalysisResult, BackendError>;
}

/// Collapse language aliases onto backend tags. Unknown tags pass through
/// lower-cased so the dispatcher can name them in its error.
pub fn normalize_language(language: &str) -> String {
    let lang = language.trim().to_lowercase();
    match lang.as_str() {
        "ts" | "typescript" | "js" | "javascript" => "typescript".into(),
        _ => lang,
    }
}

pub struct Dispatcher {
    python: local::LocalBackend,
    java: http::HttpBackend,
    typescript: script::ScriptBackend,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            python: local::LocalBackend,
            java: http::HttpBackend::new(&config.java_url, config.timeout()),
            typescript: script::ScriptBackend::new(
                &config.node_bin,
                &config.ts_script,
                config.timeout(),
            ),
        }
    }

    pub fn backend_for(&self, normalized: &str) -> Option<&dyn AnalyzerBackend> {
        match normalized {
            "python" => Some(&self.python),
            "java" => Some(&self.java),
            "typescript" => Some(&self.typescript),
            _ => None,
        }
    }

    pub fn dispatch(&self, language: &str, code: &str) -> Result<AnalysisResult, BackendError> {
        let lang = normalize_language(language);
        let backend = self
            .backend_for(&lang)
            .ok_or_else(|| BackendError::UnsupportedLanguage(language.to_string()))?;

        log::info!("dispatching {} analysis to the {} backend", language, backend.id());

        let mut result = backend.analyze(code)?;
        result.language = lang;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_normalization() {
        assert_eq!(normalize_language("js"), "typescript");
        assert_eq!(normalize_language("JavaScript"), "typescript");
        assert_eq!(normalize_language("TS"), "typescript");
        assert_eq!(normalize_language("Python"), "python");
        assert_eq!(normalize_language("cobol"), "cobol");
    }

    #[test]
    fn unsupported_language_is_classified() {
        let dispatcher = Dispatcher::new(&Config::default());
        let err = dispatcher.dispatch("cobol", "IDENTIFICATION DIVISION.").unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn js_and_typescript_share_a_backend() {
        let dispatcher = Dispatcher::new(&Config::default());
        let a = dispatcher.backend_for(&normalize_language("js")).unwrap().id();
        let b = dispatcher
            .backend_for(&normalize_language("typescript"))
            .unwrap()
            .id();
        assert_eq!(a, b);
    }

    #[test]
    fn local_dispatch_normalizes_language_field() {
        let dispatcher = Dispatcher::new(&Config::default());
        let result = dispatcher.dispatch("Python", "def f():\n    pass\n").unwrap();
        assert_eq!(result.language, "python");
        assert_eq!(result.functions.len(), 1);
    }
}
