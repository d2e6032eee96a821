// src/backend/local.rs

use crate::analyzer::{python, AnalysisResult};
use crate::backend::{AnalyzerBackend, BackendError};

/// In-process Python backend. No transport, no timeout: the parse and
/// traversal run on the calling thread.
pub struct LocalBackend;

impl AnalyzerBackend for LocalBackend {
    fn id(&self) -> &'static str {
        "python"
    }

    fn analyze(&self, code: &str) -> Result<AnalysisResult, BackendError> {
        Ok(python::analyze(code))
    }
}
