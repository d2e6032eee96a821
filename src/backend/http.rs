// src/backend/http.rs
//
// Remote Java analyzer client: POST /analyze with the source, bounded
// timeout, strict response classification.

use std::time::Duration;

use crate::analyzer::AnalysisResult;
use crate::backend::{AnalyzerBackend, BackendError};

const BACKEND: &str = "java";

pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn classify_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout {
                backend: BACKEND,
                secs: self.timeout.as_secs(),
            }
        } else {
            BackendError::Unreachable {
                backend: BACKEND,
                detail: e.to_string(),
            }
        }
    }
}

impl AnalyzerBackend for HttpBackend {
    fn id(&self) -> &'static str {
        BACKEND
    }

    fn analyze(&self, code: &str) -> Result<AnalysisResult, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| BackendError::Unreachable {
                backend: BACKEND,
                detail: e.to_string(),
            })?;

        let resp = client
            .post(self.endpoint("analyze"))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .map_err(|e| self.classify_send_error(e))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| self.classify_send_error(e))?;

        if !status.is_success() {
            return Err(BackendError::Failed {
                backend: BACKEND,
                detail: format!("status {}", status),
            });
        }

        if body.trim().is_empty() {
            return Err(BackendError::EmptyResponse { backend: BACKEND });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::MalformedResponse {
            backend: BACKEND,
            detail: e.to_string(),
        })
    }
}
